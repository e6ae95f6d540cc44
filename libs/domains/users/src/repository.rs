use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserError;
use crate::models::{NewUser, ProfileChanges, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, UserError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
    async fn email_exists(&self, email: &str) -> Result<bool, UserError>;
    async fn phone_exists(&self, phone: &str, exclude: Option<Uuid>) -> Result<bool, UserError>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, UserError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserError>;
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_changes(user: &mut User, changes: ProfileChanges) {
    if let Some(v) = changes.first_name {
        user.first_name = v;
    }
    if let Some(v) = changes.last_name {
        user.last_name = v;
    }
    if let Some(v) = changes.phone {
        user.phone = v;
    }
    if let Some(v) = changes.profile_picture {
        user.profile_picture = Some(v);
    }
    if let Some(v) = changes.farm_name {
        user.farm_name = Some(v);
    }
    if let Some(v) = changes.farm_location {
        user.farm_location = Some(v);
    }
    if let Some(v) = changes.farm_size {
        user.farm_size = Some(v);
    }
    if let Some(v) = changes.business_name {
        user.business_name = Some(v);
    }
    if let Some(v) = changes.business_type {
        user.business_type = Some(v);
    }
    if let Some(v) = changes.business_address {
        user.business_address = Some(v);
    }
    user.updated_at = Utc::now();
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email || u.phone == user.phone) {
            return Err(UserError::Duplicate(
                "Registration failed. Email or phone number might already be in use.".to_string(),
            ));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            user_type: user.user_type,
            profile_picture: None,
            is_verified: false,
            is_active: true,
            farm_name: user.farm_name,
            farm_location: user.farm_location,
            farm_size: user.farm_size,
            business_name: user.business_name,
            business_type: user.business_type,
            business_address: user.business_address,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn phone_exists(&self, phone: &str, exclude: Option<Uuid>) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.phone == phone && Some(u.id) != exclude))
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;
        apply_changes(user, changes);
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;

    fn new_user(email: &str, phone: &str) -> NewUser {
        NewUser {
            first_name: "Test".into(),
            last_name: "Farmer".into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: "hash".into(),
            user_type: UserType::Farmer,
            farm_name: Some("Field".into()),
            farm_location: None,
            farm_size: None,
            business_name: None,
            business_type: None,
            business_address: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_email() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("a@example.com", "+1234567890")).await.unwrap();
        let found = repo.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.is_active);
        assert!(!found.is_verified);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("a@example.com", "+1234567890")).await.unwrap();
        let err = repo
            .create(new_user("a@example.com", "+1987654321"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Duplicate(_)));
    }

    #[tokio::test]
    async fn phone_exists_excludes_owner() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@example.com", "+1234567890")).await.unwrap();
        assert!(repo.phone_exists("+1234567890", None).await.unwrap());
        assert!(!repo.phone_exists("+1234567890", Some(user.id)).await.unwrap());
    }

    #[tokio::test]
    async fn update_profile_applies_partial_changes() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@example.com", "+1234567890")).await.unwrap();
        let changes = ProfileChanges {
            first_name: Some("Renamed".into()),
            farm_location: Some("Valley".into()),
            ..Default::default()
        };
        let updated = repo.update_profile(user.id, changes).await.unwrap();
        assert_eq!(updated.first_name, "Renamed");
        assert_eq!(updated.last_name, "Farmer");
        assert_eq!(updated.farm_location.as_deref(), Some("Valley"));
    }

    #[tokio::test]
    async fn update_password_replaces_hash() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@example.com", "+1234567890")).await.unwrap();
        repo.update_password(user.id, "new-hash").await.unwrap();
        let found = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");
    }
}
