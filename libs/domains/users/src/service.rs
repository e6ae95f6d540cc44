use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::UserError;
use crate::models::{
    ChangePasswordRequest, NewUser, RegisterRequest, UpdateProfileRequest, User, UserType,
};
use crate::repository::UserRepository;

pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, UserError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| UserError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn field_error(fields: &mut Map<String, Value>, field: &str, message: &str) {
    fields.insert(field.to_string(), json!([message]));
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
        user_type: UserType,
    ) -> Result<User, UserError> {
        let mut fields = Map::new();

        if request.password != request.password_confirm {
            field_error(&mut fields, "password_confirm", "Passwords don't match.");
        }
        if user_type == UserType::Horeca
            && request
                .business_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
        {
            field_error(
                &mut fields,
                "business_name",
                "Business name is required for HoReCa registration.",
            );
        }
        if self.repository.email_exists(&request.email).await? {
            field_error(
                &mut fields,
                "email",
                "This email is already registered. Please try logging in instead.",
            );
        }
        if self.repository.phone_exists(&request.phone, None).await? {
            field_error(&mut fields, "phone", "This phone number is already registered.");
        }
        if !fields.is_empty() {
            return Err(UserError::validation(
                "Registration failed. Please check the errors below.",
                Value::Object(fields),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        self.repository
            .create(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                phone: request.phone,
                password_hash,
                user_type,
                farm_name: request.farm_name,
                farm_location: request.farm_location,
                farm_size: request.farm_size,
                business_name: request.business_name,
                business_type: request.business_type,
                business_address: request.business_address,
            })
            .await
    }

    /// Inactive accounts and unknown emails both fold into the same
    /// credential error so account existence is not revealed.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;
        if !user.is_active || !verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, UserError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<User, UserError> {
        if let Some(phone) = &request.phone
            && self.repository.phone_exists(phone, Some(user_id)).await?
        {
            return Err(UserError::validation(
                "Profile update failed. Please check the errors below.",
                json!({"phone": ["This phone number is already registered."]}),
            ));
        }
        self.repository.update_profile(user_id, request.into()).await
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), UserError> {
        if request.new_password != request.new_password_confirm {
            return Err(UserError::validation(
                "Password change failed. Please check the errors below.",
                json!({"new_password_confirm": ["New passwords don't match."]}),
            ));
        }
        let user = self.get_profile(user_id).await?;
        if !verify_password(&request.old_password, &user.password_hash)? {
            return Err(UserError::validation(
                "Password change failed. Please check the errors below.",
                json!({"old_password": ["Old password is incorrect."]}),
            ));
        }
        let password_hash = hash_password(&request.new_password)?;
        self.repository.update_password(user_id, &password_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn register_request(email: &str, phone: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Test".into(),
            last_name: "User".into(),
            email: email.into(),
            phone: phone.into(),
            password: "correct horse".into(),
            password_confirm: "correct horse".into(),
            farm_name: Some("Field".into()),
            farm_location: None,
            farm_size: None,
            business_name: Some("Bistro".into()),
            business_type: None,
            business_address: None,
        }
    }

    #[tokio::test]
    async fn register_and_authenticate() {
        let service = service();
        let user = service
            .register(register_request("a@example.com", "+1234567890"), UserType::Farmer)
            .await
            .unwrap();
        assert_eq!(user.user_type, UserType::Farmer);
        assert_ne!(user.password_hash, "correct horse");

        let authed = service.authenticate("a@example.com", "correct horse").await.unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let service = service();
        service
            .register(register_request("a@example.com", "+1234567890"), UserType::Farmer)
            .await
            .unwrap();
        let err = service.authenticate("a@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
        let err = service.authenticate("nobody@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn mismatched_passwords_surface_as_field_error() {
        let service = service();
        let mut request = register_request("a@example.com", "+1234567890");
        request.password_confirm = "different".into();
        let err = service.register(request, UserType::Farmer).await.unwrap_err();
        match err {
            UserError::Validation { fields, .. } => {
                assert!(fields.get("password_confirm").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn horeca_requires_business_name() {
        let service = service();
        let mut request = register_request("a@example.com", "+1234567890");
        request.business_name = None;
        let err = service.register(request, UserType::Horeca).await.unwrap_err();
        match err {
            UserError::Validation { fields, .. } => {
                assert_eq!(
                    fields["business_name"][0],
                    "Business name is required for HoReCa registration."
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_gets_friendly_message() {
        let service = service();
        service
            .register(register_request("a@example.com", "+1234567890"), UserType::Farmer)
            .await
            .unwrap();
        let err = service
            .register(register_request("a@example.com", "+1987654321"), UserType::Farmer)
            .await
            .unwrap_err();
        match err {
            UserError::Validation { fields, .. } => {
                assert_eq!(
                    fields["email"][0],
                    "This email is already registered. Please try logging in instead."
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn change_password_checks_old_password() {
        let service = service();
        let user = service
            .register(register_request("a@example.com", "+1234567890"), UserType::Farmer)
            .await
            .unwrap();

        let err = service
            .change_password(
                user.id,
                ChangePasswordRequest {
                    old_password: "wrong".into(),
                    new_password: "another pass".into(),
                    new_password_confirm: "another pass".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation { .. }));

        service
            .change_password(
                user.id,
                ChangePasswordRequest {
                    old_password: "correct horse".into(),
                    new_password: "another pass".into(),
                    new_password_confirm: "another pass".into(),
                },
            )
            .await
            .unwrap();
        service.authenticate("a@example.com", "another pass").await.unwrap();
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_phone() {
        let service = service();
        service
            .register(register_request("a@example.com", "+1234567890"), UserType::Farmer)
            .await
            .unwrap();
        let other = service
            .register(register_request("b@example.com", "+1987654321"), UserType::Farmer)
            .await
            .unwrap();

        let err = service
            .update_profile(
                other.id,
                UpdateProfileRequest {
                    phone: Some("+1234567890".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation { .. }));

        // keeping your own phone is fine
        service
            .update_profile(
                other.id,
                UpdateProfileRequest {
                    phone: Some("+1987654321".into()),
                    first_name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
}
