use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Farmer,
    Horeca,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Horeca => "horeca",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "farmer" => Some(Self::Farmer),
            "horeca" => Some(Self::Horeca),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public profile representation. Identifier is exposed as `uid`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub uid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            uid: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            user_type: user.user_type,
            profile_picture: user.profile_picture,
            is_verified: user.is_verified,
            farm_name: user.farm_name,
            farm_location: user.farm_location,
            farm_size: user.farm_size,
            business_name: user.business_name,
            business_type: user.business_type,
            business_address: user.business_address,
            created_at: user.created_at,
        }
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("Please enter a valid phone number (e.g., +1234567890).".into()))
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 || password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password")
            .with_message("Password must be at least 8 characters long and secure.".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub password_confirm: String,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Only mutable profile fields. Read-only attributes sent by a client
/// are dropped at deserialization time rather than rejected.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required."))]
    pub old_password: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<f64>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub business_address: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            profile_picture: req.profile_picture,
            farm_name: req.farm_name,
            farm_location: req.farm_location,
            farm_size: req.farm_size,
            business_name: req.business_name,
            business_type: req.business_type,
            business_address: req.business_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_regex_accepts_international_numbers() {
        assert!(validate_phone("+1234567890").is_ok());
        assert!(validate_phone("123456789").is_ok());
        assert!(validate_phone("+123456789012345").is_ok());
    }

    #[test]
    fn phone_regex_rejects_malformed_numbers() {
        assert!(validate_phone("12345678").is_err());
        assert!(validate_phone("not-a-phone").is_err());
        assert!(validate_phone("+12 345 678 90").is_err());
    }

    #[test]
    fn password_policy_rejects_short_and_numeric() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("correct horse").is_ok());
    }

    #[test]
    fn user_type_round_trips_through_str() {
        assert_eq!(UserType::parse("farmer"), Some(UserType::Farmer));
        assert_eq!(UserType::parse("horeca"), Some(UserType::Horeca));
        assert_eq!(UserType::parse("admin"), None);
        assert_eq!(UserType::Farmer.as_str(), "farmer");
    }

    #[test]
    fn profile_hides_internal_id() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+1234567890".into(),
            password_hash: "hash".into(),
            user_type: UserType::Farmer,
            profile_picture: None,
            is_verified: false,
            is_active: true,
            farm_name: Some("Green Acres".into()),
            farm_location: None,
            farm_size: None,
            business_name: None,
            business_type: None,
            business_address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = UserProfile::from(user.clone());
        assert_eq!(profile.uid, user.id);
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("uid").is_some());
        assert!(value.get("password_hash").is_none());
        assert!(value.get("business_name").is_none());
    }
}
