use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContactSubject {
    General,
    Support,
    Partnership,
    Complaint,
    Other,
}

impl ContactSubject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Support => "support",
            Self::Partnership => "partnership",
            Self::Complaint => "complaint",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    pub phone: Option<String>,
    pub subject: ContactSubject,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: ContactSubject,
    pub message: String,
    pub user_id: Option<Uuid>,
}
