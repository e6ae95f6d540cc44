use chrono::{DateTime, Utc};
use domain_catalog::ProductSummary;
use serde::Serialize;
use utoipa::ToSchema;

/// Whether a toggle created or removed the favorite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoriteEntry {
    pub id: i32,
    pub product: ProductSummary,
    pub created_at: DateTime<Utc>,
}
