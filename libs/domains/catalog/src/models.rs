use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    Ton,
    Piece,
    Dozen,
    Bunch,
    Box,
    Bag,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::Ton => "ton",
            Self::Piece => "piece",
            Self::Dozen => "dozen",
            Self::Bunch => "bunch",
            Self::Box => "box",
            Self::Bag => "bag",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "kg" => Some(Self::Kg),
            "g" => Some(Self::G),
            "ton" => Some(Self::Ton),
            "piece" => Some(Self::Piece),
            "dozen" => Some(Self::Dozen),
            "bunch" => Some(Self::Bunch),
            "box" => Some(Self::Box),
            "bag" => Some(Self::Bag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OutOfStock => "out_of_stock",
            Self::Discontinued => "discontinued",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "out_of_stock" => Some(Self::OutOfStock),
            "discontinued" => Some(Self::Discontinued),
            _ => None,
        }
    }
}

/// Allow-listed sort keys. Anything else is silently ignored and the
/// default newest-first ordering applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
}

impl SortKey {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            Some("name") => Self::NameAsc,
            Some("-name") => Self::NameDesc,
            Some("created_at") => Self::CreatedAsc,
            _ => Self::CreatedDesc,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Subcategory {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: i32,
    pub category_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub image: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub unit: Unit,
    pub quantity_available: f64,
    pub farmer_name: String,
    pub category_name: String,
    pub subcategory_name: Option<String>,
    pub location: String,
    pub organic: bool,
    pub is_featured: bool,
    pub status: ProductStatus,
    pub primary_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub unit: Unit,
    pub quantity_available: f64,
    pub min_order_quantity: f64,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub organic: bool,
    pub location: String,
    pub status: ProductStatus,
    pub farmer_name: String,
    pub farmer_phone: String,
    pub category_name: String,
    pub subcategory_name: Option<String>,
    pub images: Vec<ProductImage>,
    pub is_favorited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: f64,
    pub unit: Unit,
    #[validate(range(min = 0.0, message = "Quantity must not be negative."))]
    pub quantity_available: f64,
    #[validate(range(min = 0.0, message = "Minimum order quantity must not be negative."))]
    pub min_order_quantity: Option<f64>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub organic: bool,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
    pub category: i32,
    pub subcategory: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name is required."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: Option<f64>,
    pub unit: Option<Unit>,
    #[validate(range(min = 0.0, message = "Quantity must not be negative."))]
    pub quantity_available: Option<f64>,
    #[validate(range(min = 0.0, message = "Minimum order quantity must not be negative."))]
    pub min_order_quantity: Option<f64>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub organic: Option<bool>,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: Option<String>,
    pub category: Option<i32>,
    pub subcategory: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductFilters {
    pub category: Option<i32>,
    pub subcategory: Option<i32>,
    pub location: Option<String>,
    pub organic: Option<bool>,
    pub farmer: Option<Uuid>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ProductFilters {
    pub fn sort_key(&self) -> SortKey {
        SortKey::parse(self.sort.as_deref())
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_products: u64,
    pub available_products: u64,
    pub out_of_stock: u64,
    pub featured_products: u64,
    pub organic_products: u64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub farmer_id: Uuid,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub unit: Unit,
    pub quantity_available: f64,
    pub min_order_quantity: f64,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub organic: bool,
    pub location: String,
    pub images: Vec<String>,
}

/// Allow-listed mutable fields for an owner-scoped product update.
/// Status and featured flag are managed out of band.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<Unit>,
    pub quantity_available: Option<f64>,
    pub min_order_quantity: Option<f64>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub organic: Option<bool>,
    pub location: Option<String>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_allowlist() {
        assert_eq!(SortKey::parse(Some("price")), SortKey::PriceAsc);
        assert_eq!(SortKey::parse(Some("-price")), SortKey::PriceDesc);
        assert_eq!(SortKey::parse(Some("name")), SortKey::NameAsc);
        assert_eq!(SortKey::parse(Some("-name")), SortKey::NameDesc);
        assert_eq!(SortKey::parse(Some("created_at")), SortKey::CreatedAsc);
        assert_eq!(SortKey::parse(Some("-created_at")), SortKey::CreatedDesc);
    }

    #[test]
    fn unknown_sort_falls_back_to_newest_first() {
        assert_eq!(SortKey::parse(Some("price; DROP TABLE")), SortKey::CreatedDesc);
        assert_eq!(SortKey::parse(Some("")), SortKey::CreatedDesc);
        assert_eq!(SortKey::parse(None), SortKey::CreatedDesc);
    }

    #[test]
    fn page_size_is_clamped() {
        let filters = ProductFilters {
            page_size: Some(1000),
            ..Default::default()
        };
        assert_eq!(filters.page_size(), MAX_PAGE_SIZE);

        let filters = ProductFilters {
            page: Some(0),
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(filters.page(), 1);
        assert_eq!(filters.page_size(), 1);

        assert_eq!(ProductFilters::default().page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
        assert_eq!(ProductStatus::parse("out_of_stock"), Some(ProductStatus::OutOfStock));
        assert_eq!(ProductStatus::parse("sold_out"), None);
    }

    #[test]
    fn unit_round_trips_through_str() {
        for unit in [
            Unit::Kg,
            Unit::G,
            Unit::Ton,
            Unit::Piece,
            Unit::Dozen,
            Unit::Bunch,
            Unit::Box,
            Unit::Bag,
        ] {
            assert_eq!(Unit::parse(unit.as_str()), Some(unit));
        }
    }
}
