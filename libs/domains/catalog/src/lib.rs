pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::CatalogError;
pub use handlers::{ApiDoc, CatalogState};
pub use models::{
    Category, DashboardStats, ProductDetail, ProductFilters, ProductStatus, ProductSummary,
    SortKey, Subcategory, Unit,
};
pub use postgres::PostgresCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::CatalogService;
