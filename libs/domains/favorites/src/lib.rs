pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::FavoriteError;
pub use handlers::{ApiDoc, FavoriteState};
pub use models::{FavoriteEntry, ToggleOutcome};
pub use postgres::PostgresFavoriteRepository;
pub use repository::{FavoriteRepository, InMemoryFavoriteRepository};
pub use service::FavoriteService;
