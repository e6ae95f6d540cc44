pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::ContactError;
pub use handlers::{ApiDoc, ContactState};
pub use models::{ContactSubject, NewContactMessage};
pub use postgres::PostgresContactRepository;
pub use repository::{ContactRepository, InMemoryContactRepository};
pub use service::ContactService;
