//! Database connectors for the marketplace services.
//!
//! Provides PostgreSQL (SeaORM) and Redis connection setup with startup
//! retry, plus configuration structs loadable from the environment.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{postgres, redis};
//!
//! let db = postgres::connect_from_config_with_retry(
//!     postgres::PostgresConfig::from_env()?, None).await?;
//! let cache = redis::connect_from_config_with_retry(
//!     redis::RedisConfig::from_env()?, None).await?;
//! ```

pub mod common;
pub mod postgres;
pub mod redis;

pub use common::RetryConfig;
