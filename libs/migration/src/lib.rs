pub use sea_orm_migration::prelude::*;

mod m20260810_000000_create_users;
mod m20260810_000001_create_catalog;
mod m20260810_000002_create_favorites;
mod m20260810_000003_create_contact_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000000_create_users::Migration),
            Box::new(m20260810_000001_create_catalog::Migration),
            Box::new(m20260810_000002_create_favorites::Migration),
            Box::new(m20260810_000003_create_contact_messages::Migration),
        ]
    }
}
