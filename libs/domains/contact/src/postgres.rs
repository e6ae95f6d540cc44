use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};

use crate::error::ContactError;
use crate::models::NewContactMessage;
use crate::repository::ContactRepository;

pub struct PostgresContactRepository {
    db: DatabaseConnection,
}

impl PostgresContactRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: i32,
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn create(&self, message: NewContactMessage) -> Result<i32, ContactError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO contact_messages (name, email, phone, subject, message, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            [
                message.name.into(),
                message.email.into(),
                message.phone.into(),
                message.subject.as_str().into(),
                message.message.into(),
                message.user_id.into(),
            ],
        );
        let row = IdRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| ContactError::Database("insert returned no row".to_string()))?;
        Ok(row.id)
    }
}
