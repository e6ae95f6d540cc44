use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::UserError;
use crate::models::{NewUser, ProfileChanges, User, UserType};
use crate::repository::UserRepository;

pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password_hash: String,
    user_type: String,
    profile_picture: Option<String>,
    is_verified: bool,
    is_active: bool,
    farm_name: Option<String>,
    farm_location: Option<String>,
    farm_size: Option<f64>,
    business_name: Option<String>,
    business_type: Option<String>,
    business_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_type = UserType::parse(&row.user_type)
            .ok_or_else(|| UserError::Internal(format!("unknown user_type '{}'", row.user_type)))?;
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            user_type,
            profile_picture: row.profile_picture,
            is_verified: row.is_verified,
            is_active: row.is_active,
            farm_name: row.farm_name,
            farm_location: row.farm_location,
            farm_size: row.farm_size,
            business_name: row.business_name,
            business_type: row.business_type,
            business_address: row.business_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, password_hash, user_type, \
     profile_picture, is_verified, is_active, farm_name, farm_location, farm_size, \
     business_name, business_type, business_address, created_at, updated_at";

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    found: bool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "INSERT INTO users (id, first_name, last_name, email, phone, password_hash, \
                 user_type, farm_name, farm_location, farm_size, business_name, business_type, \
                 business_address) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING {USER_COLUMNS}"
            ),
            [
                Uuid::new_v4().into(),
                user.first_name.into(),
                user.last_name.into(),
                user.email.into(),
                user.phone.into(),
                user.password_hash.into(),
                user.user_type.as_str().into(),
                user.farm_name.into(),
                user.farm_location.into(),
                user.farm_size.into(),
                user.business_name.into(),
                user.business_type.into(),
                user.business_address.into(),
            ],
        );
        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| UserError::Database("insert returned no row".to_string()))?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"),
            [id.into()],
        );
        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
            [email.into()],
        );
        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS found",
            [email.into()],
        );
        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.found).unwrap_or(false))
    }

    async fn phone_exists(&self, phone: &str, exclude: Option<Uuid>) -> Result<bool, UserError> {
        let stmt = match exclude {
            Some(id) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1 AND id <> $2) AS found",
                [phone.into(), id.into()],
            ),
            None => Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1) AS found",
                [phone.into()],
            ),
        };
        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| r.found).unwrap_or(false))
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "UPDATE users SET \
                 first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 phone = COALESCE($4, phone), \
                 profile_picture = COALESCE($5, profile_picture), \
                 farm_name = COALESCE($6, farm_name), \
                 farm_location = COALESCE($7, farm_location), \
                 farm_size = COALESCE($8, farm_size), \
                 business_name = COALESCE($9, business_name), \
                 business_type = COALESCE($10, business_type), \
                 business_address = COALESCE($11, business_address), \
                 updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {USER_COLUMNS}"
            ),
            [
                id.into(),
                changes.first_name.into(),
                changes.last_name.into(),
                changes.phone.into(),
                changes.profile_picture.into(),
                changes.farm_name.into(),
                changes.farm_location.into(),
                changes.farm_size.into(),
                changes.business_name.into(),
                changes.business_type.into(),
                changes.business_address.into(),
            ],
        );
        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;
        row.try_into()
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
            [id.into(), password_hash.into()],
        );
        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(UserError::NotFound("User not found.".to_string()));
        }
        Ok(())
    }
}
