use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_catalog::{ProductStatus, ProductSummary, Unit};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::FavoriteError;
use crate::models::{FavoriteEntry, ToggleOutcome};
use crate::repository::FavoriteRepository;

pub struct PostgresFavoriteRepository {
    db: DatabaseConnection,
}

impl PostgresFavoriteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.unit, \
     p.quantity_available, \
     COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) AS farmer_name, \
     c.name AS category_name, s.name AS subcategory_name, p.location, p.organic, \
     p.is_featured, p.status, \
     (SELECT pi.image FROM product_images pi \
      WHERE pi.product_id = p.id AND pi.is_primary ORDER BY pi.id LIMIT 1) AS primary_image, \
     p.created_at";

const PRODUCT_JOINS: &str = "JOIN users u ON u.id = p.farmer_id \
     JOIN categories c ON c.id = p.category_id \
     LEFT JOIN subcategories s ON s.id = p.subcategory_id";

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: f64,
    unit: String,
    quantity_available: f64,
    farmer_name: String,
    category_name: String,
    subcategory_name: Option<String>,
    location: String,
    organic: bool,
    is_featured: bool,
    status: String,
    primary_image: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for ProductSummary {
    type Error = FavoriteError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(ProductSummary {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            unit: Unit::parse(&row.unit)
                .ok_or_else(|| FavoriteError::Internal(format!("unknown unit '{}'", row.unit)))?,
            quantity_available: row.quantity_available,
            farmer_name: row.farmer_name,
            category_name: row.category_name,
            subcategory_name: row.subcategory_name,
            location: row.location,
            organic: row.organic,
            is_featured: row.is_featured,
            status: ProductStatus::parse(&row.status).ok_or_else(|| {
                FavoriteError::Internal(format!("unknown product status '{}'", row.status))
            })?,
            primary_image: row.primary_image,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct FavoriteRow {
    favorite_id: i32,
    favorited_at: DateTime<Utc>,
    #[sea_orm(nested)]
    product: ProductRow,
}

#[async_trait]
impl FavoriteRepository for PostgresFavoriteRepository {
    async fn find_available_product(
        &self,
        product_id: i32,
    ) -> Result<Option<ProductSummary>, FavoriteError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT {PRODUCT_COLUMNS} FROM products p {PRODUCT_JOINS} \
                 WHERE p.id = $1 AND p.status = 'available'"
            ),
            [product_id.into()],
        );
        ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(ProductSummary::try_from)
            .transpose()
    }

    async fn toggle(
        &self,
        user_id: Uuid,
        product_id: i32,
    ) -> Result<ToggleOutcome, FavoriteError> {
        // The unique (user_id, product_id) pair absorbs concurrent
        // inserts; a conflicting insert falls through to removal.
        let insert = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO favorites (user_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, product_id) DO NOTHING",
            [user_id.into(), product_id.into()],
        );
        let result = self.db.execute_raw(insert).await?;
        if result.rows_affected() > 0 {
            return Ok(ToggleOutcome::Added);
        }

        let delete = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM favorites WHERE user_id = $1 AND product_id = $2",
            [user_id.into(), product_id.into()],
        );
        self.db.execute_raw(delete).await?;
        Ok(ToggleOutcome::Removed)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteEntry>, FavoriteError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT f.id AS favorite_id, f.created_at AS favorited_at, {PRODUCT_COLUMNS} \
                 FROM favorites f \
                 JOIN products p ON p.id = f.product_id {PRODUCT_JOINS} \
                 WHERE f.user_id = $1 ORDER BY f.created_at DESC"
            ),
            [user_id.into()],
        );
        let rows = FavoriteRow::find_by_statement(stmt).all(&self.db).await?;
        rows.into_iter()
            .map(|row| {
                Ok(FavoriteEntry {
                    id: row.favorite_id,
                    created_at: row.favorited_at,
                    product: row.product.try_into()?,
                })
            })
            .collect()
    }
}
