use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, TransactionTrait,
    Value,
};
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{
    Category, DashboardStats, NewProduct, ProductChanges, ProductDetail, ProductFilters,
    ProductImage, ProductPage, ProductStatus, ProductSummary, SortKey, Subcategory, Unit,
};
use crate::repository::CatalogRepository;

pub struct PostgresCatalogRepository {
    db: DatabaseConnection,
}

impl PostgresCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn order_clause(key: SortKey) -> &'static str {
    match key {
        SortKey::PriceAsc => "p.price ASC",
        SortKey::PriceDesc => "p.price DESC",
        SortKey::NameAsc => "p.name ASC",
        SortKey::NameDesc => "p.name DESC",
        SortKey::CreatedAsc => "p.created_at ASC",
        SortKey::CreatedDesc => "p.created_at DESC",
    }
}

/// Accumulates `AND`-joined conditions with positional parameters.
struct FilterClause {
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl FilterClause {
    fn new() -> Self {
        Self {
            conditions: vec!["p.status = 'available'".to_string()],
            values: Vec::new(),
        }
    }

    fn push(&mut self, template: &str, value: impl Into<Value>) {
        self.values.push(value.into());
        let position = self.values.len();
        self.conditions.push(template.replace("$?", &format!("${position}")));
    }

    fn from_filters(filters: &ProductFilters) -> Self {
        let mut clause = Self::new();
        if let Some(category) = filters.category {
            clause.push("p.category_id = $?", category);
        }
        if let Some(subcategory) = filters.subcategory {
            clause.push("p.subcategory_id = $?", subcategory);
        }
        if let Some(location) = &filters.location {
            clause.push("p.location ILIKE $?", like_pattern(location));
        }
        if let Some(organic) = filters.organic {
            clause.push("p.organic = $?", organic);
        }
        if let Some(farmer) = filters.farmer {
            clause.push("p.farmer_id = $?", farmer);
        }
        if let Some(search) = &filters.search {
            clause.push_search(like_pattern(search));
        }
        clause
    }

    // one pattern shared by all three searched columns
    fn push_search(&mut self, pattern: String) {
        self.values.push(pattern.into());
        let position = self.values.len();
        self.conditions.push(format!(
            "(p.name ILIKE ${position} OR p.description ILIKE ${position} \
             OR c.name ILIKE ${position})"
        ));
    }

    fn where_sql(&self) -> String {
        self.conditions.join(" AND ")
    }
}

const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.unit, \
     p.quantity_available, \
     COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) AS farmer_name, \
     c.name AS category_name, s.name AS subcategory_name, p.location, p.organic, \
     p.is_featured, p.status, \
     (SELECT pi.image FROM product_images pi \
      WHERE pi.product_id = p.id AND pi.is_primary ORDER BY pi.id LIMIT 1) AS primary_image, \
     p.created_at \
     FROM products p \
     JOIN users u ON u.id = p.farmer_id \
     JOIN categories c ON c.id = p.category_id \
     LEFT JOIN subcategories s ON s.id = p.subcategory_id";

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
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

impl TryFrom<SummaryRow> for ProductSummary {
    type Error = CatalogError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(ProductSummary {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            unit: parse_unit(&row.unit)?,
            quantity_available: row.quantity_available,
            farmer_name: row.farmer_name,
            category_name: row.category_name,
            subcategory_name: row.subcategory_name,
            location: row.location,
            organic: row.organic,
            is_featured: row.is_featured,
            status: parse_status(&row.status)?,
            primary_image: row.primary_image,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct DetailRow {
    id: i32,
    name: String,
    description: String,
    price: f64,
    unit: String,
    quantity_available: f64,
    min_order_quantity: f64,
    harvest_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    organic: bool,
    location: String,
    status: String,
    farmer_name: String,
    farmer_phone: String,
    category_name: String,
    subcategory_name: Option<String>,
    is_favorited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
struct ImageRow {
    id: i32,
    image: String,
    is_primary: bool,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct NameRow {
    name: String,
}

#[derive(Debug, FromQueryResult)]
struct StatsRow {
    total_products: i64,
    available_products: i64,
    out_of_stock: i64,
    featured_products: i64,
    organic_products: i64,
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
    is_active: bool,
}

#[derive(Debug, FromQueryResult)]
struct SubcategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    category: i32,
    category_name: String,
    is_active: bool,
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: i32,
}

#[derive(Debug, FromQueryResult)]
struct CategoryPairRow {
    category_id: i32,
    subcategory_id: Option<i32>,
}

fn parse_unit(value: &str) -> Result<Unit, CatalogError> {
    Unit::parse(value).ok_or_else(|| CatalogError::Internal(format!("unknown unit '{value}'")))
}

fn parse_status(value: &str) -> Result<ProductStatus, CatalogError> {
    ProductStatus::parse(value)
        .ok_or_else(|| CatalogError::Internal(format!("unknown product status '{value}'")))
}

impl PostgresCatalogRepository {
    async fn summaries(
        &self,
        where_sql: &str,
        order_sql: &str,
        limit_sql: &str,
        values: Vec<Value>,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("{SUMMARY_SELECT} WHERE {where_sql} ORDER BY {order_sql}{limit_sql}"),
            values,
        );
        SummaryRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(ProductSummary::try_from)
            .collect()
    }

    async fn attach_images<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        images: &[String],
        first_is_primary: bool,
    ) -> Result<(), CatalogError> {
        for (index, image) in images.iter().enumerate() {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                "INSERT INTO product_images (product_id, image, is_primary) VALUES ($1, $2, $3)",
                [
                    product_id.into(),
                    image.clone().into(),
                    (first_is_primary && index == 0).into(),
                ],
            );
            conn.execute_raw(stmt).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT id, name, description, image, is_active FROM categories \
             WHERE is_active ORDER BY id",
        );
        let rows = CategoryRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: r.id,
                name: r.name,
                description: r.description,
                image: r.image,
                is_active: r.is_active,
            })
            .collect())
    }

    async fn list_subcategories(&self, category_id: i32) -> Result<Vec<Subcategory>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT s.id, s.name, s.description, s.category_id AS category, \
             c.name AS category_name, s.is_active \
             FROM subcategories s JOIN categories c ON c.id = s.category_id \
             WHERE s.category_id = $1 AND s.is_active ORDER BY s.id",
            [category_id.into()],
        );
        let rows = SubcategoryRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|r| Subcategory {
                id: r.id,
                name: r.name,
                description: r.description,
                category: r.category,
                category_name: r.category_name,
                is_active: r.is_active,
            })
            .collect())
    }

    async fn category_exists(&self, id: i32) -> Result<bool, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS count FROM categories WHERE id = $1",
            [id.into()],
        );
        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|r| r.count > 0))
    }

    async fn subcategory_in_category(
        &self,
        subcategory_id: i32,
        category_id: i32,
    ) -> Result<bool, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS count FROM subcategories WHERE id = $1 AND category_id = $2",
            [subcategory_id.into(), category_id.into()],
        );
        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|r| r.count > 0))
    }

    async fn list_products(&self, filters: &ProductFilters) -> Result<ProductPage, CatalogError> {
        let clause = FilterClause::from_filters(filters);
        let where_sql = clause.where_sql();

        let count_stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT COUNT(*) AS count FROM products p \
                 JOIN categories c ON c.id = p.category_id WHERE {where_sql}"
            ),
            clause.values.clone(),
        );
        let count = CountRow::find_by_statement(count_stmt)
            .one(&self.db)
            .await?
            .map(|r| r.count as u64)
            .unwrap_or(0);

        let page = filters.page();
        let page_size = filters.page_size();
        let offset = (page - 1) * page_size;
        let limit_sql = format!(" LIMIT {page_size} OFFSET {offset}");

        let products = self
            .summaries(&where_sql, order_clause(filters.sort_key()), &limit_sql, clause.values)
            .await?;

        Ok(ProductPage {
            products,
            count,
            page,
            page_size,
            total_pages: count.div_ceil(page_size).max(1),
        })
    }

    async fn find_product(
        &self,
        id: i32,
        viewer: Option<Uuid>,
    ) -> Result<Option<ProductDetail>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT p.id, p.name, p.description, p.price, p.unit, p.quantity_available, \
             p.min_order_quantity, p.harvest_date, p.expiry_date, p.organic, p.location, \
             p.status, \
             COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) \
               AS farmer_name, \
             u.phone AS farmer_phone, c.name AS category_name, s.name AS subcategory_name, \
             EXISTS(SELECT 1 FROM favorites f WHERE f.product_id = p.id AND f.user_id = $2) \
               AS is_favorited, \
             p.created_at, p.updated_at \
             FROM products p \
             JOIN users u ON u.id = p.farmer_id \
             JOIN categories c ON c.id = p.category_id \
             LEFT JOIN subcategories s ON s.id = p.subcategory_id \
             WHERE p.id = $1",
            [id.into(), viewer.into()],
        );
        let Some(row) = DetailRow::find_by_statement(stmt).one(&self.db).await? else {
            return Ok(None);
        };

        let images_stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, image, is_primary FROM product_images WHERE product_id = $1 ORDER BY id",
            [id.into()],
        );
        let images = ImageRow::find_by_statement(images_stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| ProductImage {
                id: r.id,
                image: r.image,
                is_primary: r.is_primary,
            })
            .collect();

        Ok(Some(ProductDetail {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            unit: parse_unit(&row.unit)?,
            quantity_available: row.quantity_available,
            min_order_quantity: row.min_order_quantity,
            harvest_date: row.harvest_date,
            expiry_date: row.expiry_date,
            organic: row.organic,
            location: row.location,
            status: parse_status(&row.status)?,
            farmer_name: row.farmer_name,
            farmer_phone: row.farmer_phone,
            category_name: row.category_name,
            subcategory_name: row.subcategory_name,
            images,
            is_favorited: row.is_favorited,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    async fn list_featured(&self) -> Result<Vec<ProductSummary>, CatalogError> {
        self.summaries(
            "p.status = 'available' AND p.is_featured",
            "p.created_at DESC",
            "",
            vec![],
        )
        .await
    }

    async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<ProductSummary>, CatalogError> {
        self.summaries("p.farmer_id = $1", "p.created_at DESC", "", vec![farmer_id.into()])
            .await
    }

    async fn create_product(&self, product: NewProduct) -> Result<i32, CatalogError> {
        let txn = self.db.begin().await?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO products (farmer_id, category_id, subcategory_id, name, description, \
             price, unit, quantity_available, min_order_quantity, harvest_date, expiry_date, \
             organic, location, status, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'available', FALSE) \
             RETURNING id",
            [
                product.farmer_id.into(),
                product.category_id.into(),
                product.subcategory_id.into(),
                product.name.into(),
                product.description.into(),
                product.price.into(),
                product.unit.as_str().into(),
                product.quantity_available.into(),
                product.min_order_quantity.into(),
                product.harvest_date.into(),
                product.expiry_date.into(),
                product.organic.into(),
                product.location.into(),
            ],
        );
        let row = IdRow::find_by_statement(stmt)
            .one(&txn)
            .await?
            .ok_or_else(|| CatalogError::Database("insert returned no row".to_string()))?;

        Self::attach_images(&txn, row.id, &product.images, true).await?;
        txn.commit().await?;
        Ok(row.id)
    }

    async fn update_product(
        &self,
        farmer_id: Uuid,
        id: i32,
        changes: ProductChanges,
    ) -> Result<bool, CatalogError> {
        let txn = self.db.begin().await?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE products SET \
             name = COALESCE($3, name), \
             description = COALESCE($4, description), \
             price = COALESCE($5, price), \
             unit = COALESCE($6, unit), \
             quantity_available = COALESCE($7, quantity_available), \
             min_order_quantity = COALESCE($8, min_order_quantity), \
             harvest_date = COALESCE($9, harvest_date), \
             expiry_date = COALESCE($10, expiry_date), \
             organic = COALESCE($11, organic), \
             location = COALESCE($12, location), \
             category_id = COALESCE($13, category_id), \
             subcategory_id = COALESCE($14, subcategory_id), \
             updated_at = NOW() \
             WHERE id = $1 AND farmer_id = $2",
            [
                id.into(),
                farmer_id.into(),
                changes.name.into(),
                changes.description.into(),
                changes.price.into(),
                changes.unit.map(|u| u.as_str().to_string()).into(),
                changes.quantity_available.into(),
                changes.min_order_quantity.into(),
                changes.harvest_date.into(),
                changes.expiry_date.into(),
                changes.organic.into(),
                changes.location.into(),
                changes.category_id.into(),
                changes.subcategory_id.into(),
            ],
        );
        let result = txn.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            txn.rollback().await?;
            return Ok(false);
        }
        Self::attach_images(&txn, id, &changes.images, false).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn delete_product(&self, farmer_id: Uuid, id: i32) -> Result<bool, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM products WHERE id = $1 AND farmer_id = $2",
            [id.into(), farmer_id.into()],
        );
        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn product_category_pair(
        &self,
        farmer_id: Uuid,
        id: i32,
    ) -> Result<Option<(i32, Option<i32>)>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT category_id, subcategory_id FROM products WHERE id = $1 AND farmer_id = $2",
            [id.into(), farmer_id.into()],
        );
        let row = CategoryPairRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| (r.category_id, r.subcategory_id)))
    }

    async fn farmer_stats(&self, farmer_id: Uuid) -> Result<DashboardStats, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS total_products, \
             COUNT(*) FILTER (WHERE status = 'available') AS available_products, \
             COUNT(*) FILTER (WHERE status = 'out_of_stock') AS out_of_stock, \
             COUNT(*) FILTER (WHERE is_featured) AS featured_products, \
             COUNT(*) FILTER (WHERE organic) AS organic_products \
             FROM products WHERE farmer_id = $1",
            [farmer_id.into()],
        );
        let row = StatsRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::Database("stats query returned no row".to_string()))?;
        Ok(DashboardStats {
            total_products: row.total_products as u64,
            available_products: row.available_products as u64,
            out_of_stock: row.out_of_stock as u64,
            featured_products: row.featured_products as u64,
            organic_products: row.organic_products as u64,
        })
    }

    async fn product_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT name FROM products \
                 WHERE status = 'available' AND (name ILIKE $1 OR description ILIKE $1) \
                 ORDER BY created_at DESC LIMIT {limit}"
            ),
            [like_pattern(query).into()],
        );
        let rows = NameRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }

    async fn category_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT name FROM categories \
                 WHERE is_active AND name ILIKE $1 ORDER BY id LIMIT {limit}"
            ),
            [like_pattern(query).into()],
        );
        let rows = NameRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("10%"), "%10\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn filter_clause_numbers_parameters_in_order() {
        let filters = ProductFilters {
            category: Some(1),
            location: Some("pune".to_string()),
            search: Some("spin".to_string()),
            ..Default::default()
        };
        let clause = FilterClause::from_filters(&filters);
        let sql = clause.where_sql();
        assert!(sql.starts_with("p.status = 'available'"));
        assert!(sql.contains("p.category_id = $1"));
        assert!(sql.contains("p.location ILIKE $2"));
        assert!(sql.contains("p.name ILIKE $3 OR p.description ILIKE $3 OR c.name ILIKE $3"));
        assert_eq!(clause.values.len(), 3);
    }

    #[test]
    fn empty_filters_only_scope_status() {
        let clause = FilterClause::from_filters(&ProductFilters::default());
        assert_eq!(clause.where_sql(), "p.status = 'available'");
        assert!(clause.values.is_empty());
    }
}
