use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{
    Category, DashboardStats, NewProduct, ProductChanges, ProductDetail, ProductFilters,
    ProductImage, ProductPage, ProductStatus, ProductSummary, SortKey, Subcategory, Unit,
};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;
    async fn list_subcategories(&self, category_id: i32) -> Result<Vec<Subcategory>, CatalogError>;
    async fn category_exists(&self, id: i32) -> Result<bool, CatalogError>;
    async fn subcategory_in_category(
        &self,
        subcategory_id: i32,
        category_id: i32,
    ) -> Result<bool, CatalogError>;

    async fn list_products(&self, filters: &ProductFilters) -> Result<ProductPage, CatalogError>;
    async fn find_product(
        &self,
        id: i32,
        viewer: Option<Uuid>,
    ) -> Result<Option<ProductDetail>, CatalogError>;
    async fn list_featured(&self) -> Result<Vec<ProductSummary>, CatalogError>;
    async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<ProductSummary>, CatalogError>;

    async fn create_product(&self, product: NewProduct) -> Result<i32, CatalogError>;
    /// Scoped to the owner. Returns false when no row matched, which
    /// covers both a missing id and another farmer's product.
    async fn update_product(
        &self,
        farmer_id: Uuid,
        id: i32,
        changes: ProductChanges,
    ) -> Result<bool, CatalogError>;
    async fn delete_product(&self, farmer_id: Uuid, id: i32) -> Result<bool, CatalogError>;
    /// Current (category, subcategory) of an owner-scoped product, None
    /// when the id does not resolve within the farmer's own rows.
    async fn product_category_pair(
        &self,
        farmer_id: Uuid,
        id: i32,
    ) -> Result<Option<(i32, Option<i32>)>, CatalogError>;

    async fn farmer_stats(&self, farmer_id: Uuid) -> Result<DashboardStats, CatalogError>;
    async fn product_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError>;
    async fn category_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError>;
}

#[derive(Debug, Clone)]
struct ProductRecord {
    id: i32,
    farmer_id: Uuid,
    farmer_name: String,
    farmer_phone: String,
    category_id: i32,
    subcategory_id: Option<i32>,
    name: String,
    description: String,
    price: f64,
    unit: Unit,
    quantity_available: f64,
    min_order_quantity: f64,
    harvest_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    organic: bool,
    location: String,
    status: ProductStatus,
    is_featured: bool,
    images: Vec<ProductImage>,
    favorited_by: HashSet<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    categories: HashMap<i32, Category>,
    subcategories: HashMap<i32, Subcategory>,
    products: HashMap<i32, ProductRecord>,
    farmers: HashMap<Uuid, (String, String)>,
    next_product_id: i32,
    next_image_id: i32,
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_category(&self, id: i32, name: &str, is_active: bool) {
        self.store.write().await.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                description: None,
                image: None,
                is_active,
            },
        );
    }

    pub async fn seed_subcategory(&self, id: i32, category_id: i32, name: &str, is_active: bool) {
        let mut store = self.store.write().await;
        let category_name = store
            .categories
            .get(&category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        store.subcategories.insert(
            id,
            Subcategory {
                id,
                name: name.to_string(),
                description: None,
                category: category_id,
                category_name,
                is_active,
            },
        );
    }

    pub async fn seed_farmer(&self, id: Uuid, name: &str, phone: &str) {
        self.store
            .write()
            .await
            .farmers
            .insert(id, (name.to_string(), phone.to_string()));
    }

    pub async fn set_status(&self, product_id: i32, status: ProductStatus) {
        if let Some(record) = self.store.write().await.products.get_mut(&product_id) {
            record.status = status;
        }
    }

    pub async fn set_featured(&self, product_id: i32, featured: bool) {
        if let Some(record) = self.store.write().await.products.get_mut(&product_id) {
            record.is_featured = featured;
        }
    }

    pub async fn mark_favorited(&self, product_id: i32, user_id: Uuid) {
        if let Some(record) = self.store.write().await.products.get_mut(&product_id) {
            record.favorited_by.insert(user_id);
        }
    }
}

fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(store: &Store, record: &ProductRecord, filters: &ProductFilters) -> bool {
    if record.status != ProductStatus::Available {
        return false;
    }
    if let Some(category) = filters.category
        && record.category_id != category
    {
        return false;
    }
    if let Some(subcategory) = filters.subcategory
        && record.subcategory_id != Some(subcategory)
    {
        return false;
    }
    if let Some(location) = &filters.location
        && !icontains(&record.location, location)
    {
        return false;
    }
    if let Some(organic) = filters.organic
        && record.organic != organic
    {
        return false;
    }
    if let Some(farmer) = filters.farmer
        && record.farmer_id != farmer
    {
        return false;
    }
    if let Some(search) = &filters.search {
        let category_name = store
            .categories
            .get(&record.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        if !icontains(&record.name, search)
            && !icontains(&record.description, search)
            && !icontains(category_name, search)
        {
            return false;
        }
    }
    true
}

fn sort_records(records: &mut [&ProductRecord], key: SortKey) {
    match key {
        SortKey::PriceAsc => records.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => records.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::NameAsc => records.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::NameDesc => records.sort_by(|a, b| b.name.cmp(&a.name)),
        SortKey::CreatedAsc => records.sort_by_key(|r| r.created_at),
        SortKey::CreatedDesc => records.sort_by_key(|r| std::cmp::Reverse(r.created_at)),
    }
}

fn summarize(store: &Store, record: &ProductRecord) -> ProductSummary {
    ProductSummary {
        id: record.id,
        name: record.name.clone(),
        description: record.description.clone(),
        price: record.price,
        unit: record.unit,
        quantity_available: record.quantity_available,
        farmer_name: record.farmer_name.clone(),
        category_name: store
            .categories
            .get(&record.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        subcategory_name: record
            .subcategory_id
            .and_then(|id| store.subcategories.get(&id))
            .map(|s| s.name.clone()),
        location: record.location.clone(),
        organic: record.organic,
        is_featured: record.is_featured,
        status: record.status,
        primary_image: record
            .images
            .iter()
            .find(|i| i.is_primary)
            .map(|i| i.image.clone()),
        created_at: record.created_at,
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let store = self.store.read().await;
        let mut categories: Vec<Category> = store
            .categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn list_subcategories(&self, category_id: i32) -> Result<Vec<Subcategory>, CatalogError> {
        let store = self.store.read().await;
        let mut subcategories: Vec<Subcategory> = store
            .subcategories
            .values()
            .filter(|s| s.category == category_id && s.is_active)
            .cloned()
            .collect();
        subcategories.sort_by_key(|s| s.id);
        Ok(subcategories)
    }

    async fn category_exists(&self, id: i32) -> Result<bool, CatalogError> {
        Ok(self.store.read().await.categories.contains_key(&id))
    }

    async fn subcategory_in_category(
        &self,
        subcategory_id: i32,
        category_id: i32,
    ) -> Result<bool, CatalogError> {
        Ok(self
            .store
            .read()
            .await
            .subcategories
            .get(&subcategory_id)
            .is_some_and(|s| s.category == category_id))
    }

    async fn list_products(&self, filters: &ProductFilters) -> Result<ProductPage, CatalogError> {
        let store = self.store.read().await;
        let mut records: Vec<&ProductRecord> = store
            .products
            .values()
            .filter(|r| matches(&store, r, filters))
            .collect();
        sort_records(&mut records, filters.sort_key());

        let count = records.len() as u64;
        let page = filters.page();
        let page_size = filters.page_size();
        let total_pages = count.div_ceil(page_size).max(1);
        let offset = ((page - 1) * page_size) as usize;

        let products = records
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .map(|r| summarize(&store, r))
            .collect();

        Ok(ProductPage {
            products,
            count,
            page,
            page_size,
            total_pages,
        })
    }

    async fn find_product(
        &self,
        id: i32,
        viewer: Option<Uuid>,
    ) -> Result<Option<ProductDetail>, CatalogError> {
        let store = self.store.read().await;
        let Some(record) = store.products.get(&id) else {
            return Ok(None);
        };
        Ok(Some(ProductDetail {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            price: record.price,
            unit: record.unit,
            quantity_available: record.quantity_available,
            min_order_quantity: record.min_order_quantity,
            harvest_date: record.harvest_date,
            expiry_date: record.expiry_date,
            organic: record.organic,
            location: record.location.clone(),
            status: record.status,
            farmer_name: record.farmer_name.clone(),
            farmer_phone: record.farmer_phone.clone(),
            category_name: store
                .categories
                .get(&record.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            subcategory_name: record
                .subcategory_id
                .and_then(|sid| store.subcategories.get(&sid))
                .map(|s| s.name.clone()),
            images: record.images.clone(),
            is_favorited: viewer.is_some_and(|v| record.favorited_by.contains(&v)),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }))
    }

    async fn list_featured(&self) -> Result<Vec<ProductSummary>, CatalogError> {
        let store = self.store.read().await;
        let mut records: Vec<&ProductRecord> = store
            .products
            .values()
            .filter(|r| r.is_featured && r.status == ProductStatus::Available)
            .collect();
        sort_records(&mut records, SortKey::CreatedDesc);
        Ok(records.into_iter().map(|r| summarize(&store, r)).collect())
    }

    async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<ProductSummary>, CatalogError> {
        let store = self.store.read().await;
        let mut records: Vec<&ProductRecord> = store
            .products
            .values()
            .filter(|r| r.farmer_id == farmer_id)
            .collect();
        sort_records(&mut records, SortKey::CreatedDesc);
        Ok(records.into_iter().map(|r| summarize(&store, r)).collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<i32, CatalogError> {
        let mut store = self.store.write().await;
        store.next_product_id += 1;
        let id = store.next_product_id;
        let (farmer_name, farmer_phone) = store
            .farmers
            .get(&product.farmer_id)
            .cloned()
            .unwrap_or_default();

        let mut images = Vec::with_capacity(product.images.len());
        for (index, image) in product.images.iter().enumerate() {
            store.next_image_id += 1;
            images.push(ProductImage {
                id: store.next_image_id,
                image: image.clone(),
                is_primary: index == 0,
            });
        }

        let now = Utc::now();
        store.products.insert(
            id,
            ProductRecord {
                id,
                farmer_id: product.farmer_id,
                farmer_name,
                farmer_phone,
                category_id: product.category_id,
                subcategory_id: product.subcategory_id,
                name: product.name,
                description: product.description,
                price: product.price,
                unit: product.unit,
                quantity_available: product.quantity_available,
                min_order_quantity: product.min_order_quantity,
                harvest_date: product.harvest_date,
                expiry_date: product.expiry_date,
                organic: product.organic,
                location: product.location,
                status: ProductStatus::Available,
                is_featured: false,
                images,
                favorited_by: HashSet::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_product(
        &self,
        farmer_id: Uuid,
        id: i32,
        changes: ProductChanges,
    ) -> Result<bool, CatalogError> {
        let mut store = self.store.write().await;
        let mut next_image_id = store.next_image_id;
        let Some(record) = store.products.get_mut(&id) else {
            return Ok(false);
        };
        if record.farmer_id != farmer_id {
            return Ok(false);
        }

        if let Some(v) = changes.name {
            record.name = v;
        }
        if let Some(v) = changes.description {
            record.description = v;
        }
        if let Some(v) = changes.price {
            record.price = v;
        }
        if let Some(v) = changes.unit {
            record.unit = v;
        }
        if let Some(v) = changes.quantity_available {
            record.quantity_available = v;
        }
        if let Some(v) = changes.min_order_quantity {
            record.min_order_quantity = v;
        }
        if let Some(v) = changes.harvest_date {
            record.harvest_date = Some(v);
        }
        if let Some(v) = changes.expiry_date {
            record.expiry_date = Some(v);
        }
        if let Some(v) = changes.organic {
            record.organic = v;
        }
        if let Some(v) = changes.location {
            record.location = v;
        }
        if let Some(v) = changes.category_id {
            record.category_id = v;
        }
        if let Some(v) = changes.subcategory_id {
            record.subcategory_id = Some(v);
        }
        // Images added on update are never promoted to primary.
        for image in changes.images {
            next_image_id += 1;
            record.images.push(ProductImage {
                id: next_image_id,
                image,
                is_primary: false,
            });
        }
        record.updated_at = Utc::now();
        store.next_image_id = next_image_id;
        Ok(true)
    }

    async fn delete_product(&self, farmer_id: Uuid, id: i32) -> Result<bool, CatalogError> {
        let mut store = self.store.write().await;
        let owned = store
            .products
            .get(&id)
            .is_some_and(|r| r.farmer_id == farmer_id);
        if owned {
            store.products.remove(&id);
        }
        Ok(owned)
    }

    async fn product_category_pair(
        &self,
        farmer_id: Uuid,
        id: i32,
    ) -> Result<Option<(i32, Option<i32>)>, CatalogError> {
        Ok(self
            .store
            .read()
            .await
            .products
            .get(&id)
            .filter(|r| r.farmer_id == farmer_id)
            .map(|r| (r.category_id, r.subcategory_id)))
    }

    async fn farmer_stats(&self, farmer_id: Uuid) -> Result<DashboardStats, CatalogError> {
        let store = self.store.read().await;
        let own = || store.products.values().filter(|r| r.farmer_id == farmer_id);
        Ok(DashboardStats {
            total_products: own().count() as u64,
            available_products: own()
                .filter(|r| r.status == ProductStatus::Available)
                .count() as u64,
            out_of_stock: own()
                .filter(|r| r.status == ProductStatus::OutOfStock)
                .count() as u64,
            featured_products: own().filter(|r| r.is_featured).count() as u64,
            organic_products: own().filter(|r| r.organic).count() as u64,
        })
    }

    async fn product_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let store = self.store.read().await;
        let mut records: Vec<&ProductRecord> = store
            .products
            .values()
            .filter(|r| {
                r.status == ProductStatus::Available
                    && (icontains(&r.name, query) || icontains(&r.description, query))
            })
            .collect();
        // Newest first, matching the ORDER BY created_at DESC in the
        // Postgres implementation. Id breaks ties for same-instant rows.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().take(limit).map(|r| r.name.clone()).collect())
    }

    async fn category_name_matches(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let store = self.store.read().await;
        let mut categories: Vec<&Category> = store
            .categories
            .values()
            .filter(|c| c.is_active && icontains(&c.name, query))
            .collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories.into_iter().take(limit).map(|c| c.name.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_repo() -> (InMemoryCatalogRepository, Uuid, Uuid) {
        let repo = InMemoryCatalogRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.seed_farmer(alice, "Alice Grower", "+1234567890").await;
        repo.seed_farmer(bob, "Bob Planter", "+1987654321").await;
        repo.seed_category(1, "Vegetables", true).await;
        repo.seed_category(2, "Fruits", true).await;
        repo.seed_category(3, "Dormant", false).await;
        repo.seed_subcategory(1, 1, "Leafy Greens", true).await;
        repo.seed_subcategory(2, 2, "Citrus", true).await;
        (repo, alice, bob)
    }

    fn new_product(farmer_id: Uuid, name: &str, price: f64) -> NewProduct {
        NewProduct {
            farmer_id,
            category_id: 1,
            subcategory_id: Some(1),
            name: name.to_string(),
            description: format!("Fresh {name}"),
            price,
            unit: Unit::Kg,
            quantity_available: 50.0,
            min_order_quantity: 1.0,
            harvest_date: None,
            expiry_date: None,
            organic: false,
            location: "Pune".to_string(),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn categories_list_skips_inactive() {
        let (repo, _, _) = seeded_repo().await;
        let categories = repo.list_categories().await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Vegetables", "Fruits"]);
    }

    #[tokio::test]
    async fn listing_excludes_non_available_products() {
        let (repo, alice, _) = seeded_repo().await;
        let visible = repo.create_product(new_product(alice, "Spinach", 30.0)).await.unwrap();
        let hidden = repo.create_product(new_product(alice, "Kale", 40.0)).await.unwrap();
        let gone = repo.create_product(new_product(alice, "Chard", 20.0)).await.unwrap();
        repo.set_status(hidden, ProductStatus::OutOfStock).await;
        repo.set_status(gone, ProductStatus::Discontinued).await;

        let page = repo.list_products(&ProductFilters::default()).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.products[0].id, visible);
    }

    #[tokio::test]
    async fn unknown_sort_matches_default_order() {
        let (repo, alice, _) = seeded_repo().await;
        for (name, price) in [("A", 3.0), ("B", 1.0), ("C", 2.0)] {
            repo.create_product(new_product(alice, name, price)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let default_order: Vec<i32> = repo
            .list_products(&ProductFilters::default())
            .await
            .unwrap()
            .products
            .iter()
            .map(|p| p.id)
            .collect();
        let bogus_order: Vec<i32> = repo
            .list_products(&ProductFilters {
                sort: Some("popularity".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .products
            .iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(default_order, bogus_order);
        assert_eq!(default_order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn price_sort_orders_ascending() {
        let (repo, alice, _) = seeded_repo().await;
        repo.create_product(new_product(alice, "A", 30.0)).await.unwrap();
        repo.create_product(new_product(alice, "B", 10.0)).await.unwrap();
        repo.create_product(new_product(alice, "C", 20.0)).await.unwrap();

        let page = repo
            .list_products(&ProductFilters {
                sort: Some("price".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let prices: Vec<f64> = page.products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn filters_combine_with_logical_and() {
        let (repo, alice, bob) = seeded_repo().await;
        let mut organic_pune = new_product(alice, "Spinach", 30.0);
        organic_pune.organic = true;
        let target = repo.create_product(organic_pune).await.unwrap();

        let mut organic_nashik = new_product(alice, "Tomato", 25.0);
        organic_nashik.organic = true;
        organic_nashik.location = "Nashik".to_string();
        repo.create_product(organic_nashik).await.unwrap();
        repo.create_product(new_product(bob, "Spinach", 28.0)).await.unwrap();

        let page = repo
            .list_products(&ProductFilters {
                organic: Some(true),
                location: Some("PUNE".to_string()),
                farmer: Some(alice),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.products[0].id, target);
    }

    #[tokio::test]
    async fn search_matches_name_description_and_category() {
        let (repo, alice, _) = seeded_repo().await;
        repo.create_product(new_product(alice, "Spinach", 30.0)).await.unwrap();
        let mut fruit = new_product(alice, "Orange", 60.0);
        fruit.category_id = 2;
        fruit.description = "Juicy citrus".to_string();
        repo.create_product(fruit).await.unwrap();

        let by_category = repo
            .list_products(&ProductFilters {
                search: Some("fruit".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.count, 1);
        assert_eq!(by_category.products[0].name, "Orange");

        let by_description = repo
            .list_products(&ProductFilters {
                search: Some("juicy".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_description.count, 1);
    }

    #[tokio::test]
    async fn suggestion_candidates_newest_first() {
        let (repo, alice, _) = seeded_repo().await;
        repo.create_product(new_product(alice, "Spinach", 30.0)).await.unwrap();
        repo.create_product(new_product(alice, "Baby Spinach", 45.0)).await.unwrap();

        let names = repo.product_name_matches("spinach", 10).await.unwrap();
        assert_eq!(names, vec!["Baby Spinach", "Spinach"]);

        let capped = repo.product_name_matches("spinach", 1).await.unwrap();
        assert_eq!(capped, vec!["Baby Spinach"]);
    }

    #[tokio::test]
    async fn pagination_slices_and_reports_totals() {
        let (repo, alice, _) = seeded_repo().await;
        for i in 0..5 {
            repo.create_product(new_product(alice, &format!("P{i}"), 10.0)).await.unwrap();
        }
        let page = repo
            .list_products(&ProductFilters {
                sort: Some("name".to_string()),
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(page.total_pages, 3);
        let names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P2", "P3"]);
    }

    #[tokio::test]
    async fn first_image_on_create_is_primary() {
        let (repo, alice, _) = seeded_repo().await;
        let mut product = new_product(alice, "Spinach", 30.0);
        product.images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        let id = repo.create_product(product).await.unwrap();

        let detail = repo.find_product(id, None).await.unwrap().unwrap();
        assert_eq!(detail.images.len(), 2);
        assert!(detail.images[0].is_primary);
        assert!(!detail.images[1].is_primary);

        repo.update_product(
            alice,
            id,
            ProductChanges {
                images: vec!["c.jpg".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let detail = repo.find_product(id, None).await.unwrap().unwrap();
        assert_eq!(detail.images.len(), 3);
        assert!(!detail.images[2].is_primary);
    }

    #[tokio::test]
    async fn update_scoped_to_owner() {
        let (repo, alice, bob) = seeded_repo().await;
        let id = repo.create_product(new_product(alice, "Spinach", 30.0)).await.unwrap();

        let touched = repo
            .update_product(
                bob,
                id,
                ProductChanges {
                    price: Some(1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!touched);
        let detail = repo.find_product(id, None).await.unwrap().unwrap();
        assert_eq!(detail.price, 30.0);

        assert!(!repo.delete_product(bob, id).await.unwrap());
        assert!(repo.delete_product(alice, id).await.unwrap());
    }

    #[tokio::test]
    async fn stats_count_independent_conditions() {
        let (repo, alice, bob) = seeded_repo().await;
        let a = repo.create_product(new_product(alice, "A", 10.0)).await.unwrap();
        let mut organic = new_product(alice, "B", 20.0);
        organic.organic = true;
        let b = repo.create_product(organic).await.unwrap();
        repo.create_product(new_product(bob, "C", 30.0)).await.unwrap();

        repo.set_status(a, ProductStatus::OutOfStock).await;
        repo.set_featured(b, true).await;

        let stats = repo.farmer_stats(alice).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_products: 2,
                available_products: 1,
                out_of_stock: 1,
                featured_products: 1,
                organic_products: 1,
            }
        );
    }

    #[tokio::test]
    async fn detail_reports_favorited_for_viewer_only() {
        let (repo, alice, _) = seeded_repo().await;
        let buyer = Uuid::new_v4();
        let id = repo.create_product(new_product(alice, "Spinach", 30.0)).await.unwrap();
        repo.mark_favorited(id, buyer).await;

        let anonymous = repo.find_product(id, None).await.unwrap().unwrap();
        assert!(!anonymous.is_favorited);
        let viewer = repo.find_product(id, Some(buyer)).await.unwrap().unwrap();
        assert!(viewer.is_favorited);
    }
}
