use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_catalog::{ProductStatus, ProductSummary};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::FavoriteError;
use crate::models::{FavoriteEntry, ToggleOutcome};

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Only `available` products can be newly favorited.
    async fn find_available_product(
        &self,
        product_id: i32,
    ) -> Result<Option<ProductSummary>, FavoriteError>;
    /// Atomic toggle keyed by (user, product). A concurrent duplicate
    /// insert resolves through the unique pair constraint, never as an
    /// error.
    async fn toggle(
        &self,
        user_id: Uuid,
        product_id: i32,
    ) -> Result<ToggleOutcome, FavoriteError>;
    async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteEntry>, FavoriteError>;
}

#[derive(Default)]
struct Store {
    products: HashMap<i32, ProductSummary>,
    favorites: HashMap<(Uuid, i32), (i32, DateTime<Utc>)>,
    next_id: i32,
}

#[derive(Default)]
pub struct InMemoryFavoriteRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryFavoriteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_product(&self, product: ProductSummary) {
        self.store.write().await.products.insert(product.id, product);
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn find_available_product(
        &self,
        product_id: i32,
    ) -> Result<Option<ProductSummary>, FavoriteError> {
        Ok(self
            .store
            .read()
            .await
            .products
            .get(&product_id)
            .filter(|p| p.status == ProductStatus::Available)
            .cloned())
    }

    async fn toggle(
        &self,
        user_id: Uuid,
        product_id: i32,
    ) -> Result<ToggleOutcome, FavoriteError> {
        let mut store = self.store.write().await;
        let key = (user_id, product_id);
        if store.favorites.remove(&key).is_some() {
            Ok(ToggleOutcome::Removed)
        } else {
            store.next_id += 1;
            let id = store.next_id;
            store.favorites.insert(key, (id, Utc::now()));
            Ok(ToggleOutcome::Added)
        }
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteEntry>, FavoriteError> {
        let store = self.store.read().await;
        let mut entries: Vec<FavoriteEntry> = store
            .favorites
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .filter_map(|((_, product_id), (id, created_at))| {
                store.products.get(product_id).map(|product| FavoriteEntry {
                    id: *id,
                    product: product.clone(),
                    created_at: *created_at,
                })
            })
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_catalog::Unit;

    fn summary(id: i32, status: ProductStatus) -> ProductSummary {
        ProductSummary {
            id,
            name: format!("Product {id}"),
            description: "Fresh".to_string(),
            price: 30.0,
            unit: Unit::Kg,
            quantity_available: 10.0,
            farmer_name: "Alice Grower".to_string(),
            category_name: "Vegetables".to_string(),
            subcategory_name: None,
            location: "Pune".to_string(),
            organic: false,
            is_featured: false,
            status,
            primary_image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn toggle_alternates_between_added_and_removed() {
        let repo = InMemoryFavoriteRepository::new();
        let user = Uuid::new_v4();
        repo.seed_product(summary(1, ProductStatus::Available)).await;

        assert_eq!(repo.toggle(user, 1).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(repo.list(user).await.unwrap().len(), 1);
        assert_eq!(repo.toggle(user, 1).await.unwrap(), ToggleOutcome::Removed);
        assert!(repo.list(user).await.unwrap().is_empty());
        assert_eq!(repo.toggle(user, 1).await.unwrap(), ToggleOutcome::Added);
    }

    #[tokio::test]
    async fn unavailable_products_are_invisible_to_toggle_lookup() {
        let repo = InMemoryFavoriteRepository::new();
        repo.seed_product(summary(1, ProductStatus::OutOfStock)).await;
        repo.seed_product(summary(2, ProductStatus::Available)).await;

        assert!(repo.find_available_product(1).await.unwrap().is_none());
        assert!(repo.find_available_product(2).await.unwrap().is_some());
        assert!(repo.find_available_product(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_user() {
        let repo = InMemoryFavoriteRepository::new();
        let buyer = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.seed_product(summary(1, ProductStatus::Available)).await;
        repo.toggle(buyer, 1).await.unwrap();
        repo.toggle(other, 1).await.unwrap();

        let entries = repo.list(buyer).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product.id, 1);
    }
}
