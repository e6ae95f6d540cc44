use std::sync::Arc;

use uuid::Uuid;

use crate::error::FavoriteError;
use crate::models::{FavoriteEntry, ToggleOutcome};
use crate::repository::FavoriteRepository;

pub struct FavoriteService<R: FavoriteRepository> {
    repository: Arc<R>,
}

impl<R: FavoriteRepository> Clone for FavoriteService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: FavoriteRepository> FavoriteService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Existing favorites on products that have since gone out of
    /// stock survive; only new additions require availability.
    pub async fn toggle(
        &self,
        user_id: Uuid,
        product_id: i32,
    ) -> Result<ToggleOutcome, FavoriteError> {
        if self
            .repository
            .find_available_product(product_id)
            .await?
            .is_none()
        {
            return Err(FavoriteError::NotFound(
                "Product not found or no longer available.".to_string(),
            ));
        }
        self.repository.toggle(user_id, product_id).await
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteEntry>, FavoriteError> {
        self.repository.list(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryFavoriteRepository;
    use chrono::Utc;
    use domain_catalog::{ProductStatus, ProductSummary, Unit};

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
    async fn even_number_of_toggles_leaves_no_record() {
        let repo = Arc::new(InMemoryFavoriteRepository::new());
        repo.seed_product(summary(1, ProductStatus::Available)).await;
        let service = FavoriteService::new(repo);
        let user = Uuid::new_v4();

        assert_eq!(service.toggle(user, 1).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(service.toggle(user, 1).await.unwrap(), ToggleOutcome::Removed);
        assert!(service.list(user).await.unwrap().is_empty());

        assert_eq!(service.toggle(user, 1).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(service.list(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn toggling_unavailable_product_is_not_found() {
        let repo = Arc::new(InMemoryFavoriteRepository::new());
        repo.seed_product(summary(1, ProductStatus::OutOfStock)).await;
        let service = FavoriteService::new(repo);

        let err = service.toggle(Uuid::new_v4(), 1).await.unwrap_err();
        assert!(matches!(err, FavoriteError::NotFound(_)));
        let err = service.toggle(Uuid::new_v4(), 99).await.unwrap_err();
        assert!(matches!(err, FavoriteError::NotFound(_)));
    }
}
