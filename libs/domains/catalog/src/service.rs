use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{
    Category, CreateProductRequest, DashboardStats, NewProduct, ProductChanges, ProductDetail,
    ProductFilters, ProductPage, ProductSummary, Subcategory, UpdateProductRequest,
};
use crate::repository::CatalogRepository;

const SUGGESTION_PRODUCT_LIMIT: usize = 10;
const SUGGESTION_CATEGORY_LIMIT: usize = 5;
const SUGGESTION_TOTAL_LIMIT: usize = 10;

pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.repository.list_categories().await
    }

    pub async fn list_subcategories(
        &self,
        category_id: i32,
    ) -> Result<Vec<Subcategory>, CatalogError> {
        self.repository.list_subcategories(category_id).await
    }

    pub async fn list_products(
        &self,
        filters: &ProductFilters,
    ) -> Result<ProductPage, CatalogError> {
        self.repository.list_products(filters).await
    }

    pub async fn product_detail(
        &self,
        id: i32,
        viewer: Option<Uuid>,
    ) -> Result<ProductDetail, CatalogError> {
        self.repository
            .find_product(id, viewer)
            .await?
            .ok_or_else(|| CatalogError::NotFound("Product not found.".to_string()))
    }

    pub async fn featured_products(&self) -> Result<Vec<ProductSummary>, CatalogError> {
        self.repository.list_featured().await
    }

    pub async fn my_products(&self, farmer_id: Uuid) -> Result<Vec<ProductSummary>, CatalogError> {
        self.repository.list_by_farmer(farmer_id).await
    }

    async fn check_category_pair(
        &self,
        message: &str,
        category_id: i32,
        subcategory_id: Option<i32>,
    ) -> Result<(), CatalogError> {
        if !self.repository.category_exists(category_id).await? {
            return Err(CatalogError::validation(
                message,
                json!({"category": ["Invalid category."]}),
            ));
        }
        if let Some(subcategory_id) = subcategory_id
            && !self
                .repository
                .subcategory_in_category(subcategory_id, category_id)
                .await?
        {
            return Err(CatalogError::validation(
                message,
                json!({"subcategory": ["Subcategory does not belong to the selected category."]}),
            ));
        }
        Ok(())
    }

    pub async fn create_product(
        &self,
        farmer_id: Uuid,
        request: CreateProductRequest,
    ) -> Result<ProductDetail, CatalogError> {
        self.check_category_pair(
            "Product creation failed. Please check the errors below.",
            request.category,
            request.subcategory,
        )
        .await?;
        let id = self
            .repository
            .create_product(NewProduct {
                farmer_id,
                category_id: request.category,
                subcategory_id: request.subcategory,
                name: request.name,
                description: request.description,
                price: request.price,
                unit: request.unit,
                quantity_available: request.quantity_available,
                min_order_quantity: request.min_order_quantity.unwrap_or(1.0),
                harvest_date: request.harvest_date,
                expiry_date: request.expiry_date,
                organic: request.organic,
                location: request.location,
                images: request.images,
            })
            .await?;
        self.product_detail(id, None).await
    }

    pub async fn update_product(
        &self,
        farmer_id: Uuid,
        id: i32,
        request: UpdateProductRequest,
    ) -> Result<ProductDetail, CatalogError> {
        if request.category.is_some() || request.subcategory.is_some() {
            // Validate the pair the row will hold after the patch, so a
            // category change cannot strand the existing subcategory.
            let (category_id, subcategory_id) = match (request.category, request.subcategory) {
                (Some(category_id), Some(subcategory_id)) => (category_id, Some(subcategory_id)),
                (category, subcategory) => {
                    let (current_category, current_subcategory) = self
                        .repository
                        .product_category_pair(farmer_id, id)
                        .await?
                        .ok_or_else(|| {
                            CatalogError::NotFound(
                                "Product not found or you don't have permission to update it."
                                    .to_string(),
                            )
                        })?;
                    (
                        category.unwrap_or(current_category),
                        subcategory.or(current_subcategory),
                    )
                }
            };
            self.check_category_pair(
                "Product update failed. Please check the errors below.",
                category_id,
                subcategory_id,
            )
            .await?;
        }

        let updated = self
            .repository
            .update_product(
                farmer_id,
                id,
                ProductChanges {
                    name: request.name,
                    description: request.description,
                    price: request.price,
                    unit: request.unit,
                    quantity_available: request.quantity_available,
                    min_order_quantity: request.min_order_quantity,
                    harvest_date: request.harvest_date,
                    expiry_date: request.expiry_date,
                    organic: request.organic,
                    location: request.location,
                    category_id: request.category,
                    subcategory_id: request.subcategory,
                    images: request.images,
                },
            )
            .await?;
        if !updated {
            return Err(CatalogError::NotFound(
                "Product not found or you don't have permission to update it.".to_string(),
            ));
        }
        self.product_detail(id, None).await
    }

    pub async fn delete_product(&self, farmer_id: Uuid, id: i32) -> Result<(), CatalogError> {
        if self.repository.delete_product(farmer_id, id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(
                "Product not found or you don't have permission to delete it.".to_string(),
            ))
        }
    }

    pub async fn dashboard_stats(&self, farmer_id: Uuid) -> Result<DashboardStats, CatalogError> {
        self.repository.farmer_stats(farmer_id).await
    }

    /// Autocomplete over product and category names. Queries shorter
    /// than two characters return an empty list instead of an error.
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, CatalogError> {
        if query.chars().count() < 2 {
            return Ok(Vec::new());
        }
        let mut suggestions = self
            .repository
            .product_name_matches(query, SUGGESTION_PRODUCT_LIMIT)
            .await?;
        suggestions.extend(
            self.repository
                .category_name_matches(query, SUGGESTION_CATEGORY_LIMIT)
                .await?,
        );
        suggestions.truncate(SUGGESTION_TOTAL_LIMIT);
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;
    use crate::repository::InMemoryCatalogRepository;

    async fn seeded_service() -> (CatalogService<InMemoryCatalogRepository>, Uuid) {
        let repo = InMemoryCatalogRepository::new();
        let farmer = Uuid::new_v4();
        repo.seed_farmer(farmer, "Alice Grower", "+1234567890").await;
        repo.seed_category(1, "Vegetables", true).await;
        repo.seed_category(2, "Fruits", true).await;
        repo.seed_subcategory(1, 1, "Leafy Greens", true).await;
        (CatalogService::new(Arc::new(repo)), farmer)
    }

    fn create_request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: format!("Fresh {name}"),
            price: 30.0,
            unit: Unit::Kg,
            quantity_available: 50.0,
            min_order_quantity: None,
            harvest_date: None,
            expiry_date: None,
            organic: false,
            location: "Pune".to_string(),
            category: 1,
            subcategory: Some(1),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn create_defaults_min_order_quantity() {
        let (service, farmer) = seeded_service().await;
        let detail = service.create_product(farmer, create_request("Spinach")).await.unwrap();
        assert_eq!(detail.min_order_quantity, 1.0);
        assert_eq!(detail.category_name, "Vegetables");
        assert_eq!(detail.subcategory_name.as_deref(), Some("Leafy Greens"));
    }

    #[tokio::test]
    async fn create_rejects_mismatched_subcategory() {
        let (service, farmer) = seeded_service().await;
        let mut request = create_request("Orange");
        request.category = 2;
        request.subcategory = Some(1);
        let err = service.create_product(farmer, request).await.unwrap_err();
        match err {
            CatalogError::Validation { fields, .. } => {
                assert!(fields.get("subcategory").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let (service, farmer) = seeded_service().await;
        let mut request = create_request("Spinach");
        request.category = 99;
        request.subcategory = None;
        let err = service.create_product(farmer, request).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_of_foreign_product_reads_as_not_found() {
        let (service, farmer) = seeded_service().await;
        let detail = service.create_product(farmer, create_request("Spinach")).await.unwrap();

        let stranger = Uuid::new_v4();
        let err = service
            .update_product(
                stranger,
                detail.id,
                UpdateProductRequest {
                    price: Some(1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let unchanged = service.product_detail(detail.id, None).await.unwrap();
        assert_eq!(unchanged.price, 30.0);
    }

    #[tokio::test]
    async fn update_category_alone_cannot_strand_subcategory() {
        let (service, farmer) = seeded_service().await;
        let detail = service.create_product(farmer, create_request("Spinach")).await.unwrap();
        assert_eq!(detail.subcategory_name.as_deref(), Some("Leafy Greens"));

        let err = service
            .update_product(
                farmer,
                detail.id,
                UpdateProductRequest {
                    category: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            CatalogError::Validation { fields, .. } => {
                assert!(fields.get("subcategory").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let unchanged = service.product_detail(detail.id, None).await.unwrap();
        assert_eq!(unchanged.category_name, "Vegetables");
        assert_eq!(unchanged.subcategory_name.as_deref(), Some("Leafy Greens"));
    }

    #[tokio::test]
    async fn update_can_move_category_and_subcategory_together() {
        let repo = InMemoryCatalogRepository::new();
        let farmer = Uuid::new_v4();
        repo.seed_farmer(farmer, "Alice Grower", "+1234567890").await;
        repo.seed_category(1, "Vegetables", true).await;
        repo.seed_category(2, "Fruits", true).await;
        repo.seed_subcategory(1, 1, "Leafy Greens", true).await;
        repo.seed_subcategory(2, 2, "Citrus", true).await;
        let service = CatalogService::new(Arc::new(repo));

        let detail = service.create_product(farmer, create_request("Spinach")).await.unwrap();
        let moved = service
            .update_product(
                farmer,
                detail.id,
                UpdateProductRequest {
                    category: Some(2),
                    subcategory: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.category_name, "Fruits");
        assert_eq!(moved.subcategory_name.as_deref(), Some("Citrus"));
    }

    #[tokio::test]
    async fn delete_of_missing_product_is_not_found() {
        let (service, farmer) = seeded_service().await;
        let err = service.delete_product(farmer, 42).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn short_suggestion_query_returns_empty() {
        let (service, farmer) = seeded_service().await;
        service.create_product(farmer, create_request("Spinach")).await.unwrap();
        assert!(service.search_suggestions("s").await.unwrap().is_empty());
        assert!(service.search_suggestions("").await.unwrap().is_empty());
        assert!(!service.search_suggestions("sp").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggestions_merge_products_before_categories() {
        let (service, farmer) = seeded_service().await;
        for i in 0..12 {
            service
                .create_product(farmer, create_request(&format!("Veg special {i}")))
                .await
                .unwrap();
        }
        // "veg" also matches the Vegetables category
        let suggestions = service.search_suggestions("veg").await.unwrap();
        assert_eq!(suggestions.len(), 10);
        assert!(suggestions.iter().all(|s| s.starts_with("Veg special")));
    }
}
