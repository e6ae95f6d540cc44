use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::auth::AuthUser;
use axum_helpers::envelope::ErrorCode;
use axum_helpers::extractors::ValidatedJson;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, OpenApi};

use crate::error::CatalogError;
use crate::models::{
    Category, CreateProductRequest, DashboardStats, ProductDetail, ProductFilters, ProductImage,
    ProductStatus, ProductSummary, Subcategory, Unit, UpdateProductRequest,
};
use crate::postgres::PostgresCatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the catalog endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        list_subcategories,
        list_products,
        product_detail,
        featured_products,
        my_products,
        create_product,
        update_product,
        delete_product,
        dashboard_stats,
        search_suggestions,
    ),
    components(schemas(
        Category,
        Subcategory,
        ProductSummary,
        ProductDetail,
        ProductImage,
        CreateProductRequest,
        UpdateProductRequest,
        DashboardStats,
        Unit,
        ProductStatus,
    )),
    tags(
        (name = "catalog", description = "Categories, products, dashboard and search")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct CatalogState {
    pub service: CatalogService<PostgresCatalogRepository>,
}

pub fn public_router(state: CatalogState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{category_id}/subcategories", get(list_subcategories))
        .route("/products", get(list_products))
        .route("/products/featured", get(featured_products))
        .route("/search/suggestions", get(search_suggestions))
        .with_state(state)
}

/// Product detail resolves `is_favorited` when a bearer token is
/// present, so it sits behind the optional-auth layer.
pub fn optional_auth_router(state: CatalogState) -> Router {
    Router::new()
        .route("/products/{id}", get(product_detail))
        .with_state(state)
}

pub fn farmer_router(state: CatalogState) -> Router {
    Router::new()
        .route("/my-products", get(my_products))
        .route("/products/create", post(create_product))
        .route("/products/{id}/update", put(update_product))
        .route("/products/{id}/delete", delete(delete_product))
        .route("/dashboard/stats", get(dashboard_stats))
        .with_state(state)
}

fn require_farmer(auth: &AuthUser, message: &str) -> Result<(), CatalogError> {
    if auth.user_type == "farmer" {
        Ok(())
    } else {
        Err(CatalogError::PermissionDenied(message.to_string()))
    }
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Active categories")),
    tag = "catalog"
)]
pub async fn list_categories(State(state): State<CatalogState>) -> Response {
    match state.service.list_categories().await {
        Ok(categories) => {
            Json(json!({"success": true, "categories": categories})).into_response()
        }
        Err(err) => err.respond(
            ErrorCode::FetchError,
            "Unable to fetch categories. Please try again later.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/subcategories",
    params(("category_id" = i32, Path, description = "Parent category id")),
    responses((status = 200, description = "Active subcategories of the category")),
    tag = "catalog"
)]
pub async fn list_subcategories(
    State(state): State<CatalogState>,
    Path(category_id): Path<i32>,
) -> Response {
    match state.service.list_subcategories(category_id).await {
        Ok(subcategories) => {
            Json(json!({"success": true, "subcategories": subcategories})).into_response()
        }
        Err(err) => err.respond(
            ErrorCode::FetchError,
            "Unable to fetch subcategories. Please try again later.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilters),
    responses((status = 200, description = "Filtered product page")),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<CatalogState>,
    Query(filters): Query<ProductFilters>,
) -> Response {
    match state.service.list_products(&filters).await {
        Ok(page) => Json(json!({
            "success": true,
            "products": page.products,
            "count": page.count,
            "page": page.page,
            "page_size": page.page_size,
            "total_pages": page.total_pages,
        }))
        .into_response(),
        Err(err) => err.respond(
            ErrorCode::FetchError,
            "Unable to fetch products. Please try again later.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "catalog"
)]
pub async fn product_detail(
    State(state): State<CatalogState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i32>,
) -> Response {
    let viewer = auth.map(|Extension(user)| user.id);
    match state.service.product_detail(id, viewer).await {
        Ok(product) => Json(json!({"success": true, "product": product})).into_response(),
        Err(err) => err.respond(ErrorCode::FetchError, "Unable to fetch product details."),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses((status = 200, description = "Featured available products")),
    tag = "catalog"
)]
pub async fn featured_products(State(state): State<CatalogState>) -> Response {
    match state.service.featured_products().await {
        Ok(products) => Json(json!({"success": true, "products": products})).into_response(),
        Err(err) => err.respond(ErrorCode::FetchError, "Unable to fetch featured products."),
    }
}

#[utoipa::path(
    get,
    path = "/api/my-products",
    responses(
        (status = 200, description = "Authenticated farmer's products"),
        (status = 403, description = "Caller is not a farmer"),
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn my_products(
    State(state): State<CatalogState>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    if let Err(err) = require_farmer(&auth, "Only farmers can access this endpoint.") {
        return err.into_response();
    }
    match state.service.my_products(auth.id).await {
        Ok(products) => Json(json!({"success": true, "products": products})).into_response(),
        Err(err) => err.respond(ErrorCode::FetchError, "Unable to fetch your products."),
    }
}

#[utoipa::path(
    post,
    path = "/api/products/create",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller is not a farmer"),
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<CatalogState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Response {
    if let Err(err) = require_farmer(&auth, "Only farmers can create products.") {
        return err.into_response();
    }
    match state.service.create_product(auth.id, request).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Product created successfully",
                "product": product,
            })),
        )
            .into_response(),
        Err(err) => err.respond(
            ErrorCode::CreationError,
            "Product creation failed due to a server error.",
        ),
    }
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/update",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Not owned or unknown"),
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<CatalogState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Response {
    match state.service.update_product(auth.id, id, request).await {
        Ok(product) => Json(json!({
            "success": true,
            "message": "Product updated successfully",
            "product": product,
        }))
        .into_response(),
        Err(err) => err.respond(
            ErrorCode::UpdateError,
            "Product update failed due to a server error.",
        ),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/delete",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Not owned or unknown"),
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<CatalogState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Response {
    match state.service.delete_product(auth.id, id).await {
        Ok(()) => {
            Json(json!({"success": true, "message": "Product deleted successfully"}))
                .into_response()
        }
        Err(err) => err.respond(
            ErrorCode::DeleteError,
            "Product deletion failed due to a server error.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Counts over the farmer's products"),
        (status = 403, description = "Caller is not a farmer"),
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn dashboard_stats(
    State(state): State<CatalogState>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    if let Err(err) = require_farmer(&auth, "Only farmers can access dashboard statistics.") {
        return err.into_response();
    }
    match state.service.dashboard_stats(auth.id).await {
        Ok(stats) => Json(json!({"success": true, "stats": stats})).into_response(),
        Err(err) => err.respond(ErrorCode::StatsError, "Unable to fetch dashboard statistics."),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(
    get,
    path = "/api/search/suggestions",
    params(SuggestionQuery),
    responses((status = 200, description = "Autocomplete suggestions")),
    tag = "catalog"
)]
pub async fn search_suggestions(
    State(state): State<CatalogState>,
    Query(query): Query<SuggestionQuery>,
) -> Response {
    match state.service.search_suggestions(&query.q).await {
        Ok(suggestions) => {
            Json(json!({"success": true, "suggestions": suggestions})).into_response()
        }
        Err(err) => err.respond(ErrorCode::SearchError, "Unable to fetch search suggestions."),
    }
}
