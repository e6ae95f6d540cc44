//! OpenAPI documentation configuration

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "Produce marketplace connecting farmers with HoReCa buyers",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and profile management"),
        (name = "catalog", description = "Categories, products, dashboard and search"),
        (name = "favorites", description = "HoReCa favorite products"),
        (name = "contact", description = "Contact form submissions")
    )
)]
struct BaseDoc;

/// Combined OpenAPI documentation for the marketplace API.
///
/// Domain docs declare absolute `/api/...` paths, so they are merged
/// into the base document rather than nested under a prefix.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_users::ApiDoc::openapi());
        doc.merge(domain_catalog::ApiDoc::openapi());
        doc.merge(domain_favorites::ApiDoc::openapi());
        doc.merge(domain_contact::ApiDoc::openapi());
        doc
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_doc_covers_every_domain() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/products",
            "/api/products/create",
            "/api/favorites/toggle/{product_id}",
            "/api/contact",
            "/api/search/suggestions",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
