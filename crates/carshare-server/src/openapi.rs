use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carshare API",
        version = "0.1.0",
        description = "Peer-to-peer car rental marketplace: car listings, search and reviews."
    ),
    paths(
        crate::routes::create_car,
        crate::routes::list_cars,
        crate::routes::search_cars,
        crate::routes::get_car,
        crate::routes::update_car,
        crate::routes::delete_car,
        crate::routes::create_review,
        crate::routes::get_review,
        crate::routes::list_user_reviews,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::UserResponse,
        crate::dto::CreateCarRequest,
        crate::dto::UpdateCarRequest,
        crate::dto::CarResponse,
        crate::dto::CarListResponse,
        crate::dto::CreateReviewRequest,
        crate::dto::ReviewResponse,
        crate::dto::ReviewListResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "cars", description = "Car listings and search"),
        (name = "reviews", description = "Reviews between renters and owners"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("token")
                        .description(Some(
                            "User token issued by the identity service. Configured via CARSHARE_TOKENS.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
