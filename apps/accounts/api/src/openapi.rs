use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)),
    info(
        title = "Accounts API",
        version = "1.0",
        description = "User registration, activation, authentication, profiles and password reset"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/1.0", api = domain_users::handlers::ApiDoc))
)]
pub struct ApiDoc;
