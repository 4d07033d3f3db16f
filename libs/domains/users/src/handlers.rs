use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequestParts, Path, Query, Request, State, rejection::JsonRejection},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_helpers::{AppError, Catalog, ErrorResponse, Locale, ValidatedJson, localize_errors};
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::messages::{self, MessageKey};
use crate::models::{
    AuthResponse, Credentials, MessageResponse, PageQuery, PasswordResetRequest, PasswordUpdate, RegisterUser,
    UpdateUser, UserProfile, UserSummary,
};
use crate::pagination::{Page, PageRequest};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::token::TokenRepository;

pub const TAG: &str = "users";

/// Fits a base64 encoded image of the maximum size plus the other fields.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

type ApiResult<T> = Result<T, AppError>;
type SharedService<R, T> = Arc<UserService<R, T>>;

/// OpenAPI documentation for the accounts API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        activate,
        list_users,
        get_user,
        update_user,
        login,
        logout,
        request_password_reset,
        update_password,
    ),
    components(schemas(
        RegisterUser,
        UpdateUser,
        Credentials,
        PasswordResetRequest,
        PasswordUpdate,
        UserSummary,
        UserProfile,
        AuthResponse,
        MessageResponse,
        ErrorResponse,
    )),
    tags((name = TAG, description = "Registration, authentication, profiles and password reset"))
)]
pub struct ApiDoc;

/// Set by the bearer-token middleware for requests with a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

/// Extracts the optional [`AuthenticatedUser`]; never rejects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Caller(pub Option<AuthenticatedUser>);

impl Caller {
    pub fn id(&self) -> Option<Uuid> {
        self.0.map(|user| user.id)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<AuthenticatedUser>().copied()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves `Authorization: Bearer <token>` to an [`AuthenticatedUser`].
/// Requests without a usable token continue anonymously.
async fn resolve_bearer<R, T>(
    State(service): State<SharedService<R, T>>,
    mut request: Request,
    next: Next,
) -> Response
where
    R: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    if let Some(token) = bearer_token(request.headers()).map(str::to_owned) {
        match service.resolve_token(&token).await {
            Ok(Some(id)) => {
                request.extensions_mut().insert(AuthenticatedUser { id });
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired bearer token"),
            Err(e) => tracing::error!(error = %e, "Failed to resolve bearer token"),
        }
    }
    next.run(request).await
}

fn message(locale: Locale, key: MessageKey) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: key.text(locale).to_string(),
    })
}

/// Create the users router with all HTTP endpoints
pub fn router<R, T>(service: UserService<R, T>) -> Router
where
    R: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/token/{token}", post(activate))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/auth", post(login))
        .route("/logout", post(logout))
        .route("/password", post(request_password_reset).put(update_password))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            shared_service.clone(),
            resolve_bearer::<R, T>,
        ))
        .layer(middleware::from_fn_with_state(
            messages::translate as Catalog,
            localize_errors,
        ))
        .with_state(shared_service)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 200, description = "User created, activation email sent", body = MessageResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 502, description = "Activation email could not be sent", body = ErrorResponse)
    )
)]
async fn register<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    locale: Locale,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    service.register(input).await?;
    Ok(message(locale, MessageKey::UserCreateSuccess))
}

/// Activate an account with the emailed token
#[utoipa::path(
    post,
    path = "/users/token/{token}",
    tag = TAG,
    params(("token" = String, Path, description = "Activation token")),
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Unknown activation token", body = ErrorResponse)
    )
)]
async fn activate<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    locale: Locale,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    service.activate(&token).await?;
    Ok(message(locale, MessageKey::AccountActivationSuccess))
}

/// Page through active users
///
/// The authenticated caller is left out of the listing.
#[utoipa::path(
    get,
    path = "/users",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of active users", body = Page<UserSummary>)
    )
)]
async fn list_users<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<UserSummary>>> {
    let request = PageRequest::from_params(query.page.as_deref(), query.size.as_deref());
    let page = service.list_users(request, caller.id()).await?;
    Ok(Json(page))
}

/// Get an active user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserSummary>> {
    Ok(Json(service.get_user(&id).await?))
}

/// Update the caller's own profile
///
/// Authorization is checked before the body is read, so a stranger gets 403
/// even for a malformed body.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID"),
        ("Authorization" = String, Header, description = "Bearer token")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 403, description = "Not the same user", body = ErrorResponse)
    )
)]
async fn update_user<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let id = service.authorize_update(caller.id(), &id)?;
    let Json(input) = payload?;
    Ok(Json(service.update_user(id, input).await?))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/auth",
    tag = TAG,
    request_body = Credentials,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Incorrect credentials", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    )
)]
async fn login<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(credentials) = payload?;
    Ok(Json(service.login(credentials).await?))
}

/// Revoke the bearer token of this request
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    params(("Authorization" = Option<String>, Header, description = "Bearer token")),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
async fn logout<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    locale: Locale,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(token) = bearer_token(&headers) {
        service.logout(token).await?;
    }
    Ok(message(locale, MessageKey::LogoutSuccess))
}

/// Email a password reset token
#[utoipa::path(
    post,
    path = "/password",
    tag = TAG,
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset email sent", body = MessageResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 404, description = "Email not in use", body = ErrorResponse),
        (status = 502, description = "Reset email could not be sent", body = ErrorResponse)
    )
)]
async fn request_password_reset<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    locale: Locale,
    ValidatedJson(input): ValidatedJson<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    service.request_password_reset(input).await?;
    Ok(message(locale, MessageKey::PasswordResetRequestSuccess))
}

/// Set a new password with a reset token
#[utoipa::path(
    put,
    path = "/password",
    tag = TAG,
    request_body = PasswordUpdate,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Password policy violated", body = ErrorResponse),
        (status = 403, description = "Unknown or expired reset token", body = ErrorResponse)
    )
)]
async fn update_password<R: UserRepository, T: TokenRepository>(
    State(service): State<SharedService<R, T>>,
    locale: Locale,
    payload: Result<Json<PasswordUpdate>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    service.update_password(input).await?;
    Ok(message(locale, MessageKey::PasswordUpdateSuccess))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/users", "/users/{id}", "/users/token/{token}", "/auth", "/logout", "/password"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
