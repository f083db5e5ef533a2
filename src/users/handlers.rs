use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, NewUserRequest, UpdateUserRequest, UpdatedUser, UserView},
    services::upload_profile,
};
use crate::{
    auth::{
        guard::require_token,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    response::{ApiJson, Pagination, Success},
    state::AppState,
};

pub const AUTH_HEADER: &str = "auth";
pub const LOGIN_AUTH_HEADER: &str = "x-auth";
const PROFILE_FIELD: &str = "profile";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(view_all).post(new_user))
        .route("/users/login", post(login))
        .route("/users/:user_id", get(view))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/users/:user_id", axum::routing::put(update).delete(delete))
        .route(
            "/users/:user_id/profile",
            post(upload).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        );
    if state.enforce_tokens {
        router.route_layer(middleware::from_fn_with_state(state.clone(), require_token))
    } else {
        router
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("Error: invalid user id {raw}")))
}

fn token_headers(state: &AppState, name: &'static str) -> Result<HeaderMap, ApiError> {
    let token = state.tokens.issue().map_err(|e| {
        error!(error = %e, "token signing failed");
        ApiError::server(e)
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(name, token.parse::<HeaderValue>().map_err(ApiError::server)?);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn new_user(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<NewUserRequest>,
) -> Result<(HeaderMap, Success<UserView>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Error: invalid email".into()));
    }
    if payload.password.is_empty() {
        warn!("empty password");
        return Err(ApiError::Validation("Error: password is required".into()));
    }

    let hash = hash_password(&payload.password).map_err(ApiError::server)?;

    let user = payload.clone().into_user(Uuid::new_v4(), hash);
    if let Err(e) = state.users.insert(&user).await {
        error!(error = %e, "insert user failed");
        return Err(ApiError::server_with(e, &payload));
    }

    if let Err(e) = state.preferences.create_default(user.id).await {
        error!(error = %e, user_id = %user.id, "default preference failed");
        return Err(ApiError::server_with(e, &payload));
    }

    let headers = token_headers(&state, AUTH_HEADER)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((headers, Success::new(UserView::from(user))))
}

#[instrument(skip(state))]
pub async fn view_all(
    State(state): State<AppState>,
    Query(paging): Query<Pagination>,
) -> Result<Success<Vec<UserView>>, ApiError> {
    let (offset, limit) = paging.checked()?;
    let users = state
        .users
        .get_all(offset, limit)
        .await
        .map_err(ApiError::server)?;
    Ok(Success::new(users.into_iter().map(UserView::from).collect()))
}

#[instrument(skip(state))]
pub async fn view(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Success<UserView>, ApiError> {
    let id = parse_id(&user_id)?;
    match state.users.get_by_id(id).await {
        Ok(Some(user)) => Ok(Success::new(UserView::from(user))),
        Ok(None) => {
            warn!(%id, "user not found");
            Err(ApiError::NotFound(format!(
                "Error: User with ID {id} does not exist"
            )))
        }
        Err(e) => Err(ApiError::server_with(e, &id)),
    }
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(mut payload): ApiJson<UpdateUserRequest>,
) -> Result<Success<UpdatedUser>, ApiError> {
    let id = parse_id(&user_id)?;

    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            warn!(%id, email = %email, "invalid email");
            return Err(ApiError::Validation("Error: invalid email".into()));
        }
    }

    let pass_hash = match payload.new_password() {
        Some(plain) => Some(hash_password(plain).map_err(ApiError::server)?),
        None => None,
    };

    state
        .users
        .update(id, &payload.to_changes(pass_hash))
        .await
        .map_err(|e| ApiError::server_with(e, &id))?;

    info!(user_id = %id, "user updated");
    Ok(Success::new(UpdatedUser {
        id,
        changes: payload,
    }))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Success<()>, ApiError> {
    let id = parse_id(&user_id)?;
    state
        .users
        .delete(id)
        .await
        .map_err(|e| ApiError::server_with(e, &id))?;

    info!(user_id = %id, "user deleted");
    Ok(Success::new(()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<(HeaderMap, Success<UserView>), ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = match state.users.get_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%email, "login unknown email");
            return Err(ApiError::NotFound(format!(
                "Error: User with email {email} not found"
            )));
        }
        Err(e) => return Err(ApiError::server_with(e, &email)),
    };

    let ok = verify_password(&payload.password, &user.pass_hash)
        .map_err(|e| ApiError::server_with(e, &email))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::User("Incorrect login credentials".into()));
    }

    let headers = token_headers(&state, LOGIN_AUTH_HEADER)?;
    info!(user_id = %user.id, "user logged in");
    Ok((headers, Success::new(UserView::from(user))))
}

#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Success<()>, ApiError> {
    let id = parse_id(&user_id)?;
    let mut multipart =
        multipart.map_err(|_| ApiError::User("Error: expected a multipart body".into()))?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Err(ApiError::User("Error: unable to read multipart body".into()));
            }
        };
        if field.name() != Some(PROFILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|_| ApiError::User("Error: unable to read profile upload".into()))?;

        let url = upload_profile(
            state.users.as_ref(),
            state.storage.as_ref(),
            id,
            &filename,
            body,
            &content_type,
        )
        .await
        .map_err(|e| ApiError::server_with(e, &id))?;

        info!(user_id = %id, %url, "profile image stored");
        return Ok(Success::new(()));
    }

    warn!(user_id = %id, "profile field missing");
    Err(ApiError::User("Error: unable to find profile upload".into()))
}
