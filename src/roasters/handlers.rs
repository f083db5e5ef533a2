use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{NewRoasterRequest, UpdateRoasterRequest, UpdatedRoaster},
    repo_types::{Roaster, RoasterChanges},
};
use crate::{
    auth::guard::require_token,
    error::ApiError,
    response::{ApiJson, Pagination, Success},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/roasters", get(view_all))
        .route("/roasters/:roaster_id", get(view))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/roasters", post(new_roaster))
        .route("/roasters/:roaster_id", put(update));
    if state.enforce_tokens {
        router.route_layer(middleware::from_fn_with_state(state.clone(), require_token))
    } else {
        router
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("Error: invalid roaster id {raw}")))
}

#[instrument(skip(state, payload))]
pub async fn new_roaster(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewRoasterRequest>,
) -> Result<Success<Roaster>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Error: roaster name is required".into()));
    }

    let roaster = payload.clone().into_roaster(Uuid::new_v4());
    state
        .roasters
        .insert(&roaster)
        .await
        .map_err(|e| ApiError::server_with(e, &payload))?;

    info!(roaster_id = %roaster.id, "roaster created");
    Ok(Success::new(roaster))
}

#[instrument(skip(state))]
pub async fn view_all(
    State(state): State<AppState>,
    Query(paging): Query<Pagination>,
) -> Result<Success<Vec<Roaster>>, ApiError> {
    let (offset, limit) = paging.checked()?;
    let roasters = state
        .roasters
        .get_all(offset, limit)
        .await
        .map_err(ApiError::server)?;
    Ok(Success::new(roasters))
}

#[instrument(skip(state))]
pub async fn view(
    State(state): State<AppState>,
    Path(roaster_id): Path<String>,
) -> Result<Success<Roaster>, ApiError> {
    let id = parse_id(&roaster_id)?;
    match state.roasters.get_by_id(id).await {
        Ok(Some(roaster)) => Ok(Success::new(roaster)),
        Ok(None) => {
            warn!(%id, "roaster not found");
            Err(ApiError::NotFound(format!(
                "Error: Roaster with ID {id} does not exist"
            )))
        }
        Err(e) => Err(ApiError::server_with(e, &id)),
    }
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(roaster_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateRoasterRequest>,
) -> Result<Success<UpdatedRoaster>, ApiError> {
    let id = parse_id(&roaster_id)?;
    state
        .roasters
        .update(id, &RoasterChanges::from(&payload))
        .await
        .map_err(|e| ApiError::server_with(e, &id))?;

    Ok(Success::new(UpdatedRoaster {
        id,
        changes: payload,
    }))
}
