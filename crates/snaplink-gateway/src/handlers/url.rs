use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, MappingResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use snaplink_core::ShortCode;

pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<MappingResponse>)> {
    let mapping = state
        .shortener()
        .create_mapping(&request.long_url, &request.owner_ref)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MappingResponse::from_mapping(mapping, state.base_url())),
    ))
}

pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MappingResponse>> {
    let code =
        ShortCode::new(&short_code).map_err(|e| AppError::InvalidShortCode(e.to_string()))?;

    let mapping = state
        .shortener()
        .find(&code)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(MappingResponse::from_mapping(mapping, state.base_url())))
}

pub async fn list_owner_urls_handler(
    Path(owner_ref): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MappingResponse>>> {
    let mappings = state.shortener().list_by_owner(&owner_ref).await?;

    Ok(Json(
        mappings
            .into_iter()
            .map(|mapping| MappingResponse::from_mapping(mapping, state.base_url()))
            .collect(),
    ))
}
