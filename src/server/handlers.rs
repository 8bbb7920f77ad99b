//! Query handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use pcapstreams_core::{
    fetch_all, fetch_stream, list_streams as index_keys, ConversationKey, PacketPage, PageRequest,
    UploadStatus,
};

use super::AppState;
use crate::error::ApiError;

/// `page` and `limit` query parameters.
///
/// Kept as raw text so that malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    fn request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

pub(super) async fn list_streams(State(state): State<AppState>) -> Json<Vec<ConversationKey>> {
    Json(index_keys(&state.index))
}

pub(super) async fn get_stream(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<PacketPage>, ApiError> {
    let page = fetch_stream(&state.index, &key, params.request())?;
    Ok(Json(page))
}

pub(super) async fn all_packets(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<PacketPage> {
    Json(fetch_all(&state.index, params.request()))
}

pub(super) async fn list_uploads(State(state): State<AppState>) -> Json<Vec<UploadStatus>> {
    Json(state.uploads.list())
}
