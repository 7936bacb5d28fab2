use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::analytics::{compute_view_stats, export_csv, sorted_by_time_desc, ViewStats};
use crate::errors::AppError;
use crate::models::view::ViewEvent;
use crate::state::AppState;

/// POST /api/views/track
/// Records one visit with coarse network metadata for the calling client.
pub async fn handle_track_view(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let ip = client_ip(&headers, peer);
    let geo = state.geo.lookup(&ip).await;
    let event = ViewEvent {
        ip,
        country: geo.country,
        network: geo.network,
        timestamp: Utc::now(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    state.store.append_event(&event).await?;
    Ok(Json(json!({ "success": true, "view": event })))
}

/// GET /api/views
pub async fn handle_list_views(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let views = state.store.list_events().await?;
    Ok(Json(json!({ "views": views })))
}

/// GET /api/views/stats
pub async fn handle_view_stats(
    State(state): State<AppState>,
) -> Result<Json<ViewStats>, AppError> {
    let views = state.store.list_events().await?;
    Ok(Json(compute_view_stats(&views)))
}

/// GET /api/views/export
/// The analytics page's CSV download, newest views first.
pub async fn handle_export_views(State(state): State<AppState>) -> Result<Response, AppError> {
    let views = state.store.list_events().await?;
    let csv = export_csv(&sorted_by_time_desc(&views));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cv-views-analytics.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Client address for tracking: first `x-forwarded-for` hop, then
/// `x-real-ip`, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.ip().to_string()
}
