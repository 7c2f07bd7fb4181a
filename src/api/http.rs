//! `reqwest` implementation of [`BookingApi`].
//!
//! Thin HTTP wrapper. Status and body interpretation lives in pure functions
//! (`interpret_json`, `interpret_message`, `extract_detail`) for testability.

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::Date;
use tracing::{debug, warn};

use super::types::{CourtRecord, DetailQuery, OccupancyRecord, ReservationDetail, ReservationRequest, SlotRecord};
use super::{ApiError, BookingApi};
use crate::config::{AuthMode, ClientConfig};
use crate::session::SessionContext;

const AUTH_COOKIE: &str = "access_token";
const CREATED_FALLBACK: &str = "Reservation created";
const CANCELLED_FALLBACK: &str = "Reservation cancelled";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    auth_mode: AuthMode,
    session: SessionContext,
}

impl HttpApi {
    /// Build a client for `config.base_url`. The token is read from `session`
    /// on every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), auth_mode: config.auth_mode, session })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.http.request(method, url);
        match (self.session.token(), self.auth_mode) {
            (Some(token), AuthMode::Bearer) => request.bearer_auth(token),
            (Some(token), AuthMode::Cookie) => request.header(COOKIE, format!("{AUTH_COOKIE}={token}")),
            (None, _) => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "booking API unreachable");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(status, bytes = body.len(), "booking API response");
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let (status, body) = self.send(self.request(Method::GET, path).query(query)).await?;
        interpret_json(status, &body)
    }
}

#[async_trait::async_trait]
impl BookingApi for HttpApi {
    async fn list_courts(&self) -> Result<Vec<CourtRecord>, ApiError> {
        self.get_json("courts/list", &[]).await
    }

    async fn list_slots(&self) -> Result<Vec<SlotRecord>, ApiError> {
        self.get_json("schedules/list", &[]).await
    }

    async fn reservation_counts(&self, date: Date) -> Result<Vec<OccupancyRecord>, ApiError> {
        self.get_json("reservations/count", &[("fecha", crate::dates::format_date(date))])
            .await
    }

    async fn reservation_detail(&self, query: &DetailQuery) -> Result<ReservationDetail, ApiError> {
        self.get_json("reservations/detail", &query.to_query()).await
    }

    async fn create_reservation(&self, request: &ReservationRequest) -> Result<String, ApiError> {
        let (status, body) = self
            .send(self.request(Method::POST, "reservations/create").json(request))
            .await?;
        interpret_message(status, &body, CREATED_FALLBACK)
    }

    async fn cancel_reservation(&self, reservation_id: i64) -> Result<String, ApiError> {
        let path = format!("reservations/cancel/{reservation_id}");
        let (status, body) = self.send(self.request(Method::DELETE, &path)).await?;
        interpret_message(status, &body, CANCELLED_FALLBACK)
    }
}

// =============================================================================
// RESPONSE INTERPRETATION
// =============================================================================

fn interpret_json<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check_status(status, body)?;
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn interpret_message(status: u16, body: &str, fallback: &str) -> Result<String, ApiError> {
    check_status(status, body)?;
    Ok(extract_message(body).unwrap_or_else(|| fallback.to_string()))
}

fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized),
        _ => Err(ApiError::Rejected {
            status,
            detail: extract_detail(body).unwrap_or_else(|| fallback_detail(status)),
        }),
    }
}

/// Pull the human-readable error text out of an error body.
///
/// Accepts `{"detail": "text"}`, `{"detail": [{"msg": ...}, ...]}` (joined
/// with `"; "`), `{"message": "text"}`, a bare JSON string, or a plain-text body.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => return Some(text),
        Ok(value) => value,
        Err(_) => return Some(trimmed.to_string()),
    };
    match value.get("detail") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(detail_item).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Some(Value::Null) | None => value.get("message").and_then(Value::as_str).map(ToOwned::to_owned),
        Some(other) => Some(other.to_string()),
    }
}

fn detail_item(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get("msg").and_then(Value::as_str).map(ToOwned::to_owned),
        _ => None,
    }
}

/// Success text from a create/cancel response body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => Some(text),
        Ok(value) => ["message", "mensaje", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(ToOwned::to_owned),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn fallback_detail(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), ToOwned::to_owned)
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
