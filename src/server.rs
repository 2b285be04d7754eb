use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::{validate_url, ScrapeError};
use crate::harvester::Harvester;
use crate::parser;
use crate::profile::{BusinessProfile, RawFieldBundle};
use crate::wizard::{filter_by_sections, Section, SectionSelection};

/// Anything that can turn a URL into a raw bundle.
#[async_trait]
pub trait Harvest: Send + Sync {
    async fn fetch_bundle(&self, url: &str) -> Result<RawFieldBundle>;
}

#[async_trait]
impl Harvest for Harvester {
    async fn fetch_bundle(&self, url: &str) -> Result<RawFieldBundle> {
        self.harvest(url).await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub harvester: Arc<dyn Harvest>,
}

/// Scrape request read leniently: any content type, an empty body is `{}`,
/// and section flags are taken by truthiness.
#[derive(Debug)]
struct ScrapeRequest {
    url: Value,
    sections: Option<SectionSelection>,
}

impl ScrapeRequest {
    fn from_body(body: &[u8]) -> Result<Self, ScrapeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self {
                url: Value::Null,
                sections: None,
            });
        }
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ScrapeError::MalformedBody(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(ScrapeError::MalformedBody("expected a JSON object".into()));
        };
        Ok(Self {
            url: map.remove("url").unwrap_or(Value::Null),
            sections: map.get("sections").and_then(selection_from_json),
        })
    }

    fn url(&self) -> Result<url::Url, ScrapeError> {
        match &self.url {
            Value::Null => validate_url(None),
            Value::String(s) => validate_url(Some(s.as_str())),
            other => Err(ScrapeError::InvalidUrl(format!(
                "expected a string, got {}",
                other
            ))),
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A falsy `sections` means no filter; anything else selects its truthy keys.
fn selection_from_json(v: &Value) -> Option<SectionSelection> {
    if !truthy(v) {
        return None;
    }
    let mut selection = SectionSelection::default();
    if let Value::Object(map) = v {
        for section in Section::ALL {
            if map.get(section.as_str()).is_some_and(truthy) {
                selection.insert(*section);
            }
        }
    }
    Some(selection)
}

#[derive(Serialize)]
struct ScrapeResponse {
    success: bool,
    data: BusinessProfile,
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        let status = match self {
            ScrapeError::MissingUrl
            | ScrapeError::InvalidUrl(_)
            | ScrapeError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ScrapeError::Harvest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.label(),
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/scrape", post(scrape))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
    })
}

async fn scrape(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, ScrapeError> {
    let payload = ScrapeRequest::from_body(&body)?;
    let url = payload.url()?;
    info!("Scraping {} (sections: {:?})", url, payload.sections);

    let raw = state.harvester.fetch_bundle(url.as_str()).await.map_err(|e| {
        warn!("Scrape failed for {}: {:#}", url, e);
        ScrapeError::Harvest(e)
    })?;

    let profile = parser::extract(&raw);
    let data = filter_by_sections(&profile, payload.sections.as_ref());

    Ok(Json(ScrapeResponse {
        success: true,
        data,
        message: "Website data extracted successfully",
    }))
}

pub async fn serve(harvester: Harvester, port: u16) -> Result<()> {
    let state = AppState {
        harvester: Arc::new(harvester),
    };
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server is running on http://localhost:{}", port);
    info!("Scraping API available at http://localhost:{}/api/scrape", port);
    axum::serve(listener, app).await?;
    Ok(())
}
