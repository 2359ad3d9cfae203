//! Read-only query endpoints.
//!
//! - `GET /v1/modules`                           : bound modules
//! - `GET /v1/modules/:module/allowed/:identity` : allow-list membership
//! - `GET /v1/modules/:module/events`            : committed audit log
//! - `GET /v1/check?from=&to=&amount=`           : unanimous transfer check
//!
//! Nothing here mutates state; administrative calls go through the engine API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use modcomply_core::error::{ClientCode, ModcomplyError};
use modcomply_core::{Address, Amount, ModuleEvent};

use crate::app_state::AppState;
use crate::module::ComplianceModule;

/// Error body: `{ "code": "...", "msg": "..." }`.
pub struct ApiError(ModcomplyError);

impl From<ModcomplyError> for ApiError {
    fn from(e: ModcomplyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::ModuleRegistry => StatusCode::NOT_FOUND,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        };
        (status, Json(json!({ "code": code.as_str(), "msg": self.0.to_string() }))).into_response()
    }
}

fn parse_addr(s: &str) -> Result<Address, ApiError> {
    Ok(s.parse::<Address>()?)
}

#[derive(Debug, Serialize)]
pub struct ModuleView {
    pub address: Address,
    pub name: &'static str,
    pub implementation: Address,
    pub owner: Option<Address>,
    pub allowed_users: usize,
}

pub async fn list_modules(State(state): State<AppState>) -> Result<Json<Vec<ModuleView>>, ApiError> {
    let mut out = Vec::new();
    let engine = state.engine();
    for addr in engine.modules()? {
        let Some(proxy) = state.deployment(addr) else { continue };
        out.push(ModuleView {
            address: addr,
            name: proxy.name(),
            implementation: proxy.implementation(),
            owner: proxy.owner(),
            allowed_users: proxy.allowed_count(engine.address()),
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Serialize)]
pub struct AllowedView {
    pub compliance: Address,
    pub identity: Address,
    pub allowed: bool,
}

pub async fn is_user_allowed(
    State(state): State<AppState>,
    Path((module, identity)): Path<(String, String)>,
) -> Result<Json<AllowedView>, ApiError> {
    let module = parse_addr(&module)?;
    let identity = parse_addr(&identity)?;
    let proxy = state
        .deployment(module)
        .ok_or(ModcomplyError::ModuleNotBound(module))?;

    let compliance = state.engine().address();
    Ok(Json(AllowedView {
        compliance,
        identity,
        allowed: proxy.is_user_allowed(compliance, identity),
    }))
}

pub async fn module_events(
    State(state): State<AppState>,
    Path(module): Path<String>,
) -> Result<Json<Vec<ModuleEvent>>, ApiError> {
    let module = parse_addr(&module)?;
    let proxy = state
        .deployment(module)
        .ok_or(ModcomplyError::ModuleNotBound(module))?;
    Ok(Json(proxy.events()))
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub from: String,
    pub to: String,
    /// Decimal; defaults to zero.
    #[serde(default)]
    pub amount: Option<String>,
}

pub async fn check_transfer(
    State(state): State<AppState>,
    Query(q): Query<CheckQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let from = parse_addr(&q.from)?;
    let to = parse_addr(&q.to)?;
    let amount: Amount = match q.amount.as_deref() {
        Some(s) => s
            .parse()
            .map_err(|_| ModcomplyError::BadRequest(format!("invalid amount: {s}")))?,
        None => 0,
    };
    let allowed = state.engine().can_transfer(from, to, amount);
    Ok(Json(json!({ "from": from, "to": to, "amount": amount.to_string(), "allowed": allowed })))
}
