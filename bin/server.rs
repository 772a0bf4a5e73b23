// Finance Dashboard - Web Server
// REST API over the session API with Axum

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use finance_dashboard::{
    edits, logging, Account, AppConfig, Bucket, DocumentStore, FinanceError, FinanceSession,
    FinancialData, HealthIndicators, HealthStatuses, ItemListEdit, SqliteDocumentStore,
    Transaction,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<dyn DocumentStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        })
    }
}

/// Library error rendered as a JSON failure body
struct ApiError(FinanceError);

impl From<FinanceError> for ApiError {
    fn from(err: FinanceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.0.to_string()),
            code: Some(self.0.error_code()),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndicatorsResponse {
    indicators: HealthIndicators,
    statuses: HealthStatuses,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NetWorthResponse {
    net_worth: f64,
}

#[derive(Deserialize)]
struct MonthlyRequest {
    income: f64,
    expenses: f64,
}

#[derive(Deserialize)]
struct AmountRequest {
    amount: f64,
}

type DataResult = Result<Json<ApiResponse<FinancialData>>, ApiError>;

/// Open a session for the user, failing if the initial read did not succeed
fn open_session(state: &AppState, raw_user_id: &str) -> Result<FinanceSession, ApiError> {
    // Decode URL-encoded user ids
    let user_id = urlencoding::decode(raw_user_id)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw_user_id.to_string());
    let session = FinanceSession::open(state.store.clone(), user_id);
    match session.last_error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(session),
    }
}

/// Apply a pure edit to the session's current data and save the result
fn save_edit<F>(state: &AppState, user_id: &str, edit: F) -> DataResult
where
    F: FnOnce(&FinancialData) -> finance_dashboard::Result<FinancialData>,
{
    let mut session = open_session(state, user_id)?;
    let next = edit(session.current_data())?;
    let saved = session.save(next)?.clone();
    Ok(ApiResponse::ok(saved))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// GET /api/users/:id/data - Current merged snapshot
async fn get_data(State(state): State<AppState>, Path(user_id): Path<String>) -> DataResult {
    let session = open_session(&state, &user_id)?;
    Ok(ApiResponse::ok(session.current_data().clone()))
}

/// PUT /api/users/:id/data - Save a complete snapshot
async fn put_data(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(data): Json<FinancialData>,
) -> DataResult {
    let mut session = open_session(&state, &user_id)?;
    let saved = session.save(data)?.clone();
    Ok(ApiResponse::ok(saved))
}

/// GET /api/users/:id/indicators - Derived health indicators
async fn get_indicators(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<IndicatorsResponse>>, ApiError> {
    let session = open_session(&state, &user_id)?;
    let indicators = session.compute_indicators();
    Ok(ApiResponse::ok(IndicatorsResponse {
        statuses: indicators.statuses(),
        indicators,
    }))
}

/// GET /api/users/:id/net-worth
async fn get_net_worth(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<NetWorthResponse>>, ApiError> {
    let session = open_session(&state, &user_id)?;
    Ok(ApiResponse::ok(NetWorthResponse {
        net_worth: session.compute_net_worth(),
    }))
}

/// PUT /api/users/:id/items/:category/:bucket - Replace a bucket's item list
async fn put_items(
    State(state): State<AppState>,
    Path((user_id, category, bucket)): Path<(String, String, String)>,
    Json(items): Json<Value>,
) -> DataResult {
    let bucket = Bucket::parse(&category, &bucket)?;
    let edit = ItemListEdit::from_json(bucket, items)
        .map_err(|e| FinanceError::Validation(format!("malformed items: {e}")))?;

    let mut session = open_session(&state, &user_id)?;
    let saved = session.save_item_list(edit)?.clone();
    Ok(ApiResponse::ok(saved))
}

/// PUT /api/users/:id/totals/:category/:bucket - Overwrite a bucket's summary
async fn put_bucket_total(
    State(state): State<AppState>,
    Path((user_id, category, bucket)): Path<(String, String, String)>,
    Json(body): Json<AmountRequest>,
) -> DataResult {
    let bucket = Bucket::parse(&category, &bucket)?;
    save_edit(&state, &user_id, |data| {
        edits::set_bucket_total(data, bucket, body.amount, Utc::now())
    })
}

/// PUT /api/users/:id/monthly - Monthly income and expenses
async fn put_monthly(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<MonthlyRequest>,
) -> DataResult {
    save_edit(&state, &user_id, |data| {
        edits::set_monthly_finances(data, body.income, body.expenses, Utc::now())
    })
}

/// PUT /api/users/:id/emergency-fund
async fn put_emergency_fund(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<AmountRequest>,
) -> DataResult {
    save_edit(&state, &user_id, |data| {
        edits::set_emergency_fund(data, body.amount, Utc::now())
    })
}

/// PUT /api/users/:id/accounts/:account_id - Add or replace an account
async fn put_account(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(String, String)>,
    Json(mut account): Json<Account>,
) -> DataResult {
    // The path names the record; a mismatched body id is ignored
    account.id = account_id;
    save_edit(&state, &user_id, |data| edits::upsert_account(data, account, Utc::now()))
}

/// DELETE /api/users/:id/accounts/:account_id
async fn delete_account(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(String, String)>,
) -> DataResult {
    save_edit(&state, &user_id, |data| {
        edits::remove_account(data, &account_id, Utc::now())
    })
}

/// PUT /api/users/:id/transactions/:tx_id - Add or replace a transaction
async fn put_transaction(
    State(state): State<AppState>,
    Path((user_id, tx_id)): Path<(String, String)>,
    Json(mut tx): Json<Transaction>,
) -> DataResult {
    tx.id = tx_id;
    save_edit(&state, &user_id, |data| edits::upsert_transaction(data, tx, Utc::now()))
}

/// DELETE /api/users/:id/transactions/:tx_id
async fn delete_transaction(
    State(state): State<AppState>,
    Path((user_id, tx_id)): Path<(String, String)>,
) -> DataResult {
    save_edit(&state, &user_id, |data| {
        edits::remove_transaction(data, &tx_id, Utc::now())
    })
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&format!("{},tower_http=info", config.logging.filter));

    let store = SqliteDocumentStore::open(&config.database.path)
        .with_context(|| format!("Failed to open store at {}", config.database.path.display()))?;

    let state = AppState {
        store: Arc::new(store),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/users/:id/data", get(get_data).put(put_data))
        .route("/users/:id/indicators", get(get_indicators))
        .route("/users/:id/net-worth", get(get_net_worth))
        .route("/users/:id/items/:category/:bucket", put(put_items))
        .route("/users/:id/totals/:category/:bucket", put(put_bucket_total))
        .route("/users/:id/monthly", put(put_monthly))
        .route("/users/:id/emergency-fund", put(put_emergency_fund))
        .route(
            "/users/:id/accounts/:account_id",
            put(put_account).delete(delete_account),
        )
        .route(
            "/users/:id/transactions/:tx_id",
            put(put_transaction).delete(delete_transaction),
        )
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(%addr, "server running");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
