use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::core::{
    FrequencyOption, InvestmentFrequency, PlanEdit, PlanInputs, ProjectionYear, RawInput,
    RoundedTotals, StepUpMode, apply_edit, apply_edits, run_projection, run_yearly_trace,
    step_up_frequency_options,
};
use crate::error::Result;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Any subset of the form fields; missing ones keep their defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionPayload {
    pub investment_amount: Option<RawInput>,
    pub investment_frequency: Option<InvestmentFrequency>,
    pub accumulation_phase_years: Option<RawInput>,
    pub step_up_mode: Option<StepUpMode>,
    pub step_up_percent: Option<RawInput>,
    pub step_up_amount: Option<RawInput>,
    pub step_up_frequency: Option<InvestmentFrequency>,
    pub expected_growth_percent: Option<RawInput>,
    pub investment_tenure_years: Option<RawInput>,
}

impl ProjectionPayload {
    /// Edits in form order, so later fields win any coupling conflict.
    fn into_edits(self) -> Vec<PlanEdit> {
        let mut edits = Vec::new();
        if let Some(v) = self.investment_amount {
            edits.push(PlanEdit::InvestmentAmount(v));
        }
        if let Some(v) = self.investment_frequency {
            edits.push(PlanEdit::InvestmentFrequency(v));
        }
        if let Some(v) = self.accumulation_phase_years {
            edits.push(PlanEdit::AccumulationPhaseYears(v));
        }
        if let Some(v) = self.step_up_mode {
            edits.push(PlanEdit::StepUpMode(v));
        }
        if let Some(v) = self.step_up_percent {
            edits.push(PlanEdit::StepUpPercent(v));
        }
        if let Some(v) = self.step_up_amount {
            edits.push(PlanEdit::StepUpAmount(v));
        }
        if let Some(v) = self.step_up_frequency {
            edits.push(PlanEdit::StepUpFrequency(v));
        }
        if let Some(v) = self.expected_growth_percent {
            edits.push(PlanEdit::ExpectedGrowthPercent(v));
        }
        if let Some(v) = self.investment_tenure_years {
            edits.push(PlanEdit::InvestmentTenureYears(v));
        }
        edits
    }
}

impl From<&PlanInputs> for ProjectionPayload {
    fn from(inputs: &PlanInputs) -> Self {
        Self {
            investment_amount: Some(inputs.investment_amount.into()),
            investment_frequency: Some(inputs.investment_frequency),
            accumulation_phase_years: Some(f64::from(inputs.accumulation_phase_years).into()),
            step_up_mode: Some(inputs.step_up_mode),
            step_up_percent: Some(inputs.step_up.percent.into()),
            step_up_amount: Some(inputs.step_up.amount.into()),
            step_up_frequency: Some(inputs.step_up_frequency),
            expected_growth_percent: Some(inputs.expected_growth_percent.into()),
            investment_tenure_years: Some(f64::from(inputs.investment_tenure_years).into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EditRequest {
    inputs: PlanInputs,
    edit: PlanEdit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub inputs: PlanInputs,
    pub step_up: RoundedTotals,
    pub no_step_up: RoundedTotals,
    pub step_up_frequency_options: Vec<FrequencyOption>,
    pub years: Vec<ProjectionYear>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn inputs_from_payload(payload: ProjectionPayload) -> PlanInputs {
    apply_edits(PlanInputs::default(), &payload.into_edits())
}

/// Replays a client-held snapshot through the field rules before trusting it.
pub fn normalize_inputs(inputs: &PlanInputs) -> PlanInputs {
    inputs_from_payload(ProjectionPayload::from(inputs))
}

pub fn build_projection_response(inputs: PlanInputs) -> ProjectionResponse {
    let result = run_projection(&inputs);
    debug!(
        ?inputs,
        maturity = result.step_up.maturity(),
        no_step_up_maturity = result.no_step_up.maturity(),
        "projection computed"
    );
    ProjectionResponse {
        inputs,
        step_up: result.step_up.rounded(),
        no_step_up: result.no_step_up.rounded(),
        step_up_frequency_options: step_up_frequency_options(inputs.investment_frequency),
        years: run_yearly_trace(&inputs),
    }
}

pub fn render_json(response: &ProjectionResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/edit", post(edit_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("SIP calculator listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, router()).await?;
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: std::result::Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_response(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn project_post_handler(
    payload: std::result::Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => project_response(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn edit_handler(
    request: std::result::Result<Json<EditRequest>, JsonRejection>,
) -> Response {
    match request {
        Ok(Json(request)) => edit_response(request),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

fn project_response(payload: ProjectionPayload) -> Response {
    let inputs = inputs_from_payload(payload);
    json_response(StatusCode::OK, build_projection_response(inputs))
}

fn edit_response(request: EditRequest) -> Response {
    let current = normalize_inputs(&request.inputs);
    let next = apply_edit(&current, &request.edit);
    debug!(edit = ?request.edit, "edit applied");
    json_response(StatusCode::OK, build_projection_response(next))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
