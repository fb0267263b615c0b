mod format;
mod params;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Allocation, BackTarget, BondProduct, BondYearPoint, EngineError, ProjectionResult,
    SessionConfig, WizardOption, WizardStep, advance, back, compute_future_value, compute_series,
    simulate_bond, split_portfolio,
};

pub use format::{format_pln, round_currency};
pub use params::{
    AllocationArgs, AllocationRequest, BondArgs, BondRequest, CalculatorArgs, CliBondProduct,
    ProjectionRequest, SeriesArgs, SeriesRequest, build_allocation_request, build_bond_request,
    build_projection_request, build_series_request, parse_consent_level,
};

use params::{
    AllocationPayload, BondPayload, ProjectionPayload, SeriesPayload, WizardPayload,
    allocation_request_from_payload, bond_request_from_payload, projection_request_from_payload,
    series_request_from_payload,
};

#[derive(Clone, Copy)]
struct AppState {
    session: SessionConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedAmounts {
    pub future_value: String,
    pub total_contributions: String,
    pub total_gain: String,
    pub real_value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub child_age: u32,
    pub years_investing: u32,
    pub projection: ProjectionResult,
    pub formatted: FormattedAmounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPointResponse {
    pub year: u32,
    pub label: String,
    pub invested: f64,
    pub saved: f64,
    pub real_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub annual_rate: f64,
    pub inflation: f64,
    pub points: Vec<SeriesPointResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondResponse {
    pub product: &'static str,
    pub family_only: bool,
    pub maturity_years: u32,
    pub first_year_rate: f64,
    pub subsequent_rate: f64,
    pub points: Vec<BondYearPoint>,
    pub final_nominal: f64,
    pub total_deposited: f64,
    pub profit: f64,
    pub formatted_final_nominal: String,
    pub formatted_profit: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardOptionView {
    pub id: &'static str,
    pub label: &'static str,
    pub next: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStepView {
    pub id: &'static str,
    pub prompt: &'static str,
    pub progress: u8,
    pub terminal: bool,
    pub options: Vec<WizardOptionView>,
    pub back: Option<&'static str>,
    pub bond_simulator: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardMoveResponse {
    pub exit: bool,
    pub progress: Option<u8>,
    pub step: Option<WizardStepView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    consent_level: Option<&'static str>,
    banner_visible: bool,
    analytics_enabled: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, session: SessionConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        consent = session.consent().map(|c| c.as_str()).unwrap_or("undecided"),
        analytics = session.analytics_enabled(),
        "kidfund HTTP API listening"
    );

    axum::serve(listener, router(session))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn router(session: SessionConfig) -> Router {
    Router::new()
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/series",
            get(series_get_handler).post(series_post_handler),
        )
        .route(
            "/api/bonds/simulate",
            get(bond_get_handler).post(bond_post_handler),
        )
        .route(
            "/api/allocation",
            get(allocation_get_handler).post(allocation_post_handler),
        )
        .route("/api/wizard/steps", get(wizard_steps_handler))
        .route(
            "/api/wizard/advance",
            get(wizard_advance_get_handler).post(wizard_advance_post_handler),
        )
        .route(
            "/api/wizard/back",
            get(wizard_back_get_handler).post(wizard_back_post_handler),
        )
        .route("/api/session", get(session_handler))
        .fallback(not_found_handler)
        .with_state(AppState { session })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "could not install ctrl-c handler; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(
    payload: Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    projection_handler_impl(from_query(payload))
}

async fn projection_post_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    projection_handler_impl(from_json(payload))
}

async fn series_get_handler(payload: Result<Query<SeriesPayload>, QueryRejection>) -> Response {
    series_handler_impl(from_query(payload))
}

async fn series_post_handler(payload: Result<Json<SeriesPayload>, JsonRejection>) -> Response {
    series_handler_impl(from_json(payload))
}

async fn bond_get_handler(payload: Result<Query<BondPayload>, QueryRejection>) -> Response {
    bond_handler_impl(from_query(payload))
}

async fn bond_post_handler(payload: Result<Json<BondPayload>, JsonRejection>) -> Response {
    bond_handler_impl(from_json(payload))
}

async fn allocation_get_handler(
    payload: Result<Query<AllocationPayload>, QueryRejection>,
) -> Response {
    allocation_handler_impl(from_query(payload))
}

async fn allocation_post_handler(
    payload: Result<Json<AllocationPayload>, JsonRejection>,
) -> Response {
    allocation_handler_impl(from_json(payload))
}

async fn wizard_steps_handler() -> Response {
    let steps = WizardStep::ALL
        .into_iter()
        .map(step_view)
        .collect::<Vec<_>>();
    json_response(StatusCode::OK, steps)
}

async fn wizard_advance_get_handler(
    payload: Result<Query<WizardPayload>, QueryRejection>,
) -> Response {
    respond(from_query(payload).and_then(wizard_advance))
}

async fn wizard_advance_post_handler(
    payload: Result<Json<WizardPayload>, JsonRejection>,
) -> Response {
    respond(from_json(payload).and_then(wizard_advance))
}

async fn wizard_back_get_handler(
    payload: Result<Query<WizardPayload>, QueryRejection>,
) -> Response {
    respond(from_query(payload).and_then(wizard_back))
}

async fn wizard_back_post_handler(
    payload: Result<Json<WizardPayload>, JsonRejection>,
) -> Response {
    respond(from_json(payload).and_then(wizard_back))
}

async fn session_handler(State(state): State<AppState>) -> Response {
    let session = state.session;
    json_response(
        StatusCode::OK,
        SessionResponse {
            consent_level: session.consent().map(|c| c.as_str()),
            banner_visible: session.banner_visible(),
            analytics_enabled: session.analytics_enabled(),
        },
    )
}

fn projection_handler_impl(payload: Result<ProjectionPayload, String>) -> Response {
    respond(
        payload
            .and_then(projection_request_from_payload)
            .and_then(|r| projection_report(&r)),
    )
}

fn series_handler_impl(payload: Result<SeriesPayload, String>) -> Response {
    respond(
        payload
            .and_then(series_request_from_payload)
            .and_then(|r| series_report(&r)),
    )
}

fn bond_handler_impl(payload: Result<BondPayload, String>) -> Response {
    respond(
        payload
            .and_then(bond_request_from_payload)
            .and_then(|r| bond_report(&r)),
    )
}

fn allocation_handler_impl(payload: Result<AllocationPayload, String>) -> Response {
    respond(
        payload
            .and_then(allocation_request_from_payload)
            .and_then(|r| allocation_report(&r)),
    )
}

pub fn projection_report(request: &ProjectionRequest) -> Result<ProjectionResponse, String> {
    let result = compute_future_value(&request.input).map_err(|e| e.to_string())?;
    debug!(
        child_age = request.child_age,
        months = request.input.horizon_months,
        future_value = result.future_value,
        "computed projection"
    );

    Ok(ProjectionResponse {
        child_age: request.child_age,
        years_investing: request.input.horizon_months / 12,
        formatted: FormattedAmounts {
            future_value: format_pln(result.future_value),
            total_contributions: format_pln(result.total_contributions),
            total_gain: format_pln(result.total_gain),
            real_value: result.real_value.map(format_pln),
        },
        projection: result,
    })
}

pub fn series_report(request: &SeriesRequest) -> Result<SeriesResponse, String> {
    let points = compute_series(
        request.start_year,
        request.end_year,
        request.step_years,
        request.monthly_deposit,
        request.annual_rate,
        request.inflation,
    )
    .map_err(|e| e.to_string())?;
    debug!(points = points.len(), "computed comparison series");

    Ok(SeriesResponse {
        annual_rate: request.annual_rate,
        inflation: request.inflation,
        points: points
            .into_iter()
            .map(|p| SeriesPointResponse {
                year: p.year,
                label: format!("{} l.", p.year),
                invested: round_currency(p.invested),
                saved: round_currency(p.saved),
                real_value: round_currency(p.real_value),
            })
            .collect(),
    })
}

pub fn bond_report(request: &BondRequest) -> Result<BondResponse, String> {
    let sim = simulate_bond(&request.params).map_err(|e| e.to_string())?;
    debug!(
        product = request.product.code(),
        years = request.params.years,
        final_nominal = sim.final_nominal,
        "simulated bond accrual"
    );

    Ok(BondResponse {
        product: request.product.code(),
        family_only: request.product.family_only(),
        maturity_years: request.product.maturity_years(),
        first_year_rate: request.params.first_year_rate,
        subsequent_rate: request.params.subsequent_rate(),
        points: sim
            .points
            .iter()
            .map(|p| BondYearPoint {
                nominal: round_currency(p.nominal),
                ..*p
            })
            .collect(),
        formatted_final_nominal: format_pln(sim.final_nominal),
        formatted_profit: format_pln(sim.profit),
        final_nominal: sim.final_nominal,
        total_deposited: sim.total_deposited,
        profit: sim.profit,
    })
}

pub fn allocation_report(request: &AllocationRequest) -> Result<Allocation, String> {
    split_portfolio(
        request.monthly_amount,
        request.safety_percent,
        request.include_gold,
    )
    .map_err(|e| e.to_string())
}

pub fn step_view(step: WizardStep) -> WizardStepView {
    WizardStepView {
        id: step.id(),
        prompt: step.prompt(),
        progress: step.progress(),
        terminal: step.is_terminal(),
        options: step
            .options()
            .iter()
            .filter_map(|&option| {
                let transition = advance(step, option).ok()?;
                Some(WizardOptionView {
                    id: option.id(),
                    label: step.option_label(option)?,
                    next: transition.next.id(),
                })
            })
            .collect(),
        back: match back(step) {
            BackTarget::Step(target) => Some(target.id()),
            BackTarget::Exit => None,
        },
        bond_simulator: BondProduct::simulator_for(step).map(BondProduct::code),
    }
}

fn parse_step(raw: Option<&str>) -> Result<WizardStep, String> {
    let raw = raw.ok_or_else(|| "missing wizard step".to_string())?;
    WizardStep::from_id(raw).ok_or_else(|| format!("unknown wizard step '{raw}'"))
}

fn wizard_advance(payload: WizardPayload) -> Result<WizardMoveResponse, String> {
    let step = parse_step(payload.step.as_deref())?;
    let raw_option = payload.option.unwrap_or_default();
    let option = WizardOption::from_id(&raw_option).ok_or_else(|| {
        EngineError::InvalidTransition {
            step: step.id().to_string(),
            option: raw_option.clone(),
        }
        .to_string()
    })?;

    let transition = advance(step, option).map_err(|e| e.to_string())?;
    debug!(
        from = step.id(),
        option = option.id(),
        to = transition.next.id(),
        progress = transition.progress,
        "wizard advanced"
    );

    Ok(WizardMoveResponse {
        exit: false,
        progress: Some(transition.progress),
        step: Some(step_view(transition.next)),
    })
}

fn wizard_back(payload: WizardPayload) -> Result<WizardMoveResponse, String> {
    let step = parse_step(payload.step.as_deref())?;
    let response = match back(step) {
        BackTarget::Step(target) => WizardMoveResponse {
            exit: false,
            progress: Some(target.progress()),
            step: Some(step_view(target)),
        },
        BackTarget::Exit => WizardMoveResponse {
            exit: true,
            progress: None,
            step: None,
        },
    };
    debug!(from = step.id(), exit = response.exit, "wizard went back");
    Ok(response)
}

// Extractor rejections go through the same JSON error path as validation.
fn from_query<T>(payload: Result<Query<T>, QueryRejection>) -> Result<T, String> {
    payload.map(|Query(p)| p).map_err(|rej| rej.body_text())
}

fn from_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, String> {
    payload.map(|Json(p)| p).map_err(|rej| rej.body_text())
}

fn respond<T: Serialize>(result: Result<T, String>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    warn!(status = status.as_u16(), error = msg, "request rejected");
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConsentLevel;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn wizard_payload(step: &str, option: Option<&str>) -> WizardPayload {
        WizardPayload {
            step: Some(step.to_string()),
            option: option.map(str::to_string),
        }
    }

    #[test]
    fn projection_report_formats_and_keeps_raw_values() {
        let request = build_projection_request(&CalculatorArgs::default()).expect("defaults");
        let report = projection_report(&request).expect("valid projection");

        assert_eq!(report.years_investing, 18);
        assert_eq!(report.projection.future_value.round(), 346_587.0);
        assert!(report.projection.future_value.fract() != 0.0);
        assert_eq!(report.formatted.future_value, "346\u{a0}587\u{a0}zł");
        assert_eq!(report.formatted.total_contributions, "172\u{a0}800\u{a0}zł");
        assert_eq!(report.formatted.real_value, None);

        let json = serde_json::to_string(&report).expect("serializes");
        assert!(json.contains("\"futureValue\""));
        assert!(json.contains("\"yearsInvesting\":18"));
    }

    #[test]
    fn series_report_rounds_only_for_display() {
        let request = build_series_request(&SeriesArgs::default()).expect("defaults");
        let report = series_report(&request).expect("valid series");

        assert_eq!(report.points.len(), 10);
        let last = report.points.last().expect("points");
        assert_eq!(last.label, "18 l.");
        assert_approx(last.saved, 172_800.0);
        assert_approx(last.real_value, 110_793.0);
        assert_approx(last.invested, 346_587.0);
    }

    #[test]
    fn bond_report_uses_product_defaults() {
        let request = build_bond_request(&BondArgs::default()).expect("defaults");
        let report = bond_report(&request).expect("valid simulation");

        assert_eq!(report.product, "EDO");
        assert!(!report.family_only);
        assert_eq!(report.maturity_years, 10);
        assert_approx(report.subsequent_rate, 4.5);
        assert_eq!(report.points.len(), 19);
        assert_approx(report.total_deposited, 172_800.0);
        assert!(report.profit > 0.0);
        assert_eq!(report.points[18].nominal, report.final_nominal.round());
    }

    #[test]
    fn allocation_report_splits_default_amount() {
        let request = build_allocation_request(&AllocationArgs::default()).expect("defaults");
        let split = allocation_report(&request).expect("valid split");
        assert_eq!(split.stock_percent, 60);
        assert_eq!(split.bond_percent, 40);
    }

    #[test]
    fn wizard_advance_follows_the_table() {
        let response =
            wizard_advance(wizard_payload("entry", Some("a"))).expect("entry accepts option a");
        assert!(!response.exit);
        assert_eq!(response.progress, Some(50));
        let step = response.step.expect("next step");
        assert_eq!(step.id, "safe-check");
        assert_eq!(step.back, Some("entry"));
        assert_eq!(step.options.len(), 2);
        assert_eq!(step.options[0].next, "result-family-bonds");
    }

    #[test]
    fn wizard_advance_reports_invalid_transitions() {
        let err = wizard_advance(wizard_payload("result-etf", Some("a")))
            .expect_err("terminal step");
        assert!(err.contains("result-etf"));

        let err = wizard_advance(wizard_payload("entry", Some("z"))).expect_err("unknown option");
        assert!(err.contains("'z'"));

        let err = wizard_advance(wizard_payload("step1", Some("a"))).expect_err("unknown step");
        assert!(err.contains("unknown wizard step"));

        let missing = WizardPayload {
            step: None,
            option: Some("a".to_string()),
        };
        let err = wizard_advance(missing).expect_err("no step given");
        assert_eq!(err, "missing wizard step");
        let err = wizard_back(WizardPayload::default()).expect_err("no step given");
        assert_eq!(err, "missing wizard step");
    }

    #[test]
    fn wizard_back_exits_from_entry() {
        let response = wizard_back(wizard_payload("entry", None)).expect("valid step");
        assert!(response.exit);
        assert!(response.step.is_none());

        let response = wizard_back(wizard_payload("result-metals", None)).expect("valid step");
        assert!(!response.exit);
        assert_eq!(response.progress, Some(40));
        assert_eq!(response.step.expect("target").id, "growth-type");
    }

    #[test]
    fn step_view_links_bond_results_to_simulators() {
        let view = step_view(WizardStep::ResultFamilyBonds);
        assert!(view.terminal);
        assert!(view.options.is_empty());
        assert_eq!(view.bond_simulator, Some("ROD"));
        assert_eq!(view.back, Some("safe-check"));

        let entry = step_view(WizardStep::Entry);
        assert_eq!(entry.back, None);
        assert_eq!(entry.progress, 10);
    }

    #[tokio::test]
    async fn handlers_map_validation_errors_to_bad_request() {
        let payload: ProjectionPayload =
            serde_json::from_str(r#"{ "childAge": 18 }"#).expect("json");
        let response = projection_handler_impl(Ok(payload));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let response = projection_handler_impl(Ok(ProjectionPayload::default()));
        assert_eq!(response.status(), StatusCode::OK);

        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    struct RawResponse {
        status_line: String,
        head: String,
        body: serde_json::Value,
    }

    async fn spawn_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(SessionConfig::default())).await;
        });
        addr
    }

    async fn send(addr: SocketAddr, request: String) -> RawResponse {
        let raw = tokio::task::spawn_blocking(move || {
            use std::io::{Read, Write};
            let mut stream = std::net::TcpStream::connect(addr).expect("connect");
            stream.write_all(request.as_bytes()).expect("write request");
            let mut out = String::new();
            stream.read_to_string(&mut out).expect("read response");
            out
        })
        .await
        .expect("client task");

        let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
        RawResponse {
            status_line: head.lines().next().unwrap_or_default().to_string(),
            head: head.to_ascii_lowercase(),
            body: serde_json::from_str(body).expect("json body"),
        }
    }

    fn get_request(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    fn post_request(path: &str, content_type: Option<&str>, body: &str) -> String {
        let content_type = content_type
            .map(|ct| format!("Content-Type: {ct}\r\n"))
            .unwrap_or_default();
        format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{content_type}Content-Length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    fn assert_json_error(response: &RawResponse, status: &str) {
        assert!(
            response.status_line.starts_with(&format!("HTTP/1.1 {status}")),
            "{}",
            response.status_line
        );
        assert!(response.head.contains("content-type: application/json"));
        assert!(response.head.contains("cache-control: no-store"));
        assert!(response.body["error"].is_string(), "{}", response.body);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn router_reports_every_rejection_as_json() {
        let addr = spawn_server().await;

        let response = send(
            addr,
            post_request(
                "/api/bonds/simulate",
                Some("application/json"),
                r#"{"product":"xyz"}"#,
            ),
        )
        .await;
        assert_json_error(&response, "400");

        let response = send(addr, post_request("/api/allocation", None, r#"{}"#)).await;
        assert_json_error(&response, "400");

        let response = send(addr, get_request("/api/projection?childAge=abc")).await;
        assert_json_error(&response, "400");

        let response = send(addr, get_request("/api/wizard/advance?option=a")).await;
        assert_json_error(&response, "400");
        assert_eq!(response.body["error"], "missing wizard step");

        let response = send(addr, get_request("/api/projection?childAge=18")).await;
        assert_json_error(&response, "400");

        let response = send(addr, get_request("/nope")).await;
        assert_json_error(&response, "404");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn router_serves_valid_requests() {
        let addr = spawn_server().await;

        let response = send(addr, get_request("/api/projection?childAge=5&monthlyDeposit=1200")).await;
        assert!(response.status_line.starts_with("HTTP/1.1 200"));
        assert!(response.head.contains("cache-control: no-store"));
        assert_eq!(response.body["yearsInvesting"], 13);

        let response = send(
            addr,
            post_request(
                "/api/wizard/advance",
                Some("application/json"),
                r#"{"step":"entry","option":"b"}"#,
            ),
        )
        .await;
        assert!(response.status_line.starts_with("HTTP/1.1 200"));
        assert_eq!(response.body["step"]["id"], "growth-type");
        assert_eq!(response.body["progress"], 40);

        let response = send(addr, get_request("/api/session")).await;
        assert_eq!(response.body["bannerVisible"], true);
        assert_eq!(response.body["analyticsEnabled"], false);
    }

    #[tokio::test]
    async fn session_endpoint_reflects_injected_consent() {
        let state = AppState {
            session: SessionConfig::new(Some(ConsentLevel::Necessary)),
        };
        let response = session_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
