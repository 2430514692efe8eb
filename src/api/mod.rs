use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{Assumptions, DisplayPanel, Projection, project};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "shelter",
    about = "TSFA vs RRSP comparison (inflation-adjusted future values)"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = 30.0,
        help = "Current marginal tax rate in percent"
    )]
    current_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Expected marginal tax rate at withdrawal in percent"
    )]
    retirement_tax_rate: f64,
    #[arg(long, default_value_t = 1000.0, help = "Deposit amount in dollars")]
    deposit_amount: f64,
    #[arg(
        long,
        default_value_t = 10,
        help = "Investment horizon in whole years"
    )]
    years_of_investment: u32,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Expected nominal annual return in percent"
    )]
    return_on_investment: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_tax_rate: Option<f64>,
    retirement_tax_rate: Option<f64>,
    deposit_amount: Option<f64>,
    years_of_investment: Option<u32>,
    return_on_investment: Option<f64>,
    inflation_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    years_of_investment: u32,
    projection: Projection,
    formatted: DisplayPanel,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_assumptions(cli: Cli) -> Result<Assumptions, String> {
    if !(0.0..100.0).contains(&cli.current_tax_rate) {
        return Err("--current-tax-rate must be at least 0 and below 100".to_string());
    }

    if !(0.0..100.0).contains(&cli.retirement_tax_rate) {
        return Err("--retirement-tax-rate must be at least 0 and below 100".to_string());
    }

    if !cli.deposit_amount.is_finite() || cli.deposit_amount <= 0.0 {
        return Err("--deposit-amount must be > 0".to_string());
    }

    if cli.years_of_investment == 0 {
        return Err("--years-of-investment must be > 0".to_string());
    }

    if !cli.return_on_investment.is_finite() {
        return Err("--return-on-investment must be finite".to_string());
    }

    if !cli.inflation_rate.is_finite() || cli.inflation_rate <= -100.0 {
        return Err("--inflation-rate must be > -100".to_string());
    }

    Ok(Assumptions {
        current_tax_rate: cli.current_tax_rate / 100.0,
        retirement_tax_rate: cli.retirement_tax_rate / 100.0,
        deposit_amount: cli.deposit_amount,
        years_of_investment: cli.years_of_investment,
        return_on_investment: cli.return_on_investment / 100.0,
        inflation_rate: cli.inflation_rate / 100.0,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Shelter HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
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

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let assumptions = match assumptions_from_payload(payload) {
        Ok(assumptions) => assumptions,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let projection = match project(&assumptions) {
        Ok(projection) => projection,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let response = ProjectResponse {
        years_of_investment: assumptions.years_of_investment,
        projection,
        formatted: DisplayPanel::render(assumptions.years_of_investment, &projection),
    };
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn assumptions_from_json(json: &str) -> Result<Assumptions, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    assumptions_from_payload(payload)
}

fn assumptions_from_payload(payload: ProjectPayload) -> Result<Assumptions, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_tax_rate {
        cli.current_tax_rate = v;
    }
    if let Some(v) = payload.retirement_tax_rate {
        cli.retirement_tax_rate = v;
    }
    if let Some(v) = payload.deposit_amount {
        cli.deposit_amount = v;
    }
    if let Some(v) = payload.years_of_investment {
        cli.years_of_investment = v;
    }
    if let Some(v) = payload.return_on_investment {
        cli.return_on_investment = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }

    build_assumptions(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_tax_rate: 30.0,
        retirement_tax_rate: 20.0,
        deposit_amount: 1_000.0,
        years_of_investment: 10,
        return_on_investment: 5.0,
        inflation_rate: 2.0,
    }
}
