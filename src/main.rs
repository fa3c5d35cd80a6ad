use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use marketplace_trust::config::AppConfig;
use marketplace_trust::error::AppError;
use marketplace_trust::telemetry;
use marketplace_trust::workflows::kyb::{
    kyb_router, InMemoryKybStore, KybService, OfflineCheckProvider, RecordingNotificationSink,
    XorObfuscationCipher,
};
use marketplace_trust::workflows::trust::{
    trust_router, BuyerMetrics, InMemoryTrustStore, ScoreEngine, TrustScoreService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Marketplace Trust Service",
    about = "Run the buyer trust scoring and supplier KYB verification service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Trust engine utilities
    Trust {
        #[command(subcommand)]
        command: TrustCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum TrustCommand {
    /// Score a metric bundle supplied on the command line
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// On-time payment percentage (0-100)
    #[arg(long, default_value_t = 100.0)]
    on_time_pct: f64,
    /// Number of late payments
    #[arg(long, default_value_t = 0)]
    late_payments: u64,
    /// Total purchase volume in account currency
    #[arg(long, default_value_t = 0.0)]
    total_purchased: f64,
    /// Total dispute count
    #[arg(long, default_value_t = 0)]
    disputes: u64,
    /// Chargeback count
    #[arg(long, default_value_t = 0)]
    chargebacks: u64,
    /// Chargeback rate percentage (0-100)
    #[arg(long, default_value_t = 0.0)]
    chargeback_rate: f64,
    /// Seller-side dispute win rate percentage (0-100)
    #[arg(long, default_value_t = 0.0)]
    seller_win_rate: f64,
    /// Return rate percentage (0-100)
    #[arg(long, default_value_t = 0.0)]
    return_rate: f64,
    /// Unreasonable return count
    #[arg(long, default_value_t = 0)]
    unreasonable_returns: u64,
    /// Positive review ratio (0-1)
    #[arg(long, default_value_t = 0.0)]
    positive_review_ratio: f64,
    /// Communication issue count
    #[arg(long, default_value_t = 0)]
    communication_issues: u64,
    /// Treat the buyer's KYB as verified
    #[arg(long)]
    kyb_verified: bool,
    /// KYB verification issue count
    #[arg(long, default_value_t = 0)]
    kyb_issues: u64,
    /// Missing documentation count
    #[arg(long, default_value_t = 0)]
    missing_documents: u64,
    /// Sanctions flag count
    #[arg(long, default_value_t = 0)]
    sanctions_flags: u64,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Trust {
            command: TrustCommand::Score(args),
        } => {
            run_trust_score(args);
            Ok(())
        }
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let trust_store = Arc::new(InMemoryTrustStore::default());
    let trust_service = Arc::new(TrustScoreService::new(
        trust_store.clone(),
        trust_store.clone(),
    ));

    let kyb_store = Arc::new(InMemoryKybStore::default());
    let notifications = Arc::new(RecordingNotificationSink::default());
    let provider = Arc::new(OfflineCheckProvider::default());
    let cipher = Arc::new(XorObfuscationCipher::default());
    let kyb_service = Arc::new(KybService::new(kyb_store, notifications, provider, cipher));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(trust_router(trust_service))
        .merge(kyb_router(kyb_service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace trust service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_trust_score(args: ScoreArgs) {
    let mut metrics = BuyerMetrics::neutral();
    metrics.on_time_payment_pct = args.on_time_pct;
    metrics.late_payment_count = args.late_payments;
    metrics.total_purchased = args.total_purchased;
    metrics.total_disputes = args.disputes;
    metrics.chargeback_count = args.chargebacks;
    metrics.chargeback_rate_pct = args.chargeback_rate;
    metrics.seller_win_rate_pct = args.seller_win_rate;
    metrics.return_rate_pct = args.return_rate;
    metrics.unreasonable_return_count = args.unreasonable_returns;
    metrics.positive_review_ratio = args.positive_review_ratio;
    metrics.communication_issue_count = args.communication_issues;
    metrics.kyb_verified = args.kyb_verified;
    metrics.kyb_issue_count = args.kyb_issues;
    metrics.missing_documentation_count = args.missing_documents;
    metrics.sanctions_flag_count = args.sanctions_flags;

    let outcome = ScoreEngine::score(&metrics);

    println!("Component scores");
    println!("  payment reliability : {}", outcome.components.payment);
    println!("  dispute history     : {}", outcome.components.dispute);
    println!("  behavioral          : {}", outcome.components.behavioral);
    println!("  compliance          : {}", outcome.components.compliance);
    println!("  communication       : {}", outcome.components.communication);
    println!();
    println!("Overall score : {}", outcome.overall);
    println!("Risk level    : {}", outcome.risk_level.label());
    match outcome.risk_category {
        Some(category) => println!("Risk category : {} ({})", category.key(), category.label()),
        None => println!("Risk category : none"),
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
