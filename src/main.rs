//! Ocular HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use ocular::config::Config;
use ocular::embedding::{ClipScorer, ClipScorerConfig};
use ocular::gateway::{HandlerState, create_router_with_limit};
use ocular::scoring::VerifyPolicy;
use ocular::taskstore::HttpTaskStore;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
 ██████╗  ██████╗██╗   ██╗██╗      █████╗ ██████╗
██╔═══██╗██╔════╝██║   ██║██║     ██╔══██╗██╔══██╗
██║   ██║██║     ██║   ██║██║     ███████║██████╔╝
██║   ██║██║     ██║   ██║██║     ██╔══██║██╔══██╗
╚██████╔╝╚██████╗╚██████╔╝███████╗██║  ██║██║  ██║
 ╚═════╝  ╚═════╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝

        LOOK. SCORE. DECIDE.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        threshold = config.threshold,
        "Ocular starting"
    );

    let scorer_config = if let Some(path) = &config.model_path {
        ClipScorerConfig::new(path.clone())
    } else {
        tracing::warn!("No OCULAR_MODEL_PATH configured, running scorer in stub mode");
        ClipScorerConfig::stub()
    };
    let scorer = Arc::new(ClipScorer::load(scorer_config)?);

    let task_store = match &config.task_api_url {
        Some(url) => Some(Arc::new(HttpTaskStore::new(url.clone())?)),
        None => {
            tracing::warn!(
                "No OCULAR_TASK_API_URL configured, task endpoints and point credits disabled"
            );
            None
        }
    };

    let policy = VerifyPolicy::new(config.threshold);

    let state = HandlerState::new(scorer, task_store, policy)
        .with_distractors(config.distractors.clone())
        .with_default_keyword(config.default_keyword.clone())
        .with_reward_points(config.reward_points)
        .with_inference_timeout(Duration::from_secs(config.inference_timeout_secs));

    let app = create_router_with_limit(state, config.max_upload_bytes);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Ocular shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("OCULAR_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
