//! Claim Flow - Terminal Driver Binary
//!
//! Reads one command per line from stdin and drives a single claim session
//! against the claims backend.
//!
//! # Usage
//!
//! ```bash
//! CLAIMS_BASE_URL=https://claims.example.org cargo run --bin claim-flow
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIMS_BASE_URL` - Backend base URL (default: http://localhost:8000)
//! * `CLAIMS_TIMEOUT_SECS` - Per-attempt request timeout (default: 60)
//! * `CLAIMS_CREDENTIALS_PATH` - Token file (default: .claim-flow/credentials.json)
//! * `CLAIMS_DEADLINE_MODE` - `wall_clock` or `tick_accumulated`
//! * `CLAIMS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{AdapterHealth, HealthCheckable};
use domain_claims::{
    ClaimWorkflow, ClaimsAdapter, DeadlineStatus, DocumentsAdapter, WeatherAdapter, WorkflowPorts,
};
use infra_http::{ApiClient, FileTokenStore, ReqwestTransport};
use interface_cli::{render, AppConfig, Command, Driver, Reply};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid CLAIMS_* configuration")?;
    init_tracing(&config.log_level);

    tracing::info!(base_url = %config.base_url, "Starting claim-flow");

    let client_config = config.client_config();
    let transport =
        ReqwestTransport::new(&client_config).context("failed to build HTTP transport")?;
    let store = FileTokenStore::new(config.credentials_path.clone());
    let client = Arc::new(ApiClient::new(
        client_config,
        Arc::new(transport),
        Arc::new(store),
    ));

    warm_up(&client).await;

    let ports = WorkflowPorts {
        weather: Arc::new(WeatherAdapter::new(client.clone())),
        claims: Arc::new(ClaimsAdapter::new(client.clone())),
        documents: Arc::new(DocumentsAdapter::new(client.clone())),
    };
    let workflow = Arc::new(ClaimWorkflow::new(ports, config.workflow_config()));
    tokio::spawn(watch_deadline(workflow.deadline_updates()));

    let driver = Driver::new(client, workflow);
    println!("{}", render::session_summary(&driver.workflow().session(), None));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, abandoning session");
                None
            }
        };
        let Some(line) = line else {
            driver.workflow().abandon().await;
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match driver.execute(command).await {
            Ok(Reply::Print(text)) => println!("{}", text),
            Ok(Reply::Exit) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    tracing::info!("Session closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they do not interleave with command output.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Pings the backend once; a cold backend can take a while to answer
async fn warm_up(client: &ApiClient) {
    let result = client.health_check().await;
    match result.status {
        AdapterHealth::Healthy => tracing::info!("Backend reachable"),
        status => tracing::warn!(?status, message = ?result.message, "Backend not healthy yet"),
    }
}

/// Prints the countdown whenever its urgency changes or the window closes
async fn watch_deadline(mut updates: watch::Receiver<Option<DeadlineStatus>>) {
    let mut last: Option<(bool, bool)> = None;
    while updates.changed().await.is_ok() {
        let Some(status) = *updates.borrow_and_update() else {
            continue;
        };
        let flags = (status.urgent, status.expired);
        if last != Some(flags) {
            println!("Deadline: {}", render::deadline_line(&status));
            last = Some(flags);
        }
    }
}
