pub mod api;
pub mod audit;
pub mod config;
pub mod grid;
pub mod intake;
pub mod models;
pub mod poller;
pub mod report;
pub mod rules;
pub mod ui;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use api::ComplianceApi;

/// Launch options resolved from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit service base URL; otherwise the environment or the default.
    pub api_url: Option<String>,
    /// Run against the built-in demo data set instead of a live service.
    pub demo: bool,
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("MedGuard starting v{}", config::APP_VERSION);

    let api: Arc<dyn ComplianceApi> = if options.demo {
        tracing::info!("Demo mode: using the built-in sample clinic");
        Arc::new(api::demo::demo_api())
    } else {
        let url = config::resolve_api_url(options.api_url.as_deref());
        tracing::info!(url, "Connecting to compliance service");
        Arc::new(api::HttpApiClient::new(&url))
    };

    ui::App::new(api, options.demo).run()
}
