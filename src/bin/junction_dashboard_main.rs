use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use junction_dashboard::communication::telemetry_client::TelemetryClient;
use junction_dashboard::config::{load_config, ConfigOverrides};
use junction_dashboard::global_variables::DEFAULT_CONFIG_FILE;
use junction_dashboard::monitoring::admin_cli::run_cli;
use junction_dashboard::monitoring::dashboard_controller::DashboardController;
use junction_dashboard::monitoring::renderer::run_console_renderer;
use junction_dashboard::monitoring::runtime::{shared, spawn_dashboard_tasks};
use junction_dashboard::simulation_engine::perturbation::RngSource;

#[derive(Debug, Parser)]
#[command(name = "junction_dashboard", about = "Traffic junction monitoring dashboard")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the telemetry backend URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Overrides the tick length in milliseconds.
    #[arg(long)]
    tick_millis: Option<u64>,
    /// Print the dashboard every N ticks (0 disables).
    #[arg(long)]
    render_every: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args.config)?.with_overrides(ConfigOverrides {
        base_url: args.base_url,
        tick_millis: args.tick_millis,
        render_every_ticks: args.render_every,
    })?;

    let controller = DashboardController::demo(config.timings, Box::new(RngSource::from_os_rng()))?
        .with_perturbation_every(config.perturbation_every_ticks);
    let snapshots = controller.subscribe();
    let dashboard = shared(controller);
    let client = TelemetryClient::new(&config.base_url, config.http_timeout())?;

    println!("Starting junction dashboard against {}...", config.base_url);
    let tasks = spawn_dashboard_tasks(&dashboard, &client, &config)?;
    let renderer = tokio::spawn(run_console_renderer(snapshots, config.render_every_ticks));

    // The admin CLI reads stdin, so it gets a blocking thread. Exiting it ends the session.
    let cli_dashboard = Arc::clone(&dashboard);
    if let Err(e) = tokio::task::spawn_blocking(move || run_cli(cli_dashboard)).await {
        eprintln!("Admin CLI stopped unexpectedly: {}", e);
    }

    for task in tasks {
        task.abort();
    }
    renderer.abort();
    Ok(())
}
