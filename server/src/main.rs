use std::path::Path;

use clap::Parser;
use engine::Engine;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
  EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use server::{
  Cli,
  config::Config,
  http::{self, shared::AppState},
};

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  let _guard = init_tracing(cli.log_dir.as_deref());

  let config = match &cli.config_path {
    Some(path) => match Config::from_path(path) {
      Ok(config) => config,
      Err(e) => {
        tracing::error!("{e}");
        std::process::exit(1);
      }
    },
    None => Config::default(),
  };
  let address = cli.address.unwrap_or_else(|| config.server.address());

  let environment = config.environment.build();
  tracing::info!(
    wind = ?config.environment.wind(),
    terrain = ?config.environment.terrain(),
    "Environment has {} effects",
    environment.len()
  );

  let engine = Engine::new(config.engine).with_environment(environment);
  let app_state = AppState::new(engine.handle(), CancellationToken::new());

  let engine_lifetime = CancellationToken::new();
  let engine_task = tokio::spawn(engine.run(engine_lifetime.clone()));

  tokio::spawn(wait_for_ctrl_c(app_state.shutdown.clone()));

  let shutdown = app_state.shutdown.clone();
  let served = http::run(address, app_state).await;
  shutdown.cancel();

  engine_lifetime.cancel();
  if let Err(e) = engine_task.await {
    tracing::error!("Engine task failed: {e}");
  }

  match served {
    Ok(()) => tracing::info!("Shutdown complete"),
    Err(e) => {
      tracing::error!("Unable to serve on {address}: {e}");
      std::process::exit(2);
    }
  }
}

/// Logs to stdout, and to a daily file under `log_dir` when given. The
/// returned guard flushes the file writer on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info"));
  let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

  match log_dir {
    Some(log_dir) => {
      let appender = tracing_appender::rolling::daily(log_dir, "flightsim.log");
      let (writer, guard) = tracing_appender::non_blocking(appender);
      registry
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

      Some(guard)
    }
    None => {
      registry.init();
      None
    }
  }
}

async fn wait_for_ctrl_c(shutdown: CancellationToken) {
  match tokio::signal::ctrl_c().await {
    Ok(()) => {
      tracing::info!("Shutting down...");
      shutdown.cancel();
    }
    Err(e) => tracing::error!("Unable to listen for Ctrl-C: {e}"),
  }
}
