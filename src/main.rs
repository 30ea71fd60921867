use std::process::ExitCode;
use std::sync::Arc;

use spa_server::config::{AppState, Config};
use spa_server::error::StartupError;
use spa_server::{logger, server};

fn main() -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // The logger is configured from this file, so it is not up yet
            eprintln!("[ERROR] {e}");
            return ExitCode::from(StartupError::from(e).exit_code());
        }
    };

    if let Err(e) = logger::init(&cfg.logging) {
        eprintln!("[ERROR] {e}");
        return ExitCode::from(e.exit_code());
    }

    match run(cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cfg: Config) -> Result<(), StartupError> {
    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let signals = server::ShutdownSignals::install()?;

    let bound = listener.local_addr().unwrap_or(addr);
    logger::log_server_start(&bound, &cfg);

    let state = Arc::new(AppState::new(cfg));
    server::serve(listener, state, signals.recv()).await;
    Ok(())
}
