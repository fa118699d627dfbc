use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod data;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    server::start_server_loop(listener, state, active_connections).await
}
