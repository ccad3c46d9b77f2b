use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod bootstrap;
mod extract;
mod http_timeout;
mod model;
mod openapi;
mod responses;
mod router;
mod turn;

pub(crate) use app_state::AppState;

fn init_tracing() {
    let filter = std::env::var("INTAKE_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    http_timeout::init_from_env();

    let (app, _state) = match bootstrap::build().await {
        Ok(built) => built,
        Err(err) => {
            eprintln!("error: failed to start intake server: {err:#}");
            std::process::exit(2);
        }
    };

    let addr = bootstrap::bind_addr_from_env();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind server socket");
    info!(%addr, "intake server listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!("http server exited with error: {err}");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
