use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use intake_core::ServiceCatalog;
use intake_events::Bus;
use intake_kernel::Kernel;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::model::{HttpModelClient, ModelClient, SyntheticModelClient};
use crate::{router, AppState};

pub(crate) fn state_dir() -> PathBuf {
    std::env::var("INTAKE_STATE_DIR")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub(crate) fn bind_addr_from_env() -> SocketAddr {
    std::env::var("INTAKE_BIND")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}

pub(crate) async fn build() -> anyhow::Result<(axum::Router, AppState)> {
    let catalog =
        Arc::new(ServiceCatalog::load_from_env().context("load service catalog")?);
    let kernel = Kernel::open(&state_dir()).context("open intake kernel")?;
    let bus = Bus::new(256);

    let model: Arc<dyn ModelClient> = match HttpModelClient::from_env(catalog.clone()) {
        Some(client) => Arc::new(client),
        None => {
            info!(
                target: "intake::bootstrap",
                "no INTAKE_MODEL_API_KEY set; using synthetic model client (heuristic-only)"
            );
            Arc::new(SyntheticModelClient)
        }
    };
    info!(
        target: "intake::bootstrap",
        backend = model.label(),
        services = catalog.entries().len(),
        state_dir = %state_dir().display(),
        "intake state ready"
    );

    let state = AppState::new(bus, kernel, catalog, model);
    let app = router::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());
    Ok((app, state))
}
