use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::{error::AppError, utils::config::get_config};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let api_state = ApiState::new(&config)?;
    info!(
        portal = %config.portal_base_url,
        timeout_secs = config.request_timeout_secs,
        "Portal client initialized"
    );

    let app: Router = api_routes().with_state(api_state);

    let listener = bind_listener(config.http_port).await?;

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn bind_listener(port: u16) -> Result<TcpListener, AppError> {
    info!("Starting server listening on 0.0.0.0:{}", port);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    Ok(listener)
}
