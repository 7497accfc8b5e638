mod api;
mod middleware;
mod session;

use std::sync::Arc;

use mtlresto_sources::{NominatimClient, OverpassClient, YelpClient};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    session::{spawn_venue_fetch, Session},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(mtlresto_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let area = Arc::new(mtlresto_core::load_area_or_default(&config.area_path)?);
    tracing::info!(area = %area.name, env = %config.env, "starting mtlresto-server");

    let pool_config = mtlresto_db::PoolConfig::from_app_config(&config);
    let pool = mtlresto_db::connect_pool(&config.database_url, pool_config).await?;
    mtlresto_db::run_migrations(&pool).await?;

    let overpass = OverpassClient::from_config(&config)?;
    let nominatim = NominatimClient::from_config(&config)?;
    let yelp = YelpClient::from_config(&config)?;
    if !yelp.has_api_key() {
        tracing::warn!("YELP_API_KEY not set; venue details will have no reviews");
    }

    let session = Session::shared(&area);
    spawn_venue_fetch(Arc::clone(&session), overpass, Arc::clone(&area));

    let state = AppState {
        pool,
        session,
        area,
        nominatim: Arc::new(nominatim),
        yelp: Arc::new(yelp),
        contact_mode: mtlresto_core::ValidationMode::default(),
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        mtlresto_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
