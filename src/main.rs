//! Pick & Survive backend entrypoint wiring configuration, storage and the REST API.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pick_survive_back::{
    config::{AppConfig, StorageBackend},
    dao::pool_store::memory::{MemoryPoolStore, PoolData, load_seed},
    routes,
    services::authorization::StaticTokenAuthorizer,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.admin_token.is_none() {
        warn!("no admin token configured; match settlement is disabled");
    }

    let authorizer = Arc::new(StaticTokenAuthorizer::new(config.admin_token.clone()));
    let app_state = AppState::new(authorizer);

    install_storage(&app_state, &config).await?;
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured storage backend. MongoDB is connected in the background and the
/// service stays degraded until it is reachable.
async fn install_storage(state: &SharedState, config: &AppConfig) -> anyhow::Result<()> {
    match config.storage {
        StorageBackend::Memory => {
            let data = match &config.seed_path {
                Some(path) => load_seed(path)
                    .with_context(|| format!("loading seed file {}", path.display()))?,
                None => PoolData::default(),
            };
            info!(
                matches = data.matches.len(),
                participants = data.participants.len(),
                picks = data.picks.len(),
                "using in-memory storage"
            );
            state
                .set_pool_store(Arc::new(MemoryPoolStore::new(data)))
                .await;
            Ok(())
        }
        StorageBackend::Mongo => spawn_mongo_supervisor(state.clone(), config),
    }
}

#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: SharedState, config: &AppConfig) -> anyhow::Result<()> {
    use pick_survive_back::{
        dao::{
            pool_store::{
                PoolStore,
                mongodb::{MongoConfig, MongoPoolStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let uri = config.mongo_uri.clone();
    let db_name = config.mongo_db.clone();
    tokio::spawn(storage_supervisor::run(state, move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let mongo_config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoPoolStore::connect(mongo_config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn PoolStore>)
        }
    }));
    Ok(())
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(_state: SharedState, _config: &AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("MongoDB storage requested but the `mongo-store` feature is disabled")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
