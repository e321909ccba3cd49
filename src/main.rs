//! Who Says Back binary entrypoint wiring the REST API, storage supervision and background jobs.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use who_says_back::{
    config::{AppConfig, StorageBackend},
    dao::{
        game_store::{WhoSaysStore, memory::MemoryStore},
        storage::StorageError,
    },
    routes,
    services::{
        jobs,
        mailer::{LogMailer, Mailer},
        storage_supervisor,
    },
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let mailer = build_mailer(&config);
    let storage = config.storage;
    let app_state = AppState::new(config, mailer);

    spawn_storage(app_state.clone(), storage);
    jobs::spawn_worker(app_state.clone()).await;
    jobs::spawn_schedules(app_state.clone());

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the storage supervisor for the configured backend.
fn spawn_storage(state: SharedState, backend: StorageBackend) {
    match backend {
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use who_says_back::dao::game_store::mongodb::{MongoConfig, MongoStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn WhoSaysStore>)
            }));
        }
        #[cfg(not(feature = "mongo-store"))]
        StorageBackend::Mongo => {
            warn!("built without the `mongo-store` feature; using the in-memory store");
            spawn_memory_store(state);
        }
        StorageBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            spawn_memory_store(state);
        }
    }
}

fn spawn_memory_store(state: SharedState) {
    let store = MemoryStore::new();
    tokio::spawn(storage_supervisor::run(state, move || {
        let store = store.clone();
        async move { Ok::<_, StorageError>(Arc::new(store) as Arc<dyn WhoSaysStore>) }
    }));
}

/// Pick the webhook mailer when a relay is configured, the logging mailer otherwise.
fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match config.mail_webhook_url.as_deref() {
        #[cfg(feature = "webhook-mailer")]
        Some(url) => {
            info!(url, "reminder emails go through the mail relay");
            Arc::new(who_says_back::services::mailer::WebhookMailer::new(url))
        }
        #[cfg(not(feature = "webhook-mailer"))]
        Some(_) => {
            warn!("built without the `webhook-mailer` feature; reminder emails are only logged");
            Arc::new(LogMailer)
        }
        None => Arc::new(LogMailer),
    }
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
}
