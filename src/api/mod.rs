use crate::common::context::Context;
use crate::common::init;
use crate::common::state::{AppState, MessagingLimits};
use crate::repositories::connections::ConnectionRegistry;
use crate::repositories::messages::MessageStore;
use crate::repositories::presences::PresenceMirror;
use crate::repositories::users::UserDirectory;
use crate::settings::AppSettings;
use crate::workers::crons::cleanup_cron;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::get;
use std::convert::Infallible;
use tokio::net::TcpListener;
use tracing::{error, info};

pub mod v1;

pub struct RequestContext {
    pub state: AppState,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .nest("/api/v1", v1::router())
}

pub async fn index() -> &'static str {
    "Running messaging-service v0.1"
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let sweeper = tokio::spawn(cleanup_cron::serve(
        state.clone(),
        settings.session_sweep_interval,
        settings.session_idle_timeout,
    ));

    let listener = TcpListener::bind((settings.app_host, settings.app_port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    let result = axum::serve(listener, router().with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    Ok(result?)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => error!("Failed to listen for shutdown signal: {e:?}"),
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            state: state.clone(),
        })
    }
}

impl Context for RequestContext {
    fn messages(&self) -> &dyn MessageStore {
        self.state.messages()
    }

    fn users(&self) -> &dyn UserDirectory {
        self.state.users()
    }

    fn connections(&self) -> &ConnectionRegistry {
        self.state.connections()
    }

    fn limits(&self) -> &MessagingLimits {
        self.state.limits()
    }

    fn presences(&self) -> Option<&dyn PresenceMirror> {
        self.state.presences()
    }
}
