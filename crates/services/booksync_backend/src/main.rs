// File: services/booksync_backend/src/main.rs
use booksync_auth::{AuthSession, Authorizer, CredentialService, HttpOAuthClient};
use booksync_common::{
    config_error, create_client, external_service_error, http::client::DEFAULT_TIMEOUT_SECS,
    logging, BooksyncError, DestinationBookingProvider, ServiceFactory, SourceEventProvider,
};
use booksync_config::{load_config, AppConfig};
use booksync_db::{
    DbClient, DbClientFactory, InMemoryTokenStore, RepositoryFactory, TokenStore,
    TokenStoreFactory,
};
use booksync_sync::{SyncError, SyncOptions, SyncOrchestrator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod api;
mod service_factory;
use api::ApiState;
use service_factory::BooksyncServiceFactory;

#[tokio::main]
async fn main() -> Result<(), BooksyncError> {
    let config = Arc::new(load_config().map_err(config_error)?);
    let _log_guard = logging::init(&config.logging);

    let options = SyncOptions::from_config(&config.sync)?;
    if options.dry_run {
        info!("Dry run enabled");
    }

    let session = AuthSession::new();
    let (authorizer, db) = build_authorizer(&config, session.clone()).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn({
        let session = session.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
            session.cancel("shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let factory = BooksyncServiceFactory::new();
    let orchestrator = providers(&factory).map(|(source, destination)| {
        Arc::new(SyncOrchestrator::new(authorizer, source, destination, options))
    });

    // The server runs for the whole process so the browser redirect can land
    // while a cycle is waiting for it.
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening for OAuth callbacks on http://{}/auth_callback", addr);
    let app = booksync_auth::routes(session)
        .merge(api::routes(ApiState {
            orchestrator: orchestrator.clone(),
            db,
        }))
        .layer(TraceLayer::new_for_http());
    let server_shutdown = wait_for_shutdown(shutdown_rx.clone());
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown)
            .await
    });

    match orchestrator {
        Ok(orchestrator) => {
            info!(
                "Syncing {} week(s) every {:?}",
                orchestrator.options().weeks_to_sync,
                config.sync.interval()
            );
            orchestrator
                .run_periodically(config.sync.interval(), wait_for_shutdown(shutdown_rx))
                .await;
        }
        Err(kind) => {
            warn!(
                "{}, periodic sync disabled",
                SyncError::ProviderUnavailable(kind)
            );
            wait_for_shutdown(shutdown_rx).await;
        }
    }

    match server.await {
        Ok(Ok(())) => info!("HTTP server stopped"),
        Ok(Err(err)) => error!("HTTP server failed: {}", err),
        Err(err) => error!("HTTP server task failed: {}", err),
    }
    Ok(())
}

/// Both provider adapters, or the kind of the first one missing.
fn providers(
    factory: &dyn ServiceFactory,
) -> Result<(Arc<dyn SourceEventProvider>, Arc<dyn DestinationBookingProvider>), &'static str> {
    let source = factory.source_provider().ok_or("calendar")?;
    let destination = factory.destination_provider().ok_or("booking")?;
    Ok((source, destination))
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Builds the credential service on the configured token store, returning the
/// database client for health checks.
///
/// An empty database URL keeps refresh tokens in memory for the lifetime of the
/// process.
async fn build_authorizer(
    config: &AppConfig,
    session: AuthSession,
) -> Result<(Arc<dyn Authorizer>, Option<DbClient>), BooksyncError> {
    let http = create_client(DEFAULT_TIMEOUT_SECS)
        .map_err(|err| external_service_error("http client", err))?;
    let oauth = HttpOAuthClient::new(http, config.auth.clone())?;

    if config.database.url.trim().is_empty() {
        warn!("No database configured, refresh tokens are kept in memory only");
        let authorizer = credential_service(InMemoryTokenStore::new(), oauth, session, config);
        return Ok((authorizer, None));
    }

    let factory = DbClientFactory::from_db_config(&config.database);
    let client = factory.connect(&config.database).await?;
    let store = TokenStoreFactory::new().create_repository(client.clone());
    factory.bounded(store.init_schema()).await?;
    info!("Token store ready");

    Ok((credential_service(store, oauth, session, config), Some(client)))
}

fn credential_service<S>(
    store: S,
    oauth: HttpOAuthClient,
    session: AuthSession,
    config: &AppConfig,
) -> Arc<dyn Authorizer>
where
    S: TokenStore + 'static,
{
    Arc::new(
        CredentialService::new(store, oauth, session, config.sync.account_id.clone())
            .with_auth_config(&config.auth),
    )
}
