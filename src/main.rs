use std::process;
use std::sync::Arc;

use corale::{
    application::{
        admin::{AdminCatalog, AdminDeps},
        catalog::{CatalogDeps, PublicCatalog},
        error::AppError,
        repos::{
            ArtistsRepo, ArtistsWriteRepo, CategoriesRepo, CirclesRepo, CirclesWriteRepo,
            OfficialRepo, ReleasesRepo, ReleasesWriteRepo, TracksRepo,
        },
    },
    cache::TtlStore,
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_state(repositories, &settings);

    serve(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::pool(err)))?;

    if settings.database.run_migrations {
        PostgresRepositories::run_migrations(&pool)
            .await
            .map_err(|err| AppError::from(InfraError::migration(err)))?;
    }

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> http::AppState {
    let artists_repo: Arc<dyn ArtistsRepo> = repositories.clone();
    let artists_write_repo: Arc<dyn ArtistsWriteRepo> = repositories.clone();
    let circles_repo: Arc<dyn CirclesRepo> = repositories.clone();
    let circles_write_repo: Arc<dyn CirclesWriteRepo> = repositories.clone();
    let releases_repo: Arc<dyn ReleasesRepo> = repositories.clone();
    let releases_write_repo: Arc<dyn ReleasesWriteRepo> = repositories.clone();
    let tracks_repo: Arc<dyn TracksRepo> = repositories.clone();
    let official_repo: Arc<dyn OfficialRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();

    let store = Arc::new(TtlStore::new());

    let catalog = Arc::new(PublicCatalog::new(CatalogDeps {
        artists: artists_repo.clone(),
        circles: circles_repo.clone(),
        releases: releases_repo.clone(),
        tracks: tracks_repo,
        official: official_repo,
        categories: categories_repo,
        store: store.clone(),
        cache: settings.cache.clone(),
    }));

    let admin = Arc::new(AdminCatalog::new(AdminDeps {
        artists: artists_repo,
        artists_write: artists_write_repo,
        circles: circles_repo,
        circles_write: circles_write_repo,
        releases: releases_repo,
        releases_write: releases_write_repo,
        store,
    }));

    http::AppState {
        catalog,
        admin,
        db: repositories,
        cache: settings.cache.clone(),
        admin_token: settings.admin.token.as_deref().map(Arc::from),
    }
}

async fn serve(settings: &config::Settings, state: http::AppState) -> Result<(), AppError> {
    let admin_enabled = state.admin_token.is_some();
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::listener(settings.server.addr, err)))?;

    info!(
        addr = %settings.server.addr,
        admin_enabled,
        drain_window_secs = settings.server.graceful_shutdown.as_secs(),
        "listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, draining connections");
}
