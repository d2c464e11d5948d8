/*
 * Responsibility
 * - Load Config → build dependencies → assemble the Router
 * - Attach the GraphQL server and HTTP middleware (CORS, trace, limits)
 * - Start axum::serve()
 */
use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::{panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::graphql::{self, AppSchema, GraphqlOptions, GraphqlServer};
use crate::middleware;
use crate::repos::user_repo::UserRepo;
use crate::services::accounts::{TokenExpirationPolicy, TokenResolver};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,graphql_login_context=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting GraphQL API in {:?} mode on {} (path {}, debug {})",
        config.app_env,
        config.addr,
        config.graphql_path,
        config.graphql_debug
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let users = UserRepo::new(pool);
    let server = build_graphql_server(&config, users.clone());
    let app = build_router(AppState::new(users), server, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn build_graphql_server(config: &Config, users: UserRepo) -> GraphqlServer<AppSchema> {
    let policy = TokenExpirationPolicy::from_days(config.login_expiration_days);
    let resolver = TokenResolver::new(Arc::new(users), policy);

    graphql::create_graphql_server(
        graphql::build_schema(),
        resolver,
        GraphqlOptions::from_config(config),
    )
}

fn build_router(state: AppState, server: GraphqlServer<AppSchema>, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    let router = graphql::apply(router, server);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
