//! Hosting Server Binary
//!
//! Runs the HTTP server that hosts live hold'em tables: starting hands,
//! applying actions, and streaming game events over WebSocket.

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use nlh_core::Config;
use nlh_server::AppState;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    nlh_core::log_init();
    nlh_core::shutdown_on_ctrlc();

    let config = Config::from_env();
    let repo = Arc::new(build_repo(&config).await);
    let state = web::Data::new(AppState::new(repo, &config));
    let bind_addr = config.bind_addr.clone();

    log::info!("starting hosting server on {bind_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(state.clone())
            .configure(nlh_server::configure)
    })
    .workers(num_cpus::get())
    .bind(bind_addr)?
    .run()
    .await
}

#[cfg(not(feature = "postgres"))]
async fn build_repo(_config: &Config) -> nlh_server::Repo {
    nlh_store::MemoryRepository::new()
}

#[cfg(feature = "postgres")]
async fn build_repo(config: &Config) -> nlh_server::Repo {
    let repo = nlh_store::PgRepository::connect(&config.database_url)
        .await
        .expect("connect to database");
    repo.migrate().await.expect("apply schema");
    repo
}
