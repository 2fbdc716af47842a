mod config;
mod db;
mod error;
mod flash;
mod forms;
mod handler;
mod middleware;
mod models;
mod routes;
mod session;
mod tracing_config;
mod uploads;
mod usecase;
mod utils;
mod view;

use std::sync::Arc;

use config::Config;
use db::DBClient;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_config::init_tracing;
use uploads::UploadDir;

#[derive(Clone)]
pub struct AppState {
    pub env: Arc<Config>,
    pub db_client: DBClient,
    pub uploads: UploadDir,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("🔥 Invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let _guard = init_tracing(&config.log_dir);

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅Connection to the database is successful!");
            pool
        }
        Err(err) => {
            tracing::error!(error = %err, "🔥 Failed to connect to the database");
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);
    if let Err(err) = db_client.migrate().await {
        tracing::error!(error = %err, "🔥 Failed to run migrations");
        std::process::exit(1);
    }

    let uploads = UploadDir::new(config.upload_folder.clone());
    if let Err(err) = uploads.ensure().await {
        tracing::error!(error = %err, folder = %config.upload_folder, "🔥 Failed to create upload folder");
        std::process::exit(1);
    }

    let app_state = AppState {
        env: Arc::new(config.clone()),
        db_client,
        uploads,
    };

    let app = routes::create_router(app_state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port = config.port, "🔥 Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server stopped");
    }
}
