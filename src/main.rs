mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::{AdminSeed, Config};
use db::{db::DBClient, MarketStore};
use dotenv::dotenv;
use models::usermodel::UserRole;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    application_service::ApplicationService, contract_service::ContractService,
    dispute_service::DisputeService, job_service::JobService, rating_service::RatingService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn MarketStore>,
    // Services
    pub job_service: Arc<JobService>,
    pub application_service: Arc<ApplicationService>,
    pub contract_service: Arc<ContractService>,
    pub rating_service: Arc<RatingService>,
    pub dispute_service: Arc<DisputeService>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn MarketStore>, config: Config) -> Self {
        Self {
            env: config,
            job_service: Arc::new(JobService::new(db_client.clone())),
            application_service: Arc::new(ApplicationService::new(db_client.clone())),
            contract_service: Arc::new(ContractService::new(db_client.clone())),
            rating_service: Arc::new(RatingService::new(db_client.clone())),
            dispute_service: Arc::new(DisputeService::new(db_client.clone())),
            db_client,
        }
    }
}

/// Creates the configured admin account unless that email is already taken.
async fn seed_admin(db_client: &dyn MarketStore, seed: &AdminSeed) -> Result<(), String> {
    let existing = db_client
        .get_user(None, Some(&seed.email))
        .await
        .map_err(|e| e.to_string())?;

    if let Some(user) = existing {
        if user.role != UserRole::Admin {
            tracing::warn!("Admin email {} belongs to a {} account", seed.email, user.role.to_str());
        }
        return Ok(());
    }

    let hashed_password = utils::password::hash(&seed.password).map_err(|e| e.to_string())?;
    let admin = db_client
        .save_user(
            seed.name.clone(),
            seed.email.clone(),
            hashed_password,
            UserRole::Admin,
            None,
            Vec::new(),
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!("Seeded admin account {}", admin.id);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = Config::init();

    tracing_subscriber::fmt()
        .with_max_level(
            config
                .log_level
                .parse::<LevelFilter>()
                .unwrap_or(LevelFilter::DEBUG),
        )
        .init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);
    if let Err(err) = db_client.migrate().await {
        tracing::error!("Failed to run migrations: {}", err);
        std::process::exit(1);
    }

    let db_client: Arc<dyn MarketStore> = Arc::new(db_client);

    if let Some(seed) = &config.admin {
        if let Err(err) = seed_admin(db_client.as_ref(), seed).await {
            tracing::error!("Failed to seed admin account: {}", err);
        }
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
