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
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::filter::LevelFilter;

use crate::config::Config;
use crate::db::db::DBClient;
use crate::routes::create_router;
use crate::service::payment_gateway::PaymentGatewayService;

pub struct AppState {
    pub env: Config,
    pub db_client: DBClient,
    pub payment_gateway: Option<PaymentGatewayService>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let payment_gateway = PaymentGatewayService::from_config(&config);
    if payment_gateway.is_none() {
        println!("ℹ️  PAYMENT_SECRET_KEY not set - payment endpoints disabled");
    }

    let allowed_origin = config
        .app_url
        .parse::<HeaderValue>()
        .expect("APP_URL is not a valid origin");

    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app_state = Arc::new(AppState {
        env: config.clone(),
        db_client: DBClient::new(pool),
        payment_gateway,
    });

    let app = create_router(app_state).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
