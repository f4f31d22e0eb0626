use axum::{Json, Router, routing::{get, post}};
use log::{LevelFilter, info};

use decoupe::solver::{Optimizer, Solution};
use decoupe::types::CutConfig;

async fn optimize(Json(config): Json<CutConfig>) -> Json<Solution> {
    // Degenerate dimensions are not an error: the engine answers with an
    // empty result and 100% waste.
    Json(Optimizer::new(config).optimize())
}

#[tokio::main]
async fn main() {
    decoupe::init_logger(LevelFilter::Info).expect("logger already initialized");

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize));

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
