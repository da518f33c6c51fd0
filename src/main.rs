use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bitacora::{config::Settings, db, routes, session::SessionEvents, state::AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    let pool = db::init_db(&settings).await;
    tracing::info!("✅ Conexión a Postgres exitosa");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let puerto = settings.port;
    let state = AppState {
        pool,
        settings: Arc::new(settings),
        sessions: SessionEvents::new(64),
    };

    let app = routes::create_routes(state).layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", puerto)
        .parse()
        .expect("Dirección IP/Puerto inválido");

    tracing::info!("🚀 Bitácora corriendo en http://{}", addr);

    let listener = TcpListener::bind(addr).await.expect("Fallo al enlazar el puerto");
    axum::serve(listener, app).await.unwrap();
}
