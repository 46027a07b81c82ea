//! Documentation of the hive party game backend.
//!
//! A host opens a hive (a game) on one of their decks, every player picks a card and writes a
//! short entry about it, and the entries end up on postcards.
//!
//!
//!
//! # General Infrastructure
//! - One axum server, JSON in and JSON out
//! - Every resource is a flat table, see the `tables` crate
//! - Storage is either CSV files under `DATA_DIR` or tabs of a Google spreadsheet
//! - Card images are served straight from `IMAGE_DIR` under `/images`
//!
//!
//!
//! # Endpoints
//!
//! ## Service
//! - `GET /` welcome message, version and timestamp
//! - `GET /test`, `GET /custom` liveness probes
//! - `POST /createuserentry` echo of `{ "entry": ... }`
//! - `GET|POST /api/items`, `GET /api/items/{id}` sample data for frontend wiring
//!
//! ## Game
//! - `GET|POST /api/users`, `GET /api/users/{id}`
//! - `GET|POST /api/decks`, `GET /api/decks/{id}`, `GET|POST /api/decks/{id}/cards`
//! - `GET|POST /api/cards`, `GET /api/cards/{id}`
//! - `GET|POST /api/games`, `GET /api/games/{id}`
//! - `GET /api/games/{id}/entries`, `GET /api/games/{id}/postcards`
//! - `POST /api/createentry`, `GET /api/entries?game_id=`
//! - `POST /api/postcards`
//!
//! ## Media
//! - `GET|POST /api/media`, `PATCH /api/media/{id}`
//! - `GET|POST /api/mediaentries`
//!
//!
//!
//! # Errors
//!
//! Every failure is `{ "error": message, "status_code": code }`.
//!
//! | Status | When |
//! |--------|------|
//! | 400 | Bad JSON, empty required field, unknown column in an update |
//! | 404 | Unknown id, unknown route, missing image |
//! | 500 | Storage or configuration failure, reported as `Internal server error` |
//!
//!
//!
//! # Setup
//!
//! Variables are read from the environment, and from `.env` when present.
//! ```sh
//! RUST_PORT=7777
//! STORAGE_BACKEND=csv            # or sheets
//! DATA_DIR=data
//! IMAGE_DIR=images
//! GOOGLE_SHEETS_SPREADSHEET_ID=  # sheets only, also read from /run/secrets
//! GOOGLE_CREDENTIALS_PATH=credentials.json
//! GOOGLE_SHEETS_API_URL=https://sheets.googleapis.com/v4/spreadsheets
//! RUST_LOG=info,tower_http=debug
//! ```
//!
//! Run.
//! ```sh
//! cargo run -p hive
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, patch, post},
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod payloads;
pub mod routes;
pub mod state;
pub mod utils;

use routes::*;
use state::AppState;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let _ = fmt().with_env_filter(filter).try_init();
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let images = ServeDir::new(&state.config.image_dir).not_found_service(handle_404.into_service());

    Router::new()
        .route("/", get(home_handler))
        .route("/test", get(test_handler))
        .route("/custom", get(custom_handler))
        .route("/createuserentry", post(user_entry_handler))
        .route("/api/items", get(list_items_handler).post(create_item_handler))
        .route("/api/items/{id}", get(get_item_handler))
        .route("/api/users", get(list_users_handler).post(create_user_handler))
        .route("/api/users/{id}", get(get_user_handler))
        .route("/api/decks", get(list_decks_handler).post(create_deck_handler))
        .route("/api/decks/{id}", get(get_deck_handler))
        .route(
            "/api/decks/{id}/cards",
            get(deck_cards_handler).post(add_deck_card_handler),
        )
        .route("/api/cards", get(list_cards_handler).post(create_card_handler))
        .route("/api/cards/{id}", get(get_card_handler))
        .route("/api/games", get(list_games_handler).post(create_game_handler))
        .route("/api/games/{id}", get(get_game_handler))
        .route("/api/games/{id}/entries", get(game_entries_handler))
        .route("/api/games/{id}/postcards", get(game_postcards_handler))
        .route("/api/createentry", post(create_entry_handler))
        .route("/api/entries", get(list_entries_handler))
        .route("/api/postcards", post(create_postcard_handler))
        .route("/api/media", get(list_media_handler).post(create_media_handler))
        .route("/api/media/{id}", patch(update_media_handler))
        .route(
            "/api/mediaentries",
            get(list_media_entries_handler).post(create_media_entry_handler),
        )
        .nest_service("/images", images)
        .fallback(handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    init_tracing();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
