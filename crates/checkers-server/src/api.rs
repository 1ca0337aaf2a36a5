// HTTP routes over the single shared game.
//
// Each handler takes the game lock once and holds it for its whole
// read-check-write sequence, so concurrent moves are applied one at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use checkers_core::{Game, GameState, MoveError, Square};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::CorsConfig;
use crate::protocol::{MoveRequest, MoveResponse, NewGameResponse, WinnerResponse, GREETING};

/// Errors returned to the client as `400` with a plain-text body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid request payload")]
    InvalidPayload,

    #[error(transparent)]
    Move(#[from] MoveError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Router state: the one game, shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    game: Arc<Mutex<Game>>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        AppState {
            game: Arc::new(Mutex::new(game)),
        }
    }

    pub fn game(&self) -> MutexGuard<'_, Game> {
        self.game.lock().expect("game mutex poisoned")
    }
}

/// Build the full router with CORS and request tracing applied.
pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/game", get(get_game))
        .route("/game/new", post(new_game))
        .route("/game/move", post(make_move))
        .route("/game/check-winner", get(check_winner))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if cors.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    // Config validation rejects unparseable origins; skip any that slip past.
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring CORS origin {o:?}: {e}");
                None
            }
        })
        .collect();
    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(cors.allow_credentials)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn greeting() -> &'static str {
    GREETING
}

async fn get_game(State(state): State<AppState>) -> Json<GameState> {
    let game = state.game();
    debug!(turn = %game.state().turn, "game state requested");
    Json(game.state().clone())
}

async fn new_game(State(state): State<AppState>) -> Json<NewGameResponse> {
    let mut game = state.game();
    game.reset();
    Json(NewGameResponse::from_state(game.state()))
}

async fn make_move(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MoveResponse>, ApiError> {
    let req = decode_move(&body)?;

    let mut game = state.game();
    let turn = game.state().turn;

    // Source first: an unknown label is just a square with no piece of ours.
    let from = source_square(game.state(), &req.source).map_err(|e| {
        warn!(source = %req.source, %turn, "move rejected: {e}");
        e
    })?;
    let to = req.destination.parse::<Square>().map_err(|e| {
        warn!("bad destination label {:?}: {e}", req.destination);
        ApiError::InvalidPayload
    })?;

    let outcome = game.apply_move(from, to).map_err(|e| {
        warn!(%from, %to, %turn, "move rejected: {e}");
        ApiError::from(e)
    })?;

    info!(
        %from,
        %to,
        %turn,
        captured = outcome.captured.is_some(),
        promoted = outcome.promoted,
        "move accepted"
    );
    Ok(Json(MoveResponse::new(game.state(), outcome)))
}

async fn check_winner(State(state): State<AppState>) -> Json<WinnerResponse> {
    Json(state.game().check_winner())
}

/// Decode a move body. Only bodies that are not a JSON object with string
/// `source`/`destination` fields are an invalid payload; missing fields read
/// as empty labels.
pub fn decode_move(body: &[u8]) -> Result<MoveRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("undecodable move payload: {e}");
        ApiError::InvalidPayload
    })
}

/// Resolve the source label to a square holding a piece of the side to move.
pub fn source_square(state: &GameState, label: &str) -> Result<Square, ApiError> {
    let from = label
        .parse::<Square>()
        .map_err(|_| MoveError::InvalidSource)?;
    state.movable_piece(from)?;
    Ok(from)
}
