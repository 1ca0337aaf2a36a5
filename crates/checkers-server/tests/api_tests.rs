// Integration tests for the checkers HTTP API.
//
// These drive the full router in-process (CORS and tracing layers included)
// with `tower::ServiceExt::oneshot`, so no TCP ports are opened.

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use checkers_core::{Board, ClassicRules, Color, DiagonalRules, Game, GameState, Piece, Square};
use checkers_server::api::{self, AppState};
use checkers_server::config::CorsConfig;

// ===========================================================================
// Test helpers
// ===========================================================================

fn sq(label: &str) -> Square {
    label.parse().unwrap()
}

fn app_with(game: Game) -> Router {
    api::router(AppState::new(game), &CorsConfig::default())
}

fn default_app() -> Router {
    app_with(Game::default())
}

/// App whose board holds exactly `pieces`, with `turn` to move.
fn app_with_pieces(pieces: &[(&str, Piece)], turn: Color) -> Router {
    let mut board = Board::empty();
    for (label, piece) in pieces {
        board.place(sq(label), *piece);
    }
    app_with(Game::from_state(
        GameState::with_board(board, turn),
        Box::new(ClassicRules),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn post_move(app: &Router, source: &str, destination: &str) -> (StatusCode, Bytes) {
    let body = serde_json::json!({ "source": source, "destination": destination });
    post(app, "/game/move", &body.to_string()).await
}

fn json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}

fn text(body: &Bytes) -> &str {
    std::str::from_utf8(body).unwrap()
}

async fn current_state(app: &Router) -> Value {
    let (status, body) = get(app, "/game").await;
    assert_eq!(status, StatusCode::OK);
    json(&body)
}

fn count_color(board: &Value, color: &str) -> usize {
    board
        .as_object()
        .unwrap()
        .values()
        .filter(|p| p["isOccupied"] == true && p["color"] == color)
        .count()
}

// ===========================================================================
// Basic routes
// ===========================================================================

#[tokio::test]
async fn root_returns_greeting() {
    let (status, body) = get(&default_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body), "Hello World!");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = get(&default_app(), "/game/undo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn initial_game_state() {
    let state = current_state(&default_app()).await;
    assert_eq!(state["turn"], "red");
    assert_eq!(state["status"], "ongoing");
    assert_eq!(state["winner"], "");
    assert_eq!(state["board"].as_object().unwrap().len(), 24);
    assert_eq!(count_color(&state["board"], "red"), 12);
    assert_eq!(count_color(&state["board"], "black"), 12);
    assert_eq!(state["board"]["A1"]["isKing"], false);
    assert_eq!(state["board"]["H8"]["color"], "black");
}

#[tokio::test]
async fn new_game_resets_board_and_turn() {
    let app = default_app();
    let (status, _) = post_move(&app, "C3", "D4").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/game/new", "").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["message"], "New game started.");
    assert_eq!(body["turn"], "red");
    assert!(body["board"].get("D4").is_none());
    assert_eq!(body["board"]["C3"]["color"], "red");

    let state = current_state(&app).await;
    assert_eq!(state["turn"], "red");
    assert_eq!(state["board"].as_object().unwrap().len(), 24);
}

// ===========================================================================
// Moves
// ===========================================================================

#[tokio::test]
async fn simple_move_to_vacant_square() {
    let mut board = Board::standard();
    board.remove(sq("B4"));
    let app = app_with(Game::from_state(
        GameState::with_board(board, Color::Red),
        Box::new(ClassicRules),
    ));

    let (status, body) = post_move(&app, "A3", "B4").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["message"], "Move successful.");
    assert_eq!(body["turn"], "black");
    assert_eq!(body["captured"], false);
    assert_eq!(body["captured_pos"], "");
    assert_eq!(body["promoted"], false);
    assert_eq!(body["status"], "ongoing");
    assert_eq!(body["winner"], "");
    assert!(body["board"].get("A3").is_none());
    assert_eq!(
        body["board"]["B4"],
        serde_json::json!({ "isOccupied": true, "isKing": false, "color": "red" })
    );
}

#[tokio::test]
async fn jump_over_opponent_captures() {
    let app = app_with_pieces(
        &[
            ("A3", Piece::man(Color::Red)),
            ("B4", Piece::man(Color::Black)),
            ("H8", Piece::man(Color::Black)),
        ],
        Color::Red,
    );

    let (status, body) = post_move(&app, "A3", "C5").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["captured"], true);
    assert_eq!(body["captured_pos"], "B4");
    assert!(body["board"].get("B4").is_none());
    assert_eq!(body["board"]["C5"]["color"], "red");
    assert_eq!(body["status"], "ongoing");
}

#[tokio::test]
async fn capturing_last_piece_ends_game() {
    let app = app_with_pieces(
        &[
            ("A3", Piece::man(Color::Red)),
            ("B4", Piece::man(Color::Black)),
        ],
        Color::Red,
    );

    let (_, body) = post_move(&app, "A3", "C5").await;
    let body = json(&body);
    assert_eq!(body["status"], "won");
    assert_eq!(body["winner"], "red");

    let state = current_state(&app).await;
    assert_eq!(state["status"], "won");
    assert_eq!(state["winner"], "red");
}

#[tokio::test]
async fn reaching_far_row_promotes() {
    let app = app_with_pieces(
        &[
            ("D7", Piece::man(Color::Red)),
            ("A1", Piece::man(Color::Black)),
        ],
        Color::Red,
    );

    let (status, body) = post_move(&app, "D7", "E8").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["promoted"], true);
    assert_eq!(body["board"]["E8"]["isKing"], true);

    // Black moves, then the red king steps back down and stays a king.
    post_move(&app, "A1", "B2").await;
    let (_, body) = post_move(&app, "E8", "D7").await;
    let body = json(&body);
    assert_eq!(body["promoted"], false);
    assert_eq!(body["board"]["D7"]["isKing"], true);
}

#[tokio::test]
async fn turns_alternate_between_colors() {
    let app = default_app();

    let (_, body) = post_move(&app, "C3", "D4").await;
    assert_eq!(json(&body)["turn"], "black");

    let (_, body) = post_move(&app, "F4", "E5").await;
    assert_eq!(json(&body)["turn"], "red");

    let (_, body) = post_move(&app, "C5", "D6").await;
    assert_eq!(json(&body)["turn"], "black");
}

// ===========================================================================
// Rejections
// ===========================================================================

#[tokio::test]
async fn empty_source_is_rejected_without_change() {
    let app = default_app();
    let before = current_state(&app).await;

    let (status, body) = post_move(&app, "D4", "E5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Invalid source or not your turn");

    assert_eq!(current_state(&app).await, before);
}

#[tokio::test]
async fn opponent_source_is_rejected_without_change() {
    let app = default_app();
    let before = current_state(&app).await;

    let (status, body) = post_move(&app, "F2", "E3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Invalid source or not your turn");

    let after = current_state(&app).await;
    assert_eq!(after, before);
    assert_eq!(after["turn"], "red");
}

#[tokio::test]
async fn occupied_destination_is_rejected() {
    let app = default_app();
    let before = current_state(&app).await;

    let (status, body) = post_move(&app, "A3", "B4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Destination already occupied");

    assert_eq!(current_state(&app).await, before);
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let app = default_app();
    let bodies = [
        "",
        "not json",
        "\"C3\"",
        r#"{"source":3,"destination":"D4"}"#,
        r#"{"source":"C3","destination":"Z9"}"#,
        r#"{"source":"C3"}"#,
    ];
    for body in bodies {
        let (status, response) = post(&app, "/game/move", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(text(&response), "Invalid request payload", "{body}");
    }
    assert_eq!(current_state(&app).await["turn"], "red");
}

#[tokio::test]
async fn unknown_or_missing_source_is_invalid_source() {
    let app = default_app();
    let before = current_state(&app).await;
    let bodies = [
        r#"{"source":"Z9","destination":"D4"}"#,
        r#"{"source":"","destination":"D4"}"#,
        r#"{"source":"c3","destination":"D4"}"#,
        r#"{"destination":"D4"}"#,
        r#"{}"#,
        // The source is checked before the destination label.
        r#"{"source":"D4","destination":"Z9"}"#,
        r#"{"source":"","destination":"not a square"}"#,
    ];
    for body in bodies {
        let (status, response) = post(&app, "/game/move", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            text(&response),
            "Invalid source or not your turn",
            "{body}"
        );
    }
    assert_eq!(current_state(&app).await, before);
}

#[tokio::test]
async fn stricter_rules_reject_non_diagonal_moves() {
    let app = app_with(Game::new(Box::new(DiagonalRules)));

    let (status, body) = post_move(&app, "C3", "C4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Illegal move");

    let (status, _) = post_move(&app, "C3", "D4").await;
    assert_eq!(status, StatusCode::OK);
}

// ===========================================================================
// Winner check
// ===========================================================================

#[tokio::test]
async fn check_winner_is_idempotent() {
    let app = default_app();
    let (status, first) = get(&app, "/game/check-winner").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = get(&app, "/game/check-winner").await;
    assert_eq!(json(&first), json(&second));
    assert_eq!(
        json(&first),
        serde_json::json!({ "status": "ongoing", "winner": "" })
    );
}

#[tokio::test]
async fn check_winner_reports_side_with_pieces_left() {
    let app = app_with_pieces(&[("E5", Piece::king(Color::Black))], Color::Red);
    let (_, body) = get(&app, "/game/check-winner").await;
    assert_eq!(
        json(&body),
        serde_json::json!({ "status": "won", "winner": "black" })
    );
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_moves_apply_once() {
    let app = default_app();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { post_move(&app, "C3", "D4").await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(text(&body), "Invalid source or not your turn");
        }
    }
    assert_eq!(accepted, 1);

    let state = current_state(&app).await;
    assert_eq!(state["turn"], "black");
    assert_eq!(state["board"].as_object().unwrap().len(), 24);
}

// ===========================================================================
// CORS
// ===========================================================================

#[tokio::test]
async fn wildcard_cors_answers_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/game/move")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = default_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn explicit_origin_list_allows_credentials() {
    let cors = CorsConfig {
        allowed_origins: vec!["http://localhost:3000".into()],
        allow_credentials: true,
    };
    let app = api::router(AppState::new(Game::default()), &cors);

    let request = Request::builder()
        .uri("/game")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let request = Request::builder()
        .uri("/game")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn unparseable_origin_is_skipped_and_others_still_allowed() {
    let cors = CorsConfig {
        allowed_origins: vec!["http://a\nb".into(), "http://localhost:3000".into()],
        allow_credentials: false,
    };
    let app = api::router(AppState::new(Game::default()), &cors);

    let request = Request::builder()
        .uri("/game")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
