//! Focus/Domination Web API
//!
//! Serves a single game session over JSON. All rule checking happens in
//! focus-core; this server only translates requests, keeps a move counter and
//! refuses further moves once somebody has won.

mod config;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use focus_core::{Game, Piece, Player, Pos, RuleError};

use crate::config::ApiConfig;

// =============================================================================
// Session State
// =============================================================================

/// The running game plus bookkeeping the engine does not track
struct GameSession {
    game: Game,
    /// Accepted moves and placements since the last reset
    move_count: usize,
}

impl GameSession {
    fn new(config: &ApiConfig) -> Self {
        Self {
            game: new_game(config),
            move_count: 0,
        }
    }

    fn reset(&mut self, config: &ApiConfig) {
        self.game = new_game(config);
        self.move_count = 0;
    }
}

fn new_game(config: &ApiConfig) -> Game {
    Game::new(
        (config.player_a.name.as_str(), config.player_a.color.as_str()),
        (config.player_b.name.as_str(), config.player_b.color.as_str()),
    )
}

/// Shared application state
struct AppStateInner {
    session: Mutex<GameSession>,
    config: ApiConfig,
}

type AppState = Arc<AppStateInner>;

fn lock_session(state: &AppState) -> MutexGuard<'_, GameSession> {
    state
        .session
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Debug, Serialize)]
struct CellModel {
    /// Color labels, bottom to top
    stack: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PlayerModel {
    name: String,
    color: String,
    reserved: u32,
    captured: u32,
}

#[derive(Debug, Serialize)]
struct GameStateModel {
    board: Vec<Vec<CellModel>>,
    players: Vec<PlayerModel>,
    /// None until the first move is made
    current_turn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<String>,
    move_count: usize,
}

#[derive(Debug, Deserialize)]
struct MoveRequest {
    player: String,
    from: [i32; 2],
    to: [i32; 2],
    pieces: usize,
}

#[derive(Debug, Deserialize)]
struct ReserveRequest {
    player: String,
    to: [i32; 2],
}

#[derive(Debug, Serialize)]
struct MoveResultModel {
    /// "Successfully moved" or "<NAME> Wins"
    result: String,
    state: GameStateModel,
}

#[derive(Debug, Serialize)]
struct PlayerCountsModel {
    name: String,
    reserved: u32,
    captured: u32,
}

#[derive(Debug, Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Debug, Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorModel { detail: detail.into() }))
}

/// Map a rejected request to an HTTP error
fn rule_error(err: &RuleError) -> ApiError {
    let status = match err {
        RuleError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
        RuleError::OutOfTurn => StatusCode::CONFLICT,
        RuleError::InvalidPosition
        | RuleError::InvalidGeometry
        | RuleError::InvalidPieceCount
        | RuleError::NoReserve => StatusCode::BAD_REQUEST,
    };
    api_error(status, err.to_string())
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn stack_colors(game: &Game, pieces: &[Piece]) -> Vec<String> {
    pieces.iter().map(|&p| game.color_of(p).to_string()).collect()
}

fn player_to_model(player: &Player) -> PlayerModel {
    PlayerModel {
        name: player.name().to_string(),
        color: player.color().to_string(),
        reserved: player.reserved_count(),
        captured: player.captured_count(),
    }
}

/// Convert the session to a JSON-serializable GameStateModel
fn session_to_model(session: &GameSession) -> GameStateModel {
    let game = &session.game;
    let board = game
        .board()
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| CellModel { stack: stack_colors(game, cell.pieces()) })
                .collect()
        })
        .collect();

    GameStateModel {
        board,
        players: game.players().iter().map(player_to_model).collect(),
        current_turn: game.current_player().map(|p| p.name().to_string()),
        winner: game.winner().map(|p| p.name().to_string()),
        move_count: session.move_count,
    }
}

fn ensure_ongoing(session: &GameSession) -> Result<(), ApiError> {
    match session.game.winner() {
        Some(winner) => {
            eprintln!("Rejected request: {} has already won", winner.name());
            Err(api_error(StatusCode::BAD_REQUEST, "Game is already over"))
        }
        None => Ok(()),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = lock_session(&state);
    Json(session_to_model(&session))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResultModel>, ApiError> {
    let mut session = lock_session(&state);
    ensure_ongoing(&session)?;

    let from = Pos::new(req.from[0], req.from[1]);
    let to = Pos::new(req.to[0], req.to[1]);
    let outcome = session
        .game
        .submit_move(&req.player, from, to, req.pieces)
        .map_err(|e| {
            eprintln!("Rejected move by {} {}->{} x{}: {}", req.player, from, to, req.pieces, e);
            rule_error(&e)
        })?;

    session.move_count += 1;
    println!(
        "{} moved {}->{} x{}: {}",
        req.player.to_uppercase(),
        from,
        to,
        req.pieces,
        outcome
    );

    Ok(Json(MoveResultModel {
        result: outcome.to_string(),
        state: session_to_model(&session),
    }))
}

async fn place_reserve(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<MoveResultModel>, ApiError> {
    let mut session = lock_session(&state);
    ensure_ongoing(&session)?;

    let to = Pos::new(req.to[0], req.to[1]);
    let outcome = session
        .game
        .place_reserved_piece(&req.player, to)
        .map_err(|e| {
            eprintln!("Rejected reserve placement by {} at {}: {}", req.player, to, e);
            rule_error(&e)
        })?;

    session.move_count += 1;
    println!("{} placed a reserve piece at {}: {}", req.player.to_uppercase(), to, outcome);

    Ok(Json(MoveResultModel {
        result: outcome.to_string(),
        state: session_to_model(&session),
    }))
}

async fn get_stack(
    State(state): State<AppState>,
    Path((row, col)): Path<(i32, i32)>,
) -> Result<Json<Vec<String>>, ApiError> {
    let session = lock_session(&state);
    let game = &session.game;
    match game.stack_at(Pos::new(row, col)) {
        Some(pieces) => Ok(Json(stack_colors(game, pieces))),
        None => Err(rule_error(&RuleError::InvalidPosition)),
    }
}

async fn get_player(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<PlayerCountsModel> {
    let session = lock_session(&state);
    Json(PlayerCountsModel {
        name: name.to_uppercase(),
        reserved: session.game.reserved_count_of(&name),
        captured: session.game.captured_count_of(&name),
    })
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = lock_session(&state);
    session.reset(&state.config);
    println!("Game reset");
    Json(session_to_model(&session))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/move", post(make_move))
        .route("/reserve", post(place_reserve))
        .route("/stack/{row}/{col}", get(get_stack))
        .route("/players/{name}", get(get_player))
        .route("/reset", post(reset_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config::resolve_path(std::env::args().nth(1), std::env::var("FOCUS_CONFIG").ok());
    let config = ApiConfig::load_or_default(&path).map_err(|e| {
        eprintln!("Failed to load config from {}: {}", path.display(), e);
        e
    })?;
    if path.exists() {
        println!("Loaded config from {}", path.display());
    }

    println!(
        "Players: {} ({}) vs {} ({})",
        config.player_a.name, config.player_a.color, config.player_b.name, config.player_b.color
    );

    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(GameSession::new(&config)),
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    println!("Focus API running on http://{}", config.bind);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
