//! WASM bindings for focus-core
//!
//! Provides a JavaScript-friendly API for the rules engine.

use wasm_bindgen::prelude::*;
use crate::{Game, Piece, Pos, Turn};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game from two (name, color) pairs
    #[wasm_bindgen(constructor)]
    pub fn new(name_a: &str, color_a: &str, name_b: &str, color_b: &str) -> WasmGame {
        WasmGame { inner: Game::new((name_a, color_a), (name_b, color_b)) }
    }

    /// Move pieces. Returns the outcome or error message
    #[wasm_bindgen(js_name = submitMove)]
    pub fn submit_move(
        &mut self,
        name: &str,
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
        count: usize,
    ) -> String {
        match self.inner.submit_move(name, Pos::new(from_row, from_col), Pos::new(to_row, to_col), count) {
            Ok(outcome) => outcome.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Place a reserve piece. Returns the outcome or error message
    #[wasm_bindgen(js_name = placeReserve)]
    pub fn place_reserve(&mut self, name: &str, row: i32, col: i32) -> String {
        match self.inner.place_reserved_piece(name, Pos::new(row, col)) {
            Ok(outcome) => outcome.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Stack at a position, bottom to top: 1 = first player, 2 = second.
    /// Empty for an invalid position
    #[wasm_bindgen(js_name = stackAt)]
    pub fn stack_at(&self, row: i32, col: i32) -> Vec<u8> {
        self.inner
            .stack_at(Pos::new(row, col))
            .map(|pieces| pieces.iter().map(|&p| p as u8).collect())
            .unwrap_or_default()
    }

    /// Color label of a stack entry returned by stackAt
    #[wasm_bindgen(js_name = colorOf)]
    pub fn color_of(&self, piece: u8) -> String {
        match piece {
            1 => self.inner.color_of(Piece::A).to_string(),
            2 => self.inner.color_of(Piece::B).to_string(),
            _ => String::new(),
        }
    }

    #[wasm_bindgen(js_name = showReserve)]
    pub fn show_reserve(&self, name: &str) -> u32 {
        self.inner.reserved_count_of(name)
    }

    #[wasm_bindgen(js_name = showCaptured)]
    pub fn show_captured(&self, name: &str) -> u32 {
        self.inner.captured_count_of(name)
    }

    /// Name of the player to move, empty before the first move
    #[wasm_bindgen(js_name = currentTurn)]
    pub fn current_turn(&self) -> String {
        match self.inner.turn() {
            Turn::AwaitingMove => String::new(),
            Turn::TurnOf(piece) => self.inner.player_of(piece).name().to_string(),
        }
    }

    /// Full game state as a JS object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(JsValue::from)
    }
}
