//! Focus/Domination rules engine.
//!
//! # Board
//!
//! ```text
//! 6x6 grid of stacks, addressed by zero-based (row, col).
//! Every cell starts with one piece:
//!
//!         col 0 1 2 3 4 5
//!   row 0     A A B B A A
//!   row 1     B B A A B B
//!   row 2     A A B B A A
//!   row 3     B B A A B B
//!   row 4     A A B B A A
//!   row 5     B B A A B B
//! ```
//!
//! # Moves
//!
//! A player moves the top `n` pieces of a stack they control (their piece is on
//! top) exactly `n` squares in a straight line. The moved pieces keep their
//! order and land on top of the destination stack.
//!
//! # Overflow
//!
//! A stack never holds more than 5 pieces once a move settles. Extra pieces come
//! off the bottom: the mover keeps their own pieces in reserve and captures the
//! opponent's. A reserve piece can later be placed on any cell instead of
//! moving. Capturing 8 pieces wins the game.

mod error;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::RuleError;

/// Rows and columns on the board.
pub const BOARD_SIZE: usize = 6;
/// Tallest stack allowed once a move settles.
pub const MAX_STACK: usize = 5;
/// Captured pieces needed to win.
pub const WIN_CAPTURES: u32 = 8;

/// Piece marker, tagged by the player who owns it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Piece {
    A = 1,
    B = 2,
}

impl Piece {
    /// Get the other player's piece.
    #[inline]
    pub fn opponent(self) -> Piece {
        match self {
            Piece::A => Piece::B,
            Piece::B => Piece::A,
        }
    }

    /// Starting piece of a cell: pairs of columns alternate, shifted every row.
    #[inline]
    pub fn initial_at(row: usize, col: usize) -> Piece {
        if (row + col / 2) % 2 == 0 {
            Piece::A
        } else {
            Piece::B
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize - 1
    }
}

/// Board coordinate as requested by a caller.
///
/// Signed so that off-board requests such as `(-1, 2)` can be represented and
/// rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Pos {
        Pos { row, col }
    }

    /// Position predicate used by move and placement validation.
    ///
    /// Rejects negative rows and columns outside 0-5. Rows past the last one
    /// pass here and are rejected when the cell is looked up.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.row >= 0 && self.col >= 0 && self.col <= BOARD_SIZE as i32 - 1
    }

    /// Array indices of this position, if it names a cell on the board.
    #[inline]
    pub fn index(self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some((row, col))
    }

    /// Length of a straight move to `to`, or None if the move is diagonal.
    #[inline]
    pub fn straight_distance(self, to: Pos) -> Option<u32> {
        let d_row = to.row - self.row;
        let d_col = to.col - self.col;
        if d_row != 0 && d_col != 0 {
            None
        } else {
            Some(d_row.unsigned_abs().max(d_col.unsigned_abs()))
        }
    }

    /// Iterate over all 36 board positions, row-major.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..BOARD_SIZE as i32).flat_map(|row| (0..BOARD_SIZE as i32).map(move |col| Pos::new(row, col)))
    }
}

impl From<(i32, i32)> for Pos {
    fn from((row, col): (i32, i32)) -> Pos {
        Pos::new(row, col)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ============================================================================
// CELL
// ============================================================================

/// A stack of pieces on one board position, bottom first.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    pieces: Vec<Piece>,
}

impl Cell {
    /// Create an empty stack.
    pub fn new() -> Cell {
        Cell { pieces: Vec::new() }
    }

    /// Create a stack holding a single piece.
    pub fn with_piece(piece: Piece) -> Cell {
        Cell { pieces: vec![piece] }
    }

    /// Put a piece on top.
    #[inline]
    pub fn push_top(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Remove the top `n` pieces.
    ///
    /// The result is ordered bottom first: element 0 sat nearest the remaining
    /// stack and the last element was the top. Asking for more pieces than the
    /// stack holds takes the whole stack.
    pub fn pop_top(&mut self, n: usize) -> Vec<Piece> {
        let split = self.pieces.len().saturating_sub(n);
        self.pieces.split_off(split)
    }

    /// Get the top piece, or None for an empty stack.
    #[inline]
    pub fn peek_top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    /// Cut the stack down to `MAX_STACK` pieces from the bottom.
    ///
    /// Returns the removed pieces in removal order (lowest first); empty if the
    /// stack was already short enough.
    pub fn trim_bottom_overflow(&mut self) -> Vec<Piece> {
        let excess = self.pieces.len().saturating_sub(MAX_STACK);
        self.pieces.drain(..excess).collect()
    }

    /// Number of pieces in the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The pieces, bottom first.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// A registered player and their running capture/reserve tallies.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Player {
    name: String,
    color: String,
    piece: Piece,
    captured: u32,
    reserved: u32,
}

impl Player {
    /// Create a player. Name and color are stored upper-cased.
    pub fn new(name: &str, color: &str, piece: Piece) -> Player {
        Player {
            name: name.to_uppercase(),
            color: color.to_uppercase(),
            piece,
            captured: 0,
            reserved: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color label supplied at construction, upper-cased.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// The board piece this player owns.
    pub fn piece(&self) -> Piece {
        self.piece
    }

    pub fn captured_count(&self) -> u32 {
        self.captured
    }

    pub fn reserved_count(&self) -> u32 {
        self.reserved
    }

    /// Case-insensitive name comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        name.to_uppercase() == self.name
    }

    pub fn record_capture(&mut self) {
        self.captured += 1;
    }

    pub fn record_reserve(&mut self) {
        self.reserved += 1;
    }

    /// Use up one reserve piece. Callers check `reserved_count() > 0` first.
    pub fn consume_reserve(&mut self) {
        debug_assert!(self.reserved > 0, "consume_reserve with empty reserve");
        self.reserved = self.reserved.saturating_sub(1);
    }

    /// True once the capture threshold is reached.
    pub fn has_won(&self) -> bool {
        self.captured >= WIN_CAPTURES
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// The 6x6 grid of stacks.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Board in the fixed starting layout.
    pub fn initial() -> Board {
        Board {
            cells: std::array::from_fn(|row| {
                std::array::from_fn(|col| Cell::with_piece(Piece::initial_at(row, col)))
            }),
        }
    }

    /// Get the cell at a position, or None if it is off the board.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        let (row, col) = pos.index()?;
        Some(&self.cells[row][col])
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        let (row, col) = pos.index()?;
        Some(&mut self.cells[row][col])
    }

    /// Rows of cells, top row first.
    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Total pieces standing on the board.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().map(Cell::len).sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

// ============================================================================
// RULES ENGINE
// ============================================================================

/// Whose move it is.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum Turn {
    /// No move made yet; either player may start.
    #[default]
    AwaitingMove,
    /// Only the owner of this piece may move next.
    TurnOf(Piece),
}

impl Turn {
    /// Check whether the owner of `piece` may act now.
    #[inline]
    pub fn allows(self, piece: Piece) -> bool {
        match self {
            Turn::AwaitingMove => true,
            Turn::TurnOf(current) => current == piece,
        }
    }
}

/// Result of an accepted move or placement.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub enum Outcome {
    /// Accepted; the turn passed to the opponent.
    Moved,
    /// Accepted and the mover reached the capture threshold. The turn does not pass.
    Won { player: String },
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Won { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Moved => write!(f, "Successfully moved"),
            Outcome::Won { player } => write!(f, "{} Wins", player),
        }
    }
}

/// Full game state: both players, the board and the turn.
///
/// Every request is validated completely before anything is changed, so a
/// rejected request leaves the game exactly as it was. The game does not lock
/// itself after a win; callers stop issuing moves once they see `Outcome::Won`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Game {
    players: [Player; 2],
    board: Board,
    turn: Turn,
}

impl Game {
    /// Start a game from two `(name, color)` pairs. The first player owns `Piece::A`.
    pub fn new(player_a: (&str, &str), player_b: (&str, &str)) -> Game {
        Game {
            players: [
                Player::new(player_a.0, player_a.1, Piece::A),
                Player::new(player_b.0, player_b.1, Piece::B),
            ],
            board: Board::initial(),
            turn: Turn::AwaitingMove,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Look up a player by name, ignoring case.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.matches_name(name))
    }

    /// The player owning a piece.
    pub fn player_of(&self, piece: Piece) -> &Player {
        &self.players[piece.index()]
    }

    /// Color label of a piece's owner.
    pub fn color_of(&self, piece: Piece) -> &str {
        self.player_of(piece).color()
    }

    /// The player who must move next, or None before the first move.
    pub fn current_player(&self) -> Option<&Player> {
        match self.turn {
            Turn::AwaitingMove => None,
            Turn::TurnOf(piece) => Some(self.player_of(piece)),
        }
    }

    /// The player who has reached the capture threshold, if any.
    pub fn winner(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.has_won())
    }

    /// Move the top `piece_count` pieces from `start` to `end`.
    ///
    /// Checks run in order and stop at the first failure: player name, turn,
    /// both positions, ownership of the start stack, straight-line distance
    /// equal to `piece_count`, then `1 <= piece_count <= stack height`.
    pub fn submit_move(
        &mut self,
        player_name: &str,
        start: Pos,
        end: Pos,
        piece_count: usize,
    ) -> Result<Outcome, RuleError> {
        let mover = self
            .player(player_name)
            .map(Player::piece)
            .ok_or_else(|| RuleError::UnknownPlayer(player_name.to_uppercase()))?;
        if !self.turn.allows(mover) {
            return Err(RuleError::OutOfTurn);
        }
        self.check_move(mover, start, end, piece_count)?;

        let moved = self
            .board
            .get_mut(start)
            .ok_or(RuleError::InvalidPosition)?
            .pop_top(piece_count);
        let dest = self.board.get_mut(end).ok_or(RuleError::InvalidPosition)?;
        for piece in moved {
            dest.push_top(piece);
        }
        absorb_overflow(dest, &mut self.players[mover.index()]);

        Ok(self.finish_turn(mover))
    }

    /// Place one reserve piece of `player_name` on top of `location`'s stack.
    ///
    /// An unknown name is reported as `NoReserve`, like an empty reserve.
    pub fn place_reserved_piece(
        &mut self,
        player_name: &str,
        location: Pos,
    ) -> Result<Outcome, RuleError> {
        self.locate(location)?;
        let piece = match self.player(player_name) {
            Some(player) if player.reserved_count() > 0 => player.piece(),
            _ => return Err(RuleError::NoReserve),
        };

        let dest = self.board.get_mut(location).ok_or(RuleError::InvalidPosition)?;
        let player = &mut self.players[piece.index()];
        dest.push_top(piece);
        player.consume_reserve();
        absorb_overflow(dest, player);

        Ok(self.finish_turn(piece))
    }

    /// Pieces at a location, bottom first; None for an invalid location.
    pub fn stack_at(&self, location: Pos) -> Option<&[Piece]> {
        self.locate(location).ok().map(Cell::pieces)
    }

    /// Reserve count of a player; 0 for an unknown name.
    pub fn reserved_count_of(&self, name: &str) -> u32 {
        self.player(name).map_or(0, Player::reserved_count)
    }

    /// Captured count of a player; 0 for an unknown name.
    pub fn captured_count_of(&self, name: &str) -> u32 {
        self.player(name).map_or(0, Player::captured_count)
    }

    /// Pieces on the board plus every captured and reserved piece.
    ///
    /// Constant for the whole game.
    pub fn total_pieces(&self) -> usize {
        let off_board: u32 = self
            .players
            .iter()
            .map(|p| p.captured_count() + p.reserved_count())
            .sum();
        self.board.piece_count() + off_board as usize
    }

    fn locate(&self, pos: Pos) -> Result<&Cell, RuleError> {
        if !pos.is_valid() {
            return Err(RuleError::InvalidPosition);
        }
        self.board.get(pos).ok_or(RuleError::InvalidPosition)
    }

    fn check_move(&self, mover: Piece, start: Pos, end: Pos, piece_count: usize) -> Result<(), RuleError> {
        let source = self.locate(start)?;
        self.locate(end)?;
        if source.peek_top() != Some(mover) {
            return Err(RuleError::InvalidPosition);
        }
        match start.straight_distance(end) {
            Some(distance) if distance as usize == piece_count => {}
            _ => return Err(RuleError::InvalidGeometry),
        }
        if piece_count == 0 || piece_count > source.len() {
            return Err(RuleError::InvalidPieceCount);
        }
        Ok(())
    }

    /// Report a win, or hand the turn to the opponent.
    fn finish_turn(&mut self, mover: Piece) -> Outcome {
        let player = self.player_of(mover);
        if player.has_won() {
            return Outcome::Won { player: player.name().to_string() };
        }
        self.turn = Turn::TurnOf(mover.opponent());
        Outcome::Moved
    }
}

/// Trim `cell` to `MAX_STACK` pieces, crediting each removed piece to `mover`.
///
/// Own pieces go to reserve, opponent pieces are captured.
fn absorb_overflow(cell: &mut Cell, mover: &mut Player) {
    for piece in cell.trim_bottom_overflow() {
        if piece == mover.piece() {
            mover.record_reserve();
        } else {
            mover.record_capture();
        }
    }
}
