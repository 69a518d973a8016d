use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::constants::{ BLANK, GOAL_TILES, MOVE_CODES, NUM_OF_MOVES, NUM_OF_TILES, PUZZLE_SIZE };
use crate::errors::{ EnvError, Result };

/// Direction the blank moves in. The discriminant is the action code.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Move {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Move {
    pub const ALL: [Move; NUM_OF_MOVES] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Decodes an action code, returning `None` outside `0..4`.
    pub fn from_code(code: usize) -> Option<Move> {
        Move::ALL.get(code).copied()
    }

    pub fn code(&self) -> usize {
        *self as usize
    }

    /// One-letter code used when rendering the last action.
    pub fn letter(&self) -> char {
        MOVE_CODES[self.code()]
    }

    /// Row and column offset of the cell the blank swaps with.
    fn offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Right => (0, 1),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
        }
    }
}

/// A 3x3 sliding tile board stored row-major.
///
/// Always holds a permutation of `0..=8`, with `0` as the blank.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct Board {
    tiles: [u8; NUM_OF_TILES],
}

impl Board {
    /// Builds a board from row-major tiles, rejecting anything that is not a
    /// permutation of `0..=8`.
    pub fn from_tiles(tiles: [u8; NUM_OF_TILES]) -> Result<Self> {
        let mut seen = [false; NUM_OF_TILES];
        for &tile in &tiles {
            let index = tile as usize;
            if index >= NUM_OF_TILES || seen[index] {
                return Err(EnvError::InvalidBoard(format!("{:?} is not a permutation of 0..=8", tiles)));
            }
            seen[index] = true;
        }
        Ok(Board { tiles })
    }

    pub fn goal() -> Self {
        Board { tiles: GOAL_TILES }
    }

    /// Shuffles tiles until the arrangement is solvable.
    pub fn random_solvable<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles = GOAL_TILES;
        let mut attempts = 1;
        tiles.shuffle(rng);
        while !is_solvable(&tiles) {
            tiles.shuffle(rng);
            attempts += 1;
        }
        debug!(?tiles, attempts, "Generated solvable board");
        Board { tiles }
    }

    pub fn tiles(&self) -> [u8; NUM_OF_TILES] {
        self.tiles
    }

    /// Row and column of the given tile value.
    pub fn position_of(&self, tile: u8) -> (usize, usize) {
        let index = self.tiles
            .iter()
            .position(|&t| t == tile)
            .unwrap_or_else(|| unreachable!("board always holds every tile"));
        (index / PUZZLE_SIZE, index % PUZZLE_SIZE)
    }

    pub fn blank_position(&self) -> (usize, usize) {
        self.position_of(BLANK)
    }

    /// Swaps the blank with its neighbour in the given direction. Returns
    /// `false` and leaves the board alone when the blank sits on that edge.
    pub fn apply(&mut self, mv: Move) -> bool {
        let (row, col) = self.blank_position();
        let (d_row, d_col) = mv.offset();
        let (Some(target_row), Some(target_col)) = (
            row.checked_add_signed(d_row),
            col.checked_add_signed(d_col),
        ) else {
            return false;
        };
        if target_row >= PUZZLE_SIZE || target_col >= PUZZLE_SIZE {
            return false;
        }
        self.tiles.swap(row * PUZZLE_SIZE + col, target_row * PUZZLE_SIZE + target_col);
        true
    }

    /// Sum over all cells, blank included, of the Manhattan distance from the
    /// tile's current cell to its goal cell.
    pub fn manhattan_distance(&self) -> u32 {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, &tile)| {
                let (row, col) = (index / PUZZLE_SIZE, index % PUZZLE_SIZE);
                let (goal_row, goal_col) = goal_position(tile);
                (row.abs_diff(goal_row) + col.abs_diff(goal_col)) as u32
            })
            .sum()
    }

    pub fn is_goal(&self) -> bool {
        self.tiles == GOAL_TILES
    }
}

impl fmt::Display for Board {
    /// Three rows of cells joined by `|`, blank shown as a space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(PUZZLE_SIZE) {
            let cells: Vec<String> = row
                .iter()
                .map(|&tile| if tile == BLANK { " ".to_string() } else { tile.to_string() })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Goal cell of a tile: tile k sits at `((k-1)/3, (k-1)%3)`, the blank in the
/// bottom-right corner.
pub fn goal_position(tile: u8) -> (usize, usize) {
    if tile == BLANK {
        return (PUZZLE_SIZE - 1, PUZZLE_SIZE - 1);
    }
    let index = (tile - 1) as usize;
    (index / PUZZLE_SIZE, index % PUZZLE_SIZE)
}

/// Number of out-of-order pairs of non-blank tiles in row-major order.
pub fn count_inversions(tiles: &[u8]) -> usize {
    let mut inversions = 0;
    for i in 0..tiles.len() {
        for j in i + 1..tiles.len() {
            if tiles[i] != BLANK && tiles[j] != BLANK && tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    inversions
}

/// On a 3-wide board a layout can reach the goal iff its inversion count is
/// even.
pub fn is_solvable(tiles: &[u8]) -> bool {
    count_inversions(tiles) % 2 == 0
}
