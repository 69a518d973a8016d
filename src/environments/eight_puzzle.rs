use rand::rngs::StdRng;
use tracing::{ debug, warn };

use crate::constants::{ MAX_TILE_VALUE, NUM_OF_MOVES, NUM_OF_TILES };
use crate::environments::puzzle_board::{ Board, Move };
use crate::environments::{ Environment, RenderMode, Step };
use crate::errors::{ EnvError, Result };
use crate::seeding::np_random;
use crate::spaces::{ BoxSpace, Discrete, Space };

/// Sliding tile puzzle on a 3x3 board.
///
/// The agent moves the blank up, right, down or left (action codes 0 to 3)
/// until the board reads `1 2 3 / 4 5 6 / 7 8 _`. Each step is rewarded with
/// the negative total Manhattan distance of all cells to their goal cells, so
/// the reward is 0 exactly when the puzzle is solved.
///
/// ```text
/// 1|3|5
/// 8|2|6
/// 7| |4
/// ```
#[derive(Debug, Clone)]
pub struct EightPuzzleEnvironment {
    board: Board,
    rng: StdRng,
    action_space: Discrete,
    observation_space: BoxSpace,
    last_action: Option<Move>,
    last_reward: Option<i64>,
    /// Set to 0 when the goal is first reached. Counts steps taken after that.
    steps_beyond_done: Option<usize>,
    display: Option<String>,
}

impl EightPuzzleEnvironment {
    /// Creates a puzzle seeded from the operating system.
    pub fn new() -> Self {
        Self::from_seed(None)
    }

    /// Creates a puzzle whose boards are reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_seed(Some(seed))
    }

    /// Creates a puzzle starting from a given board, seeded from the operating
    /// system. The board is taken as is and may be unsolvable. Later resets
    /// draw solvable boards as usual.
    pub fn with_board(board: Board) -> Self {
        Self::from_parts(board, np_random(None).0)
    }

    fn from_seed(seed: Option<u64>) -> Self {
        let (mut rng, seed) = np_random(seed);
        debug!(seed, "Seeded eight puzzle");
        let board = Board::random_solvable(&mut rng);
        Self::from_parts(board, rng)
    }

    fn from_parts(board: Board, rng: StdRng) -> Self {
        EightPuzzleEnvironment {
            board,
            rng,
            action_space: Discrete::new(NUM_OF_MOVES),
            observation_space: BoxSpace::new(0, MAX_TILE_VALUE, &[NUM_OF_TILES]),
            last_action: None,
            last_reward: None,
            steps_beyond_done: None,
            display: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn last_action(&self) -> Option<Move> {
        self.last_action
    }

    pub fn last_reward(&self) -> Option<i64> {
        self.last_reward
    }

    pub fn steps_beyond_done(&self) -> Option<usize> {
        self.steps_beyond_done
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    fn status_line(&self) -> String {
        match (self.last_reward, self.last_action) {
            (Some(reward), Some(action)) => format!("{} {}\n\n", reward, action.letter()),
            _ => "\n".to_string(),
        }
    }
}

impl Default for EightPuzzleEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for EightPuzzleEnvironment {
    type Observation = [u8; NUM_OF_TILES];
    type Action = usize;

    fn action_space(&self) -> Space {
        Space::Discrete(self.action_space)
    }

    fn observation_space(&self) -> Space {
        Space::Box(self.observation_space.clone())
    }

    fn reset(&mut self) -> Result<Self::Observation> {
        self.board = Board::random_solvable(&mut self.rng);
        self.last_action = None;
        self.last_reward = None;
        self.steps_beyond_done = None;
        Ok(self.board.tiles())
    }

    fn step(&mut self, action: usize) -> Result<Step<Self::Observation>> {
        let mv = match Move::from_code(action) {
            Some(mv) if self.action_space.contains(action) => mv,
            _ => return Err(EnvError::invalid_action(&action)),
        };

        if let Some(steps) = self.steps_beyond_done.as_mut() {
            *steps += 1;
            warn!(
                steps_beyond_done = *steps,
                "You are calling 'step()' even though this environment has already returned done = true. \
                 You should always call 'reset()' once you receive 'done = true'; any further steps are undefined behavior."
            );
        }

        let moved = self.board.apply(mv);
        let distance = self.board.manhattan_distance();
        let reward = -(distance as i64);
        let done = self.board.is_goal();
        debug!(action = %mv.letter(), moved, distance, "Applied move");

        self.last_action = Some(mv);
        self.last_reward = Some(reward);
        if done && self.steps_beyond_done.is_none() {
            self.steps_beyond_done = Some(0);
        }

        Ok(Step::new(self.board.tiles(), reward as f64, done))
    }

    fn render(&self, mode: RenderMode) -> Result<Option<String>> {
        let frame = format!("{}{}", self.board, self.status_line());
        mode.emit(frame)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let (rng, seed) = np_random(seed);
        self.rng = rng;
        vec![seed]
    }

    fn configure(&mut self, display: Option<String>) {
        self.display = display;
    }
}
