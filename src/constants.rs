/// Side length of the sliding tile board. The puzzle is always 3x3.
pub const PUZZLE_SIZE: usize = 3;
/// Number of cells on the board, including the blank.
pub const NUM_OF_TILES: usize = PUZZLE_SIZE * PUZZLE_SIZE;
/// Value of the blank cell.
pub const BLANK: u8 = 0;
/// Row-major goal configuration of the board.
pub const GOAL_TILES: [u8; NUM_OF_TILES] = [1, 2, 3, 4, 5, 6, 7, 8, 0];
/// Number of actions the blank can take: up, right, down, left.
pub const NUM_OF_MOVES: usize = 4;
/// Upper bound declared for each cell of the puzzle observation.
pub const MAX_TILE_VALUE: i64 = 9;
/// One-letter codes printed for the last action, indexed by action code.
pub const MOVE_CODES: [char; NUM_OF_MOVES] = ['U', 'R', 'D', 'L'];

/// Identifier the 8-puzzle is registered under.
pub const EIGHT_PUZZLE_ID: &str = "EightPuzzle-v0";
/// Namespace prefixed to every bandit identifier.
pub const BANDIT_NAMESPACE: &str = "jkcooper2";
/// Scoreboard group that holds every bandit task.
pub const BANDIT_GROUP_ID: &str = "bandits";
/// Each bandit episode is a single pull.
pub const BANDIT_TIMESTEP_LIMIT: usize = 1;
/// Number of arms of the ten-armed bandit variants.
pub const NUM_OF_ARMS_TEN: usize = 10;

/// Info key set when a time limit cuts an episode short.
pub const TIME_LIMIT_TRUNCATED_KEY: &str = "TimeLimit.truncated";

/// Default number of episodes played by the episode runner.
pub const DEFAULT_NUM_OF_EPISODES: usize = 100;
/// Default step cap per episode for the episode runner. A random walk rarely
/// solves the puzzle, so episodes need a bound.
pub const DEFAULT_MAX_STEPS_PER_EPISODE: usize = 1_000;
