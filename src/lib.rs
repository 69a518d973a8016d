//! Toy reinforcement-learning environments: the sliding tile 8-puzzle and a
//! family of multi-armed bandits, registered by id in an environment registry.

pub mod constants;
pub mod environments;
pub mod errors;
pub mod logging;
pub mod registration;
pub mod seeding;
pub mod simulation_runner;
pub mod spaces;

pub use environments::bandit::{ BanditEnvironment, BanditVariant, RewardDistribution };
pub use environments::eight_puzzle::EightPuzzleEnvironment;
pub use environments::puzzle_board::{ Board, Move };
pub use environments::{ DynEnvironment, Environment, RenderMode, Step };
pub use errors::{ EnvError, Result };
pub use registration::{ EnvSpec, Registry };
