pub mod bandit;
pub mod eight_puzzle;
pub mod puzzle_board;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::errors::{ EnvError, Result };
use crate::spaces::Space;

/// Side-channel metadata returned with every step.
pub type Info = BTreeMap<String, String>;

/// Outcome of a single transition.
#[derive(PartialEq, Debug, Clone)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

impl<O> Step<O> {
    pub fn new(observation: O, reward: f64, done: bool) -> Self {
        Step {
            observation,
            reward,
            done,
            info: Info::new(),
        }
    }

    pub fn map_observation<T>(self, f: impl FnOnce(O) -> T) -> Step<T> {
        Step {
            observation: f(self.observation),
            reward: self.reward,
            done: self.done,
            info: self.info,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum RenderMode {
    /// Writes the frame to standard output.
    Human,
    /// Returns the frame as a string.
    Ansi,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Human => "human",
            RenderMode::Ansi => "ansi",
        }
    }

    /// Delivers a text frame according to the mode: printed for `Human`,
    /// handed back for `Ansi`.
    pub fn emit(&self, frame: String) -> Result<Option<String>> {
        match self {
            RenderMode::Ansi => Ok(Some(frame)),
            RenderMode::Human => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(frame.as_bytes())?;
                stdout.flush()?;
                Ok(None)
            }
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = EnvError;

    fn from_str(mode: &str) -> Result<Self> {
        match mode {
            "human" => Ok(RenderMode::Human),
            "ansi" => Ok(RenderMode::Ansi),
            other => Err(EnvError::UnsupportedRenderMode(other.to_string())),
        }
    }
}

/// The lifecycle every environment exposes to a driver loop.
///
/// A driver calls [`Environment::reset`] to start an episode and then
/// [`Environment::step`] until `done` is reported.
pub trait Environment: Send {
    type Observation: Clone + fmt::Debug;
    type Action: Copy + fmt::Debug + fmt::Display;

    fn action_space(&self) -> Space;

    fn observation_space(&self) -> Space;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Result<Self::Observation>;

    /// Applies one action. Fails only when the action is outside the action
    /// space.
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>>;

    fn render(&self, mode: RenderMode) -> Result<Option<String>>;

    /// Re-seeds the environment's random source and returns the seeds in use.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;

    /// Passes display settings through to the environment. Text environments
    /// keep it for reference only.
    fn configure(&mut self, _display: Option<String>) {}
}

/// Conversion of an observation into a flat row of integers.
pub trait Flatten {
    fn flatten(&self) -> Vec<i64>;
}

impl Flatten for usize {
    fn flatten(&self) -> Vec<i64> {
        vec![*self as i64]
    }
}

impl<const N: usize> Flatten for [u8; N] {
    fn flatten(&self) -> Vec<i64> {
        self.iter().map(|&v| v as i64).collect()
    }
}

/// Object-safe form of [`Environment`] used by the registry, with flattened
/// observations and integer actions.
pub trait DynEnvironment: Send {
    fn action_space(&self) -> Space;
    fn observation_space(&self) -> Space;
    fn reset(&mut self) -> Result<Vec<i64>>;
    fn step(&mut self, action: usize) -> Result<Step<Vec<i64>>>;
    fn render(&self, mode: RenderMode) -> Result<Option<String>>;
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;
    fn configure(&mut self, display: Option<String>);
}

impl<E> DynEnvironment for E where E: Environment<Action = usize>, E::Observation: Flatten {
    fn action_space(&self) -> Space {
        Environment::action_space(self)
    }

    fn observation_space(&self) -> Space {
        Environment::observation_space(self)
    }

    fn reset(&mut self) -> Result<Vec<i64>> {
        Environment::reset(self).map(|observation| observation.flatten())
    }

    fn step(&mut self, action: usize) -> Result<Step<Vec<i64>>> {
        Environment::step(self, action).map(|step| step.map_observation(|o| o.flatten()))
    }

    fn render(&self, mode: RenderMode) -> Result<Option<String>> {
        Environment::render(self, mode)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        Environment::seed(self, seed)
    }

    fn configure(&mut self, display: Option<String>) {
        Environment::configure(self, display)
    }
}
