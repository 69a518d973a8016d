use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::constants::{
    BANDIT_GROUP_ID,
    BANDIT_NAMESPACE,
    BANDIT_TIMESTEP_LIMIT,
    EIGHT_PUZZLE_ID,
    TIME_LIMIT_TRUNCATED_KEY,
};
use crate::environments::bandit::BanditVariant;
use crate::environments::eight_puzzle::EightPuzzleEnvironment;
use crate::environments::{ DynEnvironment, RenderMode, Step };
use crate::errors::{ EnvError, Result };
use crate::spaces::Space;

/// Builds a fresh environment, optionally seeded.
pub type Constructor = Box<dyn Fn(Option<u64>) -> Box<dyn DynEnvironment> + Send + Sync>;

/// How an environment id is built and run.
pub struct EnvSpec {
    pub id: String,
    /// Name of the type the constructor produces.
    pub entry_point: String,
    /// Episodes are cut after this many steps when set.
    pub max_episode_steps: Option<usize>,
    /// Whether the same seed can still give different outcomes.
    pub nondeterministic: bool,
    constructor: Constructor,
}

impl EnvSpec {
    pub fn new(
        id: impl Into<String>,
        entry_point: impl Into<String>,
        constructor: impl Fn(Option<u64>) -> Box<dyn DynEnvironment> + Send + Sync + 'static
    ) -> Self {
        EnvSpec {
            id: id.into(),
            entry_point: entry_point.into(),
            max_episode_steps: None,
            nondeterministic: false,
            constructor: Box::new(constructor),
        }
    }

    pub fn with_max_episode_steps(mut self, steps: usize) -> Self {
        self.max_episode_steps = Some(steps);
        self
    }

    pub fn nondeterministic(mut self) -> Self {
        self.nondeterministic = true;
        self
    }

    /// Builds the environment without any time limit.
    pub fn build(&self, seed: Option<u64>) -> Box<dyn DynEnvironment> {
        (self.constructor)(seed)
    }
}

impl fmt::Debug for EnvSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSpec")
            .field("id", &self.id)
            .field("entry_point", &self.entry_point)
            .field("max_episode_steps", &self.max_episode_steps)
            .field("nondeterministic", &self.nondeterministic)
            .finish()
    }
}

/// Scoreboard group of related tasks.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskGroup {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Scoreboard entry for one registered environment.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: String,
    pub group: String,
    pub summary: String,
}

/// Ends an episode once it has run for `max_episode_steps`.
pub struct TimeLimit {
    inner: Box<dyn DynEnvironment>,
    max_episode_steps: usize,
    elapsed_steps: usize,
}

impl TimeLimit {
    pub fn new(inner: Box<dyn DynEnvironment>, max_episode_steps: usize) -> Self {
        TimeLimit {
            inner,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }
}

impl DynEnvironment for TimeLimit {
    fn action_space(&self) -> Space {
        self.inner.action_space()
    }

    fn observation_space(&self) -> Space {
        self.inner.observation_space()
    }

    fn reset(&mut self) -> Result<Vec<i64>> {
        self.elapsed_steps = 0;
        self.inner.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step<Vec<i64>>> {
        let mut step = self.inner.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps {
            if !step.done {
                step.info.insert(TIME_LIMIT_TRUNCATED_KEY.to_string(), "true".to_string());
            }
            step.done = true;
        }
        Ok(step)
    }

    fn render(&self, mode: RenderMode) -> Result<Option<String>> {
        self.inner.render(mode)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.inner.seed(seed)
    }

    fn configure(&mut self, display: Option<String>) {
        self.inner.configure(display)
    }
}

/// Maps environment ids to specs, plus the scoreboard groups and tasks.
#[derive(Debug, Default)]
pub struct Registry {
    specs: BTreeMap<String, EnvSpec>,
    groups: BTreeMap<String, TaskGroup>,
    tasks: BTreeMap<String, Task>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the 8-puzzle and every bandit variant.
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        registry.register_defaults().unwrap_or_else(|err| unreachable!("{}", err));
        registry
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(
            EnvSpec::new(EIGHT_PUZZLE_ID, "EightPuzzleEnvironment", |seed| {
                let environment = match seed {
                    Some(seed) => EightPuzzleEnvironment::with_seed(seed),
                    None => EightPuzzleEnvironment::new(),
                };
                Box::new(environment) as Box<dyn DynEnvironment>
            })
        )?;

        self.add_group(TaskGroup {
            id: BANDIT_GROUP_ID.to_string(),
            name: "Bandits".to_string(),
            description: "Various N-Armed Bandit environments".to_string(),
        });
        for variant in BanditVariant::ALL {
            let id = bandit_id(variant);
            self.register(
                EnvSpec::new(id.clone(), variant.name(), move |seed| {
                    Box::new(variant.build(seed)) as Box<dyn DynEnvironment>
                })
                    .with_max_episode_steps(BANDIT_TIMESTEP_LIMIT)
                    .nondeterministic()
            )?;
            self.add_task(Task {
                id,
                group: BANDIT_GROUP_ID.to_string(),
                summary: variant.name().to_string(),
            })?;
        }
        Ok(())
    }

    pub fn register(&mut self, spec: EnvSpec) -> Result<()> {
        if self.specs.contains_key(&spec.id) {
            return Err(EnvError::DuplicateRegistration(spec.id));
        }
        debug!(id = %spec.id, entry_point = %spec.entry_point, "Registered environment");
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn spec(&self, id: &str) -> Result<&EnvSpec> {
        self.specs.get(id).ok_or_else(|| EnvError::UnknownEnvironment(id.to_string()))
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }

    /// Instantiates an environment seeded from the operating system.
    pub fn make(&self, id: &str) -> Result<Box<dyn DynEnvironment>> {
        self.make_seeded(id, None)
    }

    /// Instantiates an environment, wrapped in a [`TimeLimit`] when its spec
    /// carries a step limit.
    pub fn make_seeded(&self, id: &str, seed: Option<u64>) -> Result<Box<dyn DynEnvironment>> {
        let spec = self.spec(id)?;
        debug!(id, ?seed, "Making environment");
        let environment = spec.build(seed);
        Ok(match spec.max_episode_steps {
            Some(limit) => Box::new(TimeLimit::new(environment, limit)) as Box<dyn DynEnvironment>,
            None => environment,
        })
    }

    pub fn add_group(&mut self, group: TaskGroup) {
        self.groups.insert(group.id.clone(), group);
    }

    /// Adds a scoreboard task. Its group must exist and its id must be a
    /// registered environment.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if !self.groups.contains_key(&task.group) {
            return Err(EnvError::UnknownGroup(task.group));
        }
        if !self.specs.contains_key(&task.id) {
            return Err(EnvError::UnknownEnvironment(task.id));
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    pub fn groups(&self) -> impl Iterator<Item = &TaskGroup> {
        self.groups.values()
    }

    pub fn tasks_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.values().filter(move |task| task.group == group)
    }
}

/// Registry id of a bandit variant, e.g. `jkcooper2/BanditTwoArmedLowLowFixed-v0`.
pub fn bandit_id(variant: BanditVariant) -> String {
    format!("{}/{}-v0", BANDIT_NAMESPACE, variant.name())
}
