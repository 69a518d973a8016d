use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{ debug, info };

use crate::constants::{
    DEFAULT_MAX_STEPS_PER_EPISODE,
    DEFAULT_NUM_OF_EPISODES,
    EIGHT_PUZZLE_ID,
    TIME_LIMIT_TRUNCATED_KEY,
};
use crate::environments::{ DynEnvironment, RenderMode };
use crate::errors::{ EnvError, Result };
use crate::registration::Registry;
use crate::seeding::np_random;
use crate::spaces::Space;

/// Settings for a batch of random-policy episodes.
#[derive(PartialEq, Debug, Clone)]
pub struct RunnerConfig {
    pub env_id: String,
    pub num_of_episodes: usize,
    /// Episode `n` is seeded with `base_seed + n`.
    pub base_seed: u64,
    pub max_steps_per_episode: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            env_id: EIGHT_PUZZLE_ID.to_string(),
            num_of_episodes: DEFAULT_NUM_OF_EPISODES,
            base_seed: 0,
            max_steps_per_episode: DEFAULT_MAX_STEPS_PER_EPISODE,
        }
    }
}

/// Actions taken and rewards received over one episode. Index is the turn.
#[derive(PartialEq, Debug, Clone)]
pub struct EpisodeRecord {
    pub seed: u64,
    pub actions: Vec<usize>,
    pub rewards: Vec<f64>,
    /// True when the environment reported `done` before the step cap.
    pub finished: bool,
}

impl EpisodeRecord {
    pub fn length(&self) -> usize {
        self.actions.len()
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct EpisodeSummary {
    pub num_of_episodes: usize,
    pub num_finished: usize,
    pub mean_total_reward: f64,
    pub mean_length: f64,
}

impl EpisodeSummary {
    pub fn from_records(records: &[EpisodeRecord]) -> Self {
        let n = records.len().max(1) as f64;
        EpisodeSummary {
            num_of_episodes: records.len(),
            num_finished: records
                .iter()
                .filter(|record| record.finished)
                .count(),
            mean_total_reward: records
                .iter()
                .map(EpisodeRecord::total_reward)
                .sum::<f64>() / n,
            mean_length: (records
                .iter()
                .map(EpisodeRecord::length)
                .sum::<usize>() as f64) / n,
        }
    }
}

/// Generator for the random policy of the episode seeded with `seed`. Keyed
/// on the first draw of that seed's stream, never on `seed` itself.
fn policy_rng(seed: u64) -> StdRng {
    let (mut seeder, _) = np_random(Some(seed));
    np_random(Some(seeder.gen::<u64>())).0
}

/// Plays one episode choosing actions uniformly at random. The environment
/// must already be seeded; the policy draws from its own stream derived from
/// `seed`. When `render` is set, the environment is rendered after the reset
/// and after every step.
pub fn run_episode(
    environment: &mut dyn DynEnvironment,
    seed: u64,
    max_steps: usize,
    render: Option<RenderMode>
) -> Result<EpisodeRecord> {
    let action_space = match environment.action_space() {
        Space::Discrete(space) => space,
        other => {
            return Err(EnvError::UnsupportedActionSpace(format!("{:?}", other)));
        }
    };
    let observation_space = environment.observation_space();
    let mut policy = policy_rng(seed);
    let observation = environment.reset()?;
    debug_assert!(
        observation_space.contains(&observation),
        "Reset observation {:?} outside of {:?}",
        observation,
        observation_space
    );
    if let Some(mode) = render {
        environment.render(mode)?;
    }

    let mut actions = vec![];
    let mut rewards = vec![];
    let mut finished = false;
    while actions.len() < max_steps {
        let action = action_space.sample(&mut policy);
        let step = environment.step(action)?;
        actions.push(action);
        rewards.push(step.reward);
        debug_assert!(
            observation_space.contains(&step.observation),
            "Step observation {:?} outside of {:?}",
            step.observation,
            observation_space
        );
        if let Some(mode) = render {
            environment.render(mode)?;
        }
        if step.done {
            finished = !step.info.contains_key(TIME_LIMIT_TRUNCATED_KEY);
            break;
        }
    }
    debug!(seed, length = actions.len(), finished, "Episode over");

    Ok(EpisodeRecord {
        seed,
        actions,
        rewards,
        finished,
    })
}

/// Runs many independent episodes of one registered environment in parallel.
/// Each episode gets its own environment instance.
pub struct ParallelEpisodeRunner<'a> {
    registry: &'a Registry,
    config: RunnerConfig,
}

impl<'a> ParallelEpisodeRunner<'a> {
    pub fn new(registry: &'a Registry, config: RunnerConfig) -> Self {
        ParallelEpisodeRunner { registry, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn run_all_episodes_in_parallel(&self) -> Result<Vec<EpisodeRecord>> {
        // Fail on a bad id before spawning any work.
        self.registry.spec(&self.config.env_id)?;

        let start_time = Instant::now();
        let records = (0..self.config.num_of_episodes as u64)
            .into_par_iter()
            .map(|episode| {
                let seed = self.config.base_seed.wrapping_add(episode);
                let mut environment = self.registry.make_seeded(&self.config.env_id, Some(seed))?;
                run_episode(environment.as_mut(), seed, self.config.max_steps_per_episode, None)
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            env_id = %self.config.env_id,
            episodes = records.len(),
            elapsed = ?start_time.elapsed(),
            "Parallel run finished"
        );
        Ok(records)
    }
}
