use anyhow::Result;
use clap::{ Parser, Subcommand };
use tracing::info;

use toy_gym_envs::constants::{ DEFAULT_MAX_STEPS_PER_EPISODE, DEFAULT_NUM_OF_EPISODES, EIGHT_PUZZLE_ID };
use toy_gym_envs::logging;
use toy_gym_envs::registration::Registry;
use toy_gym_envs::seeding::np_random;
use toy_gym_envs::simulation_runner::{
    run_episode,
    EpisodeSummary,
    ParallelEpisodeRunner,
    RunnerConfig,
};
use toy_gym_envs::RenderMode;

#[derive(Parser)]
#[command(name = "toy-gym")]
#[command(version, about = "Sliding tile puzzle and multi-armed bandit environments", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered environments and scoreboard groups
    List,

    /// Play and render one random episode
    Play {
        /// Environment id
        #[arg(default_value = EIGHT_PUZZLE_ID)]
        env: String,

        /// Seed for the environment and the policy
        #[arg(long)]
        seed: Option<u64>,

        /// Step cap for the episode
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS_PER_EPISODE)]
        max_steps: usize,
    },

    /// Run many random episodes in parallel and summarise them
    Run {
        /// Environment id
        #[arg(default_value = EIGHT_PUZZLE_ID)]
        env: String,

        /// Number of episodes
        #[arg(long, default_value_t = DEFAULT_NUM_OF_EPISODES)]
        episodes: usize,

        /// Seed of the first episode; later episodes count up from it
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Step cap per episode
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS_PER_EPISODE)]
        max_steps: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let registry = Registry::with_defaults();

    match cli.command {
        Commands::List => list_envs(&registry),
        Commands::Play { env, seed, max_steps } => {
            play(&registry, &env, seed, max_steps)?;
        }
        Commands::Run { env, episodes, seed, max_steps } => {
            let config = RunnerConfig {
                env_id: env,
                num_of_episodes: episodes,
                base_seed: seed,
                max_steps_per_episode: max_steps,
            };
            run(&registry, config)?;
        }
    }

    Ok(())
}

fn list_envs(registry: &Registry) {
    println!("Registered environments:");
    for id in registry.ids() {
        if let Ok(spec) = registry.spec(id) {
            let limit = spec.max_episode_steps.map_or("none".to_string(), |steps| steps.to_string());
            println!("  {:<50} step limit: {:<6} nondeterministic: {}", id, limit, spec.nondeterministic);
        }
    }
    for group in registry.groups() {
        println!("\n{} ({}): {}", group.name, group.id, group.description);
        for task in registry.tasks_in_group(&group.id) {
            println!("  {:<50} {}", task.id, task.summary);
        }
    }
}

fn play(registry: &Registry, id: &str, seed: Option<u64>, max_steps: usize) -> Result<()> {
    let (_, seed) = np_random(seed);
    let mut environment = registry.make_seeded(id, Some(seed))?;
    info!(id, seed, "Playing one episode");

    let record = run_episode(environment.as_mut(), seed, max_steps, Some(RenderMode::Human))?;

    println!(
        "Episode finished: {} \t Steps: {} \t Total reward: {}",
        record.finished,
        record.length(),
        record.total_reward()
    );
    Ok(())
}

fn run(registry: &Registry, config: RunnerConfig) -> Result<()> {
    let runner = ParallelEpisodeRunner::new(registry, config);
    let records = runner.run_all_episodes_in_parallel()?;
    let summary = EpisodeSummary::from_records(&records);

    println!("## Summary for {} ##", runner.config().env_id);
    println!(
        "Episodes: {} \t Finished: {} \t Mean total reward: {:.3} \t Mean length: {:.1}",
        summary.num_of_episodes,
        summary.num_finished,
        summary.mean_total_reward,
        summary.mean_length
    );
    Ok(())
}
