use std::fmt;

use rand::distributions::{ Bernoulli, Distribution };
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::Normal;
use tracing::debug;

use crate::constants::NUM_OF_ARMS_TEN;
use crate::environments::{ Environment, RenderMode, Step };
use crate::errors::{ EnvError, Result };
use crate::seeding::np_random;
use crate::spaces::{ Discrete, Space };

/// What an arm pays out when it wins.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum RewardDistribution {
    /// Always the same amount.
    Fixed(f64),
    /// A fresh sample from a normal distribution on every win.
    Gaussian { mean: f64, std_dev: f64 },
}

impl RewardDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            RewardDistribution::Fixed(reward) => reward,
            RewardDistribution::Gaussian { mean, std_dev } => {
                match Normal::new(mean, std_dev) {
                    Ok(normal) => normal.sample(rng),
                    Err(_) => unreachable!("standard deviation validated on construction"),
                }
            }
        }
    }
}

/// A k-armed bandit. Pulling arm `a` pays a reward drawn from `r_dist[a]`
/// with probability `p_dist[a]` and nothing otherwise.
///
/// Every episode is a single pull: `step` always reports `done`. The
/// observation is always 0.
#[derive(Debug, Clone)]
pub struct BanditEnvironment {
    p_dist: Vec<f64>,
    r_dist: Vec<RewardDistribution>,
    payouts: Vec<Bernoulli>,
    action_space: Discrete,
    rng: StdRng,
    last_pull: Option<(usize, f64)>,
}

impl BanditEnvironment {
    /// Creates a bandit seeded from the operating system.
    pub fn new(p_dist: Vec<f64>, r_dist: Vec<RewardDistribution>) -> Result<Self> {
        Self::with_rng(p_dist, r_dist, np_random(None).0)
    }

    fn with_rng(p_dist: Vec<f64>, r_dist: Vec<RewardDistribution>, rng: StdRng) -> Result<Self> {
        if p_dist.is_empty() {
            return Err(EnvError::InvalidBandit("a bandit needs at least one arm".to_string()));
        }
        if p_dist.len() != r_dist.len() {
            return Err(
                EnvError::InvalidBandit(
                    format!(
                        "{} payout probabilities but {} reward distributions",
                        p_dist.len(),
                        r_dist.len()
                    )
                )
            );
        }
        for distribution in &r_dist {
            if let RewardDistribution::Gaussian { std_dev, .. } = distribution {
                if !std_dev.is_finite() || *std_dev < 0.0 {
                    return Err(
                        EnvError::InvalidBandit(format!("invalid standard deviation {}", std_dev))
                    );
                }
            }
        }
        let payouts = p_dist
            .iter()
            .map(|&p| {
                Bernoulli::new(p).map_err(|_|
                    EnvError::InvalidBandit(format!("probability {} is not in the range [0, 1]", p))
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BanditEnvironment {
            action_space: Discrete::new(p_dist.len()),
            p_dist,
            r_dist,
            payouts,
            rng,
            last_pull: None,
        })
    }

    pub fn num_of_arms(&self) -> usize {
        self.p_dist.len()
    }

    /// Payout probabilities of every arm. Hidden from an agent, useful for
    /// comparing what it learned against the truth.
    pub fn p_dist(&self) -> &[f64] {
        &self.p_dist
    }

    pub fn r_dist(&self) -> &[RewardDistribution] {
        &self.r_dist
    }
}

impl Environment for BanditEnvironment {
    type Observation = usize;
    type Action = usize;

    fn action_space(&self) -> Space {
        Space::Discrete(self.action_space)
    }

    fn observation_space(&self) -> Space {
        Space::Discrete(Discrete::new(1))
    }

    fn reset(&mut self) -> Result<usize> {
        self.last_pull = None;
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<Step<usize>> {
        if !self.action_space.contains(action) {
            return Err(EnvError::invalid_action(&action));
        }

        let reward = if self.payouts[action].sample(&mut self.rng) {
            self.r_dist[action].sample(&mut self.rng)
        } else {
            0.0
        };
        debug!(arm = action, reward, "Pulled arm");
        self.last_pull = Some((action, reward));

        Ok(Step::new(0, reward, true))
    }

    fn render(&self, mode: RenderMode) -> Result<Option<String>> {
        let frame = match self.last_pull {
            Some((arm, reward)) => format!("arm {} reward {}\n", arm, reward),
            None => "\n".to_string(),
        };
        mode.emit(frame)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let (rng, seed) = np_random(seed);
        self.rng = rng;
        vec![seed]
    }
}

/// The bandit problems published by the bandit environment package.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum BanditVariant {
    TenArmedRandomFixed,
    TenArmedRandomRandom,
    TenArmedRandomStochastic,
    TwoArmedDeterministicFixed,
    TwoArmedHighHighFixed,
    TwoArmedHighLowFixed,
    TwoArmedHighLowFixedNegative,
    TwoArmedLowLowFixed,
}

impl BanditVariant {
    pub const ALL: [BanditVariant; 8] = [
        BanditVariant::TenArmedRandomFixed,
        BanditVariant::TenArmedRandomRandom,
        BanditVariant::TenArmedRandomStochastic,
        BanditVariant::TwoArmedDeterministicFixed,
        BanditVariant::TwoArmedHighHighFixed,
        BanditVariant::TwoArmedHighLowFixed,
        BanditVariant::TwoArmedHighLowFixedNegative,
        BanditVariant::TwoArmedLowLowFixed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BanditVariant::TenArmedRandomFixed => "BanditTenArmedRandomFixed",
            BanditVariant::TenArmedRandomRandom => "BanditTenArmedRandomRandom",
            BanditVariant::TenArmedRandomStochastic => "BanditTenArmedRandomStochastic",
            BanditVariant::TwoArmedDeterministicFixed => "BanditTwoArmedDeterministicFixed",
            BanditVariant::TwoArmedHighHighFixed => "BanditTwoArmedHighHighFixed",
            BanditVariant::TwoArmedHighLowFixed => "BanditTwoArmedHighLowFixed",
            BanditVariant::TwoArmedHighLowFixedNegative => "BanditTwoArmedHighLowFixedNegative",
            BanditVariant::TwoArmedLowLowFixed => "BanditTwoArmedLowLowFixed",
        }
    }

    /// Builds the bandit. Randomised arms are drawn from the bandit's own
    /// generator, so the same seed always gives the same arms.
    pub fn build(&self, seed: Option<u64>) -> BanditEnvironment {
        let (mut rng, seed) = np_random(seed);
        let (p_dist, r_dist) = self.distributions(&mut rng);
        debug!(variant = self.name(), seed, ?p_dist, "Building bandit");
        match BanditEnvironment::with_rng(p_dist, r_dist, rng) {
            Ok(bandit) => bandit,
            Err(err) => unreachable!("built-in bandit {} is invalid: {}", self.name(), err),
        }
    }

    fn distributions(&self, rng: &mut StdRng) -> (Vec<f64>, Vec<RewardDistribution>) {
        use RewardDistribution::Fixed;

        let uniform_probabilities = |rng: &mut StdRng| -> Vec<f64> {
            (0..NUM_OF_ARMS_TEN).map(|_| rng.gen::<f64>()).collect()
        };
        match self {
            BanditVariant::TenArmedRandomFixed => {
                (uniform_probabilities(rng), vec![Fixed(1.0); NUM_OF_ARMS_TEN])
            }
            BanditVariant::TenArmedRandomRandom => {
                let p_dist = uniform_probabilities(rng);
                let r_dist = (0..NUM_OF_ARMS_TEN).map(|_| Fixed(rng.gen::<f64>())).collect();
                (p_dist, r_dist)
            }
            BanditVariant::TenArmedRandomStochastic => {
                let p_dist = uniform_probabilities(rng);
                let standard_normal = Normal::new(0.0, 1.0).unwrap_or_else(|_| unreachable!());
                let r_dist = (0..NUM_OF_ARMS_TEN)
                    .map(|_| RewardDistribution::Gaussian {
                        mean: standard_normal.sample(rng),
                        std_dev: 1.0,
                    })
                    .collect();
                (p_dist, r_dist)
            }
            BanditVariant::TwoArmedDeterministicFixed => (vec![1.0, 0.0], vec![Fixed(1.0); 2]),
            BanditVariant::TwoArmedHighHighFixed => (vec![0.8, 0.9], vec![Fixed(1.0); 2]),
            BanditVariant::TwoArmedHighLowFixed => (vec![0.8, 0.2], vec![Fixed(1.0); 2]),
            BanditVariant::TwoArmedHighLowFixedNegative => (vec![0.8, 0.2], vec![Fixed(-1.0); 2]),
            BanditVariant::TwoArmedLowLowFixed => (vec![0.1, 0.2], vec![Fixed(1.0); 2]),
        }
    }
}

impl fmt::Display for BanditVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn pull_many(bandit: &mut BanditEnvironment, arm: usize, pulls: usize) -> Vec<f64> {
        (0..pulls).map(|_| bandit.step(arm).unwrap().reward).collect()
    }

    #[test]
    fn test_create_bandit_with_valid_probabilities() {
        let bandit = BanditEnvironment::new(vec![0.5, 0.1], vec![RewardDistribution::Fixed(1.0); 2]).unwrap();

        assert_eq!(bandit.num_of_arms(), 2);
        assert_eq!(bandit.p_dist(), &[0.5, 0.1]);
        assert_eq!(bandit.action_space(), Space::Discrete(Discrete::new(2)));
        assert_eq!(bandit.observation_space(), Space::Discrete(Discrete::new(1)));
    }

    #[test]
    fn test_create_bandit_with_probability_greater_than_one() {
        let result = BanditEnvironment::new(vec![1.5], vec![RewardDistribution::Fixed(1.0)]);

        assert!(matches!(result, Err(EnvError::InvalidBandit(_))));
    }

    #[test]
    fn test_create_bandit_with_mismatched_lengths() {
        let result = BanditEnvironment::new(vec![0.5, 0.5], vec![RewardDistribution::Fixed(1.0)]);

        assert!(matches!(result, Err(EnvError::InvalidBandit(_))));
    }

    #[test]
    fn test_create_bandit_with_negative_standard_deviation() {
        let result = BanditEnvironment::new(
            vec![0.5],
            vec![RewardDistribution::Gaussian { mean: 0.0, std_dev: -1.0 }]
        );

        assert!(matches!(result, Err(EnvError::InvalidBandit(_))));
    }

    #[test]
    fn test_create_bandit_without_arms() {
        assert!(matches!(BanditEnvironment::new(vec![], vec![]), Err(EnvError::InvalidBandit(_))));
    }

    #[test]
    fn test_pull_always_returns_zero_when_probability_is_zero() {
        let mut bandit = BanditVariant::TwoArmedDeterministicFixed.build(Some(1));

        for reward in pull_many(&mut bandit, 1, 100) {
            assert_eq!(reward, 0.0, "Pull result is not zero when probability is zero");
        }
    }

    #[test]
    fn test_pull_always_returns_reward_when_probability_is_one() {
        let mut bandit = BanditVariant::TwoArmedDeterministicFixed.build(Some(1));

        for reward in pull_many(&mut bandit, 0, 100) {
            assert_eq!(reward, 1.0, "Pull result is not one when probability is one");
        }
    }

    #[test]
    fn test_every_pull_ends_the_episode() {
        let mut bandit = BanditVariant::TwoArmedHighLowFixed.build(Some(3));

        assert_eq!(bandit.reset().unwrap(), 0);
        let step = bandit.step(0).unwrap();

        assert!(step.done);
        assert_eq!(step.observation, 0);
        assert!(step.info.is_empty());
    }

    #[test]
    fn test_invalid_arm_is_rejected() {
        let mut bandit = BanditVariant::TwoArmedLowLowFixed.build(None);

        let error = bandit.step(2).unwrap_err();

        assert_eq!(error.to_string(), "2 (usize) invalid");
    }

    #[test]
    fn test_high_low_payout_rates() {
        let mut bandit = BanditVariant::TwoArmedHighLowFixed.build(Some(10));
        let pulls = 10_000;

        let high = pull_many(&mut bandit, 0, pulls).iter().sum::<f64>() / (pulls as f64);
        let low = pull_many(&mut bandit, 1, pulls).iter().sum::<f64>() / (pulls as f64);

        assert_relative_eq!(high, 0.8, epsilon = 0.03);
        assert_relative_eq!(low, 0.2, epsilon = 0.03);
    }

    #[test]
    fn test_negative_variant_pays_minus_one() {
        let mut bandit = BanditVariant::TwoArmedHighLowFixedNegative.build(Some(4));

        for reward in pull_many(&mut bandit, 0, 200) {
            assert!(reward == 0.0 || reward == -1.0, "Unexpected reward {}", reward);
        }
    }

    #[test]
    fn test_ten_armed_variants_have_ten_arms() {
        for variant in [
            BanditVariant::TenArmedRandomFixed,
            BanditVariant::TenArmedRandomRandom,
            BanditVariant::TenArmedRandomStochastic,
        ] {
            let bandit = variant.build(Some(8));

            assert_eq!(bandit.num_of_arms(), NUM_OF_ARMS_TEN);
            assert!(
                bandit.p_dist().iter().all(|p| (0.0..=1.0).contains(p)),
                "Probabilities of {} out of range: {:?}",
                variant,
                bandit.p_dist()
            );
        }
    }

    #[test]
    fn test_stochastic_rewards_are_gaussian() {
        let bandit = BanditVariant::TenArmedRandomStochastic.build(Some(8));

        for distribution in bandit.r_dist() {
            assert!(
                matches!(distribution, RewardDistribution::Gaussian { std_dev, .. } if *std_dev == 1.0)
            );
        }
    }

    #[test]
    fn test_same_seed_gives_same_arms_and_pulls() {
        let mut first = BanditVariant::TenArmedRandomRandom.build(Some(21));
        let mut second = BanditVariant::TenArmedRandomRandom.build(Some(21));

        assert_eq!(first.p_dist(), second.p_dist());
        assert_eq!(first.r_dist(), second.r_dist());
        assert_eq!(pull_many(&mut first, 3, 50), pull_many(&mut second, 3, 50));
    }

    #[test]
    fn test_random_arms_are_unique() {
        let bandit = BanditVariant::TenArmedRandomFixed.build(Some(2));
        let mut probabilities = bandit.p_dist().to_vec();
        probabilities.sort_by(|a, b| a.partial_cmp(b).unwrap());
        probabilities.dedup();

        assert_eq!(probabilities.len(), NUM_OF_ARMS_TEN, "Bandit arms do not have unique probabilities");
    }

    #[test]
    fn test_render_shows_last_pull() {
        let mut bandit = BanditVariant::TwoArmedDeterministicFixed.build(Some(1));

        assert_eq!(bandit.render(RenderMode::Ansi).unwrap().as_deref(), Some("\n"));
        bandit.step(0).unwrap();
        assert_eq!(bandit.render(RenderMode::Ansi).unwrap().as_deref(), Some("arm 0 reward 1\n"));
    }

    #[test]
    fn test_reset_clears_last_pull() {
        let mut bandit = BanditVariant::TwoArmedDeterministicFixed.build(Some(1));
        bandit.step(0).unwrap();

        bandit.reset().unwrap();

        assert_eq!(bandit.render(RenderMode::Ansi).unwrap().as_deref(), Some("\n"));
    }

    #[test]
    fn test_variant_names() {
        let names: Vec<&str> = BanditVariant::ALL.iter().map(BanditVariant::name).collect();

        assert_eq!(names.len(), 8);
        assert!(names.iter().all(|name| name.starts_with("Bandit")));
        assert_eq!(BanditVariant::TwoArmedLowLowFixed.to_string(), "BanditTwoArmedLowLowFixed");
    }
}
