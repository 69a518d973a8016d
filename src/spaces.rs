use rand::Rng;

/// A finite set of actions `{0, 1, ..., n - 1}`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Discrete {
    pub n: usize,
}

impl Discrete {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Discrete space must have at least one element!");
        Discrete { n }
    }

    pub fn contains(&self, x: usize) -> bool {
        x < self.n
    }

    /// Draws an element uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.n)
    }
}

/// A fixed-size vector of integers, each bounded by `[low, high]`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BoxSpace {
    pub low: i64,
    pub high: i64,
    pub shape: Vec<usize>,
}

impl BoxSpace {
    pub fn new(low: i64, high: i64, shape: &[usize]) -> Self {
        assert!(low <= high, "Lower bound cannot be bigger than upper bound!");
        BoxSpace {
            low,
            high,
            shape: shape.to_vec(),
        }
    }

    /// Total number of elements in a value of this space.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn contains(&self, values: &[i64]) -> bool {
        values.len() == self.size() && values.iter().all(|v| (self.low..=self.high).contains(v))
    }
}

/// Space descriptor as seen through the type-erased environment interface.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Space {
    Discrete(Discrete),
    Box(BoxSpace),
}

impl Space {
    /// Number of integers in a flattened observation from this space.
    pub fn flat_dim(&self) -> usize {
        match self {
            Space::Discrete(_) => 1,
            Space::Box(space) => space.size(),
        }
    }

    /// Whether a flattened observation belongs to this space.
    pub fn contains(&self, values: &[i64]) -> bool {
        if values.len() != self.flat_dim() {
            return false;
        }
        match self {
            Space::Discrete(space) => usize::try_from(values[0]).map_or(false, |v| space.contains(v)),
            Space::Box(space) => space.contains(values),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_discrete_contains() {
        let space = Discrete::new(4);

        assert!(space.contains(0));
        assert!(space.contains(3));
        assert!(!space.contains(4));
    }

    #[test]
    #[should_panic(expected = "Discrete space must have at least one element!")]
    fn test_discrete_cannot_be_empty() {
        Discrete::new(0);
    }

    #[test]
    fn test_discrete_sample_within_range() {
        let space = Discrete::new(4);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 4];

        for _ in 0..1000 {
            let action = space.sample(&mut rng);
            assert!(space.contains(action), "Sampled action outside of space: {}", action);
            seen[action] = true;
        }

        assert!(seen.iter().all(|&s| s), "Every action should be sampled at least once");
    }

    #[test]
    fn test_box_contains_checks_length_and_bounds() {
        let space = BoxSpace::new(0, 9, &[9]);

        assert!(space.contains(&[1, 2, 3, 4, 5, 6, 7, 8, 0]));
        assert!(!space.contains(&[1, 2, 3]));
        assert!(!space.contains(&[1, 2, 3, 4, 5, 6, 7, 8, 10]));
        assert!(!space.contains(&[-1, 2, 3, 4, 5, 6, 7, 8, 0]));
    }

    #[test]
    fn test_flat_dim() {
        assert_eq!(Space::Discrete(Discrete::new(1)).flat_dim(), 1);
        assert_eq!(Space::Box(BoxSpace::new(0, 9, &[3, 3])).flat_dim(), 9);
    }

    #[test]
    fn test_space_contains_flattened_values() {
        let discrete = Space::Discrete(Discrete::new(2));

        assert!(discrete.contains(&[1]));
        assert!(!discrete.contains(&[2]));
        assert!(!discrete.contains(&[-1]));
        assert!(!discrete.contains(&[0, 1]));
        assert!(Space::Box(BoxSpace::new(0, 9, &[3])).contains(&[0, 4, 9]));
    }
}
