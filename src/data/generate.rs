use crate::core::{ConfigError, Instance, Job, Node, Precedence};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters of random instance generation.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub jobs: usize,
    pub nodes: usize,
    pub max_duration: u64,
    pub max_load: u64,
    pub capacity: u64,
    /// Probability that an ordered pair of distinct jobs becomes a precedence edge.
    pub precedence_ratio: f64,
    pub min_delay: u64,
    pub max_delay: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            jobs: 100,
            nodes: 6,
            max_duration: 10,
            max_load: 5,
            capacity: 30,
            precedence_ratio: 0.1,
            min_delay: 1,
            max_delay: 3,
        }
    }
}

impl GeneratorConfig {
    /// Checks that every range can be sampled.
    ///
    /// # Errors
    /// - If the precedence ratio is outside `[0, 1]`.
    /// - If the duration, load or delay range is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.precedence_ratio) {
            return Err(ConfigError::PrecedenceRatio(self.precedence_ratio));
        }

        let ranges = [
            ("duration", 1, self.max_duration),
            ("load", 1, self.max_load),
            ("delay", self.min_delay, self.max_delay),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(ConfigError::EmptyRange { field, min, max });
            }
        }

        Ok(())
    }
}

/// Generates a random instance.
/// Precedence edges may form cycles; the simulator tolerates them.
///
/// # Errors
/// - If the configuration is invalid.
/// - If the configuration has jobs but no nodes.
pub fn generate(config: &GeneratorConfig, rng: &mut impl Rng) -> anyhow::Result<Instance> {
    config.validate()?;

    let durations: Vec<_> = (0..config.jobs)
        .map(|_| rng.gen_range(1..=config.max_duration))
        .collect();
    let loads: Vec<_> = (0..config.jobs)
        .map(|_| rng.gen_range(1..=config.max_load))
        .collect();
    let jobs = durations.into_iter().zip(loads);
    let jobs = jobs.map(|(duration, load)| Job { duration, load }).collect();

    let nodes = vec![Node { capacity: config.capacity }; config.nodes];

    let mut precedences = Vec::new();
    for first in 0..config.jobs {
        for second in 0..config.jobs {
            if first != second && rng.gen_bool(config.precedence_ratio) {
                precedences.push(Precedence::new(first, second));
            }
        }
    }

    let delays = (0..config.nodes)
        .map(|from| {
            (0..config.nodes)
                .map(|to| {
                    if from == to {
                        0
                    } else {
                        rng.gen_range(config.min_delay..=config.max_delay)
                    }
                })
                .collect()
        })
        .collect();

    Ok(Instance::new(jobs, nodes, precedences, delays)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_instances_within_bounds() -> anyhow::Result<()> {
        let config = GeneratorConfig {
            jobs: 30,
            nodes: 4,
            ..GeneratorConfig::default()
        };
        let instance = generate(&config, &mut StdRng::seed_from_u64(123))?;

        assert_eq!(instance.jobs().len(), 30);
        assert_eq!(instance.nodes().len(), 4);
        assert!(instance.jobs().iter().all(|job| (1..=10).contains(&job.duration)));
        assert!(instance.jobs().iter().all(|job| (1..=5).contains(&job.load)));
        assert!(instance.nodes().iter().all(|node| node.capacity == 30));
        for from in 0..4 {
            for to in 0..4 {
                let delay = instance.delay(from, to);
                if from == to {
                    assert_eq!(delay, 0);
                } else {
                    assert!((1..=3).contains(&delay));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn same_seed_gives_same_instance() -> anyhow::Result<()> {
        let config = GeneratorConfig::default();
        let first = generate(&config, &mut StdRng::seed_from_u64(42))?;
        let second = generate(&config, &mut StdRng::seed_from_u64(42))?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn ratio_bounds_edges() -> anyhow::Result<()> {
        let none = GeneratorConfig {
            jobs: 10,
            precedence_ratio: 0.0,
            ..GeneratorConfig::default()
        };
        let instance = generate(&none, &mut StdRng::seed_from_u64(1))?;
        assert!(instance.graph().edges().is_empty());

        let all = GeneratorConfig {
            precedence_ratio: 1.0,
            ..none
        };
        let instance = generate(&all, &mut StdRng::seed_from_u64(1))?;
        assert_eq!(instance.graph().edges().len(), 90);
        assert!(!instance.is_acyclic());
        Ok(())
    }

    #[test]
    fn rejects_invalid_configs() {
        let ratio = GeneratorConfig {
            precedence_ratio: 2.0,
            ..GeneratorConfig::default()
        };
        assert_eq!(ratio.validate(), Err(ConfigError::PrecedenceRatio(2.0)));

        let delay = GeneratorConfig {
            min_delay: 4,
            ..GeneratorConfig::default()
        };
        assert_eq!(
            delay.validate(),
            Err(ConfigError::EmptyRange {
                field: "delay",
                min: 4,
                max: 3
            })
        );

        let nodes = GeneratorConfig {
            nodes: 0,
            ..GeneratorConfig::default()
        };
        assert!(generate(&nodes, &mut StdRng::seed_from_u64(1)).is_err());
    }
}
