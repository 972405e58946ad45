use clap::Parser;
use makespan_scheduling::data::{self, GeneratorConfig};
use makespan_scheduling::init_logger;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::num::NonZero;

#[derive(Debug, Parser)]
#[command(
    version,
    about,
    long_about = "Generates random instances of the job-to-node scheduling problem."
)]
pub struct Config {
    /// The number of jobs.
    pub jobs: NonZero<usize>,
    /// The number of nodes.
    pub nodes: NonZero<usize>,
    /// The maximum duration of a job.
    #[clap(short = 'd', long, default_value = "10")]
    pub max_duration: NonZero<u64>,
    /// The maximum resource load of a job.
    #[clap(short = 'l', long, default_value = "5")]
    pub max_load: NonZero<u64>,
    /// Capacity of every node.
    #[clap(short, long, default_value = "30")]
    pub capacity: u64,
    /// Probability that an ordered pair of jobs is a precedence edge.
    #[clap(short, long, default_value = "0.1")]
    pub precedence_ratio: f64,
    /// Smallest delay between two different nodes.
    #[clap(long, default_value = "1")]
    pub min_delay: u64,
    /// Largest delay between two different nodes.
    #[clap(long, default_value = "3")]
    pub max_delay: u64,
    /// Seed of the random source.
    #[clap(short, long, default_value = "0")]
    pub seed: u64,
    /// Number of instances to generate.
    #[clap(short, long, default_value = "1")]
    pub amount: NonZero<u64>,
    /// Path to output the generated instances. If the directory does not exist, it will be created.
    #[clap(short, long, default_value = "output")]
    pub output: String,
}

impl From<&Config> for GeneratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            jobs: config.jobs.get(),
            nodes: config.nodes.get(),
            max_duration: config.max_duration.get(),
            max_load: config.max_load.get(),
            capacity: config.capacity,
            precedence_ratio: config.precedence_ratio,
            min_delay: config.min_delay,
            max_delay: config.max_delay,
        }
    }
}

fn gen(config: &Config) -> anyhow::Result<()> {
    let output = std::path::Path::new(&config.output);
    if !output.exists() {
        std::fs::create_dir_all(output)?;
    }

    let generator = GeneratorConfig::from(config);
    let mut rng = StdRng::seed_from_u64(config.seed);

    for i in 0..config.amount.get() {
        let instance = data::generate(&generator, &mut rng)?;
        let filename = format!("{}_{}_{i}.json", config.jobs, config.nodes);
        std::fs::File::create(output.join(filename))?
            .write_all(data::to_string(&instance)?.as_bytes())?;
        log::info!("Generated instance {i} in {}", output.display());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logger();
    gen(&Config::parse())
}
