use clap::{Args, Parser, ValueEnum};
use makespan_scheduling::algo::{Genetic, GeneticConfig};
use makespan_scheduling::core::Scheduler;
use makespan_scheduling::data::{self, GeneratorConfig};
use makespan_scheduling::{algo, init_logger, run_reader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::num::NonZero;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl From<Algorithm> for Box<dyn Scheduler> {
    fn from(value: Algorithm) -> Box<dyn Scheduler> {
        algo::SCHEDULERS[value.0]()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SCHEDULERS.iter().enumerate();
            iter.map(|(i, init)| Algorithm(i, init().name())).collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Args)]
struct GeneticArgs {
    /// Number of assignments per generation. Prefer an even number.
    #[clap(short, long, default_value = "50")]
    population: usize,
    /// Number of generations to run.
    #[clap(short, long, default_value = "200")]
    generations: usize,
    /// Probability of redrawing the node of each job in a child.
    #[clap(short, long, default_value = "0.1")]
    mutation_rate: f64,
    /// Seed of the random source.
    #[clap(short, long, default_value = "0")]
    seed: u64,
}

impl From<GeneticArgs> for GeneticConfig {
    fn from(args: GeneticArgs) -> Self {
        Self {
            population_size: args.population,
            generations: args.generations,
            mutation_rate: args.mutation_rate,
            seed: args.seed,
        }
    }
}

/// Application assigning jobs to nodes to minimize makespan.
#[derive(Debug, Parser)]
enum Application {
    /// Run one of the implemented algorithms on an instance read from stdin.
    Run { algorithm: Algorithm },
    /// Run the genetic algorithm with custom parameters on an instance read from stdin.
    Evolve {
        #[command(flatten)]
        args: GeneticArgs,
    },
    /// Run benchmarks on a directory of instances.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
    },
    /// Generate random instances.
    Gen {
        /// The number of jobs.
        jobs: NonZero<usize>,
        /// The number of nodes.
        nodes: NonZero<usize>,
        /// Probability that an ordered pair of jobs is a precedence edge.
        #[clap(short, long, default_value = "0.1")]
        precedence_ratio: f64,
        /// Capacity of every node.
        #[clap(short, long, default_value = "30")]
        capacity: u64,
        /// Seed of the random source.
        #[clap(short, long, default_value = "0")]
        seed: u64,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
    /// Print the small reference instance.
    Sample,
}

fn schedulers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Scheduler>> + '_ {
    let iter = algo::SCHEDULERS.iter().map(|init| init());
    iter.filter(|scheduler| !exclude.iter().any(|name| name.1 == scheduler.name()))
}

fn main() -> anyhow::Result<()> {
    init_logger();

    match Application::parse() {
        Application::Run { algorithm } => {
            let mut scheduler = Box::<dyn Scheduler>::from(algorithm);
            run_reader(scheduler.as_mut(), &mut std::io::stdin().lock())
        }
        Application::Evolve { args } => {
            let mut scheduler = Genetic::new(args.into())?;
            run_reader(&mut scheduler, &mut std::io::stdin().lock())
        }
        Application::Bench { input, exclude } => {
            for mut scheduler in schedulers(&exclude) {
                println!("{}", data::run(&input, scheduler.as_mut())?);
            }
            Ok(())
        }
        Application::Gen {
            jobs,
            nodes,
            precedence_ratio,
            capacity,
            seed,
            amount,
            output,
        } => {
            let config = GeneratorConfig {
                jobs: jobs.get(),
                nodes: nodes.get(),
                precedence_ratio,
                capacity,
                ..GeneratorConfig::default()
            };
            let mut rng = StdRng::seed_from_u64(seed);

            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            for i in 0..amount.get() {
                let instance = data::generate(&config, &mut rng)?;
                let filename = format!("{}_{}_{i}.json", config.jobs, config.nodes);
                std::fs::File::create(output.join(filename))?
                    .write_all(data::to_string(&instance)?.as_bytes())?;
            }
            Ok(())
        }
        Application::Sample => {
            println!("{}", data::to_string(&data::small()?)?);
            Ok(())
        }
    }
}
