use crate::core::Scheduler;

mod genetic;
mod greedy;

pub use genetic::{crossover, crossover_at, mutate, Evolution, Genetic, GeneticConfig};
pub use greedy::{assign as greedy_assign, Greedy};

/// Factories of every available scheduler.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [fn() -> Box<dyn Scheduler>];
