mod error;
mod problem;
mod simulator;
mod solution;
mod util;

pub use error::*;
pub use problem::*;
pub use simulator::*;
pub use solution::*;
pub use util::*;

/// Assigns the jobs of an instance to nodes.
pub trait Scheduler {
    /// Schedules the jobs of the given instance.
    fn schedule<'a>(&mut self, instance: &'a Instance) -> Schedule<'a>;

    /// Returns the name of the scheduler.
    fn name(&self) -> &'static str;
}
