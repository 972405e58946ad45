use thiserror::Error;

/// Reasons an instance is rejected at construction.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InstanceError {
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("instance has {jobs} jobs but no nodes to run them")]
    NoNodes { jobs: usize },
    #[error("job {job} has zero duration")]
    ZeroDuration { job: usize },
    #[error("job {job} has zero resource load")]
    ZeroLoad { job: usize },
    #[error("job {job} precedes itself")]
    SelfLoop { job: usize },
    #[error("precedence references unknown job {job}")]
    UnknownJob { job: usize },
    #[error("delay matrix has {found} rows, expected {expected}")]
    DelayRows { expected: usize, found: usize },
    #[error("delay matrix row {row} has {found} columns, expected {expected}")]
    DelayColumns {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("delay from node {node} to itself is {delay}, expected 0")]
    NonZeroDiagonal { node: usize, delay: u64 },
    #[error("durations and delays of {jobs} jobs do not fit in a u64 time horizon")]
    Horizon { jobs: usize },
}

/// Reasons an assignment does not fit an instance.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AssignmentError {
    #[error("assignment maps {found} jobs, instance has {expected}")]
    Length { expected: usize, found: usize },
    #[error("job {job} is assigned to unknown node {node}")]
    UnknownNode { job: usize, node: usize },
}

/// Reasons an optimizer or generator configuration is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("mutation rate {0} is outside [0, 1]")]
    MutationRate(f64),
    #[error("generation count must be at least 1")]
    Generations,
    #[error("population size {0} is below 2")]
    PopulationSize(usize),
    #[error("precedence ratio {0} is outside [0, 1]")]
    PrecedenceRatio(f64),
    #[error("{field} range {min}..={max} is empty")]
    EmptyRange {
        field: &'static str,
        min: u64,
        max: u64,
    },
}
