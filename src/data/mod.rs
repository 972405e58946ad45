//! Reading and writing instances, reference instances, generation and benchmarking.

mod generate;
mod run;

pub use generate::*;
pub use run::*;

use crate::core::{Instance, InstanceError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::BufRead;

/// Reads a JSON value from the reader.
///
/// # Errors
/// - If the input is not valid JSON for `T`, including instances that fail validation.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl BufRead) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes the value as pretty-printed JSON.
///
/// # Errors
/// - If the value cannot be serialized.
pub fn to_string<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Three jobs on two nodes, job 0 preceding job 2.
/// Its optimal makespan is 7.
///
/// # Errors
/// Never in practice; the data is well-formed.
pub fn small() -> Result<Instance, InstanceError> {
    Instance::from_columns(&[3, 2, 4], &[2, 1, 3], &[4, 4], &[(0, 2)], vec![
        vec![0, 1],
        vec![1, 0],
    ])
}

/// Twelve jobs on four nodes with an acyclic precedence graph and asymmetric delays.
///
/// # Errors
/// Never in practice; the data is well-formed.
pub fn medium() -> Result<Instance, InstanceError> {
    Instance::from_columns(
        &[2, 1, 5, 4, 9, 3, 7, 1, 6, 10, 2, 8],
        &[1, 4, 2, 3, 5, 1, 2, 3, 4, 2, 5, 1],
        &[15, 15, 15, 15],
        &[
            (0, 3),
            (0, 7),
            (1, 4),
            (2, 5),
            (3, 8),
            (4, 8),
            (5, 9),
            (6, 10),
            (7, 11),
            (8, 11),
            (9, 11),
        ],
        vec![
            vec![0, 2, 1, 3],
            vec![1, 0, 3, 2],
            vec![2, 3, 0, 1],
            vec![3, 1, 2, 0],
        ],
    )
}
