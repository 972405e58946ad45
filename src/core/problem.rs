use super::InstanceError;
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A job. Contains the processing time and resource load of the job.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Job {
    pub duration: u64,
    pub load: u64,
}

/// A compute node with its resource capacity.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Node {
    pub capacity: u64,
}

/// A precedence edge: the first job must complete before the second starts.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialOrd, Serialize, PartialEq)]
pub struct Precedence(usize, usize);

impl Precedence {
    /// Creates a new edge from `predecessor` to `successor`.
    #[must_use]
    pub const fn new(predecessor: usize, successor: usize) -> Self {
        Self(predecessor, successor)
    }

    #[must_use]
    pub const fn predecessor(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn successor(self) -> usize {
        self.1
    }
}

/// A precedence graph. Stores the set of predecessors of every job.
/// Cycles are allowed; the simulator breaks them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrecedenceGraph {
    predecessors: Vec<HashSet<usize>>,
}

impl PrecedenceGraph {
    /// Returns the predecessors of the given job.
    #[must_use]
    pub fn predecessors(&self, job: usize) -> &HashSet<usize> {
        static EMPTY: LazyLock<HashSet<usize>> = LazyLock::new(HashSet::new);

        self.predecessors.get(job).unwrap_or(&EMPTY)
    }

    /// Returns whether `predecessor` must complete before `successor`.
    #[must_use]
    pub fn precedes(&self, predecessor: usize, successor: usize) -> bool {
        self.predecessors(successor).contains(&predecessor)
    }

    /// Returns all edges sorted by predecessor, then successor.
    #[must_use]
    pub fn edges(&self) -> Vec<Precedence> {
        let mut result: Vec<_> = self
            .predecessors
            .iter()
            .enumerate()
            .flat_map(|(successor, preds)| preds.iter().map(move |&p| Precedence(p, successor)))
            .collect();
        result.sort_unstable();
        result
    }

    /// Returns whether the graph restricted to the first `jobs` jobs has no cycle.
    #[must_use]
    pub fn is_acyclic(&self, jobs: usize) -> bool {
        let mut indegree = vec![0_usize; jobs];
        let mut successors = vec![Vec::new(); jobs];
        for edge in self.edges() {
            if edge.0 < jobs && edge.1 < jobs {
                successors[edge.0].push(edge.1);
                indegree[edge.1] += 1;
            }
        }

        let mut stack: Vec<_> = (0..jobs).filter(|&job| indegree[job] == 0).collect();
        let mut visited = 0;
        while let Some(job) = stack.pop() {
            visited += 1;
            for &next in &successors[job] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    stack.push(next);
                }
            }
        }

        visited == jobs
    }
}

impl From<Vec<Precedence>> for PrecedenceGraph {
    fn from(edges: Vec<Precedence>) -> Self {
        let mut predecessors = Vec::new();

        for edge in edges {
            while predecessors.len() <= edge.0.max(edge.1) {
                predecessors.push(HashSet::new());
            }

            predecessors[edge.1].insert(edge.0);
        }

        Self { predecessors }
    }
}

/// Communication delay between every ordered pair of nodes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct CommDelay {
    matrix: Vec<Vec<u64>>,
}

impl CommDelay {
    /// Returns the delay paid when a job on `from` feeds a job on `to`.
    fn delay(&self, from: usize, to: usize) -> u64 {
        self.matrix[from][to]
    }

    fn max(&self) -> u64 {
        self.matrix.iter().flatten().copied().max().unwrap_or_default()
    }

    fn validate(matrix: &[Vec<u64>], nodes: usize) -> Result<(), InstanceError> {
        if matrix.len() != nodes {
            return Err(InstanceError::DelayRows {
                expected: nodes,
                found: matrix.len(),
            });
        }

        for (row, delays) in matrix.iter().enumerate() {
            if delays.len() != nodes {
                return Err(InstanceError::DelayColumns {
                    row,
                    expected: nodes,
                    found: delays.len(),
                });
            }
            if delays[row] != 0 {
                return Err(InstanceError::NonZeroDiagonal {
                    node: row,
                    delay: delays[row],
                });
            }
        }

        Ok(())
    }
}

/// An instance of the scheduling problem.
/// Always well-formed: every constructor validates its input.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct Instance {
    jobs: Vec<Job>,
    nodes: Vec<Node>,
    graph: PrecedenceGraph,
    delays: CommDelay,
}

impl Instance {
    /// Creates a new instance of the scheduling problem.
    ///
    /// # Errors
    /// - If a job has zero duration or load.
    /// - If a precedence is a self-loop or references an unknown job.
    /// - If the delay matrix is not square over the nodes or has a non-zero diagonal.
    /// - If there are jobs but no nodes.
    /// - If the summed durations plus one maximal delay per job overflow `u64`.
    pub fn new(
        jobs: Vec<Job>,
        nodes: Vec<Node>,
        precedences: Vec<Precedence>,
        delays: Vec<Vec<u64>>,
    ) -> Result<Self, InstanceError> {
        if nodes.is_empty() && !jobs.is_empty() {
            return Err(InstanceError::NoNodes { jobs: jobs.len() });
        }

        for (id, job) in jobs.iter().enumerate() {
            if job.duration == 0 {
                return Err(InstanceError::ZeroDuration { job: id });
            }
            if job.load == 0 {
                return Err(InstanceError::ZeroLoad { job: id });
            }
        }

        for edge in &precedences {
            if edge.0 == edge.1 {
                return Err(InstanceError::SelfLoop { job: edge.0 });
            }
            if let Some(&job) = [edge.0, edge.1].iter().find(|&&job| job >= jobs.len()) {
                return Err(InstanceError::UnknownJob { job });
            }
        }

        CommDelay::validate(&delays, nodes.len())?;
        let delays = CommDelay { matrix: delays };
        Self::check_horizon(&jobs, &delays)?;

        Ok(Self {
            jobs,
            nodes,
            graph: PrecedenceGraph::from(precedences),
            delays,
        })
    }

    /// Every completion is bounded by the sum of all durations plus one maximal delay per job,
    /// so placement arithmetic cannot overflow once this bound fits in `u64`.
    fn check_horizon(jobs: &[Job], delays: &CommDelay) -> Result<(), InstanceError> {
        let error = InstanceError::Horizon { jobs: jobs.len() };

        let work = jobs
            .iter()
            .try_fold(0_u64, |sum, job| sum.checked_add(job.duration));
        let waiting = u64::try_from(jobs.len())
            .ok()
            .and_then(|count| count.checked_mul(delays.max()));

        match (work, waiting) {
            (Some(work), Some(waiting)) if work.checked_add(waiting).is_some() => Ok(()),
            _ => Err(error),
        }
    }

    /// Creates an instance from per-job and per-node columns.
    ///
    /// # Errors
    /// - If `durations` and `loads` differ in length.
    /// - Any error of [`Instance::new`].
    pub fn from_columns(
        durations: &[u64],
        loads: &[u64],
        capacities: &[u64],
        precedences: &[(usize, usize)],
        delays: Vec<Vec<u64>>,
    ) -> Result<Self, InstanceError> {
        if durations.len() != loads.len() {
            return Err(InstanceError::LengthMismatch {
                field: "loads",
                expected: durations.len(),
                found: loads.len(),
            });
        }

        let jobs = durations.iter().zip(loads);
        let jobs = jobs.map(|(&duration, &load)| Job { duration, load }).collect();
        let nodes = capacities.iter().map(|&capacity| Node { capacity }).collect();
        let precedences = precedences.iter().map(|&(p, s)| Precedence(p, s)).collect();

        Self::new(jobs, nodes, precedences, delays)
    }

    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub const fn graph(&self) -> &PrecedenceGraph {
        &self.graph
    }

    /// Returns the communication delay from node `from` to node `to`.
    #[must_use]
    pub fn delay(&self, from: usize, to: usize) -> u64 {
        self.delays.delay(from, to)
    }

    /// Returns whether the precedence edges form no cycle.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.graph.is_acyclic(self.jobs.len())
    }
}

/// Serialized form of an instance.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct InstanceData {
    jobs: Vec<Job>,
    nodes: Vec<Node>,
    #[serde(default)]
    precedences: Vec<Precedence>,
    delays: Vec<Vec<u64>>,
}

impl TryFrom<InstanceData> for Instance {
    type Error = InstanceError;

    fn try_from(data: InstanceData) -> Result<Self, Self::Error> {
        Self::new(data.jobs, data.nodes, data.precedences, data.delays)
    }
}

impl From<Instance> for InstanceData {
    fn from(instance: Instance) -> Self {
        Self {
            precedences: instance.graph.edges(),
            jobs: instance.jobs,
            nodes: instance.nodes,
            delays: instance.delays.matrix,
        }
    }
}
