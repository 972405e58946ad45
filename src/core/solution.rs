use super::{simulate, AssignmentError, Instance};
use rand::Rng;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Total mapping from every job to the node it runs on.
#[derive(Clone, Debug, Eq, Hash, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Assignment(Vec<usize>);

impl Assignment {
    /// Creates an assignment, checking that it covers the instance.
    ///
    /// # Errors
    /// - If the number of genes differs from the number of jobs.
    /// - If a gene references a node the instance does not have.
    pub fn new(genes: Vec<usize>, instance: &Instance) -> Result<Self, AssignmentError> {
        if genes.len() != instance.jobs().len() {
            return Err(AssignmentError::Length {
                expected: instance.jobs().len(),
                found: genes.len(),
            });
        }

        let nodes = instance.nodes().len();
        if let Some((job, &node)) = genes.iter().enumerate().find(|&(_, &node)| node >= nodes) {
            return Err(AssignmentError::UnknownNode { job, node });
        }

        Ok(Self(genes))
    }

    /// Creates an assignment drawing a uniform node for every job.
    #[must_use]
    pub fn random(instance: &Instance, rng: &mut impl Rng) -> Self {
        let nodes = instance.nodes().len();
        Self((0..instance.jobs().len()).map(|_| rng.gen_range(0..nodes)).collect())
    }

    pub(crate) const fn from_genes(genes: Vec<usize>) -> Self {
        Self(genes)
    }

    /// Returns the node the job is assigned to.
    #[must_use]
    pub fn node(&self, job: usize) -> usize {
        self.0[job]
    }

    #[must_use]
    pub fn genes(&self) -> &[usize] {
        &self.0
    }

    pub(crate) fn genes_mut(&mut self) -> &mut [usize] {
        &mut self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Placement of a single job in a schedule.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ScheduledJob {
    pub job: usize,
    pub node: usize,
    pub start: u64,
    pub duration: u64,
}

impl ScheduledJob {
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.duration
    }
}

impl Display for ScheduledJob {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Job {} -> Node {} | start = {} | duration = {} | end = {}",
            self.job,
            self.node,
            self.start,
            self.duration,
            self.end()
        )
    }
}

/// Node whose assigned jobs exceed its resource capacity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct CapacityViolation {
    pub node: usize,
    pub load: u64,
    pub capacity: u64,
}

/// Schedule of an instance, derived from an assignment by the simulator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Schedule<'a> {
    #[serde(skip)]
    instance: &'a Instance,
    assignment: Assignment,
    starts: Vec<u64>,
    makespan: u64,
    #[serde(skip)]
    job_waves: Vec<usize>,
    #[serde(skip)]
    forced_waves: usize,
}

impl<'a> Schedule<'a> {
    /// Simulates the assignment and returns the resulting schedule.
    ///
    /// # Panics
    /// - If the assignment was built for an instance with a different number of jobs.
    #[must_use]
    pub fn new(instance: &'a Instance, assignment: Assignment) -> Self {
        let timeline = simulate(instance, &assignment);
        Self {
            instance,
            assignment,
            starts: timeline.starts,
            makespan: timeline.makespan,
            job_waves: timeline.job_waves,
            forced_waves: timeline.forced_waves,
        }
    }

    /// Creates a schedule of an instance without jobs.
    #[must_use]
    pub fn empty(instance: &'a Instance) -> Self {
        Self::new(instance, Assignment(Vec::new()))
    }

    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[must_use]
    pub fn start(&self, job: usize) -> u64 {
        self.starts[job]
    }

    #[must_use]
    pub fn end(&self, job: usize) -> u64 {
        self.starts[job] + self.instance.jobs()[job].duration
    }

    /// Completion time of the last job.
    #[must_use]
    pub const fn makespan(&self) -> u64 {
        self.makespan
    }

    /// Number of waves in which precedence had to be ignored to break a cycle.
    #[must_use]
    pub const fn forced_waves(&self) -> usize {
        self.forced_waves
    }

    /// Returns the placement of every job in job order.
    pub fn jobs(&self) -> impl Iterator<Item = ScheduledJob> + '_ {
        self.starts.iter().enumerate().map(|(job, &start)| ScheduledJob {
            job,
            node: self.assignment.node(job),
            start,
            duration: self.instance.jobs()[job].duration,
        })
    }

    /// Returns the summed resource load of every node.
    #[must_use]
    pub fn node_loads(&self) -> Vec<u64> {
        let mut loads = vec![0_u64; self.instance.nodes().len()];
        for (job, &node) in self.assignment.genes().iter().enumerate() {
            loads[node] = loads[node].saturating_add(self.instance.jobs()[job].load);
        }
        loads
    }

    /// Returns the nodes whose load exceeds their capacity.
    #[must_use]
    pub fn capacity_violations(&self) -> Vec<CapacityViolation> {
        let nodes = self.instance.nodes().iter();
        nodes
            .zip(self.node_loads())
            .enumerate()
            .filter(|(_, (node, load))| *load > node.capacity)
            .map(|(id, (node, load))| CapacityViolation {
                node: id,
                load,
                capacity: node.capacity,
            })
            .collect()
    }

    /// Checks that the schedule is consistent with its instance: every job placed once,
    /// no overlap on a node, and every precedence whose predecessor was placed in an
    /// earlier wave respected including the communication delay.
    /// Edges inside a wave forced to break a cycle are not checked.
    #[must_use]
    pub fn verify(&self) -> bool {
        let instance = self.instance;
        if self.starts.len() != instance.jobs().len() || self.assignment.len() != self.starts.len()
        {
            return false;
        }

        let mut per_node = vec![Vec::new(); instance.nodes().len()];
        for job in self.jobs() {
            per_node[job.node].push((job.start, job.end()));
        }
        for intervals in &mut per_node {
            intervals.sort_unstable();
            if intervals.windows(2).any(|pair| pair[0].1 > pair[1].0) {
                return false;
            }
        }

        let waves = &self.job_waves;
        instance.graph().edges().into_iter().all(|edge| {
            let (pred, succ) = (edge.predecessor(), edge.successor());
            if waves[pred] >= waves[succ] {
                return true;
            }
            let delay = instance.delay(self.assignment.node(pred), self.assignment.node(succ));
            self.end(pred) + delay <= self.start(succ)
        })
    }
}

impl Display for Schedule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for job in self.jobs() {
            writeln!(f, "{job}")?;
        }
        for violation in self.capacity_violations() {
            writeln!(
                f,
                "Node {} over capacity: load {} > {}",
                violation.node, violation.load, violation.capacity
            )?;
        }
        write!(f, "Makespan = {}", self.makespan)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn assignment_must_be_total() -> anyhow::Result<()> {
        let instance = crate::data::small()?;

        assert_eq!(
            Assignment::new(vec![0, 1], &instance),
            Err(AssignmentError::Length {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            Assignment::new(vec![0, 2, 1], &instance),
            Err(AssignmentError::UnknownNode { job: 1, node: 2 })
        );
        assert_eq!(Assignment::new(vec![1, 0, 1], &instance)?.node(2), 1);
        Ok(())
    }

    #[test]
    fn random_assignment_is_total() -> anyhow::Result<()> {
        let instance = crate::data::medium()?;
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let assignment = Assignment::random(&instance, &mut rng);

        assert_eq!(assignment.len(), instance.jobs().len());
        assert!(Assignment::new(assignment.genes().to_vec(), &instance).is_ok());
        Ok(())
    }

    #[test]
    fn schedule_reports_jobs_and_makespan() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let schedule = Schedule::new(&instance, Assignment::new(vec![0, 1, 0], &instance)?);

        assert!(schedule.verify());
        assert_eq!(schedule.makespan(), 7);
        assert_eq!(schedule.start(2), 3);
        assert_eq!(schedule.end(2), 7);

        let jobs: Vec<_> = schedule.jobs().collect();
        assert_eq!(jobs[1], ScheduledJob {
            job: 1,
            node: 1,
            start: 0,
            duration: 2
        });
        assert_eq!(
            jobs[0].to_string(),
            "Job 0 -> Node 0 | start = 0 | duration = 3 | end = 3"
        );
        Ok(())
    }

    #[test]
    fn capacity_is_reported_not_enforced() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let schedule = Schedule::new(&instance, Assignment::new(vec![0, 0, 0], &instance)?);

        assert_eq!(schedule.makespan(), 9);
        assert_eq!(schedule.node_loads(), vec![6, 0]);
        assert_eq!(schedule.capacity_violations(), vec![CapacityViolation {
            node: 0,
            load: 6,
            capacity: 4
        }]);
        assert!(schedule.to_string().contains("Node 0 over capacity: load 6 > 4"));
        Ok(())
    }

    #[test]
    fn verify_rejects_overlap() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let mut schedule = Schedule::new(&instance, Assignment::new(vec![0, 0, 1], &instance)?);
        assert!(schedule.verify());

        schedule.starts[1] = 1;
        assert!(!schedule.verify());
        Ok(())
    }

    #[test]
    fn verify_rejects_missing_delay() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let mut schedule = Schedule::new(&instance, Assignment::new(vec![0, 0, 1], &instance)?);

        schedule.starts[2] = 3;
        assert!(!schedule.verify());
        Ok(())
    }

    #[test]
    fn verify_checks_edges_from_earlier_waves_after_a_forced_one() -> anyhow::Result<()> {
        let instance = crate::core::Instance::from_columns(
            &[1, 1, 1],
            &[1, 1, 1],
            &[3, 3],
            &[(0, 1), (1, 2), (2, 1)],
            vec![vec![0, 1], vec![1, 0]],
        )?;
        let mut schedule = Schedule::new(&instance, Assignment::new(vec![0, 1, 1], &instance)?);

        assert_eq!(schedule.starts, vec![0, 2, 3]);
        assert_eq!(schedule.forced_waves(), 1);
        assert!(schedule.verify());

        schedule.starts[1] = 0;
        assert!(!schedule.verify());
        Ok(())
    }

    #[test]
    fn verify_skips_edges_inside_a_forced_wave() -> anyhow::Result<()> {
        let instance = crate::core::Instance::from_columns(
            &[2, 3],
            &[1, 1],
            &[2, 2],
            &[(0, 1), (1, 0)],
            vec![vec![0, 1], vec![1, 0]],
        )?;
        let schedule = Schedule::new(&instance, Assignment::new(vec![0, 1], &instance)?);

        assert_eq!(schedule.start(0), 0);
        assert!(schedule.end(1) + 1 > schedule.start(0));
        assert!(schedule.verify());
        Ok(())
    }

    #[test]
    fn empty_schedule() -> anyhow::Result<()> {
        let instance = crate::core::Instance::new(vec![], vec![], vec![], vec![])?;
        let schedule = Schedule::empty(&instance);

        assert_eq!(schedule.makespan(), 0);
        assert!(schedule.verify());
        Ok(())
    }
}
