use super::{Assignment, Instance};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A node together with the time at which it becomes free.
/// It's ordered by free time, then by id.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeSlot {
    pub id: usize,
    pub free: u64,
}

impl NodeSlot {
    /// Creates a new slot with free time 0.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self { id, free: 0 }
    }

    /// Creates an ordered set of slots for every node of the instance.
    #[must_use]
    pub fn all(instance: &Instance) -> BTreeSet<Self> {
        (0..instance.nodes().len()).map(Self::new).collect()
    }
}

impl PartialOrd<Self> for NodeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.free.cmp(&other.free) {
            Ordering::Equal => self.id.cmp(&other.id),
            order => order,
        }
    }
}

/// A builder for placing jobs on their assigned nodes one at a time.
/// Keeps the job order of every node and the completion of its last job.
#[derive(Clone, Debug)]
pub struct ScheduleBuilder<'a> {
    instance: &'a Instance,
    assignment: &'a Assignment,
    starts: Vec<Option<u64>>,
    nodes: Vec<Vec<usize>>,
    free: Vec<u64>,
}

impl<'a> ScheduleBuilder<'a> {
    /// Creates a new builder with nothing placed.
    /// The assignment must cover every job of the instance.
    #[must_use]
    pub fn new(instance: &'a Instance, assignment: &'a Assignment) -> Self {
        Self {
            instance,
            assignment,
            starts: vec![None; instance.jobs().len()],
            nodes: vec![Vec::new(); instance.nodes().len()],
            free: vec![0; instance.nodes().len()],
        }
    }

    /// Places a job after the last job of its node and after every already placed
    /// predecessor plus the communication delay. Returns the start time.
    /// Predecessors that are not placed yet are ignored.
    pub fn place(&mut self, job: usize) -> u64 {
        let node = self.assignment.node(job);

        let precedence_floor = self
            .instance
            .graph()
            .predecessors(job)
            .iter()
            .filter_map(|&pred| {
                let end = self.end(pred)?;
                Some(end + self.instance.delay(self.assignment.node(pred), node))
            })
            .max()
            .unwrap_or_default();

        let start = self.free[node].max(precedence_floor);
        self.starts[job] = Some(start);
        self.nodes[node].push(job);
        self.free[node] = start + self.instance.jobs()[job].duration;

        start
    }

    /// Returns the completion time of a job if it was placed.
    #[must_use]
    pub fn end(&self, job: usize) -> Option<u64> {
        self.starts[job].map(|start| start + self.instance.jobs()[job].duration)
    }

    /// Returns the jobs placed on a node in placement order.
    #[must_use]
    pub fn node_jobs(&self, node: usize) -> &[usize] {
        &self.nodes[node]
    }

    /// Returns the completion of the last job placed on a node.
    #[must_use]
    pub fn free(&self, node: usize) -> u64 {
        self.free[node]
    }

    /// Returns the latest completion over all nodes.
    #[must_use]
    pub fn makespan(&self) -> u64 {
        self.free.iter().copied().max().unwrap_or_default()
    }

    /// Consumes the builder and returns the start of every job, 0 for unplaced jobs.
    #[must_use]
    pub fn into_starts(self) -> Vec<u64> {
        self.starts.into_iter().map(Option::unwrap_or_default).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slots_are_ordered_by_free_time_then_id() {
        let mut slots: BTreeSet<_> = (0..3).map(NodeSlot::new).collect();

        let Some(mut first) = slots.pop_first() else {
            unreachable!("three slots were inserted")
        };
        assert_eq!(first.id, 0);
        first.free = 5;
        slots.insert(first);

        let order: Vec<_> = slots.iter().map(|slot| slot.id).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn builder_respects_node_and_precedence_floors() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let assignment = Assignment::new(vec![0, 0, 1], &instance)?;
        let mut builder = ScheduleBuilder::new(&instance, &assignment);

        assert_eq!(builder.end(0), None);
        assert_eq!(builder.place(2), 0);
        assert_eq!(builder.place(0), 0);
        assert_eq!(builder.place(1), 3);
        assert_eq!(builder.node_jobs(0), &[0, 1]);
        assert_eq!(builder.free(0), 5);
        assert_eq!(builder.free(1), 4);
        assert_eq!(builder.makespan(), 5);
        assert_eq!(builder.into_starts(), vec![0, 3, 0]);
        Ok(())
    }
}
