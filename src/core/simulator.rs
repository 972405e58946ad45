//! Wave-based list scheduling of a fixed assignment.
//!
//! Every wave places all pending jobs whose predecessors are already placed,
//! in ascending job id. When no job is ready but some are pending the
//! precedence graph has a cycle among them; the whole pending set is then
//! placed in one wave, ignoring predecessors that are not placed yet.

use super::{Assignment, Instance, ScheduleBuilder};
use std::collections::BTreeSet;

/// Start times produced by a single simulation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Timeline {
    pub starts: Vec<u64>,
    /// Index of the wave in which each job was placed.
    pub job_waves: Vec<usize>,
    pub makespan: u64,
    pub waves: usize,
    pub forced_waves: usize,
}

/// Simulates the assignment on the instance.
/// Pure and deterministic: the same inputs always give the same timeline.
///
/// # Panics
/// - If the assignment was built for an instance with a different number of jobs,
///   or references nodes the instance does not have.
#[must_use]
pub fn simulate(instance: &Instance, assignment: &Assignment) -> Timeline {
    assert_eq!(
        assignment.len(),
        instance.jobs().len(),
        "Assignment does not cover the instance"
    );

    let graph = instance.graph();
    let mut builder = ScheduleBuilder::new(instance, assignment);
    let mut pending: BTreeSet<usize> = (0..instance.jobs().len()).collect();
    let mut job_waves = vec![0; instance.jobs().len()];
    let mut waves = 0;
    let mut forced_waves = 0;

    while !pending.is_empty() {
        let mut ready: Vec<usize> = pending
            .iter()
            .copied()
            .filter(|&job| graph.predecessors(job).iter().all(|p| !pending.contains(p)))
            .collect();

        if ready.is_empty() {
            log::trace!("No ready job among {} pending, forcing a wave", pending.len());
            ready = pending.iter().copied().collect();
            forced_waves += 1;
        }

        for &job in &ready {
            builder.place(job);
            job_waves[job] = waves;
        }

        for job in &ready {
            pending.remove(job);
        }

        waves += 1;
    }

    let makespan = builder.makespan();
    Timeline {
        starts: builder.into_starts(),
        job_waves,
        makespan,
        waves,
        forced_waves,
    }
}

/// Returns only the makespan of the simulated assignment.
#[must_use]
pub fn makespan(instance: &Instance, assignment: &Assignment) -> u64 {
    simulate(instance, assignment).makespan
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Job, Node, Precedence};

    fn simulate_genes(instance: &Instance, genes: Vec<usize>) -> anyhow::Result<Timeline> {
        Ok(simulate(instance, &Assignment::new(genes, instance)?))
    }

    #[test]
    fn same_node_successor_waits_for_predecessor() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let timeline = simulate_genes(&instance, vec![0, 1, 0])?;

        assert_eq!(timeline.starts, vec![0, 0, 3]);
        assert_eq!(timeline.makespan, 7);
        assert_eq!(timeline.waves, 2);
        assert_eq!(timeline.forced_waves, 0);
        Ok(())
    }

    #[test]
    fn remote_successor_pays_communication_delay() -> anyhow::Result<()> {
        let instance = crate::data::small()?;
        let timeline = simulate_genes(&instance, vec![0, 0, 1])?;

        assert_eq!(timeline.starts, vec![0, 3, 4]);
        assert_eq!(timeline.makespan, 8);
        Ok(())
    }

    #[test]
    fn delay_is_directional() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[2, 2], &[1, 1], &[1, 1], &[(0, 1)], vec![
            vec![0, 5],
            vec![1, 0],
        ])?;

        assert_eq!(simulate_genes(&instance, vec![0, 1])?.starts, vec![0, 7]);
        assert_eq!(simulate_genes(&instance, vec![1, 0])?.starts, vec![0, 3]);
        Ok(())
    }

    #[test]
    fn cycle_is_broken_and_every_job_scheduled_once() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[2, 3], &[1, 1], &[1, 1], &[(0, 1), (1, 0)], vec![
            vec![0, 1],
            vec![1, 0],
        ])?;

        let timeline = simulate_genes(&instance, vec![0, 1])?;
        assert_eq!(timeline.starts, vec![0, 3]);
        assert_eq!(timeline.makespan, 6);
        assert_eq!(timeline.waves, 1);
        assert_eq!(timeline.forced_waves, 1);

        let timeline = simulate_genes(&instance, vec![0, 0])?;
        assert_eq!(timeline.starts, vec![0, 2]);
        assert_eq!(timeline.makespan, 5);
        Ok(())
    }

    #[test]
    fn cycle_behind_a_chain_is_forced_after_it() -> anyhow::Result<()> {
        let jobs = vec![Job { duration: 1, load: 1 }; 3];
        let nodes = vec![Node { capacity: 3 }];
        let edges = vec![Precedence::new(0, 1), Precedence::new(1, 2), Precedence::new(2, 1)];
        let instance = Instance::new(jobs, nodes, edges, vec![vec![0]])?;

        let timeline = simulate_genes(&instance, vec![0, 0, 0])?;
        assert_eq!(timeline.starts, vec![0, 1, 2]);
        assert_eq!(timeline.job_waves, vec![0, 1, 1]);
        assert_eq!(timeline.waves, 2);
        assert_eq!(timeline.forced_waves, 1);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "Assignment does not cover the instance")]
    fn assignment_of_another_instance_panics() {
        let Ok(instance) = crate::data::small() else {
            unreachable!("Reference instance is well-formed")
        };
        let _ = simulate(&instance, &Assignment::from_genes(vec![0, 1]));
    }

    #[test]
    fn no_jobs_give_zero_makespan() -> anyhow::Result<()> {
        let instance = Instance::new(vec![], vec![Node { capacity: 1 }], vec![], vec![vec![0]])?;
        let timeline = simulate_genes(&instance, vec![])?;

        assert_eq!(timeline.makespan, 0);
        assert!(timeline.starts.is_empty());
        assert_eq!(timeline.waves, 0);
        Ok(())
    }

    #[test]
    fn completion_is_start_plus_duration() -> anyhow::Result<()> {
        use rand::SeedableRng;

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let instance = crate::data::medium()?;
        for _ in 0..20 {
            let assignment = Assignment::random(&instance, &mut rng);
            let timeline = simulate(&instance, &assignment);
            let ends = timeline.starts.iter().zip(instance.jobs());
            let latest = ends.map(|(start, job)| start + job.duration).max();
            assert_eq!(latest.unwrap_or_default(), timeline.makespan);
            assert_eq!(timeline, simulate(&instance, &assignment));
        }
        Ok(())
    }
}
