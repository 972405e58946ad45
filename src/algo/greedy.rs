use crate::core::{Assignment, Instance, NodeSlot, Schedule, Scheduler};

/// Assigns jobs in ascending id to the node with the least accumulated work.
/// Ties go to the lower node id.
#[must_use]
pub fn assign(instance: &Instance) -> Assignment {
    let mut nodes = NodeSlot::all(instance);
    let mut genes = Vec::with_capacity(instance.jobs().len());

    for job in instance.jobs() {
        let Some(mut node) = nodes.pop_first() else {
            unreachable!("Instances with jobs always have nodes");
        };

        genes.push(node.id);
        node.free += job.duration;

        nodes.insert(node);
    }

    Assignment::from_genes(genes)
}

/// Least-loaded list assignment, used as a baseline.
#[derive(Clone, Debug, Default)]
pub struct Greedy;

impl Scheduler for Greedy {
    fn schedule<'a>(&mut self, instance: &'a Instance) -> Schedule<'a> {
        Schedule::new(instance, assign(instance))
    }

    fn name(&self) -> &'static str {
        "Greedy"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(Greedy);
