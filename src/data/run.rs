use crate::core::{Instance, Scheduler};
use crate::data::deserialize;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Report of running a directory of instances.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(scheduler: String) -> Self {
        let entries = Vec::new();
        Self { scheduler, entries }
    }

    /// Get the scheduler name.
    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single instance.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub makespan: u64,
    pub over_capacity: usize,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {} in {:.2} sec", self.name, self.makespan, self.time)?;
        if self.over_capacity > 0 {
            write!(f, " ({} nodes over capacity)", self.over_capacity)?;
        }
        Ok(())
    }
}

/// Run all instances in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
///
/// # Panics
/// - If the schedule is invalid.
pub fn samples(solver: &mut dyn Scheduler) -> anyhow::Result<()> {
    run("samples", solver).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Run all `*.json` instances in the `dir` directory, in file name order.
///
/// # Errors
/// - If a file cannot be read or is not a valid instance.
///
/// # Panics
/// - If the schedule is invalid.
pub fn run(dir: impl AsRef<Path>, solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = Vec::new();
    for file in std::fs::read_dir(dir)? {
        let path = file?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow!("Cannot read filename {}", path.display()))?
            .to_owned();

        let instance: Instance = deserialize(&mut BufReader::new(File::open(&path)?))?;
        log::debug!("Running {} on {name}", solver.name());

        let time = std::time::Instant::now();
        let schedule = solver.schedule(&instance);
        let time = time.elapsed().as_secs_f64();

        assert!(schedule.verify(), "Invalid schedule created for {name}");

        let makespan = schedule.makespan();
        let over_capacity = schedule.capacity_violations().len();
        report.entries.push(ReportEntry {
            name,
            makespan,
            over_capacity,
            time,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::Greedy;

    #[test]
    fn runs_every_sample_in_order() -> anyhow::Result<()> {
        let report = run("samples", &mut Greedy)?;
        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();

        assert_eq!(report.scheduler_name(), "Greedy");
        assert_eq!(names, vec!["cycle", "medium", "small"]);
        assert_eq!(report.entries()[2].makespan, 8);
        assert!(report.to_string().starts_with("Scheduler: Greedy\n"));
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(run("no-such-directory", &mut Greedy).is_err());
    }

    #[test]
    fn entry_mentions_capacity_only_when_exceeded() {
        let mut entry = ReportEntry {
            name: "small".into(),
            makespan: 7,
            over_capacity: 0,
            time: 0.5,
        };
        assert_eq!(entry.to_string(), "small: 7 in 0.50 sec");

        entry.over_capacity = 1;
        assert_eq!(entry.to_string(), "small: 7 in 0.50 sec (1 nodes over capacity)");
    }
}
