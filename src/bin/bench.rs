use clap::Parser;
use makespan_scheduling::core::Scheduler;
use makespan_scheduling::data::run;
use makespan_scheduling::init_logger;

#[derive(Debug, Parser)]
struct Config {
    /// The input directory
    input_dir: String,
    /// Exclude scheduling algorithms
    exclude: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    init_logger();
    let config = Config::parse();
    for mut scheduler in schedulers(&config.exclude) {
        let report = run(&config.input_dir, scheduler.as_mut())?;
        print!("{report}");
    }
    Ok(())
}

fn schedulers(exclude: &[String]) -> impl Iterator<Item = Box<dyn Scheduler>> + '_ {
    makespan_scheduling::algo::SCHEDULERS
        .iter()
        .map(|init| init())
        .filter(|scheduler| !exclude.iter().any(|name| name == scheduler.name()))
}
