use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::num::NonZero;
use std::path::{Path, PathBuf};
use u_jobshop::cp::JobShopSolver;
use u_jobshop::engine::SolverConfig;
use u_jobshop::models::Instance;
use u_jobshop::report::ScheduleKpi;
use u_jobshop::samples::{minimal_jobshop, random_instance};
use u_jobshop::validation::verify_schedule;

/// Job-shop scheduling with constraint programming.
#[derive(Debug, Parser)]
enum Application {
    /// Solve an instance and print its timetable.
    Solve {
        /// Instance file (`{"jobs": [[[machine, duration], ...], ...]}`).
        /// Defaults to the built-in three-job example.
        input: Option<PathBuf>,
        /// Solver configuration file (JSON).
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Wall-clock limit in milliseconds.
        #[clap(short, long)]
        time_limit_ms: Option<u64>,
        /// Search node limit.
        #[clap(short, long)]
        node_limit: Option<u64>,
        /// Stop at the first feasible schedule.
        #[clap(short, long)]
        stop_after_first: bool,
        /// Print the report as JSON instead of a summary.
        #[clap(long)]
        json: bool,
        /// Log schedule KPIs.
        #[clap(long)]
        kpi: bool,
    },
    /// Generate a random instance where every job visits every machine once.
    Gen {
        /// The number of jobs.
        #[clap(long)]
        jobs: NonZero<usize>,
        /// The number of machines.
        #[clap(long)]
        machines: NonZero<usize>,
        /// The maximum processing time of an operation.
        #[clap(long, default_value = "10")]
        max_duration: NonZero<u32>,
        /// Seed for reproducible output.
        #[clap(long)]
        seed: Option<u64>,
        /// Output file. Prints to stdout when omitted.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("cannot parse {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Application::parse() {
        Application::Solve {
            input,
            config,
            time_limit_ms,
            node_limit,
            stop_after_first,
            json,
            kpi,
        } => {
            let instance: Instance = match &input {
                Some(path) => read_json(path)?,
                None => minimal_jobshop(),
            };

            let mut config: SolverConfig = match &config {
                Some(path) => read_json(path)?,
                None => SolverConfig::default(),
            };
            if let Some(ms) = time_limit_ms {
                config = config.with_time_limit_ms(ms);
            }
            if let Some(nodes) = node_limit {
                config = config.with_node_limit(nodes);
            }
            if stop_after_first {
                config = config.with_stop_after_first(true);
            }
            config.validate().map_err(anyhow::Error::msg)?;

            let report = JobShopSolver::new().with_config(config).run(&instance);

            if let Some(schedule) = &report.schedule {
                if let Err(violations) = verify_schedule(&instance, schedule) {
                    for v in &violations {
                        log::error!("{}: {}", v.entity_id, v.message);
                    }
                    anyhow::bail!("solver returned an invalid schedule");
                }
                if kpi {
                    let kpi = ScheduleKpi::calculate(schedule, &instance);
                    log::info!(
                        "lower bound {}, gap {:.1}%, avg utilization {:.1}%",
                        kpi.lower_bound,
                        kpi.gap * 100.0,
                        kpi.avg_utilization * 100.0
                    );
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary());
            }
            Ok(())
        }
        Application::Gen {
            jobs,
            machines,
            max_duration,
            seed,
            output,
        } => {
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_os_rng(),
            };
            let instance = random_instance(
                jobs.get(),
                machines.get(),
                i64::from(max_duration.get()),
                &mut rng,
            )?;
            let text = serde_json::to_string(&instance)?;

            match output {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => println!("{text}"),
            }
            Ok(())
        }
    }
}
