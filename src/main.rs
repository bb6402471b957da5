use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use log::*;
use structopt::*;

use roundrobin_sat::dimacs::write_dimacs;
use roundrobin_sat::{solve_model, BuildOptions, Cadical, Error, Instance, Pool, RoundRobinModel};

/// About 31 years, well inside what `Duration` can hold.
const MAX_TIMEOUT_SECS: f32 = 1e9;

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs = s.parse::<f32>().map_err(|e| format!("{}: {}", s, e))?;
    if !(0.0..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(format!("timeout must be between 0 and {} seconds, got {}", MAX_TIMEOUT_SECS, s));
    }
    Ok(Duration::from_secs_f32(secs))
}

#[derive(StructOpt, Debug)]
struct Opt {
    /// Team counts to schedule, each solved in turn.
    #[structopt(required = true, name = "TEAMS")]
    teams: Vec<usize>,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(long)]
    quiet: bool,

    /// Time budget per instance, in seconds.
    #[structopt(long, default_value = "300", parse(try_from_str = parse_timeout))]
    timeout: Duration,

    /// Maximum appearances of a team in one period.
    #[structopt(long, default_value = "2")]
    period_cap: usize,

    #[structopt(long)]
    no_symmetry_breaking: bool,

    /// Build the model and report its size without solving.
    #[structopt(short, long)]
    encode_only: bool,

    /// Write `<dir>/<n>.cnf` for every instance.
    #[structopt(long, parse(from_os_str))]
    to_cnf: Option<PathBuf>,
}

fn run(options: &Opt) -> Result<(), Error> {
    let build = BuildOptions { symmetry_breaking: !options.no_symmetry_breaking, period_cap: options.period_cap };

    for &n in options.teams.iter() {
        let model = {
            let mut pool = Pool::new();
            let model = RoundRobinModel::build(&mut pool, Instance::new(n)?, &build)?;
            if let Some(dir) = options.to_cnf.as_ref() {
                let filename = dir.join(format!("{}.cnf", n));
                let mut file = std::io::BufWriter::new(std::fs::File::create(&filename)?);
                write_dimacs(&mut file, &pool, model.constraint())?;
                info!("Wrote cnf file {}", filename.display());
            }
            model
        };
        if options.encode_only {
            continue;
        }

        let envelope = solve_model(&mut Cadical::new(), model, options.timeout)?;
        if envelope.is_feasible() {
            info!("Schedule for n={}:\n{}", n, envelope.sol);
        }

        let mut by_backend = BTreeMap::new();
        by_backend.insert("cadical", &envelope);
        println!("{}", serde_json::to_string_pretty(&by_backend)?);
    }
    Ok(())
}

fn main() {
    let options = Opt::from_args();

    stderrlog::StdErrLog::new()
        .verbosity(options.verbose as usize)
        .quiet(options.quiet)
        .module(module_path!())
        .module("roundrobin_sat")
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init()
        .unwrap_or_else(|e| eprintln!("logger already initialized: {}", e));

    info!("Arguments {:#?}", options);

    if let Err(e) = run(&options) {
        error!("{}", e);
        std::process::exit(1);
    }
}
