use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::exit,
    time::Instant,
};

use clap::{Parser, Subcommand};
use pulse_propagation::{
    analysis::{count_over_n_iterations, find_common_period, find_state_cycle},
    logging::init_tracing,
    parse_network, Error, Network, SolveConfig,
};

#[derive(Parser)]
#[command(about = "Pulse propagation through flip-flop and conjunction modules")]
struct Cli {
    /// Log filter, e.g. `debug` or `pulse_propagation=trace` (defaults to RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count pulses over many presses, then find the first press that fires the sink
    Solve {
        #[arg(short, long)]
        /// Print out how long each part took
        timings: bool,

        /// Presses to count pulses over
        #[arg(long, default_value_t = 1000)]
        presses: usize,

        /// Give up looking for a branch period after this many presses
        #[arg(long, default_value_t = 1_000_000)]
        max_presses: usize,

        /// Name of the final module, instead of detecting it
        #[arg(long)]
        sink: Option<String>,

        /// Module list to read, stdin when omitted or `-`
        file: Option<PathBuf>,
    },
    /// Print every pulse sent during the first presses
    Trace {
        #[arg(long, default_value_t = 1)]
        presses: usize,

        file: Option<PathBuf>,
    },
    /// Find after how many presses the whole network repeats a state
    Cycle {
        #[arg(long, default_value_t = 1_000_000)]
        max_presses: usize,

        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(msg) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("{msg}");
        exit(1);
    }

    match cli.command {
        Commands::Solve {
            timings,
            presses,
            max_presses,
            sink,
            file,
        } => {
            let mut config = SolveConfig::new()
                .with_presses(presses)
                .with_max_presses(max_presses);
            if let Some(sink) = sink {
                config = config.with_sink(sink);
            }

            let network = load(file.as_deref());

            let first = time(timings, || {
                count_over_n_iterations(&mut network.clone(), config.presses)
            });
            println!("First part: {first}");

            match time(timings, || find_common_period(&network, &config)) {
                Ok(bonus) => println!("Bonus: {bonus}"),
                Err(err) => fail(err),
            }
        }
        Commands::Trace { presses, file } => {
            let mut network = load(file.as_deref());

            for i in 1..=presses {
                println!("press {i}");
                let snapshot = network.push_button_traced(|pulse| println!("  {pulse}"));
                println!(
                    "  high: {}, low: {}",
                    snapshot.tally.total_high(),
                    snapshot.tally.total_low()
                );
            }
        }
        Commands::Cycle { max_presses, file } => {
            let mut network = load(file.as_deref());

            match find_state_cycle(&mut network, max_presses) {
                Ok(cycle) => println!(
                    "State after press {} repeats after press {} (cycle length {})",
                    cycle.first_seen,
                    cycle.repeat_at,
                    cycle.length()
                ),
                Err(err) => fail(err.into()),
            }
        }
    }
}

fn load(file: Option<&Path>) -> Network {
    let contents = match read_input(file) {
        Ok(contents) => contents,
        Err(err) => fail(err),
    };

    match parse_network(&contents) {
        Ok(network) => network,
        Err(err) => fail(err.into()),
    }
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            if file.is_none() && atty::is(atty::Stream::Stdin) {
                eprintln!("Pass filename to run");
                exit(1);
            }

            let mut str = String::new();
            io::stdin().read_to_string(&mut str)?;
            Ok(str)
        }
    }
}

fn fail(err: Error) -> ! {
    eprintln!("{err}");
    exit(match err {
        Error::Io(_) => 1,
        Error::Parse(_) => 2,
        Error::Decompose(_) | Error::Period(_) => 3,
    });
}

fn time<F, T>(timings: bool, f: F) -> T
where
    F: FnOnce() -> T,
{
    let t0 = Instant::now();
    let res = f();
    if timings {
        eprintln!("  took {:?}", t0.elapsed());
    }
    res
}
