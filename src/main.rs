use clap::Parser;

use slpvec::common::config::SlpConfig;
use slpvec::driver;

/// Demo CLI for the superword-level parallelism vectorizer.
#[derive(Parser, Debug)]
#[command(name = "slpvec", about = "Superword-level parallelism vectorization pass demo")]
struct Args {
    /// Maximum fixpoint iterations per block.
    #[arg(long, default_value_t = SlpConfig::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = SlpConfig { max_iterations: args.max_iterations };
    driver::run_demo(driver::sample_module(), &config);
}
