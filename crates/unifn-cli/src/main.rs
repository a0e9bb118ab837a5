use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod call;
mod inspect;
mod signature;
mod utils;


use call::handle_call;
use inspect::handle_inspect;
use signature::SignatureArgs;

/// Get the version string including git revision
fn version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (git:", env!("GIT_HASH"), ")")
}

#[derive(Parser)]
#[command(
    author,
    version = version(),
    about = "Call native functions through unified callables",
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    /// Log unification and native calls to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a native symbol, unify it and call it
    Call {
        #[command(flatten)]
        signature: SignatureArgs,
        /// Argument values: integers, floats, 0x addresses, true/false, null
        #[arg(allow_hyphen_values = true, allow_negative_numbers = true, trailing_var_arg = true)]
        values: Vec<String>,
    },
    /// Show the unified form of a native symbol without calling it
    Inspect {
        #[command(flatten)]
        signature: SignatureArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Call { signature, values } => {
            handle_call(signature, values);
        }
        Commands::Inspect { signature, json } => {
            handle_inspect(signature, *json);
        }
    }
}
