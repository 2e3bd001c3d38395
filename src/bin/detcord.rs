use clap::{ArgAction, Parser, ValueEnum};
use detcord::config;
use detcord::core::{Detfile, Registry};
use detcord::Order;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "detcord",
    about = "Run detfile actions on remote hosts",
    version
)]
struct Cli {
    /// Path to the detfile (default: detfile.yaml in the current directory)
    #[arg(long, short, env = "DETCORD_FILE")]
    file: Option<PathBuf>,

    /// Whether to finish each host or each action before moving on to the next
    #[arg(long, value_enum, default_value_t = OrderArg::Hosts)]
    order: OrderArg,

    /// Log more (-v for info, -vv for debug)
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,

    /// Actions to run, in order. With none, lists the available actions.
    actions: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Hosts,
    Actions,
}

impl From<OrderArg> for Order {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Hosts => Order::Hosts,
            OrderArg::Actions => Order::Actions,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(io::stderr)
        .init();

    let path = config::locate(cli.file.as_deref())?;
    debug!(path = %path.display(), "loading detfile");
    let detfile = Detfile::load(&path)?;
    let registry = Registry::discover(&detfile)?;

    if cli.actions.is_empty() {
        registry.write_usage(io::stdout().lock(), "detcord")?;
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(detcord::run(
        cli.actions.as_slice(),
        detfile.environment(),
        &registry,
        cli.order.into(),
    ))
}
