//! HydroNet CLI - stream network accumulation from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hydronet_algorithms::network::{
    arbolate_sum, drainage_area, partition_by_basin, path_length, sort_table, stream_order,
    terminals, FlowNetwork, PathOrigin,
};
use hydronet_core::io::{read_node_table, write_node_table, write_terminal_table, LoadedTable};
use hydronet_core::network::{
    CyclePolicy, DivergencePolicy, MissingWeightPolicy, NetworkId, NetworkOptions, NodeTable,
    NodeValues,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hydronet")]
#[command(author, version, about = "Stream network accumulation and path length", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with network options (policies and known outlets)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Missing weight policy: warn, ignore, fail
    #[arg(long, global = true)]
    on_missing_weight: Option<String>,

    /// Cycle policy: warn, fail
    #[arg(long, global = true)]
    on_cycle: Option<String>,

    /// Duplicate identifier policy: warn, fail
    #[arg(long, global = true)]
    on_divergence: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a node table
    Info {
        /// Input JSON node table
        input: PathBuf,
    },
    /// Resolve the terminal outlet of every node
    Terminals {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Known outlet identifiers, comma separated
        #[arg(long, value_delimiter = ',')]
        outlets: Vec<f64>,
    },
    /// Accumulate a per-segment area column (drainage area)
    Accumulate {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Column holding each segment's own area
        #[arg(short = 'w', long, default_value = "area")]
        column: String,
        /// Name of the result column
        #[arg(long, default_value = "totdasqkm")]
        name: String,
    },
    /// Arbolate sum: total upstream channel length
    Arbolate {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Column holding each segment's length
        #[arg(short = 'w', long, default_value = "length")]
        column: String,
        /// Name of the result column
        #[arg(long, default_value = "arbolatesu")]
        name: String,
    },
    /// Distance from every segment to its outlet
    Pathlength {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Column holding each segment's length
        #[arg(short = 'w', long, default_value = "length")]
        column: String,
        /// Measure from the segment's upstream or downstream end
        #[arg(long, default_value = "upstream")]
        origin: String,
        /// Name of the result column
        #[arg(long, default_value = "pathlength")]
        name: String,
    },
    /// Strahler stream order
    Order {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Name of the result column
        #[arg(long, default_value = "streamorde")]
        name: String,
    },
    /// Reorder rows from headwaters to outlets
    Sort {
        /// Input JSON node table
        input: PathBuf,
        /// Output file
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_table(path: &Path) -> Result<LoadedTable> {
    let pb = spinner("Reading node table...");
    let table = read_node_table(path)
        .with_context(|| format!("Failed to read node table {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} nodes", table.len());
    Ok(table)
}

fn write_table<I: NetworkId>(table: &NodeTable<I>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_node_table(table, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Options from `--config`, overridden by the individual policy flags
fn load_options(cli: &Cli) -> Result<NetworkOptions<f64>> {
    let mut options: NetworkOptions<f64> = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text).context("Failed to parse config")?
        }
        None => NetworkOptions::default(),
    };

    if let Some(policy) = &cli.on_missing_weight {
        options.on_missing_weight = policy.parse::<MissingWeightPolicy>()?;
    }
    if let Some(policy) = &cli.on_cycle {
        options.on_cycle = policy.parse::<CyclePolicy>()?;
    }
    if let Some(policy) = &cli.on_divergence {
        options.on_divergence = policy.parse::<DivergencePolicy>()?;
    }
    Ok(options)
}

fn parse_origin(s: &str) -> Result<PathOrigin> {
    match s.to_lowercase().as_str() {
        "upstream" | "up" => Ok(PathOrigin::UpstreamEnd),
        "downstream" | "down" => Ok(PathOrigin::DownstreamEnd),
        _ => bail!("Unknown path origin: {}. Use: upstream, downstream", s),
    }
}

fn to_integer_id(id: f64) -> Result<i64> {
    if id.fract() != 0.0 {
        bail!("Outlet {} is not an integer but the table has integer identifiers", id);
    }
    Ok(id as i64)
}

fn print_summary<I: NetworkId, V>(values: &NodeValues<I, V>) {
    let diagnostics = values.diagnostics();
    if !diagnostics.is_empty() {
        println!("  Diagnostics:");
        for entry in diagnostics.iter() {
            println!("    {}", entry);
        }
    }
}

fn with_result<I: NetworkId>(mut table: NodeTable<I>, name: &str, values: Vec<f64>) -> Result<NodeTable<I>> {
    table
        .insert_column(name, values)
        .with_context(|| format!("Failed to add column '{}'", name))?;
    Ok(table)
}

// ─── Commands ───────────────────────────────────────────────────────────

fn info<I: NetworkId>(input: &Path, table: &NodeTable<I>, options: &NetworkOptions<I>) -> Result<()> {
    let network = FlowNetwork::build(table, options).context("Failed to build network")?;
    let basins = partition_by_basin(&network);
    let cyclic = (0..network.len()).filter(|&n| network.is_cyclic(n)).count();

    println!("File: {}", input.display());
    println!(
        "Nodes: {} ({} identifiers)",
        network.len(),
        if I::is_integer() { "integer" } else { "real" }
    );
    let columns: Vec<&str> = table.column_names().collect();
    println!("Columns: {}", if columns.is_empty() { "-".to_string() } else { columns.join(", ") });
    println!("Headwaters: {}", network.headwaters().count());
    println!("Outlets: {}", network.outlets().count());
    println!("Basins: {}", basins.len());
    if let Some(largest) = basins.iter().map(|b| b.nodes.len()).max() {
        println!("  Largest basin: {} nodes", largest);
    }
    println!("Nodes on cycles: {}", cyclic);

    if !network.diagnostics().is_empty() {
        println!("\nDiagnostics:");
        for entry in network.diagnostics().iter() {
            println!("  {}", entry);
        }
    }
    Ok(())
}

fn run<I: NetworkId>(command: Commands, table: NodeTable<I>, options: NetworkOptions<I>) -> Result<()> {
    match command {
        Commands::Info { input } => info(&input, &table, &options)?,

        Commands::Terminals { output, outlets, .. } => {
            let options = if outlets.is_empty() {
                options
            } else {
                let outlets = outlets
                    .into_iter()
                    .map(|id| {
                        if I::is_integer() {
                            to_integer_id(id)?;
                        }
                        num_traits::cast::<f64, I>(id).context("Outlet identifier out of range")
                    })
                    .collect::<Result<Vec<I>>>()?;
                options.with_known_outlets(outlets)
            };
            let start = Instant::now();
            let result = terminals(&table, &options).context("Failed to resolve terminals")?;
            let elapsed = start.elapsed();
            print_summary(&result);
            let pb = spinner("Writing output...");
            write_terminal_table(&result, &output).context("Failed to write output")?;
            pb.finish_and_clear();
            done("Terminals", &output, elapsed);
        }

        Commands::Accumulate { output, column, name, .. } => {
            let start = Instant::now();
            let result = drainage_area(&table, &column, &options).context("Failed to accumulate drainage area")?;
            let elapsed = start.elapsed();
            print_summary(&result);
            write_table(&with_result(table, &name, result.into_values())?, &output)?;
            done("Drainage area", &output, elapsed);
        }

        Commands::Arbolate { output, column, name, .. } => {
            let start = Instant::now();
            let result = arbolate_sum(&table, &column, &options).context("Failed to compute arbolate sum")?;
            let elapsed = start.elapsed();
            print_summary(&result);
            write_table(&with_result(table, &name, result.into_values())?, &output)?;
            done("Arbolate sum", &output, elapsed);
        }

        Commands::Pathlength { output, column, origin, name, .. } => {
            let origin = parse_origin(&origin)?;
            let start = Instant::now();
            let result = path_length(&table, &column, origin, &options).context("Failed to compute path length")?;
            let elapsed = start.elapsed();
            print_summary(&result);
            write_table(&with_result(table, &name, result.into_values())?, &output)?;
            done("Path length", &output, elapsed);
        }

        Commands::Order { output, name, .. } => {
            let start = Instant::now();
            let network = FlowNetwork::build(&table, &options).context("Failed to build network")?;
            let result = stream_order(&network).with_prior_diagnostics(network.diagnostics().clone());
            let elapsed = start.elapsed();
            let values = result
                .values()
                .iter()
                .map(|o| o.map_or(f64::NAN, f64::from))
                .collect();
            print_summary(&result);
            write_table(&with_result(table, &name, values)?, &output)?;
            done("Stream order", &output, elapsed);
        }

        Commands::Sort { output, .. } => {
            let start = Instant::now();
            let sorted = sort_table(&table, &options).context("Failed to sort network")?;
            let elapsed = start.elapsed();
            write_table(&sorted, &output)?;
            done("Sorted table", &output, elapsed);
        }
    }
    Ok(())
}

fn input_of(command: &Commands) -> &Path {
    match command {
        Commands::Info { input }
        | Commands::Terminals { input, .. }
        | Commands::Accumulate { input, .. }
        | Commands::Arbolate { input, .. }
        | Commands::Pathlength { input, .. }
        | Commands::Order { input, .. }
        | Commands::Sort { input, .. } => input,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let options = load_options(&cli)?;
    let table = read_table(input_of(&cli.command))?;

    match table {
        LoadedTable::Integer(table) => {
            let outlets = options
                .known_outlets
                .clone()
                .map(|ids| ids.into_iter().map(to_integer_id).collect::<Result<Vec<i64>>>())
                .transpose()?;
            let mut options = options.map_outlets(|id| id as i64);
            options.known_outlets = outlets;
            run(cli.command, table, options)
        }
        LoadedTable::Real(table) => run(cli.command, table, options),
    }
}
