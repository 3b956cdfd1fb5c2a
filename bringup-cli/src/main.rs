//! Bringup CLI - board bring-up and test plan generation from the command line.

use bringup::context::{add_document, ContextStore, SqliteStore};
use bringup::ingest::InputKind;
use bringup::{
    render_document, BringupCore, LlmConfig, LoadMode, NetlistParser, ParsedEntities, PlanOptions,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const MAX_LISTED_TEST_POINTS: usize = 5;

#[derive(Parser)]
#[command(name = "bringup")]
#[command(about = "Hardware bring-up/test plan generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to design file (JSON, PDF, BOM, Altium, Netlist, ZIP)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output markdown path
    #[arg(long, default_value = "out/testplan.md")]
    out: PathBuf,

    /// Force offline deterministic plan
    #[arg(long)]
    offline: bool,

    /// Input is a netlist file (IPC-D-356A format)
    #[arg(long)]
    netlist: bool,

    /// Auto-detect file type and write both plan and entities
    #[arg(long)]
    auto: bool,

    /// SQLite context library used to enrich LLM prompts
    #[arg(long, value_name = "DB")]
    library: Option<PathBuf>,

    /// Add INPUT to the context library and exit
    #[arg(long, requires = "library")]
    add_to_library: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = run(&cli).await;
    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: &Cli) -> i32 {
    if !cli.input.exists() {
        eprintln!("Error: File {} does not exist", cli.input.display());
        return 1;
    }

    let store = match &cli.library {
        Some(path) => match SqliteStore::open(path) {
            Ok(store) => Some(store),
            Err(e) => {
                eprintln!("Error: Cannot open library {}: {}", path.display(), e);
                return 1;
            }
        },
        None => None,
    };

    if cli.add_to_library {
        return match &store {
            Some(store) => handle_add_to_library(&cli.input, store),
            None => 1,
        };
    }

    let mode = LoadMode::from_flags(cli.auto, cli.netlist);
    let is_netlist = match mode {
        LoadMode::Netlist => true,
        LoadMode::Entities => InputKind::from_path(&cli.input) == Some(InputKind::Netlist),
        LoadMode::Auto => false,
    };

    if is_netlist {
        println!("Parsing netlist file: {}", cli.input.display());
    }

    let entities = match BringupCore::load_entities(&cli.input, mode) {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if is_netlist {
        print_netlist_summary(&cli.input, &entities);
    }

    let options = PlanOptions {
        offline: cli.offline,
    };
    let config = LlmConfig::from_env();
    let plan = BringupCore::build_plan(
        &entities,
        options,
        &config,
        store.as_ref().map(|s| s as &dyn ContextStore),
    )
    .await;

    if let Err(e) = write_output(&cli.out, &render_document(&plan)) {
        eprintln!("Error: Cannot write {}: {}", cli.out.display(), e);
        return 1;
    }

    if cli.auto {
        let entities_out = output_dir(&cli.out).join("entities.json");
        if let Err(e) = write_output(&entities_out, &entities.to_json_pretty()) {
            eprintln!("Error: Cannot write {}: {}", entities_out.display(), e);
            return 1;
        }
        println!("Wrote {} and {}", cli.out.display(), entities_out.display());
    } else {
        println!("Wrote {}", cli.out.display());
    }
    0
}

fn handle_add_to_library(input: &Path, store: &SqliteStore) -> i32 {
    let text = match BringupCore::extract_text(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    match add_document(store, &name, &text, None) {
        Ok(Some(_)) => {
            let count = store.count().unwrap_or(0);
            println!("Added {} to library ({} documents)", name, count);
            0
        }
        Ok(None) => {
            eprintln!("Warning: no text extracted from {}; nothing added", input.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn print_netlist_summary(input: &Path, entities: &ParsedEntities) {
    println!(
        "Extracted: {} rails, {} oscillators, {} tests",
        entities.rails.len(),
        entities.oscillators.len(),
        entities.functional_tests.len()
    );

    let test_points = NetlistParser::extract_test_points_from_file(input);
    if test_points.is_empty() {
        return;
    }
    println!("Test points: {}", test_points.len());
    for tp in test_points.iter().take(MAX_LISTED_TEST_POINTS) {
        match tp.coordinates {
            Some((x, y)) => println!("  - {} ({}) at X{} Y{}", tp.reference, tp.net, x, y),
            None => println!("  - {} ({})", tp.reference, tp.net),
        }
    }
    if test_points.len() > MAX_LISTED_TEST_POINTS {
        println!("  ... and {} more", test_points.len() - MAX_LISTED_TEST_POINTS);
    }
}

fn output_dir(out: &Path) -> &Path {
    match out.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn write_output(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(output_dir(path))?;
    std::fs::write(path, contents)
}
