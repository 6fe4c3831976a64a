use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use family_tree::export;
use family_tree::genealogy::{DemographicData, DemographicModel, TreeConfig, TreeEngine};
use family_tree::menu;

#[derive(Parser, Debug)]
#[command(name = "family_tree")]
#[command(about = "Generate a multi-generational family tree from demographic data")]
struct Args {
    /// Birth year of the founding couple
    #[arg(long)]
    start_year: Option<i32>,

    /// No one is born after this year
    #[arg(long)]
    end_year: Option<i32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Demographic dataset (JSON); embedded defaults if not specified
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Tree configuration file (JSON); command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export a text report (e.g., "family.txt")
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export the whole population as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Print every report and exit instead of prompting for queries
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config = match &args.config {
        Some(path) => TreeConfig::load(path).unwrap_or_else(|e| {
            error!("Failed to read config {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => TreeConfig::default(),
    };
    if let Some(year) = args.start_year {
        config.start_year = year;
    }
    if let Some(year) = args.end_year {
        config.end_year = year;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let data = DemographicData::load_or_default(args.data.as_deref()).unwrap_or_else(|e| {
        error!("Failed to load demographic data: {}", e);
        std::process::exit(1);
    });
    let model = DemographicModel::from_data(data).unwrap_or_else(|e| {
        error!("Invalid demographic data: {}", e);
        std::process::exit(1);
    });

    let mut engine = TreeEngine::from_config(&config);
    println!("Growing family tree with seed: {}", engine.seed);

    let tree = match engine.grow(&model, &config) {
        Ok(tree) => tree,
        Err(e) => {
            error!("Family tree generation failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("{}", tree.summary());

    if let Some(ref path) = args.export {
        match export::export_report(&tree, engine.seed, path) {
            Ok(()) => info!("Report saved to: {}", path.display()),
            Err(e) => error!("Failed to export report: {}", e),
        }
    }
    if let Some(ref path) = args.export_json {
        match export::export_json(&tree, engine.seed, path) {
            Ok(()) => info!("JSON snapshot saved to: {}", path.display()),
            Err(e) => error!("Failed to export JSON: {}", e),
        }
    }

    if !args.batch {
        println!("\nTree built.");
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if args.batch {
        menu::print_all(&tree, &mut out)
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        menu::run_query_menu(&tree, &mut input, &mut out)
    };
    if let Err(e) = result {
        error!("Query menu error: {}", e);
    }
}
