use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use verse_annotator::engine::Annotator;
use verse_annotator::gazetteer::{self, Gazetteer};
use verse_annotator::{batch, config, output, render};

#[derive(Parser)]
#[command(name = "verse-annotator")]
#[command(about = "Highlight people, places and keywords in devotional text")]
#[command(long_about = "\
Highlight people, places and keywords in devotional text

Every recognized term is wrapped in a marker carrying its category and
canonical name, so a reader UI can style it and look up study notes.

Project layout:

  project/
  ├── config.toml                  # Optional; see 'gen-config'
  └── gazetteer/
      ├── people.json              # [{\"name\": \"Simon Peter\", \"aliases\": [\"Cephas\"]}]
      ├── places.txt               # One place per line, '#' comments
      └── keywords.txt             # One keyword per line, '#' comments

Inputs:
  .txt / .md    free-form text, annotated paragraph by paragraph
  .json         [{\"number\": 1, \"text\": \"...\"}] verse arrays

Set RUST_LOG=debug for diagnostics on stderr.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (gazetteer paths resolve relative to it)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the gazetteer and report what it contains
    Check,
    /// Annotate text and verse files into HTML
    Annotate {
        /// Files or directories to annotate
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "annotated")]
        output: PathBuf,
        /// Re-annotate files whose output is already current
        #[arg(long)]
        force: bool,
    },
    /// Print the highlight ranges for a text file as JSON
    Spans {
        file: PathBuf,
    },
    /// List the annotations embedded in an annotated HTML file
    Extract {
        file: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            let annotator = build_annotator(&cli.config)?;
            println!("==> Checking {}", cli.config.display());
            output::print_check_output(annotator.gazetteer(), annotator.ruleset());
            if annotator.gazetteer().is_empty() {
                println!("==> Gazetteer is empty: output will be escaped text only");
            } else {
                println!("==> Gazetteer is valid");
            }
        }
        Command::Annotate {
            inputs,
            output: output_dir,
            force,
        } => {
            let annotator = build_annotator(&cli.config)?;
            let jobs = batch::plan(&inputs, &output_dir)?;
            println!(
                "==> Annotating {} files \u{2192} {}",
                jobs.len(),
                output_dir.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::run(&annotator, &jobs, force, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            let summary = result?;
            println!();
            println!("{}", output::format_batch_summary(&summary));
        }
        Command::Spans { file } => {
            let annotator = build_annotator(&cli.config)?;
            let text = std::fs::read_to_string(&file)?;
            let json = serde_json::to_string_pretty(&annotator.highlights(&text))?;
            println!("{}", json);
        }
        Command::Extract { file } => {
            let html = std::fs::read_to_string(&file)?;
            output::print_extract_output(
                render::read_version_marker(&html).as_ref(),
                &render::extract_annotations(&html),
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config and gazetteer, size the thread pool, and compile the engine.
fn build_annotator(config_path: &Path) -> Result<Annotator, Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    init_thread_pool(&config.processing);
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let sources = gazetteer::load_sources(&config.gazetteer, base_dir)?;
    let gazetteer = Gazetteer::from_sources(&sources);
    Ok(Annotator::new(gazetteer, &config.engine())?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
