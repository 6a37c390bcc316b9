//! Paygrid CLI - validate and export payment-account grids
//!
//! # Commands
//!
//! ```bash
//! paygrid validate pagos.tsv            # Load a TSV and report invalid cells
//! paygrid export pagos.tsv -n lote      # Write lote.txt into the output dir
//! paygrid rules                         # Show the column rule table
//! paygrid serve                         # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use paygrid::pipeline::{export_to_sink, load_file};
use paygrid::{AppConfig, ColumnRule, DirectorySink, ExportError, PipelineError, COLUMN_SPECS};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "paygrid")]
#[command(about = "Validate payment-account grids and export load files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a tab-separated file and report every invalid cell
    Validate {
        /// Input TSV file
        input: PathBuf,
    },

    /// Load a tab-separated file and write the `;`-delimited load file
    Export {
        /// Input TSV file
        input: PathBuf,

        /// Export name (".txt" is appended when missing)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the column rule table
    Rules,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),

        Commands::Export { input, name, output } => {
            let name = name.unwrap_or_else(|| config.default_filename.clone());
            let dir = output.unwrap_or_else(|| config.output_dir.clone());
            cmd_export(&input, &name, &dir)
        }

        Commands::Rules => cmd_rules(),

        Commands::Serve { port } => cmd_serve(port.unwrap_or(config.port)).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (session, summary) = load_file(input)?;

    eprintln!("\n📊 Results: {} row(s), {} invalid cell(s)", summary.rows, summary.invalid_cells);

    let messages = session.messages();
    if messages.is_empty() {
        eprintln!("✅ Grid is valid");
        return Ok(());
    }

    for message in &messages {
        eprintln!("   - {}", message);
    }
    std::process::exit(1);
}

fn cmd_export(input: &Path, name: &str, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, _) = load_file(input)?;
    let mut sink = DirectorySink::new(dir);

    match export_to_sink(&mut session, name, &mut sink) {
        Ok(output) => {
            eprintln!("💾 Output written to: {}", sink.path_for(&output.filename).display());
            Ok(())
        }
        Err(PipelineError::Export(ExportError::Validation { messages })) => {
            eprintln!("\n❌ Export refused, {} cell(s) to fix:", messages.len());
            for message in &messages {
                eprintln!("   - {}", message);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("📋 Column rules:\n");
    for spec in COLUMN_SPECS.iter() {
        let rule = match spec.rule {
            ColumnRule::Pattern { pattern, allowed_chars } => match allowed_chars {
                Some(set) => format!("{:?} pattern, {:?} only", pattern, set),
                None => format!("{:?} pattern", pattern),
            },
            ColumnRule::Enumerated { options } => format!("one of {}", options.join(", ")),
            ColumnRule::Numeric => "decimal number".to_string(),
            ColumnRule::Conditional { sibling } => {
                format!("depends on {} (CTA: CTE, AHO / TAR: A, V, M)", sibling.label())
            }
        };
        let max = spec
            .max_length
            .map(|n| format!(", max {}", n))
            .unwrap_or_default();
        let required = if spec.required { "required" } else { "optional" };

        println!("  {} {} ({}{})", spec.column.index(), spec.label, required, max);
        println!("     {}", rule);
    }
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    paygrid::server::start_server(port).await?;
    Ok(())
}
