use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use jobsdb::config::Config;
use jobsdb::db::JobStore;
use jobsdb::logging;
use jobsdb::pipeline::Pipeline;
use jobsdb::{export, report, server};

#[derive(Parser)]
#[command(name = "jobsdb")]
#[command(about = "Job postings ETL pipeline and reporting tools")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project raw scraped records onto the fixed field set
    Clean,
    /// Import cleaned records into the SQLite store
    Import,
    /// Run clean and import sequentially
    Run,
    /// Print the console report (with export and search prompts)
    Report,
    /// Export the store to CSV files
    Export {
        /// Directory the CSV files are written into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Serve the read-only HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn run_clean(config: &Config) {
    println!("🧹 Cleaning raw records...");
    match Pipeline::clean(config) {
        Ok(result) => {
            println!("✅ Clean finished: {} records -> {}", result.records, result.output_file);
        }
        Err(e) => {
            error!("Clean failed: {}", e);
            println!("❌ Clean failed: {e}");
        }
    }
}

fn run_import(config: &Config) {
    println!("📥 Importing into the jobs store...");
    match Pipeline::import(config) {
        Ok(report) => {
            println!(
                "✅ Import finished: {} inserted, {} skipped, {} rows total",
                report.summary.inserted, report.summary.skipped, report.total_rows
            );
        }
        Err(e) => {
            error!("Import failed: {}", e);
            println!("❌ Import failed: {e}");
        }
    }
}

fn run_export(config: &Config, out_dir: &PathBuf) {
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        println!("❌ Export failed: {e}");
        return;
    }
    let result = JobStore::open(&config.data.database_file).and_then(|store| {
        let jobs = export::export_jobs(&store, out_dir.join(export::JOBS_EXPORT_FILE))?;
        let companies =
            export::export_company_summary(&store, out_dir.join(export::COMPANY_SUMMARY_FILE))?;
        Ok((jobs, companies))
    });
    match result {
        Ok((jobs, companies)) => {
            println!(
                "✅ Exported {} jobs and {} company summaries to {}",
                jobs,
                companies,
                out_dir.display()
            );
        }
        Err(e) => {
            error!("Export failed: {}", e);
            println!("❌ Export failed: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            println!("❌ Failed to load configuration: {e}");
            return Ok(());
        }
    };

    match cli.command {
        Commands::Clean => run_clean(&config),
        Commands::Import => run_import(&config),
        Commands::Run => {
            println!("🚀 Running full pipeline (clean + import)...");
            println!("\n📋 Step 1: Cleaning data...");
            run_clean(&config);
            println!("\n🏗️  Step 2: Importing data...");
            run_import(&config);
        }
        Commands::Report => {
            if let Err(e) = report::run_report(&config) {
                error!("Report failed: {}", e);
                println!("❌ Report failed: {e}");
            }
        }
        Commands::Export { out_dir } => run_export(&config, &out_dir),
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            if let Err(e) = server::start_server(config.data.database_file.clone(), port).await {
                error!("Server failed: {}", e);
                println!("❌ Server failed: {e}");
            }
        }
    }
    Ok(())
}
