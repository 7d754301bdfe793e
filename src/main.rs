use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use beverage_nutrition::{ExtractorConfig, read_document, run_full, run_test, server, source};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "extract-nutrition", about = "Beverage nutrition PDF to JSON extractor")]
struct Cli {
    /// URL of the nutrition PDF
    #[arg(long, env = "NUTRITION_PDF_URL", default_value = source::DEFAULT_PDF_URL, global = true)]
    pdf_url: String,
    /// Where the grouped JSON document is written
    #[arg(long, env = "NUTRITION_OUTPUT", default_value = "nutrition_data.json", global = true)]
    output: PathBuf,
    /// Local copy of the PDF
    #[arg(long, env = "NUTRITION_PDF_FILE", default_value = "starbucks_nutrition.pdf", global = true)]
    pdf_file: PathBuf,
    /// MD5 sidecar used for change detection
    #[arg(long, env = "NUTRITION_MD5_FILE", default_value = "starbucks_nutrition.md5", global = true)]
    md5_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a page range and validate the flat records
    Test {
        #[arg(long, default_value_t = 2)]
        start_page: usize,
        #[arg(long, default_value_t = 4)]
        end_page: usize,
    },
    /// Extract the complete PDF into the grouped document
    Full {
        /// Download even if the local copy matches its stored hash
        #[arg(long)]
        force_download: bool,
    },
    /// Serve an extracted document over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
        /// Document to serve (defaults to --output)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            pdf_url: self.pdf_url.clone(),
            output_file: self.output.clone(),
            pdf_file: self.pdf_file.clone(),
            md5_file: self.md5_file.clone(),
        }
    }
}

async fn serve(addr: &str, input: PathBuf) -> anyhow::Result<()> {
    let doc = read_document(&input)?;
    info!("Loaded {} drinks from {}", doc.metadata.total_drinks, input.display());
    let app = server::router(Arc::new(doc));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let success = match cli.command {
        Commands::Test { start_page, end_page } => {
            info!("Running test extraction on pages {start_page}-{end_page}...");
            match run_test(&config, start_page, end_page).await {
                Ok(report) => report.is_valid(),
                Err(err) => {
                    error!("Error during test extraction: {err:#}");
                    false
                }
            }
        }
        Commands::Full { force_download } => {
            info!("Running full PDF extraction...");
            match run_full(&config, force_download).await {
                Ok(_) => true,
                Err(err) => {
                    error!("Error during full extraction: {err:#}");
                    false
                }
            }
        }
        Commands::Serve { addr, input } => {
            let input = input.unwrap_or_else(|| config.output_file.clone());
            match serve(&addr, input).await {
                Ok(()) => true,
                Err(err) => {
                    error!("Server failed: {err:#}");
                    false
                }
            }
        }
    };

    if success {
        info!("Done");
        ExitCode::SUCCESS
    } else {
        error!("Command failed");
        ExitCode::FAILURE
    }
}
