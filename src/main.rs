use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tech_report::api::{AppState, create_router};
use tech_report::build_pipeline;
use tech_report::config::Config;
use tech_report::export::save_report;
use tech_report::logging;

#[derive(Parser)]
#[command(name = "tech-report", version, about = "Generate technical research reports from web search and a local LLM")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the browser UI and JSON API
    Serve {
        /// Address to bind, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Generate one report and save it as markdown
    Generate {
        topic: String,
        /// Directory to save into, overrides REPORT_OUTPUT_DIR
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Name the file after the topic only
        #[arg(long)]
        no_timestamp: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env();
    logging::init(&config)?;

    if !config.credentials.is_configured() {
        log::warn!("TAVILY_API_KEY is missing or invalid; set it in .env or through the UI");
    }

    match cli.command {
        Command::Serve { bind } => {
            serve(&config, bind).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate {
            topic,
            output_dir,
            no_timestamp,
        } => generate(&config, &topic, output_dir, !no_timestamp).await,
    }
}

async fn serve(config: &Config, bind: Option<String>) -> anyhow::Result<()> {
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let state = AppState::new(build_pipeline(config), config.credentials.clone());
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("serving UI on http://{bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn generate(
    config: &Config,
    topic: &str,
    output_dir: Option<PathBuf>,
    timestamped: bool,
) -> anyhow::Result<ExitCode> {
    let topic = topic.trim();
    if topic.is_empty() {
        eprintln!("topic cannot be empty");
        return Ok(ExitCode::FAILURE);
    }

    let pipeline = build_pipeline(config);
    match pipeline.run(topic).await {
        Ok(result) => {
            println!("{}", result.report);
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let path = save_report(&dir, topic, &result, &config.report_language, timestamped)?;
            println!("\nsaved to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            if let Some(guide) = e.remediation() {
                eprintln!("\n{guide}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
