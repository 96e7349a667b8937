use anyhow::Result;
use chatbase_client::ConversationClient;
use chatbase_config::ExportConfig;
use chatbase_core::ChatbaseError;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chatbase-export")]
#[command(about = "Fetch Chatbase conversation logs and render them as transcripts", long_about = None)]
struct Cli {
    /// Output file for the formatted transcripts; prints to stdout when omitted
    output: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE", default_value = "chatbase.yaml")]
    config: PathBuf,

    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Override the configured chatbot identifier
    #[arg(long)]
    chatbot_id: Option<String>,

    /// Override the configured start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Override the configured end date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Override the configured source filter
    #[arg(long)]
    source: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;

    let mut config = load_config(&cli.config)?;
    apply_overrides(&mut config, &cli);

    let client = ConversationClient::new(&config.api)?;
    let page = client.fetch_conversations(&config.export).await?;

    info!("Fetched {} conversation(s)", page.conversations.len());

    let report = chatbase_transcript::render_report(&page.conversations, &page.raw)?;
    write_report(&report, cli.output.as_deref())?;

    Ok(())
}

fn load_config(path: &Path) -> Result<ExportConfig> {
    if !path.exists() {
        return Err(ChatbaseError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        ))
        .into());
    }

    info!("Loading configuration from: {:?}", path);
    Ok(ExportConfig::from_yaml(path)?)
}

fn apply_overrides(config: &mut ExportConfig, cli: &Cli) {
    if let Some(chatbot_id) = &cli.chatbot_id {
        config.export.chatbot_id = chatbot_id.clone();
    }
    if let Some(start_date) = &cli.start_date {
        config.export.start_date = start_date.clone();
    }
    if let Some(end_date) = &cli.end_date {
        config.export.end_date = end_date.clone();
    }
    if let Some(source) = &cli.source {
        config.export.filtered_sources = Some(source.clone());
    }
}

fn write_report(report: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, report).map_err(ChatbaseError::Io)?;
            println!("\n✓ Formatted transcripts saved to: {}", path.display());
        }
        None => println!("{report}"),
    }

    Ok(())
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ChatbaseError>() {
        Some(ChatbaseError::Api { status, body }) => {
            eprintln!("Error fetching conversations: HTTP {status}");
            if !body.is_empty() {
                eprintln!("Response: {body}");
            }
        }
        Some(ChatbaseError::Decode { source, body }) => {
            eprintln!("Error parsing JSON response: {source}");
            eprintln!("Raw response: {body}");
        }
        Some(other) => eprintln!("{other}"),
        None => eprintln!("Unexpected error: {err:?}"),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transcripts.txt");

        write_report("hello transcript", Some(&path)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "hello transcript"
        );
    }
}
