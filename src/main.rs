use std::{
    io,
    path::PathBuf,
    process::ExitCode,
};

use clap::{
    Parser,
    ValueEnum,
};
use marcfill::{
    runner::{
        self,
        Input,
    },
    MarcFillError,
    ProcessingStats,
    Settings,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatsFormat {
    Text,
    Json,
}

/// Restores missing 852 $p holdings fields in MARC text exports.
#[derive(Debug, Parser)]
#[command(name = "marcfill", version)]
struct Cli {
    /// .txt or .mrk files to repair. Reads stdin when neither files nor --text are given.
    files: Vec<PathBuf>,

    /// Repair this text instead of reading files
    #[arg(long, conflicts_with = "files")]
    text: Option<String>,

    /// Where to write a single repaired document (default: stdout)
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for repaired documents, one `<stem>.processed.mrk` per input
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
    stats: StatsFormat,

    /// Settings file (default: settings.json in the user data directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Returns false when some documents of a batch failed.
fn run(cli: Cli) -> Result<bool, MarcFillError> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load_or_default(),
    };
    let tag = &settings.profile.target_tag;

    if cli.files.len() > 1 {
        let entries = runner::repair_batch(&cli.files, cli.out_dir.as_deref(), &settings)?;

        let mut all_ok = true;
        for entry in entries {
            match entry.result {
                Ok(repaired) => {
                    let label = entry.path.display().to_string();
                    if let Err(e) = print_stats(&label, tag, &repaired.stats, cli.stats) {
                        tracing::error!("Failed to print stats for {}: {}", label, e);
                    }
                }
                Err(e) => {
                    all_ok = false;
                    tracing::error!("{}: {}", entry.path.display(), e);
                }
            }
        }
        return Ok(all_ok);
    }

    let input = match (cli.files.first(), cli.text) {
        (Some(path), _) => Input::File(path),
        (None, Some(text)) => Input::Text(text),
        (None, None) => Input::Stream(Box::new(io::stdin().lock())),
    };

    let repaired = runner::repair_document(
        input,
        cli.output.as_deref(),
        cli.out_dir.as_deref(),
        &settings,
        &mut io::stdout().lock(),
    )?;

    print_stats(&repaired.label, tag, &repaired.stats, cli.stats)?;
    Ok(true)
}

fn print_stats(
    label: &str,
    tag: &str,
    stats: &ProcessingStats,
    format: StatsFormat,
) -> Result<(), MarcFillError> {
    match format {
        StatsFormat::Json => {
            let json = serde_json::json!({ "source": label, "stats": stats });
            eprintln!("{}", serde_json::to_string(&json)?);
        }
        StatsFormat::Text => {
            eprintln!(
                "{}: records {} -> {}, {} fields {} -> {} ({:+})",
                label,
                stats.original_records,
                stats.processed_records,
                tag,
                stats.original_field_count,
                stats.processed_field_count,
                stats.added_fields
            );
        }
    }
    Ok(())
}
