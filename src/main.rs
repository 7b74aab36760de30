use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use dupguard::{DupGuard, DupGuardConfig};
use tracing::info;

/// Report duplicate blocks and repeated line cycles in a source file.
#[derive(Parser)]
#[command(name = "dupguard", version)]
struct Cli {
    /// File to analyze.
    file: PathBuf,

    /// Editor language id (`rust`, `python`, ...). Defaults to the file
    /// extension.
    #[arg(long)]
    language: Option<String>,

    /// Print only the cleaned text instead of the JSON report.
    #[arg(long)]
    clean: bool,

    /// Path to a YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => DupGuardConfig::from_file(path)?,
        None => DupGuardConfig::default(),
    };
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| language_from_path(&cli.file));

    let text = fs::read_to_string(&cli.file)?;
    let guard = DupGuard::from_config(&config)?;
    let report = guard.analyze(&text, &language);
    info!(
        file = %cli.file.display(),
        language = %language,
        duplicates_removed = report.duplicates_removed,
        "analyzed"
    );

    if cli.clean {
        print!("{}", report.cleaned_text);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn language_from_path(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "plaintext".to_string())
}
