use clap::Parser;
use miette::{IntoDiagnostic, Result};
use purchasekit::interfaces::codegen;
use purchasekit::interfaces::json::config_reader::ConfigReader;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store configuration JSON file
    config: PathBuf,

    /// Output path for the generated module. Writes to stdout if omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let file = File::open(&cli.config).into_diagnostic()?;
    let config = ConfigReader::new(file).read().into_diagnostic()?;

    // Both of these reject misconfiguration (duplicate ids, bad key material)
    // before anything is generated.
    let catalog = config.catalog().into_diagnostic()?;
    config.validator().into_diagnostic()?;

    let module = codegen::generate_product_module(&catalog);
    match cli.out {
        Some(path) => {
            std::fs::write(&path, module).into_diagnostic()?;
            tracing::info!(
                products = catalog.len(),
                out = %path.display(),
                "product module generated"
            );
        }
        None => {
            io::stdout().write_all(module.as_bytes()).into_diagnostic()?;
        }
    }

    Ok(())
}
