use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use molgen_compiler::{check, generate, GeneratorConfig, MolgenError};

const DEFAULT_CONFIG: &str = "molgen.toml";

#[derive(Parser)]
#[command(name = "molgen", version)]
#[command(about = "Generate molecule codecs for Rust from a schema IR", long_about = None)]
struct Cli {
    /// Config file (defaults to `molgen.toml` when it exists)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema IR to read, overriding the config
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Output directory, overriding the config
    #[arg(short, long, global = true)]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate `<module>.rs` and `mod.rs` (default)
    Generate,

    /// Verify the schema without writing anything
    Check,

    /// Print the foundation catalog as JSON
    Catalog,
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, MolgenError> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => GeneratorConfig::load(Path::new(DEFAULT_CONFIG))?,
        None => GeneratorConfig::default(),
    };
    if let Some(schema) = &cli.schema {
        config.schema = schema.clone();
    }
    if let Some(out_dir) = &cli.out_dir {
        config.out_dir = out_dir.clone();
    }
    debug!(?config, "configuration");
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), MolgenError> {
    let config = load_config(cli)?;

    match cli.command.as_ref().unwrap_or(&Commands::Generate) {
        Commands::Generate => {
            let report = generate(&config)?;
            for path in &report.written {
                println!("wrote {}", path.display());
            }
            for path in &report.removed {
                println!("removed {}", path.display());
            }
        }

        Commands::Check => {
            let report = check(&config)?;
            println!(
                "{}: {} declarations ({} primitive, {} domain, {} custom)",
                report.namespace,
                report.primitive + report.domain + report.custom,
                report.primitive,
                report.domain,
                report.custom
            );
            println!("emission order: {}", report.order.join(", "));
        }

        Commands::Catalog => {
            println!("{}", config.load_catalog()?.to_json()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "molgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_generate_with_defaults() {
        let cli = Cli::try_parse_from(["molgen"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn overrides_apply_on_top_of_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("molgen.toml");
        std::fs::write(&config_path, "schema = \"a.json\"\nout_dir = \"gen\"\nmodule = \"records\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "molgen",
            "--config",
            config_path.to_str().unwrap(),
            "check",
            "--out-dir",
            "elsewhere",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.schema, PathBuf::from("a.json"));
        assert_eq!(config.out_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.module.as_deref(), Some("records"));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let cli = Cli::try_parse_from([
            "molgen",
            "--schema",
            dir.path().join("missing.json").to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(run(&cli), Err(MolgenError::MissingInput(_))));
        assert!(!out_dir.exists());
    }
}
