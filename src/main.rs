use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use cyphergen::{CompilerConfig, InMemorySchema, QueryCompiler, QueryRequest};

/// cyphergen - compile a label/relationship request into parameterised Cypher
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Request file (JSON, or YAML when the extension is .yaml/.yml)
    #[arg(long, short)]
    request: PathBuf,

    /// Compiler configuration YAML; environment variables are used otherwise
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Schema YAML used for relationship inference and short labels
    #[arg(long, short)]
    schema: Option<PathBuf>,

    /// Log the compiled query and its parameters
    #[arg(long, short)]
    verbose: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn load_request(path: &Path) -> anyhow::Result<QueryRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading request file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let request = if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(request)
}

fn main() -> anyhow::Result<()> {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CompilerConfig::from_yaml_file(path)?,
        None => CompilerConfig::from_env()?,
    };
    config.verbose |= cli.verbose;

    let request = load_request(&cli.request)?;
    let compiled = match &cli.schema {
        Some(path) => {
            let schema = InMemorySchema::from_yaml_file(path)?;
            log::debug!(
                "Loaded schema with {} relationship(s)",
                schema.relationships.len()
            );
            QueryCompiler::new(config).with_schema(schema).compile(&request)?
        }
        None => QueryCompiler::new(config).compile(&request)?,
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&compiled)?
    } else {
        serde_json::to_string(&compiled)?
    };
    println!("{}", output);
    Ok(())
}
