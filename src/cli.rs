/// Command line boundary for the execution engine and catalog
use crate::config::ServiceConfig;
use crate::engine::ExecutionEngine;
use crate::registry::{CatalogEntry, CatalogStore, JsonFileStore};
use crate::runtime;
use crate::translate;
use crate::types::ExecutionRequest;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command as SysCommand, Stdio};

#[derive(Parser)]
#[command(name = "runbox", version, about = "Sandboxed code execution engine", long_about = None)]
struct Cli {
    /// Path to a runbox.json config (defaults to ./runbox.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute source code and print the JSON response
    Run {
        /// Read source from this file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Inline source code (stdin is read when neither is given)
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,
        /// Wall clock budget in seconds
        #[arg(long)]
        timeout: Option<i64>,
        /// Memory ceiling in megabytes
        #[arg(long)]
        memory: Option<i64>,
        /// Run inside the container isolation runtime
        #[arg(long)]
        sandbox: bool,
    },
    /// Check that the isolation runtime and fallback interpreter are reachable
    Check,
    /// Register a server in the catalog
    Register {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// List the registered server catalog
    Catalog,
}

pub fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServiceConfig::load_default()?,
    };

    match cli.command {
        Commands::Run {
            file,
            code,
            timeout,
            memory,
            sandbox,
        } => run_code(config, file, code, timeout, memory, sandbox),
        Commands::Check => check(config),
        Commands::Register {
            name,
            description,
            url,
        } => register(config, name, description, url),
        Commands::Catalog => catalog(config),
    }
}

fn run_code(
    config: ServiceConfig,
    file: Option<PathBuf>,
    code: Option<String>,
    timeout: Option<i64>,
    memory: Option<i64>,
    sandbox: bool,
) -> Result<()> {
    let source = match (file, code) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read source file {}", path.display()))?,
        (None, Some(code)) => code,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read source from stdin")?;
            buf
        }
    };

    let request = ExecutionRequest {
        source,
        timeout_seconds: timeout,
        memory_limit_mb: memory,
        isolation_requested: sandbox,
    };

    let engine = ExecutionEngine::new(config);
    let result = engine.execute(&request);
    let exit = match &result {
        Ok(_) => 0,
        Err(e) => i32::from(e),
    };

    let response = translate::to_response(result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if exit != 0 {
        std::process::exit(exit);
    }
    Ok(())
}

fn check(config: ServiceConfig) -> Result<()> {
    match runtime::probe_isolation(&config.runtime) {
        Ok(()) => println!("isolation runtime ({}): ok", config.runtime.engine),
        Err(e) => println!("isolation runtime ({}): {}", config.runtime.engine, e),
    }

    let interpreter = &config.runtime.fallback_interpreter;
    let available = SysCommand::new(interpreter)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if available {
        println!("fallback interpreter ({}): ok", interpreter);
    } else {
        println!("fallback interpreter ({}): not found", interpreter);
    }

    Ok(())
}

fn register(
    config: ServiceConfig,
    name: String,
    description: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let mut store = JsonFileStore::open(config.registry_file())?;

    let mut entry = CatalogEntry::new(name);
    if let Some(description) = description {
        entry = entry.with_description(description);
    }
    if let Some(url) = url {
        entry = entry.with_url(url);
    }
    let name = entry.name.clone();
    store.register(entry)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "status": "registered",
            "name": name,
        }))?
    );
    Ok(())
}

fn catalog(config: ServiceConfig) -> Result<()> {
    let store = JsonFileStore::open(config.registry_file())?;
    let entries = store.list()?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "total": entries.len(),
            "servers": entries,
        }))?
    );
    Ok(())
}
