use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

use cproc_common::ExitStatus;
use cproc_process::{execute_command, ExecutionConfig};

/// Run a program with piped stdin/stdout/stderr and exit with its code
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML) naming the program and its arguments
    #[arg(short, long, value_name = "FILE", conflicts_with = "command")]
    config: Option<PathBuf>,

    /// File whose bytes are sent to the program's stdin ("-" for our own stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Program to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "PROGRAM")]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug)?;

    let config = resolve_config(&args)?;
    let input = read_input(args.input.as_deref())?;

    info!("Running {} with {} argument(s)", config.executable_path, config.args.len());
    debug!("Sending {} byte(s) to stdin", input.len());

    let output = execute_command(&config.executable_path, &config.args, &input)
        .with_context(|| format!("Failed to run {}", config.executable_path))?;

    std::io::stdout().write_all(&output.stdout).context("Failed to forward stdout")?;
    std::io::stdout().flush().context("Failed to forward stdout")?;
    std::io::stderr().write_all(&output.stderr).context("Failed to forward stderr")?;

    let code = match output.status {
        ExitStatus::Exited(code) => {
            info!("{} exited with code {}", config.executable_path, code);
            code
        }
        ExitStatus::Signaled(signal) => {
            error!(
                "{} terminated by {}",
                config.executable_path,
                cproc_process::signal_name(signal)
            );
            128 + signal
        }
    };

    std::process::exit(code)
}

fn resolve_config(args: &Args) -> Result<ExecutionConfig> {
    if let Some(path) = &args.config {
        info!("Config file: {}", path.display());
        return ExecutionConfig::load_from_file(path);
    }

    let Some((program, rest)) = args.command.split_first() else {
        bail!("Either --config or a program to run is required");
    };
    let config = ExecutionConfig::new(program.as_str(), rest.iter().cloned());
    config.validate()?;
    Ok(config)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>> {
    match input {
        None => Ok(Vec::new()),
        Some("-") => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
            Ok(buffer)
        }
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read input file: {}", path)),
    }
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    // stdout carries the child's output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    Ok(())
}
