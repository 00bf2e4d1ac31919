use clap::Parser;
use std::io::{Read, Write};
use tracing::debug;

/// Test executable for child process E2E testing.
///
/// Reads stdin to EOF, copies it to the selected outputs and exits with the
/// requested code.
#[derive(Parser, Debug)]
#[command(name = "testecho")]
#[command(about = "Echo stdin to stdout and/or stderr, then exit", long_about = None)]
struct Args {
    /// Copy stdin to stdout
    #[arg(short = '1')]
    stdout: bool,

    /// Copy stdin to stderr
    #[arg(short = '2')]
    stderr: bool,

    /// Exit code to return
    #[arg(short = 'e', long = "exit-code", default_value = "0")]
    exit_code: i32,

    /// Abort instead of exiting (terminates with SIGABRT on Unix)
    #[arg(long)]
    abort: bool,

    /// Log to stderr (mixes with echoed data)
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .init();
    }
    debug!("Starting testecho with args: {:?}", args);

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("testecho: failed to read stdin: {}", e);
        std::process::exit(1);
    }
    debug!("Read {} bytes", input.len());

    if args.stdout {
        let mut out = std::io::stdout().lock();
        if out.write_all(&input).and_then(|_| out.flush()).is_err() {
            std::process::exit(1);
        }
    }
    if args.stderr {
        let mut err = std::io::stderr().lock();
        if err.write_all(&input).and_then(|_| err.flush()).is_err() {
            std::process::exit(1);
        }
    }

    if args.abort {
        std::process::abort();
    }

    std::process::exit(args.exit_code);
}
