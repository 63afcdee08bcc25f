use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use vela_drv::{Config, EmitStage};

/// Compile and run a vela source file.
#[derive(Parser, Debug)]
#[command(name = "vela", version, about)]
struct Cli {
    /// Source file to run. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Print an intermediate representation instead of running the program.
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Emit {
    Tokens,
    Ast,
    Bytecode,
}

impl From<Emit> for EmitStage {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Tokens => EmitStage::Tokens,
            Emit::Ast => EmitStage::Ast,
            Emit::Bytecode => EmitStage::Bytecode,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config {
        input: cli.input,
        emit: cli.emit.map(EmitStage::from).unwrap_or_default(),
        verbose: cli.verbose,
    };

    if let Err(e) = vela_drv::run(config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
