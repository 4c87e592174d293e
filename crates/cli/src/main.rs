mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{FmtStyle, TargetArgs};
use output::{OutputFormat, print_error};

/// vitu - compile one source file to a native binary through V or Go
#[derive(Parser)]
#[command(name = "vitu")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose (debug) logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate backend source without compiling it
  Transpile {
    /// Source file to transpile
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Transpile and compile into a native binary
  Build {
    /// Source file to build
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Build and execute, exiting with the program's status
  Run {
    /// Source file to run
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Run the program's tests
  Test {
    /// Source file to test
    #[arg(default_value = "main.vt")]
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Format a source file
  Fmt {
    /// Source file to format
    file: PathBuf,

    /// Character set for formatted output
    #[arg(long, value_enum, default_value_t = FmtStyle::Ascii)]
    style: FmtStyle,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Remove build artifacts
  Clean {
    /// Source file whose artifacts to remove
    #[arg(default_value = "main.vt")]
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
  },

  /// Show the host platform and toolchain configuration
  Env {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Show version information and available backends
  Version {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match &cli.command {
    Commands::Transpile { file, target } => cmd::cmd_transpile(file, target),
    Commands::Build { file, target } => cmd::cmd_build(file, target),
    Commands::Run { file, target } => cmd::cmd_run(file, target),
    Commands::Test { file, target } => cmd::cmd_test(file, target),
    Commands::Fmt { file, style, target } => cmd::cmd_fmt(file, *style, target),
    Commands::Clean { file, target } => cmd::cmd_clean(file, target),
    Commands::Env { output } => cmd::cmd_env(*output),
    Commands::Version { output } => cmd::cmd_version(*output),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
