use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use luamap_lib::{NameTranslator, Options, ZeroValues};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

/// luamap - Decode Lua tables into typed records
#[derive(Parser)]
#[command(name = "luamap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  mapping: MappingArgs,

  #[command(subcommand)]
  command: Commands,
}

/// Flags shared by every command that decodes a table.
#[derive(Args, Debug, Clone, Default)]
struct MappingArgs {
  /// Fail on table keys that no field uses
  #[arg(long, global = true)]
  strict: bool,

  /// Fail on functions, threads and userdata instead of skipping them
  #[arg(long, global = true)]
  strict_values: bool,

  /// Match keys exactly instead of converting snake_case to UpperCamelCase
  #[arg(long, global = true)]
  exact_keys: bool,

  /// Drop entries holding false, "", 0 or 0.0 before decoding
  #[arg(long, global = true)]
  suppress_zero: bool,
}

impl MappingArgs {
  fn options(&self) -> Options {
    let mut options = Options::default()
      .with_error_on_unused_keys(self.strict)
      .with_error_on_unsupported_values(self.strict_values);
    if self.exact_keys {
      options = options.with_name_translator(NameTranslator::identity());
    }
    if self.suppress_zero {
      options = options.with_zero_values(ZeroValues::Suppress);
    }
    options
  }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
  #[default]
  Yaml,
  Json,
}

#[derive(Subcommand)]
enum Commands {
  /// Decode a bundle definition and print it
  Bundle {
    /// Path to the Lua script
    file: PathBuf,

    /// Global variable holding the bundle table
    #[arg(short, long, default_value = "bundle")]
    global: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    format: Format,
  },

  /// Decode a person and print "<name> <age>"
  Person {
    /// Path to the Lua script
    file: PathBuf,

    /// Global variable holding the person table
    #[arg(short, long, default_value = "person")]
    global: String,
  },

  /// Print the normalized value of a global as JSON
  Inspect {
    /// Path to the Lua script
    file: PathBuf,

    /// Global variable to inspect
    global: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  let options = cli.mapping.options();
  match cli.command {
    Commands::Bundle { file, global, format } => cmd::cmd_bundle(&file, &global, format, options),
    Commands::Person { file, global } => cmd::cmd_person(&file, &global, options),
    Commands::Inspect { file, global } => cmd::cmd_inspect(&file, &global, options),
  }
}
