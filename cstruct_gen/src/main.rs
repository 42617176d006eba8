use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cstruct_gen::cmds;

#[derive(Parser)]
#[command(name = "cstruct-gen")]
#[command(about = "C-struct codec generator for message schemas", long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /* Generate Rust codecs from schema definitions */
  Codegen {
    /* Input YAML files containing message definitions */
    #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /* Output directory for generated code */
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "generated")]
    output_dir: PathBuf,

    /* Enable verbose output */
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
  },

  /* Analyze message definitions and show computed layouts */
  Analyze {
    /* Input YAML files containing message definitions */
    #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /* Emit the layout report as JSON */
    #[arg(long = "json")]
    json: bool,
  },
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Codegen {
      files,
      output_dir,
      verbose,
    } => {
      cmds::codegen::run(files, output_dir, verbose)?;
    }

    Commands::Analyze { files, json } => {
      cmds::analyze::run(files, json)?;
    }
  }

  Ok(())
}
