/* Codegen command - generate Rust codecs from schema definitions */

use super::common::{load_schema_file, resolve_layouts};
use crate::codegen::rust::{RustCodeGenerator, RustCodeGeneratorOptions};
use anyhow::Context;
use std::path::PathBuf;

/* Execute the codegen command */
pub fn run(files: Vec<PathBuf>, output_dir: PathBuf, verbose: bool) -> anyhow::Result<()> {
  if verbose {
    println!("cstruct-gen - C-struct codec generation");
    println!("=======================================\n");
    println!("[~] Configuration:");
    println!("  Output directory: {}", output_dir.display());
    println!("  Input files: {}", files.len());
    for file in &files {
      println!("    - {}", file.display());
    }
    println!();
  }

  std::fs::create_dir_all(&output_dir)
    .with_context(|| format!("failed to create {}", output_dir.display()))?;

  for file in &files {
    let schema = load_schema_file(file)?;

    if verbose {
      println!(
        "[~] Generating code for {} (word size {})",
        file.display(),
        schema.schema.options.sizeof_word.bytes()
      );
    }

    let resolver = resolve_layouts(&schema, verbose)
      .with_context(|| format!("in schema file {}", file.display()))?;

    /* The whole unit is built in memory first; nothing is written for a
       failed file */
    let generator = RustCodeGenerator::new(RustCodeGeneratorOptions::default());
    let generated = generator.emit_code(&schema.messages, &resolver);

    let stem = file
      .file_stem()
      .map(|s| s.to_string_lossy().to_string())
      .unwrap_or_else(|| "schema".to_string());
    let out_path = output_dir.join(format!("{}_cstruct.rs", stem));
    std::fs::write(&out_path, &generated)
      .with_context(|| format!("failed to write {}", out_path.display()))?;

    if verbose {
      println!("[✓] Wrote {}", out_path.display());
    }
  }

  println!("[✓] Code generation complete!");
  Ok(())
}
