/* Shared schema loading and layout resolution for the CLI commands */

use crate::layout::LayoutResolver;
use anyhow::Context;
use cstruct_types::SchemaFile;
use std::path::Path;

/* Load and deserialize one schema file; option decoding happens here too */
pub fn load_schema_file(path: &Path) -> anyhow::Result<SchemaFile> {
  let source = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read schema file {}", path.display()))?;
  let schema: SchemaFile = serde_yml::from_str(&source)
    .with_context(|| format!("failed to decode schema file {}", path.display()))?;
  Ok(schema)
}

/* Resolve every message layout for one schema file */
pub fn resolve_layouts(schema: &SchemaFile, verbose: bool) -> anyhow::Result<LayoutResolver> {
  if verbose {
    println!("[~] Loaded {} message definition(s)", schema.messages.len());
    for msg in &schema.messages {
      println!("  - {}", msg.name);
    }
  }

  let mut resolver = LayoutResolver::new(schema.schema.options.sizeof_word);
  for msg in &schema.messages {
    resolver.add_message(msg.clone());
  }
  resolver
    .resolve_all()
    .context("layout resolution failed")?;

  if verbose {
    println!("[✓] Layout resolution successful");
  }

  Ok(resolver)
}
