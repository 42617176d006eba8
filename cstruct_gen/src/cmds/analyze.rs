/* Analyze command - report computed message sizes and field offsets */

use super::common::{load_schema_file, resolve_layouts};
use anyhow::Context;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct FileReport {
  file: String,
  word_size: u64,
  messages: Vec<MessageReport>,
}

#[derive(Serialize)]
struct MessageReport {
  name: String,
  size: u64,
  fields: Vec<FieldReport>,
}

#[derive(Serialize)]
struct FieldReport {
  name: String,
  offset: u64,
  size: u64,
}

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, json: bool) -> anyhow::Result<()> {
  let mut reports = Vec::new();

  for file in &files {
    let schema = load_schema_file(file)?;
    let resolver = resolve_layouts(&schema, false)
      .with_context(|| format!("in schema file {}", file.display()))?;

    let mut messages = Vec::new();
    for msg in &schema.messages {
      let layout = match resolver.layout(&msg.name) {
        Some(layout) => layout,
        None => continue,
      };
      messages.push(MessageReport {
        name: layout.name.clone(),
        size: layout.size,
        fields: layout
          .fields
          .iter()
          .map(|slot| FieldReport {
            name: slot.name.clone(),
            offset: slot.offset,
            size: slot.field_size,
          })
          .collect(),
      });
    }

    reports.push(FileReport {
      file: file.display().to_string(),
      word_size: resolver.word_size(),
      messages,
    });
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&reports)?);
    return Ok(());
  }

  for report in &reports {
    println!("{} (word size {})", report.file, report.word_size);
    for msg in &report.messages {
      println!("  {} - {} bytes", msg.name, msg.size);
      for field in &msg.fields {
        println!("    {:>4}  {} ({} bytes)", field.offset, field.name, field.size);
      }
    }
  }

  Ok(())
}
