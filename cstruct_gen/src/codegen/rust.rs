use crate::codegen::rust_gen;
use crate::layout::LayoutResolver;
use cstruct_types::MessageDef;

pub struct RustCodeGenerator {
  options: RustCodeGeneratorOptions,
}

pub struct RustCodeGeneratorOptions {
  pub emit_type_definitions: bool,
  pub emit_methods: bool,
}

impl Default for RustCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      emit_type_definitions: true,
      emit_methods: true,
    }
  }
}

impl RustCodeGenerator {
  pub fn new(options: RustCodeGeneratorOptions) -> Self {
    Self { options }
  }

  /* Emit one source unit covering every message, in schema order */
  pub fn emit_code(&self, messages: &[MessageDef], resolver: &LayoutResolver) -> String {
    let mut output = String::new();
    output.push_str("// Generated by cstruct-gen. Do not edit.\n\n");

    for msg in messages {
      let layout = match resolver.layout(&msg.name) {
        Some(layout) => layout,
        None => continue,
      };

      if self.options.emit_type_definitions {
        output.push_str(&rust_gen::emit_struct(msg));
        output.push('\n');
      }
      if self.options.emit_methods {
        output.push_str(&rust_gen::emit_impl(msg, layout));
        output.push('\n');
      }
    }

    output
  }
}
