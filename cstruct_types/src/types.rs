use crate::options::{FieldOptions, FileOptions};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Bool,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bytes,
    Message(String),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDef {
    pub name: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub kind: FieldKind,
    #[serde(default)]
    pub repeated: bool,
    #[serde(default)]
    pub options: FieldOptions,
}

impl FieldDef {
    /* True when the field occupies length-many elements: repeated fields and byte blobs */
    pub fn is_array(&self) -> bool {
        self.repeated || matches!(self.kind, FieldKind::Bytes)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/* Metadata for a schema file */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaMetadata {
    /* Package identifier (e.g., "sensors.telemetry") */
    pub package: String,

    /* File description */
    #[serde(default)]
    pub description: Option<String>,

    /* Optional configuration options */
    #[serde(default)]
    pub options: FileOptions,
}

/* Complete schema file structure with metadata and message definitions */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaFile {
    /* Schema file metadata */
    pub schema: SchemaMetadata,

    /* Message definitions */
    #[serde(default)]
    pub messages: Vec<MessageDef>,
}
