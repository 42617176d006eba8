use serde::de::{Deserializer, Error as DeError};
use serde_derive::{Deserialize, Serialize};

/* Alignment word size for one schema file */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordSize {
    One,
    Two,
    #[default]
    Four,
    Eight,
}

impl WordSize {
    pub fn bytes(self) -> u64 {
        match self {
            WordSize::One => 1,
            WordSize::Two => 2,
            WordSize::Four => 4,
            WordSize::Eight => 8,
        }
    }
}

impl serde::Serialize for WordSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bytes())
    }
}

impl<'de> serde::Deserialize<'de> for WordSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u64::deserialize(deserializer)? {
            1 => Ok(WordSize::One),
            2 => Ok(WordSize::Two),
            4 => Ok(WordSize::Four),
            8 => Ok(WordSize::Eight),
            other => Err(DeError::custom(format!(
                "invalid sizeof-word {other}: expected 1, 2, 4, or 8"
            ))),
        }
    }
}

/* Storage narrowing for 32-bit numeric fields */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitWidth {
    #[serde(rename = "8bit")]
    Eight,
    #[serde(rename = "16bit")]
    Sixteen,
}

impl BitWidth {
    pub fn bytes(self) -> u64 {
        match self {
            BitWidth::Eight => 1,
            BitWidth::Sixteen => 2,
        }
    }
}

/* File-level options */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FileOptions {
    /* Alignment unit applied to every message in the file */
    #[serde(default)]
    pub sizeof_word: WordSize,
}

/* Field-level options */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FieldOptions {
    /* Element count for repeated fields and byte blobs */
    #[serde(default)]
    pub length: Option<u64>,

    /* Narrowed storage width for 32-bit numeric kinds */
    #[serde(default)]
    pub bits: Option<BitWidth>,

    /* Weak marker delivered by the parser; weak fields are rejected */
    #[serde(default)]
    pub weak: bool,
}
