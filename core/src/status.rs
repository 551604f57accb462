//! Schema identity and mode flags for the status bar.

use serde::{Deserialize, Serialize};

use crate::engine::SchemaInfo;

pub const ASCII_MODE: &str = "ascii_mode";
pub const FULL_SHAPE: &str = "full_shape";
pub const SIMPLIFICATION: &str = "simplification";
pub const TRADITIONAL: &str = "traditional";
pub const ASCII_PUNCT: &str = "ascii_punct";

/// Boolean session options shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeFlags {
    pub ascii_mode: bool,
    pub full_shape: bool,
    pub simplification: bool,
    pub traditional: bool,
    pub ascii_punct: bool,
}

impl ModeFlags {
    /// Read every flag through `get_option`, keyed by option name.
    pub fn read_with<F>(mut get_option: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        Self {
            ascii_mode: get_option(ASCII_MODE),
            full_shape: get_option(FULL_SHAPE),
            simplification: get_option(SIMPLIFICATION),
            traditional: get_option(TRADITIONAL),
            ascii_punct: get_option(ASCII_PUNCT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub schema_id: String,
    pub schema_name: String,
    pub is_disabled: bool,
    pub is_composing: bool,
    pub ascii_mode: bool,
    pub full_shape: bool,
    pub simplification: bool,
    pub traditional: bool,
    pub ascii_punct: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusProjector;

impl StatusProjector {
    pub fn new() -> Self {
        Self
    }

    pub fn project(
        &self,
        schema: &SchemaInfo,
        disabled: bool,
        composing: bool,
        flags: ModeFlags,
    ) -> Status {
        Status {
            schema_id: schema.schema_id.clone(),
            schema_name: schema.schema_name.clone(),
            is_disabled: disabled,
            is_composing: composing,
            ascii_mode: flags.ascii_mode,
            full_shape: flags.full_shape,
            simplification: flags.simplification,
            traditional: flags.traditional,
            ascii_punct: flags.ascii_punct,
        }
    }
}
