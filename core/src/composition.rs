//! Preedit composition as shown to the host.
//!
//! The engine keeps a `Preedit` (text, caret and selection span) for every
//! session. `CompositionProjector` turns it into a `Composition`, which is
//! either `Active` with every field populated or `Inactive`.

use serde::{Deserialize, Serialize};

/// The engine's raw preedit for a session.
///
/// Offsets are copied through unchanged; they are in whatever unit the
/// engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preedit {
    pub text: String,
    pub caret_pos: usize,
    pub sel_start: usize,
    pub sel_end: usize,
}

impl Preedit {
    /// Create a preedit with the caret at the end and an empty selection.
    ///
    /// Offsets are byte offsets into `text`, the unit the engine reports
    /// them in; only `ActiveComposition::length` is counted in UTF-16.
    pub fn from_text<T: Into<String>>(text: T) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            caret_pos: end,
            sel_start: end,
            sel_end: end,
        }
    }
}

/// Populated composition fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveComposition {
    /// Preedit length in UTF-16 code units
    pub length: usize,
    pub caret_position: usize,
    pub selection_start: usize,
    pub selection_end: usize,
    pub preedit_text: String,
    /// Text that would be committed if the composition were confirmed now
    pub commit_text_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Composition {
    Active(ActiveComposition),
    #[default]
    Inactive,
}

impl Composition {
    pub fn is_active(&self) -> bool {
        matches!(self, Composition::Active(_))
    }

    pub fn as_active(&self) -> Option<&ActiveComposition> {
        match self {
            Composition::Active(active) => Some(active),
            Composition::Inactive => None,
        }
    }
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionProjector;

impl CompositionProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project the session's preedit.
    ///
    /// Anything but a composing context yields `Inactive`, whatever the
    /// preedit holds. A composing context without a preedit projects as an
    /// empty active composition.
    pub fn project(
        &self,
        is_composing: bool,
        preedit: Option<&Preedit>,
        commit_preview: &str,
    ) -> Composition {
        if !is_composing {
            return Composition::Inactive;
        }
        let empty = Preedit::default();
        let preedit = preedit.unwrap_or(&empty);
        Composition::Active(ActiveComposition {
            length: utf16_len(&preedit.text),
            caret_position: preedit.caret_pos,
            selection_start: preedit.sel_start,
            selection_end: preedit.sel_end,
            preedit_text: preedit.text.clone(),
            commit_text_preview: commit_preview.to_string(),
        })
    }
}
