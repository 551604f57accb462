//! Context snapshot for the host UI.
//!
//! A `Context` is what the host polls after every key event: the preedit
//! composition, the visible candidate page and the raw input. It is a plain
//! value with no link back to the engine, and consecutive snapshots are
//! unrelated (no diffing).

use serde::{Deserialize, Serialize};

use crate::candidate::{LabeledCandidate, Page};
use crate::composition::Composition;
use crate::labels::PageLabels;

/// A rendered candidate page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPage {
    pub page_size: usize,
    /// 0-based page index
    pub page_number: usize,
    pub is_last_page: bool,
    /// 0-based, within this page
    pub highlighted_index: usize,
    pub candidates: Vec<LabeledCandidate>,
    pub select_keys: String,
    /// One label per page slot; `page_size` long regardless of how many
    /// candidates the page holds. Slots the schema left unlabeled carry the
    /// numeric fallback; `PageLabels::resolved` tells which ones the schema filled.
    pub labels: Vec<String>,
}

impl MenuPage {
    /// Attach labels to a paginated page.
    pub fn assemble(page: Page, labels: &PageLabels, select_keys: &str) -> Self {
        let candidates = page
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| LabeledCandidate::new(candidate, labels.label_at(i)))
            .collect();
        Self {
            page_size: page.page_size,
            page_number: page.page_number,
            is_last_page: page.is_last_page,
            highlighted_index: page.highlighted_index,
            candidates,
            select_keys: select_keys.to_string(),
            labels: labels.to_vec(),
        }
    }

    /// The highlighted candidate, if the page is long enough to hold it.
    pub fn highlighted(&self) -> Option<&LabeledCandidate> {
        self.candidates.get(self.highlighted_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Menu {
    Page(MenuPage),
    /// The engine has no candidate set to show.
    #[default]
    Empty,
}

impl Menu {
    pub fn is_empty(&self) -> bool {
        matches!(self, Menu::Empty)
    }

    pub fn as_page(&self) -> Option<&MenuPage> {
        match self {
            Menu::Page(page) => Some(page),
            Menu::Empty => None,
        }
    }
}

/// Everything the host needs to draw the current editing state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    pub composition: Composition,
    pub menu: Menu,
    pub raw_input: String,
    pub caret_position: usize,
}

impl Context {
    /// Whether there is anything to draw (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        self.composition.is_active() || !self.menu.is_empty()
    }
}
