//! Selection labels for a candidate page.
//!
//! Labels come from three places, first match wins:
//!
//! 1. the schema's alternative label list, if it covers the whole page
//! 2. the schema's select keys, one character per slot
//! 3. the 1-based position of the candidate on the page
//!
//! Tier 3 is applied per slot when rendering, so a short select-key string
//! leaves the trailing slots to the numeric fallback.

/// Which tier produced the labels of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    Explicit,
    SelectKeys,
    Numeric,
}

/// Labels resolved for one page; always `page_size` slots long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    slots: Vec<Option<String>>,
    source: LabelSource,
}

impl PageLabels {
    pub fn page_size(&self) -> usize {
        self.slots.len()
    }

    pub fn source(&self) -> LabelSource {
        self.source
    }

    /// The label resolved by tiers 1–2 for `index`, if any.
    pub fn resolved(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    /// The label shown for the candidate at `index`, falling back to its
    /// 1-based position.
    pub fn label_at(&self, index: usize) -> String {
        match self.resolved(index) {
            Some(label) => label.to_string(),
            None => (index + 1).to_string(),
        }
    }

    /// All `page_size` labels with the numeric fallback applied.
    pub fn to_vec(&self) -> Vec<String> {
        (0..self.slots.len()).map(|i| self.label_at(i)).collect()
    }
}

/// Resolves per-page selection labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver;

impl LabelResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        page_size: usize,
        explicit_labels: Option<&[String]>,
        select_keys: &str,
    ) -> PageLabels {
        if let Some(explicit) = explicit_labels.filter(|labels| labels.len() >= page_size) {
            tracing::trace!(page_size, "using alternative select labels");
            return PageLabels {
                slots: explicit[..page_size].iter().cloned().map(Some).collect(),
                source: LabelSource::Explicit,
            };
        }

        if !select_keys.is_empty() {
            let mut slots: Vec<Option<String>> = select_keys
                .chars()
                .take(page_size)
                .map(|key| Some(key.to_string()))
                .collect();
            slots.resize(page_size, None);
            tracing::trace!(page_size, select_keys, "using select keys as labels");
            return PageLabels {
                slots,
                source: LabelSource::SelectKeys,
            };
        }

        PageLabels {
            slots: vec![None; page_size],
            source: LabelSource::Numeric,
        }
    }
}
