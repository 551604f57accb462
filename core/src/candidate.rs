//! Candidate types and page arithmetic.
//!
//! This module provides:
//! - `Candidate`: a single conversion option as produced by the engine
//! - `LabeledCandidate`: a candidate paired with its on-screen selection label
//! - `CandidateSource`: anything that can cut a page-sized window of candidates
//! - `CandidatePager`: turns a recorded selection index into a `Page`

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{ProtoError, Result};

/// A single text candidate with an optional comment (may be empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    #[serde(default)]
    pub comment: String,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Candidate {
            text: text.into(),
            comment: String::new(),
        }
    }

    pub fn with_comment<T: Into<String>, C: Into<String>>(text: T, comment: C) -> Self {
        Candidate {
            text: text.into(),
            comment: comment.into(),
        }
    }
}

/// A candidate as rendered on a page: text, comment and selection label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCandidate {
    pub text: String,
    pub comment: String,
    pub label: String,
}

impl LabeledCandidate {
    pub fn new(candidate: Candidate, label: String) -> Self {
        Self {
            text: candidate.text,
            comment: candidate.comment,
            label,
        }
    }
}

/// One page-sized window cut by a `CandidateSource`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateWindow {
    pub candidates: Vec<Candidate>,
    /// Whether no candidates follow this window.
    pub is_last_page: bool,
}

/// Something that can produce the candidates of page `page_number`.
///
/// Returns `None` when the window starts past the end of the list (or the
/// list is empty). The source decides `is_last_page`; the pager never
/// recomputes it.
pub trait CandidateSource {
    fn window(&self, page_size: usize, page_number: usize) -> Option<CandidateWindow>;
}

impl CandidateSource for [Candidate] {
    fn window(&self, page_size: usize, page_number: usize) -> Option<CandidateWindow> {
        let range = page_range(self.len(), page_size, page_number)?;
        let is_last_page = range.end >= self.len();
        Some(CandidateWindow {
            candidates: self[range].to_vec(),
            is_last_page,
        })
    }
}

impl CandidateSource for Vec<Candidate> {
    fn window(&self, page_size: usize, page_number: usize) -> Option<CandidateWindow> {
        self.as_slice().window(page_size, page_number)
    }
}

/// Index range of page `page_number` within a list of `len` items.
///
/// `None` if the page starts at or past `len`.
pub fn page_range(len: usize, page_size: usize, page_number: usize) -> Option<Range<usize>> {
    if page_size == 0 {
        return None;
    }
    let start = page_number.checked_mul(page_size)?;
    if start >= len {
        return None;
    }
    let end = start.saturating_add(page_size).min(len);
    Some(start..end)
}

/// A resolved page of candidates, before labels are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page_size: usize,
    /// 0-based page index
    pub page_number: usize,
    /// 0-based index of the highlighted candidate within this page
    pub highlighted_index: usize,
    pub is_last_page: bool,
    pub candidates: Vec<Candidate>,
}

/// Splits a candidate list into fixed-size pages around a selection index.
///
/// The page size is validated once at construction, so `paginate` itself
/// cannot fail; a window miss is reported as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePager {
    page_size: usize,
}

impl CandidatePager {
    /// Create a pager. A zero page size is rejected.
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ProtoError::InvalidPageSize(page_size));
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page number that contains `selected_index`.
    pub fn page_number(&self, selected_index: usize) -> usize {
        selected_index / self.page_size
    }

    /// Position of `selected_index` within its page.
    pub fn highlighted_index(&self, selected_index: usize) -> usize {
        selected_index % self.page_size
    }

    /// Build the page containing `selected_index`.
    ///
    /// Returns `None` when the source has no window for that page, e.g. the
    /// list is empty or the selection lies past its end.
    pub fn paginate<S>(&self, source: &S, selected_index: usize) -> Option<Page>
    where
        S: CandidateSource + ?Sized,
    {
        let page_number = self.page_number(selected_index);
        let Some(window) = source.window(self.page_size, page_number) else {
            tracing::debug!(
                page_size = self.page_size,
                page_number,
                selected_index,
                "no candidate window for page"
            );
            return None;
        };
        Some(Page {
            page_size: self.page_size,
            page_number,
            highlighted_index: self.highlighted_index(selected_index),
            is_last_page: window.is_last_page,
            candidates: window.candidates,
        })
    }
}
