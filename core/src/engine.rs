// core/src/engine.rs
//
// The input engine as seen from the projection layer. Key processing,
// ranking and schema storage live behind this trait; projections only read.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::candidate::{Candidate, CandidateSource, CandidateWindow};
use crate::catalog::SchemaItem;
use crate::composition::Preedit;

/// Opaque engine session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the projection needs to know about the schema bound to a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaInfo {
    pub schema_id: String,
    pub schema_name: String,
    /// `None` when the schema leaves the page size unspecified
    pub page_size: Option<usize>,
    pub select_keys: String,
    /// Value of `menu/alternative_select_labels`, if configured
    pub alternative_select_labels: Option<Vec<String>>,
}

impl SchemaInfo {
    pub fn new<I: Into<String>, N: Into<String>>(schema_id: I, schema_name: N) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_name: schema_name.into(),
            ..Self::default()
        }
    }
}

/// Read-only view of a session's editing context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextState {
    pub is_composing: bool,
    pub preedit: Option<Preedit>,
    /// Text the engine would commit for the current composition
    pub commit_preview: String,
    pub raw_input: String,
    pub caret_pos: usize,
    /// Selected index of the last segment's menu; `None` when there is no menu
    pub selected_index: Option<usize>,
}

/// Engine operations consumed by the projection layer.
///
/// Lookups against unknown sessions return `None`/`false`/empty rather than
/// failing; callers treat that as "not ready".
pub trait InputEngine {
    fn create_session(&self) -> SessionId;

    fn destroy_session(&self, session: SessionId) -> bool;

    fn session_exists(&self, session: SessionId) -> bool;

    /// Schema bound to the session, if any.
    fn schema(&self, session: SessionId) -> Option<SchemaInfo>;

    /// Editing context of the session, if the session has one.
    fn context(&self, session: SessionId) -> Option<ContextState>;

    fn option(&self, session: SessionId, name: &str) -> bool;

    fn set_option(&self, session: SessionId, name: &str, value: bool);

    /// Window of the current menu for `(page_size, page_number)`.
    fn candidate_window(
        &self,
        session: SessionId,
        page_size: usize,
        page_number: usize,
    ) -> Option<CandidateWindow>;

    /// Up to `limit` candidates of the current menu starting at `start`.
    fn candidates_from(&self, session: SessionId, start: usize, limit: usize) -> Vec<Candidate>;

    /// Take the pending commit text, leaving none behind.
    ///
    /// Not idempotent: a second call without new input returns `None`.
    fn drain_commit(&self, session: SessionId) -> Option<String>;

    fn select_schema(&self, session: SessionId, schema_id: &str) -> bool;

    /// Schemas the engine has deployed, independent of the switcher settings.
    fn schema_list(&self) -> Vec<SchemaItem>;

    fn set_caret_pos(&self, session: SessionId, caret_pos: usize);

    /// Move the menu selection one page back or forward.
    ///
    /// Returns false when there is no menu or no page in that direction.
    fn change_page(&self, session: SessionId, backward: bool) -> bool;

    /// Commit the candidate at `index` of the whole menu.
    fn select_candidate(&self, session: SessionId, index: usize) -> bool;

    /// Commit the candidate at `index` of the page holding the selection.
    fn select_candidate_on_current_page(&self, session: SessionId, index: usize) -> bool;

    /// Remove the candidate at `index` of the whole menu.
    fn forget_candidate(&self, session: SessionId, index: usize) -> bool;

    /// Remove the candidate at `index` of the page holding the selection.
    fn delete_candidate_on_current_page(&self, session: SessionId, index: usize) -> bool;

    /// Commit the current composition as previewed.
    fn commit_composition(&self, session: SessionId) -> bool;

    /// Drop the current composition without committing.
    fn clear_composition(&self, session: SessionId);

    /// Whether the engine as a whole is disabled (e.g. during maintenance).
    fn is_disabled(&self) -> bool;
}

/// Adapts a session's menu to `CandidateSource` so the pager can cut pages
/// straight from the engine.
pub struct SessionCandidates<'a, E: ?Sized> {
    engine: &'a E,
    session: SessionId,
}

impl<'a, E: InputEngine + ?Sized> SessionCandidates<'a, E> {
    pub fn new(engine: &'a E, session: SessionId) -> Self {
        Self { engine, session }
    }
}

impl<E: InputEngine + ?Sized> CandidateSource for SessionCandidates<'_, E> {
    fn window(&self, page_size: usize, page_number: usize) -> Option<CandidateWindow> {
        self.engine.candidate_window(self.session, page_size, page_number)
    }
}
