//! In-memory `InputEngine`.
//!
//! `MemoryEngine` holds exactly the state the projection layer reads: a
//! schema registry, per-session composition and menu state, option values
//! and a commit mailbox. It does no key processing or ranking; tests and
//! tools set the state directly with `update_session` or load it from a TOML
//! fixture.
//!
//! All state sits behind one `RwLock`, so a commit drain and a concurrent
//! `post_commit` never interleave and pending text is delivered at most once.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::candidate::{Candidate, CandidateSource, CandidateWindow};
use crate::catalog::SchemaItem;
use crate::commit::CommitMailbox;
use crate::composition::Preedit;
use crate::engine::{ContextState, InputEngine, SchemaInfo, SessionId};

/// Page size the engine pages by when the bound schema sets none.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Mutable state of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Id of the bound schema
    pub schema_id: Option<String>,
    /// Whether the engine has built a context for this session yet
    pub has_context: bool,
    pub composing: bool,
    pub preedit: Option<Preedit>,
    pub commit_preview: String,
    pub raw_input: String,
    pub caret_pos: usize,
    pub options: HashMap<String, bool>,
    /// Candidates of the current menu; no menu when empty
    pub candidates: Vec<Candidate>,
    pub selected_index: usize,
    pub commit: CommitMailbox,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            schema_id: None,
            has_context: true,
            composing: false,
            preedit: None,
            commit_preview: String::new(),
            raw_input: String::new(),
            caret_pos: 0,
            options: HashMap::new(),
            candidates: Vec::new(),
            selected_index: 0,
            commit: CommitMailbox::new(),
        }
    }
}

impl SessionState {
    fn context_state(&self) -> ContextState {
        ContextState {
            is_composing: self.composing,
            preedit: self.preedit.clone(),
            commit_preview: self.commit_preview.clone(),
            raw_input: self.raw_input.clone(),
            caret_pos: self.caret_pos,
            selected_index: (!self.candidates.is_empty()).then_some(self.selected_index),
        }
    }

    fn page_start(&self, page_size: usize) -> usize {
        self.selected_index / page_size * page_size
    }

    fn change_page(&mut self, page_size: usize, backward: bool) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        if backward {
            if self.selected_index < page_size {
                return false;
            }
            self.selected_index -= page_size;
        } else {
            if self.page_start(page_size) + page_size >= self.candidates.len() {
                return false;
            }
            self.selected_index = (self.selected_index + page_size).min(self.candidates.len() - 1);
        }
        true
    }

    fn select_candidate(&mut self, index: usize) -> bool {
        let Some(candidate) = self.candidates.get(index) else {
            return false;
        };
        let text = candidate.text.clone();
        self.commit.post(&text);
        self.clear_composition();
        true
    }

    fn forget_candidate(&mut self, index: usize) -> bool {
        if index >= self.candidates.len() {
            return false;
        }
        self.candidates.remove(index);
        self.selected_index = self
            .selected_index
            .min(self.candidates.len().saturating_sub(1));
        true
    }

    /// Commit the preview, or the raw input when there is no preview.
    fn commit_composition(&mut self) -> bool {
        if !self.composing {
            return false;
        }
        let text = if self.commit_preview.is_empty() {
            self.raw_input.clone()
        } else {
            self.commit_preview.clone()
        };
        self.commit.post(&text);
        self.clear_composition();
        true
    }

    fn clear_composition(&mut self) {
        self.composing = false;
        self.preedit = None;
        self.commit_preview.clear();
        self.raw_input.clear();
        self.caret_pos = 0;
        self.candidates.clear();
        self.selected_index = 0;
    }
}

#[derive(Debug, Default)]
struct Inner {
    schemas: Vec<SchemaInfo>,
    sessions: HashMap<SessionId, SessionState>,
    next_session: u64,
    disabled: bool,
}

impl Inner {
    fn schema(&self, schema_id: &str) -> Option<&SchemaInfo> {
        self.schemas.iter().find(|s| s.schema_id == schema_id)
    }

    fn page_size(&self, session: SessionId) -> Option<usize> {
        let state = self.sessions.get(&session)?;
        Some(
            state
                .schema_id
                .as_deref()
                .and_then(|id| self.schema(id))
                .and_then(|s| s.page_size)
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Run `f` with the session's state and its page size.
    fn with_page<F>(&mut self, session: SessionId, f: F) -> bool
    where
        F: FnOnce(&mut SessionState, usize) -> bool,
    {
        let Some(page_size) = self.page_size(session) else {
            return false;
        };
        match self.sessions.get_mut(&session) {
            Some(state) => f(state, page_size),
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryEngine {
    inner: RwLock<Inner>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a schema, replacing any registered schema with the same id.
    pub fn register_schema(&self, schema: SchemaInfo) {
        let mut inner = self.write();
        match inner.schemas.iter_mut().find(|s| s.schema_id == schema.schema_id) {
            Some(existing) => *existing = schema,
            None => inner.schemas.push(schema),
        }
    }

    pub fn schemas(&self) -> Vec<SchemaInfo> {
        self.read().schemas.clone()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.write().disabled = disabled;
    }

    /// Mutate a session's state in place. Returns false for unknown sessions.
    pub fn update_session<F>(&self, session: SessionId, f: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        match self.write().sessions.get_mut(&session) {
            Some(state) => {
                f(state);
                true
            }
            None => false,
        }
    }

    /// Append text to the session's pending commit.
    pub fn post_commit(&self, session: SessionId, text: &str) -> bool {
        self.update_session(session, |s| s.commit.post(text))
    }
}

impl InputEngine for MemoryEngine {
    fn create_session(&self) -> SessionId {
        let mut inner = self.write();
        inner.next_session += 1;
        let id = SessionId(inner.next_session);
        inner.sessions.insert(id, SessionState::default());
        tracing::debug!(session = %id, "created session");
        id
    }

    fn destroy_session(&self, session: SessionId) -> bool {
        self.write().sessions.remove(&session).is_some()
    }

    fn session_exists(&self, session: SessionId) -> bool {
        self.read().sessions.contains_key(&session)
    }

    fn schema(&self, session: SessionId) -> Option<SchemaInfo> {
        let inner = self.read();
        let schema_id = inner.sessions.get(&session)?.schema_id.as_deref()?;
        inner.schema(schema_id).cloned()
    }

    fn context(&self, session: SessionId) -> Option<ContextState> {
        let inner = self.read();
        let state = inner.sessions.get(&session)?;
        state.has_context.then(|| state.context_state())
    }

    fn option(&self, session: SessionId, name: &str) -> bool {
        self.read()
            .sessions
            .get(&session)
            .and_then(|s| s.options.get(name).copied())
            .unwrap_or(false)
    }

    fn set_option(&self, session: SessionId, name: &str, value: bool) {
        self.update_session(session, |s| {
            s.options.insert(name.to_string(), value);
        });
    }

    fn candidate_window(
        &self,
        session: SessionId,
        page_size: usize,
        page_number: usize,
    ) -> Option<CandidateWindow> {
        let inner = self.read();
        inner
            .sessions
            .get(&session)?
            .candidates
            .window(page_size, page_number)
    }

    fn candidates_from(&self, session: SessionId, start: usize, limit: usize) -> Vec<Candidate> {
        self.read()
            .sessions
            .get(&session)
            .map(|s| s.candidates.iter().skip(start).take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn drain_commit(&self, session: SessionId) -> Option<String> {
        self.write().sessions.get_mut(&session)?.commit.drain()
    }

    fn select_schema(&self, session: SessionId, schema_id: &str) -> bool {
        let mut inner = self.write();
        if inner.schema(schema_id).is_none() {
            tracing::warn!(schema_id, "select_schema: unknown schema");
            return false;
        }
        match inner.sessions.get_mut(&session) {
            Some(state) => {
                state.schema_id = Some(schema_id.to_string());
                true
            }
            None => false,
        }
    }

    fn schema_list(&self) -> Vec<SchemaItem> {
        self.schemas()
            .into_iter()
            .map(|s| SchemaItem::new(s.schema_id, s.schema_name))
            .collect()
    }

    fn set_caret_pos(&self, session: SessionId, caret_pos: usize) {
        self.update_session(session, |s| {
            s.caret_pos = caret_pos.min(s.raw_input.len());
        });
    }

    fn change_page(&self, session: SessionId, backward: bool) -> bool {
        self.write()
            .with_page(session, |s, page_size| s.change_page(page_size, backward))
    }

    fn select_candidate(&self, session: SessionId, index: usize) -> bool {
        self.write()
            .sessions
            .get_mut(&session)
            .is_some_and(|s| s.select_candidate(index))
    }

    fn select_candidate_on_current_page(&self, session: SessionId, index: usize) -> bool {
        self.write().with_page(session, |s, page_size| {
            index < page_size && s.select_candidate(s.page_start(page_size) + index)
        })
    }

    fn forget_candidate(&self, session: SessionId, index: usize) -> bool {
        self.write()
            .sessions
            .get_mut(&session)
            .is_some_and(|s| s.forget_candidate(index))
    }

    fn delete_candidate_on_current_page(&self, session: SessionId, index: usize) -> bool {
        self.write().with_page(session, |s, page_size| {
            index < page_size && s.forget_candidate(s.page_start(page_size) + index)
        })
    }

    fn commit_composition(&self, session: SessionId) -> bool {
        self.write()
            .sessions
            .get_mut(&session)
            .is_some_and(|s| s.commit_composition())
    }

    fn clear_composition(&self, session: SessionId) {
        self.update_session(session, SessionState::clear_composition);
    }

    fn is_disabled(&self) -> bool {
        self.read().disabled
    }
}

/// Session section of an engine fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFixture {
    pub schema: Option<String>,
    pub composing: bool,
    pub preedit: Option<Preedit>,
    pub commit_preview: String,
    pub raw_input: String,
    pub caret_pos: usize,
    pub options: HashMap<String, bool>,
    pub candidates: Vec<Candidate>,
    pub selected_index: usize,
    /// Pending commit text
    pub commit: String,
}

/// TOML description of an engine with one session, used by tools and tests.
///
/// ```toml
/// [[schemas]]
/// schema_id = "luna_pinyin"
/// schema_name = "朙月拼音"
/// page_size = 5
/// select_keys = "asdfg"
///
/// [session]
/// schema = "luna_pinyin"
/// composing = true
/// raw_input = "ni"
/// candidates = [{ text = "你" }, { text = "尼" }]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineFixture {
    pub disabled: bool,
    pub schemas: Vec<SchemaInfo>,
    pub session: SessionFixture,
}

impl EngineFixture {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("parse engine fixture")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read fixture {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Build the engine and its one session.
    pub fn build(&self) -> anyhow::Result<(MemoryEngine, SessionId)> {
        let engine = MemoryEngine::new();
        for schema in &self.schemas {
            engine.register_schema(schema.clone());
        }
        engine.set_disabled(self.disabled);

        let session = engine.create_session();
        if let Some(schema_id) = &self.session.schema {
            if !engine.select_schema(session, schema_id) {
                anyhow::bail!("fixture session references unknown schema '{}'", schema_id);
            }
        }

        let fixture = self.session.clone();
        engine.update_session(session, |s| {
            s.composing = fixture.composing;
            s.preedit = fixture.preedit;
            s.commit_preview = fixture.commit_preview;
            s.raw_input = fixture.raw_input;
            s.caret_pos = fixture.caret_pos;
            s.options = fixture.options;
            s.candidates = fixture.candidates;
            s.selected_index = fixture.selected_index;
            s.commit.post(&fixture.commit);
        });
        Ok((engine, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_distinct() {
        let engine = MemoryEngine::new();
        let a = engine.create_session();
        let b = engine.create_session();
        assert_ne!(a, b);
        assert!(engine.session_exists(a));

        assert!(engine.destroy_session(a));
        assert!(!engine.session_exists(a));
        assert!(!engine.destroy_session(a));
        assert!(engine.session_exists(b));
    }

    #[test]
    fn test_select_unknown_schema_fails() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        assert!(!engine.select_schema(session, "nope"));
        assert!(engine.schema(session).is_none());
    }

    #[test]
    fn test_menu_present_only_with_candidates() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        assert_eq!(engine.context(session).unwrap().selected_index, None);

        engine.update_session(session, |s| {
            s.candidates = vec![Candidate::new("你"), Candidate::new("尼")];
            s.selected_index = 1;
        });
        assert_eq!(engine.context(session).unwrap().selected_index, Some(1));
    }

    #[test]
    fn test_context_can_be_absent() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        engine.update_session(session, |s| s.has_context = false);
        assert!(engine.context(session).is_none());
    }

    #[test]
    fn test_candidates_from_is_bounded() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        engine.update_session(session, |s| {
            s.candidates = (0..10).map(|i| Candidate::new(i.to_string())).collect();
        });

        let listed = engine.candidates_from(session, 8, 5);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].text, "8");
        assert!(engine.candidates_from(session, 20, 5).is_empty());
        assert!(engine.candidates_from(SessionId(99), 0, 5).is_empty());
    }

    #[test]
    fn test_fixture_builds_session() {
        let fixture = EngineFixture::from_toml_str(
            r#"
            [[schemas]]
            schema_id = "luna_pinyin"
            schema_name = "朙月拼音"
            page_size = 5

            [session]
            schema = "luna_pinyin"
            composing = true
            raw_input = "ni"
            commit = "你好"
            candidates = [{ text = "你", comment = "ni" }, { text = "尼" }]

            [session.options]
            ascii_mode = true
            "#,
        )
        .unwrap();
        let (engine, session) = fixture.build().unwrap();

        assert_eq!(engine.schema(session).unwrap().page_size, Some(5));
        assert!(engine.option(session, "ascii_mode"));
        let ctx = engine.context(session).unwrap();
        assert!(ctx.is_composing);
        assert_eq!(ctx.raw_input, "ni");
        assert_eq!(engine.drain_commit(session).as_deref(), Some("你好"));
    }

    fn paged_engine(count: usize) -> (MemoryEngine, SessionId) {
        let engine = MemoryEngine::new();
        let mut schema = SchemaInfo::new("luna_pinyin", "朙月拼音");
        schema.page_size = Some(3);
        engine.register_schema(schema);
        let session = engine.create_session();
        assert!(engine.select_schema(session, "luna_pinyin"));
        engine.update_session(session, |s| {
            s.composing = true;
            s.raw_input = "hao".to_string();
            s.commit_preview = "好".to_string();
            s.candidates = (0..count).map(|i| Candidate::new(format!("候选{}", i))).collect();
        });
        (engine, session)
    }

    fn selected(engine: &MemoryEngine, session: SessionId) -> Option<usize> {
        engine.context(session).unwrap().selected_index
    }

    #[test]
    fn test_change_page() {
        let (engine, session) = paged_engine(8);
        engine.update_session(session, |s| s.selected_index = 1);

        assert!(!engine.change_page(session, true));
        assert!(engine.change_page(session, false));
        assert_eq!(selected(&engine, session), Some(4));
        // Last page is short; the selection clamps to the last candidate.
        assert!(engine.change_page(session, false));
        assert_eq!(selected(&engine, session), Some(7));
        assert!(!engine.change_page(session, false));

        assert!(engine.change_page(session, true));
        assert_eq!(selected(&engine, session), Some(4));
        assert!(engine.change_page(session, true));
        assert_eq!(selected(&engine, session), Some(1));
    }

    #[test]
    fn test_change_page_without_menu() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        assert!(!engine.change_page(session, false));
        assert!(!engine.change_page(SessionId(99), false));
    }

    #[test]
    fn test_change_page_uses_default_page_size() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        engine.update_session(session, |s| {
            s.candidates = (0..12).map(|i| Candidate::new(i.to_string())).collect();
        });
        assert!(engine.change_page(session, false));
        assert_eq!(selected(&engine, session), Some(DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_select_candidate_commits_and_clears() {
        let (engine, session) = paged_engine(8);
        assert!(!engine.select_candidate(session, 8));
        assert!(engine.select_candidate(session, 2));

        let ctx = engine.context(session).unwrap();
        assert!(!ctx.is_composing);
        assert_eq!(ctx.selected_index, None);
        assert!(ctx.raw_input.is_empty());
        assert_eq!(engine.drain_commit(session).as_deref(), Some("候选2"));
    }

    #[test]
    fn test_select_candidate_on_current_page() {
        let (engine, session) = paged_engine(8);
        engine.update_session(session, |s| s.selected_index = 4);

        assert!(!engine.select_candidate_on_current_page(session, 3));
        assert!(engine.select_candidate_on_current_page(session, 2));
        assert_eq!(engine.drain_commit(session).as_deref(), Some("候选5"));
    }

    #[test]
    fn test_select_past_short_last_page_fails() {
        let (engine, session) = paged_engine(8);
        engine.update_session(session, |s| s.selected_index = 7);
        assert!(!engine.select_candidate_on_current_page(session, 2));
        assert!(engine.drain_commit(session).is_none());
    }

    #[test]
    fn test_forget_candidate() {
        let (engine, session) = paged_engine(4);
        engine.update_session(session, |s| s.selected_index = 3);

        assert!(engine.forget_candidate(session, 3));
        assert_eq!(selected(&engine, session), Some(2));
        assert!(!engine.forget_candidate(session, 3));

        assert!(engine.delete_candidate_on_current_page(session, 0));
        let texts: Vec<String> = engine
            .candidates_from(session, 0, 10)
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["候选1", "候选2"]);
        assert!(engine.drain_commit(session).is_none());
    }

    #[test]
    fn test_commit_composition() {
        let (engine, session) = paged_engine(3);
        assert!(engine.commit_composition(session));
        assert_eq!(engine.drain_commit(session).as_deref(), Some("好"));
        assert!(!engine.context(session).unwrap().is_composing);

        // Nothing left to commit.
        assert!(!engine.commit_composition(session));
    }

    #[test]
    fn test_commit_composition_falls_back_to_raw_input() {
        let (engine, session) = paged_engine(3);
        engine.update_session(session, |s| s.commit_preview.clear());
        assert!(engine.commit_composition(session));
        assert_eq!(engine.drain_commit(session).as_deref(), Some("hao"));
    }

    #[test]
    fn test_clear_composition() {
        let (engine, session) = paged_engine(3);
        engine.update_session(session, |s| {
            s.preedit = Some(Preedit::from_text("hao"));
            s.caret_pos = 3;
        });
        engine.clear_composition(session);

        let ctx = engine.context(session).unwrap();
        assert_eq!(ctx, ContextState::default());
        assert!(engine.drain_commit(session).is_none());
        assert_eq!(engine.schema(session).unwrap().schema_id, "luna_pinyin");
    }

    #[test]
    fn test_set_caret_pos_is_clamped() {
        let (engine, session) = paged_engine(0);
        engine.set_caret_pos(session, 1);
        assert_eq!(engine.context(session).unwrap().caret_pos, 1);
        engine.set_caret_pos(session, 10);
        assert_eq!(engine.context(session).unwrap().caret_pos, 3);
    }

    #[test]
    fn test_schema_list() {
        let engine = MemoryEngine::new();
        engine.register_schema(SchemaInfo::new("luna_pinyin", "朙月拼音"));
        engine.register_schema(SchemaInfo::new("bopomofo", "注音"));
        engine.register_schema(SchemaInfo::new("luna_pinyin", "月"));

        assert_eq!(
            engine.schema_list(),
            vec![
                SchemaItem::new("luna_pinyin", "月"),
                SchemaItem::new("bopomofo", "注音"),
            ]
        );
    }

    #[test]
    fn test_concurrent_drain_delivers_once() {
        use std::sync::Arc;
        use std::thread;

        for _ in 0..20 {
            let engine = Arc::new(MemoryEngine::new());
            let session = engine.create_session();
            engine.post_commit(session, "你好");

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let engine = Arc::clone(&engine);
                    thread::spawn(move || engine.drain_commit(session))
                })
                .collect();
            let drained: Vec<String> = handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .collect();

            assert_eq!(drained, vec!["你好".to_string()]);
        }
    }

    #[test]
    fn test_fixture_with_unknown_schema_fails() {
        let fixture = EngineFixture::from_toml_str("[session]\nschema = \"missing\"\n").unwrap();
        assert!(fixture.build().is_err());
    }
}
