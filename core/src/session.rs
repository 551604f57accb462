//! Per-session snapshots.
//!
//! `SessionSnapshot` combines the projectors, the pager and the label
//! resolver into the three records the host polls for:
//! - `commit()`: pending commit text, drained on read
//! - `context()`: composition, candidate page and raw input
//! - `status()`: schema identity and mode flags
//!
//! Missing engine state is reported as `None`. The only error is a page
//! size of zero coming from the schema.

use crate::candidate::CandidatePager;
use crate::commit::Commit;
use crate::composition::CompositionProjector;
use crate::context::{Context, Menu, MenuPage};
use crate::engine::{ContextState, InputEngine, SchemaInfo, SessionCandidates, SessionId};
use crate::error::Result;
use crate::labels::LabelResolver;
use crate::status::{ModeFlags, Status, StatusProjector};
use crate::Config;

/// Read-side view of one engine for snapshot production.
pub struct SessionSnapshot<'a, E: ?Sized> {
    engine: &'a E,
    config: &'a Config,
    composition: CompositionProjector,
    labels: LabelResolver,
    status: StatusProjector,
}

impl<'a, E: InputEngine + ?Sized> SessionSnapshot<'a, E> {
    pub fn new(engine: &'a E, config: &'a Config) -> Self {
        Self {
            engine,
            config,
            composition: CompositionProjector::new(),
            labels: LabelResolver::new(),
            status: StatusProjector::new(),
        }
    }

    /// Drain the session's pending commit text.
    ///
    /// Returns `None` when nothing is pending; safe to call on every poll.
    pub fn commit(&self, session: SessionId) -> Option<Commit> {
        let text = self.engine.drain_commit(session).filter(|t| !t.is_empty())?;
        tracing::debug!(%session, len = text.len(), "drained commit text");
        Some(Commit { text })
    }

    /// Snapshot the session's editing context.
    ///
    /// `Ok(None)` if the session or its context does not exist yet.
    pub fn context(&self, session: SessionId) -> Result<Option<Context>> {
        let Some(state) = self.engine.context(session) else {
            return Ok(None);
        };
        let schema = self.engine.schema(session);

        let composition = self.composition.project(
            state.is_composing,
            state.preedit.as_ref(),
            &state.commit_preview,
        );
        let menu = self.menu(session, &state, schema.as_ref())?;

        Ok(Some(Context {
            composition,
            menu,
            raw_input: state.raw_input,
            caret_position: state.caret_pos,
        }))
    }

    /// Snapshot schema identity and mode flags.
    ///
    /// `None` unless the session has both a schema and a context.
    pub fn status(&self, session: SessionId) -> Option<Status> {
        let schema = self.engine.schema(session)?;
        let state = self.engine.context(session)?;
        let flags = ModeFlags::read_with(|name| self.engine.option(session, name));
        Some(
            self.status
                .project(&schema, self.engine.is_disabled(), state.is_composing, flags),
        )
    }

    /// Page size for the session: the schema's, else the configured default.
    pub fn page_size(&self, schema: Option<&SchemaInfo>) -> usize {
        schema
            .and_then(|s| s.page_size)
            .unwrap_or(self.config.default_page_size)
    }

    fn menu(
        &self,
        session: SessionId,
        state: &ContextState,
        schema: Option<&SchemaInfo>,
    ) -> Result<Menu> {
        let Some(selected_index) = state.selected_index else {
            return Ok(Menu::Empty);
        };
        let pager = CandidatePager::new(self.page_size(schema))?;
        let source = SessionCandidates::new(self.engine, session);
        let Some(page) = pager.paginate(&source, selected_index) else {
            return Ok(Menu::Empty);
        };

        let select_keys = schema.map(|s| s.select_keys.as_str()).unwrap_or("");
        let explicit = schema.and_then(|s| s.alternative_select_labels.as_deref());
        let labels = self.labels.resolve(pager.page_size(), explicit, select_keys);
        tracing::trace!(
            %session,
            page_number = page.page_number,
            source = ?labels.source(),
            "rendering candidate page"
        );

        Ok(Menu::Page(MenuPage::assemble(page, &labels, select_keys)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::composition::Preedit;
    use crate::error::ProtoError;
    use crate::memory::MemoryEngine;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n).map(|i| Candidate::new(format!("候选{}", i))).collect()
    }

    fn engine_with_schema(schema: SchemaInfo) -> (MemoryEngine, SessionId) {
        let engine = MemoryEngine::new();
        engine.register_schema(schema.clone());
        let session = engine.create_session();
        assert!(engine.select_schema(session, &schema.schema_id));
        (engine, session)
    }

    #[test]
    fn test_unknown_session_yields_nothing() {
        let engine = MemoryEngine::new();
        let config = Config::default();
        let snap = SessionSnapshot::new(&engine, &config);
        let missing = SessionId(42);

        assert!(snap.commit(missing).is_none());
        assert!(snap.context(missing).unwrap().is_none());
        assert!(snap.status(missing).is_none());
    }

    #[test]
    fn test_context_without_candidates_has_empty_menu() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        let config = Config::default();
        let ctx = SessionSnapshot::new(&engine, &config)
            .context(session)
            .unwrap()
            .unwrap();

        assert!(ctx.menu.is_empty());
        assert!(!ctx.composition.is_active());
    }

    #[test]
    fn test_context_paginates_around_selection() {
        let mut schema = SchemaInfo::new("luna_pinyin", "朙月拼音");
        schema.page_size = Some(5);
        schema.select_keys = "asdf".to_string();
        let (engine, session) = engine_with_schema(schema);
        engine.update_session(session, |s| {
            s.composing = true;
            s.preedit = Some(Preedit::from_text("ni"));
            s.candidates = candidates(20);
            s.selected_index = 12;
        });

        let config = Config::default();
        let ctx = SessionSnapshot::new(&engine, &config)
            .context(session)
            .unwrap()
            .unwrap();
        let page = ctx.menu.as_page().unwrap();

        assert_eq!(page.page_number, 2);
        assert_eq!(page.highlighted_index, 2);
        assert_eq!(page.candidates[0].text, "候选10");
        assert_eq!(page.labels, vec!["a", "s", "d", "f", "5"]);
        assert_eq!(page.candidates[4].label, "5");
        assert!(ctx.composition.is_active());
    }

    #[test]
    fn test_page_size_falls_back_to_config() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        engine.update_session(session, |s| {
            s.candidates = candidates(9);
            s.selected_index = 3;
        });

        let config = Config {
            default_page_size: 3,
            ..Config::default()
        };
        let ctx = SessionSnapshot::new(&engine, &config)
            .context(session)
            .unwrap()
            .unwrap();
        let page = ctx.menu.as_page().unwrap();
        assert_eq!(page.page_size, 3);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.labels, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_zero_schema_page_size_is_misuse() {
        let mut schema = SchemaInfo::new("broken", "Broken");
        schema.page_size = Some(0);
        let (engine, session) = engine_with_schema(schema);
        engine.update_session(session, |s| s.candidates = candidates(3));

        let config = Config::default();
        let err = SessionSnapshot::new(&engine, &config)
            .context(session)
            .unwrap_err();
        assert!(matches!(err, ProtoError::InvalidPageSize(0)));
    }

    #[test]
    fn test_status_requires_schema() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        let config = Config::default();
        let snap = SessionSnapshot::new(&engine, &config);

        assert!(snap.status(session).is_none());
        assert!(snap.context(session).unwrap().is_some());
    }

    #[test]
    fn test_status_reads_flags() {
        let (engine, session) = engine_with_schema(SchemaInfo::new("luna_pinyin", "朙月拼音"));
        engine.set_option(session, "ascii_mode", true);
        engine.set_option(session, "traditional", true);

        let config = Config::default();
        let status = SessionSnapshot::new(&engine, &config).status(session).unwrap();
        assert_eq!(status.schema_id, "luna_pinyin");
        assert!(status.ascii_mode);
        assert!(status.traditional);
        assert!(!status.full_shape);
        assert!(!status.is_disabled);
    }

    #[test]
    fn test_commit_drains_once() {
        let engine = MemoryEngine::new();
        let session = engine.create_session();
        engine.post_commit(session, "你好");

        let config = Config::default();
        let snap = SessionSnapshot::new(&engine, &config);
        assert_eq!(snap.commit(session).unwrap().text, "你好");
        assert!(snap.commit(session).is_none());
    }
}
