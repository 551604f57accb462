//! Process-wide engine binding.
//!
//! A `Runtime` owns the engine, the configuration and the current session.
//! It is created once with `startup` and torn down with `shutdown`; callers
//! pass it around explicitly instead of reaching for a global.

use crate::candidate::Candidate;
use crate::catalog::SchemaItem;
use crate::commit::Commit;
use crate::context::Context;
use crate::engine::{InputEngine, SessionId};
use crate::error::Result;
use crate::session::SessionSnapshot;
use crate::status::Status;
use crate::Config;

pub struct Runtime<E: InputEngine> {
    engine: E,
    config: Config,
    session: SessionId,
}

impl<E: InputEngine> Runtime<E> {
    /// Validate the config and open the current session.
    pub fn startup(engine: E, config: Config) -> Result<Self> {
        config.validate()?;
        let session = engine.create_session();
        tracing::debug!(%session, "runtime started");
        Ok(Self {
            engine,
            config,
            session,
        })
    }

    /// Bind to a session the engine already has, e.g. one built from a
    /// fixture. A stale id is replaced on first use, as with `session()`.
    pub fn attach(engine: E, config: Config, session: SessionId) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            session,
        })
    }

    /// Destroy the current session and hand the engine back.
    pub fn shutdown(self) -> E {
        self.engine.destroy_session(self.session);
        tracing::debug!(session = %self.session, "runtime shut down");
        self.engine
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The current session, recreated if the engine dropped it.
    pub fn session(&mut self) -> SessionId {
        if !self.engine.session_exists(self.session) {
            let stale = self.session;
            self.session = self.engine.create_session();
            tracing::debug!(%stale, session = %self.session, "recreated lost session");
        }
        self.session
    }

    fn snapshot(&self) -> SessionSnapshot<'_, E> {
        SessionSnapshot::new(&self.engine, &self.config)
    }

    pub fn snapshot_commit(&mut self) -> Option<Commit> {
        let session = self.session();
        self.snapshot().commit(session)
    }

    pub fn snapshot_context(&mut self) -> Result<Option<Context>> {
        let session = self.session();
        self.snapshot().context(session)
    }

    pub fn snapshot_status(&mut self) -> Option<Status> {
        let session = self.session();
        self.snapshot().status(session)
    }

    /// Candidates of the current menu from `start`, at most `limit` of them
    /// and never more than `Config::max_candidate_listing`.
    pub fn candidates(&mut self, start: usize, limit: usize) -> Vec<Candidate> {
        let session = self.session();
        let limit = limit.min(self.config.max_candidate_listing);
        self.engine.candidates_from(session, start, limit)
    }

    pub fn option(&mut self, name: &str) -> bool {
        let session = self.session();
        self.engine.option(session, name)
    }

    pub fn set_option(&mut self, name: &str, value: bool) {
        let session = self.session();
        self.engine.set_option(session, name, value);
    }

    /// Id of the current schema; empty when none is bound.
    pub fn current_schema_id(&mut self) -> String {
        let session = self.session();
        self.engine
            .schema(session)
            .map(|s| s.schema_id)
            .unwrap_or_default()
    }

    pub fn select_schema(&mut self, schema_id: &str) -> bool {
        let session = self.session();
        self.engine.select_schema(session, schema_id)
    }

    /// Raw input of the current session; empty without a context.
    pub fn raw_input(&mut self) -> String {
        let session = self.session();
        self.engine
            .context(session)
            .map(|c| c.raw_input)
            .unwrap_or_default()
    }

    pub fn caret_position(&mut self) -> usize {
        let session = self.session();
        self.engine
            .context(session)
            .map(|c| c.caret_pos)
            .unwrap_or(0)
    }

    pub fn set_caret_position(&mut self, caret_pos: usize) {
        let session = self.session();
        self.engine.set_caret_pos(session, caret_pos);
    }

    /// Schemas deployed in the engine.
    pub fn schema_list(&self) -> Vec<SchemaItem> {
        self.engine.schema_list()
    }

    pub fn change_page(&mut self, backward: bool) -> bool {
        let session = self.session();
        self.engine.change_page(session, backward)
    }

    pub fn select_candidate(&mut self, index: usize) -> bool {
        let session = self.session();
        self.engine.select_candidate(session, index)
    }

    pub fn select_candidate_on_current_page(&mut self, index: usize) -> bool {
        let session = self.session();
        self.engine.select_candidate_on_current_page(session, index)
    }

    pub fn forget_candidate(&mut self, index: usize) -> bool {
        let session = self.session();
        self.engine.forget_candidate(session, index)
    }

    pub fn delete_candidate_on_current_page(&mut self, index: usize) -> bool {
        let session = self.session();
        self.engine.delete_candidate_on_current_page(session, index)
    }

    pub fn commit_composition(&mut self) -> bool {
        let session = self.session();
        self.engine.commit_composition(session)
    }

    pub fn clear_composition(&mut self) {
        let session = self.session();
        self.engine.clear_composition(session);
    }
}
