//! imesnap-core
//!
//! Immutable snapshots of a live input-method engine session for a host
//! application that polls "what to show right now".
//!
//! The engine itself (key processing, ranking, schema storage) sits behind
//! the `InputEngine` trait. This crate reads from it and produces plain
//! values the host owns outright:
//!
//! - `Context` - preedit composition, current candidate page and raw input
//! - `Status` - schema identity and mode flags
//! - `Commit` - finalized text, drained on read
//! - `SchemaItem` - entries of the schema switcher
//!
//! Public API:
//! - `SessionSnapshot` - produces the three per-session records
//! - `CandidatePager` / `LabelResolver` - page arithmetic and selection labels
//! - `SchemaCatalog` - list and select enabled schemas
//! - `Runtime` - process-wide engine binding with explicit startup/shutdown
//! - `MemoryEngine` - in-memory engine for tests and tools
//! - `Config` - configuration and defaults
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{ProtoError, Result};

pub mod candidate;
pub use candidate::{Candidate, CandidatePager, CandidateSource, CandidateWindow, LabeledCandidate, Page};

pub mod labels;
pub use labels::{LabelResolver, LabelSource, PageLabels};

pub mod composition;
pub use composition::{ActiveComposition, Composition, CompositionProjector, Preedit};

pub mod context;
pub use context::{Context, Menu, MenuPage};

pub mod status;
pub use status::{ModeFlags, Status, StatusProjector};

pub mod commit;
pub use commit::{Commit, CommitMailbox};

pub mod engine;
pub use engine::{ContextState, InputEngine, SchemaInfo, SessionCandidates, SessionId};

pub mod session;
pub use session::SessionSnapshot;

pub mod catalog;
pub use catalog::{
    MemorySettingsStore, SchemaCatalog, SchemaItem, SettingsStore, SwitcherSettings,
    TomlSettingsStore,
};

pub mod runtime;
pub use runtime::Runtime;

pub mod memory;
pub use memory::{EngineFixture, MemoryEngine, SessionFixture, SessionState};

/// Snapshot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Page size used when the session has no schema, or its schema does
    /// not set one
    pub default_page_size: usize,

    /// Upper bound on `Runtime::candidates` listings
    pub max_candidate_listing: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_page_size: 5,
            max_candidate_listing: 100,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject values the snapshot code cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(ProtoError::Config("default_page_size must be at least 1".into()));
        }
        if self.max_candidate_listing == 0 {
            return Err(ProtoError::Config(
                "max_candidate_listing must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
