use std::fmt;
use std::time::Duration;

use market_core::ModuleRecord;
use serde::{Deserialize, Serialize};

pub type SearchId = u64;

/// Inputs that originate a search; reused verbatim on retry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Category / module type, e.g. `"Ancestor"` or `"Trigger"`.
    pub module_type: String,
    /// Free-text name query; also filters emitted snapshots.
    pub module_name: String,
    pub platform: String,
}

/// Advisory setup progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStage {
    EnterName,
    SetPlatform,
    Waiting,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStage::EnterName => write!(f, "enterName"),
            SearchStage::SetPlatform => write!(f, "setPlatform"),
            SearchStage::Waiting => write!(f, "waiting"),
        }
    }
}

/// Incremental (`finished == false`) or terminal record list of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub search_id: SearchId,
    pub records: Vec<ModuleRecord>,
    pub finished: bool,
    /// `"timeout"`, `"load-failed"`, or an error message.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchEvent {
    Snapshot(SearchSnapshot),
    #[serde(rename_all = "camelCase")]
    Progress {
        search_id: SearchId,
        stage: SearchStage,
    },
    #[serde(rename_all = "camelCase")]
    Stopped { search_id: SearchId },
}

impl SearchEvent {
    pub fn search_id(&self) -> SearchId {
        match self {
            SearchEvent::Snapshot(snapshot) => snapshot.search_id,
            SearchEvent::Progress { search_id, .. } | SearchEvent::Stopped { search_id } => {
                *search_id
            }
        }
    }
}

/// Terminal failures of one search. None of them affects other searches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("page failed to load: {0}")]
    NavigationFailure(String),
    #[error("listing parse failed: {0}")]
    ParseFailure(String),
    #[error("no listings within {0:?}")]
    ZeroResultTimeout(Duration),
    #[error("{0}")]
    Runtime(String),
}

impl SearchError {
    /// Classification string carried by the terminal snapshot.
    pub fn classification(&self) -> String {
        match self {
            SearchError::NavigationFailure(_) => "load-failed".to_string(),
            SearchError::ZeroResultTimeout(_) => "timeout".to_string(),
            SearchError::ParseFailure(_) => self.to_string(),
            SearchError::Runtime(message) if message.trim().is_empty() => "error".to_string(),
            SearchError::Runtime(message) => message.clone(),
        }
    }
}
