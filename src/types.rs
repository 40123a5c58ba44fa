//! Core data types for the Command Clinic telemetry core
//!
//! This module defines the structures shared across the event store, the
//! alias registry, and the analysis pipeline: captured log events, launch
//! targets, persisted aliases, and the schema the analysis service is
//! expected to emit. The on-disk and on-wire field names are part of the
//! external contract and are pinned with serde renames.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifies an installable launcher command.
///
/// Shared by launch events and aliases. Two targets refer to the same
/// command when their `(owner, extension, command)` triple matches; `args`
/// is carried along but never participates in dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchTarget {
    /// Extension owner (e.g. "builtin")
    pub owner: String,

    /// Extension name (e.g. "file-search")
    pub extension: String,

    /// Command name within the extension (e.g. "search-files")
    pub command: String,

    /// Optional launch arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Map<String, serde_json::Value>>,
}

impl LaunchTarget {
    pub fn new(
        owner: impl Into<String>,
        extension: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            extension: extension.into(),
            command: command.into(),
            args: None,
        }
    }

    /// Dedup equality: same `(owner, extension, command)` triple.
    pub fn same_command(&self, other: &LaunchTarget) -> bool {
        self.owner == other.owner
            && self.extension == other.extension
            && self.command == other.command
    }
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.extension, self.command)
    }
}

/// One captured telemetry event, tagged by `type` on disk.
///
/// `ts` is a Unix timestamp in milliseconds taken at capture time. Ordering
/// across concurrent writers is not guaranteed; readers sort explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogEvent {
    /// Raw text typed into the launcher search bar
    Input {
        ts: i64,
        text: String,
        /// Character count of `text` at capture time, never recomputed
        len: usize,
    },

    /// A command launched through an alias
    Launch {
        ts: i64,
        #[serde(rename = "aliasId")]
        alias_id: String,
        target: LaunchTarget,
    },
}

impl LogEvent {
    /// Build an input event stamped with the current wall clock.
    pub fn input(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        LogEvent::Input {
            ts: Utc::now().timestamp_millis(),
            text,
            len,
        }
    }

    /// Build a launch event stamped with the current wall clock.
    pub fn launch(alias_id: impl Into<String>, target: LaunchTarget) -> Self {
        LogEvent::Launch {
            ts: Utc::now().timestamp_millis(),
            alias_id: alias_id.into(),
            target,
        }
    }

    /// Capture timestamp in milliseconds.
    pub fn ts(&self) -> i64 {
        match self {
            LogEvent::Input { ts, .. } => *ts,
            LogEvent::Launch { ts, .. } => *ts,
        }
    }
}

/// A user-defined shortcut binding an id/title to a launch target.
///
/// At most 20 aliases are persisted at once; `id` is immutable once created
/// and unique, as is the target triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    /// Unique identifier, fixed at creation
    pub id: String,

    /// Display name
    pub title: String,

    /// Command this alias launches
    pub target: LaunchTarget,

    /// Hotkey suggested by the analysis pipeline, if any
    #[serde(
        rename = "suggestHotkey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub suggest_hotkey: Option<String>,
}

/// Partial update for an alias; omitted fields are preserved.
///
/// `id` is present only so that an attempt to change it can be rejected
/// explicitly rather than silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasUpdate {
    pub id: Option<String>,
    pub title: Option<String>,
    pub target: Option<LaunchTarget>,
    #[serde(rename = "suggestHotkey", default)]
    pub suggest_hotkey: Option<String>,
}

/// Proposal category emitted by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    Shortcut,
    Snippet,
    Macro,
}

/// Supporting data behind a proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    /// Alias ids the proposal is based on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,

    /// Occurrence count in the lookback window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Time-of-day patterns, e.g. "09:00-11:00"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_windows: Option<Vec<String>>,
}

/// Actionable body of a proposal, externally tagged by its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalPayload {
    Shortcut {
        #[serde(rename = "aliasId")]
        alias_id: String,
        #[serde(rename = "suggestedHotkey")]
        suggested_hotkey: String,
    },
    Snippet {
        text: String,
        alias: String,
    },
    Macro {
        sequence: Vec<String>,
    },
}

/// One optimization proposal from the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(rename = "type")]
    pub kind: ProposalKind,

    pub title: String,

    /// Short justification; the service is asked for <= 80 chars but this
    /// is not enforced on parse
    pub rationale: String,

    #[serde(default)]
    pub evidence: Evidence,

    pub payload: ProposalPayload,

    /// Confidence score in [0, 1]
    #[serde(default)]
    pub confidence: f32,
}

/// A suggestion to install an extension, inferred from input keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionHint {
    pub keyword: String,
    pub frequency: u32,
    pub suggested_search: String,
    pub extension_name: String,
    pub description: String,
}

/// Validated payload returned by one analysis call.
///
/// Ephemeral: produced fresh per call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub proposals: Vec<Proposal>,

    #[serde(default)]
    pub extension_hints: Vec<ExtensionHint>,
}

impl AnalysisResponse {
    /// The safe fallback for empty or malformed model output.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty() && self.extension_hints.is_empty()
    }
}
