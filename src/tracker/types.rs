//! Data types for the JIRA REST v2 endpoints the sweeper talks to.
//!
//! Wire structs derive `Serialize`/`Deserialize` and follow the JSON
//! shapes of `/search`, `/issue/{key}`, `/issue/{key}/transitions` and
//! `/issue/{key}/editmeta`. The domain views [`WorkItem`] and
//! [`Transition`] are what the rest of the crate works with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The multi-valued field this tool reconciles.
pub const FIX_VERSIONS_FIELD: &str = "fixVersions";

/// Fields requested on every search/read so responses stay small.
pub const REQUESTED_FIELDS: &str = "fixVersions,summary,status,key,issuetype";

/// A `{"name": ...}` reference, used by JIRA for versions, statuses
/// and issue types alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One page of a paginated JQL search. Paging bookkeeping fields the
/// client does not need are left to serde's unknown-field handling.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub issues: Vec<IssueDoc>,
}

/// A single issue document as returned by search or read.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueDoc {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub issuetype: Option<NamedRef>,
    #[serde(rename = "fixVersions", default)]
    pub fix_versions: Vec<NamedRef>,
}

/// Response of `/issue/{key}/transitions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionsResponse {
    pub transitions: Vec<TransitionDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionDoc {
    pub id: String,
    pub name: String,
}

/// Response of `/issue/{key}/editmeta`; only the field keys matter.
#[derive(Debug, Clone, Deserialize)]
pub struct EditMetaResponse {
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

/// Body of a field-update PUT: `{"fields": {"fixVersions": [...]}}`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldUpdateRequest {
    pub fields: FixVersionsPatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixVersionsPatch {
    #[serde(rename = "fixVersions")]
    pub fix_versions: Vec<NamedRef>,
}

impl FieldUpdateRequest {
    pub fn fix_versions(names: &[String]) -> Self {
        Self {
            fields: FixVersionsPatch {
                fix_versions: names.iter().map(NamedRef::new).collect(),
            },
        }
    }
}

/// Body of a transition POST, optionally carrying the field patch so
/// the update is applied atomically with the state change.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRequest {
    pub transition: TransitionIdRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FixVersionsPatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionIdRef {
    pub id: String,
}

impl TransitionRequest {
    pub fn new(transition_id: &str, fix_versions: Option<&[String]>) -> Self {
        Self {
            transition: TransitionIdRef {
                id: transition_id.to_string(),
            },
            fields: fix_versions.map(|names| FixVersionsPatch {
                fix_versions: names.iter().map(NamedRef::new).collect(),
            }),
        }
    }
}

/// A work item as the engine sees it: key, lifecycle status, type and
/// the current values of the fix-version field. Always a transient
/// snapshot; the server copy is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub item_type: String,
    pub fix_versions: Vec<String>,
}

impl WorkItem {
    pub fn from_doc(doc: IssueDoc) -> Self {
        Self {
            key: doc.key,
            summary: doc.fields.summary.unwrap_or_default(),
            status: doc
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            item_type: doc
                .fields
                .issuetype
                .map(|t| t.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            fix_versions: doc.fields.fix_versions.into_iter().map(|v| v.name).collect(),
        }
    }

    /// Whether the item currently holds `version`.
    pub fn has_version(&self, version: &str) -> bool {
        self.fix_versions.iter().any(|v| v == version)
    }

    /// The fix-version list with `version` filtered out.
    pub fn versions_without(&self, version: &str) -> Vec<String> {
        self.fix_versions
            .iter()
            .filter(|v| v.as_str() != version)
            .cloned()
            .collect()
    }
}

/// A workflow transition available on an item in its current status.
/// Ephemeral: the set changes whenever the item's status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

impl From<TransitionDoc> for Transition {
    fn from(doc: TransitionDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
        }
    }
}
