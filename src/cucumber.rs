//! Cucumber JSON result files, as written by godog and the other
//! cucumber formatters.
//!
//! Every field is optional on the wire; missing values fall back to
//! their defaults so partially written files still load.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Pending,
    Undefined,
    Ambiguous,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Passed,
        Status::Failed,
        Status::Skipped,
        Status::Pending,
        Status::Undefined,
        Status::Ambiguous,
        Status::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
            Status::Pending => "pending",
            Status::Undefined => "undefined",
            Status::Ambiguous => "ambiguous",
            Status::Unknown => "unknown",
        }
    }

    fn severity(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Unknown => 1,
            Status::Skipped => 2,
            Status::Pending => 3,
            Status::Undefined => 4,
            Status::Ambiguous => 5,
            Status::Failed => 6,
        }
    }

    /// The more severe of two statuses.
    pub fn worst(self, other: Status) -> Status {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub uri: String,
    pub id: String,
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub line: u32,
    pub tags: Vec<Tag>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Background,
    #[default]
    #[serde(other)]
    Scenario,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub id: String,
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub line: u32,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub tags: Vec<Tag>,
    pub before: Vec<Hook>,
    pub steps: Vec<Step>,
    pub after: Vec<Hook>,
}

impl Element {
    pub fn is_background(&self) -> bool {
        self.kind == ElementKind::Background
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub keyword: String,
    pub name: String,
    pub line: u32,
    pub result: StepResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<DocString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hook {
    pub result: StepResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepResult {
    pub status: Status,
    /// Nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocString {
    pub value: String,
    pub content_type: String,
    pub line: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub line: u32,
}
