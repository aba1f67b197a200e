//! Data models for the dashboard backend.
//!
//! This module contains the entities held by the store, the payloads used
//! to create and update them, and the analytics summary types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of content a project holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Long-form blog post
    Blog,
    /// Social media posts
    Social,
    /// Email campaign
    Email,
    /// Anything else
    Other,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectType::Blog => write!(f, "blog"),
            ProjectType::Social => write!(f, "social"),
            ProjectType::Email => write!(f, "email"),
            ProjectType::Other => write!(f, "other"),
        }
    }
}

impl From<&str> for ProjectType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "blog" => ProjectType::Blog,
            "social" => ProjectType::Social,
            "email" => ProjectType::Email,
            _ => ProjectType::Other,
        }
    }
}

/// A content project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Content type.
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    /// Short description.
    pub description: Option<String>,
    /// Generated or edited body text.
    pub content: Option<String>,
    /// Free-form data such as word count or tags.
    pub metadata: Option<serde_json::Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl NewProject {
    /// Creates a payload with only the required fields.
    pub fn new(name: impl Into<String>, project_type: ProjectType) -> Self {
        Self {
            name: name.into(),
            project_type,
            description: None,
            content: None,
            metadata: None,
        }
    }
}

/// Partial update for a project.
///
/// A field left as `None` is not touched. For the nullable fields,
/// `Some(None)` clears the stored value. `name` and `type` may be absent
/// but never `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub project_type: Option<ProjectType>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub metadata: Option<Option<serde_json::Value>>,
}

impl ProjectUpdate {
    /// Applies the supplied fields to `project`.
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(project_type) = self.project_type {
            project.project_type = project_type;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(content) = self.content {
            project.content = content;
        }
        if let Some(metadata) = self.metadata {
            project.metadata = metadata;
        }
    }
}

/// A key that is present must hold a value; `null` is rejected.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Distinguishes an explicit `null` from an absent key.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A capability area whose usage is tracked.
///
/// Unknown names are kept verbatim so new features can be recorded
/// without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Feature {
    Chat,
    Vision,
    Content,
    Code,
    Other(String),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Chat => write!(f, "chat"),
            Feature::Vision => write!(f, "vision"),
            Feature::Content => write!(f, "content"),
            Feature::Code => write!(f, "code"),
            Feature::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Feature {
    fn from(s: &str) -> Self {
        match s {
            "chat" => Feature::Chat,
            "vision" => Feature::Vision,
            "content" => Feature::Content,
            "code" => Feature::Code,
            other => Feature::Other(other.to_string()),
        }
    }
}

impl From<String> for Feature {
    fn from(s: String) -> Self {
        Feature::from(s.as_str())
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.to_string()
    }
}

/// One recorded measurement of feature usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEntry {
    pub id: String,
    pub feature: Feature,
    /// Number of requests this entry accounts for.
    pub request_count: i64,
    /// Latency in milliseconds, when measured.
    pub response_time: Option<i64>,
    pub date: DateTime<Utc>,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Payload for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Usage of a single feature within the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub feature: String,
    /// Summed request count.
    pub count: i64,
    /// Share of all requests, 0-100.
    pub percentage: f64,
}

/// Point-in-time analytics summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_requests: i64,
    pub images_analyzed: i64,
    pub content_generated: i64,
    pub active_projects: usize,
    pub feature_breakdown: Vec<FeatureUsage>,
    /// Mean latency in milliseconds.
    pub avg_response_time: f64,
}
