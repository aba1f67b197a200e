//! Entity storage.
//!
//! [`Storage`] is the persistence boundary for the four entity kinds.
//! Identifiers and timestamps are assigned here, never by the caller.

pub mod memory;

pub use memory::MemStorage;

use crate::models::{
    AnalyticsEntry, AnalyticsSummary, ChatMessage, ChatRole, Feature, NewProject, NewUser,
    Project, ProjectUpdate, User,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Errors raised by id-qualified store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Store handle shared between request handlers.
pub type SharedStorage = Arc<RwLock<dyn Storage>>;

/// Wrap a store for sharing across tasks.
pub fn shared<S: Storage + 'static>(storage: S) -> SharedStorage {
    Arc::new(RwLock::new(storage))
}

/// CRUD operations over users, projects, chat messages and analytics entries.
///
/// Listing operations return owned copies; callers cannot reach the
/// stored records through them.
pub trait Storage: Send + Sync {
    fn create_user(&mut self, user: NewUser) -> User;
    fn get_user(&self, id: &str) -> Option<User>;
    /// Username uniqueness is not enforced; with duplicates any match may be returned.
    fn get_user_by_username(&self, username: &str) -> Option<User>;

    fn create_project(&mut self, project: NewProject) -> Project;
    fn get_project(&self, id: &str) -> Option<Project>;
    /// All projects, newest first.
    fn list_projects(&self) -> Vec<Project>;
    fn update_project(&mut self, id: &str, update: ProjectUpdate) -> Result<Project, StoreError>;
    /// Returns whether the project existed.
    fn delete_project(&mut self, id: &str) -> bool;
    fn project_count(&self) -> usize;

    fn append_chat_message(&mut self, role: ChatRole, content: String) -> ChatMessage;
    /// Messages in append order.
    fn list_chat_messages(&self) -> Vec<ChatMessage>;
    fn clear_chat_history(&mut self);

    fn record_analytics_entry(
        &mut self,
        feature: Feature,
        request_count: Option<i64>,
        response_time_ms: Option<i64>,
    ) -> AnalyticsEntry;
    fn list_analytics_entries(&self) -> Vec<AnalyticsEntry>;

    /// Summary statistics over the current analytics entries.
    fn analytics_summary(&self) -> AnalyticsSummary {
        crate::analysis::summarize(&self.list_analytics_entries(), self.project_count())
    }
}
