//! Volatile in-process storage.
//!
//! Everything lives in plain collections owned by [`MemStorage`]; a
//! restart discards all data.

use super::{Storage, StoreError};
use crate::models::{
    AnalyticsEntry, ChatMessage, ChatRole, Feature, NewProject, NewUser, Project, ProjectUpdate,
    User,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory implementation of [`Storage`].
#[derive(Debug, Default)]
pub struct MemStorage {
    users: HashMap<String, User>,
    projects: HashMap<String, Project>,
    chat_messages: Vec<ChatMessage>,
    analytics: Vec<AnalyticsEntry>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Storage for MemStorage {
    fn create_user(&mut self, user: NewUser) -> User {
        let user = User {
            id: new_id(),
            username: user.username,
            password: user.password,
        };
        self.users.insert(user.id.clone(), user.clone());
        user
    }

    fn get_user(&self, id: &str) -> Option<User> {
        self.users.get(id).cloned()
    }

    fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    fn create_project(&mut self, project: NewProject) -> Project {
        let now = Utc::now();
        let project = Project {
            id: new_id(),
            name: project.name,
            project_type: project.project_type,
            description: project.description,
            content: project.content,
            metadata: project.metadata,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.id.clone(), project.clone());
        project
    }

    fn get_project(&self, id: &str) -> Option<Project> {
        self.projects.get(id).cloned()
    }

    fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    fn update_project(&mut self, id: &str, update: ProjectUpdate) -> Result<Project, StoreError> {
        let project = self
            .projects
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Project", id))?;

        update.apply_to(project);
        // Wall clock may step backwards; updatedAt must not.
        project.updated_at = Utc::now().max(project.updated_at);

        Ok(project.clone())
    }

    fn delete_project(&mut self, id: &str) -> bool {
        self.projects.remove(id).is_some()
    }

    fn project_count(&self) -> usize {
        self.projects.len()
    }

    fn append_chat_message(&mut self, role: ChatRole, content: String) -> ChatMessage {
        let message = ChatMessage {
            id: new_id(),
            role,
            content,
            timestamp: Utc::now(),
        };
        self.chat_messages.push(message.clone());
        message
    }

    fn list_chat_messages(&self) -> Vec<ChatMessage> {
        self.chat_messages.clone()
    }

    fn clear_chat_history(&mut self) {
        self.chat_messages.clear();
    }

    fn record_analytics_entry(
        &mut self,
        feature: Feature,
        request_count: Option<i64>,
        response_time_ms: Option<i64>,
    ) -> AnalyticsEntry {
        let entry = AnalyticsEntry {
            id: new_id(),
            feature,
            request_count: request_count.unwrap_or(0),
            response_time: response_time_ms,
            date: Utc::now(),
        };
        self.analytics.push(entry.clone());
        entry
    }

    fn list_analytics_entries(&self) -> Vec<AnalyticsEntry> {
        self.analytics.clone()
    }
}
