//! Pivotal Tracker API adapter

use api_models::models::tracker::{CommentCreate, Project, Story, StoryUpdate};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::clients::IssueTracker;
use crate::errors::DeployError;
use crate::http::client::{AuthStyle, HttpClient};

/// Issue tracker backed by the Pivotal Tracker v5 API
pub struct PivotalClient {
    http: HttpClient,
}

impl PivotalClient {
    pub fn new(base_url: &str, api_token: Option<SecretString>) -> Result<Self, DeployError> {
        let http = HttpClient::new(
            "pivotal tracker",
            base_url,
            api_token,
            AuthStyle::Header("X-TrackerToken"),
            &[],
        )?;
        Ok(Self { http })
    }
}

fn story_path(story: &Story) -> String {
    format!("/projects/{}/stories/{}", story.project_id, story.id)
}

#[async_trait]
impl IssueTracker for PivotalClient {
    async fn find_project(&self, project_id: &str) -> Result<Project, DeployError> {
        self.http.get(&format!("/projects/{}", project_id)).await
    }

    async fn find_story(
        &self,
        project: &Project,
        ticket_id: &str,
    ) -> Result<Option<Story>, DeployError> {
        self.http
            .get_optional(&format!("/projects/{}/stories/{}", project.id, ticket_id))
            .await
    }

    async fn create_note(&self, story: &Story, text: &str) -> Result<(), DeployError> {
        let body = CommentCreate {
            text: text.to_string(),
        };
        let _: serde_json::Value = self
            .http
            .post(&format!("{}/comments", story_path(story)), &body)
            .await?;
        Ok(())
    }

    async fn update_story_state(&self, story: &Story, state: &str) -> Result<(), DeployError> {
        let body = StoryUpdate {
            current_state: state.to_string(),
        };
        let _: Story = self.http.put(&story_path(story), &body).await?;
        Ok(())
    }
}
