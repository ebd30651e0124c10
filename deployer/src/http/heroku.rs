//! Heroku Platform API adapter

use std::collections::BTreeMap;

use api_models::models::heroku::{
    AddonCreate, App, AppCreate, CollaboratorCreate, DomainCreate, Dyno, DynoCreate,
};
use api_models::models::ErrorResponse;
use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use crate::clients::HostingPlatform;
use crate::errors::DeployError;
use crate::http::client::{AuthStyle, HttpClient};

/// Hosting platform backed by the Heroku Platform API v3
pub struct HerokuClient {
    http: HttpClient,
}

impl HerokuClient {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Result<Self, DeployError> {
        let http = HttpClient::new(
            "heroku",
            base_url,
            api_key,
            AuthStyle::Bearer,
            &[("accept", "application/vnd.heroku+json; version=3")],
        )?;
        Ok(Self { http })
    }
}

/// Whether a 422 body reports that the user already has access to the app
pub fn is_existing_collaborator(body: &str) -> bool {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message.to_lowercase().contains("already a collaborator"))
        .unwrap_or(false)
}

#[async_trait]
impl HostingPlatform for HerokuClient {
    async fn list_apps(&self) -> Result<Vec<String>, DeployError> {
        let mut names = Vec::new();
        let mut range: Option<String> = None;

        loop {
            let (apps, next): (Vec<App>, Option<String>) =
                self.http.get_range("/apps", range.as_deref()).await?;
            names.extend(apps.into_iter().map(|a| a.name));

            match next {
                Some(next) if range.as_deref() != Some(next.as_str()) => range = Some(next),
                _ => break,
            }
        }

        debug!("Listed {} apps", names.len());
        Ok(names)
    }

    async fn create_app(&self, name: &str, region: Option<&str>) -> Result<String, DeployError> {
        let body = AppCreate {
            name: name.to_string(),
            region: region.map(str::to_string),
        };
        let app: App = self.http.post("/apps", &body).await?;
        debug!("Created app {} ({})", app.name, app.id);

        app.git_url.ok_or_else(|| {
            DeployError::Internal(format!("platform returned no git url for app {}", name))
        })
    }

    async fn delete_app(&self, name: &str) -> Result<(), DeployError> {
        self.http.delete(&format!("/apps/{}", name)).await
    }

    async fn list_processes(&self, app: &str) -> Result<Vec<String>, DeployError> {
        let dynos: Vec<Dyno> = self.http.get(&format!("/apps/{}/dynos", app)).await?;
        Ok(dynos.into_iter().map(|d| d.command).collect())
    }

    async fn start_process(&self, app: &str, command: &str) -> Result<(), DeployError> {
        let body = DynoCreate {
            command: command.to_string(),
            attach: false,
        };
        let _: Dyno = self.http.post(&format!("/apps/{}/dynos", app), &body).await?;
        Ok(())
    }

    async fn set_config_vars(
        &self,
        app: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), DeployError> {
        let _: serde_json::Value = self
            .http
            .patch(&format!("/apps/{}/config-vars", app), vars)
            .await?;
        Ok(())
    }

    async fn add_collaborator(&self, app: &str, identifier: &str) -> Result<(), DeployError> {
        let body = CollaboratorCreate {
            user: identifier.to_string(),
            silent: true,
        };
        let result: Result<serde_json::Value, _> = self
            .http
            .post(&format!("/apps/{}/collaborators", app), &body)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(DeployError::Api { status: 422, body, .. }) if is_existing_collaborator(&body) => {
                Err(DeployError::DuplicateResource(format!(
                    "{} is already a collaborator on {}",
                    identifier, app
                )))
            }
            Err(e) => Err(e),
        }
    }

    async fn add_domain(&self, app: &str, hostname: &str) -> Result<(), DeployError> {
        let body = DomainCreate {
            hostname: hostname.to_string(),
        };
        let _: serde_json::Value = self
            .http
            .post(&format!("/apps/{}/domains", app), &body)
            .await?;
        Ok(())
    }

    async fn add_addon(&self, app: &str, addon: &str) -> Result<(), DeployError> {
        let body = AddonCreate {
            plan: addon.to_string(),
        };
        let _: serde_json::Value = self
            .http
            .post(&format!("/apps/{}/addons", app), &body)
            .await?;
        Ok(())
    }
}
