//! Remote repository hosting API

use serde::Serialize;

use crate::error::{AssistError, Result};

/// Bitbucket REST endpoint for repositories
pub const API_BASE: &str = "https://api.bitbucket.org/2.0/repositories";

/// Everything needed to create one remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepositoryRequest {
    /// Account login
    pub username: String,
    /// Account password or app password
    pub password: String,
    /// Workspace that owns the repository
    pub workspace: String,
    /// Repository slug
    pub slug: String,
    /// Key of the project the repository belongs to
    pub project_key: String,
    /// Human-readable repository name
    pub name: String,
}

#[derive(Serialize)]
struct ProjectRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct RepositoryBody<'a> {
    scm: &'a str,
    project: ProjectRef<'a>,
    name: &'a str,
    language: &'a str,
    is_private: bool,
}

/// Creates repositories on the hosting service
pub trait RepositoryHost: Send + Sync {
    /// Create the repository described by `request`
    ///
    /// # Errors
    /// [`AssistError::CreateRemote`] when the service is unreachable,
    /// [`AssistError::RemoteStatus`] when it answers with anything but `200 OK`.
    fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Bitbucket Cloud client
#[derive(Debug, Clone, Default)]
pub struct BitbucketClient {
    http: reqwest::Client,
}

impl BitbucketClient {
    /// Wrap an HTTP client
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl RepositoryHost for BitbucketClient {
    async fn create_repository(&self, request: &CreateRepositoryRequest) -> Result<()> {
        let url = format!("{API_BASE}/{}/{}", request.workspace, request.slug);
        let body = RepositoryBody {
            scm: "git",
            project: ProjectRef {
                key: &request.project_key,
            },
            name: &request.name,
            language: "c++",
            is_private: true,
        };

        log::debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .basic_auth(&request.username, Some(&request.password))
            .json(&body)
            .send()
            .await
            .map_err(AssistError::CreateRemote)?;

        let status = response.status();
        // Drain the body so the connection can be reused
        response.bytes().await.map_err(AssistError::CreateRemote)?;

        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(AssistError::remote_status(status.to_string()))
        }
    }
}
