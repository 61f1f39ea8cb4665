//! HTTP client for the task API.
//!
//! Every failure mode (connection refused, non-success status, garbled
//! body) collapses into a `RemoteError` carrying the per-operation
//! message the UI shows in its banner. Callers never see status codes.

use crate::models::{
    Category, CategoryInput, CreateTaskRequest, CreatedTask, SetDueDateRequest, Task,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// The seam between the effect layer and HTTP. The production
/// implementation is [`ApiClient`]; tests substitute their own.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError>;
    async fn add_task(&self, description: &str) -> Result<CreatedTask, RemoteError>;
    async fn delete_task(&self, id: u64) -> Result<(), RemoteError>;
    async fn set_due_date(
        &self,
        id: u64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, RemoteError>;
    async fn toggle_complete(&self, id: u64) -> Result<Task, RemoteError>;

    async fn list_categories(&self) -> Result<Vec<Category>, RemoteError>;
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, RemoteError>;
    async fn update_category(
        &self,
        id: u64,
        input: &CategoryInput,
    ) -> Result<Category, RemoteError>;
    async fn delete_category(&self, id: u64) -> Result<(), RemoteError>;
}

/// A failed remote call, reduced to the message the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        RemoteError { message: message.into() }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RemoteError {}

// ── Production client ──────────────────────────────────────────

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` without a trailing slash, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Run a request, demand a success status, decode the JSON body.
/// Any failure along the way becomes `RemoteError` with `context`.
async fn expect_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<T, RemoteError> {
    let response = expect_ok(request, context).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, context, "bad response body");
            RemoteError::new(context)
        })
}

async fn expect_ok(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<reqwest::Response, RemoteError> {
    let response = request.send().await.map_err(|e| {
        tracing::debug!(error = %e, context, "transport failure");
        RemoteError::new(context)
    })?;
    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), context, "non-success status");
        return Err(RemoteError::new(context));
    }
    Ok(response)
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        expect_json(self.http.get(self.url("/api/tasks")), "Failed to fetch tasks").await
    }

    async fn add_task(&self, description: &str) -> Result<CreatedTask, RemoteError> {
        let body = CreateTaskRequest { description: description.to_string() };
        expect_json(
            self.http.post(self.url("/api/tasks")).json(&body),
            "Failed to add task",
        )
        .await
    }

    async fn delete_task(&self, id: u64) -> Result<(), RemoteError> {
        expect_ok(
            self.http.delete(self.url(&format!("/api/tasks/{id}"))),
            "Failed to delete task",
        )
        .await?;
        Ok(())
    }

    async fn set_due_date(
        &self,
        id: u64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, RemoteError> {
        let body = SetDueDateRequest { due_date };
        expect_json(
            self.http
                .patch(self.url(&format!("/api/tasks/{id}/due-date")))
                .json(&body),
            "Failed to set due date",
        )
        .await
    }

    async fn toggle_complete(&self, id: u64) -> Result<Task, RemoteError> {
        expect_json(
            self.http.patch(self.url(&format!("/api/tasks/{id}/complete"))),
            "Failed to toggle task",
        )
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RemoteError> {
        expect_json(
            self.http.get(self.url("/api/categories")),
            "Failed to fetch categories",
        )
        .await
    }

    async fn create_category(&self, input: &CategoryInput) -> Result<Category, RemoteError> {
        expect_json(
            self.http.post(self.url("/api/categories")).json(input),
            "Failed to create category",
        )
        .await
    }

    async fn update_category(
        &self,
        id: u64,
        input: &CategoryInput,
    ) -> Result<Category, RemoteError> {
        expect_json(
            self.http
                .put(self.url(&format!("/api/categories/{id}")))
                .json(input),
            "Failed to update category",
        )
        .await
    }

    async fn delete_category(&self, id: u64) -> Result<(), RemoteError> {
        expect_ok(
            self.http.delete(self.url(&format!("/api/categories/{id}"))),
            "Failed to delete category",
        )
        .await?;
        Ok(())
    }
}
