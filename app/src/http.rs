//! REST implementation of [`TodoApi`]

use crate::api::{ApiError, TodoApi};
use crate::types::{Todo, TodoDraft, TodoId, TodoPatch, UserId};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the `/todos` collection of a REST service
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
    user_id: UserId,
}

impl HttpTodoApi {
    /// Create a client for `base_url` scoped to `user_id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        user_id: UserId,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self::with_client(client, base_url, user_id))
    }

    /// Create a client around an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>, user_id: UserId) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            user_id,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    /// Turn a non-success status into `ApiError::Status`
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn request_failed(error: &reqwest::Error) -> ApiError {
    ApiError::Request(error.to_string())
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    #[tracing::instrument(skip(self), fields(method = "GET", path = "/todos"))]
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self
            .client
            .get(self.collection_url())
            .query(&[("userId", self.user_id.get())])
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        let todos: Vec<Todo> = Self::decode(response).await?;
        tracing::debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    #[tracing::instrument(skip(self, draft), fields(method = "POST", path = "/todos"))]
    async fn create(&self, draft: TodoDraft) -> Result<Todo, ApiError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&draft)
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        let todo: Todo = Self::decode(response).await?;
        tracing::debug!(id = %todo.id, "Created todo");
        Ok(todo)
    }

    #[tracing::instrument(skip(self, patch), fields(method = "PATCH", path = %format!("/todos/{id}")))]
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, ApiError> {
        let response = self
            .client
            .patch(self.item_url(id))
            .json(&patch)
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        Self::decode(response).await
    }

    #[tracing::instrument(skip(self), fields(method = "DELETE", path = %format!("/todos/{id}")))]
    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(|e| request_failed(&e))?;

        Self::check(response).await.map(|_| ())
    }
}
