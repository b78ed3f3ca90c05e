//! REST implementation of the [`SessionStore`](crate::store::SessionStore) trait.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::FitcamError;
use crate::retry::RetryPolicy;
use crate::store::{HistoryFilter, SessionStore};
use crate::types::WorkoutSessionRecord;

/// Stores sessions through `POST/GET {base_url}/api/v1/workouts`.
#[derive(Clone, Debug)]
pub struct HttpSessionStore {
    base_url: String,
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl HttpSessionStore {
    /// Create a new store client.
    ///
    /// # Arguments
    /// * `base_url` - Root of the workout API, e.g. "https://api.example.com"
    /// * `token` - Optional bearer token sent with every request
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self, FitcamError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn workouts_url(&self) -> String {
        format!("{}/api/v1/workouts", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> FitcamError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        FitcamError::from_status(status, body_snippet)
    }

    async fn post_once(&self, record: &WorkoutSessionRecord) -> Result<(), FitcamError> {
        let request = self.authorize(self.client.post(self.workouts_url()).json(record));
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(())
    }

    async fn list_once(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<WorkoutSessionRecord>, FitcamError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(kind) = filter.exercise {
            query.push(("exercise", kind.as_str().to_string()));
        }
        if let Some(day) = filter.date {
            query.push(("date", day.format("%Y-%m-%d").to_string()));
        }
        let request = self.authorize(self.client.get(self.workouts_url()).query(&query));
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.json::<Vec<WorkoutSessionRecord>>().await?)
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn save_session(&self, record: &WorkoutSessionRecord) -> Result<(), FitcamError> {
        debug!(session_id = %record.session_id, "posting workout session");
        RetryPolicy::default()
            .retry_async(|| self.post_once(record), FitcamError::is_transient)
            .await
    }

    async fn list_sessions(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<WorkoutSessionRecord>, FitcamError> {
        let records = RetryPolicy::default()
            .retry_async(|| self.list_once(filter), FitcamError::is_transient)
            .await?;
        // the server may ignore the query; filter and order locally too
        Ok(filter.apply(records))
    }
}
