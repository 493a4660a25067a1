use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::error::TrackerError;
use super::types::{
    EditMetaResponse, FieldUpdateRequest, SearchResponse, Transition, TransitionRequest,
    TransitionsResponse, WorkItem, REQUESTED_FIELDS,
};
use super::Tracker;

/// JIRA REST v2 client authenticated with a personal access token.
pub struct JiraClient {
    base_url: String,
    token: String,
    client: Client,
    transport_retries: u32,
    retry_delay: Duration,
}

impl JiraClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self::with_retry(base_url, token, 2, Duration::from_millis(500))
    }

    /// Create a client with an explicit transport-retry policy.
    /// Retries cover network-layer failures only; HTTP error statuses
    /// are classified and returned without retry.
    pub fn with_retry(
        base_url: String,
        token: String,
        transport_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
            transport_retries,
            retry_delay,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request built by `build`, retrying transport failures up
    /// to the configured count. The builder runs once per attempt.
    async fn send(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, TrackerError> {
        let mut attempt = 0;
        loop {
            match build().bearer_auth(&self.token).send().await {
                Ok(response) => return Ok(response),
                Err(_) if attempt < self.transport_retries => {
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(TrackerError::Transport(err)),
            }
        }
    }

    /// Map a non-success response into a classified error.
    async fn check(response: Response) -> Result<Response, TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(TrackerError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl Tracker for JiraClient {
    async fn search_page(
        &self,
        query: &str,
        start_at: u32,
        page_size: u32,
    ) -> Result<Vec<WorkItem>, TrackerError> {
        let url = self.url("/rest/api/2/search");
        let start = start_at.to_string();
        let size = page_size.to_string();
        let response = self
            .send(|| {
                self.client.get(&url).query(&[
                    ("jql", query),
                    ("startAt", start.as_str()),
                    ("maxResults", size.as_str()),
                    ("fields", REQUESTED_FIELDS),
                ])
            })
            .await?;
        let page = Self::check(response)
            .await?
            .json::<SearchResponse>()
            .await?;
        Ok(page.issues.into_iter().map(WorkItem::from_doc).collect())
    }

    async fn editable_fields(&self, key: &str) -> Result<HashSet<String>, TrackerError> {
        let url = self.url(&format!("/rest/api/2/issue/{key}/editmeta"));
        let response = self.send(|| self.client.get(&url)).await?;
        let meta = Self::check(response)
            .await?
            .json::<EditMetaResponse>()
            .await?;
        Ok(meta.fields.into_keys().collect())
    }

    async fn write_fix_versions(
        &self,
        key: &str,
        versions: &[String],
        notify: Option<bool>,
    ) -> Result<(), TrackerError> {
        let url = self.url(&format!("/rest/api/2/issue/{key}"));
        let body = FieldUpdateRequest::fix_versions(versions);
        let response = self
            .send(|| {
                let mut req = self.client.put(&url).json(&body);
                if let Some(notify) = notify {
                    req = req.query(&[("notifyUsers", if notify { "true" } else { "false" })]);
                }
                req
            })
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError> {
        let url = self.url(&format!("/rest/api/2/issue/{key}/transitions"));
        let response = self.send(|| self.client.get(&url)).await?;
        let body = Self::check(response)
            .await?
            .json::<TransitionsResponse>()
            .await?;
        Ok(body.transitions.into_iter().map(Transition::from).collect())
    }

    async fn apply_transition(
        &self,
        key: &str,
        transition_id: &str,
        fix_versions: Option<&[String]>,
    ) -> Result<(), TrackerError> {
        let url = self.url(&format!("/rest/api/2/issue/{key}/transitions"));
        let body = TransitionRequest::new(transition_id, fix_versions);
        let response = self.send(|| self.client.post(&url).json(&body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_item(&self, key: &str) -> Result<WorkItem, TrackerError> {
        let url = self.url(&format!("/rest/api/2/issue/{key}"));
        let response = self
            .send(|| self.client.get(&url).query(&[("fields", REQUESTED_FIELDS)]))
            .await?;
        let doc = Self::check(response)
            .await?
            .json::<super::types::IssueDoc>()
            .await?;
        Ok(WorkItem::from_doc(doc))
    }
}
