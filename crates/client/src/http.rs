use crate::api::ConsortiumApi;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use rimp_models::{
    ApiResponse, CopyYears, CreateMember, CreateOrganization, MemberRecord, OrganizationRecord,
    ProjectId, RemoteId, UpdateMember, UpdateOrganization, Year,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;

const ORGANIZATIONS_PATH: &str = "/project-consortium-organizations";
const MEMBERS_PATH: &str = "/project-consortium-members";

/// Consortium API client talking to the portal's HTTP routes.
pub struct HttpConsortiumApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpConsortiumApi {
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Build a client with its own connection pool and request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(base_url, http_client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the `{success, data, error}` envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<ApiResponse<T>> {
        let resp = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", what, e);
            ClientError::Http(e)
        })?;

        let status = resp.status();
        let body = resp.text().await?;

        // Error statuses usually still carry the envelope; only fall back to the
        // status line when they don't.
        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                tracing::error!("{} parse error: {}", what, e);
                return Err(ClientError::Decode(e));
            }
            Err(_) => {
                tracing::warn!("{} returned {} without an envelope", what, status);
                return Err(ClientError::Api(format!("{} failed ({})", what, status)));
            }
        };

        if !envelope.success {
            let message = envelope.failure_message();
            tracing::warn!("{} rejected: {}", what, message);
            return Err(ClientError::Api(message));
        }

        Ok(envelope)
    }

    async fn send_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<T> {
        self.send::<T>(request, what)
            .await?
            .data
            .ok_or(ClientError::MissingData(what))
    }

    async fn send_unit(&self, request: RequestBuilder, what: &str) -> Result<()> {
        self.send::<IgnoredAny>(request, what).await.map(|_| ())
    }

    async fn send_message(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let envelope = self.send::<IgnoredAny>(request, what).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    fn scoped(&self, path: &str, project_id: ProjectId, year: Year) -> RequestBuilder {
        self.http_client.get(self.url(path)).query(&[
            ("projectId", project_id.to_string()),
            ("year", year.to_string()),
        ])
    }
}

#[async_trait]
impl ConsortiumApi for HttpConsortiumApi {
    async fn list_organizations(
        &self,
        project_id: ProjectId,
        year: Year,
    ) -> Result<Vec<OrganizationRecord>> {
        let request = self.scoped(ORGANIZATIONS_PATH, project_id, year);
        let records: Option<Vec<OrganizationRecord>> = self
            .send(request, "List organizations")
            .await?
            .data;
        Ok(records.unwrap_or_default())
    }

    async fn create_organization(
        &self,
        request: &CreateOrganization,
    ) -> Result<OrganizationRecord> {
        let builder = self.http_client.post(self.url(ORGANIZATIONS_PATH)).json(request);
        self.send_data(builder, "Create organization").await
    }

    async fn update_organization(&self, request: &UpdateOrganization) -> Result<()> {
        let builder = self.http_client.put(self.url(ORGANIZATIONS_PATH)).json(request);
        self.send_unit(builder, "Update organization").await
    }

    async fn delete_organization(&self, id: RemoteId) -> Result<()> {
        let builder = self
            .http_client
            .delete(self.url(ORGANIZATIONS_PATH))
            .query(&[("id", id.to_string())]);
        self.send_unit(builder, "Delete organization").await
    }

    async fn copy_organizations(&self, request: &CopyYears) -> Result<String> {
        let builder = self.http_client.patch(self.url(ORGANIZATIONS_PATH)).json(request);
        self.send_message(builder, "Copy organizations").await
    }

    async fn list_members(&self, project_id: ProjectId, year: Year) -> Result<Vec<MemberRecord>> {
        let request = self.scoped(MEMBERS_PATH, project_id, year);
        let records: Option<Vec<MemberRecord>> =
            self.send(request, "List members").await?.data;
        Ok(records.unwrap_or_default())
    }

    async fn create_member(&self, request: &CreateMember) -> Result<MemberRecord> {
        let builder = self.http_client.post(self.url(MEMBERS_PATH)).json(request);
        self.send_data(builder, "Create member").await
    }

    async fn update_member(&self, request: &UpdateMember) -> Result<()> {
        let builder = self.http_client.put(self.url(MEMBERS_PATH)).json(request);
        self.send_unit(builder, "Update member").await
    }

    async fn delete_member(&self, id: RemoteId) -> Result<()> {
        let builder = self
            .http_client
            .delete(self.url(MEMBERS_PATH))
            .query(&[("id", id.to_string())]);
        self.send_unit(builder, "Delete member").await
    }

    async fn copy_members(&self, request: &CopyYears) -> Result<String> {
        let builder = self.http_client.patch(self.url(MEMBERS_PATH)).json(request);
        self.send_message(builder, "Copy members").await
    }
}
