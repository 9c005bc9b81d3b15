use crate::error::Result;
use async_trait::async_trait;
use rimp_models::{
    CopyYears, CreateMember, CreateOrganization, MemberRecord, OrganizationRecord, ProjectId,
    RemoteId, UpdateMember, UpdateOrganization, Year,
};

/// CRUD surface of the consortium routes.
///
/// Implementations resolve the `{success, data, error}` envelope themselves:
/// an `Ok` is a successful response, an application failure is
/// `ClientError::Api` carrying the user-facing message.
#[async_trait]
pub trait ConsortiumApi: Send + Sync {
    async fn list_organizations(
        &self,
        project_id: ProjectId,
        year: Year,
    ) -> Result<Vec<OrganizationRecord>>;

    async fn create_organization(&self, request: &CreateOrganization)
        -> Result<OrganizationRecord>;

    async fn update_organization(&self, request: &UpdateOrganization) -> Result<()>;

    async fn delete_organization(&self, id: RemoteId) -> Result<()>;

    /// Duplicate every organization of `source_year` into each target year.
    /// Returns the store's confirmation message.
    async fn copy_organizations(&self, request: &CopyYears) -> Result<String>;

    async fn list_members(&self, project_id: ProjectId, year: Year) -> Result<Vec<MemberRecord>>;

    async fn create_member(&self, request: &CreateMember) -> Result<MemberRecord>;

    async fn update_member(&self, request: &UpdateMember) -> Result<()>;

    async fn delete_member(&self, id: RemoteId) -> Result<()>;

    /// Duplicate every member of `source_year` into each target year
    async fn copy_members(&self, request: &CopyYears) -> Result<String>;
}
