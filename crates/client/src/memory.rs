use crate::api::ConsortiumApi;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use rimp_models::{
    CopyYears, CreateMember, CreateOrganization, MemberRecord, OrganizationRecord,
    OrganizationType, ProjectId, RemoteId, UpdateMember, UpdateOrganization, Year,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, MutexGuard};

/// Remote operations, as recorded by [`MemoryConsortiumApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    ListOrganizations,
    CreateOrganization,
    UpdateOrganization,
    DeleteOrganization,
    CopyOrganizations,
    ListMembers,
    CreateMember,
    UpdateMember,
    DeleteMember,
    CopyMembers,
}

impl ApiCall {
    /// Calls that change remote state
    pub fn is_mutation(self) -> bool {
        !matches!(self, ApiCall::ListOrganizations | ApiCall::ListMembers)
    }
}

enum Injected {
    Rejected(String),
    NoData,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    organizations: Vec<OrganizationRecord>,
    members: Vec<MemberRecord>,
    /// (source organization, target year) -> copied organization
    copied: HashMap<(RemoteId, Year), RemoteId>,
    calls: Vec<ApiCall>,
    failures: HashMap<ApiCall, Injected>,
    stalled: HashSet<ApiCall>,
}

impl MemoryState {
    fn issue_id(&mut self) -> RemoteId {
        self.next_id += 1;
        RemoteId(self.next_id)
    }

    fn record(&mut self, call: ApiCall) -> Result<()> {
        self.calls.push(call);
        match self.failures.get(&call) {
            Some(Injected::Rejected(message)) => Err(ClientError::Api(message.clone())),
            Some(Injected::NoData) => Err(ClientError::MissingData("response data")),
            None => Ok(()),
        }
    }
}

/// In-process consortium store with call recording and failure injection.
///
/// Behaves like the portal routes: ids are issued sequentially, deleting an
/// organization removes its members, and bulk copies replace whatever the
/// target years held before.
#[derive(Default)]
pub struct MemoryConsortiumApi {
    state: Mutex<MemoryState>,
}

impl MemoryConsortiumApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call of `call` fail with `message`
    pub async fn fail(&self, call: ApiCall, message: &str) {
        self.state
            .lock()
            .await
            .failures
            .insert(call, Injected::Rejected(message.to_string()));
    }

    /// Make every future call of `call` answer without its payload, which the
    /// client reports as a transport failure
    pub async fn fail_without_data(&self, call: ApiCall) {
        self.state
            .lock()
            .await
            .failures
            .insert(call, Injected::NoData);
    }

    /// Make future calls of `call` hang until the caller gives up on them
    pub async fn stall(&self, call: ApiCall) {
        self.state.lock().await.stalled.insert(call);
    }

    /// Let calls of `call` through again. Calls already hanging stay hung.
    pub async fn release(&self, call: ApiCall) {
        self.state.lock().await.stalled.remove(&call);
    }

    async fn enter(&self, call: ApiCall) -> Result<MutexGuard<'_, MemoryState>> {
        if self.state.lock().await.stalled.contains(&call) {
            std::future::pending::<()>().await;
        }
        let mut state = self.state.lock().await;
        state.record(call)?;
        Ok(state)
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn mutation_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.is_mutation())
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    pub async fn seed_organization(
        &self,
        project_id: ProjectId,
        year: Year,
        name: &str,
        organization_type: OrganizationType,
    ) -> RemoteId {
        let mut state = self.state.lock().await;
        let id = state.issue_id();
        state.organizations.push(OrganizationRecord {
            id,
            project_planning_id: Some(project_id),
            year: Some(year),
            organization_type,
            organization_name: Some(name.to_string()),
            role_description: None,
        });
        id
    }

    pub async fn seed_member(
        &self,
        project_id: ProjectId,
        year: Year,
        organization_id: RemoteId,
        name: &str,
    ) -> RemoteId {
        let mut state = self.state.lock().await;
        let id = state.issue_id();
        state.members.push(MemberRecord {
            id,
            organization_id,
            project_planning_id: Some(project_id),
            year: Some(year),
            member_name: Some(name.to_string()),
            position: None,
            role: None,
            phone: None,
            mobile: None,
            email: None,
        });
        id
    }

    /// Stored organizations of one project year, bypassing call recording
    pub async fn organizations(&self, project_id: ProjectId, year: Year) -> Vec<OrganizationRecord> {
        self.state
            .lock()
            .await
            .organizations
            .iter()
            .filter(|o| o.project_planning_id == Some(project_id) && o.year == Some(year))
            .cloned()
            .collect()
    }

    pub async fn members(&self, project_id: ProjectId, year: Year) -> Vec<MemberRecord> {
        self.state
            .lock()
            .await
            .members
            .iter()
            .filter(|m| m.project_planning_id == Some(project_id) && m.year == Some(year))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ConsortiumApi for MemoryConsortiumApi {
    async fn list_organizations(
        &self,
        project_id: ProjectId,
        year: Year,
    ) -> Result<Vec<OrganizationRecord>> {
        self.enter(ApiCall::ListOrganizations).await?;
        Ok(self.organizations(project_id, year).await)
    }

    async fn create_organization(
        &self,
        request: &CreateOrganization,
    ) -> Result<OrganizationRecord> {
        let mut state = self.enter(ApiCall::CreateOrganization).await?;

        let record = OrganizationRecord {
            id: state.issue_id(),
            project_planning_id: Some(request.project_planning_id),
            year: Some(request.year),
            organization_type: request.organization_type,
            organization_name: Some(request.organization_name.clone()),
            role_description: Some(request.role_description.clone()),
        };
        state.organizations.push(record.clone());
        Ok(record)
    }

    async fn update_organization(&self, request: &UpdateOrganization) -> Result<()> {
        let mut state = self.enter(ApiCall::UpdateOrganization).await?;

        let id = request
            .id
            .ok_or_else(|| ClientError::Api("Organization id is required".to_string()))?;
        let record = state
            .organizations
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| ClientError::Api("Organization not found".to_string()))?;

        if let Some(t) = request.organization_type {
            record.organization_type = t;
        }
        if let Some(name) = &request.organization_name {
            record.organization_name = Some(name.clone());
        }
        if let Some(text) = &request.role_description {
            record.role_description = Some(text.clone());
        }
        Ok(())
    }

    async fn delete_organization(&self, id: RemoteId) -> Result<()> {
        let mut state = self.enter(ApiCall::DeleteOrganization).await?;

        let before = state.organizations.len();
        state.organizations.retain(|o| o.id != id);
        if state.organizations.len() == before {
            return Err(ClientError::Api("Organization not found".to_string()));
        }
        state.members.retain(|m| m.organization_id != id);
        Ok(())
    }

    async fn copy_organizations(&self, request: &CopyYears) -> Result<String> {
        let mut state = self.enter(ApiCall::CopyOrganizations).await?;

        let project = Some(request.project_planning_id);
        let source: Vec<OrganizationRecord> = state
            .organizations
            .iter()
            .filter(|o| o.project_planning_id == project && o.year == Some(request.source_year))
            .cloned()
            .collect();

        for &target in &request.target_years {
            let replaced: Vec<RemoteId> = state
                .organizations
                .iter()
                .filter(|o| o.project_planning_id == project && o.year == Some(target))
                .map(|o| o.id)
                .collect();
            state.organizations.retain(|o| !replaced.contains(&o.id));
            state.members.retain(|m| !replaced.contains(&m.organization_id));

            for record in &source {
                let id = state.issue_id();
                state.copied.insert((record.id, target), id);
                state.organizations.push(OrganizationRecord {
                    id,
                    year: Some(target),
                    ..record.clone()
                });
            }
        }

        Ok(format!(
            "Copied {} organizations to {} years",
            source.len(),
            request.target_years.len()
        ))
    }

    async fn list_members(&self, project_id: ProjectId, year: Year) -> Result<Vec<MemberRecord>> {
        self.enter(ApiCall::ListMembers).await?;
        Ok(self.members(project_id, year).await)
    }

    async fn create_member(&self, request: &CreateMember) -> Result<MemberRecord> {
        let mut state = self.enter(ApiCall::CreateMember).await?;

        if !state.organizations.iter().any(|o| o.id == request.organization_id) {
            return Err(ClientError::Api("Organization not found".to_string()));
        }

        let record = MemberRecord {
            id: state.issue_id(),
            organization_id: request.organization_id,
            project_planning_id: Some(request.project_planning_id),
            year: Some(request.year),
            member_name: Some(request.member_name.clone()),
            position: Some(request.position.clone()),
            role: Some(request.role.clone()),
            phone: Some(request.phone.clone()),
            mobile: Some(request.mobile.clone()),
            email: Some(request.email.clone()),
        };
        state.members.push(record.clone());
        Ok(record)
    }

    async fn update_member(&self, request: &UpdateMember) -> Result<()> {
        let mut state = self.enter(ApiCall::UpdateMember).await?;

        let record = state
            .members
            .iter_mut()
            .find(|m| m.id == request.id)
            .ok_or_else(|| ClientError::Api("Member not found".to_string()))?;

        record.member_name = Some(request.member_name.clone());
        record.position = Some(request.position.clone());
        record.role = Some(request.role.clone());
        record.phone = Some(request.phone.clone());
        record.mobile = Some(request.mobile.clone());
        record.email = Some(request.email.clone());
        Ok(())
    }

    async fn delete_member(&self, id: RemoteId) -> Result<()> {
        let mut state = self.enter(ApiCall::DeleteMember).await?;

        let before = state.members.len();
        state.members.retain(|m| m.id != id);
        if state.members.len() == before {
            return Err(ClientError::Api("Member not found".to_string()));
        }
        Ok(())
    }

    async fn copy_members(&self, request: &CopyYears) -> Result<String> {
        let mut state = self.enter(ApiCall::CopyMembers).await?;

        let project = Some(request.project_planning_id);
        let source: Vec<MemberRecord> = state
            .members
            .iter()
            .filter(|m| m.project_planning_id == project && m.year == Some(request.source_year))
            .cloned()
            .collect();

        let mut copied = 0;
        for &target in &request.target_years {
            for record in &source {
                // Members follow the organization copy made for the same target year
                let Some(&organization_id) = state.copied.get(&(record.organization_id, target))
                else {
                    continue;
                };
                let id = state.issue_id();
                state.members.push(MemberRecord {
                    id,
                    organization_id,
                    year: Some(target),
                    ..record.clone()
                });
                copied += 1;
            }
        }

        Ok(format!("Copied {} members", copied))
    }
}
