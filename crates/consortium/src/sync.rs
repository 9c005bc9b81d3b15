use crate::error::{ConsortiumError, Result};
use crate::events::{ConsortiumEvent, EventBus};
use crate::id_generator::IdGenerator;
use crate::propagation::PropagationStatus;
use crate::session::{MemberEdit, MemberEditSession};
use crate::store::ConsortiumStore;
use rimp_client::ConsortiumApi;
use rimp_models::{
    CreateMember, CreateOrganization, EntityId, Member, MemberFields, MemberRecord, Organization,
    OrganizationRecord, OrganizationType, ProjectId, ProjectMode, UpdateMember,
    UpdateOrganization, Year,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use validator::Validate;

/// Keeps a project's consortium in step with the remote store.
///
/// Organizations and members are first created as drafts and only reach the
/// store on an explicit save. Every remote mutation is followed by a refetch
/// of the affected year, merged into the local store so drafts survive.
/// Failures are published as [`ConsortiumEvent::Alert`] and returned; local
/// state is left as it was before the attempt.
pub struct ConsortiumSync {
    pub(crate) api: Arc<dyn ConsortiumApi>,
    pub(crate) project_id: ProjectId,
    pub(crate) mode: ProjectMode,
    selected_year: Year,
    pub(crate) store: ConsortiumStore,
    ids: IdGenerator,
    editing: MemberEditSession,
    pub(crate) events: EventBus,
    pub(crate) propagation: PropagationStatus,
}

impl ConsortiumSync {
    pub fn new(api: Arc<dyn ConsortiumApi>, project_id: ProjectId, mode: ProjectMode) -> Self {
        Self {
            api,
            project_id,
            mode,
            selected_year: 1,
            store: ConsortiumStore::new(),
            ids: IdGenerator::new(),
            editing: MemberEditSession::default(),
            events: EventBus::new(),
            propagation: PropagationStatus::default(),
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn mode(&self) -> ProjectMode {
        self.mode
    }

    pub fn store(&self) -> &ConsortiumStore {
        &self.store
    }

    pub fn editing(&self) -> &MemberEditSession {
        &self.editing
    }

    pub fn is_propagating(&self) -> bool {
        self.propagation.is_running()
    }

    /// Handle that reports whether a copy between years is in flight, usable
    /// while the sync itself is borrowed by that copy
    pub fn propagation_status(&self) -> PropagationStatus {
        self.propagation.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsortiumEvent> {
        self.events.subscribe()
    }

    /// Year that local edits apply to. Single-year projects always use year 1.
    pub fn active_year(&self) -> Year {
        if self.mode.is_multi() {
            self.selected_year
        } else {
            1
        }
    }

    pub fn select_year(&mut self, year: Year) -> Result<()> {
        if !self.mode.contains(year) {
            return Err(ConsortiumError::Validation(format!(
                "Year {} is outside the project's {} year(s)",
                year, self.mode.duration
            )));
        }
        self.selected_year = year;
        Ok(())
    }

    /// Switch between single- and multi-year tracking.
    ///
    /// Nothing is deleted remotely or locally; only the visible years change.
    pub fn set_mode(&mut self, mode: ProjectMode) {
        tracing::debug!(
            "Project {} mode {:?}/{} -> {:?}/{}",
            self.project_id,
            self.mode.kind,
            self.mode.duration,
            mode.kind,
            mode.duration
        );
        self.mode = mode;
        if !mode.contains(self.selected_year) {
            self.selected_year = 1;
        }
        self.notify();
    }

    /// Organizations of the active year, drafts included
    pub fn organizations(&self) -> Vec<Organization> {
        self.store.get_year(self.active_year())
    }

    /// Confirmed consortium across the visible years, as reported to subscribers
    pub fn persisted_view(&self) -> Vec<Organization> {
        self.store.persisted_view(&self.mode.years())
    }

    pub(crate) fn notify(&self) {
        self.events.changed(self.persisted_view());
    }

    /// Log a failure, alert the user and hand the error back for `?`
    pub(crate) fn fail(&self, action: &str, err: impl Into<ConsortiumError>) -> ConsortiumError {
        let err = err.into();
        match &err {
            ConsortiumError::Transport(detail) => tracing::error!("{} failed: {}", action, detail),
            other => tracing::warn!("{} failed: {}", action, other),
        }
        self.events.alert(err.user_message());
        err
    }

    fn not_found(&self, action: &str, what: &str, id: &EntityId) -> ConsortiumError {
        self.fail(
            action,
            ConsortiumError::NotFound(format!("{} {} in year {}", what, id, self.active_year())),
        )
    }

    // ========================================================================
    // REFETCH
    // ========================================================================

    /// Load every visible year from the store
    pub async fn load(&mut self) -> Result<()> {
        for year in self.mode.years() {
            self.refresh_year(year).await?;
        }
        Ok(())
    }

    /// Refetch a year's organizations, then its members, and notify
    pub async fn refresh_year(&mut self, year: Year) -> Result<()> {
        self.fetch_organizations(year).await?;
        self.fetch_members(year).await?;
        self.notify();
        Ok(())
    }

    async fn fetch_organizations(&mut self, year: Year) -> Result<()> {
        let records = self
            .api
            .list_organizations(self.project_id, year)
            .await
            .map_err(|e| self.fail("Load organizations", e))?;

        let organizations = records
            .into_iter()
            .map(OrganizationRecord::into_organization)
            .collect();
        self.store.reconcile_organizations(year, organizations);
        Ok(())
    }

    async fn fetch_members(&mut self, year: Year) -> Result<()> {
        let records = self
            .api
            .list_members(self.project_id, year)
            .await
            .map_err(|e| self.fail("Load members", e))?;

        let members = records
            .into_iter()
            .map(|r| (r.organization_id, r.into_member()))
            .collect();
        self.store.reconcile_members(year, members);
        Ok(())
    }

    // ========================================================================
    // ORGANIZATIONS
    // ========================================================================

    /// Append a draft organization to the active year. No remote call.
    pub fn add_organization(&mut self) -> EntityId {
        let id = EntityId::Draft(self.ids.next_local_id());
        let year = self.active_year();
        self.store.push(year, Organization::draft(id.clone()));
        tracing::debug!("Added draft organization {} to year {}", id, year);
        self.notify();
        id
    }

    /// Create a draft organization remotely, or push a persisted one's fields.
    /// Returns the organization's id after the save.
    pub async fn save_organization(&mut self, id: &EntityId) -> Result<EntityId> {
        let year = self.active_year();
        self.save_organization_in(year, id).await
    }

    async fn save_organization_in(&mut self, year: Year, id: &EntityId) -> Result<EntityId> {
        const ACTION: &str = "Save organization";

        let org = match self.store.organization(year, id) {
            Some(org) => org.clone(),
            None => return Err(self.not_found(ACTION, "Organization", id)),
        };

        let saved_id = match id {
            EntityId::Draft(_) => {
                let request = CreateOrganization {
                    project_planning_id: self.project_id,
                    year,
                    organization_type: org.organization_type,
                    organization_name: org.name.clone(),
                    role_description: org.role_description.clone(),
                };
                request.validate().map_err(|e| self.fail(ACTION, e))?;

                let record = self
                    .api
                    .create_organization(&request)
                    .await
                    .map_err(|e| self.fail(ACTION, e))?;

                let persisted = record.into_organization();
                let new_id = persisted.id.clone();
                self.store.promote_organization(year, id, persisted);
                self.editing.retarget_organization(id, &new_id);
                tracing::info!(
                    "Created organization {} for project {} year {}",
                    new_id,
                    self.project_id,
                    year
                );
                new_id
            }
            EntityId::Persisted(remote) => {
                let request = UpdateOrganization {
                    id: Some(*remote),
                    organization_type: Some(org.organization_type),
                    organization_name: Some(org.name.clone()),
                    role_description: Some(org.role_description.clone()),
                };
                request.validate().map_err(|e| self.fail(ACTION, e))?;

                self.api
                    .update_organization(&request)
                    .await
                    .map_err(|e| self.fail(ACTION, e))?;
                tracing::info!("Updated organization {}", remote);
                id.clone()
            }
        };

        self.refresh_year(year).await?;
        Ok(saved_id)
    }

    pub async fn rename_organization(&mut self, id: &EntityId, name: &str) -> Result<()> {
        let patch = UpdateOrganization {
            organization_name: Some(name.to_string()),
            ..UpdateOrganization::default()
        };
        self.update_details(id, patch, "Rename organization").await
    }

    pub async fn retype_organization(
        &mut self,
        id: &EntityId,
        organization_type: OrganizationType,
    ) -> Result<()> {
        let patch = UpdateOrganization {
            organization_type: Some(organization_type),
            ..UpdateOrganization::default()
        };
        self.update_details(id, patch, "Change organization type").await
    }

    pub async fn describe_organization(&mut self, id: &EntityId, description: &str) -> Result<()> {
        let patch = UpdateOrganization {
            role_description: Some(description.to_string()),
            ..UpdateOrganization::default()
        };
        self.update_details(id, patch, "Update organization role").await
    }

    /// Drafts change locally; persisted organizations are updated remotely
    /// first and only then locally. No refetch follows.
    async fn update_details(
        &mut self,
        id: &EntityId,
        mut patch: UpdateOrganization,
        action: &str,
    ) -> Result<()> {
        let year = self.active_year();
        if self.store.organization(year, id).is_none() {
            return Err(self.not_found(action, "Organization", id));
        }

        if let EntityId::Persisted(remote) = id {
            patch.id = Some(*remote);
            patch.validate().map_err(|e| self.fail(action, e))?;
            self.api
                .update_organization(&patch)
                .await
                .map_err(|e| self.fail(action, e))?;
            tracing::info!("{}: organization {} updated", action, remote);
        }

        if let Some(org) = self.store.organization_mut(year, id) {
            patch.apply_to(org);
        }
        self.notify();
        Ok(())
    }

    /// Remove a draft locally, or delete a persisted organization remotely and refetch
    pub async fn delete_organization(&mut self, id: &EntityId) -> Result<()> {
        const ACTION: &str = "Delete organization";

        let year = self.active_year();
        if self.store.organization(year, id).is_none() {
            return Err(self.not_found(ACTION, "Organization", id));
        }

        match id {
            EntityId::Draft(_) => {
                self.store.remove(year, id);
                tracing::debug!("Discarded draft organization {}", id);
            }
            EntityId::Persisted(remote) => {
                self.api
                    .delete_organization(*remote)
                    .await
                    .map_err(|e| self.fail(ACTION, e))?;
                tracing::info!("Deleted organization {}", remote);
                self.store.remove(year, id);
            }
        }

        if self
            .editing
            .current()
            .is_some_and(|edit| edit.year == year && &edit.organization_id == id)
        {
            self.editing.finish();
        }

        if id.is_draft() {
            self.notify();
            Ok(())
        } else {
            self.refresh_year(year).await
        }
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    /// Append a draft member to an organization of the active year and start
    /// editing it. No remote call.
    ///
    /// Only one member is edited at a time: if another never-saved draft
    /// member was being edited, it is dropped, so adding twice in a row
    /// leaves a single draft.
    pub fn add_member(&mut self, organization_id: &EntityId) -> Result<EntityId> {
        let year = self.active_year();
        let member_id = EntityId::Draft(self.ids.next_local_id());

        match self.store.organization_mut(year, organization_id) {
            Some(org) => org.members.push(Member::draft(member_id.clone())),
            None => return Err(self.not_found("Add member", "Organization", organization_id)),
        }
        tracing::debug!("Added draft member {} to organization {}", member_id, organization_id);

        self.start_edit(MemberEdit {
            year,
            organization_id: organization_id.clone(),
            member_id: member_id.clone(),
            draft: MemberFields::default(),
        });
        self.notify();
        Ok(member_id)
    }

    /// Start editing a member of the active year, replacing any edit in progress
    pub fn begin_edit(&mut self, organization_id: &EntityId, member_id: &EntityId) -> Result<()> {
        let year = self.active_year();
        let fields = match self
            .store
            .organization(year, organization_id)
            .and_then(|org| org.member(member_id))
        {
            Some(member) => member.fields.clone(),
            None => return Err(self.not_found("Edit member", "Member", member_id)),
        };

        self.start_edit(MemberEdit {
            year,
            organization_id: organization_id.clone(),
            member_id: member_id.clone(),
            draft: fields,
        });
        Ok(())
    }

    fn start_edit(&mut self, edit: MemberEdit) {
        let member_id = edit.member_id.clone();
        if let Some(previous) = self.editing.begin(edit) {
            if previous.member_id != member_id {
                self.discard_unsaved(previous);
            }
        }
    }

    /// Scratch fields of the member being edited
    pub fn edit_draft(&mut self) -> Option<&mut MemberFields> {
        self.editing.draft_mut()
    }

    /// Leave the edit session without saving. No remote call.
    pub fn cancel_edit(&mut self) {
        if let Some(edit) = self.editing.finish() {
            self.discard_unsaved(edit);
            self.notify();
        }
    }

    // A draft member only exists to be edited; once its edit is abandoned it goes too.
    fn discard_unsaved(&mut self, edit: MemberEdit) {
        if edit.member_id.is_draft() {
            self.store
                .remove_member(edit.year, &edit.organization_id, &edit.member_id);
            tracing::debug!("Discarded draft member {}", edit.member_id);
        }
    }

    /// Persist the member being edited.
    ///
    /// A draft member of a draft organization first saves the organization
    /// and waits for its refetch, then creates the member against the new
    /// organization id. Draft members of persisted organizations are created,
    /// persisted members are updated. The year's members are refetched and
    /// the session returns to idle. On failure the session stays open.
    pub async fn save_member(&mut self) -> Result<EntityId> {
        const ACTION: &str = "Save member";

        let edit = match self.editing.current() {
            Some(edit) => edit.clone(),
            None => {
                return Err(self.fail(
                    ACTION,
                    ConsortiumError::InvalidState("No member is being edited".to_string()),
                ))
            }
        };
        let year = edit.year;

        let organization_id = match &edit.organization_id {
            EntityId::Draft(_) => {
                self.save_organization_in(year, &edit.organization_id)
                    .await?
            }
            persisted => persisted.clone(),
        };
        let Some(organization_remote) = organization_id.remote() else {
            return Err(self.fail(
                ACTION,
                ConsortiumError::InvalidState(format!(
                    "Organization {} has no store id",
                    organization_id
                )),
            ));
        };

        let saved_id = match &edit.member_id {
            EntityId::Draft(_) => {
                let request =
                    CreateMember::new(organization_remote, self.project_id, year, &edit.draft);
                request.validate().map_err(|e| self.fail(ACTION, e))?;

                let record: MemberRecord = self
                    .api
                    .create_member(&request)
                    .await
                    .map_err(|e| self.fail(ACTION, e))?;
                tracing::info!(
                    "Created member {} in organization {}",
                    record.id,
                    organization_remote
                );

                let saved_id = EntityId::Persisted(record.id);
                if let Some(member) = self
                    .store
                    .organization_mut(year, &organization_id)
                    .and_then(|org| org.member_mut(&edit.member_id))
                {
                    *member = record.into_member();
                }
                saved_id
            }
            EntityId::Persisted(remote) => {
                let request = UpdateMember::new(*remote, &edit.draft);
                request.validate().map_err(|e| self.fail(ACTION, e))?;

                self.api
                    .update_member(&request)
                    .await
                    .map_err(|e| self.fail(ACTION, e))?;
                tracing::info!("Updated member {}", remote);

                if let Some(member) = self
                    .store
                    .organization_mut(year, &organization_id)
                    .and_then(|org| org.member_mut(&edit.member_id))
                {
                    member.fields = edit.draft.clone();
                }
                edit.member_id.clone()
            }
        };

        self.editing.finish();
        self.fetch_members(year).await?;
        self.notify();
        Ok(saved_id)
    }

    /// Remove a draft member locally, or delete a persisted one remotely and refetch members
    pub async fn delete_member(
        &mut self,
        organization_id: &EntityId,
        member_id: &EntityId,
    ) -> Result<()> {
        const ACTION: &str = "Delete member";

        let year = self.active_year();
        let exists = self
            .store
            .organization(year, organization_id)
            .is_some_and(|org| org.member(member_id).is_some());
        if !exists {
            return Err(self.not_found(ACTION, "Member", member_id));
        }

        if let EntityId::Persisted(remote) = member_id {
            self.api
                .delete_member(*remote)
                .await
                .map_err(|e| self.fail(ACTION, e))?;
            tracing::info!("Deleted member {}", remote);
        }

        self.store.remove_member(year, organization_id, member_id);
        if self.editing.is_editing(member_id) {
            self.editing.finish();
        }

        if member_id.is_persisted() {
            self.fetch_members(year).await?;
        }
        self.notify();
        Ok(())
    }
}
