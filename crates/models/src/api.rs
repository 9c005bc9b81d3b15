use crate::entity::{EntityId, RemoteId};
use crate::organization::{Member, MemberFields, Organization, OrganizationType};
use crate::project::{ProjectId, Year};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Message shown when the store fails without saying why
pub const GENERIC_ERROR: &str = "An error occurred";

/// Envelope returned by every portal API route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// User-facing text for a failed response
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| GENERIC_ERROR.to_string())
    }
}

// ============================================================================
// ORGANIZATIONS
// ============================================================================

/// Organization row as returned by `GET /project-consortium-organizations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: RemoteId,
    #[serde(default)]
    pub project_planning_id: Option<ProjectId>,
    #[serde(default)]
    pub year: Option<Year>,
    #[serde(default)]
    pub organization_type: OrganizationType,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub role_description: Option<String>,
}

impl OrganizationRecord {
    /// Domain organization without members; members arrive from a separate fetch
    pub fn into_organization(self) -> Organization {
        Organization {
            id: EntityId::Persisted(self.id),
            name: self.organization_name.unwrap_or_default(),
            organization_type: self.organization_type,
            role_description: self.role_description.unwrap_or_default(),
            members: Vec::new(),
        }
    }
}

/// Request body for `POST /project-consortium-organizations`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub project_planning_id: ProjectId,

    #[validate(range(min = 1, max = 5))]
    pub year: Year,

    pub organization_type: OrganizationType,

    #[validate(length(max = 200))]
    pub organization_name: String,

    #[validate(length(max = 2000))]
    pub role_description: String,
}

/// Request body for `PUT /project-consortium-organizations`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    pub id: Option<RemoteId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<OrganizationType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub organization_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub role_description: Option<String>,
}

impl UpdateOrganization {
    pub fn for_id(id: RemoteId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Apply the present fields to a local organization
    pub fn apply_to(&self, organization: &mut Organization) {
        if let Some(t) = self.organization_type {
            organization.organization_type = t;
        }
        if let Some(name) = &self.organization_name {
            organization.name = name.clone();
        }
        if let Some(text) = &self.role_description {
            organization.role_description = text.clone();
        }
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

/// Member row as returned by `GET /project-consortium-members`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: RemoteId,
    pub organization_id: RemoteId,
    #[serde(default)]
    pub project_planning_id: Option<ProjectId>,
    #[serde(default)]
    pub year: Option<Year>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl MemberRecord {
    pub fn into_member(self) -> Member {
        Member {
            id: EntityId::Persisted(self.id),
            fields: MemberFields {
                name: self.member_name.unwrap_or_default(),
                position: self.position.unwrap_or_default(),
                role: self.role.unwrap_or_default(),
                phone: self.phone.unwrap_or_default(),
                mobile: self.mobile.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
            },
        }
    }
}

/// Request body for `POST /project-consortium-members`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    pub organization_id: RemoteId,
    pub project_planning_id: ProjectId,

    #[validate(range(min = 1, max = 5))]
    pub year: Year,

    #[validate(length(max = 100))]
    pub member_name: String,
    #[validate(length(max = 100))]
    pub position: String,
    #[validate(length(max = 200))]
    pub role: String,
    #[validate(length(max = 50))]
    pub phone: String,
    #[validate(length(max = 50))]
    pub mobile: String,
    #[validate(length(max = 255))]
    pub email: String,
}

impl CreateMember {
    pub fn new(
        organization_id: RemoteId,
        project_planning_id: ProjectId,
        year: Year,
        fields: &MemberFields,
    ) -> Self {
        Self {
            organization_id,
            project_planning_id,
            year,
            member_name: fields.name.clone(),
            position: fields.position.clone(),
            role: fields.role.clone(),
            phone: fields.phone.clone(),
            mobile: fields.mobile.clone(),
            email: fields.email.clone(),
        }
    }
}

/// Request body for `PUT /project-consortium-members`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    pub id: RemoteId,

    #[validate(length(max = 100))]
    pub member_name: String,
    #[validate(length(max = 100))]
    pub position: String,
    #[validate(length(max = 200))]
    pub role: String,
    #[validate(length(max = 50))]
    pub phone: String,
    #[validate(length(max = 50))]
    pub mobile: String,
    #[validate(length(max = 255))]
    pub email: String,
}

impl UpdateMember {
    pub fn new(id: RemoteId, fields: &MemberFields) -> Self {
        Self {
            id,
            member_name: fields.name.clone(),
            position: fields.position.clone(),
            role: fields.role.clone(),
            phone: fields.phone.clone(),
            mobile: fields.mobile.clone(),
            email: fields.email.clone(),
        }
    }
}

// ============================================================================
// BULK COPY
// ============================================================================

/// Request body for the `PATCH` bulk-copy routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyYears {
    pub project_planning_id: ProjectId,
    pub source_year: Year,
    pub target_years: Vec<Year>,
}
