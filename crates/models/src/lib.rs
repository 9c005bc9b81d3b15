// Core modules
pub mod entity;
pub mod organization;
pub mod project;

// Wire types for the portal API
pub mod api;

// List screen helpers
pub mod pagination;

// Re-export commonly used types
pub use entity::{EntityId, LocalId, RemoteId, DRAFT_PREFIX};
pub use organization::{Member, MemberFields, Organization, OrganizationType};
pub use project::{ProjectId, ProjectKind, ProjectMode, Year, MAX_DURATION};
pub use api::{
    ApiResponse, CopyYears, CreateMember, CreateOrganization, MemberRecord,
    OrganizationRecord, UpdateMember, UpdateOrganization, GENERIC_ERROR,
};
pub use pagination::{filter_by_keyword, paginate, Page, PageRequest};
