use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role an organization plays in a project consortium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrganizationType {
    #[serde(rename = "주관기관")]
    Lead,
    #[default]
    #[serde(rename = "참여기관")]
    Participant,
    #[serde(rename = "공동연구기관")]
    Joint,
    #[serde(rename = "수요기관")]
    Demand,
}

impl OrganizationType {
    pub const ALL: [OrganizationType; 4] = [
        OrganizationType::Lead,
        OrganizationType::Participant,
        OrganizationType::Joint,
        OrganizationType::Demand,
    ];

    /// Label used by the portal and stored by the remote store
    pub fn label(self) -> &'static str {
        match self {
            OrganizationType::Lead => "주관기관",
            OrganizationType::Participant => "참여기관",
            OrganizationType::Joint => "공동연구기관",
            OrganizationType::Demand => "수요기관",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            OrganizationType::Lead => "lead",
            OrganizationType::Participant => "participant",
            OrganizationType::Joint => "joint",
            OrganizationType::Demand => "demand",
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrganizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        OrganizationType::ALL
            .into_iter()
            .find(|t| t.label() == s || t.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid organization type: {}. Must be one of: lead, participant, joint, demand",
                    s
                )
            })
    }
}

/// Editable member fields, also used as the scratch copy of an edit session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFields {
    pub name: String,
    pub position: String,
    pub role: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
}

/// Person participating in a project on behalf of one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: MemberFields,
}

impl Member {
    pub fn draft(id: EntityId) -> Self {
        Self {
            id,
            fields: MemberFields::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_draft()
    }
}

/// Consortium organization with its members for one project year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    pub name: String,
    pub organization_type: OrganizationType,
    pub role_description: String,
    pub members: Vec<Member>,
}

impl Organization {
    /// Fresh draft: empty name, participant, no members
    pub fn draft(id: EntityId) -> Self {
        Self {
            id,
            name: String::new(),
            organization_type: OrganizationType::default(),
            role_description: String::new(),
            members: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_draft()
    }

    pub fn member(&self, id: &EntityId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn member_mut(&mut self, id: &EntityId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| &m.id == id)
    }

    /// Copy with draft members removed
    pub fn persisted_only(&self) -> Self {
        Self {
            members: self.members.iter().filter(|m| !m.is_new()).cloned().collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LocalId, RemoteId};

    #[test]
    fn test_type_labels_round_trip_through_parse() {
        for t in OrganizationType::ALL {
            assert_eq!(t.label().parse::<OrganizationType>().unwrap(), t);
            assert_eq!(t.tag().parse::<OrganizationType>().unwrap(), t);
        }
        assert!("sponsor".parse::<OrganizationType>().is_err());
    }

    #[test]
    fn test_type_serializes_to_label() {
        let json = serde_json::to_string(&OrganizationType::Joint).unwrap();
        assert_eq!(json, "\"공동연구기관\"");
    }

    #[test]
    fn test_persisted_only_drops_draft_members() {
        let mut org = Organization::draft(EntityId::Persisted(RemoteId(1)));
        org.members.push(Member::draft(EntityId::Persisted(RemoteId(10))));
        org.members
            .push(Member::draft(EntityId::Draft(LocalId::new("temp-x").unwrap())));

        let view = org.persisted_only();
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].id, EntityId::Persisted(RemoteId(10)));
    }
}
