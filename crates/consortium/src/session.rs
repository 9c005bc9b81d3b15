use rimp_models::{EntityId, MemberFields, Year};

/// The single member currently being edited, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MemberEditSession {
    #[default]
    Idle,
    Editing(MemberEdit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEdit {
    pub year: Year,
    pub organization_id: EntityId,
    pub member_id: EntityId,
    /// Scratch copy of the member's fields; written back only on save
    pub draft: MemberFields,
}

impl MemberEditSession {
    /// Start editing, replacing any edit in progress. Returns the replaced edit.
    pub fn begin(&mut self, edit: MemberEdit) -> Option<MemberEdit> {
        match std::mem::replace(self, MemberEditSession::Editing(edit)) {
            MemberEditSession::Editing(previous) => Some(previous),
            MemberEditSession::Idle => None,
        }
    }

    /// Return to idle, handing back the discarded edit
    pub fn finish(&mut self) -> Option<MemberEdit> {
        match std::mem::take(self) {
            MemberEditSession::Editing(edit) => Some(edit),
            MemberEditSession::Idle => None,
        }
    }

    pub fn current(&self) -> Option<&MemberEdit> {
        match self {
            MemberEditSession::Editing(edit) => Some(edit),
            MemberEditSession::Idle => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut MemberFields> {
        match self {
            MemberEditSession::Editing(edit) => Some(&mut edit.draft),
            MemberEditSession::Idle => None,
        }
    }

    pub fn is_editing(&self, member_id: &EntityId) -> bool {
        self.current().is_some_and(|edit| &edit.member_id == member_id)
    }

    /// Point the session at an organization's persisted id after it was saved
    pub fn retarget_organization(&mut self, from: &EntityId, to: &EntityId) {
        if let MemberEditSession::Editing(edit) = self {
            if &edit.organization_id == from {
                edit.organization_id = to.clone();
            }
        }
    }
}
