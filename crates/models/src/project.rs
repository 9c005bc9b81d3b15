use serde::{Deserialize, Serialize};

/// Identifier of a project plan in the remote store
pub type ProjectId = i64;

/// Project year index (연차), starting at 1
pub type Year = u32;

/// Longest project span tracked by the portal, in years
pub const MAX_DURATION: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Single,
    Multi,
}

/// Whether a project's consortium is tracked per year, and for how many years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMode {
    pub kind: ProjectKind,
    pub duration: u32,
}

impl Default for ProjectMode {
    fn default() -> Self {
        Self::multi(2)
    }
}

impl ProjectMode {
    pub fn single() -> Self {
        Self {
            kind: ProjectKind::Single,
            duration: 1,
        }
    }

    /// Multi-year mode; duration is clamped to 1..=5
    pub fn multi(duration: u32) -> Self {
        Self {
            kind: ProjectKind::Multi,
            duration: duration.clamp(1, MAX_DURATION),
        }
    }

    pub fn is_multi(&self) -> bool {
        self.kind == ProjectKind::Multi
    }

    /// Years whose data is visible in this mode. Single mode only shows year 1.
    pub fn years(&self) -> Vec<Year> {
        match self.kind {
            ProjectKind::Single => vec![1],
            ProjectKind::Multi => (1..=self.duration).collect(),
        }
    }

    pub fn contains(&self, year: Year) -> bool {
        self.years().contains(&year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_two_year_multi() {
        let mode = ProjectMode::default();
        assert!(mode.is_multi());
        assert_eq!(mode.years(), vec![1, 2]);
    }

    #[test]
    fn test_single_mode_only_year_one() {
        let mode = ProjectMode::single();
        assert_eq!(mode.years(), vec![1]);
        assert!(!mode.contains(2));
    }

    #[test]
    fn test_multi_duration_is_clamped() {
        assert_eq!(ProjectMode::multi(9).duration, 5);
        assert_eq!(ProjectMode::multi(0).duration, 1);
    }
}
