use rimp_models::{EntityId, Member, Organization, RemoteId, Year};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Organizations of a project keyed by year.
///
/// Entities live in a map keyed by `(year, id)`; a per-year key list keeps
/// display order. Refetched slices are merged in with the `reconcile_*`
/// methods so drafts survive a refetch of their year.
#[derive(Debug, Clone, Default)]
pub struct ConsortiumStore {
    order: BTreeMap<Year, Vec<EntityId>>,
    organizations: HashMap<(Year, EntityId), Organization>,
}

impl ConsortiumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Years that have ever been written, ascending
    pub fn years(&self) -> Vec<Year> {
        self.order.keys().copied().collect()
    }

    /// Organizations of `year` in display order; empty if the year was never set
    pub fn get_year(&self, year: Year) -> Vec<Organization> {
        self.order
            .get(&year)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.organizations.get(&(year, id.clone())))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace one year wholesale. Other years are untouched.
    pub fn set_year(&mut self, year: Year, organizations: Vec<Organization>) {
        self.clear_year(year);
        for org in organizations {
            self.push(year, org);
        }
    }

    fn clear_year(&mut self, year: Year) {
        if let Some(ids) = self.order.remove(&year) {
            for id in ids {
                self.organizations.remove(&(year, id));
            }
        }
    }

    pub fn organization(&self, year: Year, id: &EntityId) -> Option<&Organization> {
        self.organizations.get(&(year, id.clone()))
    }

    pub fn organization_mut(&mut self, year: Year, id: &EntityId) -> Option<&mut Organization> {
        self.organizations.get_mut(&(year, id.clone()))
    }

    /// Append an organization to the end of `year`, replacing one with the same id
    pub fn push(&mut self, year: Year, organization: Organization) {
        let key = (year, organization.id.clone());
        let ids = self.order.entry(year).or_default();
        if !ids.contains(&organization.id) {
            ids.push(organization.id.clone());
        }
        self.organizations.insert(key, organization);
    }

    pub fn remove(&mut self, year: Year, id: &EntityId) -> Option<Organization> {
        if let Some(ids) = self.order.get_mut(&year) {
            ids.retain(|existing| existing != id);
        }
        self.organizations.remove(&(year, id.clone()))
    }

    pub fn remove_member(
        &mut self,
        year: Year,
        organization_id: &EntityId,
        member_id: &EntityId,
    ) -> Option<Member> {
        let org = self.organization_mut(year, organization_id)?;
        let index = org.members.iter().position(|m| &m.id == member_id)?;
        Some(org.members.remove(index))
    }

    /// Locate a member anywhere in `year`, returning its owning organization id
    pub fn find_member(&self, year: Year, member_id: &EntityId) -> Option<(EntityId, &Member)> {
        self.order.get(&year)?.iter().find_map(|org_id| {
            let org = self.organizations.get(&(year, org_id.clone()))?;
            org.member(member_id).map(|m| (org_id.clone(), m))
        })
    }

    /// Merge a refetched organization slice into `year`.
    ///
    /// Persisted organizations take the fetched fields and keep their local
    /// position and members until the member refetch lands; those missing from
    /// the fetch are dropped. Drafts are kept. New organizations are appended
    /// in fetch order.
    pub fn reconcile_organizations(&mut self, year: Year, fetched: Vec<Organization>) {
        let fetched_ids: HashSet<EntityId> = fetched.iter().map(|o| o.id.clone()).collect();
        let previous = self.order.remove(&year).unwrap_or_default();

        let mut order = Vec::with_capacity(previous.len().max(fetched.len()));
        for id in previous {
            if id.is_draft() || fetched_ids.contains(&id) {
                order.push(id);
            } else {
                self.organizations.remove(&(year, id));
            }
        }

        for mut org in fetched {
            let key = (year, org.id.clone());
            match self.organizations.get(&key) {
                Some(existing) => org.members = existing.members.clone(),
                None => order.push(org.id.clone()),
            }
            self.organizations.insert(key, org);
        }

        self.order.insert(year, order);
    }

    /// Merge a refetched member list into `year`.
    ///
    /// Each persisted organization's persisted members are replaced by the
    /// fetched ones; draft members stay at the end of their organization.
    /// Members of organizations unknown to the store are ignored.
    pub fn reconcile_members(&mut self, year: Year, fetched: Vec<(RemoteId, Member)>) {
        let mut by_org: HashMap<RemoteId, Vec<Member>> = HashMap::new();
        for (org_id, member) in fetched {
            by_org.entry(org_id).or_default().push(member);
        }

        let Some(ids) = self.order.get(&year) else {
            return;
        };

        for id in ids {
            let Some(remote) = id.remote() else {
                continue;
            };
            let Some(org) = self.organizations.get_mut(&(year, id.clone())) else {
                continue;
            };

            let drafts: Vec<Member> = org.members.drain(..).filter(Member::is_new).collect();
            let mut members = by_org.remove(&remote).unwrap_or_default();
            members.extend(drafts);
            org.members = members;
        }

        if !by_org.is_empty() {
            tracing::debug!(
                "Ignored members of {} organizations not present in year {}",
                by_org.len(),
                year
            );
        }
    }

    /// Replace a draft organization in place by its persisted copy.
    ///
    /// The draft's members (all drafts themselves) move to the persisted copy
    /// so pending member edits keep a home.
    pub fn promote_organization(&mut self, year: Year, draft_id: &EntityId, mut persisted: Organization) {
        let carried = self
            .organizations
            .remove(&(year, draft_id.clone()))
            .map(|draft| draft.members)
            .unwrap_or_default();
        persisted.members.extend(carried);

        let ids = self.order.entry(year).or_default();
        match ids.iter().position(|id| id == draft_id) {
            Some(index) => ids[index] = persisted.id.clone(),
            None => ids.push(persisted.id.clone()),
        }
        self.organizations.insert((year, persisted.id.clone()), persisted);
    }

    /// Confirmed state of the given years, flattened in year order.
    /// Draft organizations and draft members are left out.
    pub fn persisted_view(&self, years: &[Year]) -> Vec<Organization> {
        years
            .iter()
            .flat_map(|&year| self.get_year(year))
            .filter(|org| !org.is_new())
            .map(|org| org.persisted_only())
            .collect()
    }
}
