use rimp_client::{ApiCall, MemoryConsortiumApi};
use rimp_consortium::{ConsortiumError, ConsortiumEvent, ConsortiumSync, MemberEditSession};
use rimp_models::{EntityId, OrganizationType, ProjectMode, RemoteId, GENERIC_ERROR};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const PROJECT: i64 = 7;

fn setup(mode: ProjectMode) -> (Arc<MemoryConsortiumApi>, ConsortiumSync) {
    let api = Arc::new(MemoryConsortiumApi::new());
    let sync = ConsortiumSync::new(api.clone(), PROJECT, mode);
    (api, sync)
}

fn drain(rx: &mut broadcast::Receiver<ConsortiumEvent>) -> Vec<ConsortiumEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn alerts(events: &[ConsortiumEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ConsortiumEvent::Alert { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_drafts_never_reach_the_store() {
    let (api, mut sync) = setup(ProjectMode::multi(3));

    let first = sync.add_organization();
    let second = sync.add_organization();
    sync.add_member(&first).unwrap();
    sync.add_member(&second).unwrap();
    sync.rename_organization(&first, "KIST").await.unwrap();
    sync.retype_organization(&second, OrganizationType::Demand)
        .await
        .unwrap();

    assert!(api.calls().await.is_empty());
    assert_eq!(sync.organizations().len(), 2);
    assert_eq!(sync.organizations()[0].name, "KIST");
    assert!(sync.persisted_view().is_empty());
}

#[tokio::test]
async fn test_deleting_a_draft_is_local() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let draft = sync.add_organization();

    sync.delete_organization(&draft).await.unwrap();

    assert!(api.calls().await.is_empty());
    assert!(sync.organizations().is_empty());
}

#[tokio::test]
async fn test_saving_a_draft_creates_then_refetches() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let draft = sync.add_organization();
    sync.rename_organization(&draft, "KAIST").await.unwrap();
    sync.retype_organization(&draft, OrganizationType::Lead)
        .await
        .unwrap();

    let saved = sync.save_organization(&draft).await.unwrap();

    assert!(saved.is_persisted());
    assert_eq!(
        api.calls().await,
        vec![
            ApiCall::CreateOrganization,
            ApiCall::ListOrganizations,
            ApiCall::ListMembers
        ]
    );
    let orgs = sync.organizations();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].id, saved);
    assert_eq!(orgs[0].organization_type, OrganizationType::Lead);

    let stored = api.organizations(PROJECT, 1).await;
    assert_eq!(stored[0].organization_name.as_deref(), Some("KAIST"));
}

#[tokio::test]
async fn test_saving_member_of_draft_organization_saves_organization_first() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let org = sync.add_organization();
    sync.rename_organization(&org, "SNU").await.unwrap();
    let member = sync.add_member(&org).unwrap();
    assert!(matches!(sync.editing(), MemberEditSession::Editing(_)));

    {
        let draft = sync.edit_draft().unwrap();
        draft.name = "Park Jisoo".to_string();
        draft.email = "park@snu.ac.kr".to_string();
    }
    let saved = sync.save_member().await.unwrap();

    assert_ne!(saved, member);
    assert_eq!(sync.editing(), &MemberEditSession::Idle);
    assert_eq!(
        api.mutation_calls().await,
        vec![ApiCall::CreateOrganization, ApiCall::CreateMember]
    );

    let orgs = sync.organizations();
    assert_eq!(orgs.len(), 1);
    assert!(orgs[0].id.is_persisted());
    assert_eq!(orgs[0].members.len(), 1);
    assert_eq!(orgs[0].members[0].id, saved);
    assert_eq!(orgs[0].members[0].fields.name, "Park Jisoo");

    let stored = api.members(PROJECT, 1).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(EntityId::Persisted(stored[0].organization_id), orgs[0].id);
}

#[tokio::test]
async fn test_editing_persisted_member_updates_it() {
    let (api, mut sync) = setup(ProjectMode::single());
    let org = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    let member = api.seed_member(PROJECT, 1, org, "Kim").await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    let org_id = EntityId::Persisted(org);
    let member_id = EntityId::Persisted(member);
    sync.begin_edit(&org_id, &member_id).unwrap();
    sync.edit_draft().unwrap().position = "PI".to_string();
    sync.save_member().await.unwrap();

    assert_eq!(api.mutation_calls().await, vec![ApiCall::UpdateMember]);
    assert_eq!(api.members(PROJECT, 1).await[0].position.as_deref(), Some("PI"));
    let orgs = sync.organizations();
    assert_eq!(orgs[0].members[0].fields.position, "PI");
}

#[tokio::test]
async fn test_failed_member_save_keeps_session_open() {
    let (api, mut sync) = setup(ProjectMode::single());
    let org = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    sync.load().await.unwrap();
    let mut rx = sync.subscribe();

    sync.add_member(&EntityId::Persisted(org)).unwrap();
    api.fail(ApiCall::CreateMember, "Member limit reached").await;
    let err = sync.save_member().await.unwrap_err();

    assert!(matches!(err, ConsortiumError::Rejected(ref m) if m == "Member limit reached"));
    assert!(matches!(sync.editing(), MemberEditSession::Editing(_)));
    assert_eq!(sync.organizations()[0].members.len(), 1);
    assert_eq!(alerts(&drain(&mut rx)), vec!["Member limit reached".to_string()]);
}

#[tokio::test]
async fn test_cancel_discards_new_member_without_remote_calls() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let org = sync.add_organization();
    sync.add_member(&org).unwrap();

    sync.cancel_edit();

    assert_eq!(sync.editing(), &MemberEditSession::Idle);
    assert!(sync.organizations()[0].members.is_empty());
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn test_deleting_persisted_organization() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    api.seed_organization(PROJECT, 1, "SNU", OrganizationType::Joint)
        .await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    sync.delete_organization(&EntityId::Persisted(kist))
        .await
        .unwrap();

    assert_eq!(api.mutation_calls().await, vec![ApiCall::DeleteOrganization]);
    let names: Vec<String> = sync.organizations().into_iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["SNU".to_string()]);
}

#[tokio::test]
async fn test_failed_delete_leaves_state_unchanged() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    sync.load().await.unwrap();
    let before = sync.organizations();
    let mut rx = sync.subscribe();

    api.fail(ApiCall::DeleteOrganization, "Organization has budget lines")
        .await;
    let err = sync
        .delete_organization(&EntityId::Persisted(kist))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Organization has budget lines");
    assert_eq!(sync.organizations(), before);
    assert_eq!(
        alerts(&drain(&mut rx)),
        vec!["Organization has budget lines".to_string()]
    );
}

#[tokio::test]
async fn test_renaming_persisted_organization_updates_remote() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    sync.rename_organization(&EntityId::Persisted(kist), "KIST Gangneung")
        .await
        .unwrap();

    assert_eq!(api.calls().await, vec![ApiCall::UpdateOrganization]);
    assert_eq!(sync.organizations()[0].name, "KIST Gangneung");

    api.fail(ApiCall::UpdateOrganization, "Name already used").await;
    assert!(sync
        .rename_organization(&EntityId::Persisted(kist), "Other")
        .await
        .is_err());
    assert_eq!(sync.organizations()[0].name, "KIST Gangneung");
}

#[tokio::test]
async fn test_changed_events_report_persisted_entities_only() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    api.seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    api.seed_organization(PROJECT, 2, "KAIST", OrganizationType::Joint)
        .await;
    let mut rx = sync.subscribe();

    sync.load().await.unwrap();
    sync.add_organization();

    let last_change = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            ConsortiumEvent::Changed { organizations } => Some(organizations),
            _ => None,
        })
        .last()
        .unwrap();
    let names: Vec<String> = last_change.into_iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["KIST".to_string(), "KAIST".to_string()]);
}

#[tokio::test]
async fn test_switching_to_single_year_keeps_other_years() {
    let (api, mut sync) = setup(ProjectMode::multi(3));
    api.seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    api.seed_organization(PROJECT, 3, "POSTECH", OrganizationType::Joint)
        .await;
    sync.load().await.unwrap();
    sync.select_year(3).unwrap();
    api.clear_calls().await;

    sync.set_mode(ProjectMode::single());

    assert!(api.calls().await.is_empty());
    assert_eq!(sync.active_year(), 1);
    assert_eq!(sync.organizations()[0].name, "KIST");
    assert_eq!(sync.persisted_view().len(), 1);
    assert_eq!(sync.store().get_year(3)[0].name, "POSTECH");
}

#[tokio::test]
async fn test_propagation_copies_then_refreshes_every_year() {
    let (api, mut sync) = setup(ProjectMode::multi(3));
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    api.seed_member(PROJECT, 1, kist, "Kim").await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    let outcome = sync.propagate(&[3, 2]).await.unwrap();

    assert_eq!(outcome.target_years, vec![2, 3]);
    assert!(!sync.is_propagating());
    assert_eq!(
        api.calls().await,
        vec![
            ApiCall::CopyOrganizations,
            ApiCall::CopyMembers,
            ApiCall::ListOrganizations,
            ApiCall::ListMembers,
            ApiCall::ListOrganizations,
            ApiCall::ListMembers,
            ApiCall::ListOrganizations,
            ApiCall::ListMembers,
        ]
    );
    for year in [2, 3] {
        let orgs = sync.store().get_year(year);
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].members[0].fields.name, "Kim");
    }
}

#[tokio::test]
async fn test_failed_organization_copy_skips_member_copy() {
    let (api, mut sync) = setup(ProjectMode::multi(3));
    let mut rx = sync.subscribe();
    api.fail(ApiCall::CopyOrganizations, "Target year is locked")
        .await;

    let err = sync.propagate(&[2, 3]).await.unwrap_err();

    assert!(err.to_string().contains("Target year is locked"));
    assert_eq!(api.calls().await, vec![ApiCall::CopyOrganizations]);
    assert!(!sync.is_propagating());
    assert_eq!(alerts(&drain(&mut rx)), vec!["Target year is locked".to_string()]);
}

#[tokio::test]
async fn test_propagation_rejects_invalid_requests() {
    let (api, mut sync) = setup(ProjectMode::single());
    assert!(matches!(
        sync.propagate(&[2]).await,
        Err(ConsortiumError::InvalidState(_))
    ));

    sync.set_mode(ProjectMode::multi(3));
    assert!(matches!(
        sync.propagate(&[1]).await,
        Err(ConsortiumError::Validation(_))
    ));
    assert!(matches!(
        sync.propagate(&[4]).await,
        Err(ConsortiumError::Validation(_))
    ));
    assert!(matches!(
        sync.propagate(&[]).await,
        Err(ConsortiumError::Validation(_))
    ));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn test_deleting_persisted_member_refetches_members() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let org = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    let kim = api.seed_member(PROJECT, 1, org, "Kim").await;
    api.seed_member(PROJECT, 1, org, "Lee").await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    sync.delete_member(&EntityId::Persisted(org), &EntityId::Persisted(kim))
        .await
        .unwrap();

    assert_eq!(
        api.calls().await,
        vec![ApiCall::DeleteMember, ApiCall::ListMembers]
    );
    let members = &sync.organizations()[0].members;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].fields.name, "Lee");
    assert!(sync
        .delete_member(&EntityId::Persisted(org), &EntityId::Persisted(RemoteId(999)))
        .await
        .is_err());
}

#[tokio::test]
async fn test_saving_persisted_organization_updates_then_refetches() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Participant)
        .await;
    sync.load().await.unwrap();
    api.clear_calls().await;

    let id = EntityId::Persisted(kist);
    let saved = sync.save_organization(&id).await.unwrap();

    assert_eq!(saved, id);
    assert_eq!(
        api.calls().await,
        vec![
            ApiCall::UpdateOrganization,
            ApiCall::ListOrganizations,
            ApiCall::ListMembers
        ]
    );
    assert_eq!(sync.organizations()[0].name, "KIST");
}

#[tokio::test]
async fn test_retyping_and_describing_persisted_organization() {
    let (api, mut sync) = setup(ProjectMode::single());
    let kist = api
        .seed_organization(PROJECT, 1, "KIST", OrganizationType::Participant)
        .await;
    sync.load().await.unwrap();
    api.clear_calls().await;
    let id = EntityId::Persisted(kist);

    sync.retype_organization(&id, OrganizationType::Lead)
        .await
        .unwrap();
    sync.describe_organization(&id, "Overall coordination")
        .await
        .unwrap();

    assert_eq!(
        api.calls().await,
        vec![ApiCall::UpdateOrganization, ApiCall::UpdateOrganization]
    );
    let stored = &api.organizations(PROJECT, 1).await[0];
    assert_eq!(stored.organization_type, OrganizationType::Lead);
    assert_eq!(stored.role_description.as_deref(), Some("Overall coordination"));
    let local = &sync.organizations()[0];
    assert_eq!(local.organization_type, OrganizationType::Lead);
    assert_eq!(local.role_description, "Overall coordination");

    api.fail(ApiCall::UpdateOrganization, "Lead already assigned")
        .await;
    assert!(sync
        .retype_organization(&id, OrganizationType::Demand)
        .await
        .is_err());
    assert!(sync.describe_organization(&id, "Other").await.is_err());
    let local = &sync.organizations()[0];
    assert_eq!(local.organization_type, OrganizationType::Lead);
    assert_eq!(local.role_description, "Overall coordination");
}

#[tokio::test]
async fn test_failed_organization_create_blocks_member_create() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let org = sync.add_organization();
    sync.rename_organization(&org, "SNU").await.unwrap();
    let member = sync.add_member(&org).unwrap();
    sync.edit_draft().unwrap().name = "Park".to_string();
    let mut rx = sync.subscribe();

    api.fail(ApiCall::CreateOrganization, "Duplicate organization")
        .await;
    let err = sync.save_member().await.unwrap_err();

    assert!(matches!(err, ConsortiumError::Rejected(ref m) if m == "Duplicate organization"));
    assert_eq!(api.mutation_calls().await, vec![ApiCall::CreateOrganization]);
    match sync.editing() {
        MemberEditSession::Editing(edit) => {
            assert_eq!(edit.organization_id, org);
            assert_eq!(edit.member_id, member);
            assert_eq!(edit.draft.name, "Park");
        }
        MemberEditSession::Idle => panic!("edit session should stay open"),
    }
    let orgs = sync.organizations();
    assert_eq!(orgs[0].id, org);
    assert_eq!(orgs[0].members[0].id, member);
    assert_eq!(alerts(&drain(&mut rx)), vec!["Duplicate organization".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_alerts_generic_message() {
    let (api, mut sync) = setup(ProjectMode::single());
    let mut rx = sync.subscribe();
    api.fail_without_data(ApiCall::ListOrganizations).await;

    let err = sync.load().await.unwrap_err();

    assert!(matches!(err, ConsortiumError::Transport(_)));
    assert_eq!(err.user_message(), GENERIC_ERROR);
    assert_eq!(alerts(&drain(&mut rx)), vec![GENERIC_ERROR.to_string()]);
}

#[tokio::test]
async fn test_cancelled_propagation_can_be_retried() {
    let (api, mut sync) = setup(ProjectMode::multi(3));
    api.seed_organization(PROJECT, 1, "KIST", OrganizationType::Lead)
        .await;
    sync.load().await.unwrap();
    let status = sync.propagation_status();
    let mut rx = sync.subscribe();
    api.stall(ApiCall::CopyOrganizations).await;

    let (attempt, running_midway) = tokio::join!(
        tokio::time::timeout(Duration::from_millis(50), sync.propagate(&[2])),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            status.is_running()
        }
    );

    assert!(attempt.is_err());
    assert!(running_midway);
    assert!(!status.is_running());
    assert!(!sync.is_propagating());
    let flags: Vec<bool> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            ConsortiumEvent::Propagation { running } => Some(running),
            _ => None,
        })
        .collect();
    assert_eq!(flags, vec![true, false]);

    api.release(ApiCall::CopyOrganizations).await;
    let outcome = sync.propagate(&[2]).await.unwrap();
    assert_eq!(outcome.target_years, vec![2]);
    assert_eq!(sync.store().get_year(2)[0].name, "KIST");
}

#[tokio::test]
async fn test_adding_another_member_drops_the_unsaved_one() {
    let (api, mut sync) = setup(ProjectMode::multi(2));
    let org = sync.add_organization();

    let first = sync.add_member(&org).unwrap();
    let second = sync.add_member(&org).unwrap();

    let members = &sync.organizations()[0].members;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, second);
    assert_ne!(first, second);
    assert!(api.calls().await.is_empty());
}
