use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    approval::{
        applier::apply_proposal,
        ports::ApprovalService,
        value_objects::{PendingChangesReport, VoteResult},
    },
    audit::{entities::AuditEvent, ports::AuditEventSink},
    authentication::value_objects::Identity,
    common::{
        entities::app_errors::CoreError,
        policies::ensure_policy,
        ports::{StoreTransaction, UnitOfWork},
        services::Service,
    },
    proposal::{
        entities::ChangeProposal, ports::ProposalRepository, value_objects::PendingProposalFilter,
    },
};

const TARGET_GONE_REASON: &str = "target food no longer exists";

impl<S, A> Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    fn publish_all(&self, events: Vec<AuditEvent>) {
        for event in events {
            self.audit.publish(event);
        }
    }

    async fn try_cast_vote(&self, identity: &Identity, proposal_id: Uuid) -> Result<VoteResult, CoreError> {
        let mut tx = self.store.begin().await?;

        let proposal = tx
            .lock_proposal(proposal_id)
            .await?
            .ok_or(CoreError::NotFound)?;

        if proposal.new_is_approved {
            warn!(proposal_id = %proposal_id, "vote cast on an already approved proposal");
            return Err(CoreError::AlreadyApplied);
        }

        let votes = tx.add_proposal_vote(proposal_id, identity.id()).await?;
        let required = self.approval.required_approvals;

        let vote_event = AuditEvent::VoteRecorded {
            proposal_id,
            voter: identity.id(),
            votes,
            required,
        };

        if votes < required {
            tx.commit().await?;
            self.audit.publish(vote_event);

            info!(proposal_id = %proposal_id, votes, required, "vote recorded");
            return Ok(VoteResult::Recorded {
                proposal_id,
                votes,
                required,
            });
        }

        self.approve_and_apply(tx, proposal, identity.id(), votes, vec![vote_event])
            .await
    }

    /// Flips a locked, pending proposal to approved and applies it within the
    /// same transaction.
    ///
    /// A vanished target is the one failure that still commits: the proposal
    /// stays approved with `apply_error` set and the caller gets `TargetGone`.
    /// Any other failure rolls everything back.
    async fn approve_and_apply(
        &self,
        mut tx: S::Transaction,
        mut proposal: ChangeProposal,
        approved_by: Uuid,
        votes: usize,
        mut events: Vec<AuditEvent>,
    ) -> Result<VoteResult, CoreError> {
        let proposal_id = proposal.id;
        proposal.mark_approved(approved_by);

        match apply_proposal(&mut tx, &proposal).await {
            Ok(outcome) => {
                proposal.mark_applied();
                tx.update_proposal_state(&proposal).await?;
                tx.commit().await?;

                events.push(AuditEvent::ProposalApproved {
                    proposal_id,
                    food_id: outcome.food_id,
                    kind: outcome.kind,
                });
                events.extend(outcome.restaurant_hazards.iter().map(
                    |(restaurant_id, hazard_level)| AuditEvent::HazardRecomputed {
                        restaurant_id: *restaurant_id,
                        hazard_level: *hazard_level,
                    },
                ));
                self.publish_all(events);

                info!(proposal_id = %proposal_id, food_id = %outcome.food_id, kind = ?outcome.kind, votes, "proposal approved and applied");

                Ok(VoteResult::Applied {
                    proposal_id,
                    votes,
                    kind: outcome.kind,
                })
            }
            Err(CoreError::TargetGone { .. }) => {
                proposal.mark_apply_failed(TARGET_GONE_REASON);
                tx.update_proposal_state(&proposal).await?;
                tx.commit().await?;

                events.push(AuditEvent::ApplyFailed {
                    proposal_id,
                    food_id: proposal.old_version,
                    reason: TARGET_GONE_REASON.to_string(),
                });
                self.publish_all(events);

                error!(
                    proposal_id = %proposal_id,
                    "approved proposal could not be applied: target food is gone, manual reconciliation required"
                );

                Err(CoreError::TargetGone { proposal_id })
            }
            Err(e) => {
                error!(proposal_id = %proposal_id, "failed to apply proposal, rolling back vote: {}", e);
                if let Err(rollback_error) = tx.rollback().await {
                    error!(proposal_id = %proposal_id, "rollback failed: {}", rollback_error);
                }

                Err(e)
            }
        }
    }

    async fn apply_if_quorum(&self, identity: &Identity, proposal_id: Uuid) -> Result<bool, CoreError> {
        let mut tx = self.store.begin().await?;

        let Some(proposal) = tx.lock_proposal(proposal_id).await? else {
            return Ok(false);
        };

        let votes = proposal.vote_count();
        if proposal.new_is_approved || votes < self.approval.required_approvals {
            return Ok(false);
        }

        self.approve_and_apply(tx, proposal, identity.id(), votes, Vec::new())
            .await
            .map(|_| true)
    }
}

impl<S, A> ApprovalService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    #[instrument(skip(self, identity), fields(user_id = %identity.id()))]
    async fn cast_vote(&self, identity: Identity, proposal_id: Uuid) -> Result<VoteResult, CoreError> {
        ensure_policy(
            self.policy.can_vote(&identity),
            "only supervisors can approve food changes",
        )?;

        let attempts = self.approval.vote_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.try_cast_vote(&identity, proposal_id).await {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(proposal_id = %proposal_id, attempt, "transaction conflict while voting, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id()))]
    async fn process_pending_changes(&self, identity: Identity) -> Result<PendingChangesReport, CoreError> {
        ensure_policy(
            self.policy.can_run_maintenance(&identity),
            "only supervisors can process pending changes",
        )?;

        let required = self.approval.required_approvals;

        let mut tx = self.store.begin().await?;
        let candidates = tx
            .list_pending_proposals(PendingProposalFilter::default())
            .await?
            .into_iter()
            .filter(|proposal| proposal.vote_count() >= required)
            .map(|proposal| proposal.id)
            .collect::<Vec<Uuid>>();
        tx.rollback().await?;

        let mut report = PendingChangesReport::default();
        for proposal_id in candidates {
            match self.apply_if_quorum(&identity, proposal_id).await {
                Ok(true) => report.applied += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(proposal_id = %proposal_id, "pending change could not be applied: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(applied = report.applied, failed = report.failed, "pending changes processed");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        domain::{
            approval::value_objects::VoteResult,
            audit::ports::MockAuditEventSink,
            catalog::ports::CatalogRepository,
            common::ApprovalConfig,
            proposal::{
                entities::{ProposalKind, ProposalStatus},
                ports::ProposalService,
                value_objects::{ProposedFoodFields, SubmitChangeInput, SubmitRemovalInput},
            },
        },
        infrastructure::memory::InMemoryStore,
        test_support::{
            load_food, load_restaurant, recording_service, seed_food, seed_ingredient,
            seed_restaurant, seed_user, service_with,
        },
    };

    struct EditFixture {
        store: InMemoryStore,
        member: Identity,
        food_id: Uuid,
        restaurant_id: Uuid,
        new_ingredients: Vec<Uuid>,
    }

    /// Food Y with ingredients [1, 3] (hazard 2.0) and three fresh hazard-4
    /// ingredients to propose instead.
    async fn edit_fixture() -> EditFixture {
        let store = InMemoryStore::new();
        let member = seed_user(&store, "member", false).await;
        let restaurant = seed_restaurant(&store, "Chez Y").await;

        let mild = seed_ingredient(&store, "rice", 1).await;
        let spicy = seed_ingredient(&store, "chili", 3).await;
        let food = seed_food(&store, restaurant.id, "Food Y", vec![mild.id, spicy.id], true).await;
        assert_eq!(food.hazard_level, 2.0);

        let mut new_ingredients = Vec::new();
        for name in ["ghost pepper", "raw oyster", "fugu"] {
            new_ingredients.push(seed_ingredient(&store, name, 4).await.id);
        }

        EditFixture {
            store,
            member,
            food_id: food.id,
            restaurant_id: restaurant.id,
            new_ingredients,
        }
    }

    async fn submit_edit<A: AuditEventSink>(
        service: &Service<InMemoryStore, A>,
        fixture: &EditFixture,
    ) -> Uuid {
        service
            .submit_change(
                fixture.member.clone(),
                SubmitChangeInput {
                    food_id: fixture.food_id,
                    fields: ProposedFoodFields {
                        ingredient_ids: Some(fixture.new_ingredients.clone()),
                        ..Default::default()
                    },
                    reason: Some("recipe changed".to_string()),
                },
            )
            .await
            .expect("proposal submitted")
            .id
    }

    #[tokio::test]
    async fn single_vote_stays_pending() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let (service, _) = recording_service(&fixture.store);

        let proposal_id = submit_edit(&service, &fixture).await;
        let result = service.cast_vote(alice, proposal_id).await;

        assert_eq!(
            result,
            Ok(VoteResult::Recorded {
                proposal_id,
                votes: 1,
                required: 2,
            })
        );

        let view = service.get_proposal(proposal_id).await.expect("proposal");
        assert!(!view.proposal.new_is_approved);
        assert_eq!(view.status, ProposalStatus::Pending);

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.hazard_level, 2.0);
    }

    #[tokio::test]
    async fn repeated_vote_before_quorum_counts_once() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let (service, _) = recording_service(&fixture.store);

        let proposal_id = submit_edit(&service, &fixture).await;
        service.cast_vote(alice.clone(), proposal_id).await.expect("first vote");
        let result = service.cast_vote(alice, proposal_id).await.expect("second vote");

        assert_eq!(
            result,
            VoteResult::Recorded {
                proposal_id,
                votes: 1,
                required: 2,
            }
        );
    }

    #[tokio::test]
    async fn quorum_applies_edit_exactly_once() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let bob = seed_user(&fixture.store, "bob", true).await;
        let (service, audit) = recording_service(&fixture.store);

        let proposal_id = submit_edit(&service, &fixture).await;
        service.cast_vote(alice.clone(), proposal_id).await.expect("alice votes");
        let result = service.cast_vote(bob, proposal_id).await.expect("bob votes");

        assert_eq!(
            result,
            VoteResult::Applied {
                proposal_id,
                votes: 2,
                kind: ProposalKind::Edit,
            }
        );

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.hazard_level, 4.0);
        assert_eq!(food.ingredient_ids, fixture.new_ingredients);

        let restaurant = load_restaurant(&fixture.store, fixture.restaurant_id).await;
        assert_eq!(restaurant.hazard_level, 4.0);

        let view = service.get_proposal(proposal_id).await.expect("proposal");
        assert!(view.proposal.new_is_approved);
        assert_eq!(view.status, ProposalStatus::Applied);
        assert_eq!(view.approved_supervisors_count, 2);

        // Replaying a vote after approval must not touch the food again.
        assert_eq!(
            service.cast_vote(alice, proposal_id).await,
            Err(CoreError::AlreadyApplied)
        );
        assert_eq!(
            load_food(&fixture.store, fixture.food_id).await,
            Some(food)
        );
        assert_eq!(
            audit.count(|event| matches!(event, AuditEvent::ProposalApproved { .. })),
            1
        );
    }

    #[tokio::test]
    async fn moving_a_food_refreshes_both_restaurants() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let bob = seed_user(&fixture.store, "bob", true).await;
        let destination = seed_restaurant(&fixture.store, "Chez Z").await;
        let (service, audit) = recording_service(&fixture.store);

        let proposal_id = service
            .submit_change(
                fixture.member.clone(),
                SubmitChangeInput {
                    food_id: fixture.food_id,
                    fields: ProposedFoodFields {
                        restaurant_id: Some(destination.id),
                        ..Default::default()
                    },
                    reason: Some("moved kitchens".to_string()),
                },
            )
            .await
            .expect("proposal submitted")
            .id;
        assert_eq!(
            load_restaurant(&fixture.store, fixture.restaurant_id).await.hazard_level,
            2.0
        );

        service.cast_vote(alice, proposal_id).await.expect("alice votes");
        service.cast_vote(bob, proposal_id).await.expect("bob votes");

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.restaurant_id, destination.id);
        assert_eq!(food.hazard_level, 2.0);

        assert_eq!(
            load_restaurant(&fixture.store, fixture.restaurant_id).await.hazard_level,
            0.0
        );
        assert_eq!(load_restaurant(&fixture.store, destination.id).await.hazard_level, 2.0);

        let events = audit.events();
        assert!(events.contains(&AuditEvent::HazardRecomputed {
            restaurant_id: fixture.restaurant_id,
            hazard_level: 0.0,
        }));
        assert!(events.contains(&AuditEvent::HazardRecomputed {
            restaurant_id: destination.id,
            hazard_level: 2.0,
        }));
    }

    #[tokio::test]
    async fn approved_removal_deletes_food_and_refreshes_restaurant() {
        let store = InMemoryStore::new();
        let member = seed_user(&store, "member", false).await;
        let alice = seed_user(&store, "alice", true).await;
        let bob = seed_user(&store, "bob", true).await;
        let restaurant = seed_restaurant(&store, "Harbor Grill").await;

        let risky = seed_ingredient(&store, "raw oyster", 4).await;
        let mild = seed_ingredient(&store, "lettuce", 2).await;
        let food_x = seed_food(&store, restaurant.id, "Oyster platter", vec![risky.id], true).await;
        seed_food(&store, restaurant.id, "Side salad", vec![mild.id], true).await;
        assert_eq!(load_restaurant(&store, restaurant.id).await.hazard_level, 3.0);

        let (service, audit) = recording_service(&store);
        let proposal = service
            .submit_removal(
                member,
                SubmitRemovalInput {
                    food_id: food_x.id,
                    reason: Some("recalled".to_string()),
                },
            )
            .await
            .expect("removal submitted");

        service.cast_vote(alice, proposal.id).await.expect("alice votes");
        let result = service.cast_vote(bob, proposal.id).await.expect("bob votes");

        assert!(matches!(
            result,
            VoteResult::Applied {
                kind: ProposalKind::Deletion,
                ..
            }
        ));
        assert_eq!(load_food(&store, food_x.id).await, None);
        assert_eq!(load_restaurant(&store, restaurant.id).await.hazard_level, 2.0);

        let view = service.get_proposal(proposal.id).await.expect("proposal");
        assert_eq!(view.status, ProposalStatus::Applied);
        assert_eq!(view.proposal.old_version, None);
        assert_eq!(view.proposal.reason.as_deref(), Some("recalled"));

        assert!(audit.events().contains(&AuditEvent::HazardRecomputed {
            restaurant_id: restaurant.id,
            hazard_level: 2.0,
        }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_apply_once() {
        let fixture = edit_fixture().await;
        let mut supervisors = Vec::new();
        for name in ["s1", "s2", "s3", "s4", "s5"] {
            supervisors.push(seed_user(&fixture.store, name, true).await);
        }

        let (service, audit) = recording_service(&fixture.store);
        let proposal_id = submit_edit(&service, &fixture).await;
        let service = Arc::new(service);

        let handles = supervisors
            .into_iter()
            .map(|supervisor| {
                let service = service.clone();
                tokio::spawn(async move { service.cast_vote(supervisor, proposal_id).await })
            })
            .collect::<Vec<_>>();

        let results = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("task completes"))
            .collect::<Vec<_>>();

        let applied = results
            .iter()
            .filter(|result| matches!(result, Ok(VoteResult::Applied { .. })))
            .count();
        let recorded = results
            .iter()
            .filter(|result| matches!(result, Ok(VoteResult::Recorded { .. })))
            .count();
        let rejected = results
            .iter()
            .filter(|result| matches!(result, Err(CoreError::AlreadyApplied)))
            .count();

        assert_eq!((applied, recorded, rejected), (1, 1, 3));
        assert_eq!(
            audit.count(|event| matches!(event, AuditEvent::ProposalApproved { .. })),
            1
        );

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.hazard_level, 4.0);
    }

    #[tokio::test]
    async fn applier_failure_rolls_back_the_triggering_vote() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let bob = seed_user(&fixture.store, "bob", true).await;

        let mut audit = MockAuditEventSink::new();
        audit
            .expect_publish()
            .withf(|event| matches!(event, AuditEvent::ProposalSubmitted { .. }))
            .times(1)
            .return_const(());
        audit
            .expect_publish()
            .withf(|event| matches!(event, AuditEvent::VoteRecorded { votes: 1, .. }))
            .times(1)
            .return_const(());
        let service = service_with(&fixture.store, audit);

        let proposal_id = submit_edit(&service, &fixture).await;
        service.cast_vote(alice, proposal_id).await.expect("alice votes");

        fixture.store.fail_food_writes(true);
        let result = service.cast_vote(bob, proposal_id).await;
        assert_eq!(result, Err(CoreError::InternalServerError));

        let view = service.get_proposal(proposal_id).await.expect("proposal");
        assert!(!view.proposal.new_is_approved);
        assert_eq!(view.approved_supervisors_count, 1);

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.hazard_level, 2.0);
    }

    #[tokio::test]
    async fn vanished_target_is_reported_and_proposal_closed() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let bob = seed_user(&fixture.store, "bob", true).await;
        let (service, audit) = recording_service(&fixture.store);

        let proposal_id = submit_edit(&service, &fixture).await;
        service.cast_vote(alice, proposal_id).await.expect("alice votes");

        let mut tx = fixture.store.begin().await.expect("begin");
        tx.delete_food(fixture.food_id).await.expect("delete food");
        tx.commit().await.expect("commit");

        let result = service.cast_vote(bob.clone(), proposal_id).await;
        assert_eq!(result, Err(CoreError::TargetGone { proposal_id }));

        let view = service.get_proposal(proposal_id).await.expect("proposal");
        assert!(view.proposal.new_is_approved);
        assert_eq!(view.status, ProposalStatus::ApplyFailed);
        assert!(view.proposal.apply_error.is_some());

        assert_eq!(
            audit.count(|event| matches!(event, AuditEvent::ApplyFailed { .. })),
            1
        );
        assert_eq!(
            service.cast_vote(bob, proposal_id).await,
            Err(CoreError::AlreadyApplied)
        );
    }

    #[tokio::test]
    async fn non_supervisors_cannot_vote() {
        let store = InMemoryStore::new();
        let member = seed_user(&store, "member", false).await;

        let mut audit = MockAuditEventSink::new();
        audit.expect_publish().never();
        let service = service_with(&store, audit);

        let result = service.cast_vote(member, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn voting_on_unknown_proposal_is_not_found() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice", true).await;
        let (service, _) = recording_service(&store);

        assert_eq!(
            service.cast_vote(alice, Uuid::new_v4()).await,
            Err(CoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn transaction_conflicts_are_retried() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let (service, _) = recording_service(&fixture.store);
        let proposal_id = submit_edit(&service, &fixture).await;

        fixture.store.inject_vote_conflicts(2);
        let result = service.cast_vote(alice.clone(), proposal_id).await;
        assert!(matches!(result, Ok(VoteResult::Recorded { votes: 1, .. })));

        fixture.store.inject_vote_conflicts(3);
        let result = service.cast_vote(alice, proposal_id).await;
        assert_eq!(result, Err(CoreError::TransactionConflict));
    }

    #[tokio::test]
    async fn pending_changes_at_quorum_are_applied() {
        let fixture = edit_fixture().await;
        let alice = seed_user(&fixture.store, "alice", true).await;
        let bob = seed_user(&fixture.store, "bob", true).await;

        // Gather two votes under a stricter quorum so nothing is applied yet.
        let strict = Service::new(
            fixture.store.clone(),
            crate::test_support::RecordingAuditSink::default(),
            ApprovalConfig {
                required_approvals: 3,
                ..ApprovalConfig::default()
            },
        );
        let proposal_id = submit_edit(&strict, &fixture).await;
        strict.cast_vote(alice.clone(), proposal_id).await.expect("alice votes");
        strict.cast_vote(bob, proposal_id).await.expect("bob votes");

        let (service, audit) = recording_service(&fixture.store);
        assert!(matches!(
            service.process_pending_changes(fixture.member.clone()).await,
            Err(CoreError::Forbidden(_))
        ));

        let report = service
            .process_pending_changes(alice)
            .await
            .expect("processed");
        assert_eq!(report, PendingChangesReport { applied: 1, failed: 0 });

        let food = load_food(&fixture.store, fixture.food_id).await.expect("food");
        assert_eq!(food.hazard_level, 4.0);
        assert_eq!(
            audit.count(|event| matches!(event, AuditEvent::ProposalApproved { .. })),
            1
        );
    }
}
