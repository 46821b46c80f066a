use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    audit::{entities::AuditEvent, ports::AuditEventSink},
    authentication::value_objects::Identity,
    catalog::{
        entities::dedup_ids,
        ports::CatalogRepository,
        services::{ensure_food_name_free, ensure_ingredients_exist},
    },
    common::{
        entities::app_errors::CoreError,
        ports::{StoreTransaction, UnitOfWork},
        services::Service,
    },
    hazard::aggregator::compute_food_hazard,
    proposal::{
        entities::{ChangeProposal, FoodSnapshot, ProposalChange},
        ports::{ProposalRepository, ProposalService},
        value_objects::{PendingProposalFilter, ProposalView, SubmitChangeInput, SubmitRemovalInput},
    },
};

impl<S, A> Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    /// Registers the submitter's own vote when they are a supervisor. Never
    /// applies the proposal; quorum is only evaluated by `cast_vote`.
    fn register_submitter_vote(&self, identity: &Identity, proposal: &mut ChangeProposal) {
        if matches!(self.policy.can_vote(identity), Ok(true)) {
            proposal.approved_supervisors.push(identity.id());
        }
    }
}

impl<S, A> ProposalService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    #[instrument(skip(self, identity, input), fields(user_id = %identity.id(), food_id = %input.food_id))]
    async fn submit_change(
        &self,
        identity: Identity,
        input: SubmitChangeInput,
    ) -> Result<ChangeProposal, CoreError> {
        let mut tx = self.store.begin().await?;

        let food = tx.get_food(input.food_id).await?.ok_or(CoreError::NotFound)?;
        let fields = input.fields;

        let restaurant_id = fields.restaurant_id.unwrap_or(food.restaurant_id);
        if restaurant_id != food.restaurant_id && tx.get_restaurant(restaurant_id).await?.is_none() {
            return Err(CoreError::NotFound);
        }

        let ingredient_ids = match fields.ingredient_ids {
            Some(ids) => {
                let ids = dedup_ids(ids);
                ensure_ingredients_exist(&mut tx, &ids).await?;
                ids
            }
            None => food.ingredient_ids.clone(),
        };

        let name = fields.name.map(|name| name.trim().to_string());
        if name.as_deref().is_some_and(str::is_empty) {
            return Err(CoreError::Invalid("food name cannot be empty".to_string()));
        }

        let snapshot = FoodSnapshot {
            restaurant_id,
            name: name.unwrap_or_else(|| food.name.clone()),
            macro_table: fields.macro_table.unwrap_or_else(|| food.macro_table.clone()),
            serving_size: fields.serving_size.unwrap_or(food.serving_size),
            is_organic: fields.is_organic.unwrap_or(food.is_organic),
            is_gluten_free: fields.is_gluten_free.unwrap_or(food.is_gluten_free),
            is_alcohol_free: fields.is_alcohol_free.unwrap_or(food.is_alcohol_free),
            is_lactose_free: fields.is_lactose_free.unwrap_or(food.is_lactose_free),
            image: fields.image.or_else(|| food.image.clone()),
            ingredient_ids,
        };

        ensure_food_name_free(&mut tx, snapshot.restaurant_id, &snapshot.name, Some(food.id))
            .await?;

        let new_hazard_level = compute_food_hazard(&mut tx, &snapshot.ingredient_ids).await?;

        let mut proposal = ChangeProposal::new(
            food.id,
            ProposalChange::Edit(snapshot),
            new_hazard_level,
            input.reason,
            identity.id(),
        );
        self.register_submitter_vote(&identity, &mut proposal);

        let proposal = tx.insert_proposal(proposal).await?;
        tx.commit().await?;

        self.audit.publish(AuditEvent::ProposalSubmitted {
            proposal_id: proposal.id,
            food_id: food.id,
            kind: proposal.kind(),
            submitted_by: identity.id(),
        });

        info!(
            proposal_id = %proposal.id,
            new_hazard_level,
            votes = proposal.vote_count(),
            "edit proposal submitted"
        );

        Ok(proposal)
    }

    #[instrument(skip(self, identity, input), fields(user_id = %identity.id(), food_id = %input.food_id))]
    async fn submit_removal(
        &self,
        identity: Identity,
        input: SubmitRemovalInput,
    ) -> Result<ChangeProposal, CoreError> {
        let mut tx = self.store.begin().await?;

        // The food row lock serialises concurrent removal submissions.
        let food = tx.lock_food(input.food_id).await?.ok_or(CoreError::NotFound)?;

        if let Some(existing) = tx.find_active_removal(food.id).await? {
            warn!(existing = %existing.id, "removal proposal already active");
            return Err(CoreError::DuplicateProposal {
                existing: existing.id,
            });
        }

        let mut proposal = ChangeProposal::new(
            food.id,
            ProposalChange::Deletion(FoodSnapshot::from(&food)),
            food.hazard_level,
            input.reason,
            identity.id(),
        );
        self.register_submitter_vote(&identity, &mut proposal);

        let proposal = tx.insert_proposal(proposal).await?;
        tx.commit().await?;

        self.audit.publish(AuditEvent::ProposalSubmitted {
            proposal_id: proposal.id,
            food_id: food.id,
            kind: proposal.kind(),
            submitted_by: identity.id(),
        });

        info!(proposal_id = %proposal.id, votes = proposal.vote_count(), "removal proposal submitted");

        Ok(proposal)
    }

    async fn list_pending(&self, filter: PendingProposalFilter) -> Result<Vec<ProposalView>, CoreError> {
        let mut tx = self.store.begin().await?;
        let proposals = tx.list_pending_proposals(filter).await?;
        tx.rollback().await?;

        Ok(proposals.into_iter().map(ProposalView::from).collect())
    }

    async fn get_proposal(&self, proposal_id: Uuid) -> Result<ProposalView, CoreError> {
        let mut tx = self.store.begin().await?;
        let proposal = tx.get_proposal(proposal_id).await?;
        tx.rollback().await?;

        proposal.map(ProposalView::from).ok_or(CoreError::NotFound)
    }
}
