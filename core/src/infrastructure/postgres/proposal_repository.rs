use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    proposal::{
        entities::{ChangeProposal, ProposalKind},
        ports::ProposalRepository,
        value_objects::PendingProposalFilter,
    },
};
use crate::entity::{
    food_change_approvals::{
        ActiveModel as ProposalVoteActiveModel, Column as ProposalVoteColumn,
        Entity as ProposalVoteEntity,
    },
    food_changes::{
        ActiveModel as FoodChangeActiveModel, Column as FoodChangeColumn,
        Entity as FoodChangeEntity, Model as FoodChangeModel,
    },
};

use super::{
    PostgresTransaction, db_error,
    mappers::{proposal_from_model, snapshot_to_json},
};

impl PostgresTransaction {
    async fn hydrate_proposals(
        &self,
        models: Vec<FoodChangeModel>,
    ) -> Result<Vec<ChangeProposal>, CoreError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids = models.iter().map(|model| model.id).collect::<Vec<Uuid>>();

        let mut votes: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for vote in ProposalVoteEntity::find()
            .filter(ProposalVoteColumn::FoodChangeId.is_in(ids))
            .order_by_asc(ProposalVoteColumn::VotedAt)
            .all(&self.txn)
            .await
            .map_err(db_error("load proposal votes"))?
        {
            votes.entry(vote.food_change_id).or_default().push(vote.user_id);
        }

        models
            .into_iter()
            .map(|model| {
                let voters = votes.remove(&model.id).unwrap_or_default();
                proposal_from_model(model, voters)
            })
            .collect()
    }

    async fn load_proposal(
        &self,
        proposal_id: Uuid,
        lock: bool,
    ) -> Result<Option<ChangeProposal>, CoreError> {
        let mut query = FoodChangeEntity::find_by_id(proposal_id);
        if lock {
            query = query.lock_exclusive();
        }

        let Some(model) = query
            .one(&self.txn)
            .await
            .map_err(db_error("fetch proposal"))?
        else {
            return Ok(None);
        };

        Ok(self.hydrate_proposals(vec![model]).await?.pop())
    }
}

impl ProposalRepository for PostgresTransaction {
    async fn insert_proposal(&mut self, proposal: ChangeProposal) -> Result<ChangeProposal, CoreError> {
        FoodChangeEntity::insert(FoodChangeActiveModel {
            id: Set(proposal.id),
            old_version_id: Set(proposal.old_version),
            is_deletion: Set(proposal.is_deletion()),
            snapshot: Set(snapshot_to_json(proposal.change.snapshot())?),
            new_hazard_level: Set(proposal.new_hazard_level),
            new_is_approved: Set(proposal.new_is_approved),
            reason: Set(proposal.reason.clone()),
            date: Set(proposal.date.fixed_offset()),
            updated_by: Set(proposal.updated_by),
            updated_date: Set(proposal.updated_date.fixed_offset()),
            applied_at: Set(proposal.applied_at.map(|dt| dt.fixed_offset())),
            apply_error: Set(proposal.apply_error.clone()),
        })
        .exec_without_returning(&self.txn)
        .await
        .map_err(db_error("create proposal"))?;

        if !proposal.approved_supervisors.is_empty() {
            let now = Utc::now().fixed_offset();
            let votes = proposal
                .approved_supervisors
                .iter()
                .map(|user_id| ProposalVoteActiveModel {
                    food_change_id: Set(proposal.id),
                    user_id: Set(*user_id),
                    voted_at: Set(now),
                });

            ProposalVoteEntity::insert_many(votes)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_error("record submitter vote"))?;
        }

        Ok(proposal)
    }

    async fn get_proposal(&mut self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        self.load_proposal(proposal_id, false).await
    }

    async fn lock_proposal(&mut self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        self.load_proposal(proposal_id, true).await
    }

    async fn find_active_removal(&mut self, food_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        let Some(model) = FoodChangeEntity::find()
            .filter(FoodChangeColumn::OldVersionId.eq(food_id))
            .filter(FoodChangeColumn::IsDeletion.eq(true))
            .filter(FoodChangeColumn::NewIsApproved.eq(false))
            .one(&self.txn)
            .await
            .map_err(db_error("fetch active removal"))?
        else {
            return Ok(None);
        };

        Ok(self.hydrate_proposals(vec![model]).await?.pop())
    }

    async fn add_proposal_vote(&mut self, proposal_id: Uuid, user_id: Uuid) -> Result<usize, CoreError> {
        ProposalVoteEntity::insert(ProposalVoteActiveModel {
            food_change_id: Set(proposal_id),
            user_id: Set(user_id),
            voted_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(
            OnConflict::columns([ProposalVoteColumn::FoodChangeId, ProposalVoteColumn::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.txn)
        .await
        .map_err(db_error("record proposal vote"))?;

        let votes = ProposalVoteEntity::find()
            .filter(ProposalVoteColumn::FoodChangeId.eq(proposal_id))
            .count(&self.txn)
            .await
            .map_err(db_error("count proposal votes"))?;

        Ok(votes as usize)
    }

    async fn update_proposal_state(&mut self, proposal: &ChangeProposal) -> Result<(), CoreError> {
        FoodChangeEntity::update_many()
            .col_expr(FoodChangeColumn::NewIsApproved, Expr::value(proposal.new_is_approved))
            .col_expr(FoodChangeColumn::UpdatedBy, Expr::value(proposal.updated_by))
            .col_expr(
                FoodChangeColumn::UpdatedDate,
                Expr::value(proposal.updated_date.fixed_offset()),
            )
            .col_expr(
                FoodChangeColumn::AppliedAt,
                Expr::value(proposal.applied_at.map(|dt| dt.fixed_offset())),
            )
            .col_expr(
                FoodChangeColumn::ApplyError,
                Expr::value(proposal.apply_error.clone()),
            )
            .filter(FoodChangeColumn::Id.eq(proposal.id))
            .exec(&self.txn)
            .await
            .map_err(db_error("update proposal state"))?;

        Ok(())
    }

    async fn list_pending_proposals(
        &mut self,
        filter: PendingProposalFilter,
    ) -> Result<Vec<ChangeProposal>, CoreError> {
        let mut query = FoodChangeEntity::find().filter(FoodChangeColumn::NewIsApproved.eq(false));

        if let Some(kind) = filter.kind {
            query = query.filter(FoodChangeColumn::IsDeletion.eq(kind == ProposalKind::Deletion));
        }

        query = query
            .order_by_asc(FoodChangeColumn::Date)
            .order_by_asc(FoodChangeColumn::Id);

        if let Some(offset) = filter.offset {
            query = query.offset(offset as u64);
        }

        if let Some(limit) = filter.limit {
            query = query.limit(limit as u64);
        }

        let models = query
            .all(&self.txn)
            .await
            .map_err(db_error("list pending proposals"))?;

        self.hydrate_proposals(models).await
    }
}
