use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    proposal::{
        entities::ChangeProposal, ports::ProposalRepository, value_objects::PendingProposalFilter,
    },
};

use super::{Faults, InMemoryTransaction};

impl ProposalRepository for InMemoryTransaction {
    async fn insert_proposal(&mut self, mut proposal: ChangeProposal) -> Result<ChangeProposal, CoreError> {
        if proposal.is_deletion()
            && let Some(food_id) = proposal.old_version
            && self.find_active_removal(food_id).await?.is_some()
        {
            return Err(CoreError::Conflict(
                "a removal proposal is already active for this food".to_string(),
            ));
        }

        let mut voters = Vec::with_capacity(proposal.approved_supervisors.len());
        for voter in proposal.approved_supervisors.drain(..) {
            if !voters.contains(&voter) {
                voters.push(voter);
            }
        }
        proposal.approved_supervisors = voters;

        self.staged.proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn get_proposal(&mut self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        Ok(self.staged.proposals.get(&proposal_id).cloned())
    }

    async fn lock_proposal(&mut self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        self.get_proposal(proposal_id).await
    }

    async fn find_active_removal(&mut self, food_id: Uuid) -> Result<Option<ChangeProposal>, CoreError> {
        Ok(self
            .staged
            .proposals
            .values()
            .find(|proposal| {
                proposal.is_deletion()
                    && !proposal.new_is_approved
                    && proposal.old_version == Some(food_id)
            })
            .cloned())
    }

    async fn add_proposal_vote(&mut self, proposal_id: Uuid, user_id: Uuid) -> Result<usize, CoreError> {
        self.check_fault(Faults::check_vote)?;

        let proposal = self
            .staged
            .proposals
            .get_mut(&proposal_id)
            .ok_or(CoreError::NotFound)?;

        if !proposal.approved_supervisors.contains(&user_id) {
            proposal.approved_supervisors.push(user_id);
        }

        Ok(proposal.approved_supervisors.len())
    }

    async fn update_proposal_state(&mut self, proposal: &ChangeProposal) -> Result<(), CoreError> {
        let stored = self
            .staged
            .proposals
            .get_mut(&proposal.id)
            .ok_or(CoreError::NotFound)?;

        stored.new_is_approved = proposal.new_is_approved;
        stored.updated_by = proposal.updated_by;
        stored.updated_date = proposal.updated_date;
        stored.applied_at = proposal.applied_at;
        stored.apply_error = proposal.apply_error.clone();

        Ok(())
    }

    async fn list_pending_proposals(
        &mut self,
        filter: PendingProposalFilter,
    ) -> Result<Vec<ChangeProposal>, CoreError> {
        let mut pending = self
            .staged
            .proposals
            .values()
            .filter(|proposal| !proposal.new_is_approved)
            .filter(|proposal| filter.kind.is_none_or(|kind| proposal.kind() == kind))
            .cloned()
            .collect::<Vec<ChangeProposal>>();

        pending.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |limit| limit as usize);

        Ok(pending.into_iter().skip(offset).take(limit).collect())
    }
}
