use crate::domain::{
    authentication::value_objects::Identity, common::entities::app_errors::CoreError,
};

pub fn ensure_policy(
    result_has_permission: Result<bool, CoreError>,
    error_message: &str,
) -> Result<(), CoreError> {
    match result_has_permission {
        Ok(true) => Ok(()),
        Ok(false) => Err(CoreError::Forbidden(error_message.to_string())),
        Err(e) => Err(e),
    }
}

/// Role checks for moderation operations. Supervisor status comes from the
/// caller's [`Identity`], which the API layer resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodwatchPolicy;

impl FoodwatchPolicy {
    pub fn can_vote(&self, identity: &Identity) -> Result<bool, CoreError> {
        Ok(identity.is_supervisor())
    }

    pub fn can_approve_food(&self, identity: &Identity) -> Result<bool, CoreError> {
        Ok(identity.is_supervisor())
    }

    pub fn can_manage_catalog(&self, identity: &Identity) -> Result<bool, CoreError> {
        Ok(identity.is_supervisor())
    }

    pub fn can_run_maintenance(&self, identity: &Identity) -> Result<bool, CoreError> {
        Ok(identity.is_supervisor())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn ensure_policy_maps_denial_to_forbidden() {
        let result = ensure_policy(Ok(false), "only supervisors can vote");
        assert_eq!(
            result,
            Err(CoreError::Forbidden("only supervisors can vote".to_string()))
        );
    }

    #[test]
    fn ensure_policy_passes_errors_through() {
        let result = ensure_policy(Err(CoreError::InternalServerError), "ignored");
        assert_eq!(result, Err(CoreError::InternalServerError));
    }

    #[test]
    fn only_supervisors_may_vote() {
        let policy = FoodwatchPolicy;
        assert!(policy.can_vote(&Identity::new(Uuid::new_v4(), true)).unwrap());
        assert!(!policy.can_vote(&Identity::new(Uuid::new_v4(), false)).unwrap());
    }
}
