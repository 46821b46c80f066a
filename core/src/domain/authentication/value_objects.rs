use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::entities::User;

/// The authenticated caller, resolved by the API layer and passed explicitly
/// into every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: Uuid,
    is_supervisor: bool,
}

impl Identity {
    pub fn new(user_id: Uuid, is_supervisor: bool) -> Self {
        Self {
            user_id,
            is_supervisor,
        }
    }

    pub fn id(&self) -> Uuid {
        self.user_id
    }

    pub fn is_supervisor(&self) -> bool {
        self.is_supervisor
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.is_supervisor)
    }
}
