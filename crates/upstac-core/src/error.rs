use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstacError {
    #[error("not initialized: run 'upstac init'")]
    NotInitialized,

    #[error("test request not found: {0}")]
    NotFound(u64),

    #[error("invalid transition for request {id}: cannot {operation} while {from}")]
    InvalidTransition {
        id: u64,
        from: String,
        operation: String,
    },

    #[error("user '{username}' is not assigned to request {id}")]
    NotAssignedActor { id: u64, username: String },

    #[error("user '{username}' does not hold role {role}")]
    MissingRole { username: String, role: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("an open test request already exists for {0}")]
    DuplicateRequest(String),

    #[error("concurrent update on request {id}: expected version {expected}, found {found}")]
    Conflict { id: u64, expected: u64, found: u64 },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl UpstacError {
    /// True for errors a caller may resolve by re-fetching and re-submitting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstacError::Conflict { .. })
    }

    /// True for failures caused by the caller's request rather than the system.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            UpstacError::NotFound(_)
                | UpstacError::InvalidTransition { .. }
                | UpstacError::NotAssignedActor { .. }
                | UpstacError::Validation(_)
                | UpstacError::DuplicateRequest(_)
                | UpstacError::InvalidStatus(_)
                | UpstacError::InvalidRole(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UpstacError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflict_is_retryable() {
        let conflict = UpstacError::Conflict {
            id: 1,
            expected: 2,
            found: 3,
        };
        assert!(conflict.is_retryable());
        assert!(!UpstacError::NotFound(1).is_retryable());
        assert!(!UpstacError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn messages_name_the_request() {
        let err = UpstacError::InvalidTransition {
            id: 7,
            from: "INITIATED".into(),
            operation: "submit_lab_result".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid transition for request 7: cannot submit_lab_result while INITIATED"
        );
        assert_eq!(
            UpstacError::NotFound(999).to_string(),
            "test request not found: 999"
        );
    }

    #[test]
    fn domain_classification() {
        assert!(UpstacError::NotFound(1).is_domain());
        assert!(UpstacError::NotAssignedActor {
            id: 1,
            username: "t2".into()
        }
        .is_domain());
        assert!(UpstacError::InvalidStatus("LOST".into()).is_domain());
        assert!(!UpstacError::NotInitialized.is_domain());
        assert!(!UpstacError::UserNotFound("x".into()).is_domain());
        assert!(!UpstacError::MissingRole {
            username: "d1".into(),
            role: "TESTER".into()
        }
        .is_domain());
        assert!(!UpstacError::Io(std::io::Error::other("disk")).is_domain());
    }
}
