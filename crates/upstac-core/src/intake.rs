use crate::error::{Result, UpstacError};
use crate::request::{CreateTestRequest, TestRequest};
use crate::store::TestRequestStore;
use crate::user::User;

/// Creates new test requests in `INITIATED`.
pub struct IntakeService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TestRequestStore + ?Sized> IntakeService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate the requester's details and store a new request.
    ///
    /// A person may only have one open request: a second one with the same
    /// email or phone number is refused until the first is completed.
    pub fn create(&self, details: CreateTestRequest, requester: &User) -> Result<TestRequest> {
        details.validate()?;

        let email = details.email.trim().to_ascii_lowercase();
        let phone = details.phone_number.trim().to_string();
        let shown = details.email.trim().to_string();
        let admit = |existing: &[TestRequest]| -> Result<()> {
            let duplicate = existing.iter().find(|r| {
                r.is_open() && (r.email.to_ascii_lowercase() == email || r.phone_number == phone)
            });
            match duplicate {
                Some(r) => {
                    tracing::warn!(existing = r.id, "duplicate test request refused");
                    Err(UpstacError::DuplicateRequest(format!(
                        "{shown} (request {})",
                        r.id
                    )))
                }
                None => Ok(()),
            }
        };

        let request = self
            .store
            .insert_unique(TestRequest::new(0, details, requester.actor_ref()), &admit)?;
        tracing::info!(id = request.id, user = %requester.username, "test request created");
        Ok(request)
    }
}
