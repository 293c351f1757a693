use crate::error::Result;
use crate::flow;
use crate::request::{ConsultationInput, LabResultInput, TestRequest};
use crate::store::TestRequestStore;
use crate::types::FlowOperation;
use crate::user::User;
use chrono::Utc;

/// The only mutator of test request state.
///
/// Each operation is load → validate → mutate → save on a single record.
/// The save is version-checked by the store, so a concurrent writer on the
/// same id surfaces as `Conflict` instead of being overwritten.
pub struct UpdateService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TestRequestStore + ?Sized> UpdateService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn assign_for_lab_test(&self, id: u64, tester: &User) -> Result<TestRequest> {
        self.apply(id, FlowOperation::AssignForLabTest, tester, |req| {
            req.assigned_tester = Some(tester.actor_ref());
            "assigned for lab test".to_string()
        })
    }

    pub fn update_lab_test(
        &self,
        id: u64,
        input: LabResultInput,
        tester: &User,
    ) -> Result<TestRequest> {
        let result = input.into_result(Utc::now())?;
        self.apply(id, FlowOperation::SubmitLabResult, tester, move |req| {
            let note = format!("lab result {}", result.result);
            req.lab_result = Some(result);
            note
        })
    }

    pub fn assign_for_consultation(&self, id: u64, doctor: &User) -> Result<TestRequest> {
        self.apply(id, FlowOperation::AssignForConsultation, doctor, |req| {
            req.assigned_doctor = Some(doctor.actor_ref());
            "assigned for consultation".to_string()
        })
    }

    pub fn update_consultation(
        &self,
        id: u64,
        input: ConsultationInput,
        doctor: &User,
    ) -> Result<TestRequest> {
        let consultation = input.into_result(Utc::now())?;
        self.apply(id, FlowOperation::SubmitConsultation, doctor, move |req| {
            let note = format!("doctor suggested {}", consultation.suggestion);
            req.consultation = Some(consultation);
            note
        })
    }

    fn apply<F>(&self, id: u64, op: FlowOperation, actor: &User, mutate: F) -> Result<TestRequest>
    where
        F: FnOnce(&mut TestRequest) -> String,
    {
        let mut request = self.store.get(id)?;
        let target = match flow::check(&request, op, actor) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(id, operation = %op, user = %actor.username, "rejected: {e}");
                return Err(e);
            }
        };

        let now = Utc::now();
        let from = request.status;
        let note = mutate(&mut request);
        request.advance(target, actor.actor_ref(), note, now);

        let saved = self.store.save(&request)?;
        tracing::info!(
            id,
            operation = %op,
            user = %actor.username,
            from = %from,
            to = %saved.status,
            "test request advanced"
        );
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
