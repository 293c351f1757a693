use crate::error::Result;
use crate::request::{RequestFlow, TestRequest};
use crate::store::TestRequestStore;
use crate::types::RequestStatus;
use crate::user::User;

/// Read-only lookups. Results come back oldest first.
pub struct QueryService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TestRequestStore + ?Sized> QueryService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn get(&self, id: u64) -> Result<TestRequest> {
        self.store.get(id)
    }

    pub fn find_by_status(&self, status: RequestStatus) -> Result<Vec<TestRequest>> {
        self.store.query_by_status(status)
    }

    pub fn find_by_tester(&self, tester: &User) -> Result<Vec<TestRequest>> {
        self.store.query_by_assigned_tester(&tester.actor_ref())
    }

    pub fn find_by_doctor(&self, doctor: &User) -> Result<Vec<TestRequest>> {
        self.store.query_by_assigned_doctor(&doctor.actor_ref())
    }

    pub fn find_by_creator(&self, requester: &User) -> Result<Vec<TestRequest>> {
        self.store.query_by_creator(&requester.actor_ref())
    }

    pub fn flow_history(&self, id: u64) -> Result<Vec<RequestFlow>> {
        Ok(self.store.get(id)?.flow_history)
    }
}
