use crate::error::{Result, UpstacError};
use crate::types::{DoctorSuggestion, Gender, RequestStatus, TestStatus};
use crate::user::ActorRef;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub blood_pressure: String,
    pub heart_beat: String,
    pub temperature: String,
    pub oxygen_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub result: TestStatus,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationResult {
    pub suggestion: DoctorSuggestion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub updated_on: DateTime<Utc>,
}

/// Lab result as submitted by a tester, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResultInput {
    pub blood_pressure: String,
    pub heart_beat: String,
    pub temperature: String,
    pub oxygen_level: String,
    pub comments: Option<String>,
    pub result: Option<TestStatus>,
}

impl LabResultInput {
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("blood_pressure", &self.blood_pressure),
            ("heart_beat", &self.heart_beat),
            ("temperature", &self.temperature),
            ("oxygen_level", &self.oxygen_level),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if self.result.is_none() {
            missing.push("result");
        }
        if !missing.is_empty() {
            return Err(UpstacError::Validation(format!(
                "lab result is missing required fields: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    pub fn into_result(self, now: DateTime<Utc>) -> Result<LabResult> {
        self.validate()?;
        let result = self
            .result
            .ok_or_else(|| UpstacError::Validation("lab result requires a result".into()))?;
        Ok(LabResult {
            blood_pressure: self.blood_pressure.trim().to_string(),
            heart_beat: self.heart_beat.trim().to_string(),
            temperature: self.temperature.trim().to_string(),
            oxygen_level: self.oxygen_level.trim().to_string(),
            comments: non_blank(self.comments),
            result,
            updated_on: now,
        })
    }
}

/// Consultation outcome as submitted by a doctor, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationInput {
    pub suggestion: Option<DoctorSuggestion>,
    pub comments: Option<String>,
}

impl ConsultationInput {
    pub fn validate(&self) -> Result<()> {
        if self.suggestion.is_none() {
            return Err(UpstacError::Validation(
                "consultation is missing required fields: suggestion".into(),
            ));
        }
        Ok(())
    }

    pub fn into_result(self, now: DateTime<Utc>) -> Result<ConsultationResult> {
        let suggestion = self.suggestion.ok_or_else(|| {
            UpstacError::Validation("consultation is missing required fields: suggestion".into())
        })?;
        Ok(ConsultationResult {
            suggestion,
            comments: non_blank(self.comments),
            updated_on: now,
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

// ---------------------------------------------------------------------------
// RequestFlow
// ---------------------------------------------------------------------------

/// One applied transition, kept on the request as an audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFlow {
    pub from_status: RequestStatus,
    pub to_status: RequestStatus,
    pub changed_by: ActorRef,
    pub comments: String,
    pub happened_on: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TestRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub pin_code: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_tester: Option<ActorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_doctor: Option<ActorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_result: Option<LabResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation: Option<ConsultationResult>,
    pub created_by: ActorRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub flow_history: Vec<RequestFlow>,
    /// Bumped by the store on every successful save.
    #[serde(default)]
    pub version: u64,
}

impl TestRequest {
    pub fn new(id: u64, details: CreateTestRequest, created_by: ActorRef) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: details.name.trim().to_string(),
            age: details.age,
            gender: details.gender,
            email: details.email.trim().to_string(),
            phone_number: details.phone_number.trim().to_string(),
            address: details.address.trim().to_string(),
            pin_code: details.pin_code.trim().to_string(),
            status: RequestStatus::Initiated,
            assigned_tester: None,
            assigned_doctor: None,
            lab_result: None,
            consultation: None,
            created_by,
            created_at: now,
            updated_at: now,
            flow_history: Vec::new(),
            version: 0,
        }
    }

    /// Move to `to`, recording who did it. Callers validate beforehand.
    pub(crate) fn advance(
        &mut self,
        to: RequestStatus,
        by: ActorRef,
        comments: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.flow_history.push(RequestFlow {
            from_status: self.status,
            to_status: to,
            changed_by: by,
            comments: comments.into(),
            happened_on: now,
        });
        self.status = to;
        self.updated_at = now;
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Checks the assignment and payload invariants against the current status.
    pub fn is_consistent(&self) -> bool {
        let s = self.status;
        self.assigned_tester.is_some() == (s >= RequestStatus::LabTestInProgress)
            && self.assigned_doctor.is_some() == (s >= RequestStatus::DiagnosisInProcess)
            && self.lab_result.is_some() == (s >= RequestStatus::LabTestCompleted)
            && self.consultation.is_some() == (s == RequestStatus::Completed)
    }
}

// ---------------------------------------------------------------------------
// Intake payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTestRequest {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub pin_code: String,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static PIN_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

fn pin_re() -> &'static Regex {
    PIN_RE.get_or_init(|| Regex::new(r"^[0-9]{6}$").unwrap())
}

impl CreateTestRequest {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name must not be blank".to_string());
        }
        if !(1..=150).contains(&self.age) {
            problems.push(format!("age {} is out of range", self.age));
        }
        if !email_re().is_match(self.email.trim()) {
            problems.push(format!("'{}' is not a valid email", self.email));
        }
        if !phone_re().is_match(self.phone_number.trim()) {
            problems.push("phone number must be 10 digits".to_string());
        }
        if self.address.trim().is_empty() {
            problems.push("address must not be blank".to_string());
        }
        if !pin_re().is_match(self.pin_code.trim()) {
            problems.push("pin code must be 6 digits".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(UpstacError::Validation(problems.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn intake() -> CreateTestRequest {
        CreateTestRequest {
            name: "Asha Rao".into(),
            age: 34,
            gender: Gender::Female,
            email: "asha@example.com".into(),
            phone_number: "9876543210".into(),
            address: "12 MG Road, Pune".into(),
            pin_code: "411001".into(),
        }
    }

    pub(crate) fn lab_input() -> LabResultInput {
        LabResultInput {
            blood_pressure: "120/80".into(),
            heart_beat: "72".into(),
            temperature: "98.6".into(),
            oxygen_level: "97".into(),
            comments: Some("mild cough".into()),
            result: Some(TestStatus::Negative),
        }
    }

    #[test]
    fn intake_validation_accepts_good_payload() {
        intake().validate().unwrap();
    }

    #[test]
    fn intake_validation_collects_problems() {
        let mut bad = intake();
        bad.email = "not-an-email".into();
        bad.pin_code = "12".into();
        let err = bad.validate().unwrap_err().to_string();
        assert!(err.contains("valid email"), "{err}");
        assert!(err.contains("pin code"), "{err}");
    }

    #[test]
    fn lab_input_requires_result_and_vitals() {
        let mut input = lab_input();
        input.result = None;
        input.oxygen_level = "  ".into();
        let err = input.validate().unwrap_err();
        assert!(matches!(err, UpstacError::Validation(_)));
        let msg = err.to_string();
        assert!(msg.contains("oxygen_level") && msg.contains("result"), "{msg}");
    }

    #[test]
    fn lab_input_drops_blank_comments() {
        let mut input = lab_input();
        input.comments = Some("   ".into());
        let result = input.into_result(Utc::now()).unwrap();
        assert!(result.comments.is_none());
    }

    #[test]
    fn consultation_requires_suggestion() {
        assert!(ConsultationInput::default().validate().is_err());
        let input = ConsultationInput {
            suggestion: Some(DoctorSuggestion::Admit),
            comments: None,
        };
        input.validate().unwrap();
        assert_eq!(
            input.into_result(Utc::now()).unwrap().suggestion,
            DoctorSuggestion::Admit
        );
    }

    #[test]
    fn new_request_is_initiated_and_consistent() {
        let req = TestRequest::new(
            1,
            intake(),
            ActorRef {
                id: 9,
                username: "asha".into(),
            },
        );
        assert_eq!(req.status, RequestStatus::Initiated);
        assert!(req.is_consistent());
        assert!(req.is_open());
        assert!(req.flow_history.is_empty());
    }

    #[test]
    fn empty_options_are_not_serialized() {
        let req = TestRequest::new(
            1,
            intake(),
            ActorRef {
                id: 9,
                username: "asha".into(),
            },
        );
        let yaml = serde_yaml::to_string(&req).unwrap();
        assert!(!yaml.contains("assigned_tester"));
        assert!(!yaml.contains("lab_result"));
        let parsed: TestRequest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, req);
    }
}
