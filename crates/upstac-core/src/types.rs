use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Initiated,
    LabTestInProgress,
    LabTestCompleted,
    DiagnosisInProcess,
    Completed,
}

impl RequestStatus {
    pub fn all() -> &'static [RequestStatus] {
        &[
            RequestStatus::Initiated,
            RequestStatus::LabTestInProgress,
            RequestStatus::LabTestCompleted,
            RequestStatus::DiagnosisInProcess,
            RequestStatus::Completed,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<RequestStatus> {
        RequestStatus::all().get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == RequestStatus::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Initiated => "INITIATED",
            RequestStatus::LabTestInProgress => "LAB_TEST_IN_PROGRESS",
            RequestStatus::LabTestCompleted => "LAB_TEST_COMPLETED",
            RequestStatus::DiagnosisInProcess => "DIAGNOSIS_IN_PROCESS",
            RequestStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = crate::error::UpstacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        RequestStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| crate::error::UpstacError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Tester,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Tester => "TESTER",
            Role::Doctor => "DOCTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::UpstacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "tester" => Ok(Role::Tester),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            _ => Err(crate::error::UpstacError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FlowOperation
// ---------------------------------------------------------------------------

/// The four operations that move a test request forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowOperation {
    AssignForLabTest,
    SubmitLabResult,
    AssignForConsultation,
    SubmitConsultation,
}

impl FlowOperation {
    pub fn all() -> &'static [FlowOperation] {
        &[
            FlowOperation::AssignForLabTest,
            FlowOperation::SubmitLabResult,
            FlowOperation::AssignForConsultation,
            FlowOperation::SubmitConsultation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowOperation::AssignForLabTest => "assign_for_lab_test",
            FlowOperation::SubmitLabResult => "submit_lab_result",
            FlowOperation::AssignForConsultation => "assign_for_consultation",
            FlowOperation::SubmitConsultation => "submit_consultation",
        }
    }

    /// Submit operations are restricted to the actor bound by the matching assignment.
    pub fn requires_assignee(self) -> bool {
        matches!(
            self,
            FlowOperation::SubmitLabResult | FlowOperation::SubmitConsultation
        )
    }
}

impl fmt::Display for FlowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Result enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Positive,
    Negative,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestStatus::Positive => "POSITIVE",
            TestStatus::Negative => "NEGATIVE",
        })
    }
}

impl std::str::FromStr for TestStatus {
    type Err = crate::error::UpstacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(TestStatus::Positive),
            "negative" => Ok(TestStatus::Negative),
            _ => Err(crate::error::UpstacError::Validation(format!(
                "unknown test result '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoctorSuggestion {
    NoIssues,
    HomeQuarantine,
    Admit,
}

impl fmt::Display for DoctorSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoctorSuggestion::NoIssues => "NO_ISSUES",
            DoctorSuggestion::HomeQuarantine => "HOME_QUARANTINE",
            DoctorSuggestion::Admit => "ADMIT",
        })
    }
}

impl std::str::FromStr for DoctorSuggestion {
    type Err = crate::error::UpstacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "no_issues" => Ok(DoctorSuggestion::NoIssues),
            "home_quarantine" => Ok(DoctorSuggestion::HomeQuarantine),
            "admit" => Ok(DoctorSuggestion::Admit),
            _ => Err(crate::error::UpstacError::Validation(format!(
                "unknown suggestion '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::str::FromStr for Gender {
    type Err = crate::error::UpstacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(crate::error::UpstacError::Validation(format!(
                "unknown gender '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_ordering() {
        assert!(RequestStatus::Initiated < RequestStatus::LabTestInProgress);
        assert!(RequestStatus::LabTestCompleted < RequestStatus::DiagnosisInProcess);
        assert!(RequestStatus::Completed > RequestStatus::DiagnosisInProcess);
    }

    #[test]
    fn status_next() {
        assert_eq!(
            RequestStatus::Initiated.next(),
            Some(RequestStatus::LabTestInProgress)
        );
        assert_eq!(
            RequestStatus::DiagnosisInProcess.next(),
            Some(RequestStatus::Completed)
        );
        assert_eq!(RequestStatus::Completed.next(), None);
        assert!(RequestStatus::Completed.is_terminal());
        assert!(!RequestStatus::LabTestCompleted.is_terminal());
    }

    #[test]
    fn status_parse_accepts_kebab_and_lowercase() {
        assert_eq!(
            RequestStatus::from_str("lab-test-completed").unwrap(),
            RequestStatus::LabTestCompleted
        );
        assert_eq!(
            RequestStatus::from_str("INITIATED").unwrap(),
            RequestStatus::Initiated
        );
        assert!(RequestStatus::from_str("archived").is_err());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&RequestStatus::DiagnosisInProcess).unwrap();
        assert_eq!(json, "\"DIAGNOSIS_IN_PROCESS\"");
    }

    #[test]
    fn role_parse() {
        assert_eq!(Role::from_str("Tester").unwrap(), Role::Tester);
        assert_eq!(Role::from_str("doctor").unwrap(), Role::Doctor);
        assert!(Role::from_str("nurse").is_err());
    }

    #[test]
    fn only_submit_operations_require_assignee() {
        assert!(FlowOperation::SubmitLabResult.requires_assignee());
        assert!(FlowOperation::SubmitConsultation.requires_assignee());
        assert!(!FlowOperation::AssignForLabTest.requires_assignee());
        assert!(!FlowOperation::AssignForConsultation.requires_assignee());
    }

    #[test]
    fn suggestion_parse() {
        assert_eq!(
            DoctorSuggestion::from_str("home-quarantine").unwrap(),
            DoctorSuggestion::HomeQuarantine
        );
        assert!(DoctorSuggestion::from_str("surgery").is_err());
    }
}
