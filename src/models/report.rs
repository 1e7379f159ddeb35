// src/models/report.rs
use crate::error::{ApiError, FieldErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a report is about, as persisted.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportTargetType {
    Business,
    Event,
    Service,
    Other,
}

impl ReportTargetType {
    /// Maps the category label picked in the app to the stored value.
    /// Labels outside the known set degrade to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Restaurant" => ReportTargetType::Business,
            "Event" => ReportTargetType::Event,
            "Freelance Service" => ReportTargetType::Service,
            "Business" => ReportTargetType::Business,
            _ => ReportTargetType::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportTargetType::Business => "business",
            ReportTargetType::Event => "event",
            ReportTargetType::Service => "service",
            ReportTargetType::Other => "other",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "business" => Some(ReportTargetType::Business),
            "event" => Some(ReportTargetType::Event),
            "service" => Some(ReportTargetType::Service),
            "other" => Some(ReportTargetType::Other),
            _ => None,
        }
    }
}

pub const ISSUES: [&str; 4] = ["Customer Experience", "Pricing", "Staff Conduct", "Other"];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    #[serde(rename = "Under Review")]
    UnderReview,
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::UnderReview => "Under Review",
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "Under Review" => Some(ReportStatus::UnderReview),
            other => Self::from_update(other),
        }
    }

    /// Statuses a report can be moved to after submission.
    pub fn from_update(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(ReportStatus::Pending),
            "In Progress" => Some(ReportStatus::InProgress),
            "Resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    #[serde(rename = "reportID")]
    pub id: i64,
    #[serde(rename = "reportedBy")]
    pub reported_by: i64,
    #[serde(rename = "targetType")]
    pub target_type: ReportTargetType,
    #[serde(rename = "targetName")]
    pub target_name: String,
    pub issue: String,
    pub details: String,
    pub status: ReportStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub target_type: ReportTargetType,
    pub target_name: String,
    pub issue: String,
    pub details: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub target_type: Option<String>,
    pub target_name: Option<String>,
    pub issue: Option<String>,
    pub details: Option<String>,
}

impl ReportRequest {
    pub fn validate(self) -> Result<NewReport, ApiError> {
        let mut errors = FieldErrors::new();

        let target_type = match self.target_type.as_deref() {
            None | Some("") => {
                errors.add("targetType", "The target type field is required.");
                ReportTargetType::Other
            }
            Some(label) => ReportTargetType::from_label(label),
        };

        let target_name = self.target_name.unwrap_or_default();
        check_min_length(&mut errors, "targetName", "target name", &target_name, 5);

        let details = self.details.unwrap_or_default();
        check_min_length(&mut errors, "details", "details", &details, 10);

        let issue = self.issue.unwrap_or_default();
        if issue.is_empty() {
            errors.add("issue", "The issue field is required.");
        } else if !ISSUES.contains(&issue.as_str()) {
            errors.add("issue", "The selected issue is invalid.");
        }

        errors.finish(NewReport {
            target_type,
            target_name,
            issue,
            details,
        })
    }
}

fn check_min_length(errors: &mut FieldErrors, field: &str, label: &str, value: &str, min: usize) {
    if value.trim().is_empty() {
        errors.add(field, format!("The {label} field is required."));
    } else if value.chars().count() < min {
        errors.add(
            field,
            format!("The {label} field must be at least {min} characters."),
        );
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    pub fn validate(self) -> Result<ReportStatus, ApiError> {
        match self.status.as_deref() {
            None | Some("") => Err(ApiError::validation("status", "The status field is required.")),
            Some(s) => ReportStatus::from_update(s)
                .ok_or_else(|| ApiError::validation("status", "The selected status is invalid.")),
        }
    }
}
