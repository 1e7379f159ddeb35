// src/models/review.rs
use crate::error::{ApiError, FieldErrors};
use crate::models::target::{TargetKind, TargetRef};
use crate::models::user::ReviewerProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A star rating, always within 1..=5.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Rating(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// A stored review.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Feedback {
    #[serde(rename = "feedbackID")]
    pub id: i64,
    #[serde(rename = "reviewerID")]
    pub reviewer_id: i64,
    #[serde(flatten)]
    pub target: TargetRef,
    pub rating: Rating,
    pub comment: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A review as shown on a listing page, next to who wrote it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackWithReviewer {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user: ReviewerProfile,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReviewedTarget {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub id: i64,
    /// `None` when the listing has since been removed.
    pub name: Option<String>,
}

/// A review as shown in "my reviews", next to what it was about.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackWithTarget {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub target: ReviewedTarget,
}

/// A validated review, ready to be stored for some reviewer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub target: TargetRef,
    pub rating: Rating,
    pub comment: String,
}

/// Raw `POST /reviews` body. Fields stay loosely typed so bad input turns
/// into field-level messages instead of a bare deserialization failure.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ReviewRequest {
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub type_id: Option<Value>,
    pub rating: Option<Value>,
    pub comment: Option<Value>,
}

impl ReviewRequest {
    pub fn validate(self) -> Result<NewFeedback, ApiError> {
        let mut errors = FieldErrors::new();

        let kind = match self.kind {
            None => {
                errors.add("type", "The type field is required.");
                None
            }
            Some(v) => {
                let kind = v.as_str().and_then(|s| s.parse::<TargetKind>().ok());
                if kind.is_none() {
                    errors.add("type", "The selected type is invalid.");
                }
                kind
            }
        };

        let type_id = match self.type_id {
            None => {
                errors.add("type_id", "The type id field is required.");
                None
            }
            Some(v) => {
                let id = integer_value(&v);
                if id.is_none() {
                    errors.add("type_id", "The type id field must be an integer.");
                }
                id
            }
        };

        let rating = match self.rating {
            None => {
                errors.add("rating", "The rating field is required.");
                None
            }
            Some(v) => match integer_value(&v) {
                None => {
                    errors.add("rating", "The rating field must be an integer.");
                    None
                }
                Some(n) => {
                    let rating = Rating::new(n);
                    if rating.is_none() {
                        errors.add("rating", "The rating field must be between 1 and 5.");
                    }
                    rating
                }
            },
        };

        let comment = match self.comment {
            None => Some(String::new()),
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                errors.add("comment", "The comment field must be a string.");
                None
            }
        };

        match (kind, type_id, rating, comment) {
            (Some(kind), Some(id), Some(rating), Some(comment)) if errors.is_empty() => {
                Ok(NewFeedback {
                    target: kind.with_id(id),
                    rating,
                    comment,
                })
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Accepts JSON integers, whole floats (`5.0`) and integer strings (`"42"`);
/// rejects `3.5`, `true`, `"4.0"`.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
            let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
            (f.fract() == 0.0 && in_range).then(|| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
