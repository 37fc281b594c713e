//! Reward and Discipline Decision Types

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{deserialize_double_option, Owned};
use crate::error::Error;

/// Whether a decision grants a reward or imposes discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Reward,
    Discipline,
}

impl DecisionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::Discipline => "discipline",
        }
    }
}

impl FromStr for DecisionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reward" => Ok(Self::Reward),
            "discipline" => Ok(Self::Discipline),
            other => Err(Error::InvalidValue {
                field: "kind",
                value: other.to_string(),
            }),
        }
    }
}

/// A reward or discipline decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardDecision {
    pub id: Uuid,
    pub kind: DecisionKind,
    pub decision_number: String,
    pub subject_name: String,
    pub unit: Option<String>,
    /// Form of the decision (certificate of merit, warning, reprimand...).
    pub form: String,
    pub reason: Option<String>,
    pub decision_date: NaiveDate,
    /// Monetary amount attached to a reward, in VND.
    pub amount: Option<i64>,
    pub attachment_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Owned for RewardDecision {
    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

/// Insert payload for a new decision.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRewardDecision {
    pub kind: DecisionKind,
    #[validate(length(min = 1, max = 50))]
    pub decision_number: String,
    #[validate(length(min = 1, max = 255))]
    pub subject_name: String,
    #[validate(length(max = 255))]
    pub unit: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub form: String,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
    pub decision_date: NaiveDate,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    #[validate(url)]
    pub attachment_url: Option<String>,
}

/// Partial update payload. Absent fields are left untouched; clearable
/// columns take `Some(None)` to be set to null.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRewardDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DecisionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub decision_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub subject_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(length(max = 255))]
    pub unit: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub form: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(length(max = 2000))]
    pub reason: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(range(min = 0))]
    pub amount: Option<Option<i64>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(url)]
    pub attachment_url: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amount_rejected() {
        let decision = NewRewardDecision {
            kind: DecisionKind::Reward,
            decision_number: "45/QĐ-KT".into(),
            subject_name: "Trần Thị B".into(),
            unit: Some("Phòng Tài chính".into()),
            form: "Giấy khen".into(),
            reason: None,
            decision_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            amount: Some(-1),
            attachment_url: None,
        };
        let errors = decision.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_update_clears_amount_and_validates_set_values() {
        let cleared = UpdateRewardDecision {
            amount: Some(None),
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            serde_json::json!({ "amount": null })
        );

        let negative = UpdateRewardDecision {
            amount: Some(Some(-5)),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [DecisionKind::Reward, DecisionKind::Discipline] {
            assert_eq!(kind.as_str().parse::<DecisionKind>().unwrap(), kind);
        }
        assert!("bonus".parse::<DecisionKind>().is_err());
    }
}
