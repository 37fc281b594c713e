//! Official Document Types

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{deserialize_double_option, Owned};
use crate::error::Error;

/// Whether a document was received or sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentDirection {
    /// Received from another agency.
    Incoming,
    /// Issued by this office.
    Outgoing,
}

impl DocumentDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl FromStr for DocumentDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            other => Err(Error::InvalidValue {
                field: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Processing state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Registered, not yet assigned.
    #[default]
    Pending,
    /// Assigned and being handled.
    Processing,
    /// Handled and archived.
    Completed,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            other => Err(Error::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A tracked official document ("công văn").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialDocument {
    pub id: Uuid,
    pub direction: DocumentDirection,
    pub document_number: String,
    pub summary: String,
    pub issuing_agency: Option<String>,
    pub signer: Option<String>,
    pub issued_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    pub attachment_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Owned for OfficialDocument {
    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

/// Insert payload for a new document.
///
/// `created_by` is stamped by the service from the current user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOfficialDocument {
    pub direction: DocumentDirection,
    #[validate(length(min = 1, max = 50))]
    pub document_number: String,
    #[validate(length(min = 1, max = 1000))]
    pub summary: String,
    #[validate(length(max = 255))]
    pub issuing_agency: Option<String>,
    #[validate(length(max = 255))]
    pub signer: Option<String>,
    pub issued_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[validate(url)]
    pub attachment_url: Option<String>,
}

/// Partial update payload. Absent fields are left untouched; clearable
/// columns take `Some(None)` to be set to null.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOfficialDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<DocumentDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 1000))]
    pub summary: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(length(max = 255))]
    pub issuing_agency: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    #[validate(length(max = 255))]
    pub signer: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    pub issued_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_double_option"
    )]
    pub received_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
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

    fn new_doc() -> NewOfficialDocument {
        NewOfficialDocument {
            direction: DocumentDirection::Incoming,
            document_number: "123/QĐ-UBND".into(),
            summary: "Về việc tổ chức hội nghị".into(),
            issuing_agency: Some("UBND tỉnh".into()),
            signer: None,
            issued_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            received_date: None,
            status: DocumentStatus::Pending,
            attachment_url: None,
        }
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(new_doc().validate().is_ok());
    }

    #[test]
    fn test_empty_number_rejected() {
        let doc = NewOfficialDocument {
            document_number: String::new(),
            ..new_doc()
        };
        let errors = doc.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("document_number"));
    }

    #[test]
    fn test_bad_attachment_url_rejected() {
        let doc = NewOfficialDocument {
            attachment_url: Some("not a url".into()),
            ..new_doc()
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = UpdateOfficialDocument {
            status: Some(DocumentStatus::Completed),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));
    }

    #[test]
    fn test_update_can_clear_attachment() {
        let update = UpdateOfficialDocument {
            attachment_url: Some(None),
            signer: Some(Some("Nguyễn Văn A".into())),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "signer": "Nguyễn Văn A", "attachment_url": null })
        );
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: UpdateOfficialDocument =
            serde_json::from_str(r#"{"issued_date": null}"#).unwrap();
        assert_eq!(cleared.issued_date, Some(None));
        assert_eq!(cleared.received_date, None);

        let set: UpdateOfficialDocument =
            serde_json::from_str(r#"{"issued_date": "2024-03-01"}"#).unwrap();
        assert_eq!(set.issued_date, Some(NaiveDate::from_ymd_opt(2024, 3, 1)));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("outgoing".parse::<DocumentDirection>().unwrap(), DocumentDirection::Outgoing);
        assert!("sideways".parse::<DocumentDirection>().is_err());
        assert_eq!("processing".parse::<DocumentStatus>().unwrap().as_str(), "processing");
    }
}
