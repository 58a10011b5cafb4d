use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a visit application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audit status of a visit application, serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VisitStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl VisitStatus {
    pub const fn code(self) -> u8 {
        match self {
            VisitStatus::Pending => 0,
            VisitStatus::Approved => 1,
            VisitStatus::Rejected => 2,
            VisitStatus::Cancelled => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::Approved => "approved",
            VisitStatus::Rejected => "rejected",
            VisitStatus::Cancelled => "cancelled",
        }
    }

    /// Approved, Rejected and Cancelled are terminal; nothing leaves them.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, VisitStatus::Pending)
    }
}

impl TryFrom<u8> for VisitStatus {
    type Error = UnknownStatusCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VisitStatus::Pending),
            1 => Ok(VisitStatus::Approved),
            2 => Ok(VisitStatus::Rejected),
            3 => Ok(VisitStatus::Cancelled),
            other => Err(UnknownStatusCode(other)),
        }
    }
}

impl From<VisitStatus> for u8 {
    fn from(value: VisitStatus) -> Self {
        value.code()
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown visit status code {0}")]
pub struct UnknownStatusCode(pub u8);

/// Request fields captured at intake. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetails {
    pub visit_date: NaiveDate,
    pub visit_unit: String,
    pub visit_nature: u8,
    pub visit_num: u32,
    pub visit_car: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub time_slot: Option<String>,
}

/// Reviewer fields written once by the audit workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    pub commentator_name: Option<String>,
    pub commentator_phone: Option<String>,
    pub reject_reason: Option<String>,
    pub update_by: Option<String>,
    pub update_time: Option<NaiveDateTime>,
}

/// A stored visit application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitApplication {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub details: VisitDetails,
    pub status: VisitStatus,
    #[serde(flatten)]
    pub audit: AuditTrail,
    #[serde(rename = "delFlag", with = "del_flag")]
    pub deleted: bool,
    pub create_by: String,
    pub create_time: NaiveDateTime,
}

impl VisitApplication {
    /// Only pending applications accept an audit decision.
    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// A validated application that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitRecord {
    pub details: VisitDetails,
    pub create_by: String,
    pub create_time: NaiveDateTime,
}

impl NewVisitRecord {
    /// Stamps `create_by` with the contact name, as intake always does.
    pub fn new(details: VisitDetails, create_time: NaiveDateTime) -> Self {
        let create_by = details.contact_name.clone();
        Self {
            details,
            create_by,
            create_time,
        }
    }

    /// Materialize the stored form: Pending, not deleted, empty audit trail.
    pub fn into_application(self, id: ApplicationId) -> VisitApplication {
        VisitApplication {
            id,
            details: self.details,
            status: VisitStatus::Pending,
            audit: AuditTrail::default(),
            deleted: false,
            create_by: self.create_by,
            create_time: self.create_time,
        }
    }
}

/// Field set applied by a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: VisitStatus,
    pub commentator_name: Option<String>,
    pub commentator_phone: Option<String>,
    pub reject_reason: Option<String>,
    pub update_by: String,
    pub update_time: NaiveDateTime,
}

impl StatusChange {
    pub fn apply(&self, record: &mut VisitApplication) {
        record.status = self.status;
        record.audit = AuditTrail {
            commentator_name: self.commentator_name.clone(),
            commentator_phone: self.commentator_phone.clone(),
            reject_reason: self.reject_reason.clone(),
            update_by: Some(self.update_by.clone()),
            update_time: Some(self.update_time),
        };
    }
}

mod del_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(deleted: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*deleted))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "delFlag must be 0 or 1, got {other}"
            ))),
        }
    }
}
