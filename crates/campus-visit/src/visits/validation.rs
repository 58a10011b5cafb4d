//! Boundary request shapes and the checks that turn them into domain values.
//!
//! Every check here runs before the store is touched, so a rejected request never
//! produces a partial write.

use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{ApplicationId, VisitDetails, VisitStatus};
use super::error::VisitError;

/// Intake payload as submitted by a visitor. All fields are optional at the wire level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSubmission {
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub visit_unit: Option<String>,
    #[serde(default)]
    pub visit_nature: Option<i64>,
    #[serde(default)]
    pub visit_num: Option<i64>,
    #[serde(default)]
    pub visit_car: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
}

/// Reviewer decision as submitted by an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub commentator_name: Option<String>,
    #[serde(default)]
    pub commentator_phone: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub update_by: Option<String>,
}

/// A reviewer decision that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuditCommand {
    pub(crate) id: ApplicationId,
    pub(crate) target: VisitStatus,
    pub(crate) commentator_name: Option<String>,
    pub(crate) commentator_phone: Option<String>,
    pub(crate) reject_reason: Option<String>,
    pub(crate) update_by: String,
}

pub(crate) fn validate_submission(submission: VisitSubmission) -> Result<VisitDetails, VisitError> {
    let VisitSubmission {
        visit_date,
        visit_unit,
        visit_nature,
        visit_num,
        visit_car,
        contact_name,
        contact_phone,
        time_slot,
    } = submission;

    let visit_date = required(visit_date, "visitDate")?;
    let visit_date = parse_date(&visit_date).map_err(VisitError::InvalidInput)?;
    let visit_unit = required(visit_unit, "visitUnit")?;
    let visit_nature = visit_nature.ok_or_else(|| missing("visitNature"))?;
    let visit_nature = u8::try_from(visit_nature)
        .map_err(|_| VisitError::invalid(format!("visitNature {visit_nature} is out of range")))?;
    let visit_num = visit_num.ok_or_else(|| missing("visitNum"))?;
    let visit_num = u32::try_from(visit_num)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| VisitError::invalid("visitNum must be at least 1"))?;
    let contact_name = required(contact_name, "contactName")?;
    let contact_phone = required(contact_phone, "contactPhone")?;
    if !is_valid_phone(&contact_phone) {
        return Err(VisitError::invalid("contactPhone is not a valid phone number"));
    }

    Ok(VisitDetails {
        visit_date,
        visit_unit,
        visit_nature,
        visit_num,
        visit_car: non_blank(visit_car),
        contact_name,
        contact_phone,
        time_slot: non_blank(time_slot),
    })
}

pub(crate) fn validate_audit(request: AuditRequest) -> Result<AuditCommand, VisitError> {
    let AuditRequest {
        id,
        status,
        commentator_name,
        commentator_phone,
        reject_reason,
        update_by,
    } = request;

    let id = id
        .filter(|id| *id > 0)
        .map(ApplicationId)
        .ok_or_else(|| VisitError::invalid("id must be a positive integer"))?;
    let target = status
        .and_then(|code| u8::try_from(code).ok())
        .and_then(|code| VisitStatus::try_from(code).ok())
        .ok_or_else(|| VisitError::invalid("status must be 1, 2 or 3"))?;
    if target == VisitStatus::Pending {
        return Err(VisitError::invalid("pending is not an audit target"));
    }

    let update_by = required(update_by, "updateBy")?;
    let commentator_name = non_blank(commentator_name);
    let commentator_phone = non_blank(commentator_phone);
    let reject_reason = non_blank(reject_reason);

    if let Some(phone) = commentator_phone.as_deref() {
        if !is_valid_phone(phone) {
            return Err(VisitError::invalid("commentatorPhone is not a valid phone number"));
        }
    }

    let reject_reason = match target {
        VisitStatus::Approved => {
            if commentator_name.is_none() || commentator_phone.is_none() {
                return Err(VisitError::invalid(
                    "approval requires commentatorName and commentatorPhone",
                ));
            }
            None
        }
        VisitStatus::Rejected => Some(
            reject_reason.ok_or_else(|| VisitError::invalid("rejection requires rejectReason"))?,
        ),
        VisitStatus::Pending | VisitStatus::Cancelled => None,
    };

    Ok(AuditCommand {
        id,
        target,
        commentator_name,
        commentator_phone,
        reject_reason,
        update_by,
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Digits with an optional leading `+`; inner `-` and spaces are tolerated.
pub(crate) fn is_valid_phone(raw: &str) -> bool {
    let raw = raw.trim();
    let body = raw.strip_prefix('+').unwrap_or(raw);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (5..=20).contains(&raw.len())
        && digits >= 5
        && body.starts_with(|c: char| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == ' ')
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, VisitError> {
    non_blank(value).ok_or_else(|| missing(field))
}

fn missing(field: &str) -> VisitError {
    VisitError::invalid(format!("{field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> VisitSubmission {
        VisitSubmission {
            visit_date: Some("2025-11-03".to_string()),
            visit_unit: Some("Tianfu Middle School".to_string()),
            visit_nature: Some(1),
            visit_num: Some(40),
            visit_car: Some("  ".to_string()),
            contact_name: Some(" Li Wei ".to_string()),
            contact_phone: Some("13800138000".to_string()),
            time_slot: None,
        }
    }

    #[test]
    fn submission_is_trimmed_and_optional_fields_normalized() {
        let details = validate_submission(submission()).expect("valid submission");
        assert_eq!(details.contact_name, "Li Wei");
        assert_eq!(details.visit_car, None);
        assert_eq!(details.time_slot, None);
        assert_eq!(details.visit_num, 40);
    }

    #[test]
    fn each_mandatory_field_is_enforced() {
        let cases: [(&str, fn(&mut VisitSubmission)); 6] = [
            ("visitDate", |s: &mut VisitSubmission| s.visit_date = None),
            ("visitUnit", |s: &mut VisitSubmission| {
                s.visit_unit = Some(" ".to_string())
            }),
            ("visitNature", |s: &mut VisitSubmission| s.visit_nature = None),
            ("visitNum", |s: &mut VisitSubmission| s.visit_num = None),
            ("contactName", |s: &mut VisitSubmission| s.contact_name = None),
            ("contactPhone", |s: &mut VisitSubmission| s.contact_phone = None),
        ];

        for (field, strip) in cases {
            let mut candidate = submission();
            strip(&mut candidate);
            match validate_submission(candidate) {
                Err(VisitError::InvalidInput(message)) => assert!(
                    message.contains(field),
                    "expected {field} in '{message}'"
                ),
                other => panic!("expected invalid input for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut bad_date = submission();
        bad_date.visit_date = Some("03/11/2025".to_string());
        assert!(matches!(
            validate_submission(bad_date),
            Err(VisitError::InvalidInput(_))
        ));

        let mut zero_visitors = submission();
        zero_visitors.visit_num = Some(0);
        assert!(matches!(
            validate_submission(zero_visitors),
            Err(VisitError::InvalidInput(_))
        ));

        let mut bad_phone = submission();
        bad_phone.contact_phone = Some("call me".to_string());
        assert!(matches!(
            validate_submission(bad_phone),
            Err(VisitError::InvalidInput(_))
        ));
    }

    #[test]
    fn phone_format() {
        assert!(is_valid_phone("13800138000"));
        assert!(is_valid_phone("+86 138-0013-8000"));
        assert!(is_valid_phone("028-8888888"));
        assert!(!is_valid_phone("1234"));
        assert!(!is_valid_phone("-13800138000"));
        assert!(!is_valid_phone("138001380001380013800"));
    }

    fn audit(status: i64) -> AuditRequest {
        AuditRequest {
            id: Some(3),
            status: Some(status),
            commentator_name: Some("Zhao".to_string()),
            commentator_phone: Some("13900000000".to_string()),
            reject_reason: Some("Fully booked".to_string()),
            update_by: Some("admin".to_string()),
        }
    }

    #[test]
    fn approval_requires_reviewer_identity_and_drops_reason() {
        let command = validate_audit(audit(1)).expect("valid approval");
        assert_eq!(command.target, VisitStatus::Approved);
        assert_eq!(command.reject_reason, None);

        let mut anonymous = audit(1);
        anonymous.commentator_phone = None;
        assert!(matches!(
            validate_audit(anonymous),
            Err(VisitError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejection_requires_reason() {
        let command = validate_audit(audit(2)).expect("valid rejection");
        assert_eq!(command.reject_reason.as_deref(), Some("Fully booked"));

        let mut silent = audit(2);
        silent.reject_reason = Some("   ".to_string());
        assert!(matches!(
            validate_audit(silent),
            Err(VisitError::InvalidInput(_))
        ));
    }

    #[test]
    fn pending_and_unknown_targets_are_rejected() {
        for status in [0, 4, -1, 300] {
            assert!(matches!(
                validate_audit(audit(status)),
                Err(VisitError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn id_and_updater_are_required() {
        let mut no_id = audit(3);
        no_id.id = Some(-1);
        assert!(matches!(
            validate_audit(no_id),
            Err(VisitError::InvalidInput(_))
        ));

        let mut no_updater = audit(3);
        no_updater.update_by = None;
        assert!(matches!(
            validate_audit(no_updater),
            Err(VisitError::InvalidInput(_))
        ));

        let cancelled = validate_audit(audit(3)).expect("valid cancellation");
        assert_eq!(cancelled.target, VisitStatus::Cancelled);
        assert_eq!(cancelled.reject_reason, None);
    }
}
