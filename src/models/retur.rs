use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Resolution state of a return. Moves from `Pending` to `Approved` and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Pending,
    Approved,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
        }
    }
}

impl FromStr for ReturnStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            other => Err(AppError::invalid_input(format!("unknown status '{}'", other))),
        }
    }
}

/// How an approved return is settled: a replacement item or cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundMode {
    #[serde(rename = "barang")]
    Item,
    #[serde(rename = "uang")]
    Cash,
}

impl RefundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "barang",
            Self::Cash => "uang",
        }
    }
}

/// Exact match only: no trimming, no case folding.
impl FromStr for RefundMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "barang" => Ok(Self::Item),
            "uang" => Ok(Self::Cash),
            _ => Err(AppError::invalid_input(
                "refundMode must be 'barang' or 'uang'",
            )),
        }
    }
}

/// A persisted return record.
///
/// `refund_mode` is `Some` exactly when `status` is `Approved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: i64,
    pub item: String,
    pub reason: String,
    pub status: ReturnStatus,
    pub refund_mode: Option<RefundMode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a record; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReturn {
    pub item: String,
    pub reason: String,
    pub status: ReturnStatus,
    pub refund_mode: Option<RefundMode>,
}

impl NewReturn {
    pub fn pending(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
            status: ReturnStatus::Pending,
            refund_mode: None,
        }
    }

    pub fn approved(
        item: impl Into<String>,
        reason: impl Into<String>,
        refund_mode: RefundMode,
    ) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
            status: ReturnStatus::Approved,
            refund_mode: Some(refund_mode),
        }
    }

    /// Content of a deleted record, to be re-inserted under a fresh id.
    pub fn from_snapshot(snapshot: &Return) -> Self {
        Self {
            item: snapshot.item.clone(),
            reason: snapshot.reason.clone(),
            status: snapshot.status,
            refund_mode: snapshot.refund_mode,
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of `POST /retur`. Any `id`, `status` or `refundMode` sent by the
/// client is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateReturn {
    #[serde(alias = "barang")]
    pub item: String,
    #[serde(alias = "alasan")]
    pub reason: String,
}

/// Body of `POST /retur/{id}/approve`. Kept as a raw string so an unknown
/// value surfaces as a descriptive `InvalidInput` rather than a decode error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveReturn {
    #[serde(alias = "pengembalian")]
    pub refund_mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: ReturnStatus, refund_mode: Option<RefundMode>) -> Return {
        Return {
            id: 7,
            item: "Shoes".to_string(),
            reason: "Wrong size".to_string(),
            status,
            refund_mode,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn refund_mode_parses_only_exact_values() {
        assert_eq!("barang".parse::<RefundMode>().unwrap(), RefundMode::Item);
        assert_eq!("uang".parse::<RefundMode>().unwrap(), RefundMode::Cash);
        for bad in ["", "Uang", " uang", "cash", "item", "transfer"] {
            assert!(
                matches!(bad.parse::<RefundMode>(), Err(AppError::InvalidInput(_))),
                "{:?} must be rejected",
                bad
            );
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [ReturnStatus::Pending, ReturnStatus::Approved] {
            assert_eq!(s.as_str().parse::<ReturnStatus>().unwrap(), s);
        }
        assert!("Rejected".parse::<ReturnStatus>().is_err());
    }

    #[test]
    fn serializes_with_camel_case_and_wire_values() {
        let json = serde_json::to_value(sample(ReturnStatus::Approved, Some(RefundMode::Cash)))
            .unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "Approved");
        assert_eq!(json["refundMode"], "uang");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn pending_record_serializes_null_refund_mode() {
        let json = serde_json::to_value(sample(ReturnStatus::Pending, None)).unwrap();
        assert_eq!(json["status"], "Pending");
        assert!(json["refundMode"].is_null());
    }

    #[test]
    fn create_payload_ignores_client_status_and_id() {
        let payload: CreateReturn = serde_json::from_value(serde_json::json!({
            "id": 99,
            "item": "Shoes",
            "reason": "Wrong size",
            "status": "Approved",
            "refundMode": "uang"
        }))
        .unwrap();
        assert_eq!(payload.item, "Shoes");
        assert_eq!(payload.reason, "Wrong size");
    }

    #[test]
    fn payloads_accept_legacy_field_names() {
        let create: CreateReturn =
            serde_json::from_str(r#"{"barang": "Tas", "alasan": "Rusak"}"#).unwrap();
        assert_eq!(create.item, "Tas");
        assert_eq!(create.reason, "Rusak");

        let approve: ApproveReturn =
            serde_json::from_str(r#"{"pengembalian": "barang"}"#).unwrap();
        assert_eq!(approve.refund_mode, "barang");
    }

    #[test]
    fn snapshot_keeps_content_but_not_identity() {
        let original = sample(ReturnStatus::Approved, Some(RefundMode::Item));
        let candidate = NewReturn::from_snapshot(&original);
        assert_eq!(
            candidate,
            NewReturn::approved("Shoes", "Wrong size", RefundMode::Item)
        );
    }
}
