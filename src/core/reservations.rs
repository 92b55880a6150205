//! Append-only log of confirmed reservations.
//!
//! Records accumulate in completion order for the lifetime of the process and
//! are exposed read-only via `GET /reservations`. Nothing is persisted: a
//! restart loses the log. That is a documented limitation carried over from
//! the original system, not a defect to fix here.

use parking_lot::RwLock;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::session::ReservationFields;

/// Immutable snapshot of a completed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRecord {
    pub name: String,
    pub date: String,
    pub time: String,
    pub party_size: String,
    pub notes: String,
    /// Call SID the reservation was taken on
    pub call_sid: String,
    /// RFC 3339 UTC completion timestamp
    pub created_at: String,
}

impl ReservationRecord {
    /// Snapshot the gathered fields at completion time.
    ///
    /// Completion guarantees all five fields are non-empty; unset fields
    /// render as empty strings rather than panicking if that invariant is
    /// ever violated upstream.
    pub fn from_fields(call_sid: &str, fields: &ReservationFields) -> Self {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            name: fields.name.clone().unwrap_or_default(),
            date: fields.date.clone().unwrap_or_default(),
            time: fields.time.clone().unwrap_or_default(),
            party_size: fields.party_size.clone().unwrap_or_default(),
            notes: fields.notes.clone().unwrap_or_default(),
            call_sid: call_sid.to_string(),
            created_at,
        }
    }
}

/// In-memory, append-only reservation log.
///
/// Append is the only mutator; reads take a snapshot in insertion order.
#[derive(Debug, Default)]
pub struct ReservationLog {
    records: RwLock<Vec<ReservationRecord>>,
}

impl ReservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a confirmed reservation.
    pub fn append(&self, record: ReservationRecord) {
        self.records.write().push(record);
    }

    /// All records, completion order.
    pub fn snapshot(&self) -> Vec<ReservationRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
