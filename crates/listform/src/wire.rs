//! Store representation of a record and its conversion to and from [`Record`].

use crate::record::{Category, Completion, Priority, Record, Status, Tag};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use listform_client::{ItemMetadata, MultiValue};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A record item as read from the store. Every column may be null or absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordItem {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub assigned_to_id: Option<u64>,
    pub category: Option<String>,
    pub completion_percentage: Option<f64>,
    pub comments: Option<String>,
    pub tags: Option<MultiValue<String>>,
    pub document_type_id: Option<u64>,
    pub document_sub_types_id: Option<MultiValue<u64>>,
}

/// Create/update body for a record item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordPayload {
    #[serde(rename = "__metadata")]
    pub metadata: ItemMetadata,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub due_date: Option<String>,
    pub assigned_to_id: Option<u64>,
    pub category: Option<Category>,
    pub completion_percentage: u8,
    pub priority: Priority,
    pub tags: MultiValue<Tag>,
    pub document_type_id: Option<u64>,
    pub document_sub_types_id: MultiValue<u64>,
    pub comments: String,
}

impl RecordPayload {
    /// Write body for `record`; the due date goes out as local midnight of
    /// `site_offset`.
    pub fn from_record(record: &Record, entity_type: &str, site_offset: FixedOffset) -> Self {
        Self {
            metadata: ItemMetadata::new(entity_type),
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status,
            due_date: record.due_date.map(|d| encode_due_date(d, site_offset)),
            assigned_to_id: record.assignee,
            category: record.category,
            completion_percentage: record.completion.get(),
            priority: record.priority,
            tags: record.tags.iter().copied().collect(),
            document_type_id: record.classification,
            document_sub_types_id: record.sub_classifications.iter().copied().collect(),
            comments: record.comments.clone(),
        }
    }
}

impl RecordItem {
    /// Hydrate, substituting defaults for anything null, absent or unrecognized.
    /// Due dates are read as calendar days of `site_offset`.
    pub fn into_record(self, site_offset: FixedOffset) -> Record {
        Record {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: parse_or_default(self.status.as_deref()),
            priority: parse_or_default(self.priority.as_deref()),
            due_date: self
                .due_date
                .as_deref()
                .and_then(|d| decode_due_date(d, site_offset)),
            assignee: self.assigned_to_id,
            category: self.category.as_deref().and_then(parse_known),
            completion: self
                .completion_percentage
                .map(Completion::from_f64)
                .unwrap_or_default(),
            comments: self.comments.unwrap_or_default(),
            tags: self
                .tags
                .map(MultiValue::into_vec)
                .unwrap_or_default()
                .iter()
                .filter_map(|t| parse_known(t))
                .collect(),
            classification: self.document_type_id,
            sub_classifications: self
                .document_sub_types_id
                .map(MultiValue::into_vec)
                .unwrap_or_default()
                .into_iter()
                .collect(),
        }
    }
}

fn parse_known<T: FromStr<Err = crate::record::UnknownVariant>>(value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Ignoring stored value: {}", e);
            None
        }
    }
}

fn parse_or_default<T>(value: Option<&str>) -> T
where
    T: FromStr<Err = crate::record::UnknownVariant> + Default,
{
    value.and_then(parse_known).unwrap_or_default()
}

/// Due dates go out as the site's local midnight, expressed in UTC.
pub fn encode_due_date(date: NaiveDate, site_offset: FixedOffset) -> String {
    let instant = date
        .and_hms_opt(0, 0, 0)
        .and_then(|local| site_offset.from_local_datetime(&local).single())
        .map(|dt| dt.with_timezone(&Utc));
    match instant {
        Some(instant) => instant.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => format!("{}T00:00:00Z", date.format("%Y-%m-%d")),
    }
}

/// Read a stored due date back as a calendar date of the site.
///
/// Date-only columns come back as the site's local midnight expressed in UTC,
/// so the instant is shifted into `site_offset` before taking the date. Plain
/// `YYYY-MM-DD` is accepted as-is.
pub fn decode_due_date(value: &str, site_offset: FixedOffset) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&site_offset).date_naive());
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!("Ignoring unparseable due date {:?}", value);
            None
        }
    }
}
