//! Form configuration: which lists back the form and how they are queried.

use chrono::{FixedOffset, Offset, Utc};

/// Widest offset any site time zone uses (UTC+14 / UTC-12 fit inside)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Lists and options backing one form
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Title of the list holding the records
    pub record_list: String,
    /// Title of the top-level classification list
    pub document_type_list: String,
    /// Title of the second-level classification list
    pub document_sub_type_list: String,
    /// Entity-type marker for writes; derived from `record_list` when unset
    pub entity_type: Option<String>,
    /// Ask the store to filter users and sub-types. Results are filtered
    /// again locally either way.
    pub server_side_filter: bool,
    /// Site time zone as minutes east of UTC. Date-only columns are stored
    /// as local midnight of this offset.
    pub site_utc_offset_minutes: i32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            record_list: "VDMDemo".to_string(),
            document_type_list: "DocumentType".to_string(),
            document_sub_type_list: "DocumentSubType".to_string(),
            entity_type: None,
            server_side_filter: false,
            site_utc_offset_minutes: 0,
        }
    }
}

impl FormConfig {
    /// Entity-type marker for record writes
    pub fn entity_type(&self) -> String {
        self.entity_type
            .clone()
            .unwrap_or_else(|| default_entity_type(&self.record_list))
    }

    /// Offset the site stores date-only columns in
    pub fn site_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.site_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.site_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(format!(
                "site UTC offset {} minutes is outside +/-{}",
                self.site_utc_offset_minutes, MAX_OFFSET_MINUTES
            ));
        }

        for (name, value) in [
            ("record list", &self.record_list),
            ("document type list", &self.document_type_list),
            ("document sub-type list", &self.document_sub_type_list),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} title must not be empty", name));
            }
        }
        Ok(())
    }
}

/// `SP.Data.{List}ListItem`, with spaces in the list name escaped as `_x0020_`.
pub fn default_entity_type(list_title: &str) -> String {
    format!("SP.Data.{}ListItem", list_title.replace(' ', "_x0020_"))
}
