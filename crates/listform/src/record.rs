//! The editable record and its fixed vocabularies.

use crate::layout::Field;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum whose variants map 1:1 onto store strings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// String stored in the list column
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Workflow status of a record
    #[derive(Default)]
    Status ("status") {
        #[default]
        NotStarted => "Not Started",
        InProgress => "In Progress",
        Completed => "Completed",
        OnHold => "On Hold",
    }
}

wire_enum! {
    /// Record priority
    #[derive(Default)]
    Priority ("priority") {
        Low => "Low",
        #[default]
        Medium => "Medium",
        High => "High",
    }
}

wire_enum! {
    /// Work category
    Category ("category") {
        Development => "Development",
        Testing => "Testing",
        Documentation => "Documentation",
        Support => "Support",
    }
}

wire_enum! {
    /// Tag vocabulary
    Tag ("tag") {
        Frontend => "Frontend",
        Backend => "Backend",
        Database => "Database",
        Testing => "Testing",
    }
}

/// Completion percentage, held in `0..=100`.
///
/// Deserializes from any number and clamps it like [`Completion::from_f64`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct Completion(u8);

impl Completion {
    pub const MAX: u8 = 100;

    /// Clamp any number into range. NaN and infinities become 0.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self(0);
        }
        Self(value.round().clamp(0.0, f64::from(Self::MAX)) as u8)
    }

    /// Parse user input. Text that is not a number yields 0.
    pub fn parse_lossy(text: &str) -> Self {
        text.trim()
            .parse::<f64>()
            .map(Self::from_f64)
            .unwrap_or_default()
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<f64> for Completion {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Completion> for u8 {
    fn from(completion: Completion) -> Self {
        completion.0
    }
}

/// The single list entry a form session edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    /// Site user id
    pub assignee: Option<u64>,
    pub category: Option<Category>,
    pub completion: Completion,
    pub comments: String,
    pub tags: BTreeSet<Tag>,
    /// DocumentType id
    pub classification: Option<u64>,
    /// DocumentSubType ids, all children of `classification`
    pub sub_classifications: BTreeSet<u64>,
}

impl Default for Record {
    /// A blank record as shown by the create form.
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Status::NotStarted,
            priority: Priority::Medium,
            due_date: None,
            assignee: None,
            category: Some(Category::Development),
            completion: Completion::default(),
            comments: String::new(),
            tags: BTreeSet::new(),
            classification: None,
            sub_classifications: BTreeSet::new(),
        }
    }
}

impl Record {
    /// Required fields left blank
    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|field| field.is_required())
            .filter(|field| match field {
                Field::Title => self.title.trim().is_empty(),
                _ => false,
            })
            .collect()
    }

    /// Add the tag if absent, remove it if present. Returns whether it is now set.
    pub fn toggle_tag(&mut self, tag: Tag) -> bool {
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag);
            true
        }
    }
}
