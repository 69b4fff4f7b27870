//! Declarative form layout handed to the rendering host.

use crate::record::{Category, Priority, Status, Tag};
use crate::vocab::ChoiceOption;
use serde::{Deserialize, Serialize};

/// Form tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    General,
    Details,
    Assignment,
}

impl Tab {
    pub fn header(&self) -> &'static str {
        match self {
            Tab::General => "General Info",
            Tab::Details => "Details",
            Tab::Assignment => "Assignment",
        }
    }
}

/// Every editable field of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Description,
    Priority,
    Status,
    Category,
    DueDate,
    Completion,
    AssignedTo,
    Tags,
    DocumentType,
    DocumentSubTypes,
    Comments,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Title,
        Field::Description,
        Field::Priority,
        Field::Status,
        Field::Category,
        Field::DueDate,
        Field::Completion,
        Field::AssignedTo,
        Field::Tags,
        Field::DocumentType,
        Field::DocumentSubTypes,
        Field::Comments,
    ];

    /// Only the title is required.
    pub fn is_required(&self) -> bool {
        matches!(self, Field::Title)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Priority => "Priority",
            Field::Status => "Status",
            Field::Category => "Category",
            Field::DueDate => "Due Date",
            Field::Completion => "Completion (%)",
            Field::AssignedTo => "Assigned To",
            Field::Tags => "Tags",
            Field::DocumentType => "Document Type",
            Field::DocumentSubTypes => "Document SubTypes",
            Field::Comments => "Comments",
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Field::Title | Field::Description => Tab::General,
            Field::Priority
            | Field::Status
            | Field::Category
            | Field::DueDate
            | Field::Completion => Tab::Details,
            Field::AssignedTo
            | Field::Tags
            | Field::DocumentType
            | Field::DocumentSubTypes
            | Field::Comments => Tab::Assignment,
        }
    }

    pub fn control(&self) -> Control {
        match self {
            Field::Title => Control::Text,
            Field::Description | Field::Comments => Control::MultilineText,
            Field::Priority => Control::ChoiceGroup,
            Field::Status | Field::Category | Field::DocumentType => Control::Dropdown,
            Field::DueDate => Control::DatePicker,
            Field::Completion => Control::Number { min: 0, max: 100 },
            Field::AssignedTo => Control::ComboBox,
            Field::Tags | Field::DocumentSubTypes => Control::CheckboxGroup,
        }
    }

    /// Options fixed at compile time. Lookup fields return nothing here; their
    /// options come from the session.
    pub fn static_options(&self) -> Vec<ChoiceOption> {
        fn options<T: std::fmt::Display>(values: &[T]) -> Vec<ChoiceOption> {
            values
                .iter()
                .map(|v| ChoiceOption::new(v.to_string(), v.to_string()))
                .collect()
        }

        match self {
            Field::Priority => options(Priority::ALL),
            Field::Status => options(Status::ALL),
            Field::Category => options(Category::ALL),
            Field::Tags => options(Tag::ALL),
            _ => Vec::new(),
        }
    }
}

/// Widget kind for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Control {
    Text,
    MultilineText,
    ChoiceGroup,
    Dropdown,
    DatePicker,
    Number { min: u8, max: u8 },
    ComboBox,
    CheckboxGroup,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldLayout {
    pub field: Field,
    pub label: &'static str,
    pub control: Control,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabLayout {
    pub key: Tab,
    pub header: &'static str,
    pub fields: Vec<FieldLayout>,
}

/// The whole form, tab by tab
#[derive(Debug, Clone, Serialize)]
pub struct FormLayout {
    pub tabs: Vec<TabLayout>,
}

impl FormLayout {
    pub fn standard() -> Self {
        let tabs = [Tab::General, Tab::Details, Tab::Assignment]
            .into_iter()
            .map(|tab| TabLayout {
                key: tab,
                header: tab.header(),
                fields: Field::ALL
                    .iter()
                    .filter(|f| f.tab() == tab)
                    .map(|f| FieldLayout {
                        field: *f,
                        label: f.label(),
                        control: f.control(),
                        required: f.is_required(),
                        options: f.static_options(),
                    })
                    .collect(),
            })
            .collect();

        Self { tabs }
    }
}
