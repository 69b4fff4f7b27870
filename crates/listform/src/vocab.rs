//! Lookup vocabularies: assignable users and the two-level document taxonomy.

use listform_client::SiteUser;
use serde::{Deserialize, Serialize};

/// Principal type code of an individual user account
pub const PRINCIPAL_TYPE_USER: u32 = 1;

/// An option as handed to the rendering host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub key: String,
    pub text: String,
}

impl ChoiceOption {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// A person eligible as assignee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub display_name: String,
}

impl User {
    pub fn option(&self) -> ChoiceOption {
        ChoiceOption::new(self.id.to_string(), &self.display_name)
    }
}

/// Top-level classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Title", default)]
    pub name: String,
}

impl DocumentType {
    pub fn option(&self) -> ChoiceOption {
        ChoiceOption::new(self.id.to_string(), &self.name)
    }
}

/// Second-level classification, owned by one DocumentType
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSubType {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Title", default)]
    pub name: String,
    /// Parent DocumentType id; rows with no parent match nothing
    #[serde(rename = "DocTypeId", default)]
    pub parent_id: Option<u64>,
}

impl DocumentSubType {
    pub fn option(&self) -> ChoiceOption {
        ChoiceOption::new(self.id.to_string(), &self.name)
    }
}

/// Keep individual users only; groups of any kind are dropped.
pub fn eligible_assignees(principals: Vec<SiteUser>) -> Vec<User> {
    principals
        .into_iter()
        .filter(|p| p.principal_type == PRINCIPAL_TYPE_USER)
        .map(|p| User {
            id: p.id,
            display_name: p.title,
        })
        .collect()
}

/// Options for the children of `parent_key`, compared on the decimal key.
pub fn sub_type_options(rows: &[DocumentSubType], parent_key: &str) -> Vec<ChoiceOption> {
    rows.iter()
        .filter(|row| {
            row.parent_id
                .map(|p| p.to_string() == parent_key)
                .unwrap_or(false)
        })
        .map(DocumentSubType::option)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_groups_never_assignable() {
        let principals = vec![
            SiteUser { id: 1, title: "Ada".into(), principal_type: 1 },
            SiteUser { id: 2, title: "Owners".into(), principal_type: 8 },
            SiteUser { id: 3, title: "Everyone".into(), principal_type: 4 },
            SiteUser { id: 4, title: "Grace".into(), principal_type: 1 },
        ];

        let users = eligible_assignees(principals);
        let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(users[0].option(), ChoiceOption::new("1", "Ada"));
    }

    #[test]
    fn test_sub_type_options_filter_by_parent() {
        let rows: Vec<DocumentSubType> = serde_json::from_value(json!([
            {"Id": 10, "Title": "A", "DocTypeId": 1},
            {"Id": 11, "Title": "B", "DocTypeId": 2},
            {"Id": 12, "Title": "C", "DocTypeId": null},
            {"Id": 13, "Title": "D"}
        ]))
        .unwrap();

        assert_eq!(sub_type_options(&rows, "1"), vec![ChoiceOption::new("10", "A")]);
        assert_eq!(sub_type_options(&rows, "2"), vec![ChoiceOption::new("11", "B")]);
        assert!(sub_type_options(&rows, "3").is_empty());
    }

    #[test]
    fn test_document_type_from_row() {
        let row: DocumentType = serde_json::from_value(json!({"Id": 1, "Title": "Policy"})).unwrap();
        assert_eq!(row.option(), ChoiceOption::new("1", "Policy"));
    }
}
