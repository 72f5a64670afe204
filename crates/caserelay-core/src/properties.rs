use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::submission::TaskSubmission;
use crate::upload::UploadReference;

// Property names in the dashboard database.
pub const TITLE: &str = "File Name";
pub const FILES: &str = "File";
pub const CATEGORY: &str = "File Type";
pub const DATE: &str = "Date";
pub const LINK: &str = "Link";
pub const LINKED_CASE: &str = "Linked Case";
pub const MESSAGE_ID: &str = "Message ID";

/// Select option every relayed submission is filed under.
pub const EMAIL_CATEGORY: &str = "Email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: String,
}

/// A property value, serialized externally tagged so that each variant
/// produces the remote schema's `{"<type>": <payload>}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    Files(Vec<UploadReference>),
    Select(SelectOption),
    Date(DateValue),
    Url(String),
    Relation(Vec<PageRef>),
    RichText(Vec<RichText>),
}

pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Map a validated submission and its completed uploads onto the dashboard schema.
///
/// Optional properties are inserted only when the submission supplies them.
pub fn build_properties(submission: &TaskSubmission, uploads: Vec<UploadReference>) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert(
        TITLE.into(),
        PropertyValue::Title(vec![RichText::text(submission.file_name.as_str())]),
    );
    props.insert(FILES.into(), PropertyValue::Files(uploads));
    props.insert(
        CATEGORY.into(),
        PropertyValue::Select(SelectOption {
            name: EMAIL_CATEGORY.into(),
        }),
    );

    if let Some(date) = submission.date() {
        props.insert(
            DATE.into(),
            PropertyValue::Date(DateValue { start: date.into() }),
        );
    }
    if let Some(link) = submission.link() {
        props.insert(LINK.into(), PropertyValue::Url(link.into()));
    }
    if let Some(case_id) = submission.linked_case() {
        props.insert(
            LINKED_CASE.into(),
            PropertyValue::Relation(vec![PageRef { id: case_id.into() }]),
        );
    }
    if let Some(message_id) = submission.message_id() {
        props.insert(
            MESSAGE_ID.into(),
            PropertyValue::RichText(vec![RichText::text(message_id)]),
        );
    }
    props
}
