use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Bathroom,
    Kitchen,
    Bedroom,
    LivingRoom,
    Hallway,
    Utility,
    Loft,
    Garage,
    Garden,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(alias = "roomType")]
    pub room_type: RoomType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Room {
    #[must_use]
    pub const fn new(room_type: RoomType) -> Self {
        Self {
            room_type,
            name: None,
        }
    }
}

/// Answer to a pre-visit prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptResponse {
    /// `null`: the prompt was shown but not answered.
    Unanswered,
    Flag(bool),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

impl PromptResponse {
    /// Whether the answer counts as "yes".
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unanswered => false,
            Self::Flag(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::Text(text) => !matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "" | "no" | "false" | "n" | "0" | "none"
            ),
            Self::Choices(choices) => !choices.is_empty(),
        }
    }

    /// Case-insensitive match against a text answer or any selected choice.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Self::Text(text) => text.trim().eq_ignore_ascii_case(expected),
            Self::Choices(choices) => choices
                .iter()
                .any(|choice| choice.trim().eq_ignore_ascii_case(expected)),
            Self::Unanswered | Self::Flag(_) | Self::Number(_) => false,
        }
    }
}

/// Facts gathered before a site visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteVisit {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default, alias = "promptResponses")]
    pub prompt_responses: BTreeMap<String, PromptResponse>,
}

impl SiteVisit {
    #[must_use]
    pub fn has_room(&self, room_type: RoomType) -> bool {
        self.rooms.iter().any(|room| room.room_type == room_type)
    }

    #[must_use]
    pub fn prompt(&self, key: &str) -> Option<&PromptResponse> {
        self.prompt_responses.get(key)
    }

    #[must_use]
    pub fn with_room(mut self, room_type: RoomType) -> Self {
        self.rooms.push(Room::new(room_type));
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, key: impl Into<String>, response: PromptResponse) -> Self {
        self.prompt_responses.insert(key.into(), response);
        self
    }

    /// Parse a visit record; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| FlowError::InvalidSiteVisit(format!("{}: {err}", path.display())))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let visit = if is_json {
            serde_json::from_str(&raw)
                .map_err(|err| FlowError::InvalidSiteVisit(format!("{}: {err}", path.display())))?
        } else {
            serde_yaml::from_str(&raw)
                .map_err(|err| FlowError::InvalidSiteVisit(format!("{}: {err}", path.display())))?
        };
        Ok(visit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Standard,
    Prompt,
    Room,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub checked: bool,
    pub required: bool,
    pub source: ItemSource,
}

impl ChecklistItem {
    /// Identity used to match items across regenerations.
    #[must_use]
    pub fn key(&self) -> (&str, &str, ItemSource) {
        (&self.category, &self.description, self.source)
    }
}
