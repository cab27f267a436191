use dialogue_flow::{DialogueState, Event, Reply};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Price as the backend sends it: usually a number, sometimes preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(number) => write!(f, "{number}"),
            Price::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub specialization: String,
    pub academic_degree: String,
    pub type_visit: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub full_text: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub days: String,
    pub hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    #[serde(default)]
    pub diagnostic_schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub lab_schedule: Option<Vec<ScheduleEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoRecord {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// `GET /info` body
#[derive(Debug, Deserialize)]
pub struct InfoEnvelope {
    pub info: InfoRecord,
}

/// `GET /categories` body
#[derive(Debug, Deserialize)]
pub struct CategoriesEnvelope {
    pub categories: Vec<String>,
}

/// `POST /faq` body
#[derive(Debug, Deserialize)]
pub struct FaqAnswer {
    pub answer: String,
}

/// Inbound chat event as posted by the platform adapter
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(deserialize_with = "chat_id_from_string_or_number")]
    pub chat_id: String,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub chat_id: String,
    pub state: DialogueState,
    pub replies: Vec<Reply>,
}

fn chat_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawChatId {
        Number(i64),
        Text(String),
    }

    Ok(match RawChatId::deserialize(deserializer)? {
        RawChatId::Number(id) => id.to_string(),
        RawChatId::Text(id) => id,
    })
}
