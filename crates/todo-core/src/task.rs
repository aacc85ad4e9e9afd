//! Task records as stored and served.

use serde::{Deserialize, Serialize};

/// A stored task.
///
/// `id` travels as a JSON string (`"id": "42"`), which is what the web client
/// expects; numbers are accepted on input as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(with = "id_string")]
    pub id: i64,
    /// `YYYYMMDD`
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    /// Repeat rule, empty for one-off tasks.
    #[serde(default)]
    pub repeat: String,
}

/// Field set for inserting or fully replacing a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

impl Task {
    /// Build a task from a store-assigned id and its fields.
    pub fn from_fields(id: i64, fields: NewTask) -> Self {
        Self {
            id,
            date: fields.date,
            title: fields.title,
            comment: fields.comment,
            repeat: fields.repeat,
        }
    }
}

mod id_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid task id: {text:?}"))),
        }
    }
}
