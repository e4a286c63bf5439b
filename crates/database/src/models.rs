//! Database models.
//!
//! Field names serialize in the camelCase shape the web client consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user profile, keyed by the identity provider's subject id.
///
/// Stored as a JSON document; keys outside this schema are dropped on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key, always equal to `uid`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Identity provider subject id.
    pub uid: String,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bio: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub branch: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub college: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub portfolio_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub career_goals: Option<String>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_profile: Option<bool>,
    #[serde(
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        rename = "photoURL",
        default,
        deserialize_with = "cast_string::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted when a user is first seen after login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// Public projection used by the directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

/// A pending, directed connection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    #[serde(rename = "_id")]
    pub id: i64,
    #[sqlx(rename = "from_uid")]
    pub from: String,
    #[sqlx(rename = "to_uid")]
    pub to: String,
    /// Creation time in Unix milliseconds; the TTL clock starts here.
    #[serde(with = "millis")]
    pub created_at: i64,
}

/// An accepted connection. Stored in the orientation of the original request
/// but matched in either orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "_id")]
    pub id: i64,
    pub from_uid: String,
    pub to_uid: String,
    #[serde(with = "millis")]
    pub created_at: i64,
    #[serde(with = "millis")]
    pub updated_at: i64,
}

#[cfg(test)]
impl Connection {
    /// Whether `uid` is either endpoint.
    pub(crate) fn involves(&self, uid: &str) -> bool {
        self.from_uid == uid || self.to_uid == uid
    }
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: i64,
    #[sqlx(rename = "from_uid")]
    pub from: String,
    #[sqlx(rename = "to_uid")]
    pub to: String,
    pub text: String,
    #[serde(with = "millis")]
    pub created_at: i64,
}

/// Profile string fields accept numbers and booleans and store their text
/// form, so `{"year": 3}` reads back as `"3"`. Lists and objects are refused.
mod cast_string {
    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Array(_) => Err(de::Error::custom("expected a string, found a list")),
            Value::Object(_) => Err(de::Error::custom("expected a string, found an object")),
        }
    }
}

/// Unix-millisecond columns exposed as RFC 3339 strings.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        match DateTime::<Utc>::from_timestamp_millis(*value) {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_i64(*value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.timestamp_millis())
            .map_err(de::Error::custom)
    }
}
