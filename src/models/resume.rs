use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Top-level keys every model response has to carry, in schema order.
pub const REQUIRED_KEYS: [&str; 6] = [
    "personal_info",
    "summary",
    "education",
    "skills",
    "experience",
    "projects",
];

/// Canonical structured resume exchanged between every stage.
///
/// Lists are never absent: a missing list reads as empty, and a missing or
/// `null` string inside a record reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "nullable")]
    pub degree: String,
    #[serde(deserialize_with = "nullable")]
    pub institution: String,
    #[serde(deserialize_with = "nullable")]
    pub year: String,
    #[serde(deserialize_with = "nullable")]
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub company: String,
    #[serde(deserialize_with = "nullable")]
    pub duration: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResumeDocument {
    /// Parses a manual-entry form. Missing keys take their defaults, wrong
    /// types are rejected.
    pub fn from_form_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::SchemaViolation(format!("form is not valid JSON: {}", e)))?;
        Self::from_value(value, false)
    }

    /// Validates a parsed model response: every top-level key must be present
    /// and well-typed.
    pub fn from_response_value(value: Value) -> Result<Self> {
        Self::from_value(value, true)
    }

    fn from_value(value: Value, strict: bool) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::SchemaViolation(format!(
                    "expected a JSON object, found {}",
                    json_type_name(&other)
                )));
            }
        };

        if strict {
            let missing: Vec<&str> = REQUIRED_KEYS
                .into_iter()
                .filter(|key| !object.contains_key(*key))
                .collect();
            if !missing.is_empty() {
                return Err(Error::SchemaViolation(format!(
                    "missing required field(s): {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(ResumeDocument {
            personal_info: field(&mut object, "personal_info")?,
            summary: field::<Option<String>>(&mut object, "summary")?.unwrap_or_default(),
            education: field(&mut object, "education")?,
            skills: field(&mut object, "skills")?,
            experience: field(&mut object, "experience")?,
            projects: field(&mut object, "projects")?,
        })
    }

    pub fn to_json_pretty(&self) -> String {
        // plain structs of strings and vectors always serialize
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// True when no section would render anything.
    pub fn is_empty(&self) -> bool {
        self.personal_info.is_empty()
            && self.summary.trim().is_empty()
            && self.education.iter().all(Education::is_blank)
            && self.skills.iter().all(|s| s.trim().is_empty())
            && self.experience.iter().all(Experience::is_blank)
            && self.projects.iter().all(Project::is_blank)
    }
}

/// Takes `key` out of `object`; an absent key reads as the default.
fn field<T>(object: &mut Map<String, Value>, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match object.remove(key) {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| Error::SchemaViolation(format!("field `{}`: {}", key, e))),
        None => Ok(T::default()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.contact_fields().iter().all(|f| f.trim().is_empty())
    }

    /// Email, phone and location, in display order.
    pub fn contact_fields(&self) -> [&str; 3] {
        [
            self.email.as_str(),
            self.phone.as_str(),
            self.location.as_str(),
        ]
    }
}

impl Education {
    pub fn is_blank(&self) -> bool {
        [&self.degree, &self.institution, &self.year, &self.gpa]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        [&self.title, &self.company, &self.duration, &self.description]
            .iter()
            .all(|s| s.trim().is_empty())
            && self.responsibilities.iter().all(|r| r.trim().is_empty())
    }
}

impl Project {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.description.trim().is_empty()
    }
}
