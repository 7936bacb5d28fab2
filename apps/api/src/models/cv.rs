//! CV document schema — the single structured résumé record.
//!
//! There is exactly one logical document per deployment. Stores persist it as
//! plain JSON; this module is the typed contract plus the structural checks
//! the save path enforces (`personalInfo` and `contact` must be present).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub location: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A skill is stored either as a bare label or as a rated `{name, proficiency}`
/// pair. The two forms are equivalent on read: a bare label reads as
/// proficiency 75. Edits normalize to the rated form (see `document::skills`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillEntry {
    Rated { name: String, proficiency: u8 },
    Label(String),
}

impl SkillEntry {
    /// Proficiency assumed for entries stored as a bare label.
    pub const DEFAULT_PROFICIENCY: u8 = 75;

    pub fn name(&self) -> &str {
        match self {
            SkillEntry::Rated { name, .. } => name,
            SkillEntry::Label(name) => name,
        }
    }

    pub fn proficiency(&self) -> u8 {
        match self {
            SkillEntry::Rated { proficiency, .. } => *proficiency,
            SkillEntry::Label(_) => Self::DEFAULT_PROFICIENCY,
        }
    }

    /// Renames the entry. A bare label is promoted to the rated form with the
    /// default proficiency; a rated entry keeps its proficiency.
    pub fn with_name(self, name: &str) -> SkillEntry {
        let proficiency = self.proficiency();
        SkillEntry::Rated {
            name: name.to_string(),
            proficiency,
        }
    }

    /// Re-rates the entry. A bare label is promoted to the rated form with its
    /// original text preserved as the name. Values are clamped to 0–100.
    pub fn with_proficiency(self, proficiency: u8) -> SkillEntry {
        SkillEntry::Rated {
            name: self.name().to_string(),
            proficiency: proficiency.min(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub period: String,
    pub degree: String,
    pub school: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub period: String,
    pub title: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub period: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: String,
}

/// Styling overrides for one named text role (`name`, `title`, `sectionTitle`,
/// `itemTitle`, `location`, `description`). Entirely optional; defaults are
/// applied at render time, outside this service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CVDocument {
    pub personal_info: PersonalInfo,
    pub contact: Contact,
    #[serde(default)]
    pub skills: BTreeMap<String, Vec<SkillEntry>>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub extracurriculars: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styling: BTreeMap<String, TextStyle>,
}

impl Default for CVDocument {
    /// The documented default document, returned whenever storage holds no
    /// document yet. Placeholder values only; the admin editor fills them in.
    fn default() -> Self {
        CVDocument {
            personal_info: PersonalInfo {
                name: "YOUR NAME".to_string(),
                title: "Your professional headline.".to_string(),
            },
            contact: Contact {
                email: "you@example.com".to_string(),
                location: "City, Country".to_string(),
                website: "example.com".to_string(),
                github: "@username".to_string(),
                linkedin: "@username".to_string(),
                phone: None,
            },
            skills: BTreeMap::new(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            extracurriculars: Vec::new(),
            styling: BTreeMap::new(),
        }
    }
}

impl CVDocument {
    /// The default document as the JSON value stores and sessions work with.
    pub fn default_value() -> Value {
        serde_json::to_value(CVDocument::default())
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }

    /// Structural check applied before any write: a document missing
    /// `personalInfo` or `contact` is rejected, everything else is tolerated
    /// so partial merge payloads and older field layouts keep working.
    pub fn validate(doc: &Value) -> Result<(), String> {
        let obj = match doc.as_object() {
            Some(obj) => obj,
            None => return Err("CV document must be a JSON object".to_string()),
        };
        for key in ["personalInfo", "contact"] {
            if !obj.get(key).map(Value::is_object).unwrap_or(false) {
                return Err(format!("Invalid CV data structure: missing '{key}'"));
            }
        }
        Ok(())
    }
}
