//! Core data model types for MedBoard.
//!
//! Wire types for questions, answers, feedback and analytics, plus the
//! normalization that turns the backend's loosely-typed option payloads
//! into a structured mapping before anything renders them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend identifier of a question.
pub type QuestionId = i64;

/// Default topic when the user does not pick one.
pub const DEFAULT_SPECIALTY: &str = "General Medicine";

/// Default difficulty when the user does not pick one.
pub const DEFAULT_DIFFICULTY: &str = "Intermediate";

/// Topic presets offered by front ends. Any other non-empty string is accepted too.
pub const SPECIALTY_PRESETS: &[&str] = &[
    "General Medicine",
    "Cardiology",
    "Pulmonology",
    "Gastroenterology",
    "Nephrology",
    "Neurology",
    "Endocrinology",
    "Hematology/Oncology",
    "Infectious Disease",
    "Psychiatry",
    "Pediatrics",
    "Obstetrics & Gynecology",
    "Surgery",
    "Emergency Medicine",
];

/// Difficulty presets offered by front ends.
pub const DIFFICULTY_PRESETS: &[&str] = &["Beginner", "Intermediate", "Advanced"];

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Multiple-choice options keyed by option letter (e.g. `"A"` -> `"Aspirin"`),
/// in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceOptions(Vec<(String, String)>);

impl Serialize for ChoiceOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl ChoiceOptions {
    /// Normalize a raw options payload.
    ///
    /// Accepts a JSON object (key -> text), a JSON array of texts (keyed
    /// `A`, `B`, ...), or a string holding either a JSON-encoded object or
    /// one `A) text` / `A. text` / `A: text` entry per line. Returns `None`
    /// when nothing usable is found, so the question falls back to free text.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        let pairs: Vec<(String, String)> = match value {
            Value::Object(obj) => obj
                .iter()
                .filter_map(|(k, v)| {
                    let text = match v {
                        Value::String(s) => s.trim().to_string(),
                        Value::Null => return None,
                        other => other.to_string(),
                    };
                    Some((k.trim().to_string(), text))
                })
                .filter(|(k, _)| !k.is_empty())
                .collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .zip(option_letters())
                .map(|(text, key)| (key, text.trim().to_string()))
                .collect(),
            Value::String(s) => return Self::parse(s),
            _ => return None,
        };

        Self::from_pairs(pairs)
    }

    /// Parse options delivered as a string.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
                return Self::from_value(&value);
            }
        }

        Self::from_pairs(trimmed.lines().filter_map(parse_option_line).collect())
    }

    /// A repeated key keeps its first position and takes the later text.
    fn from_pairs(pairs: Vec<(String, String)>) -> Option<Self> {
        let mut options: Vec<(String, String)> = Vec::with_capacity(pairs.len());
        for (key, text) in pairs {
            match options.iter_mut().find(|entry| entry.0 == key) {
                Some(existing) => existing.1 = text,
                None => options.push((key, text)),
            }
        }
        if options.is_empty() {
            None
        } else {
            Some(Self(options))
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, text)| text.as_str())
    }

    /// Look up an option key, ignoring case and surrounding whitespace.
    pub fn resolve_key(&self, input: &str) -> Option<&str> {
        let wanted = input.trim();
        self.0
            .iter()
            .map(|(k, _)| k.as_str())
            .find(|k| k.eq_ignore_ascii_case(wanted))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn option_letters() -> impl Iterator<Item = String> {
    ('A'..='Z').map(|c| c.to_string())
}

/// Split `"A) Aspirin"`, `"(B) Heparin"`, `"C. Warfarin"` or `"D: Alteplase"`.
fn parse_option_line(line: &str) -> Option<(String, String)> {
    let line = line.trim().trim_start_matches('(');
    let split = line.find([')', '.', ':'])?;
    let key = line[..split].trim();
    let text = line[split + 1..].trim();

    let valid_key = (1..=2).contains(&key.len()) && key.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid_key || text.is_empty() {
        return None;
    }
    Some((key.to_uppercase(), text.to_string()))
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<Option<ChoiceOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(ChoiceOptions::from_value))
}

/// A question served by `/api/v1/chat/question`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub content: String,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Normalized options; `None` means free-text answer entry.
    #[serde(
        default,
        deserialize_with = "deserialize_options",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<ChoiceOptions>,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        self.options.is_some()
    }
}

/// Query parameters for fetching a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionParams {
    pub specialty: String,
    pub difficulty: String,
}

impl QuestionParams {
    /// Build params, falling back to the defaults for blank values.
    pub fn new(specialty: &str, difficulty: &str) -> Self {
        let pick = |value: &str, default: &str| {
            let value = value.trim();
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            specialty: pick(specialty, DEFAULT_SPECIALTY),
            difficulty: pick(difficulty, DEFAULT_DIFFICULTY),
        }
    }
}

impl Default for QuestionParams {
    fn default() -> Self {
        Self::new(DEFAULT_SPECIALTY, DEFAULT_DIFFICULTY)
    }
}

/// Body of `POST /api/v1/chat/answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub user_answer: String,
}

/// The server's verdict on one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, alias = "feedback")]
    pub personalized_feedback: Option<String>,
}

impl Feedback {
    pub fn verdict(&self) -> &'static str {
        if self.is_correct {
            "Your answer was correct."
        } else {
            "Your answer was incorrect."
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Taxonomy dimension used to group performance records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Discipline,
    BodySystem,
    Specialty,
    QuestionType,
    AgeGroup,
    Acuity,
    Pathophysiology,
}

impl GroupBy {
    pub const ALL: [GroupBy; 7] = [
        GroupBy::Discipline,
        GroupBy::BodySystem,
        GroupBy::Specialty,
        GroupBy::QuestionType,
        GroupBy::AgeGroup,
        GroupBy::Acuity,
        GroupBy::Pathophysiology,
    ];

    /// Value sent as the `group_by` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Discipline => "discipline",
            GroupBy::BodySystem => "body_system",
            GroupBy::Specialty => "specialty",
            GroupBy::QuestionType => "question_type",
            GroupBy::AgeGroup => "age_group",
            GroupBy::Acuity => "acuity",
            GroupBy::Pathophysiology => "pathophysiology",
        }
    }

    /// Human-readable heading.
    pub fn title(&self) -> &'static str {
        match self {
            GroupBy::Discipline => "Discipline",
            GroupBy::BodySystem => "Body System",
            GroupBy::Specialty => "Specialty",
            GroupBy::QuestionType => "Question Type",
            GroupBy::AgeGroup => "Age Group",
            GroupBy::Acuity => "Acuity",
            GroupBy::Pathophysiology => "Pathophysiology",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| format!("unknown grouping: {s}"))
    }
}

/// Performance for one group, as reported by the backend.
///
/// The label may arrive as `label`, `group`, or under the name of the
/// grouping dimension (`discipline`, `body_system`, ...). Records carrying
/// several of these keys take the first one present in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupPerformance")]
pub struct GroupPerformance {
    pub label: String,
    pub correct_count: u32,
    pub total_answered: u32,
    /// Ratio in `[0, 1]`, when the server provides it.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Deserialize)]
struct RawGroupPerformance {
    correct_count: u32,
    total_answered: u32,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawGroupPerformance> for GroupPerformance {
    type Error = String;

    fn try_from(raw: RawGroupPerformance) -> Result<Self, Self::Error> {
        let label = ["label", "group"]
            .into_iter()
            .chain(GroupBy::ALL.iter().map(GroupBy::as_str))
            .find_map(|key| raw.rest.get(key).and_then(serde_json::Value::as_str))
            .ok_or_else(|| "missing field `label`".to_string())?;

        Ok(Self {
            label: label.to_string(),
            correct_count: raw.correct_count,
            total_answered: raw.total_answered,
            accuracy: raw.accuracy,
        })
    }
}

/// Body of `GET /api/v1/analytics/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default, alias = "groups", alias = "performance_by_discipline")]
    pub performance: Vec<GroupPerformance>,
}

/// Query for the analytics summary endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub group_by: GroupBy,
    pub use_test_data: bool,
}
