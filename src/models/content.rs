use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Unknown or missing values fall back to intermediate.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("basic") | Some("beginner") => Difficulty::Basic,
            Some("advanced") | Some("expert") => Difficulty::Advanced,
            _ => Difficulty::Intermediate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFormat {
    Roadmap,
    Lecture,
    Quiz,
    CodingExercise,
}

impl ContentFormat {
    pub const ALL: [ContentFormat; 4] = [
        ContentFormat::Roadmap,
        ContentFormat::Lecture,
        ContentFormat::Quiz,
        ContentFormat::CodingExercise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Roadmap => "roadmap",
            ContentFormat::Lecture => "lecture",
            ContentFormat::Quiz => "quiz",
            ContentFormat::CodingExercise => "coding-exercise",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation job. `count` only matters for quiz and coding sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub format: ContentFormat,
    pub modular: bool,
    pub count: usize,
}

impl GenerationRequest {
    pub fn roadmap(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            difficulty: Difficulty::default(),
            format: ContentFormat::Roadmap,
            modular: false,
            count: 0,
        }
    }

    pub fn lecture(topic: impl Into<String>, difficulty: Difficulty, modular: bool) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            format: ContentFormat::Lecture,
            modular,
            count: 0,
        }
    }

    pub fn quiz(topic: impl Into<String>, difficulty: Difficulty, count: usize) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            format: ContentFormat::Quiz,
            modular: false,
            count,
        }
    }

    pub fn coding(topic: impl Into<String>, difficulty: Difficulty, count: usize) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            format: ContentFormat::CodingExercise,
            modular: false,
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LectureSection {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LectureModule {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<LectureSection>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lecture {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub introduction: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<LectureSection>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub modules: Vec<LectureModule>,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub estimated_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
}

impl Lecture {
    /// Fills the metadata fields an upstream response commonly omits.
    /// Section bodies are left untouched so short content still fails validation.
    pub fn with_defaults(mut self, topic: &str, difficulty: Difficulty) -> Self {
        if self.title.trim().is_empty() {
            self.title = format!("Introduction to {}", topic);
        }
        if self.difficulty.trim().is_empty() {
            self.difficulty = difficulty.to_string();
        }
        if self.estimated_time.trim().is_empty() {
            self.estimated_time = "10-15 minutes".to_string();
        }
        if self.introduction.trim().is_empty() {
            self.introduction = format!(
                "This lecture introduces {}: the core ideas, how they are applied, and the habits that help you use them well.",
                topic
            );
        }
        for (idx, module) in self.modules.iter_mut().enumerate() {
            if module.title.trim().is_empty() {
                module.title = format!("Module {}", idx + 1);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizItem {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "lenient_options")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "lenient_index")]
    pub correct_answer: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodingItem {
    #[serde(deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(deserialize_with = "null_as_default")]
    pub starter_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub solution: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hints: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
}

/// Exercise as returned to clients, discriminated by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Exercise {
    Quiz(QuizItem),
    Coding(CodingItem),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    Roadmap(Vec<String>),
    Lecture(Lecture),
    Quiz(Vec<QuizItem>),
    Coding(Vec<CodingItem>),
}

impl GeneratedContent {
    pub fn format(&self) -> ContentFormat {
        match self {
            GeneratedContent::Roadmap(_) => ContentFormat::Roadmap,
            GeneratedContent::Lecture(_) => ContentFormat::Lecture,
            GeneratedContent::Quiz(_) => ContentFormat::Quiz,
            GeneratedContent::Coding(_) => ContentFormat::CodingExercise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Generated,
    Fallback,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Generated => "generated",
            ContentSource::Fallback => "fallback",
        }
    }

    /// Unknown stored values read as generated.
    pub fn from_stored(raw: &str) -> Self {
        if raw == "fallback" {
            ContentSource::Fallback
        } else {
            ContentSource::Generated
        }
    }

    /// Only generated content is stored for reuse; fallback is rebuilt per request.
    pub fn is_reusable(&self) -> bool {
        *self == ContentSource::Generated
    }

    /// Fallback wins when parts of a response were produced differently.
    pub fn combine(self, other: ContentSource) -> ContentSource {
        if self == ContentSource::Fallback || other == ContentSource::Fallback {
            ContentSource::Fallback
        } else {
            ContentSource::Generated
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub content: T,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedTopic {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub duration: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `2`, `"2"` or `2.0`; anything else becomes -1 and is clamped later.
fn lenient_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let index = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(-1),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(-1),
        _ => -1,
    };
    Ok(index)
}

fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_content_is_not_reused() {
        assert!(ContentSource::Generated.is_reusable());
        assert!(!ContentSource::Fallback.is_reusable());
        assert!(!ContentSource::from_stored("fallback").is_reusable());
    }

    #[test]
    fn difficulty_parse_is_forgiving() {
        assert_eq!(Difficulty::parse_lenient(Some("ADVANCED")), Difficulty::Advanced);
        assert_eq!(Difficulty::parse_lenient(Some(" basic ")), Difficulty::Basic);
        assert_eq!(Difficulty::parse_lenient(Some("wizard")), Difficulty::Intermediate);
        assert_eq!(Difficulty::parse_lenient(None), Difficulty::Intermediate);
    }

    #[test]
    fn lecture_tolerates_nulls_and_missing_fields() {
        let raw = r#"{"title":"Rust","sections":[{"title":"A","content":null,"keyPoints":null}],"resources":null}"#;
        let lecture: Lecture = serde_json::from_str(raw).unwrap();
        assert_eq!(lecture.title, "Rust");
        assert_eq!(lecture.sections.len(), 1);
        assert!(lecture.sections[0].content.is_empty());
        assert!(lecture.resources.is_empty());
    }

    #[test]
    fn quiz_item_accepts_string_index() {
        let raw = r#"{"type":"quiz","question":"Q?","options":["A","B"],"correctAnswer":"1"}"#;
        let item: QuizItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.correct_answer, 1);

        let raw = r#"{"question":"Q?","correctAnswer":"second"}"#;
        let item: QuizItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.correct_answer, -1);
        assert!(item.options.is_empty());
    }

    #[test]
    fn exercise_serializes_with_type_tag() {
        let exercise = Exercise::Coding(CodingItem {
            prompt: "p".into(),
            starter_code: "s".into(),
            solution: "x".into(),
            hints: vec!["h".into()],
            difficulty: "basic".into(),
        });
        let value = serde_json::to_value(&exercise).unwrap();
        assert_eq!(value["type"], "coding");
        assert_eq!(value["starterCode"], "s");
    }

    #[test]
    fn defaults_fill_metadata_but_not_content() {
        let lecture = Lecture {
            sections: vec![LectureSection {
                title: "A".into(),
                content: "short".into(),
                ..Default::default()
            }],
            modules: vec![LectureModule::default()],
            ..Default::default()
        }
        .with_defaults("X", Difficulty::Advanced);

        assert_eq!(lecture.title, "Introduction to X");
        assert_eq!(lecture.difficulty, "advanced");
        assert_eq!(lecture.estimated_time, "10-15 minutes");
        assert!(!lecture.introduction.is_empty());
        assert_eq!(lecture.modules[0].title, "Module 1");
        assert_eq!(lecture.sections[0].content, "short");
    }

    #[test]
    fn recommended_topic_duration_may_be_numeric() {
        let raw = r#"[{"title":"Async Rust","description":"Futures","duration":3}]"#;
        let topics: Vec<RecommendedTopic> = serde_json::from_str(raw).unwrap();
        assert_eq!(topics[0].duration, "3");
    }
}
