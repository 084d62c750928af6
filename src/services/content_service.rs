use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::content::{
    CodingItem, ContentFormat, ContentSource, Difficulty, Exercise, Generated, GeneratedContent,
    GenerationRequest, Lecture, QuizItem, RecommendedTopic,
};
use crate::models::user::OnboardingData;
use crate::services::completion_service::{CompletionClient, GenerationError};
use crate::services::content::{fallback, normalizer, prompts, validator};

/// Prompt, complete, normalize, validate; any failure past the API key
/// check is answered with template content instead.
#[derive(Clone)]
pub struct ContentService {
    completion: CompletionClient,
}

impl ContentService {
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Generated<GeneratedContent>> {
        match self.try_generate(request).await {
            Ok(content) => {
                tracing::info!(
                    topic = %request.topic,
                    format = %request.format,
                    "generated content accepted"
                );
                Ok(Generated {
                    content,
                    source: ContentSource::Generated,
                })
            }
            Err(GenerationError::MissingApiKey) => Err(Error::Generation(GenerationError::MissingApiKey)),
            Err(err) => {
                tracing::warn!(
                    topic = %request.topic,
                    format = %request.format,
                    reason = %err,
                    "falling back to template content"
                );
                Ok(Generated {
                    content: fallback::generate(request),
                    source: ContentSource::Fallback,
                })
            }
        }
    }

    async fn try_generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedContent, GenerationError> {
        let prompt = prompts::build(request);
        let raw = self.completion.complete(&prompt).await?;
        tracing::debug!(received_at = %raw.received_at, chars = raw.text.len(), "completion received");
        parse_content(&raw.text, request)
    }

    pub async fn roadmap(&self, topic: &str) -> Result<Generated<Vec<String>>> {
        let request = GenerationRequest::roadmap(topic);
        let generated = self.generate(&request).await?;
        match generated.content {
            GeneratedContent::Roadmap(steps) => Ok(Generated {
                content: steps,
                source: generated.source,
            }),
            _ => Ok(Generated {
                content: fallback::roadmap(topic),
                source: ContentSource::Fallback,
            }),
        }
    }

    pub async fn lecture(
        &self,
        topic: &str,
        difficulty: Difficulty,
        modular: bool,
    ) -> Result<Generated<Lecture>> {
        let request = GenerationRequest::lecture(topic, difficulty, modular);
        let generated = self.generate(&request).await?;
        match generated.content {
            GeneratedContent::Lecture(lecture) => Ok(Generated {
                content: lecture,
                source: generated.source,
            }),
            _ => Ok(Generated {
                content: fallback::lecture(topic, difficulty, modular),
                source: ContentSource::Fallback,
            }),
        }
    }

    /// Quiz and coding sets are generated concurrently; short sets are topped
    /// up from the templates so the counts always match.
    pub async fn exercises(
        &self,
        topic: &str,
        difficulty: Difficulty,
        quiz_count: usize,
        coding_count: usize,
    ) -> Result<Generated<Vec<Exercise>>> {
        let quiz_request = GenerationRequest::quiz(topic, difficulty, quiz_count);
        let coding_request = GenerationRequest::coding(topic, difficulty, coding_count);

        let (quiz, coding) = tokio::join!(
            self.generate(&quiz_request),
            self.generate(&coding_request)
        );
        let (quiz, coding) = (quiz?, coding?);

        let mut source = quiz.source.combine(coding.source);

        let mut quizzes = match quiz.content {
            GeneratedContent::Quiz(items) => items,
            _ => Vec::new(),
        };
        if quizzes.len() < quiz_count {
            let missing = quiz_count - quizzes.len();
            tracing::info!(topic, missing, "topping up quiz set from templates");
            quizzes.extend(fallback::quizzes(topic, difficulty, missing));
            source = ContentSource::Fallback;
        }
        quizzes.truncate(quiz_count);

        let mut coding_items = match coding.content {
            GeneratedContent::Coding(items) => items,
            _ => Vec::new(),
        };
        if coding_items.len() < coding_count {
            let missing = coding_count - coding_items.len();
            tracing::info!(topic, missing, "topping up coding set from templates");
            coding_items.extend(fallback::coding(topic, difficulty, missing));
            source = ContentSource::Fallback;
        }
        coding_items.truncate(coding_count);

        let exercises = quizzes
            .into_iter()
            .map(Exercise::Quiz)
            .chain(coding_items.into_iter().map(Exercise::Coding))
            .collect();

        Ok(Generated {
            content: exercises,
            source,
        })
    }

    /// Full profile prompt, then a short prompt built from the first interest,
    /// then fixed defaults.
    pub async fn recommended_topics(
        &self,
        profile: &OnboardingData,
    ) -> Result<Generated<Vec<RecommendedTopic>>> {
        let first_interest = profile.interests.first().map(String::as_str);
        let attempts = [
            prompts::recommended_topics(profile),
            prompts::simple_topics(first_interest),
        ];

        for (idx, prompt) in attempts.iter().enumerate() {
            let outcome = match self.completion.complete(prompt).await {
                Ok(raw) => parse_topics(&raw.text),
                Err(GenerationError::MissingApiKey) => {
                    return Err(Error::Generation(GenerationError::MissingApiKey))
                }
                Err(err) => Err(err),
            };
            match outcome {
                Ok(topics) => {
                    return Ok(Generated {
                        content: topics,
                        source: ContentSource::Generated,
                    })
                }
                Err(err) => {
                    tracing::warn!(attempt = idx + 1, reason = %err, "topic recommendation failed")
                }
            }
        }

        tracing::warn!("using default topic recommendations");
        Ok(Generated {
            content: fallback::recommended_topics(first_interest),
            source: ContentSource::Fallback,
        })
    }
}

/// Turns completion text into validated content for `request`.
pub fn parse_content(
    text: &str,
    request: &GenerationRequest,
) -> std::result::Result<GeneratedContent, GenerationError> {
    let topic = request.topic.trim();
    let content = match request.format {
        ContentFormat::Roadmap => GeneratedContent::Roadmap(validator::parse_roadmap_steps(text)),
        ContentFormat::Lecture => {
            let json = normalizer::normalize(text)
                .ok_or_else(|| GenerationError::Parse("no JSON found in lecture response".into()))?;
            let lecture: Lecture = serde_json::from_str(&json)
                .map_err(|e| GenerationError::Parse(e.to_string()))?;
            GeneratedContent::Lecture(lecture.with_defaults(topic, request.difficulty))
        }
        ContentFormat::Quiz => {
            let items: Vec<QuizItem> = decode_list(text, request.count)?;
            GeneratedContent::Quiz(
                items
                    .into_iter()
                    .map(|item| validator::repair_quiz_item(item, topic, request.difficulty))
                    .collect(),
            )
        }
        ContentFormat::CodingExercise => {
            let items: Vec<CodingItem> = decode_list(text, request.count)?;
            GeneratedContent::Coding(
                items
                    .into_iter()
                    .map(|item| validator::repair_coding_item(item, topic, request.difficulty))
                    .collect(),
            )
        }
    };

    validator::validate(&content, request).map_err(GenerationError::Validation)?;
    Ok(content)
}

/// Accepts a bare array, an object wrapping one array field, or a single item.
fn decode_list<T: DeserializeOwned>(
    text: &str,
    limit: usize,
) -> std::result::Result<Vec<T>, GenerationError> {
    let json = normalizer::normalize(text)
        .ok_or_else(|| GenerationError::Parse("no JSON found in exercise response".into()))?;
    let value: Value =
        serde_json::from_str(&json).map_err(|e| GenerationError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) if is_single_item(&map) => vec![Value::Object(map)],
        Value::Object(map) => {
            let wrapped = map.values().find(|v| is_item_list(v)).cloned();
            match wrapped {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(map)],
            }
        }
        other => {
            return Err(GenerationError::Parse(format!(
                "expected an array of items, got {}",
                other
            )))
        }
    };

    let take = if limit == 0 { items.len() } else { limit };
    let decoded: Vec<T> = items
        .into_iter()
        .filter(Value::is_object)
        .take(take)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    Ok(decoded)
}

/// Fields that only appear on an exercise itself, never on a wrapper around a list.
const ITEM_FIELDS: [&str; 2] = ["question", "prompt"];

fn is_single_item(map: &serde_json::Map<String, Value>) -> bool {
    ITEM_FIELDS.iter().any(|field| map.get(*field).is_some_and(Value::is_string))
}

fn is_item_list(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_object),
        _ => false,
    }
}

fn parse_topics(text: &str) -> std::result::Result<Vec<RecommendedTopic>, GenerationError> {
    let topics: Vec<RecommendedTopic> = decode_list(text, 0)?;
    let topics: Vec<RecommendedTopic> = topics
        .into_iter()
        .filter(|t| !t.title.trim().is_empty())
        .collect();
    if topics.is_empty() {
        return Err(GenerationError::Validation("no recommended topics".into()));
    }
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletionConfig;
    use crate::services::completion_service::RetryPolicy;
    use std::time::Duration;

    fn offline_service(api_key: Option<&str>) -> ContentService {
        let completion = CompletionClient::new(
            CompletionConfig {
                api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
                model: "test-model".to_string(),
                api_key: api_key.map(String::from),
            },
            reqwest::Client::new(),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 1,
            backoff_step: Duration::ZERO,
        });
        ContentService::new(completion)
    }

    #[test]
    fn fenced_short_lecture_fails_validation() {
        let raw = "Here is the JSON: ```json\n{\"title\":\"X\",\"sections\":[{\"title\":\"A\",\"content\":\"short\"}]}\n```";
        let request = GenerationRequest::lecture("X", Difficulty::Intermediate, false);
        match parse_content(raw, &request) {
            Err(GenerationError::Validation(reason)) => assert!(reason.contains("5 chars")),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn good_lecture_is_accepted_with_defaults() {
        let body = "Ownership decides which part of a program frees each value.";
        let raw = format!(
            r#"{{"introduction":"Hi","sections":[{{"title":"A","content":"{}"}}]}}"#,
            body
        );
        let request = GenerationRequest::lecture("Ownership", Difficulty::Basic, false);
        match parse_content(&raw, &request).unwrap() {
            GeneratedContent::Lecture(lecture) => {
                assert_eq!(lecture.title, "Introduction to Ownership");
                assert_eq!(lecture.difficulty, "basic");
                assert_eq!(lecture.sections[0].content, body);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn quiz_items_are_repaired_before_validation() {
        let raw = r#"```json
[{"type":"quiz","question":"Q?","options":["A"],"correctAnswer":5}]
```"#;
        let request = GenerationRequest::quiz("Rust", Difficulty::Basic, 3);
        match parse_content(raw, &request).unwrap() {
            GeneratedContent::Quiz(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].options.len(), 4);
                assert_eq!(items[0].correct_answer, 0);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn bare_quiz_object_is_one_item() {
        let raw = r#"{"type":"quiz","question":"Q?","options":["A"],"correctAnswer":5}"#;
        let request = GenerationRequest::quiz("Rust", Difficulty::Basic, 1);
        match parse_content(raw, &request).unwrap() {
            GeneratedContent::Quiz(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].question, "Q?");
                assert_eq!(items[0].options.len(), 4);
                assert_eq!(items[0].correct_answer, 0);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn bare_coding_object_is_one_item() {
        let raw = r#"{"type":"code","prompt":"Reverse a string","starterCode":"fn rev() {}","solution":"s.chars().rev()","hints":["iterate"]}"#;
        let request = GenerationRequest::coding("Rust", Difficulty::Basic, 1);
        match parse_content(raw, &request).unwrap() {
            GeneratedContent::Coding(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].prompt, "Reverse a string");
                assert_eq!(items[0].hints, vec!["iterate".to_string()]);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn titled_wrapper_is_still_unwrapped() {
        assert_eq!(
            parse_topics(r#"{"title":"Picks","topics":[{"title":"Async"},{"title":"Traits"}]}"#)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn wrapped_exercise_list_is_unwrapped() {
        let raw = r#"{"exercises":[{"prompt":"p","starterCode":"s","solution":"x","hints":["h"]},{"prompt":"q"}]}"#;
        let request = GenerationRequest::coding("Go", Difficulty::Advanced, 5);
        match parse_content(raw, &request).unwrap() {
            GeneratedContent::Coding(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].hints.len(), 3);
                assert_eq!(items[0].difficulty, "advanced");
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn quiz_set_is_capped_at_requested_count() {
        let raw = r#"[{"question":"1"},{"question":"2"},{"question":"3"}]"#;
        let request = GenerationRequest::quiz("Rust", Difficulty::Basic, 2);
        match parse_content(raw, &request).unwrap() {
            GeneratedContent::Quiz(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn prose_only_roadmap_still_parses() {
        let request = GenerationRequest::roadmap("Rust");
        assert_eq!(
            parse_content("Step One\n\nStep Two\nStep Three\n", &request).unwrap(),
            GeneratedContent::Roadmap(vec![
                "Step One".into(),
                "Step Two".into(),
                "Step Three".into()
            ])
        );
        assert!(matches!(
            parse_content("  \n", &request),
            Err(GenerationError::Validation(_))
        ));
    }

    #[test]
    fn topics_need_titles() {
        assert!(parse_topics(r#"[{"title":"","description":"d"}]"#).is_err());
        assert_eq!(
            parse_topics(r#"[{"title":"Async","description":"d","duration":"2 weeks"}]"#)
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn missing_api_key_is_not_masked() {
        let service = offline_service(None);
        let err = service
            .lecture("X", Difficulty::Basic, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(GenerationError::MissingApiKey)));
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_fallback() {
        let service = offline_service(Some("key"));
        let lecture = service.lecture("X", Difficulty::Basic, false).await.unwrap();
        assert_eq!(lecture.source, ContentSource::Fallback);
        assert_eq!(lecture.content.title, "Introduction to X");

        let exercises = service.exercises("X", Difficulty::Basic, 3, 2).await.unwrap();
        assert_eq!(exercises.source, ContentSource::Fallback);
        let quizzes = exercises
            .content
            .iter()
            .filter(|e| matches!(e, Exercise::Quiz(_)))
            .count();
        assert_eq!((quizzes, exercises.content.len()), (3, 5));

        let topics = service
            .recommended_topics(&OnboardingData::default())
            .await
            .unwrap();
        assert_eq!(topics.source, ContentSource::Fallback);
        assert_eq!(topics.content[0].title, "Introduction to technology");
    }
}
