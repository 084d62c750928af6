//! Instruction strings for the completion endpoint. Each embeds the JSON
//! shape the parser expects so the model can copy it.

use serde_json::{json, Value};

use crate::models::chat::{ChatMessage, SENDER_USER};
use crate::models::content::{ContentFormat, Difficulty, GenerationRequest};
use crate::models::user::OnboardingData;

fn pretty(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string())
}

pub fn build(request: &GenerationRequest) -> String {
    let topic = request.topic.trim();
    match request.format {
        ContentFormat::Roadmap => roadmap(topic),
        ContentFormat::Lecture if request.modular => modular_lecture(topic, request.difficulty),
        ContentFormat::Lecture => lecture(topic, request.difficulty),
        ContentFormat::Quiz => quiz(topic, request.difficulty, request.count.max(1)),
        ContentFormat::CodingExercise => coding(topic, request.difficulty, request.count.max(1)),
    }
}

pub fn roadmap(topic: &str) -> String {
    format!(
        r#"You are an AI learning assistant. Create a clear, structured roadmap for learning "{topic}".

Response format, one step per line:
Step name
Step name
Step name

Example for "HTML":
HTML Basics
Semantic Markup
Forms and Input
CSS Integration
Practice

Rules:
- Between 5 and 18 steps, in the order they should be learned
- Each step at most 15 characters
- No introduction or closing sentence
- No numbering and no **asterisks**"#,
        topic = topic
    )
}

fn section_schema(topic: &str) -> Value {
    json!({
        "title": format!("What is {}?", topic),
        "content": "Clear, detailed educational content explaining the concept (several paragraphs).",
        "keyPoints": [
            format!("Key concept 1 about {}", topic),
            format!("Key concept 2 about {}", topic),
            format!("Key concept 3 about {}", topic)
        ],
        "codeExample": "// Relevant code example, if applicable",
        "note": "An important caveat about this concept",
        "tips": ["Practical tip for mastering this concept"]
    })
}

fn lecture_envelope(topic: &str, difficulty: Difficulty) -> Value {
    json!({
        "title": format!("Introduction to {}", topic),
        "introduction": "A compelling introduction paragraph",
        "description": "A brief overview of what this lecture covers",
        "keywords": [topic, "fundamentals", "practice"],
        "estimatedTime": "15-20 minutes",
        "difficulty": difficulty.as_str(),
        "summary": "An overall summary highlighting key takeaways",
        "resources": [
            {
                "title": format!("Official {} Documentation", topic),
                "url": "https://example.com/docs",
                "type": "documentation",
                "description": "What the reader will find there"
            }
        ]
    })
}

pub fn lecture(topic: &str, difficulty: Difficulty) -> String {
    let mut schema = lecture_envelope(topic, difficulty);
    schema["sections"] = json!([
        section_schema(topic),
        {
            "title": format!("Core Principles of {}", topic),
            "content": "Detailed content explaining the important principles.",
            "keyPoints": ["First principle", "Second principle", "Third principle"]
        }
    ]);

    format!(
        r#"You are an expert educator writing a structured lecture on "{topic}" for {difficulty} level students.

Return a JSON object with exactly this structure:
{schema}

Requirements:
1. Include 4 to 6 sections, each with "title" and "content"
2. Every "content" must be at least three full sentences of real teaching material
3. "keyPoints" must be specific and informative
4. Use real, syntactically correct code in "codeExample" where it helps
5. Return ONLY the JSON object, with no markdown fences and no commentary"#,
        topic = topic,
        difficulty = difficulty,
        schema = pretty(&schema)
    )
}

pub fn modular_lecture(topic: &str, difficulty: Difficulty) -> String {
    let mut schema = lecture_envelope(topic, difficulty);
    schema["modules"] = json!([
        {
            "title": format!("Module 1: Fundamentals of {}", topic),
            "sections": [section_schema(topic)],
            "summary": "A concise summary of this module"
        },
        {
            "title": format!("Module 2: Advanced {} Concepts", topic),
            "sections": [
                {
                    "title": "Advanced Technique",
                    "content": "Detailed explanation of the technique",
                    "keyPoints": ["When to apply it", "Common pitfalls"]
                }
            ],
            "summary": "A recap of the advanced concepts"
        }
    ]);

    format!(
        r#"You are an expert educator writing a modular lecture on "{topic}" for {difficulty} level students.

Return a JSON object with exactly this structure:
{schema}

Requirements:
1. Include 2 to 4 modules; each module has a "title" and a non-empty "sections" array
2. Each section has at least "title" and "content"
3. Every "content" must be at least three full sentences of real teaching material
4. Use real, syntactically correct code in "codeExample" where it helps
5. Return ONLY the JSON object, with no markdown fences and no commentary"#,
        topic = topic,
        difficulty = difficulty,
        schema = pretty(&schema)
    )
}

pub fn quiz(topic: &str, difficulty: Difficulty, count: usize) -> String {
    let schema = json!([
        {
            "type": "quiz",
            "question": "What is the main purpose of containerization in Docker?",
            "options": [
                "To create virtual machines",
                "To isolate applications and their dependencies",
                "To replace operating systems",
                "To minimize hardware requirements"
            ],
            "correctAnswer": 1,
            "explanation": "Containers isolate applications and their dependencies, which makes them portable.",
            "difficulty": difficulty.as_str()
        }
    ]);

    format!(
        r#"Generate {count} multiple choice quiz questions about "{topic}" at {difficulty} difficulty.

Return a JSON array with exactly this structure:
{schema}

Rules:
- Exactly 4 distinct, plausible options per question
- "correctAnswer" is a number from 0 to 3, never a string
- Vary the position of the correct answer across questions
- Every question has a short explanation of why the answer is correct
- "type" is always "quiz"
- Return ONLY the JSON array"#,
        count = count,
        topic = topic,
        difficulty = difficulty,
        schema = pretty(&schema)
    )
}

pub fn coding(topic: &str, difficulty: Difficulty, count: usize) -> String {
    let schema = json!([
        {
            "type": "coding",
            "prompt": "Write a command that runs an nginx container on port 8080",
            "starterCode": "# Write your command here",
            "solution": "docker run -d -p 8080:80 nginx",
            "hints": [
                "Detached mode uses the -d flag",
                "Port mapping uses -p hostPort:containerPort"
            ],
            "difficulty": difficulty.as_str()
        }
    ]);

    format!(
        r#"Generate {count} practical coding exercises about "{topic}" at {difficulty} difficulty.

Return a JSON array with exactly this structure:
{schema}

Rules:
- Each exercise has a clear task in "prompt"
- "starterCode" gives the learner a place to begin
- "solution" is complete and correct
- 2 or 3 hints that guide without giving the answer away
- "type" is always "coding"
- Return ONLY the JSON array"#,
        count = count,
        topic = topic,
        difficulty = difficulty,
        schema = pretty(&schema)
    )
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

pub fn recommended_topics(profile: &OnboardingData) -> String {
    let schema = json!([
        {"title": "Topic title", "description": "Brief description", "duration": "2 weeks"}
    ]);

    format!(
        r#"You are an AI learning assistant for a {experience} level learner.
The learner is {age} years old and interested in: {interests}.
Learning goals: {goals}.
Preferred learning style: {style}.

Suggest 3 specific topics that match this profile. Each has a title of up to 5 words,
a description of up to 25 words and a duration in weeks.

Respond strictly with a JSON array shaped like:
{schema}"#,
        experience = profile.experience,
        age = profile.age,
        interests = join_or(&profile.interests, "technology"),
        goals = join_or(&profile.goals, "general learning"),
        style = profile.learning_style,
        schema = pretty(&schema)
    )
}

/// Shorter second attempt used when the full profile prompt fails.
pub fn simple_topics(interest: Option<&str>) -> String {
    let subject = match interest {
        Some(i) if !i.trim().is_empty() => format!("learning topics about {}", i.trim()),
        _ => "popular tech learning topics".to_string(),
    };
    format!(
        r#"Suggest 2 {subject} in JSON format:
[{{"title":"Title","description":"Description","duration":"2 weeks"}}]"#,
        subject = subject
    )
}

pub fn chat(profile: &OnboardingData, history: &[ChatMessage], message: &str) -> String {
    let transcript: String = history
        .iter()
        .map(|m| {
            let who = if m.sender_type == SENDER_USER { "Student" } else { "Mentor" };
            format!("{}: {}\n", who, m.content)
        })
        .collect();

    format!(
        r#"You are a friendly, knowledgeable AI mentor on a learning platform.

Student profile:
- Experience: {experience}
- Interests: {interests}
- Goals: {goals}
- Learning style: {style}

Conversation so far:
{transcript}
Student: {message}

Reply as the mentor. Be encouraging, concrete and concise. Use short code examples when they help."#,
        experience = profile.experience,
        interests = join_or(&profile.interests, "not specified"),
        goals = join_or(&profile.goals, "not specified"),
        style = profile.learning_style,
        transcript = transcript,
        message = message
    )
}

pub fn chat_title(first_message: &str) -> String {
    format!(
        "Write a title of at most 5 words for a conversation that starts with the message below. \
         Reply with the title only, without quotes.\n\nMessage: {}",
        first_message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn lecture_prompt_embeds_schema() {
        let prompt = build(&GenerationRequest::lecture("Traits", Difficulty::Advanced, false));
        assert!(prompt.contains("\"Traits\""));
        assert!(prompt.contains("advanced level"));
        assert!(prompt.contains("\"keyPoints\""));
        assert!(prompt.contains("\"sections\""));
        assert!(!prompt.contains("\"modules\""));
    }

    #[test]
    fn modular_prompt_asks_for_modules() {
        let prompt = build(&GenerationRequest::lecture("Traits", Difficulty::Basic, true));
        assert!(prompt.contains("\"modules\""));
        assert!(prompt.contains("Module 1: Fundamentals of Traits"));
    }

    #[test]
    fn quiz_prompt_carries_count_and_shape() {
        let prompt = build(&GenerationRequest::quiz("SQL", Difficulty::Basic, 4));
        assert!(prompt.starts_with("Generate 4 multiple choice"));
        assert!(prompt.contains("\"correctAnswer\": 1"));
    }

    #[test]
    fn recommendation_prompt_uses_profile() {
        let profile = OnboardingData {
            age: "30".into(),
            experience: "beginner".into(),
            interests: vec!["Python".into(), "Data".into()],
            goals: vec![],
            learning_style: "visual".into(),
            completed: true,
        };
        let prompt = recommended_topics(&profile);
        assert!(prompt.contains("interested in: Python, Data"));
        assert!(prompt.contains("Learning goals: general learning"));
        assert!(simple_topics(Some("Python")).contains("about Python"));
        assert!(simple_topics(None).contains("popular tech"));
    }

    #[test]
    fn chat_prompt_includes_history() {
        let now = Utc::now();
        let msg = |content: &str, sender: &str| ChatMessage {
            id: Uuid::new_v4(),
            session_id: Uuid::nil(),
            content: content.into(),
            sender_id: None,
            sender_type: sender.into(),
            status: "sent".into(),
            is_read: true,
            created_at: now,
        };
        let history = vec![msg("What is Rust?", "user"), msg("A systems language.", "ai")];
        let prompt = chat(&OnboardingData::anonymous(), &history, "Why use it?");
        assert!(prompt.contains("Student: What is Rust?\nMentor: A systems language.\n"));
        assert!(prompt.ends_with("Use short code examples when they help."));
    }
}
