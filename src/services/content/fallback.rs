//! Template content used whenever generation does not produce something usable.
//! Everything here is a pure function of its inputs and passes the validator.

use crate::models::content::{
    CodingItem, ContentFormat, Difficulty, GeneratedContent, GenerationRequest, Lecture,
    LectureModule, LectureSection, QuizItem, RecommendedTopic, Resource,
};

pub fn generate(request: &GenerationRequest) -> GeneratedContent {
    let topic = request.topic.trim();
    match request.format {
        ContentFormat::Roadmap => GeneratedContent::Roadmap(roadmap(topic)),
        ContentFormat::Lecture => {
            GeneratedContent::Lecture(lecture(topic, request.difficulty, request.modular))
        }
        ContentFormat::Quiz => {
            GeneratedContent::Quiz(quizzes(topic, request.difficulty, request.count.max(1)))
        }
        ContentFormat::CodingExercise => {
            GeneratedContent::Coding(coding(topic, request.difficulty, request.count.max(1)))
        }
    }
}

pub fn roadmap(topic: &str) -> Vec<String> {
    let name = title_case(topic);
    vec![
        format!("{} Basics", name),
        "Core Concepts".to_string(),
        "Tooling Setup".to_string(),
        "Guided Practice".to_string(),
        "Common Patterns".to_string(),
        "Small Project".to_string(),
        "Advanced Topics".to_string(),
        "Review".to_string(),
    ]
}

fn section(title: String, content: String, key_points: Vec<String>) -> LectureSection {
    LectureSection {
        title,
        content,
        key_points,
        ..Default::default()
    }
}

fn lecture_sections(topic: &str) -> Vec<LectureSection> {
    let name = title_case(topic);

    let mut practical = section(
        format!("Practical Applications of {}", topic),
        format!(
            "Theory pays off once it is used. This section walks through how {t} shows up in everyday work, \
             which patterns practitioners reach for first and what tends to go wrong on a first attempt.\n\n\
             Try the example below, then change one piece at a time and observe how the result moves. \
             Small experiments build intuition for {t} faster than reading alone.",
            t = topic
        ),
        vec![
            "Typical use cases".to_string(),
            "Patterns practitioners rely on".to_string(),
            "Mistakes to watch for early".to_string(),
        ],
    );
    practical.code_example = Some(code_example(topic));

    let mut practices = section(
        format!("Best Practices for {}", topic),
        format!(
            "Experienced practitioners of {t} tend to converge on a small set of habits: keep things simple, \
             verify assumptions with tests and write down the reasoning behind decisions.\n\n\
             None of these habits are specific to one tool. They carry over to any project where {t} is used.",
            t = topic
        ),
        vec![
            "Prefer clarity over cleverness".to_string(),
            "Test edge cases deliberately".to_string(),
            "Document decisions as you make them".to_string(),
        ],
    );
    practices.tips = vec![
        format!("Write down what problem {} is solving before you start", topic),
        "Keep a scratch project for quick experiments".to_string(),
        "Review your own work a day later with fresh eyes".to_string(),
    ];

    let mut advanced = section(
        format!("Advanced Topics in {}", topic),
        format!(
            "With the fundamentals in place you can look at the harder corners of {t}: performance trade-offs, \
             scaling concerns and how it integrates with neighbouring systems.\n\n\
             These topics reward patience. Revisit the earlier sections whenever something here feels unclear.",
            t = topic
        ),
        vec![
            "Performance trade-offs".to_string(),
            "Working at larger scale".to_string(),
            "Integration with other systems".to_string(),
        ],
    );
    advanced.note = Some(format!(
        "Advanced material on {} changes faster than the basics, so check current documentation.",
        topic
    ));

    vec![
        section(
            format!("Introduction to {}", topic),
            format!(
                "{n} is easiest to learn by first understanding what problem it solves. This section sets out \
                 the vocabulary and the main ideas you will meet throughout the lecture.\n\n\
                 Keep these ideas in mind as you read on: every later section builds on them.",
                n = name
            ),
            vec![
                format!("What {} is and where it is used", topic),
                format!("The problems {} solves", topic),
                "Key vocabulary".to_string(),
            ],
        ),
        section(
            format!("Core Principles of {}", topic),
            format!(
                "A handful of principles explain most of how {t} behaves. Once they click, the details \
                 stop looking like isolated facts and start forming a consistent picture.\n\n\
                 For each principle, ask what would break if it did not hold.",
                t = topic
            ),
            vec![
                "Foundational principles".to_string(),
                "How the pieces relate".to_string(),
                "A working mental model".to_string(),
            ],
        ),
        practical,
        practices,
        advanced,
    ]
}

pub fn lecture(topic: &str, difficulty: Difficulty, modular: bool) -> Lecture {
    let name = title_case(topic);

    let (sections, modules) = if modular {
        let mut sections = lecture_sections(topic);
        let advanced = sections.split_off(3);
        let applied = sections.split_off(2);
        let modules = vec![
            LectureModule {
                title: format!("Module 1: Fundamentals of {}", name),
                sections,
                summary: format!("The vocabulary and principles behind {}.", topic),
            },
            LectureModule {
                title: format!("Module 2: {} in Practice", name),
                sections: applied,
                summary: format!("How {} is applied to real problems.", topic),
            },
            LectureModule {
                title: format!("Module 3: Going Further with {}", name),
                sections: advanced,
                summary: format!("Habits and advanced material for working with {}.", topic),
            },
        ];
        (Vec::new(), modules)
    } else {
        (lecture_sections(topic), Vec::new())
    };

    Lecture {
        title: format!("Introduction to {}", topic),
        introduction: format!(
            "Welcome to this {} lecture on {}. It moves from core ideas to practical use and finishes with \
             more advanced material.",
            difficulty, topic
        ),
        description: format!("An overview of {} from first principles to practice.", topic),
        sections,
        modules,
        content: String::new(),
        keywords: vec![
            topic.to_string(),
            "fundamentals".to_string(),
            "best practices".to_string(),
            difficulty.to_string(),
        ],
        estimated_time: if modular { "20-30 minutes" } else { "10-15 minutes" }.to_string(),
        difficulty: difficulty.to_string(),
        summary: format!(
            "You have seen what {} is, the principles behind it, how it is applied and where to go next.",
            topic
        ),
        resources: resources(topic),
    }
}

fn code_example(topic: &str) -> String {
    let func = pascal_case(topic);
    format!(
        "// A minimal starting point for experimenting with {topic}\n\
         function explore{func}(items) {{\n  \
           return items.map((item, index) => ({{\n    \
             index,\n    \
             value: item,\n    \
             note: 'processed with {topic}',\n  \
           }}));\n\
         }}\n\n\
         console.log(explore{func}(['first', 'second', 'third']));",
        topic = topic,
        func = func
    )
}

fn resources(topic: &str) -> Vec<Resource> {
    let name = title_case(topic);
    let slug = slug(topic);
    vec![
        Resource {
            title: format!("{} Documentation", name),
            url: format!("https://docs.{}.org", slug),
            kind: "documentation".to_string(),
            description: format!("Reference material and tutorials for {}.", topic),
        },
        Resource {
            title: format!("{} in Practice", name),
            url: format!("https://www.{}-guide.com", slug),
            kind: "book".to_string(),
            description: format!("A practical guide to {} from beginner to advanced.", topic),
        },
        Resource {
            title: format!("{} Community", name),
            url: format!("https://community.{}.org", slug),
            kind: "forum".to_string(),
            description: format!("Ask questions and discuss {} with other learners.", topic),
        },
    ]
}

fn quiz_templates(topic: &str, difficulty: Difficulty) -> Vec<QuizItem> {
    let item = |question: String, options: [&str; 4], correct: i64, explanation: String| QuizItem {
        question,
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct,
        explanation,
        difficulty: difficulty.to_string(),
    };

    vec![
        item(
            format!("Which of these is the best starting point when learning {}?", topic),
            [
                "Its core principles",
                "An unrelated tool",
                "Advanced edge cases",
                "None of the above",
            ],
            0,
            format!("Core principles make every later part of {} easier to follow.", topic),
        ),
        item(
            format!("What does studying {} usually improve?", topic),
            [
                "Problem solving",
                "Technical depth",
                "Career options",
                "All of the above",
            ],
            3,
            format!("Learning {} pays off in several ways at once.", topic),
        ),
        item(
            format!("Which study approach works best for {}?", topic),
            [
                "Reading only",
                "Practice only",
                "Theory combined with practice",
                "Memorisation",
            ],
            2,
            format!("{} sticks best when theory is immediately put to use.", title_case(topic)),
        ),
        item(
            format!("How does {} relate to neighbouring fields?", topic),
            [
                "It is unrelated",
                "It barely overlaps",
                "It integrates with them closely",
                "It replaces them entirely",
            ],
            2,
            format!("{} is most useful in combination with related skills.", title_case(topic)),
        ),
        item(
            format!("What marks real mastery of {}?", topic),
            [
                "Knowing the syntax",
                "Following tutorials",
                "Using it on small tasks",
                "Adapting it to new problems",
            ],
            3,
            format!("Mastery of {} shows when you can apply it to problems you have not seen.", topic),
        ),
    ]
}

/// Exactly `count` quiz items, cycling through the templates.
pub fn quizzes(topic: &str, difficulty: Difficulty, count: usize) -> Vec<QuizItem> {
    quiz_templates(topic, difficulty)
        .into_iter()
        .cycle()
        .take(count)
        .collect()
}

fn coding_templates(topic: &str, difficulty: Difficulty) -> Vec<CodingItem> {
    let pascal = pascal_case(topic);
    let camel = camel_case(topic);

    vec![
        CodingItem {
            prompt: format!("Write a function that explains one basic principle of {}", topic),
            starter_code: format!(
                "function describe{p}() {{\n  // Return a sentence describing one principle\n}}",
                p = pascal
            ),
            solution: format!(
                "function describe{p}() {{\n  return 'A basic principle of {t}: start from the fundamentals.';\n}}",
                p = pascal,
                t = topic
            ),
            hints: vec![
                format!("Pick the single most fundamental idea in {}", topic),
                "Keep the explanation to one sentence".to_string(),
            ],
            difficulty: difficulty.to_string(),
        },
        CodingItem {
            prompt: format!("Implement a function that applies {} to transform its input", topic),
            starter_code: format!(
                "function apply{p}(input) {{\n  // Transform the input and return the result\n}}",
                p = pascal
            ),
            solution: format!(
                "function apply{p}(input) {{\n  const result = String(input).trim();\n  return `{t}: ${{result}}`;\n}}",
                p = pascal,
                t = topic
            ),
            hints: vec![
                "Decide what the output should look like first".to_string(),
                "Handle empty input".to_string(),
                format!("Use what you know about {} to shape the transformation", topic),
            ],
            difficulty: difficulty.to_string(),
        },
        CodingItem {
            prompt: format!("Create a small reusable utility for working with {}", topic),
            starter_code: format!(
                "function {c}Utility(options) {{\n  // Merge options with defaults and return helpers\n}}",
                c = camel
            ),
            solution: format!(
                "function {c}Utility(options) {{\n  const settings = {{ level: 'basic', ...options }};\n  return {{\n    describe: () => `{t} at ${{settings.level}} level`,\n    settings,\n  }};\n}}",
                c = camel,
                t = topic
            ),
            hints: vec![
                "Start with sensible defaults".to_string(),
                "Return an object with more than one helper".to_string(),
            ],
            difficulty: difficulty.to_string(),
        },
    ]
}

/// Exactly `count` coding exercises, cycling through the templates.
pub fn coding(topic: &str, difficulty: Difficulty, count: usize) -> Vec<CodingItem> {
    coding_templates(topic, difficulty)
        .into_iter()
        .cycle()
        .take(count)
        .collect()
}

/// Last-resort recommendations built around the learner's first interest.
pub fn recommended_topics(interest: Option<&str>) -> Vec<RecommendedTopic> {
    let interest = interest
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("technology");

    vec![
        RecommendedTopic {
            title: format!("Introduction to {}", interest),
            description: format!("Learn the fundamentals of {} from the ground up", interest),
            duration: "2 weeks".to_string(),
        },
        RecommendedTopic {
            title: "Web Development Basics".to_string(),
            description: "HTML, CSS and JavaScript fundamentals".to_string(),
            duration: "3 weeks".to_string(),
        },
    ]
}

pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn identifier_words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn pascal_case(s: &str) -> String {
    let joined: String = identifier_words(s).iter().map(|w| title_case(w)).collect();
    if joined.is_empty() {
        "Topic".to_string()
    } else {
        joined
    }
}

pub fn camel_case(s: &str) -> String {
    let words = identifier_words(s);
    match words.split_first() {
        Some((first, rest)) => {
            let mut out = first.clone();
            out.extend(rest.iter().map(|w| title_case(w)));
            out
        }
        None => "topic".to_string(),
    }
}

pub fn slug(s: &str) -> String {
    let joined = identifier_words(s).join("-");
    if joined.is_empty() {
        "topic".to_string()
    } else {
        joined
    }
}
