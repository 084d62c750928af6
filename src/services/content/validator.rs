//! Minimum-shape checks for parsed content. A violation carries the first
//! reason found, which is only ever logged.

use std::sync::OnceLock;

use regex::Regex;

use super::normalizer;
use crate::models::content::{
    CodingItem, Difficulty, GeneratedContent, GenerationRequest, Lecture, LectureSection,
    QuizItem,
};

pub const QUIZ_OPTION_COUNT: usize = 4;
pub const MIN_SECTION_CHARS: usize = 30;
pub const MIN_BODY_CHARS: usize = 50;

pub type Verdict = Result<(), String>;

pub fn validate(content: &GeneratedContent, request: &GenerationRequest) -> Verdict {
    if content.format() != request.format {
        return Err(format!(
            "expected {} content, got {}",
            request.format,
            content.format()
        ));
    }

    match content {
        GeneratedContent::Roadmap(steps) => validate_roadmap(steps),
        GeneratedContent::Lecture(lecture) => validate_lecture(lecture, request.modular),
        GeneratedContent::Quiz(items) => {
            if items.is_empty() {
                return Err("quiz set is empty".into());
            }
            items.iter().try_for_each(validate_quiz_item)
        }
        GeneratedContent::Coding(items) => {
            if items.is_empty() {
                return Err("coding set is empty".into());
            }
            items.iter().try_for_each(validate_coding_item)
        }
    }
}

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

fn check_section(section: &LectureSection, path: &str) -> Verdict {
    let len = char_len(&section.content);
    if len < MIN_SECTION_CHARS {
        return Err(format!(
            "{} content is {} chars, need at least {}",
            path, len, MIN_SECTION_CHARS
        ));
    }
    Ok(())
}

pub fn validate_lecture(lecture: &Lecture, modular: bool) -> Verdict {
    if lecture.title.trim().is_empty() {
        return Err("lecture title is empty".into());
    }
    if lecture.introduction.trim().is_empty() && lecture.description.trim().is_empty() {
        return Err("lecture has neither introduction nor description".into());
    }

    if modular {
        if lecture.modules.is_empty() {
            return Err("modular lecture has no modules".into());
        }
        for (m, module) in lecture.modules.iter().enumerate() {
            if module.sections.is_empty() {
                return Err(format!("module {} has no sections", m + 1));
            }
            for (s, section) in module.sections.iter().enumerate() {
                check_section(section, &format!("module {} section {}", m + 1, s + 1))?;
            }
        }
        return Ok(());
    }

    if lecture.sections.is_empty() {
        let len = char_len(&lecture.content);
        if len < MIN_BODY_CHARS {
            return Err(format!(
                "lecture has no sections and a {} char body, need at least {}",
                len, MIN_BODY_CHARS
            ));
        }
        return Ok(());
    }

    lecture
        .sections
        .iter()
        .enumerate()
        .try_for_each(|(s, section)| check_section(section, &format!("section {}", s + 1)))
}

/// Pads or trims options to four, keeps the correct option reachable and
/// synthesizes any missing text.
pub fn repair_quiz_item(mut item: QuizItem, topic: &str, difficulty: Difficulty) -> QuizItem {
    for (idx, option) in item.options.iter_mut().enumerate() {
        if option.trim().is_empty() {
            *option = format!("Option {}", idx + 1);
        }
    }

    if item.options.len() > QUIZ_OPTION_COUNT {
        let correct = usize::try_from(item.correct_answer).ok();
        match correct {
            Some(idx) if idx >= QUIZ_OPTION_COUNT && idx < item.options.len() => {
                let kept = item.options.swap_remove(idx);
                item.options.truncate(QUIZ_OPTION_COUNT - 1);
                item.options.push(kept);
                item.correct_answer = (QUIZ_OPTION_COUNT - 1) as i64;
            }
            _ => item.options.truncate(QUIZ_OPTION_COUNT),
        }
    }

    while item.options.len() < QUIZ_OPTION_COUNT {
        item.options.push(format!("Option {}", item.options.len() + 1));
    }

    if item.correct_answer < 0 || item.correct_answer >= item.options.len() as i64 {
        item.correct_answer = 0;
    }

    if item.question.trim().is_empty() {
        item.question = format!("What is an important concept in {}?", topic);
    }
    if item.explanation.trim().is_empty() {
        item.explanation = format!(
            "This question tests your understanding of key concepts in {}.",
            topic
        );
    }
    if item.difficulty.trim().is_empty() {
        item.difficulty = difficulty.to_string();
    }
    item
}

pub fn validate_quiz_item(item: &QuizItem) -> Verdict {
    if item.question.trim().is_empty() {
        return Err("quiz question is empty".into());
    }
    if item.options.len() != QUIZ_OPTION_COUNT {
        return Err(format!(
            "quiz has {} options, need exactly {}",
            item.options.len(),
            QUIZ_OPTION_COUNT
        ));
    }
    if item.options.iter().any(|o| o.trim().is_empty()) {
        return Err("quiz has a blank option".into());
    }
    if item.correct_answer < 0 || item.correct_answer >= item.options.len() as i64 {
        return Err(format!("correctAnswer {} out of range", item.correct_answer));
    }
    if item.explanation.trim().is_empty() {
        return Err("quiz explanation is empty".into());
    }
    Ok(())
}

pub fn repair_coding_item(mut item: CodingItem, topic: &str, difficulty: Difficulty) -> CodingItem {
    if item.prompt.trim().is_empty() {
        item.prompt = format!(
            "Write a function that demonstrates a key concept of {}",
            topic
        );
    }
    if item.starter_code.trim().is_empty() {
        item.starter_code = format!(
            "// Write your {} solution here\nfunction solution() {{\n  // Your code here\n}}",
            topic
        );
    }
    if item.solution.trim().is_empty() {
        item.solution = format!(
            "// Example solution\nfunction solution() {{\n  // Implementation for {}\n  return 'Solution completed';\n}}",
            topic
        );
    }
    item.hints.retain(|h| !h.trim().is_empty());
    if item.hints.is_empty() {
        item.hints = vec![
            format!("Think about the core principles of {}", topic),
            "Break down the problem into smaller steps".to_string(),
            "Consider edge cases in your solution".to_string(),
        ];
    }
    if item.difficulty.trim().is_empty() {
        item.difficulty = difficulty.to_string();
    }
    item
}

pub fn validate_coding_item(item: &CodingItem) -> Verdict {
    let fields = [
        ("prompt", &item.prompt),
        ("starterCode", &item.starter_code),
        ("solution", &item.solution),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(format!("coding exercise {} is empty", name));
    }
    if !item.hints.iter().any(|h| !h.trim().is_empty()) {
        return Err("coding exercise has no hints".into());
    }
    Ok(())
}

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+[.)]|[-*•])\s+").expect("list marker regex"))
}

/// One step per non-blank line, in order. List markers, bold markup and
/// code fences are stripped; a JSON array of strings, fenced or not, is
/// accepted as well.
pub fn parse_roadmap_steps(raw: &str) -> Vec<String> {
    let as_array = normalizer::normalize(raw)
        .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok());
    if let Some(steps) = as_array {
        return steps
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(|line| {
            let line = line.trim().replace("**", "");
            list_marker().replace(line.trim(), "").trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn validate_roadmap(steps: &[String]) -> Verdict {
    if steps.iter().any(|s| !s.trim().is_empty()) {
        Ok(())
    } else {
        Err("roadmap has no steps".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::LectureModule;

    fn section(content: &str) -> LectureSection {
        LectureSection {
            title: "S".into(),
            content: content.into(),
            ..Default::default()
        }
    }

    fn lecture(sections: Vec<LectureSection>) -> Lecture {
        Lecture {
            title: "T".into(),
            introduction: "intro".into(),
            sections,
            ..Default::default()
        }
    }

    #[test]
    fn short_section_is_rejected() {
        let err = validate_lecture(&lecture(vec![section("short")]), false).unwrap_err();
        assert!(err.contains("5 chars"), "{}", err);
    }

    #[test]
    fn section_length_counts_characters_not_bytes() {
        let cyrillic = "я".repeat(MIN_SECTION_CHARS);
        assert!(validate_lecture(&lecture(vec![section(&cyrillic)]), false).is_ok());
        let short = "я".repeat(MIN_SECTION_CHARS - 1);
        assert!(validate_lecture(&lecture(vec![section(&short)]), false).is_err());
    }

    #[test]
    fn flat_lecture_may_use_body_instead_of_sections() {
        let mut l = lecture(vec![]);
        l.content = "x".repeat(MIN_BODY_CHARS);
        assert!(validate_lecture(&l, false).is_ok());
        l.content = "x".repeat(MIN_BODY_CHARS - 1);
        assert!(validate_lecture(&l, false).is_err());
    }

    #[test]
    fn lecture_needs_intro_or_description() {
        let mut l = lecture(vec![section(&"a".repeat(40))]);
        l.introduction.clear();
        assert!(validate_lecture(&l, false).is_err());
        l.description = "overview".into();
        assert!(validate_lecture(&l, false).is_ok());
    }

    #[test]
    fn modular_lecture_rules() {
        let mut l = lecture(vec![]);
        assert_eq!(
            validate_lecture(&l, true).unwrap_err(),
            "modular lecture has no modules"
        );

        l.modules = vec![LectureModule {
            title: "M".into(),
            sections: vec![],
            summary: String::new(),
        }];
        assert!(validate_lecture(&l, true).unwrap_err().contains("no sections"));

        l.modules[0].sections.push(section(&"b".repeat(MIN_SECTION_CHARS)));
        assert!(validate_lecture(&l, true).is_ok());
    }

    #[test]
    fn quiz_item_is_padded_and_clamped() {
        let raw = r#"{"type":"quiz","question":"Q?","options":["A"],"correctAnswer":5}"#;
        let item: QuizItem = serde_json::from_str(raw).unwrap();
        let item = repair_quiz_item(item, "Rust", Difficulty::Basic);

        assert_eq!(item.options, vec!["A", "Option 2", "Option 3", "Option 4"]);
        assert_eq!(item.correct_answer, 0);
        assert_eq!(
            item.explanation,
            "This question tests your understanding of key concepts in Rust."
        );
        assert_eq!(item.difficulty, "basic");
        assert!(validate_quiz_item(&item).is_ok());
    }

    #[test]
    fn extra_options_keep_the_correct_one() {
        let item = QuizItem {
            question: "Q?".into(),
            options: ["a", "b", "c", "d", "e", "f"].map(String::from).to_vec(),
            correct_answer: 5,
            explanation: "because".into(),
            difficulty: String::new(),
        };
        let item = repair_quiz_item(item, "Rust", Difficulty::Basic);
        assert_eq!(item.options.len(), QUIZ_OPTION_COUNT);
        assert_eq!(item.options[item.correct_answer as usize], "f");
    }

    #[test]
    fn unrepaired_quiz_item_fails() {
        let item = QuizItem {
            question: "Q?".into(),
            options: vec!["A".into()],
            correct_answer: 5,
            ..Default::default()
        };
        assert!(validate_quiz_item(&item).is_err());
    }

    #[test]
    fn coding_item_gets_synthesized_fields() {
        let item = repair_coding_item(CodingItem::default(), "Closures", Difficulty::Advanced);
        assert_eq!(
            item.prompt,
            "Write a function that demonstrates a key concept of Closures"
        );
        assert_eq!(item.hints.len(), 3);
        assert!(validate_coding_item(&item).is_ok());

        let blank = CodingItem {
            hints: vec!["  ".into()],
            ..item
        };
        assert!(validate_coding_item(&blank).is_err());
    }

    #[test]
    fn roadmap_lines_drop_blanks_and_keep_order() {
        let steps = parse_roadmap_steps("Step One\n\nStep Two\nStep Three\n");
        assert_eq!(steps, vec!["Step One", "Step Two", "Step Three"]);
        assert!(validate_roadmap(&steps).is_ok());
    }

    #[test]
    fn roadmap_markers_are_stripped() {
        let steps = parse_roadmap_steps("1. **Basics**\n2) Ownership\n- Traits\n  * Async  \n");
        assert_eq!(steps, vec!["Basics", "Ownership", "Traits", "Async"]);
    }

    #[test]
    fn roadmap_accepts_json_array() {
        let steps = parse_roadmap_steps(r#"["Basics", " ", "Ownership"]"#);
        assert_eq!(steps, vec!["Basics", "Ownership"]);
    }

    #[test]
    fn roadmap_fences_are_not_steps() {
        assert_eq!(
            parse_roadmap_steps("```\nBasics\nOwnership\n```"),
            vec!["Basics".to_string(), "Ownership".to_string()]
        );
        assert_eq!(
            parse_roadmap_steps("Here you go:\n```json\n[\"Basics\", \"Traits\"]\n```"),
            vec!["Basics".to_string(), "Traits".to_string()]
        );
    }

    #[test]
    fn empty_roadmap_is_rejected() {
        assert!(validate_roadmap(&parse_roadmap_steps("\n \n")).is_err());
    }

    #[test]
    fn format_mismatch_is_rejected() {
        let request = GenerationRequest::roadmap("Rust");
        let content = GeneratedContent::Quiz(vec![]);
        assert!(validate(&content, &request).is_err());
    }
}
