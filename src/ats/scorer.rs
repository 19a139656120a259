//! Heuristic ATS scoring.
//!
//! Every criterion is a small pure function over the lower-cased resume text,
//! so a [`ScoreResult`] depends on nothing but its input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::score::{ScoreBreakdown, ScoreResult};

/// Domain-generic terms an ATS commonly filters on.
pub const KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "sql",
    "aws",
    "docker",
    "kubernetes",
    "agile",
    "team",
    "leadership",
];

/// Section names a parseable resume is expected to contain.
pub const REQUIRED_SECTIONS: &[&str] = &["education", "experience", "skills"];

pub const ACTION_VERBS: &[&str] = &[
    "developed",
    "managed",
    "led",
    "created",
    "implemented",
    "designed",
    "achieved",
    "improved",
    "increased",
    "reduced",
];

pub const KEYWORDS_FEEDBACK: &str = "Add more relevant keywords from the job description";
pub const FORMATTING_FEEDBACK: &str = "Improve resume structure and formatting";
pub const CONTACT_FEEDBACK: &str = "Ensure all contact information is present";
pub const ACHIEVEMENTS_FEEDBACK: &str = "Include more quantifiable achievements";
pub const ACTION_VERBS_FEEDBACK: &str = "Use more strong action verbs";

const KEYWORDS_THRESHOLD: u32 = 15;
const FORMATTING_THRESHOLD: u32 = 15;
const CONTACT_THRESHOLD: u32 = 8;
const ACHIEVEMENTS_THRESHOLD: u32 = 15;
const ACTION_VERBS_THRESHOLD: u32 = 15;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{3}[-.]?[0-9]{3}[-.]?[0-9]{4}\b").expect("valid phone regex"));

static ACHIEVEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]+%|\b[0-9]+\+|\$[0-9]+|\b[0-9]+ (?:years|months)")
        .expect("valid achievement regex")
});

/// Scores `text` against the fixed ATS heuristics.
///
/// `job_description` is accepted for interface stability; the keyword
/// vocabulary is fixed and does not grow with it.
pub fn calculate_score(text: &str, _job_description: &str) -> ScoreResult {
    let lower = text.to_lowercase();

    let breakdown = ScoreBreakdown {
        keywords: keyword_score(&lower),
        formatting: formatting_score(&lower),
        contact_info: contact_score(&lower),
        achievements: achievement_score(&lower),
        length: length_score(&lower),
        action_verbs: action_verb_score(&lower),
    };

    let mut feedback = Vec::new();
    if breakdown.keywords < KEYWORDS_THRESHOLD {
        feedback.push(KEYWORDS_FEEDBACK.to_string());
    }
    if breakdown.formatting < FORMATTING_THRESHOLD {
        feedback.push(FORMATTING_FEEDBACK.to_string());
    }
    if breakdown.contact_info < CONTACT_THRESHOLD {
        feedback.push(CONTACT_FEEDBACK.to_string());
    }
    if breakdown.achievements < ACHIEVEMENTS_THRESHOLD {
        feedback.push(ACHIEVEMENTS_FEEDBACK.to_string());
    }
    if breakdown.action_verbs < ACTION_VERBS_THRESHOLD {
        feedback.push(ACTION_VERBS_FEEDBACK.to_string());
    }

    ScoreResult::from_breakdown(breakdown, feedback)
}

fn present_ratio(text: &str, terms: &[&str], cap: u32) -> u32 {
    let found = terms.iter().filter(|term| text.contains(*term)).count();
    let scaled = (found as f64 / terms.len() as f64 * f64::from(cap)).round() as u32;
    scaled.min(cap)
}

fn keyword_score(text: &str) -> u32 {
    present_ratio(text, KEYWORDS, ScoreBreakdown::KEYWORDS_CAP)
}

fn formatting_score(text: &str) -> u32 {
    present_ratio(text, REQUIRED_SECTIONS, ScoreBreakdown::FORMATTING_CAP)
}

fn contact_score(text: &str) -> u32 {
    let mut score = 0;
    if EMAIL.is_match(text) {
        score += 5;
    }
    if PHONE.is_match(text) {
        score += 5;
    }
    score
}

fn achievement_score(text: &str) -> u32 {
    let count = ACHIEVEMENT.find_iter(text).count() as u32;
    count.saturating_mul(4).min(ScoreBreakdown::ACHIEVEMENTS_CAP)
}

fn length_score(text: &str) -> u32 {
    match text.split_whitespace().count() {
        400..=800 => 10,
        300..=1000 => 7,
        _ => 5,
    }
}

fn action_verb_score(text: &str) -> u32 {
    present_ratio(text, ACTION_VERBS, ScoreBreakdown::ACTION_VERBS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pad(text: &str, words: usize) -> String {
        let mut padded = text.to_string();
        for _ in 0..words {
            padded.push_str(" lorem");
        }
        padded
    }

    const SAMPLE: &str = "Developed REST APIs using Python and AWS, increased throughput by 40%, \
        team of 5 engineers, email: a@b.com, phone: 555-123-4567";

    #[test]
    fn worked_example() {
        let text = pad(SAMPLE, 430);
        let result = calculate_score(&text, "");

        assert_eq!(result.breakdown.action_verbs, 4);
        assert_eq!(result.breakdown.achievements, 4);
        assert_eq!(result.breakdown.contact_info, 10);
        assert_eq!(result.breakdown.length, 10);
        // python, aws, team
        assert_eq!(result.breakdown.keywords, 5);
        assert_eq!(result.breakdown.formatting, 0);
        assert_eq!(result.score, 33);
    }

    #[test]
    fn empty_text_gets_length_floor_and_all_feedback() {
        let result = calculate_score("", "");

        assert_eq!(result.score, 5);
        assert_eq!(result.max_score, 100);
        assert_eq!(
            result.feedback,
            vec![
                KEYWORDS_FEEDBACK,
                FORMATTING_FEEDBACK,
                CONTACT_FEEDBACK,
                ACHIEVEMENTS_FEEDBACK,
                ACTION_VERBS_FEEDBACK,
            ]
        );
    }

    #[test]
    fn ideal_resume_scores_full_marks_without_feedback() {
        let text = format!(
            "{} {} {} jane@corp.io 555.123.4567 10% 20+ $300 4 years 6 months",
            KEYWORDS.join(" "),
            REQUIRED_SECTIONS.join(" "),
            ACTION_VERBS.join(" ")
        );
        let result = calculate_score(&pad(&text, 420), "");

        assert_eq!(result.score, 100);
        assert!(result.feedback.is_empty());
    }

    #[test]
    fn matching_ignores_letter_case() {
        let text = pad(SAMPLE, 430);
        assert_eq!(
            calculate_score(&text.to_uppercase(), ""),
            calculate_score(&text, "")
        );
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = pad(SAMPLE, 100);
        assert_eq!(calculate_score(&text, "rust"), calculate_score(&text, "rust"));
    }

    #[test]
    fn job_description_does_not_change_the_score() {
        let text = pad(SAMPLE, 430);
        assert_eq!(
            calculate_score(&text, "Kotlin Terraform GraphQL"),
            calculate_score(&text, "")
        );
    }

    #[test]
    fn length_bands() {
        for (words, expected) in [
            (299, 5),
            (300, 7),
            (399, 7),
            (400, 10),
            (800, 10),
            (801, 7),
            (1000, 7),
            (1001, 5),
        ] {
            assert_eq!(length_score(&pad("", words)), expected, "{} words", words);
        }
    }

    #[test]
    fn achievements_cap_at_twenty() {
        let text = "1% 2% 3% 4% 5% 6% 7% $8 9+ 10 years";
        assert_eq!(achievement_score(text), 20);
        assert_eq!(achievement_score("grew revenue by 15%"), 4);
        assert_eq!(achievement_score("two years"), 0);
    }

    #[test]
    fn contact_requires_a_real_tld_and_ten_digits() {
        assert_eq!(contact_score("me@host"), 0);
        assert_eq!(contact_score("me@host.c"), 0);
        assert_eq!(contact_score("me@host.com"), 5);
        assert_eq!(contact_score("call 555-1234"), 0);
        assert_eq!(contact_score("call 5551234567"), 5);
    }

    #[test]
    fn sub_scores_stay_within_caps() {
        let noisy = format!("{} ", KEYWORDS.join(" ")).repeat(50) + &ACTION_VERBS.join(" ").repeat(50);
        let result = calculate_score(&noisy, "");

        for (name, score, cap) in result.breakdown.entries() {
            assert!(score <= cap, "{} = {} exceeds {}", name, score, cap);
        }
        assert!(result.score <= result.max_score);
    }
}
