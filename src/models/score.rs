use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u32 = 100;

/// Outcome of one ATS scoring pass. Never updated after it is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub max_score: u32,
    pub feedback: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keywords: u32,
    pub formatting: u32,
    pub contact_info: u32,
    pub achievements: u32,
    pub length: u32,
    pub action_verbs: u32,
}

impl ScoreBreakdown {
    pub const KEYWORDS_CAP: u32 = 20;
    pub const FORMATTING_CAP: u32 = 20;
    pub const CONTACT_INFO_CAP: u32 = 10;
    pub const ACHIEVEMENTS_CAP: u32 = 20;
    pub const LENGTH_CAP: u32 = 10;
    pub const ACTION_VERBS_CAP: u32 = 20;

    /// `(criterion, sub-score, cap)` in evaluation order.
    pub fn entries(&self) -> [(&'static str, u32, u32); 6] {
        [
            ("keywords", self.keywords, Self::KEYWORDS_CAP),
            ("formatting", self.formatting, Self::FORMATTING_CAP),
            ("contact_info", self.contact_info, Self::CONTACT_INFO_CAP),
            ("achievements", self.achievements, Self::ACHIEVEMENTS_CAP),
            ("length", self.length, Self::LENGTH_CAP),
            ("action_verbs", self.action_verbs, Self::ACTION_VERBS_CAP),
        ]
    }

    pub fn total(&self) -> u32 {
        self.entries().iter().map(|(_, score, _)| score).sum()
    }
}

impl ScoreResult {
    pub fn from_breakdown(breakdown: ScoreBreakdown, feedback: Vec<String>) -> Self {
        Self {
            score: breakdown.total().min(MAX_SCORE),
            max_score: MAX_SCORE,
            feedback,
            breakdown,
        }
    }

    /// Signed change from `earlier` to `self`.
    pub fn improvement_over(&self, earlier: &ScoreResult) -> i64 {
        i64::from(self.score) - i64::from(earlier.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_sum_to_max_score() {
        let full = ScoreBreakdown {
            keywords: ScoreBreakdown::KEYWORDS_CAP,
            formatting: ScoreBreakdown::FORMATTING_CAP,
            contact_info: ScoreBreakdown::CONTACT_INFO_CAP,
            achievements: ScoreBreakdown::ACHIEVEMENTS_CAP,
            length: ScoreBreakdown::LENGTH_CAP,
            action_verbs: ScoreBreakdown::ACTION_VERBS_CAP,
        };
        assert_eq!(full.total(), MAX_SCORE);
    }

    #[test]
    fn serializes_with_criterion_names() {
        let result = ScoreResult::from_breakdown(
            ScoreBreakdown {
                contact_info: 10,
                ..Default::default()
            },
            vec!["x".into()],
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["score"], 10);
        assert_eq!(value["max_score"], 100);
        assert_eq!(value["breakdown"]["contact_info"], 10);
        assert_eq!(value["breakdown"]["action_verbs"], 0);
    }

    #[test]
    fn improvement_is_signed() {
        let low = ScoreResult::from_breakdown(ScoreBreakdown { length: 5, ..Default::default() }, vec![]);
        let high = ScoreResult::from_breakdown(ScoreBreakdown { length: 10, ..Default::default() }, vec![]);

        assert_eq!(high.improvement_over(&low), 5);
        assert_eq!(low.improvement_over(&high), -5);
    }
}
