//! Scoring rules: which (question, answer) pair contributes how many points
//! to each season.
//!
//! The built-in table is the questionnaire shipped with the quiz UI. A TOML
//! file with the same shape can replace it:
//!
//! ```toml
//! [[rules]]
//! question = "vein_color"
//! answer = "blue"
//! points = { winter = 2, summer = 2 }
//! ```

use crate::domain::model::{ClassificationResult, QuizAnswerSet, SeasonScores};
use crate::utils::error::{QuizError, Result};
use crate::utils::validation::validate_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub question: String,
    pub answer: String,
    pub points: SeasonScores,
}

impl ScoringRule {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, points: SeasonScores) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            points,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<ScoringRule>,
}

/// Outcome of looking up a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerMatch {
    Matched {
        question: String,
        answer: String,
        points: SeasonScores,
    },
    UnknownQuestion {
        question: String,
        answer: String,
    },
    UnknownAnswer {
        question: String,
        answer: String,
    },
}

impl AnswerMatch {
    pub fn question(&self) -> &str {
        match self {
            AnswerMatch::Matched { question, .. }
            | AnswerMatch::UnknownQuestion { question, .. }
            | AnswerMatch::UnknownAnswer { question, .. } => question,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, AnswerMatch::Matched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSummary {
    pub question: String,
    pub answers: Vec<String>,
}

// (question, answer, winter, summer, autumn, spring)
const BUILTIN_RULES: &[(&str, &str, u32, u32, u32, u32)] = &[
    ("vein_color", "blue", 2, 2, 0, 0),
    ("vein_color", "purple", 3, 1, 0, 0),
    ("vein_color", "green", 0, 0, 2, 2),
    ("vein_color", "mixed", 1, 1, 1, 1),
    ("jewelry", "silver", 1, 1, 0, 0),
    ("jewelry", "gold", 0, 0, 1, 1),
    ("jewelry", "rose_gold", 0, 1, 0, 1),
    ("sun_reaction", "burns_easily", 1, 2, 0, 1),
    ("sun_reaction", "burns_then_tans", 0, 1, 1, 1),
    ("sun_reaction", "tans_easily", 1, 0, 2, 0),
    ("sun_reaction", "rarely_burns", 2, 0, 2, 0),
    ("hair_color", "black", 3, 0, 1, 0),
    ("hair_color", "dark_brown", 2, 0, 2, 0),
    ("hair_color", "ash_brown", 0, 3, 0, 0),
    ("hair_color", "ash_blonde", 0, 3, 0, 0),
    ("hair_color", "golden_blonde", 0, 0, 0, 3),
    ("hair_color", "strawberry_blonde", 0, 0, 1, 3),
    ("hair_color", "red", 0, 0, 2, 1),
    ("hair_color", "auburn", 0, 0, 3, 0),
    ("eye_color", "dark_brown", 3, 0, 1, 0),
    ("eye_color", "hazel", 0, 0, 2, 1),
    ("eye_color", "green", 0, 0, 1, 2),
    ("eye_color", "blue_grey", 0, 3, 0, 0),
    ("eye_color", "bright_blue", 1, 0, 0, 2),
    ("eye_color", "amber", 0, 0, 2, 1),
    ("white_fabric", "pure_white", 2, 1, 0, 0),
    ("white_fabric", "off_white", 0, 1, 1, 0),
    ("white_fabric", "cream", 0, 0, 1, 2),
    ("contrast", "high", 3, 0, 0, 1),
    ("contrast", "medium", 0, 1, 1, 1),
    ("contrast", "low", 0, 2, 1, 0),
    ("best_colors", "jewel_tones", 3, 0, 0, 0),
    ("best_colors", "pastels", 0, 3, 0, 0),
    ("best_colors", "earth_tones", 0, 0, 3, 0),
    ("best_colors", "warm_brights", 0, 0, 0, 3),
];

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| {
    let mut table = RuleTable::default();
    for &(question, answer, winter, summer, autumn, spring) in BUILTIN_RULES {
        table
            .rules
            .entry(question.to_string())
            .or_default()
            .insert(answer.to_string(), SeasonScores::new(winter, summer, autumn, spring));
    }
    table
});

/// Immutable lookup table, question id -> answer id -> points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: HashMap<String, HashMap<String, SeasonScores>>,
}

impl RuleTable {
    /// The questionnaire the quiz ships with.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    pub fn from_rules<I: IntoIterator<Item = ScoringRule>>(rules: I) -> Result<Self> {
        let mut table = RuleTable::default();
        for rule in rules {
            validate_identifier("rules.question", &rule.question)
                .map_err(|e| rule_error(&rule, e))?;
            validate_identifier("rules.answer", &rule.answer).map_err(|e| rule_error(&rule, e))?;

            if rule.points.is_zero() {
                return Err(QuizError::RuleTableError {
                    message: format!(
                        "rule {}/{} awards no points to any season",
                        rule.question, rule.answer
                    ),
                });
            }

            let answers = table.rules.entry(rule.question.clone()).or_default();
            if answers.contains_key(&rule.answer) {
                return Err(QuizError::RuleTableError {
                    message: format!("duplicate rule {}/{}", rule.question, rule.answer),
                });
            }
            answers.insert(rule.answer, rule.points);
        }
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(content).map_err(|e| QuizError::ConfigValidationError {
            field: "rules".to_string(),
            message: format!("TOML parsing error: {}", e),
        })?;
        Self::from_rules(file.rules)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn points(&self, question: &str, answer: &str) -> Option<&SeasonScores> {
        self.rules.get(question)?.get(answer)
    }

    /// Sums the points of every recognised answer and picks the winner.
    /// Unknown questions and answers add nothing.
    pub fn classify(&self, answers: &QuizAnswerSet) -> ClassificationResult {
        let mut tally = SeasonScores::default();
        for (question, answer) in answers.iter() {
            if let Some(points) = self.points(question, answer) {
                tally.add(points);
            }
        }
        ClassificationResult::from_scores(tally)
    }

    /// Per-answer breakdown of what `classify` did, ordered by question id.
    pub fn explain(&self, answers: &QuizAnswerSet) -> Vec<AnswerMatch> {
        let mut matches: Vec<AnswerMatch> = answers
            .iter()
            .map(|(question, answer)| {
                let (question_s, answer_s) = (question.to_string(), answer.to_string());
                match self.rules.get(question) {
                    None => AnswerMatch::UnknownQuestion {
                        question: question_s,
                        answer: answer_s,
                    },
                    Some(options) => match options.get(answer) {
                        Some(points) => AnswerMatch::Matched {
                            question: question_s,
                            answer: answer_s,
                            points: *points,
                        },
                        None => AnswerMatch::UnknownAnswer {
                            question: question_s,
                            answer: answer_s,
                        },
                    },
                }
            })
            .collect();
        matches.sort_by(|a, b| a.question().cmp(b.question()));
        matches
    }

    pub fn questions(&self) -> Vec<QuestionSummary> {
        let mut questions: Vec<QuestionSummary> = self
            .rules
            .iter()
            .map(|(question, answers)| {
                let mut answers: Vec<String> = answers.keys().cloned().collect();
                answers.sort();
                QuestionSummary {
                    question: question.clone(),
                    answers,
                }
            })
            .collect();
        questions.sort_by(|a, b| a.question.cmp(&b.question));
        questions
    }

    /// Number of rules across all questions.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn rule_error(rule: &ScoringRule, cause: QuizError) -> QuizError {
    QuizError::RuleTableError {
        message: format!("invalid rule {:?}/{:?}: {}", rule.question, rule.answer, cause),
    }
}
