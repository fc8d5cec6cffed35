use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The four color seasons, declared in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Summer,
    Autumn,
    Spring,
}

impl Season {
    /// Priority order used when several seasons share the top score.
    pub const ALL: [Season; 4] = [Season::Winter, Season::Summer, Season::Autumn, Season::Spring];

    pub fn undertone(self) -> Undertone {
        match self {
            Season::Winter | Season::Summer => Undertone::Cool,
            Season::Autumn | Season::Spring => Undertone::Warm,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Spring => "spring",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undertone {
    Cool,
    Warm,
    Indeterminate,
}

impl Undertone {
    pub fn as_str(self) -> &'static str {
        match self {
            Undertone::Cool => "cool",
            Undertone::Warm => "warm",
            Undertone::Indeterminate => "indeterminate",
        }
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selected answer per question. Order carries no meaning.
///
/// When deserializing, entries whose answer is not a string (an unanswered
/// `null`, a number) are dropped rather than failing the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuizAnswerSet {
    answers: HashMap<String, String>,
}

impl<'de> Deserialize<'de> for QuizAnswerSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAnswer {
            Text(String),
            Skipped(serde::de::IgnoredAny),
        }

        let raw = HashMap::<String, RawAnswer>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(question, answer)| match answer {
                RawAnswer::Text(answer) => Some((question, answer)),
                RawAnswer::Skipped(_) => None,
            })
            .collect())
    }
}

impl QuizAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, replacing any earlier answer to the same question.
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(question.into(), answer.into());
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.answers.get(question).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Parses a `question=answer` pair as typed on the command line.
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (question, answer) = pair.split_once('=')?;
        let (question, answer) = (question.trim(), answer.trim());
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some((question.to_string(), answer.to_string()))
    }
}

impl<Q: Into<String>, A: Into<String>> FromIterator<(Q, A)> for QuizAnswerSet {
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut set = QuizAnswerSet::new();
        set.extend(iter);
        set
    }
}

impl<Q: Into<String>, A: Into<String>> Extend<(Q, A)> for QuizAnswerSet {
    fn extend<I: IntoIterator<Item = (Q, A)>>(&mut self, iter: I) {
        for (question, answer) in iter {
            self.insert(question, answer);
        }
    }
}

/// Per-season points. Serves both as a rule's contribution and as the
/// running tally of a single classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonScores {
    pub winter: u32,
    pub summer: u32,
    pub autumn: u32,
    pub spring: u32,
}

impl SeasonScores {
    pub const fn new(winter: u32, summer: u32, autumn: u32, spring: u32) -> Self {
        Self {
            winter,
            summer,
            autumn,
            spring,
        }
    }

    pub fn get(&self, season: Season) -> u32 {
        match season {
            Season::Winter => self.winter,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Spring => self.spring,
        }
    }

    pub fn add(&mut self, points: &SeasonScores) {
        self.winter = self.winter.saturating_add(points.winter);
        self.summer = self.summer.saturating_add(points.summer);
        self.autumn = self.autumn.saturating_add(points.autumn);
        self.spring = self.spring.saturating_add(points.spring);
    }

    pub fn credit(&mut self, season: Season, points: u32) {
        let slot = match season {
            Season::Winter => &mut self.winter,
            Season::Summer => &mut self.summer,
            Season::Autumn => &mut self.autumn,
            Season::Spring => &mut self.spring,
        };
        *slot = slot.saturating_add(points);
    }

    pub fn is_zero(&self) -> bool {
        Season::ALL.iter().all(|s| self.get(*s) == 0)
    }

    /// Highest-scoring season, first in `Season::ALL` on ties, `None` when
    /// every score is zero.
    pub fn leader(&self) -> Option<Season> {
        let mut best: Option<(Season, u32)> = None;
        for season in Season::ALL {
            let score = self.get(season);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((season, score)),
            }
        }
        best.filter(|(_, score)| *score > 0).map(|(season, _)| season)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(with = "season_or_indeterminate")]
    pub season: Option<Season>,
    pub undertone: Undertone,
    pub raw_scores: SeasonScores,
}

impl ClassificationResult {
    pub fn from_scores(raw_scores: SeasonScores) -> Self {
        let season = raw_scores.leader();
        Self {
            season,
            undertone: season.map_or(Undertone::Indeterminate, Season::undertone),
            raw_scores,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        self.season.is_none()
    }

    pub fn winning_score(&self) -> u32 {
        self.season.map_or(0, |s| self.raw_scores.get(s))
    }

    /// Season name handed to the AI elaboration step as a hint.
    pub fn season_hint(&self) -> Option<&'static str> {
        self.season.map(Season::as_str)
    }

    pub fn season_label(&self) -> &'static str {
        self.season.map_or("indeterminate", Season::as_str)
    }
}

mod season_or_indeterminate {
    use super::Season;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const INDETERMINATE: &str = "indeterminate";

    pub fn serialize<S: Serializer>(season: &Option<Season>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(season.map_or(INDETERMINATE, Season::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Season>, D::Error> {
        let label = String::deserialize(deserializer)?;
        match label.as_str() {
            INDETERMINATE => Ok(None),
            other => Season::ALL
                .into_iter()
                .find(|s| s.as_str() == other)
                .map(Some)
                .ok_or_else(|| de::Error::unknown_variant(other, &["winter", "summer", "autumn", "spring", INDETERMINATE])),
        }
    }
}

/// One quiz submission as found in a batch input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default, deserialize_with = "answers_or_empty")]
    pub answers: QuizAnswerSet,
}

fn answers_or_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<QuizAnswerSet, D::Error> {
    Ok(Option::<QuizAnswerSet>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub id: String,
    #[serde(flatten)]
    pub result: ClassificationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total: usize,
    pub indeterminate: usize,
    pub season_counts: SeasonScores,
    pub entries: Vec<ReportEntry>,
}
