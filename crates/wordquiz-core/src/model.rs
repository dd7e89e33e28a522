//! Core data model types for wordquiz.
//!
//! Questions, answer records, and the two knobs a quiz is started with:
//! difficulty tier and quiz direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of questions requested from the backend for one quiz run.
pub const BATCH_SIZE: usize = 5;

/// Vocabulary band used to steer question generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Description of the vocabulary band, as used in the generation prompt.
    pub fn band(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "basic English words taught in junior high school",
            Difficulty::Intermediate => {
                "intermediate English words at upper high school level"
            }
            Difficulty::Advanced => {
                "advanced English words that appear in university entrance exams"
            }
        }
    }

    /// The label shown to Japanese-speaking users.
    pub fn label_ja(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "初級",
            Difficulty::Intermediate => "中級",
            Difficulty::Advanced => "上級",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "basic" | "easy" | "1" | "初級" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" | "2" | "中級" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" | "3" | "上級" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Which side of a pair is shown and which side is expected back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Show the English word, expect its Japanese meaning.
    WordToMeaning,
    /// Show the Japanese meaning, expect the English word.
    MeaningToWord,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::WordToMeaning, Direction::MeaningToWord];

    /// Short arrow label, e.g. `英→日`.
    pub fn label_ja(&self) -> &'static str {
        match self {
            Direction::WordToMeaning => "英→日",
            Direction::MeaningToWord => "日→英",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::WordToMeaning => write!(f, "word-to-meaning"),
            Direction::MeaningToWord => write!(f, "meaning-to-word"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match normalized.as_str() {
            "word-to-meaning" | "word_to_meaning" | "en-ja" | "en_to_ja" | "1"
            | "英語→日本語" | "英→日" => Ok(Direction::WordToMeaning),
            "meaning-to-word" | "meaning_to_word" | "ja-en" | "ja_to_en" | "2"
            | "日本語→英語" | "日→英" => Ok(Direction::MeaningToWord),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A single generated vocabulary pair.
///
/// Both fields are non-empty; the generator drops any pair that would
/// violate this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The English word.
    pub word: String,
    /// Its Japanese meaning.
    pub meaning: String,
}

impl Question {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
        }
    }

    /// The side shown to the user for the given direction.
    pub fn prompt_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::WordToMeaning => &self.word,
            Direction::MeaningToWord => &self.meaning,
        }
    }

    /// The side the user is expected to answer with.
    pub fn expected_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::WordToMeaning => &self.meaning,
            Direction::MeaningToWord => &self.word,
        }
    }
}

/// One submitted answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// What was shown to the user.
    pub prompt_label: String,
    /// The expected answer.
    pub correct: String,
    /// What the user typed, as typed.
    pub user_answer: String,
    pub is_correct: bool,
}

impl AnswerRecord {
    /// Two-valued result label used in tables and exports.
    pub fn result_label(&self) -> &'static str {
        if self.is_correct {
            "⭕ 正解"
        } else {
            "❌ 不正解"
        }
    }
}

/// Stage of a quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Selecting,
    Answering,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Selecting => write!(f, "selecting"),
            Phase::Answering => write!(f, "answering"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Beginner.to_string(), "beginner");
        assert_eq!(
            "Intermediate".parse::<Difficulty>().unwrap(),
            Difficulty::Intermediate
        );
        assert_eq!("上級".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(" 1 ".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn direction_display_and_parse() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>().unwrap(), direction);
        }
        assert_eq!(
            "英語 → 日本語".parse::<Direction>().unwrap(),
            Direction::WordToMeaning
        );
        assert_eq!("ja_to_en".parse::<Direction>().unwrap(), Direction::MeaningToWord);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn question_sides_follow_direction() {
        let q = Question::new("apple", "りんご");
        assert_eq!(q.prompt_for(Direction::WordToMeaning), "apple");
        assert_eq!(q.expected_for(Direction::WordToMeaning), "りんご");
        assert_eq!(q.prompt_for(Direction::MeaningToWord), "りんご");
        assert_eq!(q.expected_for(Direction::MeaningToWord), "apple");
    }

    #[test]
    fn result_label_is_two_valued() {
        let mut record = AnswerRecord {
            prompt_label: "apple".into(),
            correct: "りんご".into(),
            user_answer: "りんご".into(),
            is_correct: true,
        };
        assert_eq!(record.result_label(), "⭕ 正解");
        record.is_correct = false;
        assert_eq!(record.result_label(), "❌ 不正解");
    }

    #[test]
    fn enums_serialize_as_cli_names() {
        let json = serde_json::to_string(&Direction::MeaningToWord).unwrap();
        assert_eq!(json, "\"meaning-to-word\"");
        let json = serde_json::to_string(&Difficulty::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
        assert_eq!(Phase::default(), Phase::Selecting);
    }
}
