//! Question generation: prompt template, backend call, and response parsing.
//!
//! Model output is free-form. Any line with a separator becomes a pair;
//! everything else is dropped without error.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::model::{Difficulty, Direction, Question, BATCH_SIZE};
use crate::traits::{GenerateRequest, TextGenerator, DEFAULT_SYSTEM_PROMPT};

/// Separators accepted between the two halves of a pair. The full-width
/// colon shows up often when the model writes Japanese.
const SEPARATORS: [char; 2] = [':', '：'];

/// Build the generation instruction for one quiz batch.
///
/// The output is fully determined by the arguments and always states `count`
/// as a decimal number right after the word "exactly".
pub fn build_prompt(difficulty: Difficulty, direction: Direction, count: usize) -> String {
    let band = difficulty.band();
    match direction {
        Direction::WordToMeaning => format!(
            "Generate exactly {count} {band}, each paired with its Japanese meaning.\n\
             Write one pair per line in the format `English word: Japanese meaning`.\n\
             Put the English word first, then a single colon, then the meaning.\n\
             Output only the {count} lines, nothing else."
        ),
        Direction::MeaningToWord => format!(
            "Generate exactly {count} {band}, each paired with its Japanese meaning.\n\
             Write one pair per line in the format `Japanese meaning: English word`.\n\
             Put the Japanese meaning first, then a single colon, then the English word.\n\
             Output only the {count} lines, nothing else."
        ),
    }
}

/// Parse raw model output into at most `count` questions, in response order.
///
/// For [`Direction::MeaningToWord`] the model was asked for `meaning: word`
/// lines, so the halves are swapped back into `Question { word, meaning }`.
pub fn parse_questions(content: &str, direction: Direction, count: usize) -> Vec<Question> {
    let mut questions = Vec::with_capacity(count.min(BATCH_SIZE * 4));

    for line in content.lines() {
        if questions.len() >= count {
            break;
        }

        let Some((left, right)) = split_pair(line) else {
            if !line.trim().is_empty() {
                debug!(line, "dropping line without separator");
            }
            continue;
        };

        let left = clean_side(strip_list_marker(left));
        let right = clean_side(right);
        if left.is_empty() || right.is_empty() {
            debug!(line, "dropping line with an empty side");
            continue;
        }

        let question = match direction {
            Direction::WordToMeaning => Question::new(left, right),
            Direction::MeaningToWord => Question::new(right, left),
        };
        questions.push(question);
    }

    questions
}

/// Split on the first separator only, so meanings may contain colons.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (idx, sep) = line.char_indices().find(|(_, c)| SEPARATORS.contains(c))?;
    Some((&line[..idx], &line[idx + sep.len_utf8()..]))
}

/// Remove a leading bullet (`-`, `*`, `•`) or ordinal (`1.`, `2)`).
fn strip_list_marker(s: &str) -> &str {
    let s = s.trim_start();

    if let Some(rest) = s.strip_prefix(['-', '*', '•']) {
        if rest.starts_with(char::is_whitespace) {
            return rest.trim_start();
        }
        return s;
    }

    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &s[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }
    s
}

/// Trim whitespace, then unwrap `**x**` or `*x*` when the markers enclose
/// the whole side. One-sided or inner asterisks are kept.
fn clean_side(s: &str) -> String {
    let s = s.trim();
    for marker in ["**", "*"] {
        if let Some(inner) = s
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
        {
            let inner = inner.trim();
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }
    s.to_string()
}

/// Settings for the generation request.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the backend.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            system_prompt_override: None,
        }
    }
}

/// Asks a backend for vocabulary pairs and parses the answer.
pub struct QuestionGenerator {
    provider: Arc<dyn TextGenerator>,
    config: GeneratorConfig,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    /// Name of the backend in use.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one standard batch of [`BATCH_SIZE`] questions.
    pub async fn generate_batch(
        &self,
        difficulty: Difficulty,
        direction: Direction,
    ) -> Result<Vec<Question>, GenerationError> {
        self.generate(difficulty, direction, BATCH_SIZE).await
    }

    /// Call the backend once and parse up to `count` questions.
    ///
    /// Fewer than `count` questions (including none) is a valid result.
    #[instrument(
        skip(self),
        fields(provider = %self.provider.name(), model = %self.config.model)
    )]
    pub async fn generate(
        &self,
        difficulty: Difficulty,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(difficulty, direction, count),
            system_prompt: Some(
                self.config
                    .system_prompt_override
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(GenerationError::Backend)?;

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let questions = parse_questions(&response.content, direction, count);
        debug!(
            parsed = questions.len(),
            requested = count,
            latency_ms = response.latency_ms,
            "parsed generation response"
        );
        Ok(questions)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    fn stated_count(prompt: &str) -> usize {
        let after = prompt.split("exactly ").nth(1).expect("count phrase");
        after
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap()
    }

    #[test]
    fn prompt_states_requested_count() {
        for difficulty in Difficulty::ALL {
            for direction in Direction::ALL {
                for count in [1, 5, 12, 100] {
                    let prompt = build_prompt(difficulty, direction, count);
                    assert_eq!(stated_count(&prompt), count, "prompt: {prompt}");
                }
            }
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_prompt(Difficulty::Advanced, Direction::MeaningToWord, 5);
        let b = build_prompt(Difficulty::Advanced, Direction::MeaningToWord, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_wording_follows_direction() {
        let w2m = build_prompt(Difficulty::Beginner, Direction::WordToMeaning, 5);
        assert!(w2m.contains("`English word: Japanese meaning`"));
        let m2w = build_prompt(Difficulty::Beginner, Direction::MeaningToWord, 5);
        assert!(m2w.contains("`Japanese meaning: English word`"));
    }

    #[test]
    fn prompt_mentions_vocabulary_band() {
        for difficulty in Difficulty::ALL {
            let prompt = build_prompt(difficulty, Direction::WordToMeaning, 5);
            assert!(prompt.contains(difficulty.band()));
        }
    }

    #[test]
    fn parse_well_formed_lines_in_order() {
        let input = " alpha : first \nbeta:second\ngamma:   third";
        let questions = parse_questions(input, Direction::WordToMeaning, 3);
        assert_eq!(
            questions,
            vec![
                Question::new("alpha", "first"),
                Question::new("beta", "second"),
                Question::new("gamma", "third"),
            ]
        );
    }

    #[test]
    fn parse_drops_malformed_lines() {
        let input = "word1: meaning1\ngarbage\nword2:meaning2";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1], Question::new("word2", "meaning2"));
    }

    #[test]
    fn parse_splits_on_first_separator_only() {
        let input = "rock: to move back and forth: a type of music";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        assert_eq!(questions[0].word, "rock");
        assert_eq!(questions[0].meaning, "to move back and forth: a type of music");
    }

    #[test]
    fn parse_truncates_to_count() {
        let input = "a: 1\nb: 2\nc: 3\nd: 4";
        let questions = parse_questions(input, Direction::WordToMeaning, 2);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].word, "b");
    }

    #[test]
    fn parse_returns_short_batch_without_padding() {
        let questions = parse_questions("only: one", Direction::WordToMeaning, 5);
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn parse_empty_when_nothing_matches() {
        let questions = parse_questions("Sure! Here you go.\n\n", Direction::WordToMeaning, 5);
        assert!(questions.is_empty());
    }

    #[test]
    fn parse_drops_pairs_with_empty_side() {
        let input = "Here are your words:\n: nothing\napple: りんご";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        assert_eq!(questions, vec![Question::new("apple", "りんご")]);
    }

    #[test]
    fn parse_swaps_sides_for_meaning_first_lines() {
        let questions = parse_questions("りんご: apple", Direction::MeaningToWord, 5);
        assert_eq!(questions, vec![Question::new("apple", "りんご")]);
    }

    #[test]
    fn parse_accepts_full_width_colon() {
        let questions = parse_questions("abandon：見捨てる", Direction::WordToMeaning, 5);
        assert_eq!(questions, vec![Question::new("abandon", "見捨てる")]);
    }

    #[test]
    fn parse_strips_list_decoration() {
        let input = "1. apple: りんご\n- **book**: 本\n* desk : 机\n2) pen: ペン";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        let words: Vec<&str> = questions.iter().map(|q| q.word.as_str()).collect();
        assert_eq!(words, vec!["apple", "book", "desk", "pen"]);
        assert_eq!(questions[1].meaning, "本");
    }

    #[test]
    fn parse_keeps_inner_and_one_sided_asterisks() {
        let input = "thou: *archaic* you
star*: 星
*italic*: 斜体";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        assert_eq!(questions[0].meaning, "*archaic* you");
        assert_eq!(questions[1].word, "star*");
        assert_eq!(questions[2].word, "italic");
    }

    #[test]
    fn parse_marker_needs_trailing_space_to_count_as_bullet() {
        let input = "- x: y
-ish: 〜っぽい
**: star";
        let questions = parse_questions(input, Direction::WordToMeaning, 5);
        let words: Vec<&str> = questions.iter().map(|q| q.word.as_str()).collect();
        // "- " is a bullet; "-ish" is a word; a bare "**" has nothing to unwrap.
        assert_eq!(words, vec!["x", "-ish", "**"]);
    }

    #[test]
    fn parse_keeps_year_like_prefix_without_space() {
        let questions = parse_questions("3.14: pi", Direction::WordToMeaning, 5);
        assert_eq!(questions[0].word, "3.14");
    }

    #[tokio::test]
    async fn generate_calls_backend_once() {
        let backend = Arc::new(ScriptedBackend::replying("a: 1\nb: 2\nc: 3\nd: 4\ne: 5"));
        let generator = QuestionGenerator::new(backend.clone(), GeneratorConfig::default());

        let questions = generator
            .generate_batch(Difficulty::Intermediate, Direction::WordToMeaning)
            .await
            .unwrap();

        assert_eq!(questions.len(), BATCH_SIZE);
        assert_eq!(backend.call_count(), 1);
        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(
            prompt,
            build_prompt(Difficulty::Intermediate, Direction::WordToMeaning, BATCH_SIZE)
        );
    }

    #[tokio::test]
    async fn generate_fails_on_backend_error() {
        let backend = Arc::new(ScriptedBackend::failing("quota exceeded"));
        let generator = QuestionGenerator::new(backend, GeneratorConfig::default());

        let err = generator
            .generate(Difficulty::Beginner, Direction::WordToMeaning, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Backend(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn generate_fails_on_blank_response() {
        let backend = Arc::new(ScriptedBackend::replying("  \n\t"));
        let generator = QuestionGenerator::new(backend, GeneratorConfig::default());

        let err = generator
            .generate(Difficulty::Beginner, Direction::WordToMeaning, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn generate_returns_empty_for_unparseable_text() {
        let backend = Arc::new(ScriptedBackend::replying("I cannot help with that."));
        let generator = QuestionGenerator::new(backend, GeneratorConfig::default());

        let questions = generator
            .generate(Difficulty::Beginner, Direction::WordToMeaning, 5)
            .await
            .unwrap();
        assert!(questions.is_empty());
    }
}
