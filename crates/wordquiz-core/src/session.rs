//! The quiz state machine.
//!
//! A session moves `Selecting → Answering → Finished`, and back to
//! `Selecting` only through [`QuizSession::restart`]. The phase is derived
//! from the question list and the current index, so it can never disagree
//! with them.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::{GenerationError, QuizError};
use crate::evaluator::is_correct;
use crate::generator::QuestionGenerator;
use crate::model::{AnswerRecord, Difficulty, Direction, Phase, Question};

/// What happened when a quiz was started.
#[derive(Debug)]
pub enum StartOutcome {
    /// Questions are ready; the session is now answering.
    Started { count: usize },
    /// Nothing usable came back. The session is still selecting and the
    /// caller may try again. `cause` is set when the backend call failed.
    NoQuestions { cause: Option<GenerationError> },
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }
}

/// Final tally of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub difficulty: Difficulty,
    pub direction: Direction,
    pub score: usize,
    /// Number of questions actually asked.
    pub total: usize,
    pub answers: Vec<AnswerRecord>,
}

/// State of one interactive quiz run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizSession {
    difficulty: Option<Difficulty>,
    direction: Option<Direction>,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.questions.is_empty() {
            Phase::Selecting
        } else if self.current_index < self.questions.len() {
            Phase::Answering
        } else {
            Phase::Finished
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based number of the question being asked.
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    fn require(&self, operation: &'static str, phase: Phase) -> Result<(), QuizError> {
        let current = self.phase();
        if current == phase {
            Ok(())
        } else {
            Err(QuizError::contract(operation, current))
        }
    }

    /// Generate a batch and begin answering.
    ///
    /// Only valid while selecting. A backend failure or an unparseable reply
    /// is reported as [`StartOutcome::NoQuestions`], not as an error.
    pub async fn start_quiz(
        &mut self,
        generator: &QuestionGenerator,
        difficulty: Difficulty,
        direction: Direction,
    ) -> Result<StartOutcome, QuizError> {
        self.require("start_quiz", Phase::Selecting)?;

        match generator.generate_batch(difficulty, direction).await {
            Ok(questions) => self.begin(difficulty, direction, questions),
            Err(err) => {
                warn!(error = %err, "question generation failed");
                self.begin(difficulty, direction, Vec::new())?;
                Ok(StartOutcome::NoQuestions { cause: Some(err) })
            }
        }
    }

    /// Install an already generated question list.
    ///
    /// This is the pure transition behind [`start_quiz`](Self::start_quiz).
    pub fn begin(
        &mut self,
        difficulty: Difficulty,
        direction: Direction,
        questions: Vec<Question>,
    ) -> Result<StartOutcome, QuizError> {
        self.require("start_quiz", Phase::Selecting)?;

        self.difficulty = Some(difficulty);
        self.direction = Some(direction);
        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.answers.clear();

        if self.questions.is_empty() {
            info!(%difficulty, %direction, "no questions generated");
            Ok(StartOutcome::NoQuestions { cause: None })
        } else {
            info!(%difficulty, %direction, count = self.questions.len(), "quiz started");
            Ok(StartOutcome::Started {
                count: self.questions.len(),
            })
        }
    }

    /// The question currently being asked. Only valid while answering.
    pub fn current_question(&self) -> Result<&Question, QuizError> {
        self.require("current_question", Phase::Answering)?;
        Ok(&self.questions[self.current_index])
    }

    /// What to show the user for the current question.
    pub fn current_prompt(&self) -> Result<&str, QuizError> {
        let question = self.current_question()?;
        let direction = self
            .direction
            .ok_or_else(|| QuizError::contract("current_prompt", self.phase()))?;
        Ok(question.prompt_for(direction))
    }

    /// Score an answer to the current question and move on.
    pub fn submit_answer(&mut self, user_text: &str) -> Result<AnswerRecord, QuizError> {
        self.require("submit_answer", Phase::Answering)?;
        let direction = self
            .direction
            .ok_or_else(|| QuizError::contract("submit_answer", self.phase()))?;

        let question = &self.questions[self.current_index];
        let correct = question.expected_for(direction);
        let record = AnswerRecord {
            prompt_label: question.prompt_for(direction).to_string(),
            correct: correct.to_string(),
            user_answer: user_text.to_string(),
            is_correct: is_correct(user_text, correct),
        };

        if record.is_correct {
            self.score += 1;
        }
        self.answers.push(record.clone());
        self.current_index += 1;

        if self.phase() == Phase::Finished {
            info!(score = self.score, total = self.questions.len(), "quiz finished");
        }
        Ok(record)
    }

    /// Final tally. Only valid once finished.
    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        self.require("summary", Phase::Finished)?;
        match (self.difficulty, self.direction) {
            (Some(difficulty), Some(direction)) => Ok(QuizSummary {
                difficulty,
                direction,
                score: self.score,
                total: self.questions.len(),
                answers: self.answers.clone(),
            }),
            _ => Err(QuizError::contract("summary", self.phase())),
        }
    }

    /// Drop everything and go back to selecting. Valid from any phase.
    pub fn restart(&mut self) {
        *self = Self::default();
    }
}

/// A session shared between tasks; operations are serialized by a mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<QuizSession>>,
}

impl SharedSession {
    pub fn new(session: QuizSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for several operations in a row.
    pub async fn lock(&self) -> MutexGuard<'_, QuizSession> {
        self.inner.lock().await
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> QuizSession {
        self.inner.lock().await.clone()
    }

    /// Holds the lock for the whole generation call, so a concurrent
    /// `submit_answer` waits for the questions to be installed.
    pub async fn start_quiz(
        &self,
        generator: &QuestionGenerator,
        difficulty: Difficulty,
        direction: Direction,
    ) -> Result<StartOutcome, QuizError> {
        let mut session = self.inner.lock().await;
        session.start_quiz(generator, difficulty, direction).await
    }

    pub async fn submit_answer(&self, user_text: &str) -> Result<AnswerRecord, QuizError> {
        self.inner.lock().await.submit_answer(user_text)
    }

    pub async fn restart(&self) {
        self.inner.lock().await.restart();
    }
}
