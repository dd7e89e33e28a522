//! wordquiz-core: Quiz state machine, question generation, and scoring.
//!
//! This crate defines the data model, the backend and presenter traits, and
//! the session state machine that the rest of wordquiz builds on.

pub mod error;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod session;
pub mod traits;

pub use error::{GenerationError, QuizError};
pub use evaluator::is_correct;
pub use generator::{build_prompt, parse_questions, GeneratorConfig, QuestionGenerator};
pub use model::{AnswerRecord, Difficulty, Direction, Phase, Question, BATCH_SIZE};
pub use session::{QuizSession, QuizSummary, SharedSession, StartOutcome};
pub use traits::{GenerateRequest, GenerateResponse, ModelInfo, Presenter, TextGenerator};
