//! The summary-plus-quiz payload returned to clients.
//!
//! The relay forwards the model's JSON as-is, so these types are only used
//! when `validation.strict_quiz` is enabled and by callers that want a typed
//! view of a response.

use serde::{Deserialize, Serialize};

/// Number of questions the prompt asks for.
pub const QUIZ_QUESTIONS: usize = 3;

/// Number of options per question the prompt asks for.
pub const QUIZ_OPTIONS: usize = 4;

/// Summary and quiz generated from one image of study material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Short summary of the notes
    pub summary: String,

    /// Multiple-choice questions, in order
    pub quiz: Vec<QuizQuestion>,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Must equal one of `options`
    pub answer: String,
}

impl AnalysisResult {
    /// Check the shape the prompt requests: 3 questions, 4 options each,
    /// and every answer present among its options.
    pub fn validate(&self) -> Result<(), String> {
        if self.quiz.len() != QUIZ_QUESTIONS {
            return Err(format!(
                "expected {QUIZ_QUESTIONS} questions, got {}",
                self.quiz.len()
            ));
        }
        for (i, q) in self.quiz.iter().enumerate() {
            if q.options.len() != QUIZ_OPTIONS {
                return Err(format!(
                    "question {} has {} options, expected {QUIZ_OPTIONS}",
                    i + 1,
                    q.options.len()
                ));
            }
            if !q.options.contains(&q.answer) {
                return Err(format!(
                    "question {} answer '{}' is not one of its options",
                    i + 1,
                    q.answer
                ));
            }
        }
        Ok(())
    }
}
