use std::fmt;

use thiserror::Error;

/// Which kind of quiz a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Flashcard,
    Test,
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Flashcard => write!(f, "flashcard"),
            QuizMode::Test => write!(f, "test"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("the vocabulary is empty")]
    EmptyVocabulary,

    #[error("no active {0} session")]
    NoActiveSession(QuizMode),

    #[error("malformed seed: {0}")]
    MalformedSeed(String),

    #[error("expected input in the form 'word - translation'")]
    MalformedAddInput,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{name} can't be parsed: {reason}")]
    Invalid { name: &'static str, reason: String },
}
