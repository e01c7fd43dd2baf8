use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VocabularyItem {
    id: i64,
    word: String,
    translation: String,
    #[sqlx(rename = "correct_answers")]
    correct_count: i64,
    #[sqlx(rename = "incorrect_answers")]
    incorrect_count: i64,
}

/// One record of the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedEntry {
    #[serde(rename = "latin", alias = "word")]
    pub word: String,
    pub translation: String,
}

impl VocabularyItem {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn correct_count(&self) -> i64 {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> i64 {
        self.incorrect_count
    }
}

impl SeedEntry {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
        }
    }
}
