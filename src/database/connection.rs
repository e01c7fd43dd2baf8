#![allow(async_fn_in_trait)]

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::instrument;

use crate::error::QuizError;

use super::vocabulary::{SeedEntry, VocabularyItem};

type StoreResult<T> = Result<T, QuizError>;

const ITEM_COLUMNS: &str = "id, word, translation, correct_answers, incorrect_answers";

#[derive(Debug, Clone)]
pub struct Connection {
    pool: SqlitePool,
}

/// Outcome of a seed reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadSummary {
    pub inserted: u64,
    pub skipped: u64,
}

impl Connection {
    pub async fn connect(connection_string: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self { pool })
    }

    /// A private in-memory database. A single never-recycled connection keeps it alive.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub async fn prepare_schema(&self) -> StoreResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

pub trait ReloadVocabulary {
    async fn reload(&self, seed: &[SeedEntry]) -> StoreResult<ReloadSummary>;
}

pub trait PickWords {
    async fn pick_random(&self) -> StoreResult<Option<VocabularyItem>>;

    async fn pick_distractors(&self, exclude_id: i64, count: u32)
        -> StoreResult<Vec<VocabularyItem>>;
}

pub trait RecordAnswer {
    /// Returns `false` when no item has the given id.
    async fn record_answer(&self, item_id: i64, was_correct: bool) -> StoreResult<bool>;
}

pub trait AddWord {
    /// Returns `false` when the word already exists.
    async fn add_word(&self, word: &str, translation: &str) -> StoreResult<bool>;
}

pub trait RetrieveWord {
    async fn find_word(&self, word: &str) -> StoreResult<Option<VocabularyItem>>;

    async fn count_words(&self) -> StoreResult<i64>;
}

impl ReloadVocabulary for Connection {
    #[instrument(level = "debug", skip(self, seed), fields(entries = seed.len()))]
    async fn reload(&self, seed: &[SeedEntry]) -> StoreResult<ReloadSummary> {
        tracing::debug!("Creating transaction");
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM words")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!("Removed {} old words", removed);

        let mut summary = ReloadSummary::default();
        for entry in seed {
            let affected = sqlx::query("INSERT OR IGNORE INTO words (word, translation) VALUES (?, ?)")
                .bind(entry.word.as_str())
                .bind(entry.translation.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if affected > 0 {
                summary.inserted += 1;
            } else {
                tracing::debug!("Skipping duplicate seed word '{}'", entry.word);
                summary.skipped += 1;
            }
        }

        tracing::debug!("Closing transaction");
        tx.commit().await?;

        Ok(summary)
    }
}

impl PickWords for Connection {
    async fn pick_random(&self) -> StoreResult<Option<VocabularyItem>> {
        let item = sqlx::query_as::<_, VocabularyItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM words ORDER BY RANDOM() LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn pick_distractors(
        &self,
        exclude_id: i64,
        count: u32,
    ) -> StoreResult<Vec<VocabularyItem>> {
        let items = sqlx::query_as::<_, VocabularyItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM words WHERE id != ? ORDER BY RANDOM() LIMIT ?"
        ))
        .bind(exclude_id)
        .bind(i64::from(count))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

impl RecordAnswer for Connection {
    async fn record_answer(&self, item_id: i64, was_correct: bool) -> StoreResult<bool> {
        let query = if was_correct {
            "UPDATE words SET correct_answers = correct_answers + 1 WHERE id = ?"
        } else {
            "UPDATE words SET incorrect_answers = incorrect_answers + 1 WHERE id = ?"
        };

        let affected = sqlx::query(query)
            .bind(item_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

impl AddWord for Connection {
    async fn add_word(&self, word: &str, translation: &str) -> StoreResult<bool> {
        let affected = sqlx::query("INSERT OR IGNORE INTO words (word, translation) VALUES (?, ?)")
            .bind(word)
            .bind(translation)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

impl RetrieveWord for Connection {
    async fn find_word(&self, word: &str) -> StoreResult<Option<VocabularyItem>> {
        let item = sqlx::query_as::<_, VocabularyItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM words WHERE word = ?"
        ))
        .bind(word)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn count_words(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use super::*;

    pub(crate) async fn seeded(pairs: &[(&str, &str)]) -> Connection {
        let connection = Connection::in_memory().await.unwrap();
        connection.prepare_schema().await.unwrap();
        let seed: Vec<SeedEntry> = pairs
            .iter()
            .map(|(word, translation)| SeedEntry::new(*word, *translation))
            .collect();
        connection.reload(&seed).await.unwrap();
        connection
    }

    #[tokio::test]
    async fn reload_replaces_rows_and_skips_duplicates() {
        let connection = seeded(&[("aqua", "water"), ("ignis", "fire")]).await;
        connection.add_word("terra", "earth").await.unwrap();

        let summary = connection
            .reload(&[
                SeedEntry::new("ventus", "wind"),
                SeedEntry::new("ventus", "breeze"),
            ])
            .await
            .unwrap();

        assert_eq!(summary, ReloadSummary { inserted: 1, skipped: 1 });
        assert_eq!(connection.count_words().await.unwrap(), 1);
        let ventus = connection.find_word("ventus").await.unwrap().unwrap();
        assert_eq!(ventus.translation(), "wind");
        assert!(connection.find_word("terra").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reload_resets_counters() {
        let connection = seeded(&[("aqua", "water")]).await;
        let id = connection.find_word("aqua").await.unwrap().unwrap().id();
        connection.record_answer(id, true).await.unwrap();

        connection.reload(&[SeedEntry::new("aqua", "water")]).await.unwrap();

        let aqua = connection.find_word("aqua").await.unwrap().unwrap();
        assert_eq!(aqua.correct_count(), 0);
    }

    #[tokio::test]
    async fn pick_random_on_empty_store() {
        let connection = seeded(&[]).await;
        assert!(connection.pick_random().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pick_random_returns_stored_item() {
        let connection = seeded(&[("aqua", "water")]).await;
        let item = connection.pick_random().await.unwrap().unwrap();
        assert_eq!(item.word(), "aqua");
        assert_eq!(item.translation(), "water");
    }

    #[tokio::test]
    async fn distractors_exclude_the_given_item() {
        let connection = seeded(&[
            ("aqua", "water"),
            ("ignis", "fire"),
            ("terra", "earth"),
            ("ventus", "wind"),
            ("lux", "light"),
        ])
        .await;
        let aqua = connection.find_word("aqua").await.unwrap().unwrap();

        for _ in 0..10 {
            let distractors = connection.pick_distractors(aqua.id(), 3).await.unwrap();
            assert_eq!(distractors.len(), 3);
            assert!(distractors.iter().all(|item| item.id() != aqua.id()));
            let ids: HashSet<i64> = distractors.iter().map(|item| item.id()).collect();
            assert_eq!(ids.len(), 3);
        }
    }

    #[tokio::test]
    async fn distractors_shrink_with_small_store() {
        let connection = seeded(&[("aqua", "water"), ("ignis", "fire")]).await;
        let aqua = connection.find_word("aqua").await.unwrap().unwrap();

        let distractors = connection.pick_distractors(aqua.id(), 3).await.unwrap();
        assert_eq!(distractors.len(), 1);
        assert_eq!(distractors[0].word(), "ignis");
    }

    #[tokio::test]
    async fn record_answer_touches_one_counter_of_one_item() {
        let connection = seeded(&[("aqua", "water"), ("ignis", "fire")]).await;
        let aqua = connection.find_word("aqua").await.unwrap().unwrap();

        assert!(connection.record_answer(aqua.id(), true).await.unwrap());
        let after = connection.find_word("aqua").await.unwrap().unwrap();
        assert_eq!((after.correct_count(), after.incorrect_count()), (1, 0));

        assert!(connection.record_answer(aqua.id(), false).await.unwrap());
        let after = connection.find_word("aqua").await.unwrap().unwrap();
        assert_eq!((after.correct_count(), after.incorrect_count()), (1, 1));

        let ignis = connection.find_word("ignis").await.unwrap().unwrap();
        assert_eq!((ignis.correct_count(), ignis.incorrect_count()), (0, 0));
    }

    #[tokio::test]
    async fn record_answer_for_missing_item_is_noop() {
        let connection = seeded(&[("aqua", "water")]).await;
        assert!(!connection.record_answer(9999, true).await.unwrap());
        let aqua = connection.find_word("aqua").await.unwrap().unwrap();
        assert_eq!(aqua.correct_count(), 0);
    }

    #[tokio::test]
    async fn add_word_keeps_words_unique() {
        let connection = seeded(&[("aqua", "water")]).await;

        assert!(connection.add_word("ignis", "fire").await.unwrap());
        assert!(!connection.add_word("ignis", "flame").await.unwrap());
        assert!(!connection.add_word("aqua", "sea").await.unwrap());
        assert!(connection.add_word("Aqua", "Water").await.unwrap());

        assert_eq!(connection.count_words().await.unwrap(), 3);
        let ignis = connection.find_word("ignis").await.unwrap().unwrap();
        assert_eq!(ignis.translation(), "fire");
    }
}
