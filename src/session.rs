//! Per-user quiz sessions.
//!
//! The tracker owns a map from user to the flashcard and test currently in
//! flight for that user. Every session is a snapshot of the item it was built
//! from, so later store mutations do not change what the user is asked.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::{
    database::connection::{PickWords, RecordAnswer},
    error::{QuizError, QuizMode},
};

/// Numeric identity of the user a session belongs to.
pub type UserKey = u64;

pub const DISTRACTOR_COUNT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardSession {
    pub item_id: i64,
    pub prompt_word: String,
    pub expected_translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    /// Distinguishes this test from earlier ones, even for the same item.
    pub session_id: u64,
    pub item_id: i64,
    pub prompt_word: String,
    pub expected_translation: String,
    pub options: Vec<String>,
}

/// At most one session per mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizSessions {
    pub flashcard: Option<FlashcardSession>,
    pub test: Option<TestSession>,
}

impl QuizSessions {
    fn is_empty(&self) -> bool {
        self.flashcard.is_none() && self.test.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardOutcome {
    pub was_correct: bool,
    /// Prompt of the session that replaced the answered one, if any word is left.
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPrompt {
    pub session_id: u64,
    pub word: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub chosen: String,
    pub correct: bool,
    pub expected: String,
}

pub struct SessionTracker<Store> {
    store: Arc<Store>,
    sessions: Mutex<HashMap<UserKey, QuizSessions>>,
    next_test_id: AtomicU64,
}

impl<Store> SessionTracker<Store>
where
    Store: PickWords + RecordAnswer,
{
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_sessions(store, HashMap::new())
    }

    pub fn with_sessions(store: Arc<Store>, sessions: HashMap<UserKey, QuizSessions>) -> Self {
        let next_test_id = sessions
            .values()
            .filter_map(|sessions| sessions.test.as_ref())
            .map(|session| session.session_id + 1)
            .max()
            .unwrap_or(0);

        Self {
            store,
            sessions: Mutex::new(sessions),
            next_test_id: AtomicU64::new(next_test_id),
        }
    }

    pub async fn sessions_of(&self, user: UserKey) -> QuizSessions {
        self.sessions
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn start_flashcard(&self, user: UserKey) -> Result<String, QuizError> {
        let item = self
            .store
            .pick_random()
            .await?
            .ok_or(QuizError::EmptyVocabulary)?;

        let prompt = item.word().to_owned();
        let session = FlashcardSession {
            item_id: item.id(),
            prompt_word: prompt.clone(),
            expected_translation: item.translation().to_owned(),
        };
        tracing::debug!("{}: flashcard for item {}", user, session.item_id);

        self.sessions
            .lock()
            .await
            .entry(user)
            .or_default()
            .flashcard = Some(session);

        Ok(prompt)
    }

    pub async fn reveal_answer(&self, user: UserKey) -> Result<String, QuizError> {
        self.sessions
            .lock()
            .await
            .get(&user)
            .and_then(|sessions| sessions.flashcard.as_ref())
            .map(|session| session.expected_translation.clone())
            .ok_or(QuizError::NoActiveSession(QuizMode::Flashcard))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn answer_flashcard(
        &self,
        user: UserKey,
        was_correct: bool,
    ) -> Result<FlashcardOutcome, QuizError> {
        let session = self
            .take(user, |sessions| sessions.flashcard.take())
            .await
            .ok_or(QuizError::NoActiveSession(QuizMode::Flashcard))?;

        self.record(session.item_id, was_correct).await?;

        let next = match self.start_flashcard(user).await {
            Ok(prompt) => Some(prompt),
            Err(QuizError::EmptyVocabulary) => None,
            Err(e) => return Err(e),
        };

        Ok(FlashcardOutcome { was_correct, next })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn start_test(&self, user: UserKey) -> Result<TestPrompt, QuizError> {
        let item = self
            .store
            .pick_random()
            .await?
            .ok_or(QuizError::EmptyVocabulary)?;

        let distractors = self
            .store
            .pick_distractors(item.id(), DISTRACTOR_COUNT)
            .await?;

        let mut options = vec![item.translation().to_owned()];
        for distractor in distractors {
            if !options.iter().any(|option| option == distractor.translation()) {
                options.push(distractor.translation().to_owned());
            }
        }
        options.shuffle(&mut rand::thread_rng());

        let session_id = self.next_test_id.fetch_add(1, Ordering::Relaxed);
        let session = TestSession {
            session_id,
            item_id: item.id(),
            prompt_word: item.word().to_owned(),
            expected_translation: item.translation().to_owned(),
            options: options.clone(),
        };
        tracing::debug!(
            "{}: test {} for item {} with {} options",
            user,
            session_id,
            session.item_id,
            options.len()
        );

        self.sessions
            .lock()
            .await
            .entry(user)
            .or_default()
            .test = Some(session);

        Ok(TestPrompt {
            session_id,
            word: item.word().to_owned(),
            options,
        })
    }

    /// Grades the `index`-th option of test `session_id`. A button of any other
    /// test, including an older test for the same item, finds no session.
    #[instrument(level = "debug", skip(self))]
    pub async fn answer_test_option(
        &self,
        user: UserKey,
        session_id: u64,
        index: usize,
    ) -> Result<TestOutcome, QuizError> {
        let (session, chosen) = self
            .take(user, |sessions| {
                let chosen = sessions
                    .test
                    .as_ref()
                    .filter(|session| session.session_id == session_id)?
                    .options
                    .get(index)
                    .cloned()?;
                Some((sessions.test.take()?, chosen))
            })
            .await
            .ok_or(QuizError::NoActiveSession(QuizMode::Test))?;

        self.grade(session, chosen).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn answer_test(
        &self,
        user: UserKey,
        chosen_option: &str,
    ) -> Result<TestOutcome, QuizError> {
        let session = self
            .take(user, |sessions| sessions.test.take())
            .await
            .ok_or(QuizError::NoActiveSession(QuizMode::Test))?;

        self.grade(session, chosen_option.to_owned()).await
    }

    async fn grade(&self, session: TestSession, chosen: String) -> Result<TestOutcome, QuizError> {
        let correct = chosen == session.expected_translation;
        self.record(session.item_id, correct).await?;

        Ok(TestOutcome {
            chosen,
            correct,
            expected: session.expected_translation,
        })
    }

    async fn take<T>(
        &self,
        user: UserKey,
        pick: impl FnOnce(&mut QuizSessions) -> Option<T>,
    ) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        let user_sessions = sessions.get_mut(&user)?;
        let taken = pick(user_sessions);
        if user_sessions.is_empty() {
            sessions.remove(&user);
        }
        taken
    }

    async fn record(&self, item_id: i64, was_correct: bool) -> Result<(), QuizError> {
        if !self.store.record_answer(item_id, was_correct).await? {
            tracing::warn!("Item {} vanished before its answer was recorded", item_id);
        }
        Ok(())
    }
}
