use std::sync::Arc;

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::{
    commands::user_key,
    database::connection::{PickWords, RecordAnswer},
    error::QuizError,
    keyboard::{flashcard_keyboard, menu_keyboard},
    session::SessionTracker,
    HandlerResult,
};

pub(crate) const EMPTY_VOCABULARY: &str = "The vocabulary is empty. Add words with /add.";
const NO_FLASHCARD: &str = "No active flashcard. Enter /flashcards for a new one.";

async fn send_prompt(bot: &Bot, msg: &Message, word: &str) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        format!("Word: {word}\n\nPress /show to see the translation."),
    )
    .reply_markup(flashcard_keyboard())
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, tracker), fields(chat = msg.chat.id.0))]
pub(crate) async fn flashcards<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    match tracker.start_flashcard(user_key(&msg)).await {
        Ok(word) => send_prompt(&bot, &msg, &word).await?,
        Err(QuizError::EmptyVocabulary) => {
            bot.send_message(msg.chat.id, EMPTY_VOCABULARY).await?;
        }
        Err(e) => {
            tracing::error!("Database error: {:?}", e);
            return Err(e.into());
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, tracker), fields(chat = msg.chat.id.0))]
pub(crate) async fn show<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    match tracker.reveal_answer(user_key(&msg)).await {
        Ok(translation) => {
            bot.send_message(
                msg.chat.id,
                format!("Translation: {translation}\n\nPress /correct or /incorrect."),
            )
            .await?;
        }
        Err(_) => {
            bot.send_message(msg.chat.id, "No active flashcard. Use /flashcards.")
                .await?;
        }
    }
    Ok(())
}

pub(crate) async fn correct<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    answer(bot, msg, tracker, true).await
}

pub(crate) async fn incorrect<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    answer(bot, msg, tracker, false).await
}

#[instrument(level = "info", skip(bot, msg, tracker), fields(chat = msg.chat.id.0))]
async fn answer<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
    was_correct: bool,
) -> HandlerResult {
    let user = user_key(&msg);
    match tracker.answer_flashcard(user, was_correct).await {
        Ok(outcome) => {
            tracing::info!("{}: flashcard answered, correct: {}", user, outcome.was_correct);
            let verdict = if outcome.was_correct {
                "Correct! Next word:"
            } else {
                "Incorrect! Next word:"
            };
            bot.send_message(msg.chat.id, verdict).await?;

            match outcome.next {
                Some(word) => send_prompt(&bot, &msg, &word).await?,
                None => {
                    bot.send_message(msg.chat.id, EMPTY_VOCABULARY)
                        .reply_markup(menu_keyboard())
                        .await?;
                }
            }
        }
        Err(QuizError::NoActiveSession(_)) => {
            bot.send_message(msg.chat.id, NO_FLASHCARD).await?;
        }
        Err(e) => {
            tracing::error!("Database error: {:?}", e);
            return Err(e.into());
        }
    }
    Ok(())
}
