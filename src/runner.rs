use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{CallbackQuery, Message},
    Bot,
};
use tracing::instrument;

use crate::{
    commands::user_key,
    database::connection::{PickWords, RecordAnswer},
    error::QuizError,
    flashcards::EMPTY_VOCABULARY,
    keyboard::{options_keyboard, parse_option_data},
    session::SessionTracker,
    HandlerResult,
};

const NO_TEST: &str = "The test is not active. Try /test.";

#[instrument(level = "info", skip(bot, msg, tracker), fields(chat = msg.chat.id.0))]
pub(crate) async fn test<Store: PickWords + RecordAnswer>(
    bot: Bot,
    msg: Message,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    let user = user_key(&msg);
    match tracker.start_test(user).await {
        Ok(prompt) => {
            tracing::info!("{}: asking '{}' with {} options", user, prompt.word, prompt.options.len());
            bot.send_message(msg.chat.id, format!("Translate the word: {}", prompt.word))
                .reply_markup(options_keyboard(prompt.session_id, &prompt.options))
                .await?;
        }
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

#[instrument(level = "info", skip(bot, q, tracker), fields(user = q.from.id.0))]
pub(crate) async fn take_answer<Store: PickWords + RecordAnswer>(
    bot: Bot,
    q: CallbackQuery,
    tracker: Arc<SessionTracker<Store>>,
) -> HandlerResult {
    bot.answer_callback_query(&q.id).await?;

    let user = q.from.id.0;
    let Some((session_id, index)) = q.data.as_deref().and_then(parse_option_data) else {
        tracing::info!("{} sent unknown callback data {:?}", user, q.data);
        return Ok(());
    };

    let text = match tracker.answer_test_option(user, session_id, index).await {
        Ok(outcome) => {
            tracing::info!(
                "{} answers '{}'. Correctness: {}",
                user,
                outcome.chosen,
                outcome.correct
            );
            if outcome.correct {
                format!("Correct!✅ Translation: {}", outcome.expected)
            } else {
                format!("Incorrect!❌ Answer: {}", outcome.expected)
            }
        }
        Err(QuizError::NoActiveSession(_)) => {
            tracing::info!("{} pressed a button of test {} which is not active", user, session_id);
            NO_TEST.to_owned()
        }
        Err(e) => {
            tracing::error!("Database error: {:?}", e);
            return Err(e.into());
        }
    };

    if let (Some(chat_id), Some(message)) = (q.chat_id(), &q.message) {
        bot.edit_message_text(chat_id, message.id(), text).await?;
    }

    Ok(())
}
