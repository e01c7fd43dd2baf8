use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};
use tracing::instrument;

use crate::{keyboard::menu_keyboard, session::UserKey, state::BotState, HandlerResult, UserDialogue};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "start the bot.")]
    Start,
    #[command(description = "practice with flashcards.")]
    Flashcards,
    #[command(description = "show the translation of the current flashcard.")]
    Show,
    #[command(description = "mark the current flashcard as known.")]
    Correct,
    #[command(description = "mark the current flashcard as not known.")]
    Incorrect,
    #[command(description = "take a multiple choice test.")]
    Test,
    #[command(description = "add a new word.")]
    Add,
    #[command(description = "cancel adding a word.")]
    Cancel,
}

pub(crate) const MENU: &str = "Hi! I'm a vocabulary quiz bot.\n\n\
    Choose a mode:\n\
    /flashcards - flashcards\n\
    /test - multiple choice test\n\
    /add - add a new word";

/// Sessions are keyed by the sender, falling back to the chat for anonymous messages.
pub(crate) fn user_key(msg: &Message) -> UserKey {
    msg.from
        .as_ref()
        .map(|user| user.id.0)
        .unwrap_or(msg.chat.id.0.unsigned_abs())
}

/// Drops any unfinished dialogue, such as a half-entered word.
pub(crate) async fn leave_dialogue(dialogue: &UserDialogue) -> HandlerResult {
    dialogue.update(BotState::Idle).await?;
    Ok(())
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, msg), fields(chat = msg.chat.id.0))]
pub(crate) async fn start(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    leave_dialogue(&dialogue).await?;
    bot.send_message(msg.chat.id, MENU)
        .reply_markup(menu_keyboard())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, msg), fields(chat = msg.chat.id.0))]
pub(crate) async fn cancel(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    state: BotState,
) -> HandlerResult {
    match state {
        BotState::ReceiveNewWord => {
            tracing::info!("{}: cancels adding a word", user_key(&msg));
            leave_dialogue(&dialogue).await?;
            bot.send_message(msg.chat.id, "Adding cancelled.")
                .reply_markup(menu_keyboard())
                .await?;
        }
        BotState::Idle => {
            bot.send_message(msg.chat.id, "Nothing to cancel.").await?;
        }
    }
    Ok(())
}
