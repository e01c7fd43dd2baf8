use std::sync::Arc;

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::{
    commands::user_key,
    database::connection::AddWord,
    error::QuizError,
    keyboard::menu_keyboard,
    state::BotState,
    HandlerResult, UserDialogue,
};

const SEPARATOR: &str = " - ";

/// Splits `word - translation` on the first separator. Both halves must be non-empty.
pub fn parse_add_input(text: &str) -> Result<(String, String), QuizError> {
    let (word, translation) = text
        .split_once(SEPARATOR)
        .ok_or(QuizError::MalformedAddInput)?;
    let (word, translation) = (word.trim(), translation.trim());

    if word.is_empty() || translation.is_empty() {
        return Err(QuizError::MalformedAddInput);
    }

    Ok((word.to_owned(), translation.to_owned()))
}

#[instrument(level = "info", skip(bot, dialogue, msg), fields(chat = msg.chat.id.0))]
pub(crate) async fn add(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Enter a new word in the form:\nword - translation\nfor example: aqua - water",
    )
    .await?;
    dialogue.update(BotState::ReceiveNewWord).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, msg, connection), fields(chat = msg.chat.id.0))]
pub(crate) async fn receive_new_word<Store: AddWord>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<Store>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, send the word as text: word - translation")
            .await?;
        return Ok(());
    };

    match parse_add_input(text) {
        Ok((word, translation)) => {
            let reply = if connection.add_word(&word, &translation).await? {
                tracing::info!("{} adds '{}' - '{}'", user_key(&msg), word, translation);
                format!("Word '{word}' added!")
            } else {
                format!("Word '{word}' already exists.")
            };
            bot.send_message(msg.chat.id, reply)
                .reply_markup(menu_keyboard())
                .await?;
        }
        Err(_) => {
            tracing::info!("{}: malformed word input {:?}", user_key(&msg), text);
            bot.send_message(msg.chat.id, "Wrong format. Use: word - translation")
                .reply_markup(menu_keyboard())
                .await?;
        }
    }

    dialogue.update(BotState::Idle).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        assert_eq!(
            parse_add_input("  apple -  яблоко ").unwrap(),
            ("apple".to_owned(), "яблоко".to_owned())
        );
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(
            parse_add_input("x - y - z").unwrap(),
            ("x".to_owned(), "y - z".to_owned())
        );
    }

    #[test]
    fn hyphenated_words_need_spaced_separator() {
        assert!(matches!(
            parse_add_input("well-being"),
            Err(QuizError::MalformedAddInput)
        ));
        assert_eq!(
            parse_add_input("well-being - welfare").unwrap(),
            ("well-being".to_owned(), "welfare".to_owned())
        );
    }

    #[test]
    fn empty_halves_are_malformed() {
        assert!(matches!(parse_add_input(" - water"), Err(QuizError::MalformedAddInput)));
        assert!(matches!(parse_add_input("aqua - "), Err(QuizError::MalformedAddInput)));
    }
}
