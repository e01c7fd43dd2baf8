use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateFilterExt, UpdateHandler,
    },
    dptree,
    prelude::Requester,
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    commands::{cancel, help, start, Command},
    constructor,
    database::connection::Connection,
    flashcards, runner,
    state::BotState,
    HandlerResult,
};

/// Dispatch tree of the bot. Expects `InMemStorage<BotState>`, `Arc<Connection>`
/// and `Arc<SessionTracker<Connection>>` among the dependencies.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    tracing::debug!("Building the dispatching tree");
    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Flashcards].endpoint(flashcards::flashcards::<Connection>))
        .branch(case![Command::Show].endpoint(flashcards::show::<Connection>))
        .branch(case![Command::Correct].endpoint(flashcards::correct::<Connection>))
        .branch(case![Command::Incorrect].endpoint(flashcards::incorrect::<Connection>))
        .branch(case![Command::Test].endpoint(runner::test::<Connection>))
        .branch(case![Command::Add].endpoint(constructor::add))
        .branch(case![Command::Cancel].endpoint(cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(
            case![BotState::ReceiveNewWord]
                .endpoint(constructor::receive_new_word::<Connection>),
        )
        .endpoint(invalid_state);

    let callback_query_handler =
        Update::filter_callback_query().endpoint(runner::take_answer::<Connection>);

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}

#[instrument(level = "info", skip(bot, msg), fields(chat = msg.chat.id.0))]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    tracing::info!("invalid input '{:?}'", msg.text());
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
