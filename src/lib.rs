use state::BotState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod commands;
pub mod config;
pub mod constructor;
pub mod database;
pub mod error;
pub mod flashcards;
pub mod keyboard;
pub mod runner;
pub mod schema;
pub mod session;
pub mod state;

pub type UserDialogue = Dialogue<BotState, InMemStorage<BotState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
