/// Dialogue state of a chat. Only the add-word flow spans several messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BotState {
    #[default]
    Idle,
    ReceiveNewWord,
}
