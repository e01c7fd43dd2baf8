use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

pub(crate) fn menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("/flashcards"),
            KeyboardButton::new("/test"),
        ],
        vec![KeyboardButton::new("/add")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn flashcard_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("/show")],
        vec![
            KeyboardButton::new("/correct"),
            KeyboardButton::new("/incorrect"),
        ],
    ];

    KeyboardMarkup::new(keyboard)
}

/// Callback data of an option button: `<test session id>:<option index>`.
pub(crate) fn option_data(session_id: u64, index: usize) -> String {
    format!("{session_id}:{index}")
}

pub(crate) fn parse_option_data(data: &str) -> Option<(u64, usize)> {
    let (session_id, index) = data.split_once(':')?;
    Some((session_id.parse().ok()?, index.parse().ok()?))
}

pub(crate) fn options_keyboard(session_id: u64, options: &[String]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            vec![InlineKeyboardButton::callback(
                option.clone(),
                option_data(session_id, index),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[test]
    fn options_keyboard_has_one_row_per_option() {
        let options = vec!["water".to_owned(), "fire".to_owned()];
        let markup = options_keyboard(12, &options);

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "fire");
        match &markup.inline_keyboard[1][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "12:1"),
            other => panic!("unexpected button kind {other:?}"),
        }
    }

    #[test]
    fn option_data_round_trip() {
        assert_eq!(parse_option_data(&option_data(7, 3)), Some((7, 3)));
        assert_eq!(parse_option_data("water"), None);
        assert_eq!(parse_option_data("7:x"), None);
        assert_eq!(parse_option_data("-7:1"), None);
    }

    #[test]
    fn flashcard_keyboard_offers_answer_commands() {
        let markup = flashcard_keyboard();
        let labels: Vec<&str> = markup
            .keyboard
            .iter()
            .flatten()
            .map(|button| button.text.as_str())
            .collect();
        assert_eq!(labels, vec!["/show", "/correct", "/incorrect"]);
    }
}
