/// UI languages. A closed set: the selector offers exactly these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ru,
}

/// The fixed set of strings the UI re-applies on a language change.
#[derive(Clone, Copy, Debug)]
pub struct UiStrings {
    pub title: &'static str,
    pub tutorial: &'static str,
    pub practice: &'static str,
    pub try_again: &'static str,
    pub show_hand: &'static str,
    pub learned: &'static str,
}

const EN: UiStrings = UiStrings {
    title: "ASL Tutor",
    tutorial: "Tutorial",
    practice: "Practice",
    try_again: "Try Again",
    show_hand: "Show your hand",
    learned: "Learned",
};

const RU: UiStrings = UiStrings {
    title: "Учебник ASL",
    tutorial: "Обучение",
    practice: "Практика",
    try_again: "Попробуй ещё раз",
    show_hand: "Покажи руку",
    learned: "Изучено",
};

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ru => "ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Lang> {
        Lang::ALL.into_iter().find(|lang| lang.code() == code)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Ru => "Русский",
        }
    }

    /// Voice tag handed to the speech engine for utterances in this
    /// language.
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Lang::En => "en-US",
            Lang::Ru => "ru-RU",
        }
    }

    pub fn strings(&self) -> &'static UiStrings {
        match self {
            Lang::En => &EN,
            Lang::Ru => &RU,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for lang in Lang::ALL {
            assert_eq!(Lang::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(Lang::from_code("de"), None);
        assert_eq!(Lang::from_code(""), None);
        assert_eq!(Lang::from_code("EN"), None);
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(Lang::default(), Lang::En);
    }

    #[test]
    fn languages_translate_the_failure_line() {
        assert_ne!(Lang::En.strings().try_again, Lang::Ru.strings().try_again);
        assert_eq!(Lang::Ru.strings().try_again, "Попробуй ещё раз");
    }

    #[test]
    fn speech_tags_are_regional() {
        assert_eq!(Lang::En.speech_tag(), "en-US");
        assert_eq!(Lang::Ru.speech_tag(), "ru-RU");
    }
}
