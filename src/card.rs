/// One question/answer unit plus the flags the current session tracks for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub question: String,
    pub answer: String,
    pub answered: bool,
    /// `None` until the card has been answered in this session
    pub answered_correctly: Option<bool>,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            answered: false,
            answered_correctly: None,
        }
    }

    /// Drop everything the session learned about this card
    pub fn reset(&mut self) {
        self.answered = false;
        self.answered_correctly = None;
    }

    /// Whether `guess` matches the stored answer, ignoring case and whitespace
    pub fn accepts(&self, guess: &str) -> bool {
        normalize(guess) == normalize(&self.answer)
    }
}

/// Lower-case and strip every whitespace character.
///
/// Used only for answer comparison, so "  New York " and "newyork" compare equal.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
