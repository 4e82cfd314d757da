pub type AccountId = String;

pub type Amount = i64;

/// Card as read by the terminal. The session only cares whether one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub holder_name: String,
    pub number: String,
}

impl Card {
    pub fn new(holder_name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            holder_name: holder_name.into(),
            number: number.into(),
        }
    }
}
