use crate::card::{AccountId, Card};

/// Where a session currently is in the insert → pin → select progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    NoCard,
    CardPresent,
    PinValidated,
    AccountSelected,
}

/// Facts about the card currently in the terminal.
///
/// Plain storage, the controller is responsible for keeping the fields consistent:
/// a validated pin requires a card, and a selected account requires a validated pin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    card: Option<Card>,
    card_inserted: bool,
    pin_validated: bool,
    selected_account_id: Option<AccountId>,
}

impl SessionState {
    pub fn set_card(&mut self, card: Card) {
        self.card_inserted = true;
        self.card = Some(card);
    }

    pub fn view_card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    /// Both the marker and the card value must be present.
    pub fn has_card_inserted(&self) -> bool {
        self.card_inserted && self.card.is_some()
    }

    pub fn set_pin_validated(&mut self, validated: bool) {
        self.pin_validated = validated;
    }

    pub fn is_pin_validated(&self) -> bool {
        self.pin_validated
    }

    pub fn set_selected_account_id(&mut self, account_id: AccountId) {
        self.selected_account_id = Some(account_id);
    }

    pub fn selected_account_id(&self) -> Option<&str> {
        self.selected_account_id.as_deref()
    }

    /// Drops every fact at once.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn stage(&self) -> SessionStage {
        if !self.has_card_inserted() {
            SessionStage::NoCard
        } else if !self.pin_validated {
            SessionStage::CardPresent
        } else if self.selected_account_id.is_none() {
            SessionStage::PinValidated
        } else {
            SessionStage::AccountSelected
        }
    }
}
