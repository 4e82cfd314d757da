use std::collections::HashMap;

use thiserror::Error;

use crate::card::{AccountId, Amount, Card};

use super::{AccountService, AccountServiceError, CardService, CardServiceError};

/// Card slot that holds at most one card. Inserting replaces whatever the slot held.
#[derive(Debug, Default)]
pub struct InMemoryCardReader {
    slot: Option<Card>,
}

impl InMemoryCardReader {
    pub fn card(&self) -> Option<&Card> {
        self.slot.as_ref()
    }
}

impl CardService for InMemoryCardReader {
    fn insert_card(&mut self, card: &Card) -> Result<(), CardServiceError> {
        if card.number.is_empty() {
            return Err(CardServiceError::Insert("card number unreadable".to_string()));
        }
        self.slot = Some(card.clone());
        Ok(())
    }

    fn remove_card(&mut self) -> Result<(), CardServiceError> {
        match self.slot.take() {
            Some(_) => Ok(()),
            None => Err(CardServiceError::Remove("slot is empty".to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankSetupError {
    #[error("Card {card_number} is not registered")]
    UnknownCard { card_number: String },
    #[error("Card {card_number} is already registered with a different pin")]
    PinConflict { card_number: String },
    #[error("Account {account_id} already belongs to card {owner}")]
    AccountOwnedElsewhere { account_id: AccountId, owner: String },
}

#[derive(Debug)]
struct CardAccounts {
    pin: String,
    // opening order is the order reported to the terminal
    account_ids: Vec<AccountId>,
}

/// Bank backend keeping balances in memory.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    cards: HashMap<String, CardAccounts>,
    balances: HashMap<AccountId, Amount>,
    authenticated: Option<String>,
    selected: Option<AccountId>,
}

impl InMemoryBank {
    /// Registers a card number. Registering it again is a no-op as long as the pin matches.
    pub fn register_card(
        &mut self,
        card_number: &str,
        pin: &str,
    ) -> Result<(), BankSetupError> {
        if let Some(accounts) = self.cards.get(card_number) {
            if accounts.pin != pin {
                return Err(BankSetupError::PinConflict {
                    card_number: card_number.to_string(),
                });
            }
            return Ok(());
        }
        self.cards.insert(
            card_number.to_string(),
            CardAccounts {
                pin: pin.to_string(),
                account_ids: Vec::new(),
            },
        );
        Ok(())
    }

    /// Opens an account behind a registered card. Reopening an account resets its balance.
    /// An account belongs to exactly one card.
    pub fn open_account(
        &mut self,
        card_number: &str,
        account_id: &str,
        balance: Amount,
    ) -> Result<(), BankSetupError> {
        if let Some(owner) = self
            .owner_of(account_id)
            .filter(|owner| *owner != card_number)
        {
            return Err(BankSetupError::AccountOwnedElsewhere {
                account_id: account_id.to_string(),
                owner: owner.to_string(),
            });
        }
        let Some(accounts) = self.cards.get_mut(card_number) else {
            return Err(BankSetupError::UnknownCard {
                card_number: card_number.to_string(),
            });
        };
        if !accounts.account_ids.iter().any(|id| id == account_id) {
            accounts.account_ids.push(account_id.to_string());
        }
        self.balances.insert(account_id.to_string(), balance);
        Ok(())
    }

    pub fn selected_account_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn owner_of(&self, account_id: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(_, accounts)| accounts.account_ids.iter().any(|id| id == account_id))
            .map(|(number, _)| number.as_str())
    }

    fn owned_accounts(&self) -> Option<&[AccountId]> {
        let number = self.authenticated.as_ref()?;
        self.cards
            .get(number)
            .map(|accounts| accounts.account_ids.as_slice())
    }

    fn owns(&self, account_id: &str) -> bool {
        self.owned_accounts()
            .is_some_and(|ids| ids.iter().any(|id| id == account_id))
    }

    fn balance_mut(&mut self, account_id: &str) -> Option<&mut Amount> {
        if !self.owns(account_id) {
            return None;
        }
        self.balances.get_mut(account_id)
    }
}

impl AccountService for InMemoryBank {
    fn enter_pin_number(&mut self, card: &Card, pin: &str) -> Result<bool, AccountServiceError> {
        let Some(accounts) = self.cards.get(&card.number) else {
            return Err(AccountServiceError::Check(format!(
                "card {} is not registered",
                card.number
            )));
        };
        self.selected = None;
        if accounts.pin == pin {
            self.authenticated = Some(card.number.clone());
            Ok(true)
        } else {
            self.authenticated = None;
            Ok(false)
        }
    }

    fn account_ids(&mut self) -> Result<Vec<AccountId>, AccountServiceError> {
        self.owned_accounts()
            .map(<[AccountId]>::to_vec)
            .ok_or_else(|| AccountServiceError::Fetch("no card authenticated".to_string()))
    }

    fn select_account_id(&mut self, account_id: &str) -> Result<(), AccountServiceError> {
        if !self.owns(account_id) {
            return Err(AccountServiceError::Select(format!(
                "account {account_id} is not accessible"
            )));
        }
        self.selected = Some(account_id.to_string());
        Ok(())
    }

    fn balance(&mut self, account_id: &str) -> Result<Amount, AccountServiceError> {
        self.balance_mut(account_id)
            .map(|balance| *balance)
            .ok_or_else(|| {
                AccountServiceError::Balance(format!("account {account_id} is not accessible"))
            })
    }

    fn deposit(
        &mut self,
        account_id: &str,
        amount: Amount,
    ) -> Result<Amount, AccountServiceError> {
        if amount < 0 {
            return Err(AccountServiceError::Deposit(
                "amount must not be negative".to_string(),
            ));
        }
        let Some(balance) = self.balance_mut(account_id) else {
            return Err(AccountServiceError::Deposit(format!(
                "account {account_id} is not accessible"
            )));
        };
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| AccountServiceError::Deposit("balance overflow".to_string()))?;
        Ok(*balance)
    }

    fn withdraw(
        &mut self,
        account_id: &str,
        amount: Amount,
    ) -> Result<Amount, AccountServiceError> {
        if amount < 0 {
            return Err(AccountServiceError::Withdraw(
                "amount must not be negative".to_string(),
            ));
        }
        let Some(balance) = self.balance_mut(account_id) else {
            return Err(AccountServiceError::Withdraw(format!(
                "account {account_id} is not accessible"
            )));
        };
        if *balance < amount {
            return Err(AccountServiceError::Withdraw("insufficient funds".to_string()));
        }
        *balance -= amount;
        Ok(*balance)
    }
}
