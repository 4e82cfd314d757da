use thiserror::Error;

use crate::card::{AccountId, Amount, Card};

pub mod in_memory;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum CardServiceError {
    #[error("Card could not be inserted: {0}")]
    Insert(String),
    #[error("Card could not be ejected: {0}")]
    Remove(String),
}

#[derive(Debug, Error)]
pub enum AccountServiceError {
    #[error("Pin number could not be checked: {0}")]
    Check(String),
    #[error("Account ids could not be fetched: {0}")]
    Fetch(String),
    #[error("Account could not be selected: {0}")]
    Select(String),
    #[error("Balance could not be fetched: {0}")]
    Balance(String),
    #[error("Deposit failed: {0}")]
    Deposit(String),
    #[error("Withdrawal failed: {0}")]
    Withdraw(String),
}

/// Card reader hardware.
pub trait CardService {
    fn insert_card(&mut self, card: &Card) -> Result<(), CardServiceError>;

    fn remove_card(&mut self) -> Result<(), CardServiceError>;
}

/// Bank backend holding the accounts behind a card.
pub trait AccountService {
    /// `Ok(false)` means the pin was checked and rejected.
    fn enter_pin_number(&mut self, card: &Card, pin: &str) -> Result<bool, AccountServiceError>;

    fn account_ids(&mut self) -> Result<Vec<AccountId>, AccountServiceError>;

    fn select_account_id(&mut self, account_id: &str) -> Result<(), AccountServiceError>;

    fn balance(&mut self, account_id: &str) -> Result<Amount, AccountServiceError>;

    /// Returns the balance after the deposit.
    fn deposit(&mut self, account_id: &str, amount: Amount) -> Result<Amount, AccountServiceError>;

    /// Returns the balance after the withdrawal.
    fn withdraw(&mut self, account_id: &str, amount: Amount)
    -> Result<Amount, AccountServiceError>;
}
