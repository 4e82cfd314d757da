//! Scripted collaborators for controller tests.

use crate::card::{AccountId, Amount, Card};

use super::{AccountService, AccountServiceError, CardService, CardServiceError};

#[derive(Debug, Default)]
pub struct FakeCardReader {
    pub fail_insert: bool,
    pub fail_remove: bool,
    pub calls: usize,
}

impl CardService for FakeCardReader {
    fn insert_card(&mut self, _card: &Card) -> Result<(), CardServiceError> {
        self.calls += 1;
        if self.fail_insert {
            return Err(CardServiceError::Insert("reader jammed".to_string()));
        }
        Ok(())
    }

    fn remove_card(&mut self) -> Result<(), CardServiceError> {
        self.calls += 1;
        if self.fail_remove {
            return Err(CardServiceError::Remove("reader jammed".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeAccountService {
    pub fail_pin_check: bool,
    pub reject_pin: bool,

    pub fail_account_ids: bool,
    pub fail_select: bool,
    pub account_ids: Vec<AccountId>,

    pub fail_balance: bool,
    pub balance: Amount,

    pub fail_deposit: bool,
    pub balance_after_deposit: Amount,

    pub fail_withdraw: bool,
    pub balance_after_withdraw: Amount,

    pub calls: usize,
    pub selected: Option<AccountId>,
}

impl FakeAccountService {
    pub fn with_accounts(ids: &[&str]) -> Self {
        Self {
            account_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl AccountService for FakeAccountService {
    fn enter_pin_number(&mut self, _card: &Card, _pin: &str) -> Result<bool, AccountServiceError> {
        self.calls += 1;
        if self.fail_pin_check {
            return Err(AccountServiceError::Check("backend offline".to_string()));
        }
        Ok(!self.reject_pin)
    }

    fn account_ids(&mut self) -> Result<Vec<AccountId>, AccountServiceError> {
        self.calls += 1;
        if self.fail_account_ids {
            return Err(AccountServiceError::Fetch("backend offline".to_string()));
        }
        Ok(self.account_ids.clone())
    }

    fn select_account_id(&mut self, account_id: &str) -> Result<(), AccountServiceError> {
        self.calls += 1;
        if self.fail_select {
            return Err(AccountServiceError::Select("backend offline".to_string()));
        }
        self.selected = Some(account_id.to_string());
        Ok(())
    }

    fn balance(&mut self, _account_id: &str) -> Result<Amount, AccountServiceError> {
        self.calls += 1;
        if self.fail_balance {
            return Err(AccountServiceError::Balance("backend offline".to_string()));
        }
        Ok(self.balance)
    }

    fn deposit(
        &mut self,
        _account_id: &str,
        _amount: Amount,
    ) -> Result<Amount, AccountServiceError> {
        self.calls += 1;
        if self.fail_deposit {
            return Err(AccountServiceError::Deposit("backend offline".to_string()));
        }
        Ok(self.balance_after_deposit)
    }

    fn withdraw(
        &mut self,
        _account_id: &str,
        _amount: Amount,
    ) -> Result<Amount, AccountServiceError> {
        self.calls += 1;
        if self.fail_withdraw {
            return Err(AccountServiceError::Withdraw("backend offline".to_string()));
        }
        Ok(self.balance_after_withdraw)
    }
}
