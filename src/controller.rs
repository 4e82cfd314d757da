use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    card::{AccountId, Amount, Card},
    service::{AccountService, CardService},
    session::{SessionStage, SessionState},
};

/// Broad category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Session is not in the state the operation requires. No collaborator was called.
    Precondition,
    /// Collaborators answered, and the answer was "no".
    Rejection,
    /// A collaborator failed. The cause is logged, not returned.
    Collaborator,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No card found")]
    NoCardFound,
    #[error("Failed to insert card")]
    InsertCardFailed,
    #[error("Failed to remove card")]
    RemoveCardFailed,
    #[error("Failed to check card pin number")]
    PinCheckFailed,
    #[error("Invalid pin number")]
    InvalidPin,
    #[error("Pin number not validated")]
    PinNotValidated,
    #[error("Failed to get account ids")]
    AccountIdsFetchFailed,
    #[error("No matching account id")]
    NoMatchingAccountId,
    #[error("Failed to select account id")]
    SelectAccountFailed,
    #[error("No account selected")]
    NoAccountSelected,
    #[error("Account id does not match")]
    AccountIdMismatch,
    #[error("Failed to get balance")]
    BalanceFetchFailed,
    #[error("Failed to make deposit")]
    DepositFailed,
    #[error("Withdrawal of {requested} would overdraw balance of {balance}")]
    Overdraw { balance: Amount, requested: Amount },
    #[error("Failed to withdraw")]
    WithdrawFailed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NoCardFound
            | SessionError::PinNotValidated
            | SessionError::NoAccountSelected
            | SessionError::AccountIdMismatch => ErrorKind::Precondition,
            SessionError::InvalidPin
            | SessionError::NoMatchingAccountId
            | SessionError::Overdraw { .. } => ErrorKind::Rejection,
            SessionError::InsertCardFailed
            | SessionError::RemoveCardFailed
            | SessionError::PinCheckFailed
            | SessionError::AccountIdsFetchFailed
            | SessionError::SelectAccountFailed
            | SessionError::BalanceFetchFailed
            | SessionError::DepositFailed
            | SessionError::WithdrawFailed => ErrorKind::Collaborator,
        }
    }
}

/// Drives a single terminal session.
///
/// Every operation checks the session state before talking to a collaborator,
/// so an operation rejected on a precondition never reaches the card reader or bank.
/// One controller serves one terminal; it is not meant to be shared.
pub struct SessionController<C, A> {
    session: SessionState,
    card_service: C,
    account_service: A,
}

impl<C, A> SessionController<C, A>
where
    C: CardService,
    A: AccountService,
{
    pub fn new(card_service: C, account_service: A) -> Self {
        Self {
            session: SessionState::default(),
            card_service,
            account_service,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stage(&self) -> SessionStage {
        self.session.stage()
    }

    pub fn card_service(&self) -> &C {
        &self.card_service
    }

    pub fn account_service(&self) -> &A {
        &self.account_service
    }

    /// Starts a fresh session for `card` once the reader has accepted it.
    pub fn insert_card(&mut self, card: Card) -> Result<(), SessionError> {
        if let Err(err) = self.card_service.insert_card(&card) {
            warn!(error = %err, "card reader refused card");
            return Err(SessionError::InsertCardFailed);
        }

        self.session.clear();
        self.session.set_card(card);
        debug!("card inserted");
        Ok(())
    }

    /// Ejects the card. The session is kept as is if the reader fails to eject it.
    pub fn remove_card(&mut self) -> Result<(), SessionError> {
        self.require_card()?;

        if let Err(err) = self.card_service.remove_card() {
            warn!(error = %err, "card reader failed to eject card");
            return Err(SessionError::RemoveCardFailed);
        }

        self.session.clear();
        debug!("card removed");
        Ok(())
    }

    /// A rejected pin ends the session, a failed check only drops the pin validation.
    pub fn enter_pin(&mut self, pin: &str) -> Result<(), SessionError> {
        let card = inserted_card(&self.session)?;

        match self.account_service.enter_pin_number(card, pin) {
            Ok(true) => {
                self.session.set_pin_validated(true);
                info!("pin accepted");
                Ok(())
            }
            Ok(false) => {
                self.session.clear();
                info!("pin rejected, session reset");
                Err(SessionError::InvalidPin)
            }
            Err(err) => {
                self.session.set_pin_validated(false);
                warn!(error = %err, "pin check failed");
                Err(SessionError::PinCheckFailed)
            }
        }
    }

    pub fn account_ids(&mut self) -> Result<Vec<AccountId>, SessionError> {
        self.require_pin()?;
        self.fetch_account_ids()
    }

    /// Selects `account_id` if the bank currently lists it for this card.
    pub fn select_account(&mut self, account_id: &str) -> Result<(), SessionError> {
        self.require_pin()?;

        let account_ids = self.fetch_account_ids()?;
        if !account_ids.iter().any(|id| id == account_id) {
            info!(account_id, "no matching account id");
            return Err(SessionError::NoMatchingAccountId);
        }

        if let Err(err) = self.account_service.select_account_id(account_id) {
            warn!(error = %err, account_id, "account selection failed");
            return Err(SessionError::SelectAccountFailed);
        }

        self.session.set_selected_account_id(account_id.to_string());
        info!(account_id, "account selected");
        Ok(())
    }

    pub fn balance(&mut self, account_id: &str) -> Result<Amount, SessionError> {
        self.require_selected(account_id)?;
        self.fetch_balance(account_id)
    }

    /// Returns the balance after the deposit.
    pub fn make_deposit(
        &mut self,
        account_id: &str,
        amount: Amount,
    ) -> Result<Amount, SessionError> {
        self.require_selected(account_id)?;

        self.account_service
            .deposit(account_id, amount)
            .map_err(|err| {
                warn!(error = %err, account_id, amount, "deposit failed");
                SessionError::DepositFailed
            })
    }

    /// Returns the balance after the withdrawal. The current balance is always
    /// fetched again; a withdrawal of the whole balance is allowed.
    pub fn make_withdrawal(
        &mut self,
        account_id: &str,
        amount: Amount,
    ) -> Result<Amount, SessionError> {
        self.require_selected(account_id)?;

        let balance = self.fetch_balance(account_id)?;
        if balance < amount {
            info!(account_id, balance, amount, "withdrawal would overdraw");
            return Err(SessionError::Overdraw {
                balance,
                requested: amount,
            });
        }

        self.account_service
            .withdraw(account_id, amount)
            .map_err(|err| {
                warn!(error = %err, account_id, amount, "withdrawal failed");
                SessionError::WithdrawFailed
            })
    }

    fn require_card(&self) -> Result<(), SessionError> {
        inserted_card(&self.session).map(|_| ())
    }

    fn require_pin(&self) -> Result<(), SessionError> {
        self.require_card()?;
        if !self.session.is_pin_validated() {
            return Err(SessionError::PinNotValidated);
        }
        Ok(())
    }

    fn require_selected(&self, account_id: &str) -> Result<(), SessionError> {
        self.require_pin()?;
        match self.session.selected_account_id() {
            None => Err(SessionError::NoAccountSelected),
            Some(selected) if selected != account_id => Err(SessionError::AccountIdMismatch),
            Some(_) => Ok(()),
        }
    }

    fn fetch_account_ids(&mut self) -> Result<Vec<AccountId>, SessionError> {
        self.account_service.account_ids().map_err(|err| {
            warn!(error = %err, "fetching account ids failed");
            SessionError::AccountIdsFetchFailed
        })
    }

    fn fetch_balance(&mut self, account_id: &str) -> Result<Amount, SessionError> {
        self.account_service.balance(account_id).map_err(|err| {
            warn!(error = %err, account_id, "fetching balance failed");
            SessionError::BalanceFetchFailed
        })
    }
}

fn inserted_card(session: &SessionState) -> Result<&Card, SessionError> {
    if !session.has_card_inserted() {
        return Err(SessionError::NoCardFound);
    }
    session.view_card().ok_or(SessionError::NoCardFound)
}
