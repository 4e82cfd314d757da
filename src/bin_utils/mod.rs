//! Replays a CSV session script against a controller wired to the in-memory
//! card reader and bank, so the session rules can be exercised end to end.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv_parser::{CsvScriptParser, Operation, ScriptError, SessionCommand, parse_accounts};
use csv_printer::{Outcome, print_outcomes};
use tracing::debug;

use crate::{
    controller::{SessionController, SessionError},
    service::{
        AccountService, CardService,
        in_memory::{InMemoryBank, InMemoryCardReader},
    },
};

pub mod csv_parser;
pub mod csv_printer;
pub mod logging;

pub struct Service<'w, A, S, W: 'w> {
    pub accounts: A,
    pub script: S,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, ScriptError)>,
}

impl<'w, A, S, W> Service<'w, A, S, W>
where
    A: Read,
    S: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let bank = load_bank(self.accounts)?;
        let mut controller = SessionController::new(InMemoryCardReader::default(), bank);

        let mut outcomes = Vec::new();
        for (line, step) in CsvScriptParser::new(self.script) {
            match step {
                Ok((op, command)) => {
                    debug!(line, ?command, "executing step");
                    outcomes.push(execute(&mut controller, line, op, command));
                }
                Err(err) => (self.error_printer)(line, err),
            }
        }

        print_outcomes(self.output, outcomes.into_iter())
    }
}

fn load_bank<R: Read>(source: R) -> Result<InMemoryBank> {
    let records = parse_accounts(source).context("Failed to read account fixture")?;
    let mut bank = InMemoryBank::default();
    for record in records {
        bank.register_card(&record.card_number, &record.pin)
            .with_context(|| format!("Failed to register card `{}`", record.card_number))?;
        bank.open_account(&record.card_number, &record.account, record.balance)
            .with_context(|| format!("Failed to open account `{}`", record.account))?;
    }
    Ok(bank)
}

fn execute<C, A>(
    controller: &mut SessionController<C, A>,
    line: u64,
    op: Operation,
    command: SessionCommand,
) -> Outcome
where
    C: CardService,
    A: AccountService,
{
    let result: Result<Option<String>, SessionError> = match command {
        SessionCommand::InsertCard(card) => controller.insert_card(card).map(|_| None),
        SessionCommand::RemoveCard => controller.remove_card().map(|_| None),
        SessionCommand::EnterPin(pin) => controller.enter_pin(&pin).map(|_| None),
        SessionCommand::AccountIds => controller.account_ids().map(|ids| Some(ids.join(";"))),
        SessionCommand::SelectAccount(id) => controller.select_account(&id).map(|_| None),
        SessionCommand::Balance(id) => controller
            .balance(&id)
            .map(|balance| Some(balance.to_string())),
        SessionCommand::Deposit(id, amount) => controller
            .make_deposit(&id, amount)
            .map(|balance| Some(balance.to_string())),
        SessionCommand::Withdraw(id, amount) => controller
            .make_withdrawal(&id, amount)
            .map(|balance| Some(balance.to_string())),
    };

    match result {
        Ok(value) => Outcome {
            line,
            op,
            result: "ok".to_string(),
            value,
        },
        Err(err) => Outcome {
            line,
            op,
            result: err.to_string(),
            value: None,
        },
    }
}
