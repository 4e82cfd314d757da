use std::io::Read;

use csv::{StringRecord, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{AccountId, Amount, Card};

/// One account row of the bank fixture.
#[derive(Debug, Deserialize)]
pub struct AccountRecord {
    pub card_number: String,
    pub pin: String,
    pub account: AccountId,
    pub balance: Amount,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Remove,
    Pin,
    Accounts,
    Select,
    Balance,
    Deposit,
    Withdraw,
}

/// One row of a session script. Columns an operation does not use are left empty.
#[derive(Debug, Deserialize)]
pub struct ScriptStep {
    pub op: Operation,
    pub holder: Option<String>,
    pub number: Option<String>,
    pub pin: Option<String>,
    pub account: Option<AccountId>,
    pub amount: Option<Amount>,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Field `{field}` is required for {op:?}")]
    MissingField { op: Operation, field: &'static str },
    #[error("Malformed row: {0}")]
    Malformed(#[from] csv::Error),
}

/// Fully resolved script step, ready to run against a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    InsertCard(Card),
    RemoveCard,
    EnterPin(String),
    AccountIds,
    SelectAccount(AccountId),
    Balance(AccountId),
    Deposit(AccountId, Amount),
    Withdraw(AccountId, Amount),
}

impl ScriptStep {
    pub fn into_command(self) -> Result<SessionCommand, ScriptError> {
        let op = self.op;
        let required = |value: Option<String>, field: &'static str| {
            value
                .filter(|value| !value.is_empty())
                .ok_or(ScriptError::MissingField { op, field })
        };
        let amount = self.amount.ok_or(ScriptError::MissingField {
            op,
            field: "amount",
        });

        match op {
            Operation::Insert => Ok(SessionCommand::InsertCard(Card {
                holder_name: required(self.holder, "holder")?,
                number: required(self.number, "number")?,
            })),
            Operation::Remove => Ok(SessionCommand::RemoveCard),
            Operation::Pin => Ok(SessionCommand::EnterPin(required(self.pin, "pin")?)),
            Operation::Accounts => Ok(SessionCommand::AccountIds),
            Operation::Select => Ok(SessionCommand::SelectAccount(required(
                self.account,
                "account",
            )?)),
            Operation::Balance => Ok(SessionCommand::Balance(required(self.account, "account")?)),
            Operation::Deposit => Ok(SessionCommand::Deposit(
                required(self.account, "account")?,
                amount?,
            )),
            Operation::Withdraw => Ok(SessionCommand::Withdraw(
                required(self.account, "account")?,
                amount?,
            )),
        }
    }
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(source)
}

/// Reads the whole bank fixture.
pub fn parse_accounts<R: Read>(source: R) -> Result<Vec<AccountRecord>, csv::Error> {
    reader(source).into_deserialize().collect()
}

/// Parses a session script row by row, yielding the line each step came from.
pub struct CsvScriptParser<R> {
    reader: csv::Reader<R>,
    headers: Option<StringRecord>,
    record: StringRecord,
    done: bool,
}

impl<R> CsvScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        Self {
            reader: reader(source),
            headers: None,
            record: StringRecord::new(),
            done: false,
        }
    }

    fn parse_record(&self) -> Result<(Operation, SessionCommand), ScriptError> {
        let step: ScriptStep = self.record.deserialize(self.headers.as_ref())?;
        let op = step.op;
        Ok((op, step.into_command()?))
    }
}

impl<R> Iterator for CsvScriptParser<R>
where
    R: Read,
{
    type Item = (u64, Result<(Operation, SessionCommand), ScriptError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.headers.is_none() {
            match self.reader.headers() {
                Ok(headers) => self.headers = Some(headers.clone()),
                Err(err) => {
                    self.done = true;
                    return Some((1, Err(err.into())));
                }
            }
        }

        let curr_line = self.reader.position().line();
        match self.reader.read_record(&mut self.record) {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                let line = self
                    .record
                    .position()
                    .map_or(curr_line, |position| position.line());
                Some((line, self.parse_record()))
            }
            Err(err) => {
                // a broken source keeps failing, a bad row does not
                self.done = err.is_io_error();
                Some((curr_line, Err(err.into())))
            }
        }
    }
}
