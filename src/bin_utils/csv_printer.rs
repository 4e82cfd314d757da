use std::io::Write;

use anyhow::Context;
use csv::Writer;
use serde::Serialize;

use super::csv_parser::Operation;

/// Result of one executed script step.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub line: u64,
    pub op: Operation,
    pub result: String,
    pub value: Option<String>,
}

pub fn print_outcomes<W>(
    output: &mut W,
    outcomes: impl Iterator<Item = Outcome>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for outcome in outcomes {
        let line = outcome.line;
        writer
            .serialize(outcome)
            .with_context(|| format!("Failed to write outcome of script line {line}"))?;
    }
    writer.flush().context("Failed to flush outcomes")
}
