use std::fs::File;

use anyhow::{Context, Result};
use atm_session::bin_utils::{Service, logging};

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let accounts_path = args
        .next()
        .context("Expected the account fixture as the first argument")?;
    let script_path = args
        .next()
        .context("Expected the session script as the second argument")?;

    let accounts = File::open(&accounts_path)
        .with_context(|| format!("Failed to open `{accounts_path}`"))?;
    let script =
        File::open(&script_path).with_context(|| format!("Failed to open `{script_path}`"))?;

    let service = Service {
        accounts,
        script,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| eprintln!("Error at line {line}: {err}")),
    };
    service.run()
}
