use std::{cell::RefCell, rc::Rc, str::from_utf8};

use atm_session::bin_utils::{
    Service,
    csv_parser::{Operation, ScriptError},
};

const ACCOUNTS: &str = include_str!("accounts.csv");
const SESSION: &str = include_str!("session.csv");

#[test]
fn replay_session_script() {
    let mut output = Vec::new();
    let script_errors = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::clone(&script_errors);
    let service = Service {
        accounts: ACCOUNTS.as_bytes(),
        script: SESSION.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| errors.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "line,op,result,value",
            "2,balance,No card found,",
            "3,insert,ok,",
            "4,accounts,Pin number not validated,",
            "5,pin,Invalid pin number,",
            "6,accounts,No card found,",
            "7,insert,ok,",
            "8,pin,ok,",
            "9,accounts,ok,test_account_1;test_account_2",
            "10,select,No matching account id,",
            "11,balance,No account selected,",
            "12,select,ok,",
            "13,balance,ok,50",
            "14,deposit,ok,80",
            "15,withdraw,Withdrawal of 81 would overdraw balance of 80,",
            "16,withdraw,ok,0",
            "17,balance,Account id does not match,",
            "19,remove,ok,",
            "20,remove,No card found,",
        ]
    );

    let script_errors = script_errors.borrow();
    assert_eq!(script_errors.len(), 1);
    assert!(matches!(
        script_errors[0],
        (
            18,
            ScriptError::MissingField {
                op: Operation::Withdraw,
                field: "amount"
            }
        )
    ));
}

#[test]
fn unknown_card_number_fails_pin_check() {
    let mut output = Vec::new();
    let service = Service {
        accounts: ACCOUNTS.as_bytes(),
        script: "op,holder,number,pin,account,amount\ninsert,someone,0000,,,\npin,,,1111,,\naccounts,,,,,\n"
            .as_bytes(),
        output: &mut output,
        error_printer: Box::new(|line, err| panic!("unexpected script error at {line}: {err}")),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "line,op,result,value",
            "2,insert,ok,",
            "3,pin,Failed to check card pin number,",
            "4,accounts,Pin number not validated,",
        ]
    );
}

#[test]
fn broken_account_fixture_is_reported() {
    let mut output = Vec::new();
    let service = Service {
        accounts: "card_number,pin,account,balance\n1234,0000,checking,lots\n".as_bytes(),
        script: "op\n".as_bytes(),
        output: &mut output,
        error_printer: Box::new(|_, _| {}),
    };
    let err = service.run().unwrap_err();
    assert_eq!(err.to_string(), "Failed to read account fixture");
}

fn load_error(accounts: &str) -> String {
    let mut output = Vec::new();
    let service = Service {
        accounts: accounts.as_bytes(),
        script: "op\n".as_bytes(),
        output: &mut output,
        error_printer: Box::new(|_, _| {}),
    };
    format!("{:#}", service.run().unwrap_err())
}

#[test]
fn account_shared_between_cards_is_rejected() {
    let err = load_error(
        "card_number,pin,account,balance\n1234,0000,acct,50\n5678,1111,acct,1000\n",
    );
    assert_eq!(
        err,
        "Failed to open account `acct`: Account acct already belongs to card 1234"
    );
}

#[test]
fn conflicting_pin_is_rejected() {
    let err = load_error(
        "card_number,pin,account,balance\n1234,0000,checking,50\n1234,9999,savings,10\n",
    );
    assert_eq!(
        err,
        "Failed to register card `1234`: Card 1234 is already registered with a different pin"
    );
}
