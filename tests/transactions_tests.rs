// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennyjar::Engine;
use pennyjar::commands::transactions::{self, UnitSpec, parse_unit_spec};
use pennyjar::ledger::{LedgerStore, SqliteLedger};
use pennyjar::models::UnitType;
use pennyjar::{cli, month::Month};
use std::sync::Arc;

fn setup() -> Engine {
    let ledger = SqliteLedger::open_in_memory().unwrap();
    ledger
        .conn()
        .unwrap()
        .execute_batch(
            r#"
        INSERT INTO documents(id, name) VALUES (1, 'Home'), (2, 'Work');
        INSERT INTO accounts(id, document_id, name) VALUES (1, 1, 'Checking'), (2, 1, 'Savings');
        INSERT INTO categories(id, document_id, name) VALUES (1, 1, 'Living');
        INSERT INTO budgets(id, category_id, name) VALUES (1, 1, 'Groceries');
        INSERT INTO transactions(id, account_id, time, amount) VALUES
            (1, 1, '2025-01-01T00:00:00.000Z', -1000),
            (2, 1, '2025-01-02T00:00:00.000Z', -1000),
            (3, 1, '2025-01-03T00:00:00.000Z', -1000);
    "#,
        )
        .unwrap();
    Engine::new(Arc::new(ledger), 2).unwrap()
}

fn run_tx(engine: &Engine, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pennyjar", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, tx_m) = matches.subcommand().unwrap();
    transactions::handle(engine, tx_m)
}

#[test]
fn list_limit_respected() {
    let engine = setup();
    let matches =
        cli::build_cli().get_matches_from(["pennyjar", "tx", "list", "-d", "Home", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let conn = engine.store().conn().unwrap();
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].time, "2025-01-03T00:00:00.000Z");
            assert_eq!(rows[0].amount, -1000);
            assert_eq!(rows[0].units, 0);
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_filters_by_month() {
    let engine = setup();
    run_tx(
        &engine,
        &["add", "-d", "Home", "--account", "Checking", "--time", "2025-02-14", "--amount", "-5"],
    )
    .unwrap();
    let matches = cli::build_cli()
        .get_matches_from(["pennyjar", "tx", "list", "-d", "Home", "--month", "2025-02"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&engine.store().conn().unwrap(), list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, -500);
}

#[test]
fn adding_income_refreshes_stored_summary() {
    let engine = setup();
    engine.get_or_create(1, "2025-03").unwrap();

    run_tx(
        &engine,
        &[
            "add", "-d", "Home", "--account", "Checking", "--time", "2025-03-05",
            "--amount", "1000", "--payee", "Employer", "--unit", "income:1000",
        ],
    )
    .unwrap();

    let march: Month = "2025-03".parse().unwrap();
    let stored = engine.store().find_summary(1, march).unwrap().unwrap();
    assert_eq!(stored.income, 100000);
    assert_eq!(stored.available, 100000 - 3000);
    assert_eq!(stored.balance, 100000 - 3000);

    let matches = cli::build_cli()
        .get_matches_from(["pennyjar", "tx", "list", "-d", "Home", "--limit", "1"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&engine.store().conn().unwrap(), list_m).unwrap();
    assert_eq!(rows[0].id, 4);
    assert_eq!(rows[0].payee, "Employer");
}

fn bare_txn(engine: &Engine, id: i64, time: &str, amount: i64) {
    engine
        .store()
        .conn()
        .unwrap()
        .execute(
            "INSERT INTO transactions(id, account_id, time, amount) VALUES (?1, 1, ?2, ?3)",
            rusqlite::params![id, time, amount],
        )
        .unwrap();
}

#[test]
fn moving_a_transaction_back_a_month_refreshes_both_months() {
    let engine = setup();
    bare_txn(&engine, 10, "2025-04-12T09:00:00.000Z", -2500);
    engine.get_or_create(1, "2025-03").unwrap();
    engine.get_or_create(1, "2025-04").unwrap();

    run_tx(&engine, &["edit", "-d", "Home", "--id", "10", "--time", "2025-03-20"]).unwrap();

    let store = engine.store();
    let march = store.find_summary(1, "2025-03".parse().unwrap()).unwrap().unwrap();
    assert_eq!(march.unbudgeted, -2500);
    assert_eq!(march.available, -5500);
    assert_eq!(march.balance, -5500);

    let april = store.find_summary(1, "2025-04".parse().unwrap()).unwrap().unwrap();
    assert_eq!(april.unbudgeted, 0);
    assert_eq!(april.available, -5500);
    assert_eq!(april.available_last_month, -5500);
}

#[test]
fn editing_an_amount_refreshes_later_months() {
    let engine = setup();
    engine.get_or_create(1, "2025-03").unwrap();

    run_tx(&engine, &["edit", "-d", "Home", "--id", "1", "--amount", "-5", "--memo", "fixed"])
        .unwrap();

    let march = engine
        .store()
        .find_summary(1, "2025-03".parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(march.available, -2500);
    assert_eq!(march.balance, -2500);

    let (time, memo): (String, String) = engine
        .store()
        .conn()
        .unwrap()
        .query_row("SELECT time, memo FROM transactions WHERE id=1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(time, "2025-01-01T00:00:00.000Z");
    assert_eq!(memo, "fixed");
}

#[test]
fn deleting_a_transaction_refreshes_later_months() {
    let engine = setup();
    for m in ["2025-03", "2025-04", "2025-05"] {
        engine.get_or_create(1, m).unwrap();
    }
    run_tx(
        &engine,
        &[
            "add", "-d", "Home", "--account", "Checking", "--time", "2025-03-02",
            "--amount", "50", "--unit", "income:50",
        ],
    )
    .unwrap();
    let may: Month = "2025-05".parse().unwrap();
    assert_eq!(engine.store().find_summary(1, may).unwrap().unwrap().available, 2000);

    run_tx(&engine, &["delete", "-d", "Home", "--id", "4"]).unwrap();

    let store = engine.store();
    for m in ["2025-03", "2025-04", "2025-05"] {
        let s = store.find_summary(1, m.parse().unwrap()).unwrap().unwrap();
        assert_eq!(s.income, 0);
        assert_eq!(s.available, -3000);
        assert_eq!(s.balance, -3000);
    }
    let units: i64 = store
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM units", [], |r| r.get(0))
        .unwrap();
    assert_eq!(units, 0);
}

#[test]
fn edit_and_delete_stay_inside_the_document() {
    let engine = setup();
    let err = run_tx(&engine, &["delete", "-d", "Work", "--id", "1"]).unwrap_err();
    assert!(err.to_string().contains("not found"));
    let err = run_tx(&engine, &["edit", "-d", "Work", "--id", "1", "--amount", "1"]).unwrap_err();
    assert!(err.to_string().contains("not found"));

    let err = run_tx(&engine, &["edit", "-d", "Home", "--id", "1"]).unwrap_err();
    assert!(err.to_string().contains("Nothing to change"));

    let count: i64 = engine
        .store()
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM transactions WHERE amount=-1000", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn split_units_are_written_together() {
    let engine = setup();
    run_tx(
        &engine,
        &[
            "add", "-d", "Home", "--account", "Checking", "--time", "2025-03-09T12:30:00",
            "--amount", "-60", "--unit", "budget:-40:Groceries", "--unit", "transfer:-20:Savings",
        ],
    )
    .unwrap();

    let conn = engine.store().conn().unwrap();
    let (budget, transfer): (Option<i64>, Option<i64>) = conn
        .query_row(
            "SELECT
                (SELECT budget_id FROM units WHERE type='BUDGET'),
                (SELECT transfer_account_id FROM units WHERE type='TRANSFER')",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(budget, Some(1));
    assert_eq!(transfer, Some(2));
    let time: String = conn
        .query_row("SELECT time FROM transactions ORDER BY id DESC LIMIT 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(time, "2025-03-09T12:30:00.000Z");
}

#[test]
fn rejected_unit_leaves_no_transaction() {
    let engine = setup();
    let err = run_tx(
        &engine,
        &[
            "add", "-d", "Home", "--account", "Checking", "--time", "2025-03-09",
            "--amount", "-10", "--unit", "transfer:-10:Checking",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("different account"));
    let count: i64 = engine
        .store()
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 3);

    let err = run_tx(
        &engine,
        &[
            "add", "-d", "Home", "--account", "Checking", "--time", "2025-03-09",
            "--amount", "10", "--unit", "income:10:Groceries",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("does not take a target"));
}

#[test]
fn unit_specs_parse() {
    assert_eq!(
        parse_unit_spec("income-next:12.50").unwrap(),
        UnitSpec {
            unit_type: Some(UnitType::IncomeNext),
            amount: 1250,
            target: None,
        }
    );
    assert_eq!(parse_unit_spec("none:-3").unwrap().unit_type, None);
    assert_eq!(
        parse_unit_spec("BUDGET:-4:Rent").unwrap().target.as_deref(),
        Some("Rent")
    );
    assert!(parse_unit_spec("budget:-4").is_err());
    assert!(parse_unit_spec("transfer:5").is_err());
    assert!(parse_unit_spec("refund:5").is_err());
    assert!(parse_unit_spec("income").is_err());
    assert!(parse_unit_spec("income:1.234").is_err());
}
