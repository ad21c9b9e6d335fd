// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use pennyjar::Engine;
use pennyjar::errors::{Error, Result};
use pennyjar::ledger::{LedgerStore, SqliteLedger};
use pennyjar::models::{AccountBalance, Summary, UnitType};
use pennyjar::month::{Month, TimeWindow};
use pennyjar::summary::SummaryScheduler;
use rusqlite::params;
use std::sync::Arc;

const SCHEMA_SEED: &str = r#"
    INSERT INTO documents(id, name) VALUES (1, 'Home');
    INSERT INTO accounts(id, document_id, name) VALUES (1, 1, 'Checking');
"#;

fn setup() -> Engine {
    let ledger = SqliteLedger::open_in_memory().unwrap();
    ledger.conn().unwrap().execute_batch(SCHEMA_SEED).unwrap();
    Engine::new(Arc::new(ledger), 3).unwrap()
}

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn bare_txn(store: &SqliteLedger, time: &str, amount: i64) {
    store
        .conn()
        .unwrap()
        .execute(
            "INSERT INTO transactions(account_id, time, amount) VALUES (1, ?1, ?2)",
            params![time, amount],
        )
        .unwrap();
}

/// Delegates to SQLite but fails every balance read at the end of `broken`.
struct FlakyLedger {
    inner: SqliteLedger,
    broken: Month,
}

impl LedgerStore for FlakyLedger {
    fn document_exists(&self, document_id: i64) -> Result<bool> {
        self.inner.document_exists(document_id)
    }

    fn sum_units(
        &self,
        document_id: i64,
        types: &[Option<UnitType>],
        window: TimeWindow,
    ) -> Result<i64> {
        self.inner.sum_units(document_id, types, window)
    }

    fn sum_portions(&self, document_id: i64, from: Option<Month>, to: Month) -> Result<i64> {
        self.inner.sum_portions(document_id, from, to)
    }

    fn sum_bare_transactions(&self, document_id: i64, window: TimeWindow) -> Result<i64> {
        self.inner.sum_bare_transactions(document_id, window)
    }

    fn account_balances(
        &self,
        document_id: i64,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<AccountBalance>> {
        if cutoff == self.broken.end() {
            return Err(Error::Store("disk unavailable".into()));
        }
        self.inner.account_balances(document_id, cutoff)
    }

    fn find_summary(&self, document_id: i64, month: Month) -> Result<Option<Summary>> {
        self.inner.find_summary(document_id, month)
    }

    fn summaries_from(&self, document_id: i64, month: Month) -> Result<Vec<Summary>> {
        self.inner.summaries_from(document_id, month)
    }

    fn save_summary(&self, summary: &Summary) -> Result<i64> {
        self.inner.save_summary(summary)
    }
}

#[test]
fn cascade_updates_from_changed_month_only() {
    let engine = setup();
    for m in ["2025-02", "2025-03", "2025-04", "2025-05"] {
        engine.get_or_create(1, m).unwrap();
    }

    bare_txn(engine.store(), "2025-03-09T10:00:00.000Z", -300);
    bare_txn(engine.store(), "2025-02-09T10:00:00.000Z", -50);

    // stored rows are returned as-is until recalculated
    assert_eq!(engine.get_or_create(1, "2025-03").unwrap().available, 0);

    let updated = engine.recalculate_from(1, "2025-03").unwrap();
    let months: Vec<String> = updated.iter().map(|s| s.month.to_string()).collect();
    assert_eq!(months, ["2025-03", "2025-04", "2025-05"]);

    let store = engine.store();
    let feb = store.find_summary(1, month("2025-02")).unwrap().unwrap();
    assert_eq!(feb.available, 0);
    assert_eq!(feb.unbudgeted, 0);

    let mar = store.find_summary(1, month("2025-03")).unwrap().unwrap();
    assert_eq!(mar.unbudgeted, -300);
    assert_eq!(mar.available, -350);
    assert_eq!(mar.available_last_month, -50);

    for m in ["2025-04", "2025-05"] {
        let s = store.find_summary(1, month(m)).unwrap().unwrap();
        assert_eq!(s.available, -350);
        assert_eq!(s.unbudgeted, 0);
        assert_eq!(s.balance, -350);
    }
}

#[test]
fn change_hook_only_touches_existing_rows() {
    let engine = setup();
    engine.get_or_create(1, "2025-06").unwrap();
    bare_txn(engine.store(), "2025-05-01T00:00:00.000Z", -75);

    let updated = engine.recalculate_after_change(1, month("2025-05")).unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].available, -75);
    assert!(engine.store().find_summary(1, month("2025-05")).unwrap().is_none());
}

#[test]
fn invalid_month_is_rejected_before_any_work() {
    let engine = setup();
    assert!(matches!(
        engine.get_or_create(1, "2025-13"),
        Err(Error::InvalidMonth(_))
    ));
    assert!(matches!(
        engine.get_or_create(1, ""),
        Err(Error::InvalidMonth(_))
    ));
    assert!(matches!(
        engine.recalculate_from(1, "March"),
        Err(Error::InvalidMonth(_))
    ));
    let count: i64 = engine
        .store()
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM summaries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn missing_document_fabricates_nothing() {
    let engine = setup();
    match engine.get_or_create(42, "2025-01") {
        Err(Error::DocumentNotFound(id)) => assert_eq!(id, 42),
        other => panic!("expected DocumentNotFound, got {:?}", other),
    }
    assert!(matches!(
        engine.recalculate_from(42, "2025-01"),
        Err(Error::DocumentNotFound(42))
    ));
    assert!(engine.store().find_summary(42, month("2025-01")).unwrap().is_none());
}

#[test]
fn failed_months_are_reported_after_the_rest_finish() {
    let inner = SqliteLedger::open_in_memory().unwrap();
    inner.conn().unwrap().execute_batch(SCHEMA_SEED).unwrap();
    for m in ["2025-01", "2025-02", "2025-03", "2025-04"] {
        inner.save_summary(&Summary::new(1, month(m))).unwrap();
    }
    bare_txn(&inner, "2025-01-20T00:00:00.000Z", -40);

    let flaky = FlakyLedger {
        inner,
        broken: month("2025-03"),
    };
    let scheduler = SummaryScheduler::new(Arc::new(flaky), 2).unwrap();

    match scheduler.recalculate_from(1, "2025-01") {
        Err(Error::Recalculation {
            failed,
            total,
            first,
        }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 4);
            assert!(matches!(*first, Error::Store(_)));
        }
        other => panic!("expected Recalculation error, got {:?}", other),
    }

    let store = scheduler.store();
    for m in ["2025-01", "2025-02", "2025-04"] {
        assert_eq!(store.find_summary(1, month(m)).unwrap().unwrap().available, -40);
    }
    // the failed month keeps its previous figures
    assert_eq!(
        store.find_summary(1, month("2025-03")).unwrap().unwrap().available,
        0
    );
}

#[test]
fn failed_create_persists_nothing() {
    let inner = SqliteLedger::open_in_memory().unwrap();
    inner.conn().unwrap().execute_batch(SCHEMA_SEED).unwrap();
    let flaky = FlakyLedger {
        inner,
        broken: month("2025-07"),
    };
    let scheduler = SummaryScheduler::new(Arc::new(flaky), 1).unwrap();

    let err = scheduler.get_or_create(1, "2025-07").unwrap_err();
    assert!(err.to_string().contains("disk unavailable"));
    assert!(scheduler.store().find_summary(1, month("2025-07")).unwrap().is_none());
    assert!(scheduler.get_or_create(1, "2025-08").is_ok());
}

#[test]
fn zero_threads_still_builds_a_pool() {
    let ledger = SqliteLedger::open_in_memory().unwrap();
    ledger.conn().unwrap().execute_batch(SCHEMA_SEED).unwrap();
    let engine = Engine::new(Arc::new(ledger), 0).unwrap();
    assert!(engine.get_or_create(1, "2025-01").is_ok());
}
