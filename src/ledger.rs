// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read/write seam between the summary engine and wherever the ledger lives.

use crate::errors::{Error, Result};
use crate::models::{AccountBalance, Summary, UnitType};
use crate::month::{Month, TimeWindow, format_instant};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use std::sync::{Mutex, MutexGuard};

/// Everything the engine needs from the ledger. Sums over no matching rows
/// are `Ok(0)`; only a failed read is an `Err`.
pub trait LedgerStore: Send + Sync {
    fn document_exists(&self, document_id: i64) -> Result<bool>;

    /// Sum of unit amounts whose type is in `types` (`None` matches untyped
    /// units) and whose transaction time falls inside `window`.
    fn sum_units(
        &self,
        document_id: i64,
        types: &[Option<UnitType>],
        window: TimeWindow,
    ) -> Result<i64>;

    /// Sum of portion budgets with `from <= month <= to`.
    fn sum_portions(&self, document_id: i64, from: Option<Month>, to: Month) -> Result<i64>;

    /// Sum of amounts of transactions that carry no units.
    fn sum_bare_transactions(&self, document_id: i64, window: TimeWindow) -> Result<i64>;

    /// Balance breakdown of every account of the document up to `cutoff`.
    fn account_balances(
        &self,
        document_id: i64,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<AccountBalance>>;

    fn find_summary(&self, document_id: i64, month: Month) -> Result<Option<Summary>>;

    /// Stored summaries with month >= `month`, oldest first.
    fn summaries_from(&self, document_id: i64, month: Month) -> Result<Vec<Summary>>;

    /// Inserts or fully overwrites the (document, month) row; returns its id.
    fn save_summary(&self, summary: &Summary) -> Result<i64>;
}

/// SQLite-backed ledger. Statements share one connection behind a mutex.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn new(conn: Connection) -> Self {
        SqliteLedger {
            conn: Mutex::new(conn),
        }
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        crate::db::init_schema(&mut conn)?;
        Ok(SqliteLedger::new(conn))
    }

    /// Locks the connection. Drop the guard before calling back into the
    /// engine, which takes the same lock.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("ledger connection lock poisoned".into()))
    }
}

const SUMMARY_COLUMNS: &str = "id, month, available, available_last_month, income, budgeted, \
                               unbudgeted, outflow, balance, document_id";

fn summary_from_row(r: &Row<'_>) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: Some(r.get(0)?),
        month: r.get(1)?,
        available: r.get(2)?,
        available_last_month: r.get(3)?,
        income: r.get(4)?,
        budgeted: r.get(5)?,
        unbudgeted: r.get(6)?,
        outflow: r.get(7)?,
        balance: r.get(8)?,
        document_id: r.get(9)?,
    })
}

impl LedgerStore for SqliteLedger {
    fn document_exists(&self, document_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM documents WHERE id=?1",
                params![document_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn sum_units(
        &self,
        document_id: i64,
        types: &[Option<UnitType>],
        window: TimeWindow,
    ) -> Result<i64> {
        if types.is_empty() {
            return Ok(0);
        }
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![
            Box::new(document_id),
            Box::new(window.start_text()),
            Box::new(window.end_text()),
        ];
        let mut type_clauses = Vec::new();
        for t in types {
            match t {
                None => type_clauses.push("u.type IS NULL".to_string()),
                Some(t) => {
                    params_vec.push(Box::new(t.as_str()));
                    type_clauses.push(format!("u.type = ?{}", params_vec.len()));
                }
            }
        }
        let sql = format!(
            "SELECT IFNULL(SUM(u.amount), 0)
             FROM units u
             JOIN transactions t ON t.id=u.transaction_id
             JOIN accounts a ON a.id=t.account_id
             WHERE a.document_id=?1
               AND (?2 IS NULL OR t.time>=?2)
               AND t.time<=?3
               AND ({})",
            type_clauses.join(" OR ")
        );
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let total: i64 = stmt.query_row(rusqlite::params_from_iter(params_vec.iter()), |r| {
            r.get(0)
        })?;
        Ok(total)
    }

    fn sum_portions(&self, document_id: i64, from: Option<Month>, to: Month) -> Result<i64> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT IFNULL(SUM(p.budgeted), 0)
             FROM portions p
             JOIN budgets b ON b.id=p.budget_id
             JOIN categories c ON c.id=b.category_id
             WHERE c.document_id=?1
               AND (?2 IS NULL OR p.month>=?2)
               AND p.month<=?3",
        )?;
        let total: i64 = stmt.query_row(params![document_id, from, to], |r| r.get(0))?;
        Ok(total)
    }

    fn sum_bare_transactions(&self, document_id: i64, window: TimeWindow) -> Result<i64> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT IFNULL(SUM(t.amount), 0)
             FROM transactions t
             JOIN accounts a ON a.id=t.account_id
             WHERE a.document_id=?1
               AND (?2 IS NULL OR t.time>=?2)
               AND t.time<=?3
               AND NOT EXISTS (SELECT 1 FROM units u WHERE u.transaction_id=t.id)",
        )?;
        let total: i64 = stmt.query_row(
            params![document_id, window.start_text(), window.end_text()],
            |r| r.get(0),
        )?;
        Ok(total)
    }

    fn account_balances(
        &self,
        document_id: i64,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<AccountBalance>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT a.id,
               (SELECT IFNULL(SUM(t.amount), 0) FROM transactions t
                 WHERE t.account_id=a.id AND t.time<=?2
                   AND NOT EXISTS (SELECT 1 FROM units u WHERE u.transaction_id=t.id)),
               (SELECT IFNULL(SUM(u.amount), 0) FROM units u
                 JOIN transactions t ON t.id=u.transaction_id
                 WHERE t.account_id=a.id AND t.time<=?2
                   AND u.type IS NOT 'TRANSFER'),
               (SELECT IFNULL(SUM(u.amount), 0) FROM units u
                 JOIN transactions t ON t.id=u.transaction_id
                 WHERE t.account_id=a.id AND t.time<=?2
                   AND u.type='TRANSFER'),
               (SELECT IFNULL(SUM(u.amount), 0) FROM units u
                 JOIN transactions t ON t.id=u.transaction_id
                 WHERE u.transfer_account_id=a.id AND t.time<=?2
                   AND u.type='TRANSFER')
             FROM accounts a
             WHERE a.document_id=?1
             ORDER BY a.id",
        )?;
        let rows = stmt.query_map(params![document_id, format_instant(cutoff)], |r| {
            Ok(AccountBalance {
                account_id: r.get(0)?,
                bare: r.get(1)?,
                units: r.get(2)?,
                transfer_source: r.get(3)?,
                transfer_destination: r.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn find_summary(&self, document_id: i64, month: Month) -> Result<Option<Summary>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM summaries WHERE document_id=?1 AND month=?2",
            SUMMARY_COLUMNS
        );
        let found = conn
            .query_row(&sql, params![document_id, month], summary_from_row)
            .optional()?;
        Ok(found)
    }

    fn summaries_from(&self, document_id: i64, month: Month) -> Result<Vec<Summary>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM summaries WHERE document_id=?1 AND month>=?2 ORDER BY month",
            SUMMARY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![document_id, month], summary_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn save_summary(&self, summary: &Summary) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            "INSERT INTO summaries(document_id, month, available, available_last_month, income,
                                   budgeted, unbudgeted, outflow, balance, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
             ON CONFLICT(document_id, month) DO UPDATE SET
                available=excluded.available,
                available_last_month=excluded.available_last_month,
                income=excluded.income,
                budgeted=excluded.budgeted,
                unbudgeted=excluded.unbudgeted,
                outflow=excluded.outflow,
                balance=excluded.balance,
                updated_at=excluded.updated_at
             RETURNING id",
            params![
                summary.document_id,
                summary.month,
                summary.available,
                summary.available_last_month,
                summary.income,
                summary.budgeted,
                summary.unbudgeted,
                summary.outflow,
                summary.balance
            ],
            |r| r.get(0),
        )?;
        Ok(id)
    }
}
