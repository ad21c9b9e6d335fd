// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::commands::documents::list_documents;
use crate::commands::summaries::stored_summaries;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(engine: &Engine) -> Result<()> {
    let rows = diagnose(engine)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

fn transfer_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Transfers that name no counterpart account
    let mut stmt = conn.prepare(
        "SELECT u.id, u.transaction_id FROM units u
         WHERE u.type='TRANSFER' AND u.transfer_account_id IS NULL ORDER BY u.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let (unit, txn): (i64, i64) = (r.get(0)?, r.get(1)?);
        rows.push(vec![
            "transfer_without_counterpart".into(),
            format!("unit {} (transaction {})", unit, txn),
        ]);
    }

    // 2) Transfers leaving the document; their legs no longer cancel
    let mut stmt2 = conn.prepare(
        "SELECT u.id, u.transaction_id FROM units u
         JOIN transactions t ON t.id=u.transaction_id
         JOIN accounts src ON src.id=t.account_id
         JOIN accounts dst ON dst.id=u.transfer_account_id
         WHERE u.type='TRANSFER' AND src.document_id != dst.document_id ORDER BY u.id",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let (unit, txn): (i64, i64) = (r.get(0)?, r.get(1)?);
        rows.push(vec![
            "transfer_cross_document".into(),
            format!("unit {} (transaction {})", unit, txn),
        ]);
    }

    // 3) Counterpart set on a unit that is not a transfer
    let mut stmt3 = conn.prepare(
        "SELECT u.id, u.transaction_id FROM units u
         WHERE u.type IS NOT 'TRANSFER' AND u.transfer_account_id IS NOT NULL ORDER BY u.id",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let (unit, txn): (i64, i64) = (r.get(0)?, r.get(1)?);
        rows.push(vec![
            "counterpart_on_non_transfer".into(),
            format!("unit {} (transaction {})", unit, txn),
        ]);
    }
    Ok(rows)
}

/// Every issue found, as (issue, detail) rows.
pub fn diagnose(engine: &Engine) -> Result<Vec<Vec<String>>> {
    let (mut rows, documents) = {
        let conn = engine.store().conn()?;
        (transfer_issues(&conn)?, list_documents(&conn)?)
    };

    // 4) Stored summaries that no longer match the ledger
    for doc in documents {
        for stored in stored_summaries(engine, doc.id)? {
            let fresh = engine.preview(doc.id, stored.month)?;
            if !stored.same_figures(&fresh) {
                rows.push(vec![
                    "stale_summary".into(),
                    format!("{} {}", doc.name, stored.month),
                ]);
            }
        }
    }
    Ok(rows)
}
