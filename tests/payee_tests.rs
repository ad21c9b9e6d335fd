// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennyjar::commands::payees::{self, PayeeFilter, payee_id_for, query_payees};
use pennyjar::{cli, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO documents(id, name) VALUES (1, 'Home'), (2, 'Work');
        INSERT INTO payees(id, document_id, name, updated_at) VALUES
            (1, 1, 'Corner Bakery', '2025-01-05T08:00:00.000Z'),
            (2, 1, 'Bookshop', '2025-02-10T08:00:00.000Z'),
            (3, 1, 'Baker Street Rent', '2025-03-01T08:00:00.000Z'),
            (4, 2, 'Bakery Supplies', '2025-03-01T08:00:00.000Z');
    "#,
    )
    .unwrap();
    conn
}

fn names(conn: &Connection, filter: PayeeFilter) -> Vec<String> {
    query_payees(conn, 1, &filter)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

#[test]
fn list_is_scoped_and_ordered_by_name() {
    let conn = setup();
    assert_eq!(
        names(&conn, PayeeFilter::default()),
        ["Baker Street Rent", "Bookshop", "Corner Bakery"]
    );
}

#[test]
fn search_matches_part_of_the_name() {
    let conn = setup();
    let filter = PayeeFilter {
        search: Some("bake".into()),
        ..Default::default()
    };
    // LIKE is case-insensitive for ASCII
    assert_eq!(names(&conn, filter), ["Baker Street Rent", "Corner Bakery"]);
}

#[test]
fn updated_since_and_limit_filter_rows() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "pennyjar",
        "payee",
        "list",
        "-d",
        "Home",
        "--updated-since",
        "2025-02-01",
        "--limit",
        "1",
    ]);
    let (_, payee_m) = matches.subcommand().unwrap();
    let (_, list_m) = payee_m.subcommand().unwrap();
    assert!(payees::handle(&conn, payee_m).is_ok());

    let filter = PayeeFilter {
        updated_since: Some(
            chrono::NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        ),
        limit: list_m.get_one::<usize>("limit").copied(),
        ..Default::default()
    };
    assert_eq!(names(&conn, filter), ["Baker Street Rent"]);
}

#[test]
fn payees_are_created_once_per_document() {
    let conn = setup();
    assert_eq!(payee_id_for(&conn, 1, " Bookshop ").unwrap(), 2);
    let fresh = payee_id_for(&conn, 1, "Hardware Store").unwrap();
    assert_eq!(payee_id_for(&conn, 1, "Hardware Store").unwrap(), fresh);
    let other = payee_id_for(&conn, 2, "Hardware Store").unwrap();
    assert_ne!(fresh, other);

    assert!(payee_id_for(&conn, 1, "   ").is_err());
    assert!(payee_id_for(&conn, 1, &"x".repeat(256)).is_err());
}

#[test]
fn adding_an_existing_payee_fails() {
    let conn = setup();
    let matches = cli::build_cli()
        .get_matches_from(["pennyjar", "payee", "add", "-d", "Home", "--name", "Bookshop"]);
    let (_, payee_m) = matches.subcommand().unwrap();
    let err = payees::handle(&conn, payee_m).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}
