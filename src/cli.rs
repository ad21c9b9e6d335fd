// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn document_arg() -> Arg {
    Arg::new("document")
        .long("document")
        .short('d')
        .required(true)
        .help("Document (budget book) name")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}

fn name_arg() -> Arg {
    Arg::new("name").long("name").required(true)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_parser(value_parser!(usize))
}

fn key_arg() -> Arg {
    Arg::new("key").long("key").required(true)
}

fn value_arg() -> Arg {
    Arg::new("value")
        .long("value")
        .required(true)
        .allow_hyphen_values(true)
}

pub fn build_cli() -> Command {
    Command::new("pennyjar")
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .arg(
            Arg::new("threads")
                .long("threads")
                .global(true)
                .env("PENNYJAR_THREADS")
                .value_parser(value_parser!(usize))
                .help("Worker threads used for summary recalculation"),
        )
        .subcommand(Command::new("init").about("Create or migrate the database"))
        .subcommand(
            Command::new("document")
                .about("Manage documents")
                .subcommand(Command::new("add").arg(name_arg()))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(Command::new("add").arg(document_arg()).arg(name_arg()))
                .subcommand(Command::new("list").arg(document_arg())),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(Command::new("add").arg(document_arg()).arg(name_arg()))
                .subcommand(Command::new("list").arg(document_arg())),
        )
        .subcommand(
            Command::new("budget")
                .about("Manage budgets (envelopes)")
                .subcommand(
                    Command::new("add")
                        .arg(document_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(name_arg()),
                )
                .subcommand(Command::new("list").arg(document_arg())),
        )
        .subcommand(
            Command::new("portion")
                .about("Monthly budget allocations")
                .subcommand(
                    Command::new("set")
                        .arg(document_arg())
                        .arg(Arg::new("budget").long("budget").required(true))
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        ),
                )
                .subcommand(
                    Command::new("move")
                        .arg(document_arg())
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .arg(document_arg())
                        .arg(Arg::new("month").long("month").required(true))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(document_arg())
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(
                            Arg::new("time")
                                .long("time")
                                .required(true)
                                .help("YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"),
                        )
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("payee").long("payee"))
                        .arg(Arg::new("memo").long("memo"))
                        .arg(
                            Arg::new("unit")
                                .long("unit")
                                .action(ArgAction::Append)
                                .allow_hyphen_values(true)
                                .help(
                                    "KIND:AMOUNT[:TARGET], KIND is unassigned, income, \
                                     income-next, budget (TARGET=budget) or transfer \
                                     (TARGET=account)",
                                ),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change time, amount, payee or memo; units are kept")
                        .arg(document_arg())
                        .arg(id_arg())
                        .arg(Arg::new("time").long("time"))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("payee").long("payee"))
                        .arg(Arg::new("memo").long("memo")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a transaction and its units")
                        .arg(document_arg())
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .arg(document_arg())
                        .arg(Arg::new("month").long("month"))
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("payee")
                .about("Manage payees")
                .subcommand(Command::new("add").arg(document_arg()).arg(name_arg()))
                .subcommand(
                    Command::new("list")
                        .arg(document_arg())
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('q')
                                .help("Only payees whose name contains this text"),
                        )
                        .arg(
                            Arg::new("updated-since")
                                .long("updated-since")
                                .help("YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"),
                        )
                        .arg(limit_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Monthly summaries")
                .subcommand(
                    Command::new("show")
                        .arg(document_arg())
                        .arg(Arg::new("month").long("month").required(true))
                        .args(json_args()),
                )
                .subcommand(Command::new("list").arg(document_arg()).args(json_args()))
                .subcommand(
                    Command::new("recalc")
                        .arg(document_arg())
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .help("First month to refresh (default: earliest stored)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report").about("Reports").subcommand(
                Command::new("balances")
                    .arg(document_arg())
                    .arg(Arg::new("month").long("month"))
                    .args(json_args()),
            ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("summaries")
                    .arg(document_arg())
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
        .subcommand(
            Command::new("settings")
                .about("Per-document key/value settings (JSON values)")
                .subcommand(
                    Command::new("set")
                        .about("Create a setting; the key must be new in the document")
                        .arg(document_arg())
                        .arg(key_arg())
                        .arg(value_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change the value of an existing setting")
                        .arg(document_arg())
                        .arg(key_arg())
                        .arg(value_arg()),
                )
                .subcommand(Command::new("get").arg(document_arg()).arg(key_arg()))
                .subcommand(Command::new("list").arg(document_arg()).args(json_args())),
        )
}
