// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Developer commands for the ferry booking workspace: lint, build, test,
//! dependency audits and migration verification.
//!
//! ### Migration verification
//!
//! `cargo xtask verify-migrations` applies the embedded `SQLite`
//! migrations to a scratch in-memory database, reverts them, and applies
//! them again. It fails if reverting leaves anything behind, if the second
//! application produces different DDL from the first, or if a foreign key
//! names a table that does not exist.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::{io, process::Output};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    eyre::{bail, eyre, Context},
    Result,
};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Lint, audit dependencies, build, test and verify migrations
    CI,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Audit dependencies with cargo-deny
    #[command(visible_alias = "cd")]
    Deny,

    /// Clippy plus a formatting check
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check formatting with nightly rustfmt
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Format the workspace with nightly rustfmt
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run all tests, doc tests included
    #[command(visible_alias = "t")]
    Test,

    /// Verify migrations apply, revert and re-apply cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => {
                lint()?;
                run_cargo(&["deny", "check"])?;
                run_cargo(&["build", "--all-targets", "--all-features"])?;
                test()?;
                verify_migrations()
            }
            Self::Build => run_cargo(&["build", "--all-targets", "--all-features"]),
            Self::Check => run_cargo(&["check", "--all-targets", "--all-features"]),
            Self::Deny => run_cargo(&["deny", "check"]),
            Self::Lint => lint(),
            Self::LintClippy => run_cargo(&CLIPPY),
            Self::LintFormatting => run_cargo_nightly(&["fmt", "--all", "--check"]),
            Self::FixClippy => {
                let mut args: Vec<&str> = CLIPPY[..3].to_vec();
                args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
                args.extend(&CLIPPY[3..]);
                run_cargo(&args)
            }
            Self::FixFormatting => run_cargo_nightly(&["fmt", "--all"]),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

const CLIPPY: [&str; 6] = [
    "clippy",
    "--all-targets",
    "--all-features",
    "--",
    "-D",
    "warnings",
];

fn lint() -> Result<()> {
    run_cargo(&CLIPPY)?;
    run_cargo_nightly(&["fmt", "--all", "--check"])
}

fn test() -> Result<()> {
    run_cargo(&["test", "--all-targets", "--all-features"])?;
    // doc tests last, they are the slow part
    run_cargo(&["test", "--doc", "--all-features"])
}

fn run_cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args.iter().copied()).run_with_trace()?;
    Ok(())
}

fn run_cargo_nightly(args: &[&str]) -> Result<()> {
    cmd("cargo", args.iter().copied())
        // CARGO is set because we run as a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    sql: String,
}

#[derive(QueryableByName)]
struct ForeignKeyTarget {
    #[diesel(sql_type = Text)]
    from_table: String,
    #[diesel(sql_type = Text)]
    to_table: String,
}

/// Name to DDL of every table and index the migrations own.
fn schema_ddl(conn: &mut SqliteConnection) -> Result<BTreeMap<String, String>> {
    let objects: Vec<SchemaObject> = diesel::sql_query(
        "SELECT name, sql FROM sqlite_master \
         WHERE sql IS NOT NULL \
         AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations'",
    )
    .load(conn)
    .wrap_err("Failed to read sqlite_master")?;

    Ok(objects
        .into_iter()
        .map(|o| (o.name, o.sql.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect())
}

fn check_foreign_keys(conn: &mut SqliteConnection) -> Result<()> {
    let dangling: Vec<ForeignKeyTarget> = diesel::sql_query(
        "SELECT m.name AS from_table, fk.\"table\" AS to_table \
         FROM sqlite_master m, pragma_foreign_key_list(m.name) fk \
         WHERE m.type = 'table' \
         AND fk.\"table\" NOT IN (SELECT name FROM sqlite_master WHERE type = 'table')",
    )
    .load(conn)
    .wrap_err("Failed to list foreign keys")?;

    if !dangling.is_empty() {
        let names: Vec<String> = dangling
            .iter()
            .map(|fk| format!("{} -> {}", fk.from_table, fk.to_table))
            .collect();
        bail!("❌ Foreign keys reference missing tables: {}", names.join(", "));
    }
    Ok(())
}

/// Verify the persistence migrations are reversible and self-consistent.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    let applied = schema_ddl(&mut conn)?;
    check_foreign_keys(&mut conn)?;

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover = schema_ddl(&mut conn)?;
    if !leftover.is_empty() {
        let names: Vec<&str> = leftover.keys().map(String::as_str).collect();
        bail!("❌ Objects left after revert: {}", names.join(", "));
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    let reapplied = schema_ddl(&mut conn)?;
    if reapplied != applied {
        let changed: BTreeSet<&str> = applied
            .keys()
            .chain(reapplied.keys())
            .filter(|name| applied.get(*name) != reapplied.get(*name))
            .map(String::as_str)
            .collect();
        let changed: Vec<&str> = changed.into_iter().collect();
        bail!("❌ Re-applied schema differs for: {}", changed.join(", "));
    }

    tracing::info!(objects = applied.len(), "✓ Migration verification passed");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command may have scrolled off the screen, so repeat it
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
