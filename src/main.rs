mod cli;
mod config;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use monthbook::domain::locate;
use monthbook::reconcile::Logged;
use monthbook::statement::{self, LogKind, StatementFormat};
use monthbook::{
    Book, Currency, EntryId, ExpenseEntry, ExpensePatch, IncomeEntry, IncomePatch, LedgerStore,
    LendDirection, LendingEntry, LendingPatch, LendingStatus, Money, PaymentMethod, PeriodKey,
    SqliteKv,
};

use crate::cli::{
    Cli, Command, ConfigCmd, ExpenseCmd, FormatArg, IncomeCmd, LendCmd, LogArg,
};
use crate::config::{AppConfig, app_paths, load_or_init_config, write_config};

type SqliteBook = Book<SqliteKv>;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("MONTHBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;

    let today = Local::now().date_naive();
    let period = match cli.month.as_deref() {
        Some(raw) => raw.parse::<PeriodKey>()?,
        None => PeriodKey::of(today),
    };

    let db_path = paths.db_path();
    let kv = SqliteKv::open(&db_path)
        .with_context(|| format!("Failed to open ledger DB {}", db_path.display()))?;
    let store = LedgerStore::new(kv);

    match cli.command {
        Command::Config(args) => handle_config(args.cmd, &store, &mut cfg, &cfg_path),
        Command::Periods => {
            let periods = store.periods()?;
            if periods.is_empty() {
                println!("(no periods)");
            }
            for p in periods {
                println!("{p}\t{}", p.label());
            }
            Ok(())
        }
        Command::Income(args) => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            handle_income(&mut book, args.cmd, today)
        }
        Command::Expense(args) => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            handle_expense(&mut book, args.cmd, &cfg, today)
        }
        Command::Lend(args) => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            handle_lend(&mut book, args.cmd, today)
        }
        Command::Transfer { amount } => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            let amount = Money::parse_decimal(&amount, book.primary().clone())?;
            book.transfer_wallet_to_savings(&amount)?;
            println!("Moved {amount} from wallet to savings.");
            print_balance(&book);
            Ok(())
        }
        Command::Save { amount } => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            let amount = Money::parse_decimal(&amount, book.primary().clone())?;
            book.credit_savings_directly(&amount)?;
            println!("Credited {amount} to savings.");
            print_balance(&book);
            Ok(())
        }
        Command::Balance => {
            print_balance(&open_book(store, &cfg, &cfg_path, period)?);
            Ok(())
        }
        Command::Summary => {
            let book = open_book(store, &cfg, &cfg_path, period)?;
            let summary = book.summary()?;
            println!("{}", book.period().label());
            print!("{}", statement::render_summary(&summary));
            Ok(())
        }
        Command::List { log, format } => {
            let book = open_book(store, &cfg, &cfg_path, period)?;
            let format = statement_format(format);
            let logs = match log {
                Some(LogArg::Income) => vec![LogKind::Income],
                Some(LogArg::Expenses) => vec![LogKind::Expenses],
                Some(LogArg::Lending) => vec![LogKind::Lending],
                None => vec![LogKind::Income, LogKind::Expenses, LogKind::Lending],
            };
            for kind in logs {
                print!("{}", statement::render_log(book.ledger(), kind, format));
            }
            Ok(())
        }
        Command::Statement { format } => {
            let book = open_book(store, &cfg, &cfg_path, period)?;
            let summary = book.summary()?;
            print!(
                "{}",
                statement::render_statement(book.ledger(), &summary, statement_format(format))
            );
            Ok(())
        }
        Command::Clear { yes } => {
            let mut book = open_book(store, &cfg, &cfg_path, period)?;
            let label = book.period().label();
            if !yes && !prompt_yes_no(&format!("Clear all entries for {label}? [y/N] "))? {
                println!("Aborted.");
                return Ok(());
            }
            book.clear()?;
            println!("Cleared {label}.");
            Ok(())
        }
    }
}

fn open_book(
    store: LedgerStore<SqliteKv>,
    cfg: &AppConfig,
    cfg_path: &Path,
    period: PeriodKey,
) -> Result<SqliteBook> {
    let primary = cfg
        .primary()
        .with_context(|| format!("Bad primary currency in {}", cfg_path.display()))?;
    Book::open(store, primary, period).with_context(|| format!("Failed to load {}", period.label()))
}

fn handle_income(book: &mut SqliteBook, cmd: IncomeCmd, today: NaiveDate) -> Result<()> {
    match cmd {
        IncomeCmd::Add {
            amount,
            currency,
            source,
            date,
            notes,
        } => {
            let entry = IncomeEntry {
                id: EntryId::new(),
                date: entry_date(date.as_deref(), book.period(), today)?,
                source,
                amount: Money::parse_decimal(&amount, Currency::new(&currency)?)?,
                notes: notes.unwrap_or_default(),
            };
            let shown = entry.amount.clone();
            let id = book.create(entry)?;
            println!("Added income {} {shown} to {}.", id.short(), book.period().label());
            print_balance(book);
        }
        IncomeCmd::Edit {
            id,
            amount,
            currency,
            source,
            date,
            notes,
        } => {
            let stored = stored_entry::<IncomeEntry>(book, &id)?;
            let patch = IncomePatch {
                date: date.as_deref().map(parse_date).transpose()?,
                source,
                amount: patch_money(&stored.amount, amount, currency)?,
                notes,
            };
            let updated = book.edit::<IncomeEntry>(&id, &patch)?;
            println!("Updated income {} ({}).", updated.id.short(), updated.amount);
            print_balance(book);
        }
        IncomeCmd::Rm { id } => {
            let removed = book.delete::<IncomeEntry>(&id)?;
            println!("Removed income {} ({}).", removed.id.short(), removed.amount);
            print_balance(book);
        }
    }
    Ok(())
}

fn handle_expense(
    book: &mut SqliteBook,
    cmd: ExpenseCmd,
    cfg: &AppConfig,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ExpenseCmd::Add {
            amount,
            currency,
            category,
            method,
            date,
            notes,
        } => {
            let entry = ExpenseEntry {
                id: EntryId::new(),
                date: entry_date(date.as_deref(), book.period(), today)?,
                category,
                amount: Money::parse_decimal(&amount, Currency::new(&currency)?)?,
                method: match method.as_deref() {
                    Some(raw) => parse_keyword::<PaymentMethod>(raw, "method")?,
                    None => cfg.default_method,
                },
                notes: notes.unwrap_or_default(),
            };
            let shown = entry.amount.clone();
            let id = book.create(entry)?;
            println!("Added expense {} {shown} to {}.", id.short(), book.period().label());
            print_balance(book);
        }
        ExpenseCmd::Edit {
            id,
            amount,
            currency,
            category,
            method,
            date,
            notes,
        } => {
            let stored = stored_entry::<ExpenseEntry>(book, &id)?;
            let patch = ExpensePatch {
                date: date.as_deref().map(parse_date).transpose()?,
                category,
                amount: patch_money(&stored.amount, amount, currency)?,
                method: method
                    .as_deref()
                    .map(|raw| parse_keyword::<PaymentMethod>(raw, "method"))
                    .transpose()?,
                notes,
            };
            let updated = book.edit::<ExpenseEntry>(&id, &patch)?;
            println!("Updated expense {} ({}).", updated.id.short(), updated.amount);
            print_balance(book);
        }
        ExpenseCmd::Rm { id } => {
            let removed = book.delete::<ExpenseEntry>(&id)?;
            println!("Removed expense {} ({}).", removed.id.short(), removed.amount);
            print_balance(book);
        }
    }
    Ok(())
}

fn handle_lend(book: &mut SqliteBook, cmd: LendCmd, today: NaiveDate) -> Result<()> {
    match cmd {
        LendCmd::Add {
            amount,
            currency,
            name,
            borrow,
            reason,
            date,
        } => {
            let entry = LendingEntry {
                id: EntryId::new(),
                date: entry_date(date.as_deref(), book.period(), today)?,
                counterparty: name,
                amount: Money::parse_decimal(&amount, Currency::new(&currency)?)?,
                reason: reason.unwrap_or_default(),
                direction: if borrow {
                    LendDirection::Borrow
                } else {
                    LendDirection::Lend
                },
                status: LendingStatus::Pending,
            };
            let summary = format!("{} {} {}", entry.direction, entry.amount, entry.counterparty);
            let id = book.create(entry)?;
            println!("Recorded {} {summary}.", id.short());
        }
        LendCmd::Edit {
            id,
            amount,
            currency,
            name,
            reason,
            direction,
            status,
            date,
        } => {
            let stored = stored_entry::<LendingEntry>(book, &id)?;
            let patch = LendingPatch {
                date: date.as_deref().map(parse_date).transpose()?,
                counterparty: name,
                amount: patch_money(&stored.amount, amount, currency)?,
                reason,
                direction: direction
                    .as_deref()
                    .map(|raw| parse_keyword::<LendDirection>(raw, "direction"))
                    .transpose()?,
                status: status
                    .as_deref()
                    .map(|raw| parse_keyword::<LendingStatus>(raw, "status"))
                    .transpose()?,
            };
            let updated = book.edit::<LendingEntry>(&id, &patch)?;
            println!(
                "Updated {} ({} {} {}).",
                updated.id.short(),
                updated.direction,
                updated.amount,
                updated.status
            );
        }
        LendCmd::Settle { id } => {
            let patch = LendingPatch {
                status: Some(LendingStatus::Settled),
                ..LendingPatch::default()
            };
            let updated = book.edit::<LendingEntry>(&id, &patch)?;
            println!(
                "Settled {} ({} {}).",
                updated.id.short(),
                updated.amount,
                updated.counterparty
            );
        }
        LendCmd::Rm { id } => {
            let removed = book.delete::<LendingEntry>(&id)?;
            println!("Removed {} ({}).", removed.id.short(), removed.amount);
        }
    }
    Ok(())
}

fn handle_config(
    cmd: ConfigCmd,
    store: &LedgerStore<SqliteKv>,
    cfg: &mut AppConfig,
    cfg_path: &Path,
) -> Result<()> {
    match cmd {
        ConfigCmd::Show => {
            println!("primary_currency\t{}", cfg.primary_currency);
            println!("default_method\t{}", cfg.default_method);
            println!("config\t{}", cfg_path.display());
        }
        ConfigCmd::SetPrimary { currency } => {
            let currency = Currency::new(&currency)?;
            let periods = store.periods()?;
            if !periods.is_empty() {
                return Err(anyhow!(
                    "Cannot change the primary currency: {} period(s) already hold balances in {}. Clear them first.",
                    periods.len(),
                    cfg.primary_currency
                ));
            }
            cfg.primary_currency = currency.to_string();
            write_config(cfg_path, cfg)?;
            println!("Primary currency set to {currency}.");
        }
        ConfigCmd::SetMethod { method } => {
            cfg.default_method = parse_keyword::<PaymentMethod>(&method, "method")?;
            write_config(cfg_path, cfg)?;
            println!("Default expense method set to {}.", cfg.default_method);
        }
    }
    Ok(())
}

fn print_balance(book: &SqliteBook) {
    let primary = book.primary();
    let ledger = book.ledger();
    println!(
        "wallet\t{primary}\t{}",
        Money::from_subunits(ledger.wallet, primary.clone()).to_decimal_string()
    );
    println!(
        "savings\t{primary}\t{}",
        Money::from_subunits(ledger.savings, primary.clone()).to_decimal_string()
    );
}

fn stored_entry<E: Logged>(book: &SqliteBook, id: &str) -> Result<E> {
    let log = E::log(book.ledger());
    let idx = locate(log, id)?;
    Ok(log[idx].clone())
}

/// Builds the replacement amount for an edit; either half may be omitted.
fn patch_money(
    stored: &Money,
    amount: Option<String>,
    currency: Option<String>,
) -> Result<Option<Money>> {
    let currency = match currency {
        Some(raw) => Currency::new(&raw)?,
        None => stored.currency.clone(),
    };
    match amount {
        Some(raw) => Ok(Some(Money::parse_decimal(&raw, currency)?)),
        None if currency != stored.currency => {
            Ok(Some(Money::from_subunits(stored.amount, currency)))
        }
        None => Ok(None),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {raw}"))
}

/// Explicit date, else today inside the active period, else its first day.
fn entry_date(raw: Option<&str>, period: PeriodKey, today: NaiveDate) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None if period.contains(today) => Ok(today),
        None => Ok(period.first_day()),
    }
}

fn parse_keyword<T>(raw: &str, field: &'static str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("Invalid {field}: {e}"))
}

fn statement_format(arg: FormatArg) -> StatementFormat {
    match arg {
        FormatArg::Table => StatementFormat::Table,
        FormatArg::Tsv => StatementFormat::Tsv,
    }
}

fn prompt_yes_no(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
