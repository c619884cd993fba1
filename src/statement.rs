//! Plain-text statements.
//!
//! A statement is the dashboard figures followed by the three entry logs.
//! `Table` output is for people; `Tsv` keeps one record per line for scripts.

use std::fmt::Write;

use crate::aggregate::{CurrencyTotals, Summary};
use crate::domain::{ExpenseEntry, IncomeEntry, LendingEntry, PeriodLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementFormat {
    #[default]
    Table,
    Tsv,
}

pub const INCOME_HEADERS: [&str; 5] = ["ID", "DATE", "SOURCE", "AMOUNT", "NOTES"];
pub const EXPENSE_HEADERS: [&str; 6] = ["ID", "DATE", "CATEGORY", "AMOUNT", "METHOD", "NOTES"];
pub const LENDING_HEADERS: [&str; 7] = [
    "ID", "DATE", "NAME", "AMOUNT", "DIRECTION", "STATUS", "REASON",
];

pub fn income_rows(entries: &[IncomeEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.id.short(),
                e.date.to_string(),
                e.source.clone(),
                e.amount.to_string(),
                e.notes.clone(),
            ]
        })
        .collect()
}

pub fn expense_rows(entries: &[ExpenseEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.id.short(),
                e.date.to_string(),
                e.category.clone(),
                e.amount.to_string(),
                e.method.to_string(),
                e.notes.clone(),
            ]
        })
        .collect()
}

pub fn lending_rows(entries: &[LendingEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.id.short(),
                e.date.to_string(),
                e.counterparty.clone(),
                e.amount.to_string(),
                e.direction.to_string(),
                e.status.to_string(),
                e.reason.clone(),
            ]
        })
        .collect()
}

/// Aligned table with a header separator. Returns `(none)` for no rows.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(none)\n".to_string();
    }

    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
        out.push('|');
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let _ = write!(out, " {:width$} |", cell, width = *w);
        }
        out.push('\n');
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    out.push('|');
    for w in &widths {
        out.push_str(&"-".repeat(w + 2));
        out.push('|');
    }
    out.push('\n');
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

pub fn render_tsv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

fn render_rows(format: StatementFormat, headers: &[&str], rows: &[Vec<String>]) -> String {
    match format {
        StatementFormat::Table => render_table(headers, rows),
        StatementFormat::Tsv => render_tsv(rows),
    }
}

fn push_totals(out: &mut String, label: &str, totals: &CurrencyTotals) {
    if totals.is_empty() {
        let _ = writeln!(out, "{label}\t-");
        return;
    }
    for money in totals.values() {
        let _ = writeln!(out, "{label}\t{}\t{}", money.currency, money.to_decimal_string());
    }
}

/// Dashboard block: balances, per-currency totals, lending exposure.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "wallet\t{}\t{}",
        summary.wallet.currency,
        summary.wallet.to_decimal_string()
    );
    let _ = writeln!(
        out,
        "savings\t{}\t{}",
        summary.savings.currency,
        summary.savings.to_decimal_string()
    );
    push_totals(&mut out, "income", &summary.income);
    push_totals(&mut out, "expenses", &summary.expenses);
    push_totals(&mut out, "net", &summary.derived_savings);
    push_totals(&mut out, "to receive", &summary.exposure.to_receive);
    push_totals(&mut out, "to pay back", &summary.exposure.to_pay_back);
    out
}

pub fn render_statement(
    ledger: &PeriodLedger,
    summary: &Summary,
    format: StatementFormat,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statement for {} ({})", ledger.period.label(), ledger.period);
    out.push('\n');
    out.push_str(&render_summary(summary));

    let sections: [(&str, &[&str], Vec<Vec<String>>); 3] = [
        ("Income", &INCOME_HEADERS[..], income_rows(&ledger.income)),
        ("Expenses", &EXPENSE_HEADERS[..], expense_rows(&ledger.expenses)),
        ("Lending", &LENDING_HEADERS[..], lending_rows(&ledger.lending)),
    ];
    for (title, headers, rows) in sections {
        let _ = writeln!(out, "\n{title}");
        out.push_str(&render_rows(format, headers, &rows));
    }
    out
}

/// One log of the ledger, rendered on its own.
pub fn render_log(ledger: &PeriodLedger, log: LogKind, format: StatementFormat) -> String {
    match log {
        LogKind::Income => render_rows(format, &INCOME_HEADERS, &income_rows(&ledger.income)),
        LogKind::Expenses => {
            render_rows(format, &EXPENSE_HEADERS, &expense_rows(&ledger.expenses))
        }
        LogKind::Lending => render_rows(format, &LENDING_HEADERS, &lending_rows(&ledger.lending)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Income,
    Expenses,
    Lending,
}
