use chrono::NaiveDate;
use monthbook::aggregate::{
    CurrencyTotals, derived_savings_by_currency, lending_exposure, totals_by_currency,
};
use monthbook::{
    Currency, EntryId, ExpenseEntry, IncomeEntry, LendDirection, LendingEntry, LendingStatus,
    Money, PaymentMethod, PeriodKey, PeriodLedger, Reconciler, Summary,
};

fn cur(code: &str) -> Currency {
    Currency::new(code).unwrap()
}

fn money(raw: &str, code: &str) -> Money {
    Money::parse_decimal(raw, cur(code)).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn income(raw: &str, code: &str) -> IncomeEntry {
    IncomeEntry {
        id: EntryId::new(),
        date: date(),
        source: "salary".into(),
        amount: money(raw, code),
        notes: String::new(),
    }
}

fn expense(raw: &str, code: &str) -> ExpenseEntry {
    ExpenseEntry {
        id: EntryId::new(),
        date: date(),
        category: "food".into(),
        amount: money(raw, code),
        method: PaymentMethod::Wallet,
        notes: String::new(),
    }
}

fn loan(raw: &str, code: &str, direction: LendDirection, status: LendingStatus) -> LendingEntry {
    LendingEntry {
        id: EntryId::new(),
        date: date(),
        counterparty: "Omar".into(),
        amount: money(raw, code),
        reason: String::new(),
        direction,
        status,
    }
}

fn totals(pairs: &[(&str, &str)]) -> CurrencyTotals {
    pairs
        .iter()
        .map(|(code, raw)| (cur(code), money(raw, code)))
        .collect()
}

#[test]
fn totals_are_grouped_per_currency() {
    let entries = vec![
        income("100", "KWD"),
        income("20.5", "USD"),
        income("0.250", "KWD"),
        income("1", "EUR"),
    ];
    let got = totals_by_currency(&entries).unwrap();
    assert_eq!(
        got,
        totals(&[("EUR", "1"), ("KWD", "100.250"), ("USD", "20.5")])
    );
    let order: Vec<_> = got.keys().map(|c| c.as_str()).collect();
    assert_eq!(order, ["EUR", "KWD", "USD"]);
}

#[test]
fn totals_of_nothing_is_empty() {
    let none: Vec<ExpenseEntry> = Vec::new();
    assert!(totals_by_currency(&none).unwrap().is_empty());
}

#[test]
fn derived_savings_covers_the_union_of_currencies() {
    let income = totals(&[("KWD", "300"), ("USD", "50")]);
    let expenses = totals(&[("KWD", "320.5"), ("EUR", "12")]);

    let net = derived_savings_by_currency(&income, &expenses).unwrap();
    assert_eq!(
        net,
        totals(&[("EUR", "-12"), ("KWD", "-20.5"), ("USD", "50")])
    );
}

#[test]
fn exposure_counts_only_pending_entries() {
    let entries = vec![
        loan("10", "KWD", LendDirection::Lend, LendingStatus::Pending),
        loan("5", "KWD", LendDirection::Lend, LendingStatus::Pending),
        loan("99", "KWD", LendDirection::Lend, LendingStatus::Settled),
        loan("7", "USD", LendDirection::Borrow, LendingStatus::Pending),
        loan("3", "USD", LendDirection::Borrow, LendingStatus::Settled),
    ];

    let exposure = lending_exposure(&entries).unwrap();
    assert_eq!(exposure.to_receive, totals(&[("KWD", "15")]));
    assert_eq!(exposure.to_pay_back, totals(&[("USD", "7")]));
}

#[test]
fn summary_flattens_a_period() {
    let primary = cur("KWD");
    let r = Reconciler::new(primary.clone());
    let mut l = PeriodLedger::empty("2026-03".parse::<PeriodKey>().unwrap());
    r.create(&mut l, income("100", "KWD")).unwrap();
    r.create(&mut l, income("40", "USD")).unwrap();
    r.create(&mut l, expense("30", "KWD")).unwrap();
    r.create(
        &mut l,
        loan("8", "KWD", LendDirection::Borrow, LendingStatus::Pending),
    )
    .unwrap();
    r.transfer_wallet_to_savings(&mut l, &money("20", "KWD"))
        .unwrap();

    let s = Summary::of(&l, &primary).unwrap();
    assert_eq!(s.wallet, money("50", "KWD"));
    assert_eq!(s.savings, money("20", "KWD"));
    assert_eq!(s.income, totals(&[("KWD", "100"), ("USD", "40")]));
    assert_eq!(s.expenses, totals(&[("KWD", "30")]));
    assert_eq!(s.derived_savings, totals(&[("KWD", "70"), ("USD", "40")]));
    assert!(s.exposure.to_receive.is_empty());
    assert_eq!(s.exposure.to_pay_back, totals(&[("KWD", "8")]));
}
