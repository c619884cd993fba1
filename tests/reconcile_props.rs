use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::BTreeSet;

use monthbook::aggregate::{derived_savings_by_currency, totals_by_currency};
use monthbook::{
    Currency, EntryId, ExpenseEntry, ExpensePatch, IncomeEntry, IncomePatch, Money,
    PaymentMethod, PeriodKey, PeriodLedger, Reconciler,
};

const PRIMARY: &str = "KWD";

fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        4 => Just("KWD"),
        1 => Just("USD"),
        1 => Just("EUR"),
    ]
    .prop_map(|c| Currency::new(c).unwrap())
}

fn positive_money() -> impl Strategy<Value = Money> {
    (1i64..5_000_000, currency_strategy()).prop_map(|(a, c)| Money::from_subunits(a, c))
}

fn method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![Just(PaymentMethod::Wallet), Just(PaymentMethod::Bank)]
}

#[derive(Debug, Clone)]
enum Op {
    AddIncome(Money),
    AddExpense(Money, PaymentMethod),
    EditIncome(usize, Money),
    EditExpense(usize, Option<Money>, Option<PaymentMethod>),
    DeleteIncome(usize),
    DeleteExpense(usize),
    Transfer(i64),
    Credit(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => positive_money().prop_map(Op::AddIncome),
        3 => (positive_money(), method_strategy()).prop_map(|(m, k)| Op::AddExpense(m, k)),
        2 => (any::<usize>(), positive_money()).prop_map(|(i, m)| Op::EditIncome(i, m)),
        2 => (
            any::<usize>(),
            proptest::option::of(positive_money()),
            proptest::option::of(method_strategy())
        )
            .prop_map(|(i, m, k)| Op::EditExpense(i, m, k)),
        1 => any::<usize>().prop_map(Op::DeleteIncome),
        1 => any::<usize>().prop_map(Op::DeleteExpense),
        1 => (-1_000i64..2_000_000).prop_map(Op::Transfer),
        1 => (-1_000i64..2_000_000).prop_map(Op::Credit),
    ]
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
}

/// Wallet and savings recomputed from the live entries plus explicit moves.
fn closed_form(ledger: &PeriodLedger, transferred: i64, credited: i64) -> (i64, i64) {
    let primary = Currency::new(PRIMARY).unwrap();
    let mut wallet = 0;
    let mut savings = 0;
    for e in ledger.income.iter().filter(|e| e.amount.currency == primary) {
        wallet += e.amount.amount;
    }
    for e in ledger.expenses.iter().filter(|e| e.amount.currency == primary) {
        match e.method {
            PaymentMethod::Wallet => wallet -= e.amount.amount,
            PaymentMethod::Bank => savings -= e.amount.amount,
        }
    }
    (wallet - transferred, savings + transferred + credited)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn balances_follow_live_entries(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let primary = Currency::new(PRIMARY).unwrap();
        let r = Reconciler::new(primary.clone());
        let mut l = PeriodLedger::empty("2026-02".parse::<PeriodKey>().unwrap());
        let mut transferred = 0i64;
        let mut credited = 0i64;

        for op in ops {
            match op {
                Op::AddIncome(amount) => {
                    r.create(&mut l, IncomeEntry {
                        id: EntryId::new(),
                        date: day(),
                        source: "job".into(),
                        amount,
                        notes: String::new(),
                    }).unwrap();
                }
                Op::AddExpense(amount, method) => {
                    r.create(&mut l, ExpenseEntry {
                        id: EntryId::new(),
                        date: day(),
                        category: "misc".into(),
                        amount,
                        method,
                        notes: String::new(),
                    }).unwrap();
                }
                Op::EditIncome(i, amount) if !l.income.is_empty() => {
                    let id = l.income[i % l.income.len()].id.to_string();
                    let patch = IncomePatch { amount: Some(amount), ..IncomePatch::default() };
                    r.edit::<IncomeEntry>(&mut l, &id, &patch).unwrap();
                }
                Op::EditExpense(i, amount, method) if !l.expenses.is_empty() => {
                    let id = l.expenses[i % l.expenses.len()].id.to_string();
                    let patch = ExpensePatch { amount, method, ..ExpensePatch::default() };
                    r.edit::<ExpenseEntry>(&mut l, &id, &patch).unwrap();
                }
                Op::DeleteIncome(i) if !l.income.is_empty() => {
                    let id = l.income[i % l.income.len()].id.to_string();
                    r.delete::<IncomeEntry>(&mut l, &id).unwrap();
                }
                Op::DeleteExpense(i) if !l.expenses.is_empty() => {
                    let id = l.expenses[i % l.expenses.len()].id.to_string();
                    r.delete::<ExpenseEntry>(&mut l, &id).unwrap();
                }
                Op::Transfer(amount) => {
                    let before = (l.wallet, l.savings);
                    match r.transfer_wallet_to_savings(&mut l, &Money::from_subunits(amount, primary.clone())) {
                        Ok(()) => transferred += amount,
                        Err(_) => {
                            prop_assert_eq!((l.wallet, l.savings), before);
                        }
                    }
                }
                Op::Credit(amount) => {
                    let before = (l.wallet, l.savings);
                    match r.credit_savings_directly(&mut l, &Money::from_subunits(amount, primary.clone())) {
                        Ok(()) => credited += amount,
                        Err(_) => {
                            prop_assert_eq!((l.wallet, l.savings), before);
                        }
                    }
                }
                _ => {}
            }

            prop_assert_eq!((l.wallet, l.savings), closed_form(&l, transferred, credited));
        }
    }

    #[test]
    fn decimal_text_round_trips(amount in any::<i64>(), c in currency_strategy()) {
        let m = Money::from_subunits(amount, c.clone());
        prop_assert_eq!(Money::parse_decimal(&m.to_decimal_string(), c).unwrap(), m);
    }

    #[test]
    fn totals_partition_exactly_the_present_currencies(
        amounts in proptest::collection::vec(positive_money(), 0..30)
    ) {
        let entries: Vec<IncomeEntry> = amounts
            .iter()
            .cloned()
            .map(|amount| IncomeEntry {
                id: EntryId::new(),
                date: day(),
                source: "x".into(),
                amount,
                notes: String::new(),
            })
            .collect();

        let totals = totals_by_currency(&entries).unwrap();
        let present: BTreeSet<_> = amounts.iter().map(|m| m.currency.clone()).collect();
        let keys: BTreeSet<_> = totals.keys().cloned().collect();
        prop_assert_eq!(keys, present);

        for (currency, total) in &totals {
            prop_assert_eq!(&total.currency, currency);
            let expected: i64 = amounts
                .iter()
                .filter(|m| &m.currency == currency)
                .map(|m| m.amount)
                .sum();
            prop_assert_eq!(total.amount, expected);
        }

        // Income with no expenses nets to itself.
        let net = derived_savings_by_currency(&totals, &Default::default()).unwrap();
        prop_assert_eq!(net, totals);
    }
}
