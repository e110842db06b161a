//! Property-based tests for debt consolidation.

use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, Utc};
use hearth_shared::types::{ContactId, Currency, HouseholdId, MovementId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::consolidation::{SETTLED_TOLERANCE, consolidate};
use super::party::Party;
use super::types::{Movement, MovementKind, NewMovement, Participant};

/// Fixed cast so generated movements share people.
fn cast() -> Vec<Party> {
    let ids: [u128; 5] = [1, 2, 3, 4, 5];
    let mut parties: Vec<Party> = ids[..3]
        .iter()
        .map(|n| Party::Member(UserId::from_uuid(uuid::Uuid::from_u128(*n))))
        .collect();
    parties.extend(
        ids[3..]
            .iter()
            .map(|n| Party::Contact(ContactId::from_uuid(uuid::Uuid::from_u128(*n)))),
    );
    parties
}

fn cast_members() -> HashSet<UserId> {
    cast().iter().filter_map(Party::member_id).collect()
}

/// Strategy to generate an amount from 1.00 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Splits 10,000 basis points evenly, remainder to the first share.
fn even_shares(count: usize) -> Vec<Decimal> {
    let count = i64::try_from(count).unwrap_or(1).max(1);
    let each = 10_000 / count;
    (0..count)
        .map(|i| {
            let bp = if i == 0 { each + 10_000 % count } else { each };
            Decimal::new(bp, 4)
        })
        .collect()
}

fn record(kind: MovementKind, payer: Party, amount: Decimal, day: u32) -> NewMovement {
    NewMovement {
        kind,
        description: format!("{kind} on day {day}"),
        amount,
        category: None,
        movement_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap_or_default(),
        payer,
        counterparty: None,
        payment_method_id: None,
        receiver_account_id: None,
        participants: Vec::new(),
    }
}

/// Strategy to generate a SPLIT or DEBT_PAYMENT among the cast.
fn movement() -> impl Strategy<Value = Movement> {
    let sharers = prop::sample::subsequence((0..5).collect::<Vec<usize>>(), 1..=4);
    let split = (0usize..5, amount(), 1u32..29, sharers).prop_map(|(payer, amount, day, sharers)| {
        let parties = cast();
        let mut movement = record(MovementKind::Split, parties[payer], amount, day);
        movement.participants = sharers
            .iter()
            .zip(even_shares(sharers.len()))
            .map(|(i, percentage)| Participant {
                party: parties[*i],
                percentage,
            })
            .collect();
        movement
    });

    let payment = (0usize..5, 0usize..5, amount(), 1u32..29).prop_map(|(payer, to, amount, day)| {
        let parties = cast();
        let mut movement = record(MovementKind::DebtPayment, parties[payer], amount, day);
        movement.counterparty = Some(parties[to]);
        movement
    });

    prop_oneof![split, payment].prop_map(|movement| {
        Movement::record(
            MovementId::new(),
            HouseholdId::new(),
            Currency::Cop,
            movement,
            Utc::now(),
        )
    })
}

/// Strategy to generate a ledger and a shuffled copy of it.
fn ledger_and_permutation() -> impl Strategy<Value = (Vec<Movement>, Vec<Movement>)> {
    prop::collection::vec(movement(), 0..25)
        .prop_flat_map(|movements| (Just(movements.clone()), Just(movements).prop_shuffle()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Consolidating any permutation of the same movements gives the same result.
    #[test]
    fn prop_order_independent((movements, shuffled) in ledger_and_permutation()) {
        let members = cast_members();
        let original = consolidate(&movements, Some(&members));
        let permuted = consolidate(&shuffled, Some(&members));
        prop_assert_eq!(original, permuted);
    }

    /// Every pair appears at most once, and amounts are either zero or above the tolerance.
    #[test]
    fn prop_balances_well_formed((movements, _) in ledger_and_permutation()) {
        let result = consolidate(&movements, None);
        let mut seen = BTreeSet::new();

        for balance in &result.balances {
            let pair = if balance.debtor <= balance.creditor {
                (balance.debtor, balance.creditor)
            } else {
                (balance.creditor, balance.debtor)
            };
            prop_assert!(seen.insert(pair), "pair reported twice");
            prop_assert!(balance.debtor != balance.creditor);
            prop_assert!(balance.amount.is_zero() || balance.amount > SETTLED_TOLERANCE);
            prop_assert!(!balance.provenance.is_empty());
        }
    }

    /// Every debt-carrying movement is either skipped or traceable in some provenance.
    #[test]
    fn prop_contributions_accounted((movements, _) in ledger_and_permutation()) {
        let result = consolidate(&movements, None);
        let traced: BTreeSet<MovementId> = result
            .balances
            .iter()
            .flat_map(|b| b.provenance.iter().map(|p| p.movement_id))
            .collect();

        let untraced = movements.iter().filter(|m| !traced.contains(&m.id)).count();
        // Untraced movements are skipped ones, or splits shared only by the payer.
        let payer_only = movements
            .iter()
            .filter(|m| {
                m.kind == MovementKind::Split
                    && m.participants.iter().all(|p| p.party == m.payer)
            })
            .count();
        prop_assert_eq!(untraced, result.skipped + payer_only);
    }
}
