//! Property-based tests for movement validation rules.

use chrono::NaiveDate;
use hearth_shared::types::{ContactId, PaymentMethodId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::MovementError;
use super::types::{CreateMovementInput, ParticipantInput};
use super::validation::{PERCENTAGE_TOLERANCE, validate};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to split 10,000 basis points into 1..=8 positive shares.
fn shares_summing_to_one() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(1u32..1000, 1..=8).prop_map(|weights| {
        let total: u32 = weights.iter().sum();
        let mut shares: Vec<i64> = weights
            .iter()
            .map(|w| i64::from(w * 10_000 / total))
            .collect();
        let assigned: i64 = shares.iter().sum();
        // Remainder goes to the first share so the total is exactly 10,000.
        shares[0] += 10_000 - assigned;
        shares
            .into_iter()
            .filter(|bp| *bp > 0)
            .map(|bp| Decimal::new(bp, 4))
            .collect()
    })
}

fn split_input(amount: Decimal, shares: &[Decimal]) -> CreateMovementInput {
    CreateMovementInput {
        kind: "SPLIT".to_string(),
        description: "Shared".to_string(),
        amount,
        movement_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        payer_user_id: Some(UserId::new()),
        payment_method_id: Some(PaymentMethodId::new()),
        participants: shares
            .iter()
            .map(|p| ParticipantInput::contact(ContactId::new(), *p))
            .collect(),
        ..CreateMovementInput::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Shares that add up to exactly 1 are always accepted.
    #[test]
    fn prop_exact_split_accepted(
        amount in positive_amount(),
        shares in shares_summing_to_one(),
    ) {
        let movement = validate(&split_input(amount, &shares));
        prop_assert!(movement.is_ok(), "rejected {:?}", movement);
        prop_assert_eq!(movement.unwrap().participants.len(), shares.len());
    }

    /// Drift beyond the tolerance is always rejected with the sum error.
    #[test]
    fn prop_drift_beyond_tolerance_rejected(
        amount in positive_amount(),
        drift_bp in 2i64..5_000,
        over in any::<bool>(),
    ) {
        // Two halves, the second one nudged off by the drift.
        let half = Decimal::new(5_000, 4);
        let drift = Decimal::new(drift_bp, 4);
        prop_assume!(drift > PERCENTAGE_TOLERANCE);
        let second = if over { half + drift } else { half - drift };
        let shares = [half, second];

        let result = validate(&split_input(amount, &shares));
        let is_sum_error = matches!(result, Err(MovementError::PercentageSumOutOfTolerance { .. }));
        prop_assert!(is_sum_error, "unexpected result {:?}", result);
    }

    /// Non-positive amounts are rejected whatever the kind.
    #[test]
    fn prop_non_positive_amount_rejected(
        cents in 0i64..100_000_000i64,
        kind in prop_oneof![Just("HOUSEHOLD"), Just("SPLIT"), Just("DEBT_PAYMENT")],
    ) {
        let input = CreateMovementInput {
            kind: kind.to_string(),
            amount: Decimal::new(-cents, 2),
            ..split_input(Decimal::ONE, &[Decimal::ONE])
        };
        let rejected = matches!(validate(&input), Err(MovementError::NonPositiveAmount(_)));
        prop_assert!(rejected);
    }
}
