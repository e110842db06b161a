//! Debt consolidation.
//!
//! Turns an unordered set of movements into net pairwise balances: who owes
//! whom, and how much. SPLIT shares create debt from each participant to the
//! payer; DEBT_PAYMENT movements reduce the payer's debt to the counterparty.
//! HOUSEHOLD movements carry no debt and are ignored.
//!
//! A payment larger than the outstanding debt (or with no prior debt at all)
//! leaves a negative directed balance, which the netting pass reports as the
//! reverse direction being owed.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use hearth_shared::types::{MovementId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::party::Party;
use super::types::{Movement, MovementKind};

/// Net amounts within this distance of zero count as settled.
pub const SETTLED_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest magnitude a directed running balance may reach, half of `Decimal::MAX`.
pub const BALANCE_LIMIT: Decimal = Decimal::from_parts(u32::MAX, u32::MAX, 0x7FFF_FFFF, false, 0);

/// One movement's contribution to a pair's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Contributing movement.
    pub movement_id: MovementId,
    /// Description of the movement.
    pub description: String,
    /// Signed contribution: positive for a SPLIT share, negative for a payment.
    pub amount: Decimal,
    /// Date of the movement.
    pub movement_date: NaiveDate,
    /// Kind of the movement.
    pub kind: MovementKind,
    /// Counterparty recorded on the movement, if any.
    pub counterparty_of_record: Option<Party>,
}

impl Provenance {
    fn of(movement: &Movement, amount: Decimal) -> Self {
        Self {
            movement_id: movement.id,
            description: movement.description.clone(),
            amount,
            movement_date: movement.movement_date,
            kind: movement.kind,
            counterparty_of_record: movement.counterparty,
        }
    }
}

/// Net debt between two people.
///
/// A zero `amount` means the pair had activity that settled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtBalance {
    /// Who owes.
    pub debtor: Party,
    /// Who is owed.
    pub creditor: Party,
    /// Net amount owed, never negative.
    pub amount: Decimal,
    /// Every contribution from both directions of the pair.
    pub provenance: Vec<Provenance>,
}

/// Household-level view of debt with people outside the household.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DebtSummary {
    /// Total members owe to non-members.
    pub we_owe: Decimal,
    /// Total non-members owe to members.
    pub they_owe_us: Decimal,
}

impl DebtSummary {
    /// Net position of the household: positive when it is owed money.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.they_owe_us - self.we_owe
    }
}

/// Result of a consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Consolidation {
    /// Balances sorted by (debtor, creditor).
    pub balances: Vec<DebtBalance>,
    /// Present when a member set was supplied.
    pub summary: Option<DebtSummary>,
    /// Movements ignored because they could not carry debt or overflowed a balance.
    pub skipped: usize,
}

type Pair = (Party, Party);

/// Consolidates movements into net pairwise balances.
///
/// Never fails. A SPLIT without participants, a DEBT_PAYMENT without a
/// distinct counterparty, or a movement that would push a running balance past
/// [`BALANCE_LIMIT`] is skipped and counted. The result does not depend on the
/// order of `movements`.
///
/// When `members` is supplied, the summary classifies each balance with
/// exactly one member side as `we_owe` (member is debtor) or `they_owe_us`
/// (member is creditor).
#[must_use]
pub fn consolidate(movements: &[Movement], members: Option<&HashSet<UserId>>) -> Consolidation {
    let mut directed: BTreeMap<Pair, Decimal> = BTreeMap::new();
    let mut sources: BTreeMap<Pair, Vec<Provenance>> = BTreeMap::new();
    let mut skipped = 0;

    // Which movement overflows a balance must not depend on input order.
    let mut ordered: Vec<&Movement> = movements.iter().collect();
    ordered.sort_by_key(|m| (m.movement_date, m.id));

    for movement in ordered {
        let Some(deltas) = contributions(movement) else {
            skipped += 1;
            continue;
        };
        if !accumulate(&mut directed, &deltas) {
            warn!(
                movement_id = %movement.id,
                amount = %movement.amount,
                "Skipping movement that overflows a running balance"
            );
            skipped += 1;
            continue;
        }
        for (pair, amount) in deltas {
            sources
                .entry(pair)
                .or_default()
                .push(Provenance::of(movement, amount));
        }
    }

    let balances = net_pairs(&directed, &mut sources);
    let summary = members.map(|members| summarize(&balances, members));

    debug!(
        movements = movements.len(),
        balances = balances.len(),
        skipped,
        "Consolidated movements"
    );

    Consolidation {
        balances,
        summary,
        skipped,
    }
}

// Signed amounts a movement adds to directed pairs, or `None` when it cannot
// carry debt.
fn contributions(movement: &Movement) -> Option<Vec<(Pair, Decimal)>> {
    match movement.kind {
        MovementKind::Household => Some(Vec::new()),
        MovementKind::Split => {
            if movement.participants.is_empty() {
                warn!(movement_id = %movement.id, "Skipping SPLIT movement without participants");
                return None;
            }
            let mut shares = Vec::with_capacity(movement.participants.len());
            for participant in &movement.participants {
                // Nobody owes themselves.
                if participant.party == movement.payer {
                    continue;
                }
                let Some(share) = movement.amount.checked_mul(participant.percentage) else {
                    warn!(movement_id = %movement.id, "Skipping SPLIT movement whose share overflows");
                    return None;
                };
                shares.push(((participant.party, movement.payer), share));
            }
            Some(shares)
        }
        MovementKind::DebtPayment => match movement.counterparty {
            Some(counterparty) if counterparty != movement.payer => {
                Some(vec![((movement.payer, counterparty), -movement.amount)])
            }
            _ => {
                warn!(
                    movement_id = %movement.id,
                    "Skipping DEBT_PAYMENT movement without a distinct counterparty"
                );
                None
            }
        },
    }
}

// Applies all of a movement's contributions or none of them. Running balances
// stay within `BALANCE_LIMIT` so netting two directions cannot overflow.
fn accumulate(directed: &mut BTreeMap<Pair, Decimal>, contributions: &[(Pair, Decimal)]) -> bool {
    let mut staged: BTreeMap<Pair, Decimal> = BTreeMap::new();
    for &(pair, amount) in contributions {
        let current = staged
            .get(&pair)
            .or_else(|| directed.get(&pair))
            .copied()
            .unwrap_or_default();
        match current.checked_add(amount) {
            Some(total) if total.abs() <= BALANCE_LIMIT => {
                staged.insert(pair, total);
            }
            _ => return false,
        }
    }
    directed.extend(staged);
    true
}

fn net_pairs(
    directed: &BTreeMap<Pair, Decimal>,
    sources: &mut BTreeMap<Pair, Vec<Provenance>>,
) -> Vec<DebtBalance> {
    let pairs: BTreeSet<Pair> = directed
        .keys()
        .map(|&(a, b)| if a <= b { (a, b) } else { (b, a) })
        .collect();

    let mut balances = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        let forward = directed.get(&(a, b)).copied().unwrap_or_default();
        let backward = directed.get(&(b, a)).copied().unwrap_or_default();
        let net = forward - backward;

        let forward_sources = sources.remove(&(a, b)).unwrap_or_default();
        let backward_sources = sources.remove(&(b, a)).unwrap_or_default();
        let settled_direction = if gross_debt(&backward_sources) > gross_debt(&forward_sources) {
            (b, a)
        } else {
            (a, b)
        };

        let mut provenance = forward_sources;
        provenance.extend(backward_sources);
        provenance.sort_by_key(|p| (p.movement_date, p.movement_id, p.amount));

        let (debtor, creditor, amount) = if net > SETTLED_TOLERANCE {
            (a, b, net)
        } else if net < -SETTLED_TOLERANCE {
            (b, a, -net)
        } else if provenance.is_empty() {
            continue;
        } else {
            (settled_direction.0, settled_direction.1, Decimal::ZERO)
        };

        balances.push(DebtBalance {
            debtor,
            creditor,
            amount,
            provenance,
        });
    }

    balances.sort_by_key(|b| (b.debtor, b.creditor));
    balances
}

// Debt created in one direction, ignoring payments. Decides how a settled
// pair is oriented.
fn gross_debt(sources: &[Provenance]) -> Decimal {
    sources
        .iter()
        .map(|p| p.amount)
        .filter(|amount| amount.is_sign_positive())
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

fn summarize(balances: &[DebtBalance], members: &HashSet<UserId>) -> DebtSummary {
    balances
        .iter()
        .fold(DebtSummary::default(), |mut summary, balance| {
            match (
                balance.debtor.is_member_of(members),
                balance.creditor.is_member_of(members),
            ) {
                (true, false) => summary.we_owe = summary.we_owe.saturating_add(balance.amount),
                (false, true) => {
                    summary.they_owe_us = summary.they_owe_us.saturating_add(balance.amount);
                }
                _ => {}
            }
            summary
        })
}
