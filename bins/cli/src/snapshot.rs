//! Ledger snapshot files.
//!
//! A snapshot describes one household: its members, payment methods, accounts
//! and the movements to record. It is a tool format for the CLI only.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use hearth_core::movement::{
    Account, AccountType, CreateMovementInput, InMemoryLedger, PaymentMethod,
};
use hearth_shared::types::{AccountId, Currency, HouseholdId, PaymentMethodId, UserId};
use serde::Deserialize;

/// Payment method entry of a snapshot.
#[derive(Debug, Deserialize)]
pub struct SnapshotPaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
}

/// Account entry of a snapshot.
#[derive(Debug, Deserialize)]
pub struct SnapshotAccount {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
}

/// One household's ledger, as read from disk.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub household_id: HouseholdId,
    /// Overrides the configured currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    pub members: Vec<UserId>,
    #[serde(default)]
    pub payment_methods: Vec<SnapshotPaymentMethod>,
    #[serde(default)]
    pub accounts: Vec<SnapshotAccount>,
    #[serde(default)]
    pub movements: Vec<CreateMovementInput>,
}

impl Snapshot {
    /// Reads and parses a snapshot file.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid snapshot {}", path.display()))
    }

    fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Picks the member the CLI acts as.
    pub fn acting_user(&self, requested: Option<UserId>) -> anyhow::Result<UserId> {
        match requested {
            Some(user_id) if self.members.contains(&user_id) => Ok(user_id),
            Some(user_id) => bail!(
                "User {user_id} is not a member of household {}",
                self.household_id
            ),
            None => self
                .members
                .first()
                .copied()
                .context("Snapshot has no members"),
        }
    }

    /// Loads members, payment methods and accounts into the ledger.
    ///
    /// Movements are not loaded; they go through the service so they are
    /// validated and authorized like any other input.
    pub async fn seed(&self, ledger: &InMemoryLedger) {
        for user_id in &self.members {
            ledger.add_member(self.household_id, *user_id).await;
        }
        for method in &self.payment_methods {
            ledger
                .add_payment_method(PaymentMethod {
                    id: method.id,
                    household_id: self.household_id,
                    name: method.name.clone(),
                })
                .await;
        }
        for account in &self.accounts {
            ledger
                .add_account(Account {
                    id: account.id,
                    household_id: self.household_id,
                    name: account.name.clone(),
                    account_type: account.account_type,
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::movement::Households;

    const SNAPSHOT: &str = r#"{
        "household_id": "0190a5c4-0000-7000-8000-000000000001",
        "currency": "USD",
        "members": [
            "0190a5c4-0000-7000-8000-0000000000a1",
            "0190a5c4-0000-7000-8000-0000000000a2"
        ],
        "payment_methods": [
            { "id": "0190a5c4-0000-7000-8000-0000000000b1", "name": "Visa" }
        ],
        "accounts": [
            { "id": "0190a5c4-0000-7000-8000-0000000000c1", "name": "Savings", "account_type": "savings" }
        ],
        "movements": [
            {
                "type": "SPLIT",
                "description": "Dinner",
                "amount": "100000",
                "movement_date": "2025-01-05",
                "payer_user_id": "0190a5c4-0000-7000-8000-0000000000a1",
                "payment_method_id": "0190a5c4-0000-7000-8000-0000000000b1",
                "participants": [
                    { "participant_user_id": "0190a5c4-0000-7000-8000-0000000000a2", "percentage": "0.5" },
                    { "participant_contact_id": "0190a5c4-0000-7000-8000-0000000000d1", "percentage": "0.5" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = Snapshot::parse(SNAPSHOT).unwrap();
        assert_eq!(snapshot.currency, Some(Currency::Usd));
        assert_eq!(snapshot.members.len(), 2);
        assert_eq!(snapshot.movements.len(), 1);
        assert_eq!(snapshot.movements[0].kind, "SPLIT");
        assert_eq!(snapshot.movements[0].participants.len(), 2);
        assert_eq!(snapshot.accounts[0].account_type, AccountType::Savings);
    }

    #[test]
    fn test_acting_user() {
        let snapshot = Snapshot::parse(SNAPSHOT).unwrap();
        let first = snapshot.members[0];
        assert_eq!(snapshot.acting_user(None).unwrap(), first);
        assert_eq!(
            snapshot.acting_user(Some(snapshot.members[1])).unwrap(),
            snapshot.members[1]
        );
        assert!(snapshot.acting_user(Some(UserId::new())).is_err());
    }

    #[tokio::test]
    async fn test_seed_registers_members() {
        let snapshot = Snapshot::parse(SNAPSHOT).unwrap();
        let ledger = InMemoryLedger::new();
        snapshot.seed(&ledger).await;

        let members = ledger.get_members(snapshot.household_id).await.unwrap();
        assert_eq!(members.len(), 2);
    }
}
