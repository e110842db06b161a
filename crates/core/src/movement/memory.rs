//! In-memory implementation of the collaborator ports.
//!
//! Backs the CLI and the service tests. State lives behind a single
//! `tokio::sync::RwLock`; there is no persistence.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use hearth_shared::types::{AccountId, HouseholdId, MovementId, PaymentMethodId, UserId};
use tokio::sync::RwLock;

use super::error::MovementError;
use super::ports::{Accounts, Households, MovementRepository, PaymentMethods};
use super::types::{Account, Movement, MovementFilter, PaymentMethod};

#[derive(Debug, Default)]
struct LedgerState {
    memberships: BTreeMap<HouseholdId, BTreeSet<UserId>>,
    payment_methods: HashMap<PaymentMethodId, PaymentMethod>,
    accounts: HashMap<AccountId, Account>,
    movements: BTreeMap<MovementId, Movement>,
}

/// Households, resources and movements held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to a household, creating the household if needed.
    pub async fn add_member(&self, household_id: HouseholdId, user_id: UserId) {
        self.state
            .write()
            .await
            .memberships
            .entry(household_id)
            .or_default()
            .insert(user_id);
    }

    /// Removes a user from a household.
    pub async fn remove_member(&self, household_id: HouseholdId, user_id: UserId) {
        if let Some(members) = self.state.write().await.memberships.get_mut(&household_id) {
            members.remove(&user_id);
        }
    }

    /// Registers a payment method.
    pub async fn add_payment_method(&self, payment_method: PaymentMethod) {
        self.state
            .write()
            .await
            .payment_methods
            .insert(payment_method.id, payment_method);
    }

    /// Registers an account.
    pub async fn add_account(&self, account: Account) {
        self.state.write().await.accounts.insert(account.id, account);
    }

    /// Number of stored movements across all households.
    pub async fn movement_count(&self) -> usize {
        self.state.read().await.movements.len()
    }
}

#[async_trait]
impl MovementRepository for InMemoryLedger {
    async fn list_by_household(
        &self,
        household_id: HouseholdId,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, MovementError> {
        let state = self.state.read().await;
        let mut movements: Vec<Movement> = state
            .movements
            .values()
            .filter(|m| m.household_id == household_id && filter.matches(m))
            .cloned()
            .collect();
        movements.sort_by_key(|m| (m.movement_date, m.id));
        Ok(movements)
    }

    async fn get(
        &self,
        household_id: HouseholdId,
        movement_id: MovementId,
    ) -> Result<Option<Movement>, MovementError> {
        let state = self.state.read().await;
        Ok(state
            .movements
            .get(&movement_id)
            .filter(|m| m.household_id == household_id)
            .cloned())
    }

    async fn insert(&self, movement: Movement) -> Result<(), MovementError> {
        let mut state = self.state.write().await;
        if state.movements.contains_key(&movement.id) {
            return Err(MovementError::DuplicateMovement(movement.id));
        }
        state.movements.insert(movement.id, movement);
        Ok(())
    }

    async fn update(&self, movement: Movement) -> Result<(), MovementError> {
        let mut state = self.state.write().await;
        match state.movements.get_mut(&movement.id) {
            Some(stored) if stored.household_id == movement.household_id => {
                *stored = movement;
                Ok(())
            }
            _ => Err(MovementError::MovementNotFound(movement.id)),
        }
    }

    async fn delete(
        &self,
        household_id: HouseholdId,
        movement_id: MovementId,
    ) -> Result<bool, MovementError> {
        let mut state = self.state.write().await;
        let owned = state
            .movements
            .get(&movement_id)
            .is_some_and(|m| m.household_id == household_id);
        if owned {
            state.movements.remove(&movement_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl Households for InMemoryLedger {
    async fn get_user_household_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<HouseholdId>, MovementError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .find(|(_, members)| members.contains(&user_id))
            .map(|(household_id, _)| *household_id))
    }

    async fn is_user_member(
        &self,
        household_id: HouseholdId,
        user_id: UserId,
    ) -> Result<bool, MovementError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .get(&household_id)
            .is_some_and(|members| members.contains(&user_id)))
    }

    async fn get_members(&self, household_id: HouseholdId) -> Result<Vec<UserId>, MovementError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .get(&household_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PaymentMethods for InMemoryLedger {
    async fn get_by_id(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, MovementError> {
        Ok(self.state.read().await.payment_methods.get(&id).cloned())
    }
}

#[async_trait]
impl Accounts for InMemoryLedger {
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, MovementError> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }
}
