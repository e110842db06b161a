//! Collaborator contracts consumed by the movement ledger.
//!
//! Storage, membership and resource lookups live outside this crate. Every
//! method reports collaborator failures as [`MovementError::Repository`].

use async_trait::async_trait;
use hearth_shared::types::{AccountId, HouseholdId, MovementId, PaymentMethodId, UserId};

use super::error::MovementError;
use super::types::{Account, Movement, MovementFilter, PaymentMethod};

/// Movement storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// Lists a household's movements matching the filter, participants included.
    async fn list_by_household(
        &self,
        household_id: HouseholdId,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, MovementError>;

    /// Loads a movement owned by the household.
    async fn get(
        &self,
        household_id: HouseholdId,
        movement_id: MovementId,
    ) -> Result<Option<Movement>, MovementError>;

    /// Stores a new movement.
    async fn insert(&self, movement: Movement) -> Result<(), MovementError>;

    /// Replaces a stored movement.
    async fn update(&self, movement: Movement) -> Result<(), MovementError>;

    /// Hard-deletes a movement and its participants. Returns false if absent.
    async fn delete(
        &self,
        household_id: HouseholdId,
        movement_id: MovementId,
    ) -> Result<bool, MovementError>;
}

/// Household membership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Households: Send + Sync {
    /// Household the user belongs to, if any.
    async fn get_user_household_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<HouseholdId>, MovementError>;

    /// Returns true if the user is a current member of the household.
    async fn is_user_member(
        &self,
        household_id: HouseholdId,
        user_id: UserId,
    ) -> Result<bool, MovementError>;

    /// Current members of the household.
    async fn get_members(&self, household_id: HouseholdId) -> Result<Vec<UserId>, MovementError>;
}

/// Payment method lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentMethods: Send + Sync {
    /// Loads a payment method by id.
    async fn get_by_id(&self, id: PaymentMethodId)
    -> Result<Option<PaymentMethod>, MovementError>;
}

/// Account lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Loads an account by id.
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, MovementError>;
}
