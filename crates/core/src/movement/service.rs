//! Movement service.
//!
//! Orchestrates validation, authorization, persistence and consolidation on
//! behalf of an acting user. The acting user's household scopes every
//! operation; movements of other households are reported as not found.

use std::collections::HashSet;

use chrono::Utc;
use hearth_shared::types::{Currency, HouseholdId, MovementId, UserId};
use tracing::{debug, info};

use super::consolidation::{Consolidation, consolidate};
use super::error::MovementError;
use super::guard::AuthorizationGuard;
use super::ports::{Accounts, Households, MovementRepository, PaymentMethods};
use super::types::{
    CreateMovementInput, Movement, MovementFilter, UpdateMovementInput, YearMonth,
};
use super::validation::{apply_update, validate, validate_update};

/// Movement service over borrowed collaborators.
pub struct MovementService<'a, R, H, P, A> {
    repository: &'a R,
    households: &'a H,
    payment_methods: &'a P,
    accounts: &'a A,
    currency: Currency,
}

impl<'a, R, H, P, A> MovementService<'a, R, H, P, A>
where
    R: MovementRepository,
    H: Households,
    P: PaymentMethods,
    A: Accounts,
{
    /// Creates a service recording movements in `currency`.
    #[must_use]
    pub const fn new(
        repository: &'a R,
        households: &'a H,
        payment_methods: &'a P,
        accounts: &'a A,
        currency: Currency,
    ) -> Self {
        Self {
            repository,
            households,
            payment_methods,
            accounts,
            currency,
        }
    }

    fn guard(&self) -> AuthorizationGuard<'a, H, P, A> {
        AuthorizationGuard::new(self.households, self.payment_methods, self.accounts)
    }

    async fn household_of(&self, user_id: UserId) -> Result<HouseholdId, MovementError> {
        self.households
            .get_user_household_id(user_id)
            .await?
            .ok_or(MovementError::HouseholdNotFound(user_id))
    }

    /// Validates, authorizes and stores a new movement.
    ///
    /// # Errors
    ///
    /// Returns `HouseholdNotFound` if the acting user has no household, a
    /// validation or authorization error if the input is rejected, or
    /// `Repository` if storage fails.
    pub async fn create(
        &self,
        acting_user: UserId,
        input: CreateMovementInput,
    ) -> Result<Movement, MovementError> {
        let household_id = self.household_of(acting_user).await?;
        let movement = validate(&input)?;
        self.guard().authorize(household_id, &movement).await?;

        let movement = Movement::record(
            MovementId::new(),
            household_id,
            self.currency,
            movement,
            Utc::now(),
        );
        self.repository.insert(movement.clone()).await?;

        info!(
            movement_id = %movement.id,
            household_id = %household_id,
            kind = %movement.kind,
            amount = %movement.amount,
            "Movement created"
        );
        Ok(movement)
    }

    /// Applies an update to a stored movement.
    ///
    /// The merged movement must still satisfy the per-kind rules and the
    /// household checks.
    ///
    /// # Errors
    ///
    /// Returns `MovementNotFound` if the movement is not in the acting user's
    /// household, plus the same errors as [`Self::create`].
    pub async fn update(
        &self,
        acting_user: UserId,
        movement_id: MovementId,
        input: UpdateMovementInput,
    ) -> Result<Movement, MovementError> {
        let household_id = self.household_of(acting_user).await?;
        validate_update(&input)?;

        let mut movement = self
            .repository
            .get(household_id, movement_id)
            .await?
            .ok_or(MovementError::MovementNotFound(movement_id))?;

        let merged = apply_update(&movement, &input)?;
        self.guard().authorize(household_id, &merged).await?;

        movement.apply(merged, Utc::now());
        self.repository.update(movement.clone()).await?;

        info!(movement_id = %movement_id, household_id = %household_id, "Movement updated");
        Ok(movement)
    }

    /// Hard-deletes a movement and its participants.
    ///
    /// # Errors
    ///
    /// Returns `MovementNotFound` if the movement is not in the acting user's
    /// household.
    pub async fn delete(
        &self,
        acting_user: UserId,
        movement_id: MovementId,
    ) -> Result<(), MovementError> {
        let household_id = self.household_of(acting_user).await?;
        if !self.repository.delete(household_id, movement_id).await? {
            return Err(MovementError::MovementNotFound(movement_id));
        }

        info!(movement_id = %movement_id, household_id = %household_id, "Movement deleted");
        Ok(())
    }

    /// Loads one movement of the acting user's household.
    ///
    /// # Errors
    ///
    /// Returns `MovementNotFound` if the movement is not in the household.
    pub async fn get(
        &self,
        acting_user: UserId,
        movement_id: MovementId,
    ) -> Result<Movement, MovementError> {
        let household_id = self.household_of(acting_user).await?;
        self.repository
            .get(household_id, movement_id)
            .await?
            .ok_or(MovementError::MovementNotFound(movement_id))
    }

    /// Lists the acting user's household movements matching the filter.
    pub async fn list(
        &self,
        acting_user: UserId,
        filter: &MovementFilter,
    ) -> Result<Vec<Movement>, MovementError> {
        let household_id = self.household_of(acting_user).await?;
        self.repository.list_by_household(household_id, filter).await
    }

    /// Consolidates the acting user's household debts, optionally for one month.
    ///
    /// Fetches the movements once, then computes balances and the
    /// member/non-member summary in memory.
    pub async fn consolidate(
        &self,
        acting_user: UserId,
        month: Option<YearMonth>,
    ) -> Result<Consolidation, MovementError> {
        let household_id = self.household_of(acting_user).await?;
        let movements = self
            .repository
            .list_by_household(household_id, &MovementFilter::for_month(month))
            .await?;
        let members: HashSet<UserId> = self
            .households
            .get_members(household_id)
            .await?
            .into_iter()
            .collect();

        debug!(
            household_id = %household_id,
            movements = movements.len(),
            members = members.len(),
            "Consolidating household debts"
        );
        Ok(consolidate(&movements, Some(&members)))
    }
}
