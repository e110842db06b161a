//! Authorization of validated movements against the acting household.

use std::collections::BTreeSet;

use hearth_shared::types::{HouseholdId, UserId};
use tracing::debug;

use super::error::MovementError;
use super::party::Party;
use super::ports::{Accounts, Households, PaymentMethods};
use super::types::{MovementKind, NewMovement};

/// Checks that everything a movement references belongs to one household.
///
/// Member references must be current members. Contact references are not
/// checked here; their existence is enforced by the repository. A payment
/// method or account that does not exist is rejected the same way as one that
/// belongs to another household.
pub struct AuthorizationGuard<'a, H, P, A> {
    households: &'a H,
    payment_methods: &'a P,
    accounts: &'a A,
}

impl<'a, H, P, A> AuthorizationGuard<'a, H, P, A>
where
    H: Households,
    P: PaymentMethods,
    A: Accounts,
{
    /// Creates a guard over the given collaborators.
    #[must_use]
    pub const fn new(households: &'a H, payment_methods: &'a P, accounts: &'a A) -> Self {
        Self {
            households,
            payment_methods,
            accounts,
        }
    }

    /// Authorizes a validated movement for the household.
    ///
    /// # Errors
    ///
    /// Returns an authorization `MovementError` for the first reference outside
    /// the household, or `Repository` if a collaborator fails.
    pub async fn authorize(
        &self,
        household_id: HouseholdId,
        movement: &NewMovement,
    ) -> Result<(), MovementError> {
        let members: BTreeSet<UserId> = movement.member_ids().collect();
        for user_id in members {
            if !self.households.is_user_member(household_id, user_id).await? {
                return Err(MovementError::NotHouseholdMember(user_id));
            }
        }

        if let Some(payment_method_id) = movement.payment_method_id {
            match self.payment_methods.get_by_id(payment_method_id).await? {
                Some(method) if method.household_id == household_id => {}
                _ => {
                    return Err(MovementError::PaymentMethodNotInHousehold(
                        payment_method_id,
                    ));
                }
            }
        }

        let pays_member = movement.kind == MovementKind::DebtPayment
            && movement.counterparty.as_ref().is_some_and(Party::is_member);

        match movement.receiver_account_id {
            None if pays_member => return Err(MovementError::MissingReceiverAccount),
            None => {}
            Some(account_id) => match self.accounts.get_by_id(account_id).await? {
                Some(account) if account.household_id != household_id => {
                    return Err(MovementError::AccountNotInHousehold(account_id));
                }
                Some(account) if !account.account_type.is_income_eligible() => {
                    return Err(MovementError::AccountNotIncomeEligible(account_id));
                }
                Some(_) => {}
                None => return Err(MovementError::AccountNotInHousehold(account_id)),
            },
        }

        debug!(
            household_id = %household_id,
            kind = %movement.kind,
            payer = %movement.payer,
            "Movement authorized"
        );
        Ok(())
    }
}
