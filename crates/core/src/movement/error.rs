//! Movement error types.
//!
//! This module defines all errors that can occur while validating, authorizing,
//! loading or persisting movements. Consolidation itself never fails.

use hearth_shared::AppError;
use hearth_shared::types::{AccountId, MovementId, PaymentMethodId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::MovementKind;
use super::validation::MAX_AMOUNT;

/// Broad classification of a [`MovementError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A structural rule of the movement was violated.
    Validation,
    /// A referenced entity is outside the acting household.
    Authorization,
    /// A referenced movement or household does not exist.
    NotFound,
    /// The write clashes with data already stored.
    Conflict,
    /// A collaborator failed.
    Infrastructure,
}

/// Errors that can occur during movement operations.
#[derive(Debug, Error)]
pub enum MovementError {
    // ========== Validation Errors ==========
    /// Movement kind is not one of HOUSEHOLD, SPLIT, DEBT_PAYMENT.
    #[error("Invalid movement type: {0}")]
    InvalidKind(String),

    /// Description is empty.
    #[error("Description is required")]
    EmptyDescription,

    /// Amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount is above the largest amount a movement may carry.
    #[error("Amount must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// Movement date is not set.
    #[error("Movement date is required")]
    MissingMovementDate,

    /// Payer must be exactly one of member or contact.
    #[error("Exactly one of payer member or payer contact must be set")]
    InvalidPayer,

    /// Counterparty has both member and contact set.
    #[error("Counterparty must be either a member or a contact, not both")]
    InvalidCounterparty,

    /// Category is required for this kind of movement.
    #[error("Category is required for {0} movements")]
    MissingCategory(MovementKind),

    /// Category is not allowed for this kind of movement.
    #[error("Category is not allowed for {0} movements")]
    CategoryNotAllowed(MovementKind),

    /// Payment method is required for this kind of movement.
    #[error("Payment method is required for {0} movements")]
    MissingPaymentMethod(MovementKind),

    /// Counterparty is not allowed for this kind of movement.
    #[error("Counterparty is not allowed for {0} movements")]
    CounterpartyNotAllowed(MovementKind),

    /// Debt payment without counterparty.
    #[error("Counterparty is required for DEBT_PAYMENT movements")]
    MissingCounterparty,

    /// Payer and counterparty are the same person.
    #[error("Payer and counterparty cannot be the same person")]
    SelfPayment,

    /// Participants are not allowed for this kind of movement.
    #[error("Participants are not allowed for {0} movements")]
    ParticipantsNotAllowed(MovementKind),

    /// Split movement without participants.
    #[error("SPLIT movements require at least one participant")]
    MissingParticipants,

    /// Participant must be exactly one of member or contact.
    #[error("Participant {index}: exactly one of member or contact must be set")]
    InvalidParticipant {
        /// Position of the participant in the input list.
        index: usize,
    },

    /// Participant percentage outside (0, 1].
    #[error("Participant {index}: percentage must be in (0, 1], got {percentage}")]
    InvalidPercentage {
        /// Position of the participant in the input list.
        index: usize,
        /// The rejected percentage.
        percentage: Decimal,
    },

    /// Participant percentages do not add up to 1.
    #[error("Participant percentages must sum to 1, got {sum}")]
    PercentageSumOutOfTolerance {
        /// Sum of all participant percentages.
        sum: Decimal,
    },

    /// Month filter could not be parsed.
    #[error("Invalid month {0}, expected YYYY-MM")]
    InvalidMonth(String),

    // ========== Authorization Errors ==========
    /// Referenced user is not a member of the household.
    #[error("User {0} is not a member of the household")]
    NotHouseholdMember(UserId),

    /// Payment method is unknown or owned by another household.
    #[error("Payment method {0} does not belong to the household")]
    PaymentMethodNotInHousehold(PaymentMethodId),

    /// Debt payment to a member needs the account that receives the money.
    #[error("Receiver account is required when paying a household member")]
    MissingReceiverAccount,

    /// Account is unknown or owned by another household.
    #[error("Account {0} does not belong to the household")]
    AccountNotInHousehold(AccountId),

    /// Account type cannot receive income.
    #[error("Account {0} cannot receive income")]
    AccountNotIncomeEligible(AccountId),

    // ========== Not Found Errors ==========
    /// Movement not found.
    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    /// User does not belong to any household.
    #[error("No household found for user {0}")]
    HouseholdNotFound(UserId),

    // ========== Conflict Errors ==========
    /// A movement with this id is already stored.
    #[error("Movement already exists: {0}")]
    DuplicateMovement(MovementId),

    // ========== Infrastructure Errors ==========
    /// A collaborator failed.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl MovementError {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidKind(_)
            | Self::EmptyDescription
            | Self::NonPositiveAmount(_)
            | Self::AmountTooLarge(_)
            | Self::MissingMovementDate
            | Self::InvalidPayer
            | Self::InvalidCounterparty
            | Self::MissingCategory(_)
            | Self::CategoryNotAllowed(_)
            | Self::MissingPaymentMethod(_)
            | Self::CounterpartyNotAllowed(_)
            | Self::MissingCounterparty
            | Self::SelfPayment
            | Self::ParticipantsNotAllowed(_)
            | Self::MissingParticipants
            | Self::InvalidParticipant { .. }
            | Self::InvalidPercentage { .. }
            | Self::PercentageSumOutOfTolerance { .. }
            | Self::InvalidMonth(_) => ErrorCategory::Validation,

            Self::NotHouseholdMember(_)
            | Self::PaymentMethodNotInHousehold(_)
            | Self::MissingReceiverAccount
            | Self::AccountNotInHousehold(_)
            | Self::AccountNotIncomeEligible(_) => ErrorCategory::Authorization,

            Self::MovementNotFound(_) | Self::HouseholdNotFound(_) => ErrorCategory::NotFound,

            Self::DuplicateMovement(_) => ErrorCategory::Conflict,

            Self::Repository(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKind(_) => "INVALID_MOVEMENT_TYPE",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::MissingMovementDate => "MISSING_MOVEMENT_DATE",
            Self::InvalidPayer => "INVALID_PAYER",
            Self::InvalidCounterparty => "INVALID_COUNTERPARTY",
            Self::MissingCategory(_) => "MISSING_CATEGORY",
            Self::CategoryNotAllowed(_) => "CATEGORY_NOT_ALLOWED",
            Self::MissingPaymentMethod(_) => "MISSING_PAYMENT_METHOD",
            Self::CounterpartyNotAllowed(_) => "COUNTERPARTY_NOT_ALLOWED",
            Self::MissingCounterparty => "MISSING_COUNTERPARTY",
            Self::SelfPayment => "SELF_PAYMENT",
            Self::ParticipantsNotAllowed(_) => "PARTICIPANTS_NOT_ALLOWED",
            Self::MissingParticipants => "MISSING_PARTICIPANTS",
            Self::InvalidParticipant { .. } => "INVALID_PARTICIPANT",
            Self::InvalidPercentage { .. } => "INVALID_PERCENTAGE",
            Self::PercentageSumOutOfTolerance { .. } => "PERCENTAGE_SUM_MISMATCH",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::NotHouseholdMember(_) => "NOT_HOUSEHOLD_MEMBER",
            Self::PaymentMethodNotInHousehold(_) => "PAYMENT_METHOD_NOT_IN_HOUSEHOLD",
            Self::MissingReceiverAccount => "MISSING_RECEIVER_ACCOUNT",
            Self::AccountNotInHousehold(_) => "ACCOUNT_NOT_IN_HOUSEHOLD",
            Self::AccountNotIncomeEligible(_) => "ACCOUNT_NOT_INCOME_ELIGIBLE",
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::HouseholdNotFound(_) => "HOUSEHOLD_NOT_FOUND",
            Self::DuplicateMovement(_) => "DUPLICATE_MOVEMENT",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 400,
            ErrorCategory::Authorization => 403,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Infrastructure => 500,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Validation, authorization, not-found and conflict errors are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(_))
    }
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Validation => Self::Validation(message),
            ErrorCategory::Authorization => Self::Forbidden(message),
            ErrorCategory::NotFound => Self::NotFound(message),
            ErrorCategory::Conflict => Self::Conflict(message),
            ErrorCategory::Infrastructure => Self::Repository(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MovementError::InvalidKind("LOAN".into()).error_code(),
            "INVALID_MOVEMENT_TYPE"
        );
        assert_eq!(
            MovementError::PercentageSumOutOfTolerance { sum: dec!(1.0002) }.error_code(),
            "PERCENTAGE_SUM_MISMATCH"
        );
        assert_eq!(
            MovementError::MissingReceiverAccount.error_code(),
            "MISSING_RECEIVER_ACCOUNT"
        );
        assert_eq!(
            MovementError::AmountTooLarge(dec!(2000000000000000)).error_code(),
            "AMOUNT_TOO_LARGE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(MovementError::EmptyDescription.http_status_code(), 400);
        assert_eq!(
            MovementError::NotHouseholdMember(UserId::new()).http_status_code(),
            403
        );
        assert_eq!(
            MovementError::MovementNotFound(MovementId::new()).http_status_code(),
            404
        );
        assert_eq!(
            MovementError::DuplicateMovement(MovementId::new()).http_status_code(),
            409
        );
        assert_eq!(
            MovementError::Repository("down".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(MovementError::Repository("timeout".into()).is_retryable());
        assert!(!MovementError::SelfPayment.is_retryable());
        assert!(!MovementError::MissingReceiverAccount.is_retryable());
        assert!(!MovementError::DuplicateMovement(MovementId::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            MovementError::MissingCategory(MovementKind::Household).to_string(),
            "Category is required for HOUSEHOLD movements"
        );
        assert_eq!(
            MovementError::PercentageSumOutOfTolerance { sum: dec!(0.75) }.to_string(),
            "Participant percentages must sum to 1, got 0.75"
        );
        assert_eq!(
            MovementError::AmountTooLarge(dec!(2000000000000000)).to_string(),
            "Amount must not exceed 1000000000000000, got 2000000000000000"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = MovementError::SelfPayment.into();
        assert!(matches!(app, AppError::Validation(_)));

        let app: AppError = MovementError::AccountNotIncomeEligible(AccountId::new()).into();
        assert!(matches!(app, AppError::Forbidden(_)));

        let app: AppError = MovementError::HouseholdNotFound(UserId::new()).into();
        assert!(matches!(app, AppError::NotFound(_)));

        let app: AppError = MovementError::DuplicateMovement(MovementId::new()).into();
        assert!(matches!(app, AppError::Conflict(_)));
    }
}
