//! Movement ledger.
//!
//! This module implements the household movement ledger:
//! - Identity references (member or contact)
//! - Structural validation of movement inputs
//! - Authorization against the acting household
//! - Debt consolidation into net pairwise balances
//! - Collaborator ports and an in-memory implementation
//! - The movement service that ties them together

pub mod consolidation;
pub mod error;
pub mod guard;
pub mod memory;
pub mod party;
pub mod ports;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod consolidation_props;
#[cfg(test)]
mod validation_props;

pub use consolidation::{
    BALANCE_LIMIT, Consolidation, DebtBalance, DebtSummary, Provenance, SETTLED_TOLERANCE,
    consolidate,
};
pub use error::{ErrorCategory, MovementError};
pub use guard::AuthorizationGuard;
pub use memory::InMemoryLedger;
pub use party::{AmbiguousParty, Party};
pub use ports::{Accounts, Households, MovementRepository, PaymentMethods};
pub use service::MovementService;
pub use types::{
    Account, AccountType, CreateMovementInput, Movement, MovementFilter, MovementKind,
    NewMovement, Participant, ParticipantInput, PaymentMethod, UpdateMovementInput, YearMonth,
};
pub use validation::{
    MAX_AMOUNT, PERCENTAGE_TOLERANCE, apply_update, check_kind_rules, validate, validate_update,
};
