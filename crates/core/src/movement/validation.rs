//! Structural validation of movement inputs.
//!
//! Pure and stateless. Nothing here knows about households; membership and
//! ownership checks live in [`super::guard`].

use rust_decimal::Decimal;

use super::error::MovementError;
use super::party::Party;
use super::types::{
    CreateMovementInput, Movement, MovementKind, NewMovement, Participant, ParticipantInput,
    UpdateMovementInput,
};

/// Maximum distance of a SPLIT's percentage sum from 1.
pub const PERCENTAGE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Largest amount a single movement may carry: 10^15.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Validates a create input and resolves it into a [`NewMovement`].
///
/// Checks run in this order: kind, description, amount, movement date, payer,
/// counterparty shape, each participant, then the per-kind table.
///
/// # Errors
///
/// Returns the first violated rule as a validation `MovementError`.
pub fn validate(input: &CreateMovementInput) -> Result<NewMovement, MovementError> {
    let kind: MovementKind = input.kind.parse()?;

    let description = check_description(&input.description)?;
    check_amount(input.amount)?;
    let movement_date = input
        .movement_date
        .ok_or(MovementError::MissingMovementDate)?;

    let payer = Party::from_parts(input.payer_user_id, input.payer_contact_id)
        .map_err(|_| MovementError::InvalidPayer)?;

    let counterparty = match (input.counterparty_user_id, input.counterparty_contact_id) {
        (None, None) => None,
        (member, contact) => Some(
            Party::from_parts(member, contact).map_err(|_| MovementError::InvalidCounterparty)?,
        ),
    };

    let participants = resolve_participants(&input.participants)?;

    let movement = NewMovement {
        kind,
        description,
        amount: input.amount,
        category: normalize_category(input.category.as_deref()),
        movement_date,
        payer,
        counterparty,
        payment_method_id: input.payment_method_id,
        receiver_account_id: input.receiver_account_id,
        participants,
    };

    check_kind_rules(&movement)?;
    Ok(movement)
}

/// Validates the fields present in an update input.
///
/// Absent fields are not checked. A non-empty participant list must be
/// well-formed and sum to 1; an empty one is left to the per-kind table once
/// merged.
///
/// # Errors
///
/// Returns the first violated rule as a validation `MovementError`.
pub fn validate_update(input: &UpdateMovementInput) -> Result<(), MovementError> {
    if let Some(description) = &input.description {
        check_description(description)?;
    }
    if let Some(amount) = input.amount {
        check_amount(amount)?;
    }
    if let Some(participants) = &input.participants {
        let resolved = resolve_participants(participants)?;
        if !resolved.is_empty() {
            check_percentage_sum(&resolved)?;
        }
    }
    Ok(())
}

/// Merges an update into a stored movement and re-checks the per-kind table.
///
/// Kind, payer and counterparty always come from the stored movement.
///
/// # Errors
///
/// Returns a validation `MovementError` if the update or the merged movement
/// breaks a rule.
pub fn apply_update(
    current: &Movement,
    input: &UpdateMovementInput,
) -> Result<NewMovement, MovementError> {
    validate_update(input)?;

    let mut merged = current.to_new();
    if let Some(description) = &input.description {
        merged.description = check_description(description)?;
    }
    if let Some(amount) = input.amount {
        merged.amount = amount;
    }
    if let Some(category) = &input.category {
        merged.category = normalize_category(Some(category));
    }
    if let Some(movement_date) = input.movement_date {
        merged.movement_date = movement_date;
    }
    if let Some(payment_method_id) = input.payment_method_id {
        merged.payment_method_id = Some(payment_method_id);
    }
    if let Some(receiver_account_id) = input.receiver_account_id {
        merged.receiver_account_id = Some(receiver_account_id);
    }
    if let Some(participants) = &input.participants {
        merged.participants = resolve_participants(participants)?;
    }

    check_kind_rules(&merged)?;
    Ok(merged)
}

/// Applies the per-kind table of required and forbidden fields.
///
/// | Kind         | Category          | Payment method    | Counterparty      | Participants      |
/// |--------------|-------------------|-------------------|-------------------|-------------------|
/// | HOUSEHOLD    | required          | required          | forbidden         | forbidden         |
/// | SPLIT        | forbidden         | if payer member   | forbidden         | required, sum 1   |
/// | DEBT_PAYMENT | if payer member   | if payer member   | required, ≠ payer | forbidden         |
///
/// # Errors
///
/// Returns the first violated rule as a validation `MovementError`.
pub fn check_kind_rules(movement: &NewMovement) -> Result<(), MovementError> {
    let kind = movement.kind;
    let payer_is_member = movement.payer.is_member();

    match kind {
        MovementKind::Household => {
            if movement.category.is_none() {
                return Err(MovementError::MissingCategory(kind));
            }
            if movement.payment_method_id.is_none() {
                return Err(MovementError::MissingPaymentMethod(kind));
            }
            if movement.counterparty.is_some() {
                return Err(MovementError::CounterpartyNotAllowed(kind));
            }
            if !movement.participants.is_empty() {
                return Err(MovementError::ParticipantsNotAllowed(kind));
            }
        }
        MovementKind::Split => {
            if movement.category.is_some() {
                return Err(MovementError::CategoryNotAllowed(kind));
            }
            if payer_is_member && movement.payment_method_id.is_none() {
                return Err(MovementError::MissingPaymentMethod(kind));
            }
            if movement.counterparty.is_some() {
                return Err(MovementError::CounterpartyNotAllowed(kind));
            }
            if movement.participants.is_empty() {
                return Err(MovementError::MissingParticipants);
            }
            check_percentage_sum(&movement.participants)?;
        }
        MovementKind::DebtPayment => {
            if payer_is_member && movement.category.is_none() {
                return Err(MovementError::MissingCategory(kind));
            }
            if payer_is_member && movement.payment_method_id.is_none() {
                return Err(MovementError::MissingPaymentMethod(kind));
            }
            let counterparty = movement
                .counterparty
                .ok_or(MovementError::MissingCounterparty)?;
            if counterparty == movement.payer {
                return Err(MovementError::SelfPayment);
            }
            if !movement.participants.is_empty() {
                return Err(MovementError::ParticipantsNotAllowed(kind));
            }
        }
    }

    Ok(())
}

fn check_description(description: &str) -> Result<String, MovementError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(MovementError::EmptyDescription);
    }
    Ok(trimmed.to_string())
}

fn check_amount(amount: Decimal) -> Result<(), MovementError> {
    if amount <= Decimal::ZERO {
        return Err(MovementError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(MovementError::AmountTooLarge(amount));
    }
    Ok(())
}

// Blank categories count as absent.
fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn resolve_participants(inputs: &[ParticipantInput]) -> Result<Vec<Participant>, MovementError> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let party = Party::from_parts(input.participant_user_id, input.participant_contact_id)
                .map_err(|_| MovementError::InvalidParticipant { index })?;
            if input.percentage <= Decimal::ZERO || input.percentage > Decimal::ONE {
                return Err(MovementError::InvalidPercentage {
                    index,
                    percentage: input.percentage,
                });
            }
            Ok(Participant {
                party,
                percentage: input.percentage,
            })
        })
        .collect()
}

fn check_percentage_sum(participants: &[Participant]) -> Result<(), MovementError> {
    let sum: Decimal = participants.iter().map(|p| p.percentage).sum();
    if (sum - Decimal::ONE).abs() > PERCENTAGE_TOLERANCE {
        return Err(MovementError::PercentageSumOutOfTolerance { sum });
    }
    Ok(())
}
