//! Movement domain types.
//!
//! Inputs (`CreateMovementInput`, `UpdateMovementInput`) mirror what arrives from
//! the outside world: loosely typed, with the member/contact halves of each person
//! as separate optional fields. Validation turns them into a `NewMovement`, whose
//! people are [`Party`] values, and persistence turns that into a `Movement`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use hearth_shared::types::{
    AccountId, ContactId, Currency, HouseholdId, MovementId, PaymentMethodId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::MovementError;
use super::party::Party;

/// Movement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Expense of the household as a whole.
    Household,
    /// Expense paid by one person and shared among participants.
    Split,
    /// Payment that settles (part of) a debt between two people.
    DebtPayment,
}

impl MovementKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Household => "HOUSEHOLD",
            Self::Split => "SPLIT",
            Self::DebtPayment => "DEBT_PAYMENT",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for MovementKind {
    type Err = MovementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOUSEHOLD" => Ok(Self::Household),
            "SPLIT" => Ok(Self::Split),
            "DEBT_PAYMENT" => Ok(Self::DebtPayment),
            other => Err(MovementError::InvalidKind(other.to_string())),
        }
    }
}

/// A person's share of a SPLIT movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Who owes the share.
    pub party: Party,
    /// Fraction of the amount, in (0, 1].
    pub percentage: Decimal,
}

/// Participant as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantInput {
    /// Member half of the participant.
    #[serde(default)]
    pub participant_user_id: Option<UserId>,
    /// Contact half of the participant.
    #[serde(default)]
    pub participant_contact_id: Option<ContactId>,
    /// Fraction of the amount, in (0, 1].
    pub percentage: Decimal,
}

impl ParticipantInput {
    /// Share owed by a household member.
    #[must_use]
    pub fn member(user_id: UserId, percentage: Decimal) -> Self {
        Self {
            participant_user_id: Some(user_id),
            participant_contact_id: None,
            percentage,
        }
    }

    /// Share owed by an external contact.
    #[must_use]
    pub fn contact(contact_id: ContactId, percentage: Decimal) -> Self {
        Self {
            participant_user_id: None,
            participant_contact_id: Some(contact_id),
            percentage,
        }
    }
}

/// Input for creating a movement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMovementInput {
    /// Raw movement kind; unknown values are rejected by validation.
    #[serde(rename = "type")]
    pub kind: String,
    /// What the money was for.
    pub description: String,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Category name.
    #[serde(default)]
    pub category: Option<String>,
    /// Date the movement happened.
    #[serde(default)]
    pub movement_date: Option<NaiveDate>,
    /// Member half of the payer.
    #[serde(default)]
    pub payer_user_id: Option<UserId>,
    /// Contact half of the payer.
    #[serde(default)]
    pub payer_contact_id: Option<ContactId>,
    /// Member half of the counterparty.
    #[serde(default)]
    pub counterparty_user_id: Option<UserId>,
    /// Contact half of the counterparty.
    #[serde(default)]
    pub counterparty_contact_id: Option<ContactId>,
    /// Payment method used.
    #[serde(default)]
    pub payment_method_id: Option<PaymentMethodId>,
    /// Account receiving a debt payment made to a member.
    #[serde(default)]
    pub receiver_account_id: Option<AccountId>,
    /// Shares of a SPLIT movement.
    #[serde(default)]
    pub participants: Vec<ParticipantInput>,
}

/// Input for updating a movement. Only the fields that are set change.
///
/// Kind, payer and counterparty cannot be changed after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMovementInput {
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New movement date.
    #[serde(default)]
    pub movement_date: Option<NaiveDate>,
    /// New payment method.
    #[serde(default)]
    pub payment_method_id: Option<PaymentMethodId>,
    /// New receiver account.
    #[serde(default)]
    pub receiver_account_id: Option<AccountId>,
    /// Replacement participant list.
    #[serde(default)]
    pub participants: Option<Vec<ParticipantInput>>,
}

/// A movement that passed structural validation and is ready to be authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    /// Movement kind.
    pub kind: MovementKind,
    /// Description.
    pub description: String,
    /// Amount.
    pub amount: Decimal,
    /// Category.
    pub category: Option<String>,
    /// Movement date.
    pub movement_date: NaiveDate,
    /// Who paid.
    pub payer: Party,
    /// Who a DEBT_PAYMENT was made to.
    pub counterparty: Option<Party>,
    /// Payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Receiver account.
    pub receiver_account_id: Option<AccountId>,
    /// Shares of a SPLIT.
    pub participants: Vec<Participant>,
}

impl NewMovement {
    /// Every member referenced as payer, counterparty or participant.
    pub fn member_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        std::iter::once(self.payer)
            .chain(self.counterparty)
            .chain(self.participants.iter().map(|p| p.party))
            .filter_map(|party| party.member_id())
    }
}

/// A persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier.
    pub id: MovementId,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Movement kind.
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Description.
    pub description: String,
    /// Amount.
    pub amount: Decimal,
    /// Category.
    pub category: Option<String>,
    /// Movement date.
    pub movement_date: NaiveDate,
    /// Household currency.
    pub currency: Currency,
    /// Who paid.
    pub payer: Party,
    /// Who a DEBT_PAYMENT was made to.
    pub counterparty: Option<Party>,
    /// Payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Receiver account.
    pub receiver_account_id: Option<AccountId>,
    /// Shares of a SPLIT.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// When the movement was created.
    pub created_at: DateTime<Utc>,
    /// When the movement was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Movement {
    /// Records a validated movement for a household.
    #[must_use]
    pub fn record(
        id: MovementId,
        household_id: HouseholdId,
        currency: Currency,
        movement: NewMovement,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            household_id,
            kind: movement.kind,
            description: movement.description,
            amount: movement.amount,
            category: movement.category,
            movement_date: movement.movement_date,
            currency,
            payer: movement.payer,
            counterparty: movement.counterparty,
            payment_method_id: movement.payment_method_id,
            receiver_account_id: movement.receiver_account_id,
            participants: movement.participants,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the mutable content of this movement as a `NewMovement`.
    #[must_use]
    pub fn to_new(&self) -> NewMovement {
        NewMovement {
            kind: self.kind,
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.clone(),
            movement_date: self.movement_date,
            payer: self.payer,
            counterparty: self.counterparty,
            payment_method_id: self.payment_method_id,
            receiver_account_id: self.receiver_account_id,
            participants: self.participants.clone(),
        }
    }

    /// Replaces the mutable content, keeping identity, ownership and creation time.
    pub fn apply(&mut self, movement: NewMovement, now: DateTime<Utc>) {
        self.description = movement.description;
        self.amount = movement.amount;
        self.category = movement.category;
        self.movement_date = movement.movement_date;
        self.payment_method_id = movement.payment_method_id;
        self.receiver_account_id = movement.receiver_account_id;
        self.participants = movement.participants;
        self.updated_at = now;
    }

    /// Returns true if the member pays, receives, or shares in this movement.
    #[must_use]
    pub fn involves_member(&self, user_id: UserId) -> bool {
        let target = Party::Member(user_id);
        self.payer == target
            || self.counterparty == Some(target)
            || self.participants.iter().any(|p| p.party == target)
    }
}

/// Calendar month used to narrow consolidation and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month, or `None` if `month` is not in 1..=12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing the given date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns true if the date falls in this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-based.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = MovementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MovementError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// Filter options for listing movements of a household.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Filter by kind.
    pub kind: Option<MovementKind>,
    /// Filter by calendar month.
    pub month: Option<YearMonth>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Only movements involving this member.
    pub member_id: Option<UserId>,
}

impl MovementFilter {
    /// Filter for a single calendar month.
    #[must_use]
    pub fn for_month(month: Option<YearMonth>) -> Self {
        Self {
            month,
            ..Self::default()
        }
    }

    /// Returns true if the movement passes every set criterion.
    #[must_use]
    pub fn matches(&self, movement: &Movement) -> bool {
        self.kind.is_none_or(|kind| movement.kind == kind)
            && self
                .month
                .is_none_or(|month| month.contains(movement.movement_date))
            && self
                .date_from
                .is_none_or(|from| movement.movement_date >= from)
            && self.date_to.is_none_or(|to| movement.movement_date <= to)
            && self
                .member_id
                .is_none_or(|user_id| movement.involves_member(user_id))
    }
}

/// Payment method as seen by the authorization guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Unique identifier.
    pub id: PaymentMethodId,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Display name.
    pub name: String,
}

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Savings account.
    Savings,
    /// Checking account.
    Checking,
    /// Cash on hand.
    Cash,
    /// Credit card.
    CreditCard,
    /// Loan.
    Loan,
}

impl AccountType {
    /// Returns true if money can be received into this kind of account.
    #[must_use]
    pub const fn is_income_eligible(&self) -> bool {
        matches!(self, Self::Savings | Self::Checking | Self::Cash)
    }
}

/// Household account as seen by the authorization guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
}
