//! [`Sale`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{customer, lot, Payment};
#[cfg(doc)]
use crate::domain::{Customer, Lot};

/// Commitment of a [`Customer`] to purchase a [`Lot`], tracked through a
/// payment lifecycle.
///
/// [`Customer`]: crate::domain::Customer
#[derive(Clone, Debug)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// ID of the [`Lot`] being purchased.
    pub lot_id: lot::Id,

    /// ID of the [`Customer`] purchasing the [`Lot`].
    ///
    /// [`Customer`]: crate::domain::Customer
    pub customer_id: customer::Id,

    /// Total price of this [`Sale`], fixed at its creation as the [`Lot`]
    /// size multiplied by the price per square meter.
    pub total_price: Money,

    /// Cached [`Financials`] of this [`Sale`].
    ///
    /// Derived from the [`Payment`]s referencing this [`Sale`], never
    /// authored directly.
    pub financials: Financials,

    /// Lifecycle [`Status`] of this [`Sale`].
    pub status: Status,

    /// [`DateTime`] of the deal itself.
    pub date: DealDateTime,

    /// [`DateTime`] when this [`Sale`] record was created.
    pub created_at: CreationDateTime,
}

impl Sale {
    /// Returns whether this [`Sale`] is active, i.e. keeps its [`Lot`] out
    /// of circulation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != Status::Canceled
    }

    /// Reconciles the cached [`Financials`] and the [`Status`] of this
    /// [`Sale`] with the provided [`Payment`]s referencing it.
    ///
    /// A [`Status::Canceled`] sale keeps its status: cancellation is a
    /// terminal, externally-set state that reconciliation preserves.
    ///
    /// Idempotent: reapplying with the same [`Payment`]s is a no-op.
    pub fn reconcile(&mut self, payments: &[Payment]) {
        self.financials = Financials::calculate(self.total_price, payments);
        if self.status != Status::Canceled {
            self.status = Status::derive(
                self.financials.total_verified_payments.amount,
                self.total_price.amount,
            );
        }
    }
}

/// ID of a [`Sale`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Financial summary of a [`Sale`], derived from its [`Payment`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Financials {
    /// Sum of the verified [`Payment`]s' amounts.
    pub total_verified_payments: Money,

    /// Remaining unpaid amount, floored at zero.
    pub balance_due: Money,

    /// Share of the total price covered by verified [`Payment`]s.
    pub paid_percentage: Percent,
}

impl Financials {
    /// Creates new zeroed [`Financials`] for a [`Sale`] of the provided
    /// `total_price`, as they are at the [`Sale`] creation.
    #[must_use]
    pub fn zeroed(total_price: Money) -> Self {
        Self {
            total_verified_payments: Money::zero(total_price.currency),
            balance_due: total_price,
            paid_percentage: Percent::ZERO,
        }
    }

    /// Calculates [`Financials`] of a [`Sale`] with the provided
    /// `total_price` from the provided [`Payment`]s referencing it.
    ///
    /// Only verified [`Payment`]s contribute. A zero (or not yet set) total
    /// price is guarded explicitly: such a [`Sale`] is considered fully
    /// paid rather than producing a division error.
    #[must_use]
    pub fn calculate(total_price: Money, payments: &[Payment]) -> Self {
        let currency = total_price.currency;
        let verified = payments
            .iter()
            .map(Payment::contribution)
            .sum::<Decimal>();

        let balance_due = (total_price.amount - verified).max(Decimal::ZERO);
        let paid_percentage = if total_price.amount <= Decimal::ZERO {
            Percent::HUNDRED
        } else {
            Percent::clamping(
                verified / total_price.amount * Decimal::ONE_HUNDRED,
            )
        };

        Self {
            total_verified_payments: Money {
                amount: verified,
                currency,
            },
            balance_due: Money {
                amount: balance_due,
                currency,
            },
            paid_percentage,
        }
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Sale`]."]
    enum Status {
        #[doc = "No verified payment received yet."]
        Initiated = 1,

        #[doc = "Partially paid."]
        Ongoing = 2,

        #[doc = "Fully paid."]
        Completed = 3,

        #[doc = "Canceled by explicit administrative action."]
        Canceled = 4,
    }
}

impl Status {
    /// Derives the [`Status`] of a [`Sale`] from its verified payments
    /// total and its total price. First match wins:
    /// - nothing verified yet is [`Status::Initiated`];
    /// - less than the total price is [`Status::Ongoing`];
    /// - the total price or more is [`Status::Completed`].
    ///
    /// [`Status::Canceled`] is never derived, only set explicitly.
    #[must_use]
    pub fn derive(total_verified: Decimal, total_price: Decimal) -> Self {
        if total_verified == Decimal::ZERO {
            Self::Initiated
        } else if total_verified < total_price {
            Self::Ongoing
        } else {
            Self::Completed
        }
    }
}

/// [`DateTime`] of a [`Sale`] deal.
pub type DealDateTime = DateTimeOf<Sale>;

/// [`DateTime`] when a [`Sale`] was created.
pub type CreationDateTime = DateTimeOf<(Sale, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::{payment, Payment};

    use super::{Financials, Status};

    fn money(s: &str) -> Money {
        Money {
            amount: s.parse().unwrap(),
            currency: Currency::Mad,
        }
    }

    fn payment(amount: &str, receipt: Option<&str>) -> Payment {
        let receipt = receipt.map(|r| payment::Receipt::new(r).unwrap());
        Payment {
            id: payment::Id::new(),
            sale_id: super::Id::new(),
            amount: money(amount),
            method: payment::Method::BankTransfer,
            status: payment::Status::classify(receipt.as_ref()),
            receipt,
            date: DateTime::now().coerce(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn sums_only_verified_payments() {
        let fin = Financials::calculate(
            money("100000"),
            &[
                payment("40000", Some("R-1")),
                payment("25000", None),
                payment("10000", Some("R-2")),
            ],
        );

        assert_eq!(fin.total_verified_payments, money("50000"));
        assert_eq!(fin.balance_due, money("50000"));
        assert_eq!(
            fin.paid_percentage,
            Percent::new("50".parse().unwrap()).unwrap(),
        );
    }

    #[test]
    fn floors_balance_at_zero_and_caps_percentage() {
        let fin = Financials::calculate(
            money("100000"),
            &[payment("150000", Some("R-1"))],
        );

        assert_eq!(fin.balance_due, money("0"));
        assert_eq!(fin.paid_percentage, Percent::HUNDRED);
    }

    #[test]
    fn guards_zero_total_price() {
        let fin = Financials::calculate(money("0"), &[]);

        assert_eq!(fin.total_verified_payments, money("0"));
        assert_eq!(fin.balance_due, money("0"));
        assert_eq!(fin.paid_percentage, Percent::HUNDRED);
    }

    #[test]
    fn calculation_is_idempotent() {
        let payments = [payment("40000", Some("R-1")), payment("5000", None)];

        let first = Financials::calculate(money("100000"), &payments);
        let second = Financials::calculate(money("100000"), &payments);

        assert_eq!(first, second);
    }

    #[test]
    fn derives_status_by_threshold() {
        let price = Decimal::from(100_000);

        assert_eq!(
            Status::derive(Decimal::ZERO, price),
            Status::Initiated,
        );
        assert_eq!(
            Status::derive(Decimal::from(40_000), price),
            Status::Ongoing,
        );
        assert_eq!(
            Status::derive(Decimal::from(100_000), price),
            Status::Completed,
        );
        assert_eq!(
            Status::derive(Decimal::from(120_000), price),
            Status::Completed,
        );
    }

    #[test]
    fn reconcile_preserves_cancellation() {
        let mut sale = super::Sale {
            id: super::Id::new(),
            lot_id: crate::domain::lot::Id::new(),
            customer_id: crate::domain::customer::Id::new(),
            total_price: money("100000"),
            financials: Financials::zeroed(money("100000")),
            status: Status::Canceled,
            date: DateTime::now().coerce(),
            created_at: DateTime::now().coerce(),
        };

        sale.reconcile(&[payment("100000", Some("R-1"))]);

        assert_eq!(sale.status, Status::Canceled);
        assert_eq!(
            sale.financials.total_verified_payments,
            money("100000"),
        );
    }
}
