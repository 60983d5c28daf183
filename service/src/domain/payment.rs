//! [`Payment`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::sale;
#[cfg(doc)]
use crate::domain::Sale;

/// Installment paid towards a [`Sale`].
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Sale`] this [`Payment`] is made towards.
    pub sale_id: sale::Id,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Method`] this [`Payment`] was made with.
    pub method: Method,

    /// Verification [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`Receipt`] evidencing this [`Payment`], if presented.
    pub receipt: Option<Receipt>,

    /// [`DateTime`] when this [`Payment`] was made.
    pub date: OperationDateTime,

    /// [`DateTime`] when this [`Payment`] record was created.
    pub created_at: CreationDateTime,
}

impl Payment {
    /// Returns the amount this [`Payment`] contributes to the verified
    /// total of its [`Sale`]: its full amount when verified, zero
    /// otherwise.
    #[must_use]
    pub fn contribution(&self) -> Decimal {
        if self.status == Status::Verified {
            self.amount.amount
        } else {
            Decimal::ZERO
        }
    }
}

/// ID of a [`Payment`].
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

/// Unique receipt number evidencing a [`Payment`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Receipt(String);

impl Receipt {
    /// Creates a new [`Receipt`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `receipt` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(receipt: impl Into<String>) -> Self {
        Self(receipt.into())
    }

    /// Creates a new [`Receipt`] if the given `receipt` is valid.
    #[must_use]
    pub fn new(receipt: impl Into<String>) -> Option<Self> {
        let receipt = receipt.into();
        Self::check(&receipt).then_some(Self(receipt))
    }

    /// Checks whether the given `receipt` is a valid [`Receipt`].
    fn check(receipt: impl AsRef<str>) -> bool {
        let receipt = receipt.as_ref();
        receipt.trim() == receipt
            && !receipt.is_empty()
            && receipt.len() <= 100
    }
}

impl FromStr for Receipt {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Receipt`")
    }
}

define_kind! {
    #[doc = "Method a [`Payment`] was made with."]
    enum Method {
        #[doc = "Cheque."]
        Cheque = 1,

        #[doc = "Cash."]
        Espece = 2,

        #[doc = "Credit card."]
        CreditCard = 3,

        #[doc = "Bank transfer."]
        BankTransfer = 4,
    }
}

define_kind! {
    #[doc = "Verification status of a [`Payment`]."]
    enum Status {
        #[doc = "Not verified yet, awaiting a [`Receipt`]."]
        Pending = 1,

        #[doc = "Verified by a presented [`Receipt`]."]
        Verified = 2,

        #[doc = "Rejected by explicit administrative action."]
        Failed = 3,
    }
}

impl Status {
    /// Classifies a [`Payment`] by the presence of its [`Receipt`]: a
    /// presented receipt makes it [`Status::Verified`], its absence keeps
    /// it [`Status::Pending`].
    ///
    /// [`Status::Failed`] is never classified, only set explicitly.
    #[must_use]
    pub fn classify(receipt: Option<&Receipt>) -> Self {
        if receipt.is_some() {
            Self::Verified
        } else {
            Self::Pending
        }
    }
}

/// [`DateTime`] when a [`Payment`] was made.
pub type OperationDateTime = DateTimeOf<Payment>;

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::sale;

    use super::{Method, Payment, Receipt, Status};

    #[test]
    fn classifies_by_receipt_presence() {
        let receipt = Receipt::new("REC-2024-001").unwrap();

        assert_eq!(Status::classify(Some(&receipt)), Status::Verified);
        assert_eq!(Status::classify(None), Status::Pending);
    }

    #[test]
    fn only_verified_contributes() {
        let mut payment = Payment {
            id: super::Id::new(),
            sale_id: sale::Id::new(),
            amount: Money {
                amount: Decimal::from(40_000),
                currency: Currency::Mad,
            },
            method: Method::Cheque,
            status: Status::Verified,
            receipt: Receipt::new("REC-1"),
            date: DateTime::now().coerce(),
            created_at: DateTime::now().coerce(),
        };

        assert_eq!(payment.contribution(), Decimal::from(40_000));

        payment.status = Status::Pending;
        assert_eq!(payment.contribution(), Decimal::ZERO);

        payment.status = Status::Failed;
        assert_eq!(payment.contribution(), Decimal::ZERO);
    }

    #[test]
    fn receipt_rejects_malformed_input() {
        assert!(Receipt::new("REC-1").is_some());
        assert!(Receipt::new("").is_none());
        assert!(Receipt::new(" REC-1").is_none());
        assert!(Receipt::new("x".repeat(101)).is_none());
    }
}
