//! [`Expense`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment;

/// Operational expense of the subdivision office.
///
/// Expenses feed reporting only and reference no other ledger.
#[derive(Clone, Debug)]
pub struct Expense {
    /// ID of this [`Expense`].
    pub id: Id,

    /// Amount of this [`Expense`].
    pub amount: Money,

    /// [`Beneficiary`] this [`Expense`] was paid to.
    pub beneficiary: Beneficiary,

    /// [`Kind`] of this [`Expense`].
    pub kind: Kind,

    /// [`Receipt`] evidencing this [`Expense`], if any.
    ///
    /// [`Receipt`]: payment::Receipt
    pub receipt: Option<payment::Receipt>,

    /// [`DateTime`] when this [`Expense`] was incurred.
    pub date: OperationDateTime,

    /// [`DateTime`] when this [`Expense`] record was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Expense`].
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

/// Beneficiary an [`Expense`] was paid to.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Beneficiary(String);

impl Beneficiary {
    /// Creates a new [`Beneficiary`] if the given `beneficiary` is valid.
    #[must_use]
    pub fn new(beneficiary: impl Into<String>) -> Option<Self> {
        let beneficiary = beneficiary.into();
        Self::check(&beneficiary).then_some(Self(beneficiary))
    }

    /// Checks whether the given `beneficiary` is a valid [`Beneficiary`].
    fn check(beneficiary: impl AsRef<str>) -> bool {
        let beneficiary = beneficiary.as_ref();
        beneficiary.trim() == beneficiary
            && !beneficiary.is_empty()
            && beneficiary.len() <= 100
    }
}

impl FromStr for Beneficiary {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Beneficiary`")
    }
}

define_kind! {
    #[doc = "Kind of an [`Expense`]."]
    enum Kind {
        #[doc = "Permits and administrative fees."]
        Permits = 1,

        #[doc = "Land development works."]
        Development = 2,

        #[doc = "Marketing and advertising."]
        Marketing = 3,

        #[doc = "Taxes and duties."]
        Taxes = 4,

        #[doc = "Labor and contractor costs."]
        Labor = 5,

        #[doc = "Anything else."]
        Miscellaneous = 6,
    }
}

/// [`DateTime`] when an [`Expense`] was incurred.
pub type OperationDateTime = DateTimeOf<Expense>;

/// [`DateTime`] when an [`Expense`] was created.
pub type CreationDateTime = DateTimeOf<(Expense, unit::Creation)>;
