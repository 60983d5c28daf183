//! [`Lot`] definitions.


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

/// Parcel of land offered for sale in the subdivision.
#[derive(Clone, Debug)]
pub struct Lot {
    /// ID of this [`Lot`].
    pub id: Id,

    /// Unique human-readable [`Reference`] of this [`Lot`].
    pub reference: Reference,

    /// Availability [`Status`] of this [`Lot`].
    ///
    /// Derived from the active [`Sale`] referencing this [`Lot`], if any.
    pub status: Status,

    /// [`Size`] of this [`Lot`] in square meters.
    pub size: Size,

    /// Price per square meter of this [`Lot`].
    pub price_per_m2: Money,

    /// [`ZoningCode`] of this [`Lot`].
    pub zoning_code: ZoningCode,

    /// [`Description`] of this [`Lot`], if any.
    pub description: Option<Description>,

    /// [`DateTime`] when this [`Lot`] was created.
    pub created_at: CreationDateTime,
}

impl Lot {
    /// Returns the total price of this [`Lot`]: its [`Size`] multiplied by
    /// the price per square meter.
    #[must_use]
    pub fn total_price(&self) -> Money {
        Money {
            amount: self.size.as_decimal() * self.price_per_m2.amount,
            currency: self.price_per_m2.currency,
        }
    }
}

/// ID of a [`Lot`].
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

/// Unique human-readable reference code of a [`Lot`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Reference(String);

impl Reference {
    /// Creates a new [`Reference`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reference` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Creates a new [`Reference`] if the given `reference` is valid.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        Self::check(&reference).then_some(Self(reference))
    }

    /// Checks whether the given `reference` is a valid [`Reference`].
    fn check(reference: impl AsRef<str>) -> bool {
        let reference = reference.as_ref();
        reference.trim() == reference
            && !reference.is_empty()
            && reference.len() <= 15
    }
}

impl FromStr for Reference {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Reference`")
    }
}

/// Size of a [`Lot`] in square meters.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Size(Decimal);

impl Size {
    /// Creates a new [`Size`] if the given `size` is positive.
    #[must_use]
    pub fn new(size: Decimal) -> Option<Self> {
        (size > Decimal::ZERO).then_some(Self(size))
    }

    /// Returns this [`Size`] as a [`Decimal`] number of square meters.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Size {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Size`")
    }
}

/// Zoning code of a [`Lot`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ZoningCode(String);

impl ZoningCode {
    /// Creates a new [`ZoningCode`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`ZoningCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`ZoningCode`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.trim() == code && !code.is_empty() && code.len() <= 50
    }
}

impl FromStr for ZoningCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ZoningCode`")
    }
}

/// Description of a [`Lot`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        !description.is_empty() && description.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

define_kind! {
    #[doc = "Availability status of a [`Lot`]."]
    enum Status {
        #[doc = "No active [`Sale`] references the [`Lot`]."]
        Available = 1,

        #[doc = "A [`Sale`] was initiated, no payment verified yet."]
        Reserved = 2,

        #[doc = "The referencing [`Sale`] is partially paid."]
        Ongoing = 3,

        #[doc = "The referencing [`Sale`] is fully paid."]
        Sold = 4,

        #[doc = "The referencing [`Sale`] was canceled."]
        Canceled = 5,
    }
}

// Availability of a `Lot` is a pure function of the `Sale` referencing it.
// A `Lot` without any `Sale` rows is returned to `Available` by the orphan
// sweep, not by this mapping.
impl From<sale::Status> for Status {
    fn from(status: sale::Status) -> Self {
        match status {
            sale::Status::Initiated => Self::Reserved,
            sale::Status::Ongoing => Self::Ongoing,
            sale::Status::Completed => Self::Sold,
            sale::Status::Canceled => Self::Canceled,
        }
    }
}

/// [`DateTime`] when a [`Lot`] was created.
pub type CreationDateTime = DateTimeOf<(Lot, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{sale, Status};

    #[test]
    fn maps_sale_status_exhaustively() {
        assert_eq!(Status::from(sale::Status::Initiated), Status::Reserved);
        assert_eq!(Status::from(sale::Status::Ongoing), Status::Ongoing);
        assert_eq!(Status::from(sale::Status::Completed), Status::Sold);
        assert_eq!(Status::from(sale::Status::Canceled), Status::Canceled);
    }
}
