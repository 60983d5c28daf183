//! [`Query`] collection related to the multiple [`Sale`]s.

use common::operations::By;

use crate::domain::{customer, lot, Sale};
#[cfg(doc)]
use crate::{
    domain::{Customer, Lot},
    Query,
};

use super::DatabaseQuery;

/// Queries the [`Sale`]s of a [`Customer`].
pub type ByCustomer = DatabaseQuery<By<Vec<Sale>, customer::Id>>;

/// Queries the [`Sale`]s referencing a [`Lot`].
pub type ByLot = DatabaseQuery<By<Vec<Sale>, lot::Id>>;
