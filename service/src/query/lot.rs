//! [`Query`] collection related to a single [`Lot`].

use common::operations::By;

use crate::domain::{lot, Lot};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Lot`] by its [`lot::Id`].
pub type ById = DatabaseQuery<By<Option<Lot>, lot::Id>>;

/// Queries a [`Lot`] by its [`lot::Reference`].
pub type ByReference = DatabaseQuery<By<Option<Lot>, lot::Reference>>;
