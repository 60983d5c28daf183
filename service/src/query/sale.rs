//! [`Query`] collection related to a single [`Sale`].

use common::operations::By;

use crate::{
    domain::{lot, sale, Sale},
    read::Active,
};
#[cfg(doc)]
use crate::{domain::Lot, Query};

use super::DatabaseQuery;

/// Queries a [`Sale`] by its [`sale::Id`].
pub type ById = DatabaseQuery<By<Option<Sale>, sale::Id>>;

/// Queries the active [`Sale`] referencing a [`Lot`], if any.
pub type ActiveByLot = DatabaseQuery<By<Option<Active<Sale>>, lot::Id>>;
