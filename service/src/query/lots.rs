//! [`Query`] collection related to the multiple [`Lot`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Lot, Query};

use super::DatabaseQuery;

/// Queries a list of [`Lot`]s.
pub type List =
    DatabaseQuery<By<read::lot::list::Page, read::lot::list::Selector>>;

/// Queries total count of [`Lot`] list items.
pub type TotalCount = DatabaseQuery<By<read::lot::list::TotalCount, ()>>;
