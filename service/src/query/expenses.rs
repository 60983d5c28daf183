//! [`Query`] collection related to the multiple [`Expense`]s.

use common::operations::By;

use crate::domain::Expense;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the recorded [`Expense`]s.
pub type All = DatabaseQuery<By<Vec<Expense>, ()>>;
