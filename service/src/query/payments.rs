//! [`Query`] collection related to the multiple [`Payment`]s.

use common::operations::By;

use crate::domain::{sale, Payment};
#[cfg(doc)]
use crate::{domain::Sale, Query};

use super::DatabaseQuery;

/// Queries the [`Payment`]s made towards a [`Sale`].
pub type BySale = DatabaseQuery<By<Vec<Payment>, sale::Id>>;
