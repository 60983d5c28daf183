//! [`Lot`]-related read definitions.

#[cfg(doc)]
use crate::domain::{lot, Lot, Sale};

/// Marker of the operation releasing orphaned [`Lot`]s.
///
/// A [`Lot`] is orphaned when its [`lot::Status`] differs from
/// [`lot::Status::Available`] while no [`Sale`] rows reference it anymore.
/// Releasing resets such [`Lot`]s back to [`lot::Status::Available`].
#[derive(Clone, Copy, Debug)]
pub struct ReleaseOrphaned;

pub mod list {
    //! [`Lot`] list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::lot;
    #[cfg(doc)]
    use crate::domain::Lot;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = lot::Id;

    /// Cursor pointing to a specific [`Lot`] in a list.
    pub type Cursor = lot::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`lot::Reference`] (or its part) to fuzzy search for.
        pub reference: Option<lot::Reference>,

        /// Exact [`lot::Status`] to filter by.
        pub status: Option<lot::Status>,
    }

    /// Total count of [`Lot`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
