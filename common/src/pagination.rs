//! Cursor-based pagination primitives.

use std::fmt;

/// List of [`Edge`]s selected by some [`Arguments`], along with the
/// knowledge whether anything lies beyond them.
#[derive(Clone, Debug)]
pub struct Connection<C, I> {
    /// Selected [`Edge`]s, in the order of the requested [`Kind`].
    pub edges: Vec<Edge<C, I>>,

    /// [`Kind`] of pagination that produced this [`Connection`].
    pub kind: Kind,

    /// Indicator whether nodes beyond the selected [`Edge`]s exist.
    pub has_more: bool,
}

/// A page in a [`Connection`].
pub type Page<C, I> = Connection<C, I>;

impl<C, I> Connection<C, I> {
    /// Assembles a new [`Connection`] out of the provided [`Edge`]s.
    ///
    /// `has_more` should reflect whether the underlying storage had rows
    /// past the requested limit.
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect::<Vec<_>>(),
            kind: args.kind(),
            has_more,
        }
    }

    /// Summarizes this [`Connection`] as a [`PageInfo`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more && self.kind.is_forward(),
            has_previous_page: self.has_more && self.kind.is_backward(),
        }
    }
}

/// Summary of a page in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// Cursor of the last [`Edge`] on the page, if any.
    pub end_cursor: Option<C>,

    /// Indicator whether a next page exists.
    pub has_next_page: bool,

    /// Indicator whether a previous page exists.
    pub has_previous_page: bool,
}

/// Single node of a [`Connection`] paired with the cursor addressing it.
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor addressing the node.
    pub cursor: C,

    /// The node itself.
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Validated pagination request.
///
/// Only the argument combinations producible by [`Arguments::new()`] exist,
/// so downstream code never has to reject a `first`+`last` mix itself.
#[derive(Clone, Copy, Debug)]
pub enum Arguments<C> {
    /// Pagination towards greater cursors.
    Forward {
        /// Number of nodes to select.
        first: usize,

        /// Cursor to continue after, if any.
        after: Option<C>,

        /// Indicator whether the `after` cursor itself is part of the
        /// selection.
        including: bool,
    },

    /// Pagination towards lesser cursors.
    Backward {
        /// Number of nodes to select.
        last: usize,

        /// Cursor to continue before, if any.
        before: Option<C>,

        /// Indicator whether the `before` cursor itself is part of the
        /// selection.
        including: bool,
    },
}

impl<C> Arguments<C> {
    /// Validates the raw `first`/`after`/`last`/`before` combination into
    /// [`Arguments`].
    ///
    /// An absent combination means a forward page of the `default` size.
    /// Equal `after` and `before` cursors request that exact position
    /// inclusively. Any other mix of directions is rejected with [`None`].
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        C: PartialEq + fmt::Debug,
        Num: TryInto<usize> + fmt::Debug,
    {
        let size = |n: Num| n.try_into().ok();

        Some(match (first, after, last, before) {
            (None, None, None, None) => Self::Forward {
                first: size(default)?,
                after: None,
                including: false,
            },
            (Some(first), after, None, None) => Self::Forward {
                first: size(first)?,
                after,
                including: false,
            },
            (Some(first), Some(after), None, Some(before))
                if after == before =>
            {
                Self::Forward {
                    first: size(first)?,
                    after: Some(after),
                    including: true,
                }
            }
            (None, None, Some(last), before) => Self::Backward {
                last: size(last)?,
                before,
                including: false,
            },
            (None, Some(after), Some(last), Some(before))
                if after == before =>
            {
                Self::Backward {
                    last: size(last)?,
                    before: Some(before),
                    including: true,
                }
            }
            (None, Some(after), None, Some(before)) if after == before => {
                Self::Forward {
                    first: 1,
                    after: Some(after),
                    including: true,
                }
            }
            _ => return None,
        })
    }

    /// Returns the cursor this [`Arguments`] continues from, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns the [`Kind`] of pagination this [`Arguments`] requests.
    pub fn kind(&self) -> Kind {
        match *self {
            Self::Forward { including, .. } => {
                if including {
                    Kind::ForwardIncluding
                } else {
                    Kind::Forward
                }
            }
            Self::Backward { including, .. } => {
                if including {
                    Kind::BackwardIncluding
                } else {
                    Kind::Backward
                }
            }
        }
    }

    /// Returns the number of nodes this [`Arguments`] selects.
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first, .. } => first,
            Self::Backward { last, .. } => last,
        }
    }
}

/// [`Arguments`] paired with a domain-specific filter.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Filter narrowing the selection.
    pub filter: F,
}

/// Direction and cursor inclusivity of a pagination request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Towards greater cursors, cursor excluded.
    Forward,

    /// Towards greater cursors, cursor included.
    ForwardIncluding,

    /// Towards lesser cursors, cursor excluded.
    Backward,

    /// Towards lesser cursors, cursor included.
    BackwardIncluding,
}

impl Kind {
    /// Returns whether this [`Kind`] paginates forward.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward | Self::ForwardIncluding)
    }

    /// Returns whether this [`Kind`] paginates backward.
    #[must_use]
    pub fn is_backward(&self) -> bool {
        matches!(self, Self::Backward | Self::BackwardIncluding)
    }

    /// Returns the cursor comparison operator of this [`Kind`].
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::ForwardIncluding => ">=",
            Self::Backward => "<",
            Self::BackwardIncluding => "<=",
        }
    }

    /// Returns the [`Order`] of this [`Kind`].
    #[must_use]
    pub const fn order(&self) -> Order {
        match self {
            Self::Forward | Self::ForwardIncluding => Order::Ascending,
            Self::Backward | Self::BackwardIncluding => Order::Descending,
        }
    }
}

/// Order of cursors within a page.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    #[cfg(feature = "postgres")]
    /// Returns the SQL keyword of this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination type aliases over the given cursor, node and filter
/// types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Connection`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Connection`] of [`$node`]s."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Connection, Kind};

    fn args(
        first: Option<u16>,
        after: Option<u32>,
        last: Option<u16>,
        before: Option<u32>,
    ) -> Option<Arguments<u32>> {
        Arguments::new(first, after, last, before, 20)
    }

    #[test]
    fn defaults_to_forward_page() {
        let args = args(None, None, None, None).unwrap();

        assert_eq!(args.limit(), 20);
        assert_eq!(args.kind(), Kind::Forward);
        assert!(args.cursor().is_none());
    }

    #[test]
    fn rejects_mixed_directions() {
        assert!(args(Some(5), None, Some(5), None).is_none());
        assert!(args(Some(5), None, None, Some(7)).is_none());
        assert!(args(None, Some(7), None, None).is_none());
    }

    #[test]
    fn equal_cursors_request_exact_position() {
        let args = args(None, Some(7), None, Some(7)).unwrap();

        assert_eq!(args.limit(), 1);
        assert_eq!(args.kind(), Kind::ForwardIncluding);
        assert_eq!(args.kind().operator(), ">=");
    }

    #[test]
    fn page_info_reflects_direction() {
        let forward = args(Some(2), None, None, None).unwrap();
        let info = Connection::new(&forward, [(1_u32, "a"), (2, "b")], true)
            .page_info();
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
        assert_eq!(info.end_cursor, Some(2));

        let backward = args(None, None, Some(2), Some(9)).unwrap();
        let info = Connection::new(&backward, [(8_u32, "h"), (7, "g")], false)
            .page_info();
        assert!(!info.has_next_page);
        assert!(!info.has_previous_page);
        assert_eq!(info.end_cursor, Some(7));
    }
}
