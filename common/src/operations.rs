//! Abstract storage operations, dispatched through [`Handler`] impls.

use std::marker::PhantomData;

use crate::Handler;

/// Operation of inserting a value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation of updating a value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation of deleting a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation of selecting a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation of locking a value for the duration of a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Operation of performing an arbitrary action described by its marker.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Operation of starting a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Transactional counterpart of a [`Handler`], as produced by [`Transact`].
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation of committing a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W` value by a `B` key.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the value to select.
    _what: PhantomData<W>,

    /// Key to select the value by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the given key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] selector, returning its key.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
