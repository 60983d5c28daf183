//! [`Handler`] abstractions.

use std::future::Future;

/// Executor of a single kind of operation, described by the `Args` type.
///
/// The same trait serves as the command, query and database seam: an
/// implementor declares one `impl` per operation it supports, and callers
/// bound on exactly the operations they need.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
