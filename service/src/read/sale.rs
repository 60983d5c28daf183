//! [`Sale`] read model definition.

#[cfg(doc)]
use crate::domain::Sale;

/// Wrapper around [`Sale`] indicating that it [`is_active()`].
///
/// [`is_active()`]: Sale::is_active
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);
