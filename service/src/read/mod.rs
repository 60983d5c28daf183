//! Read entities definitions.

pub mod lot;
pub mod sale;

pub use self::sale::Active;
