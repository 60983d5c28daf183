//! Marker types for branding generic definitions.

/// Marker type distinguishing creation timestamps from operational ones.
#[derive(Clone, Copy, Debug)]
pub struct Creation;
