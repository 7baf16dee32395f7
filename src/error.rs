use thiserror::Error;

/// An error when constructing a [`Session`] from an invalid configuration.
///
/// These are the only failures the crate surfaces. An empty cluster during
/// iteration is *not* an error — it is handled internally by the configured
/// [`ReseedPolicy`].
///
/// [`Session`]: crate::Session
/// [`ReseedPolicy`]: crate::ReseedPolicy
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("cluster count k cannot be 0")]
    ClusterCount,
    #[error("logical domain must span a non-zero area on both axes")]
    DegenerateDomain,
}
