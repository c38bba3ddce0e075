use derive_more::{Display, Error};

pub type Result<T> = core::result::Result<T, MetaballError>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum MetaballError {
    /// The field was refreshed with an empty source list.
    #[display("metaball field has no sources to enclose")]
    NoSources,
    /// Extraction was attempted before the field was ever refreshed.
    #[display("metaball field has not been refreshed")]
    NotRefreshed,
    /// The extractor grid has zero cells per axis.
    #[display("extractor resolution must be at least 1")]
    ZeroResolution,
}
