pub mod bounds;
pub mod error;
pub mod extractor;
pub mod field;
pub mod interp;
pub mod mesh;
pub mod plugin;
pub mod tables;
pub mod types;
pub mod utils;

pub use extractor::SurfaceExtractor;
pub use field::{MetaballField, ScalarField};
pub use plugin::{MetaballPlugin, MetaballSurface};
