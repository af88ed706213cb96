//! The legacy ANN Index fallback path: content-addressed in-memory vector
//! store with JSON snapshot persistence.

pub mod error;
pub mod index;
pub mod record;
pub mod snapshot;

pub mod prelude {
    pub use crate::error::IndexError;
    pub use crate::index::{AnnIndex, IndexStats};
    pub use crate::record::{PhraseRecord, PHRASE_ATTRIBUTE_KEY};
}
