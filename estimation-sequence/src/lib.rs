mod error;

pub mod catalog;
pub mod chain;
pub mod models;
pub mod presets;
pub mod resolver;

pub use catalog::SequenceCatalog;
pub use chain::SequenceChain;
pub use error::Error;
pub use models::sequence::Sequence;
pub use models::value::{RawItem, Value, ValueKind};

pub type Result<T> = std::result::Result<T, Error>;
