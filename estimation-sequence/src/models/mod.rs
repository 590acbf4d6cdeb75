pub mod sequence;
pub mod value;

pub use sequence::Sequence;
pub use value::{RawItem, Value, ValueKind};
