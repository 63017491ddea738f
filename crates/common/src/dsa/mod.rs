pub mod bit_set;
pub mod bitmap;

pub use bit_set::BitSet;
