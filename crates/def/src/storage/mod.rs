mod codec;

pub use codec::{Decoder, Encoder};
