pub trait Encoder {
    type Item;
    type Error: std::error::Error + 'static;

    fn encode(&self, item: &Self::Item) -> Result<Vec<u8>, Self::Error>;
}

pub trait Decoder {
    type Item;
    type Error: std::error::Error + 'static;

    /// Decodes one item from the front of `src`, returning it together with
    /// the number of bytes consumed.
    fn decode(&self, src: &[u8]) -> Result<(Self::Item, usize), Self::Error>;
}
