pub mod decoders;
pub mod fixtures;
