mod builder;
mod decode;
mod encode;
mod reader;

pub use builder::BinWriter;
pub use decode::{decode, decode_prefix};
pub use encode::{encode, FieldOrder};
pub use reader::BinReader;
