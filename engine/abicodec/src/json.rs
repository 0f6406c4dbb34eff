//! JSON text against a resolved type, through the `JValue` tree.

use crate::binary::{self, FieldOrder};
use crate::error::CodecResult;
use crate::schema::{TypeId, TypeRegistry};
use crate::serde_support::{from_json_str, to_json_string};

pub fn bin_to_json(registry: &TypeRegistry, id: TypeId, bytes: &[u8]) -> CodecResult<String> {
    to_json_string(&binary::decode(registry, id, bytes)?)
}

/// Struct fields must appear in schema order.
pub fn json_to_bin(registry: &TypeRegistry, id: TypeId, text: &str) -> CodecResult<Vec<u8>> {
    let value = from_json_str(text)?;
    binary::encode(registry, id, &value, FieldOrder::Strict)
}

/// Struct fields may appear in any order.
pub fn json_to_bin_reorderable(
    registry: &TypeRegistry,
    id: TypeId,
    text: &str,
) -> CodecResult<Vec<u8>> {
    let value = from_json_str(text)?;
    binary::encode(registry, id, &value, FieldOrder::Reorderable)
}
