use super::reader::BinReader;
use crate::error::{CodecError, CodecResult};
use crate::schema::{TypeId, TypeKind, TypeRegistry};
use crate::value::JValue;

/// Decode exactly one value of type `id`; leftover bytes are an error.
pub fn decode(registry: &TypeRegistry, id: TypeId, bytes: &[u8]) -> CodecResult<JValue> {
    let mut reader = BinReader::new(bytes);
    let value = decode_prefix(registry, id, &mut reader)?;
    if !reader.is_empty() {
        return Err(CodecError::ExtraData(reader.remaining()));
    }
    Ok(value)
}

/// Decode one value from the front of `reader`, leaving the rest unread.
pub fn decode_prefix(
    registry: &TypeRegistry,
    id: TypeId,
    reader: &mut BinReader<'_>,
) -> CodecResult<JValue> {
    Decoder {
        registry,
        max_depth: registry.options().max_value_depth,
    }
    .read(id, reader, 0)
}

struct Decoder<'r> {
    registry: &'r TypeRegistry,
    max_depth: usize,
}

impl Decoder<'_> {
    fn read(&self, id: TypeId, reader: &mut BinReader<'_>, depth: usize) -> CodecResult<JValue> {
        if depth > self.max_depth {
            return Err(CodecError::RecursionLimitReached);
        }
        let ty = self.registry.node(id)?;
        match &ty.kind {
            TypeKind::Builtin(builtin) => builtin.decode(reader),
            TypeKind::Optional(inner) => match reader.read_u8()? {
                0 => Ok(JValue::Null),
                1 => self.read(*inner, reader, depth + 1),
                other => Err(CodecError::invalid(
                    &ty.name,
                    format!("presence flag {other:#04x}"),
                )),
            },
            TypeKind::Extension(inner) => {
                if reader.is_empty() {
                    Ok(JValue::Null)
                } else {
                    self.read(*inner, reader, depth + 1)
                }
            }
            TypeKind::Array(inner) => {
                let len = reader.read_varuint32()? as usize;
                let available = reader.remaining();
                let mut items = Vec::with_capacity(len.min(available));
                for index in 0..len {
                    let before = reader.position();
                    let item = self
                        .read(*inner, reader, depth + 1)
                        .map_err(|err| err.within(format!("[{index}]")))?;
                    // zero-width elements cannot be counted against the input
                    if reader.position() == before && len > available {
                        return Err(CodecError::invalid(
                            &ty.name,
                            format!("{len} zero-width elements exceed the input size"),
                        ));
                    }
                    items.push(item);
                }
                Ok(JValue::Array(items))
            }
            TypeKind::Struct { fields, .. } => {
                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let field_ty = self.registry.node(field.ty)?;
                    if field_ty.is_extension() && reader.is_empty() {
                        continue;
                    }
                    let value = self
                        .read(field.ty, reader, depth + 1)
                        .map_err(|err| err.within(&field.name))?;
                    entries.push((field.name.clone(), value));
                }
                Ok(JValue::Object(entries))
            }
            TypeKind::Variant(alternatives) => {
                let index = reader.read_varuint32()?;
                let alternative = alternatives.get(index as usize).ok_or_else(|| {
                    CodecError::UnknownVariant {
                        variant: ty.name.clone(),
                        alternative: format!("#{index}"),
                    }
                })?;
                let value = self
                    .read(alternative.ty, reader, depth + 1)
                    .map_err(|err| err.within(&alternative.name))?;
                Ok(JValue::Array(vec![
                    JValue::String(alternative.name.clone()),
                    value,
                ]))
            }
        }
    }
}
