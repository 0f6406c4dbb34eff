use super::builder::BinWriter;
use crate::error::{CodecError, CodecResult};
use crate::schema::{AbiType, Field, TypeId, TypeKind, TypeRegistry};
use crate::value::JValue;

/// How struct fields in the input object are matched to the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOrder {
    /// Keys must appear in schema order; unknown keys are rejected.
    Strict,
    /// Keys are looked up by name; unknown keys are ignored.
    Reorderable,
}

pub fn encode(
    registry: &TypeRegistry,
    id: TypeId,
    value: &JValue,
    order: FieldOrder,
) -> CodecResult<Vec<u8>> {
    let encoder = Encoder {
        registry,
        order,
        max_depth: registry.options().max_value_depth,
    };
    let mut writer = BinWriter::new();
    encoder.write(id, value, &mut writer, 0)?;
    Ok(writer.into_bytes())
}

struct Encoder<'r> {
    registry: &'r TypeRegistry,
    order: FieldOrder,
    max_depth: usize,
}

fn mismatch(ty: &AbiType, value: &JValue) -> CodecError {
    CodecError::ValueMismatch {
        expected: ty.name.clone(),
        found: value.kind(),
    }
}

impl Encoder<'_> {
    fn write(
        &self,
        id: TypeId,
        value: &JValue,
        writer: &mut BinWriter,
        depth: usize,
    ) -> CodecResult<()> {
        if depth > self.max_depth {
            return Err(CodecError::RecursionLimitReached);
        }
        let ty = self.registry.node(id)?;
        match &ty.kind {
            TypeKind::Builtin(builtin) => builtin.encode(value, writer),
            TypeKind::Optional(inner) => {
                if value.is_null() {
                    writer.write_u8(0);
                    Ok(())
                } else {
                    writer.write_u8(1);
                    self.write(*inner, value, writer, depth + 1)
                }
            }
            TypeKind::Extension(inner) => self.write(*inner, value, writer, depth + 1),
            TypeKind::Array(inner) => {
                let items = value.as_array().ok_or_else(|| mismatch(ty, value))?;
                writer.write_len(items.len())?;
                for (index, item) in items.iter().enumerate() {
                    self.write(*inner, item, writer, depth + 1)
                        .map_err(|err| err.within(format!("[{index}]")))?;
                }
                Ok(())
            }
            TypeKind::Variant(alternatives) => {
                let (alternative_name, inner) = match value.as_array() {
                    Some([JValue::String(name), inner]) => (name, inner),
                    _ => return Err(mismatch(ty, value)),
                };
                let index = alternatives
                    .iter()
                    .position(|alt| &alt.name == alternative_name)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        variant: ty.name.clone(),
                        alternative: alternative_name.clone(),
                    })?;
                writer.write_len(index)?;
                self.write(alternatives[index].ty, inner, writer, depth + 1)
                    .map_err(|err| err.within(alternative_name))
            }
            TypeKind::Struct { fields, .. } => {
                let entries = value.as_object().ok_or_else(|| mismatch(ty, value))?;
                match self.order {
                    FieldOrder::Strict => self.write_strict(ty, fields, entries, writer, depth),
                    FieldOrder::Reorderable => {
                        self.write_reorderable(ty, fields, value, writer, depth)
                    }
                }
            }
        }
    }

    fn is_extension(&self, field: &Field) -> CodecResult<bool> {
        Ok(self.registry.node(field.ty)?.is_extension())
    }

    fn write_field(
        &self,
        field: &Field,
        value: &JValue,
        writer: &mut BinWriter,
        depth: usize,
    ) -> CodecResult<()> {
        self.write(field.ty, value, writer, depth + 1)
            .map_err(|err| err.within(&field.name))
    }

    /// Input keys must follow schema order. Trailing extension fields may be left out.
    fn write_strict(
        &self,
        ty: &AbiType,
        fields: &[Field],
        entries: &[(String, JValue)],
        writer: &mut BinWriter,
        depth: usize,
    ) -> CodecResult<()> {
        let mut input = entries.iter().peekable();
        for field in fields {
            match input.peek() {
                Some((key, value)) if *key == field.name => {
                    self.write_field(field, value, writer, depth)?;
                    input.next();
                }
                Some((key, _)) => {
                    return Err(if fields.iter().any(|f| &f.name == key) {
                        CodecError::MissingField {
                            name: ty.name.clone(),
                            field: field.name.clone(),
                        }
                    } else {
                        CodecError::UnexpectedField {
                            name: ty.name.clone(),
                            field: key.clone(),
                        }
                    });
                }
                None if self.is_extension(field)? => {}
                None => {
                    return Err(CodecError::MissingField {
                        name: ty.name.clone(),
                        field: field.name.clone(),
                    })
                }
            }
        }
        match input.next() {
            Some((key, _)) => Err(CodecError::UnexpectedField {
                name: ty.name.clone(),
                field: key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fields are found by name and written in schema order. Once an
    /// extension field is absent, every later field must be absent too,
    /// since the wire has no slot for the gap.
    fn write_reorderable(
        &self,
        ty: &AbiType,
        fields: &[Field],
        object: &JValue,
        writer: &mut BinWriter,
        depth: usize,
    ) -> CodecResult<()> {
        let mut absent_extension: Option<&str> = None;
        for field in fields {
            match object.get(&field.name) {
                Some(value) => {
                    if let Some(missing) = absent_extension {
                        return Err(CodecError::MissingField {
                            name: ty.name.clone(),
                            field: missing.to_string(),
                        });
                    }
                    self.write_field(field, value, writer, depth)?;
                }
                None if self.is_extension(field)? => {
                    absent_extension.get_or_insert(&field.name);
                }
                None => {
                    return Err(CodecError::MissingField {
                        name: ty.name.clone(),
                        field: field.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }
}
