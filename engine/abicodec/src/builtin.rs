//! Leaf types every registry starts with, and their wire and JSON forms.

use crate::binary::{BinReader, BinWriter};
use crate::error::{CodecError, CodecResult};
use crate::keys::{KeyType, PrivateKey, PublicKey, Signature};
use crate::name::Name;
use crate::numeric;
use crate::symbol::{Asset, Symbol, SymbolCode};
use crate::time;
use crate::value::JValue;

macro_rules! builtins {
    ($($variant:ident => $name:literal),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $($variant),*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Builtin::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

builtins! {
    Bool => "bool",
    Int8 => "int8",
    Uint8 => "uint8",
    Int16 => "int16",
    Uint16 => "uint16",
    Int32 => "int32",
    Uint32 => "uint32",
    Int64 => "int64",
    Uint64 => "uint64",
    Int128 => "int128",
    Uint128 => "uint128",
    VarInt32 => "varint32",
    VarUint32 => "varuint32",
    Float32 => "float32",
    Float64 => "float64",
    Float128 => "float128",
    TimePoint => "time_point",
    TimePointSec => "time_point_sec",
    BlockTimestamp => "block_timestamp_type",
    Name => "name",
    Bytes => "bytes",
    String => "string",
    Checksum160 => "checksum160",
    Checksum256 => "checksum256",
    Checksum512 => "checksum512",
    PublicKey => "public_key",
    PrivateKey => "private_key",
    Signature => "signature",
    Symbol => "symbol",
    SymbolCode => "symbol_code",
    Asset => "asset",
}

fn float_to_json(value: f64) -> JValue {
    if value.is_nan() {
        JValue::String("NaN".into())
    } else if value.is_infinite() {
        JValue::String(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        JValue::from(value)
    }
}

fn upper_hex(bytes: &[u8]) -> JValue {
    JValue::String(hex::encode_upper(bytes))
}

impl Builtin {
    pub fn decode(&self, reader: &mut BinReader<'_>) -> CodecResult<JValue> {
        let value = match self {
            Builtin::Bool => match reader.read_u8()? {
                0 => JValue::Bool(false),
                1 => JValue::Bool(true),
                other => return Err(CodecError::invalid("bool", format!("byte {other:#04x}"))),
            },
            Builtin::Int8 => JValue::int(i8::from_le_bytes(reader.read_array()?) as i64),
            Builtin::Uint8 => JValue::UInt(reader.read_u8()? as u64),
            Builtin::Int16 => JValue::int(i16::from_le_bytes(reader.read_array()?) as i64),
            Builtin::Uint16 => JValue::UInt(reader.read_u16()? as u64),
            Builtin::Int32 => JValue::int(i32::from_le_bytes(reader.read_array()?) as i64),
            Builtin::Uint32 => JValue::UInt(reader.read_u32()? as u64),
            Builtin::Int64 => JValue::int(i64::from_le_bytes(reader.read_array()?)),
            Builtin::Uint64 => JValue::UInt(reader.read_u64()?),
            Builtin::Int128 => {
                JValue::String(numeric::signed_binary_to_decimal(&reader.read_array::<16>()?))
            }
            Builtin::Uint128 => {
                JValue::String(numeric::binary_to_decimal(&reader.read_array::<16>()?))
            }
            Builtin::VarInt32 => JValue::int(reader.read_varint32()? as i64),
            Builtin::VarUint32 => JValue::UInt(reader.read_varuint32()? as u64),
            Builtin::Float32 => {
                let value = f32::from_le_bytes(reader.read_array()?);
                // widen through the shortest decimal form so 0.1f32 stays 0.1
                float_to_json(value.to_string().parse().unwrap_or(value as f64))
            }
            Builtin::Float64 => float_to_json(f64::from_le_bytes(reader.read_array()?)),
            Builtin::Float128 => upper_hex(&reader.read_array::<16>()?),
            Builtin::TimePoint => JValue::String(time::time_point_to_string(i64::from_le_bytes(
                reader.read_array()?,
            ))?),
            Builtin::TimePointSec => {
                JValue::String(time::time_point_sec_to_string(reader.read_u32()?)?)
            }
            Builtin::BlockTimestamp => {
                JValue::String(time::block_timestamp_to_string(reader.read_u32()?)?)
            }
            Builtin::Name => JValue::String(Name(reader.read_u64()?).to_string()),
            Builtin::Bytes => upper_hex(reader.read_sized()?),
            Builtin::String => {
                let raw = reader.read_sized()?;
                let text = std::str::from_utf8(raw)
                    .map_err(|err| CodecError::invalid("string", err.to_string()))?;
                JValue::String(text.to_string())
            }
            Builtin::Checksum160 => upper_hex(&reader.read_array::<20>()?),
            Builtin::Checksum256 => upper_hex(&reader.read_array::<32>()?),
            Builtin::Checksum512 => upper_hex(&reader.read_array::<64>()?),
            Builtin::PublicKey => {
                let key_type = KeyType::from_u8(reader.read_u8()?)?;
                JValue::String(PublicKey::new(key_type, reader.read_array()?).to_string())
            }
            Builtin::PrivateKey => {
                let key_type = KeyType::from_u8(reader.read_u8()?)?;
                JValue::String(PrivateKey::new(key_type, reader.read_array()?).to_string())
            }
            Builtin::Signature => {
                let key_type = KeyType::from_u8(reader.read_u8()?)?;
                JValue::String(Signature::new(key_type, reader.read_array()?).to_string())
            }
            Builtin::Symbol => JValue::String(Symbol(reader.read_u64()?).to_string()),
            Builtin::SymbolCode => JValue::String(SymbolCode(reader.read_u64()?).to_string()),
            Builtin::Asset => {
                let amount = i64::from_le_bytes(reader.read_array()?);
                let symbol = Symbol(reader.read_u64()?);
                JValue::String(Asset { amount, symbol }.to_string())
            }
        };
        Ok(value)
    }

    pub fn encode(&self, value: &JValue, writer: &mut BinWriter) -> CodecResult<()> {
        match self {
            Builtin::Bool => {
                let flag = value.as_bool().ok_or_else(|| self.mismatch(value))?;
                writer.write_u8(flag as u8);
            }
            Builtin::Int8 => writer.write_bytes(&self.integer::<i8>(value)?.to_le_bytes()),
            Builtin::Uint8 => writer.write_bytes(&self.integer::<u8>(value)?.to_le_bytes()),
            Builtin::Int16 => writer.write_bytes(&self.integer::<i16>(value)?.to_le_bytes()),
            Builtin::Uint16 => writer.write_bytes(&self.integer::<u16>(value)?.to_le_bytes()),
            Builtin::Int32 => writer.write_bytes(&self.integer::<i32>(value)?.to_le_bytes()),
            Builtin::Uint32 => writer.write_bytes(&self.integer::<u32>(value)?.to_le_bytes()),
            Builtin::Int64 => writer.write_bytes(&self.integer::<i64>(value)?.to_le_bytes()),
            Builtin::Uint64 => writer.write_bytes(&self.integer::<u64>(value)?.to_le_bytes()),
            Builtin::Int128 => {
                let bytes = match value {
                    JValue::String(text) => numeric::signed_decimal_to_binary::<16>(text)
                        .map_err(|err| CodecError::invalid(self.name(), err.to_string()))?,
                    _ => self.integer::<i128>(value)?.to_le_bytes(),
                };
                writer.write_bytes(&bytes);
            }
            Builtin::Uint128 => {
                let bytes = match value {
                    JValue::String(text) if text.is_empty() => {
                        return Err(CodecError::invalid(self.name(), "empty string"))
                    }
                    JValue::String(text) => numeric::decimal_to_binary::<16>(text)
                        .map_err(|err| CodecError::invalid(self.name(), err.to_string()))?,
                    _ => self.integer::<u128>(value)?.to_le_bytes(),
                };
                writer.write_bytes(&bytes);
            }
            Builtin::VarInt32 => writer.write_varint32(self.integer::<i32>(value)?),
            Builtin::VarUint32 => writer.write_varuint32(self.integer::<u32>(value)?),
            Builtin::Float32 => writer.write_bytes(&self.float32(value)?.to_le_bytes()),
            Builtin::Float64 => writer.write_bytes(&self.float(value)?.to_le_bytes()),
            Builtin::Float128 => writer.write_bytes(&self.fixed_hex::<16>(value)?),
            Builtin::TimePoint => {
                let micros = time::string_to_time_point(self.text(value)?)?;
                writer.write_bytes(&micros.to_le_bytes());
            }
            Builtin::TimePointSec => {
                let secs = time::string_to_time_point_sec(self.text(value)?)?;
                writer.write_bytes(&secs.to_le_bytes());
            }
            Builtin::BlockTimestamp => {
                let slot = time::string_to_block_timestamp(self.text(value)?)?;
                writer.write_bytes(&slot.to_le_bytes());
            }
            Builtin::Name => {
                let name: Name = self.text(value)?.parse()?;
                writer.write_bytes(&name.0.to_le_bytes());
            }
            Builtin::Bytes => {
                let bytes = hex::decode(self.text(value)?)
                    .map_err(|err| CodecError::invalid(self.name(), err.to_string()))?;
                writer.write_sized(&bytes)?;
            }
            Builtin::String => writer.write_sized(self.text(value)?.as_bytes())?,
            Builtin::Checksum160 => writer.write_bytes(&self.fixed_hex::<20>(value)?),
            Builtin::Checksum256 => writer.write_bytes(&self.fixed_hex::<32>(value)?),
            Builtin::Checksum512 => writer.write_bytes(&self.fixed_hex::<64>(value)?),
            Builtin::PublicKey => {
                let key: PublicKey = self.text(value)?.parse()?;
                writer.write_u8(key.key_type as u8);
                writer.write_bytes(&key.data);
            }
            Builtin::PrivateKey => {
                let key: PrivateKey = self.text(value)?.parse()?;
                writer.write_u8(key.key_type as u8);
                writer.write_bytes(&key.data);
            }
            Builtin::Signature => {
                let signature: Signature = self.text(value)?.parse()?;
                writer.write_u8(signature.key_type as u8);
                writer.write_bytes(&signature.data);
            }
            Builtin::Symbol => {
                let symbol: Symbol = self.text(value)?.parse()?;
                writer.write_bytes(&symbol.0.to_le_bytes());
            }
            Builtin::SymbolCode => {
                let code: SymbolCode = self.text(value)?.parse()?;
                writer.write_bytes(&code.0.to_le_bytes());
            }
            Builtin::Asset => {
                let asset: Asset = self.text(value)?.parse()?;
                writer.write_bytes(&asset.amount.to_le_bytes());
                writer.write_bytes(&asset.symbol.0.to_le_bytes());
            }
        }
        Ok(())
    }

    fn mismatch(&self, value: &JValue) -> CodecError {
        CodecError::ValueMismatch {
            expected: self.name().to_string(),
            found: value.kind(),
        }
    }

    fn text<'v>(&self, value: &'v JValue) -> CodecResult<&'v str> {
        value.as_str().ok_or_else(|| self.mismatch(value))
    }

    /// JSON numbers or decimal strings, range-checked against `T`.
    fn integer<T: TryFrom<i128>>(&self, value: &JValue) -> CodecResult<T> {
        let wide = match value {
            JValue::Int(_) | JValue::UInt(_) => value.as_i128().unwrap_or_default(),
            JValue::String(text) => text.parse::<i128>().map_err(|_| {
                CodecError::invalid(self.name(), format!("{text:?} is not an integer"))
            })?,
            other => return Err(self.mismatch(other)),
        };
        T::try_from(wide)
            .map_err(|_| CodecError::invalid(self.name(), format!("{wide} is out of range")))
    }

    fn float(&self, value: &JValue) -> CodecResult<f64> {
        match value {
            JValue::String(text) => text.parse::<f64>().map_err(|_| {
                CodecError::invalid(self.name(), format!("{text:?} is not a number"))
            }),
            other => other.as_f64().ok_or_else(|| self.mismatch(other)),
        }
    }

    /// Finite inputs must stay finite once narrowed.
    fn float32(&self, value: &JValue) -> CodecResult<f32> {
        let wide = self.float(value)?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(CodecError::invalid(
                self.name(),
                format!("{wide} is out of range"),
            ));
        }
        Ok(narrow)
    }

    fn fixed_hex<const N: usize>(&self, value: &JValue) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        hex::decode_to_slice(self.text(value)?, &mut out)
            .map_err(|err| CodecError::invalid(self.name(), err.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(builtin: Builtin, value: JValue) -> CodecResult<Vec<u8>> {
        let mut writer = BinWriter::new();
        builtin.encode(&value, &mut writer)?;
        Ok(writer.into_bytes())
    }

    fn decode(builtin: Builtin, bytes: &[u8]) -> CodecResult<JValue> {
        builtin.decode(&mut BinReader::new(bytes))
    }

    #[test]
    fn names_are_unique_and_resolvable() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(*builtin));
        }
        assert_eq!(Builtin::from_name("uint256"), None);
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(encode(Builtin::Uint8, JValue::UInt(255)), Ok(vec![255]));
        assert!(encode(Builtin::Uint8, JValue::UInt(256)).is_err());
        assert!(encode(Builtin::Uint16, JValue::int(-1)).is_err());
        assert_eq!(encode(Builtin::Int16, JValue::from("-2")), Ok(vec![0xfe, 0xff]));
        assert!(matches!(
            encode(Builtin::Int32, JValue::Bool(true)),
            Err(CodecError::ValueMismatch { .. })
        ));
        assert_eq!(
            decode(Builtin::Uint64, &u64::MAX.to_le_bytes()),
            Ok(JValue::UInt(u64::MAX))
        );
    }

    #[test]
    fn bool_rejects_other_bytes() {
        assert_eq!(decode(Builtin::Bool, &[1]), Ok(JValue::Bool(true)));
        assert!(decode(Builtin::Bool, &[2]).is_err());
    }

    #[test]
    fn wide_integers_are_decimal_strings() {
        let bytes = encode(Builtin::Int128, JValue::from("-1")).expect("encode");
        assert_eq!(bytes, vec![0xff; 16]);
        assert_eq!(decode(Builtin::Int128, &bytes), Ok(JValue::from("-1")));
        assert_eq!(
            decode(Builtin::Uint128, &bytes),
            Ok(JValue::from(u128::MAX.to_string()))
        );
        assert!(encode(Builtin::Uint128, JValue::from("")).is_err());
    }

    #[test]
    fn floats_keep_short_forms() {
        let bytes = encode(Builtin::Float32, JValue::from(0.1)).expect("encode");
        assert_eq!(decode(Builtin::Float32, &bytes), Ok(JValue::from(0.1)));
        let nan = encode(Builtin::Float64, JValue::from("NaN")).expect("nan");
        assert!(encode(Builtin::Float32, JValue::from("Infinity")).is_ok());
        assert_eq!(decode(Builtin::Float64, &nan), Ok(JValue::from("NaN")));
    }

    #[test]
    fn float32_rejects_values_beyond_its_range() {
        for value in [JValue::from(1e39), JValue::from("-1e39")] {
            assert!(matches!(
                encode(Builtin::Float32, value),
                Err(CodecError::InvalidValue { .. })
            ));
        }
        let max = encode(Builtin::Float32, JValue::from(f32::MAX as f64)).expect("max");
        assert_eq!(max, f32::MAX.to_le_bytes());
    }

    #[test]
    fn byte_types_use_uppercase_hex() {
        let bytes = encode(Builtin::Bytes, JValue::from("00ab")).expect("encode");
        assert_eq!(bytes, vec![2, 0x00, 0xab]);
        assert_eq!(decode(Builtin::Bytes, &bytes), Ok(JValue::from("00AB")));
        assert!(encode(Builtin::Checksum160, JValue::from("00")).is_err());
    }

    #[test]
    fn asset_layout() {
        let bytes = encode(Builtin::Asset, JValue::from("1.0000 EOS")).expect("encode");
        assert_eq!(hex::encode(&bytes), "102700000000000004454f5300000000");
        assert_eq!(decode(Builtin::Asset, &bytes), Ok(JValue::from("1.0000 EOS")));
    }

    #[test]
    fn unknown_key_type_is_rejected() {
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&[0u8; 33]);
        assert!(matches!(
            decode(Builtin::PublicKey, &bytes),
            Err(CodecError::Key(_))
        ));
    }
}
