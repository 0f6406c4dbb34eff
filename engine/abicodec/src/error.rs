use thiserror::Error;

/// Result alias for schema registration.
pub type AbiResult<T> = std::result::Result<T, AbiError>;
/// Result alias for the binary and JSON value codecs.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
/// Result alias for contract registry lookups.
pub type LookupResult<T> = std::result::Result<T, LookupError>;
/// Result alias for key and signature conversions.
pub type KeyResult<T> = std::result::Result<T, KeyError>;
/// Result alias for fixed-width base conversions.
pub type NumericResult<T> = std::result::Result<T, NumericError>;
/// Result alias used at the crate boundary.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures while turning a schema document into a type registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("recursion limit reached while resolving {0}")]
    RecursionLimitReached(String),
    #[error("invalid nesting: {0}")]
    InvalidNesting(String),
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("missing name in {0}")]
    MissingName(String),
    #[error("redefined type: {0}")]
    RedefinedType(String),
    #[error("base {base} of struct {name} is not a struct")]
    BaseNotAStruct { name: String, base: String },
    #[error("extension type {0} cannot be the target of a typedef")]
    ExtensionTypedef(String),
    #[error("unsupported abi version: {0:?}")]
    UnsupportedVersion(String),
    #[error("bad abi: {0}")]
    BadAbi(String),
    #[error("abi document: {0}")]
    Codec(#[from] CodecError),
}

/// Failures while converting a value against a resolved type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("expected {expected}, found {found}")]
    ValueMismatch { expected: String, found: &'static str },
    #[error("unexpected end of binary input")]
    UnexpectedEnd,
    #[error("{0} bytes of extra data after the value")]
    ExtraData(usize),
    #[error("{variant} has no alternative {alternative}")]
    UnknownVariant { variant: String, alternative: String },
    #[error("malformed JSON: {0}")]
    Json(String),
    #[error("invalid {type_name}: {reason}")]
    InvalidValue { type_name: String, reason: String },
    #[error("{name} is missing field {field}")]
    MissingField { name: String, field: String },
    #[error("{name} has unexpected field {field}")]
    UnexpectedField { name: String, field: String },
    #[error("value nesting exceeds the recursion limit")]
    RecursionLimitReached,
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("{field}: {source}")]
    InField {
        field: String,
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Attach the struct field, array index, or variant alternative the error came from.
    pub fn within(self, field: impl Into<String>) -> Self {
        CodecError::InField {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with field context stripped.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::InField { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn invalid(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Failures while resolving a contract's action, table, or type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("contract \"{0}\" is not loaded")]
    ContractNotLoaded(String),
    #[error("contract \"{contract}\" does not have action \"{action}\"")]
    ActionNotFound { contract: String, action: String },
    #[error("contract \"{contract}\" does not have table \"{table}\"")]
    TableNotFound { contract: String, table: String },
    #[error("contract \"{contract}\" does not have a result type for action \"{action}\"")]
    ActionResultNotFound { contract: String, action: String },
    #[error("contract \"{contract}\" does not have type \"{type_name}\"")]
    UnknownType { contract: String, type_name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("unrecognized {0} format")]
    UnrecognizedFormat(&'static str),
    #[error("{0} checksum doesn't match")]
    ChecksumMismatch(&'static str),
    #[error("unknown key type {0}")]
    InvalidKeyType(u8),
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("invalid decimal digit {0:?}")]
    InvalidDecimalDigit(char),
    #[error("invalid base-58 character {0:?}")]
    InvalidBase58Char(char),
    #[error("number is out of range")]
    OutOfRange,
}

/// Any failure surfaced through [`crate::AbiContext`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
