/* Copyright (c) 2026 Olle Mårtensson. This Source Code Form is subject to the terms of the Eclipse Public License, v. 2.0. */
//! abicodec: schema-driven conversion between JSON and the positional
//! binary encoding used by EOSIO-style contracts.
//!
//! An ABI document ([`AbiDef`]) is resolved into a [`TypeRegistry`]; values
//! are then converted against a type from that registry. Contracts are
//! tracked by account name in a [`ContractRegistry`], and [`AbiContext`]
//! layers string-keyed conversions on top.
//!
//! # Examples
//! ```
//! use abicodec::AbiContext;
//!
//! let abi = r#"{
//!     "version": "eosio::abi/1.1",
//!     "structs": [{"name": "transfer", "base": "", "fields": [
//!         {"name": "from", "type": "name"},
//!         {"name": "to", "type": "name"},
//!         {"name": "quantity", "type": "asset"},
//!         {"name": "memo", "type": "string"}
//!     ]}],
//!     "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}]
//! }"#;
//!
//! let mut context = AbiContext::new();
//! context.set_abi(Some("eosio.token"), Some(abi)).expect("abi");
//! let bin = context
//!     .json_to_bin(
//!         Some("eosio.token"),
//!         Some("transfer"),
//!         Some(r#"{"from":"alice","to":"bob","quantity":"1.0000 EOS","memo":"hi"}"#),
//!     )
//!     .expect("encode");
//! assert_eq!(
//!     bin.to_hex(),
//!     "0000000000855C340000000000000E3D102700000000000004454F5300000000026869"
//! );
//! ```

mod error;
pub mod value;

pub mod abi_def;
pub mod binary;
pub mod builtin;
pub mod context;
pub mod contract;
pub mod hash;
pub mod json;
pub mod keys;
pub mod name;
pub mod numeric;
pub mod options;
pub mod schema;
pub mod serde_support;
pub mod symbol;
pub mod time;

pub use abi_def::AbiDef;
pub use binary::FieldOrder;
pub use builtin::Builtin;
pub use context::{deserialize, serialize, AbiContext, EncodedBin, Target};
pub use contract::{AbiSource, Contract, ContractRegistry};
pub use error::{
    AbiError, AbiResult, CodecError, CodecResult, Error, KeyError, KeyResult, LookupError,
    LookupResult, NumericError, NumericResult, Result,
};
pub use keys::{KeyType, PrivateKey, PublicKey, Signature};
pub use name::Name;
pub use options::{AbiOptions, VersionPolicy};
pub use schema::{AbiType, Field, TypeHandle, TypeId, TypeKind, TypeRegistry};
pub use symbol::{Asset, Symbol, SymbolCode};
pub use value::JValue;

/// Resolve `abi` into a registry with default options.
pub fn register(abi: &AbiDef) -> AbiResult<TypeRegistry> {
    TypeRegistry::from_abi(abi)
}

/// Parse a JSON ABI and resolve it with default options.
pub fn register_json(abi_json: &str) -> AbiResult<TypeRegistry> {
    TypeRegistry::from_abi(&AbiDef::from_json(abi_json)?)
}
