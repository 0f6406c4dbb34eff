//! String-in, string-out conversions keyed by contract and type name.
//!
//! Every string argument is optional and an absent one reads as `""`, so
//! callers holding nullable strings can pass them straight through.

use tracing::{trace, warn};

use crate::contract::{AbiSource, Contract, ContractRegistry};
use crate::error::{LookupError, Result};
use crate::name::Name;
use crate::options::AbiOptions;
use crate::schema::TypeHandle;

fn text(input: Option<&str>) -> &str {
    input.unwrap_or("")
}

fn name_arg(input: Option<&str>) -> Result<Name> {
    Ok(text(input).parse()?)
}

/// Binary produced by a `json_to_bin` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedBin(Vec<u8>);

impl EncodedBin {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Uppercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for EncodedBin {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<EncodedBin> for Vec<u8> {
    fn from(bin: EncodedBin) -> Self {
        bin.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct AbiContext {
    contracts: ContractRegistry,
}

impl AbiContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AbiOptions) -> Self {
        Self {
            contracts: ContractRegistry::with_options(options),
        }
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn contracts_mut(&mut self) -> &mut ContractRegistry {
        &mut self.contracts
    }

    pub fn string_to_name(&self, input: Option<&str>) -> Result<u64> {
        Ok(name_arg(input)?.as_u64())
    }

    pub fn name_to_string(&self, raw: u64) -> String {
        Name(raw).to_string()
    }

    /// Install a JSON ABI for `contract`.
    pub fn set_abi(&mut self, contract: Option<&str>, abi_json: Option<&str>) -> Result<&Contract> {
        let contract = name_arg(contract)?;
        self.install(contract, AbiSource::Json(text(abi_json)))
    }

    /// Install a binary ABI for `contract`.
    pub fn set_abi_bin(&mut self, contract: Option<&str>, abi: &[u8]) -> Result<&Contract> {
        let contract = name_arg(contract)?;
        self.install(contract, AbiSource::Binary(abi))
    }

    pub fn set_abi_hex(&mut self, contract: Option<&str>, abi_hex: Option<&str>) -> Result<&Contract> {
        let contract = name_arg(contract)?;
        let bytes = hex::decode(text(abi_hex))?;
        self.install(contract, AbiSource::Binary(&bytes))
    }

    fn install(&mut self, contract: Name, source: AbiSource<'_>) -> Result<&Contract> {
        match self.contracts.set_abi(contract, source) {
            Ok(loaded) => Ok(loaded),
            Err(err) => {
                warn!(%contract, error = %err, "rejected abi");
                Err(err.into())
            }
        }
    }

    /// The type name the ABI declared for `action`.
    pub fn get_type_for_action(&self, contract: Option<&str>, action: Option<&str>) -> Result<&str> {
        let contract = name_arg(contract)?;
        let action = name_arg(action)?;
        let loaded = self.contracts.contract(contract)?;
        let binding = loaded.action(action).ok_or_else(|| LookupError::ActionNotFound {
            contract: contract.to_string(),
            action: action.to_string(),
        })?;
        Ok(&binding.type_name)
    }

    /// The type name the ABI declared for rows of `table`.
    pub fn get_type_for_table(&self, contract: Option<&str>, table: Option<&str>) -> Result<&str> {
        let contract = name_arg(contract)?;
        let table = name_arg(table)?;
        let loaded = self.contracts.contract(contract)?;
        let binding = loaded.table(table).ok_or_else(|| LookupError::TableNotFound {
            contract: contract.to_string(),
            table: table.to_string(),
        })?;
        Ok(&binding.type_name)
    }

    fn type_handle(&self, contract: Option<&str>, type_name: Option<&str>) -> Result<TypeHandle<'_>> {
        let contract = name_arg(contract)?;
        Ok(self.contracts.type_named(contract, text(type_name))?)
    }

    /// Struct fields in `json` must follow schema order.
    pub fn json_to_bin(
        &self,
        contract: Option<&str>,
        type_name: Option<&str>,
        json: Option<&str>,
    ) -> Result<EncodedBin> {
        let handle = self.type_handle(contract, type_name)?;
        trace!(type_name = handle.name(), "json to bin");
        Ok(EncodedBin(handle.json_to_bin(text(json))?))
    }

    /// Struct fields in `json` may come in any order.
    pub fn json_to_bin_reorderable(
        &self,
        contract: Option<&str>,
        type_name: Option<&str>,
        json: Option<&str>,
    ) -> Result<EncodedBin> {
        let handle = self.type_handle(contract, type_name)?;
        trace!(type_name = handle.name(), "json to bin, reorderable");
        Ok(EncodedBin(handle.json_to_bin_reorderable(text(json))?))
    }

    pub fn bin_to_json(
        &self,
        contract: Option<&str>,
        type_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String> {
        let handle = self.type_handle(contract, type_name)?;
        trace!(type_name = handle.name(), len = bytes.len(), "bin to json");
        Ok(handle.bin_to_json(bytes)?)
    }

    pub fn hex_to_json(
        &self,
        contract: Option<&str>,
        type_name: Option<&str>,
        hex: Option<&str>,
    ) -> Result<String> {
        let bytes = hex::decode(text(hex))?;
        self.bin_to_json(contract, type_name, &bytes)
    }

    fn target_type<'a>(&'a self, contract: Option<&str>, target: Target<'a>) -> Result<&'a str> {
        match target {
            Target::Action(action) => self.get_type_for_action(contract, Some(action)),
            Target::Type(type_name) => Ok(type_name),
        }
    }
}

/// What a one-shot conversion converts: an action's argument struct, or a
/// type by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    Action(&'a str),
    Type(&'a str),
}

/// Load `abi_json` for `contract` and encode `json` as `target`. Struct
/// fields may come in any order. Returns uppercase hex.
pub fn serialize(contract: Option<&str>, target: Target<'_>, json: &str, abi_json: &str) -> Result<String> {
    let mut context = AbiContext::new();
    context.set_abi(contract, Some(abi_json))?;
    let type_name = context.target_type(contract, target)?;
    Ok(context
        .json_to_bin_reorderable(contract, Some(type_name), Some(json))?
        .to_hex())
}

/// Load `abi_json` for `contract` and decode the hex payload as `target`.
pub fn deserialize(contract: Option<&str>, target: Target<'_>, hex: &str, abi_json: &str) -> Result<String> {
    let mut context = AbiContext::new();
    context.set_abi(contract, Some(abi_json))?;
    let type_name = context.target_type(contract, target)?;
    context.hex_to_json(contract, Some(type_name), Some(hex))
}
