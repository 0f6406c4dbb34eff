//! Loaded contracts and the lookups that route an action or table to its type.

use std::collections::hash_map::{Entry, HashMap};

use tracing::{debug, trace};

use crate::abi_def::AbiDef;
use crate::error::{AbiError, AbiResult, LookupError, LookupResult};
use crate::hash::sha256;
use crate::name::Name;
use crate::options::AbiOptions;
use crate::schema::{TypeHandle, TypeId, TypeRegistry};

/// Where an ABI comes from when it is installed.
#[derive(Clone, Debug)]
pub enum AbiSource<'a> {
    Json(&'a str),
    Binary(&'a [u8]),
    Def(AbiDef),
}

/// A type bound to an action, table, or action result, with the name the
/// ABI declared it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub type_name: String,
    pub ty: TypeId,
}

/// One contract's resolved ABI.
#[derive(Clone, Debug)]
pub struct Contract {
    name: Name,
    abi: AbiDef,
    registry: TypeRegistry,
    actions: HashMap<Name, Binding>,
    tables: HashMap<Name, Binding>,
    action_results: HashMap<Name, Binding>,
    abi_hash: [u8; 32],
}

fn bind<'a>(
    registry: &TypeRegistry,
    entries: impl Iterator<Item = (Name, &'a str)>,
) -> AbiResult<HashMap<Name, Binding>> {
    entries
        .map(|(name, type_name)| -> AbiResult<(Name, Binding)> {
            let ty = registry
                .lookup(type_name)
                .ok_or_else(|| AbiError::UnknownType(type_name.to_string()))?;
            Ok((
                name,
                Binding {
                    type_name: type_name.to_string(),
                    ty,
                },
            ))
        })
        .collect()
}

impl Contract {
    pub fn from_abi(name: Name, abi: AbiDef, options: AbiOptions) -> AbiResult<Self> {
        let registry = TypeRegistry::register(&abi, options)?;
        let actions = bind(
            &registry,
            abi.actions.iter().map(|a| (a.name, a.type_name.as_str())),
        )?;
        let tables = bind(
            &registry,
            abi.tables.iter().map(|t| (t.name, t.type_name.as_str())),
        )?;
        let action_results = bind(
            &registry,
            abi.action_results
                .iter()
                .map(|r| (r.name, r.result_type.as_str())),
        )?;
        let abi_hash = sha256(&abi.to_bin()?);
        Ok(Self {
            name,
            abi,
            registry,
            actions,
            tables,
            action_results,
            abi_hash,
        })
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn abi(&self) -> &AbiDef {
        &self.abi
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// SHA-256 of the ABI in its binary form.
    pub fn abi_hash(&self) -> &[u8; 32] {
        &self.abi_hash
    }

    pub fn abi_hash_hex(&self) -> String {
        hex::encode_upper(self.abi_hash)
    }

    pub fn action(&self, action: Name) -> Option<&Binding> {
        self.actions.get(&action)
    }

    pub fn table(&self, table: Name) -> Option<&Binding> {
        self.tables.get(&table)
    }

    pub fn action_result(&self, action: Name) -> Option<&Binding> {
        self.action_results.get(&action)
    }

    pub fn handle(&self, binding: &Binding) -> Option<TypeHandle<'_>> {
        self.registry.handle_of(binding.ty)
    }

    /// Action names, sorted by their numeric value.
    pub fn actions(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.actions.keys().copied().collect();
        names.sort();
        names
    }

    pub fn tables(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.tables.keys().copied().collect();
        names.sort();
        names
    }
}

/// Contracts keyed by account name. Installing an ABI replaces any earlier
/// one for the same contract, and a failed install leaves the old one in place.
#[derive(Clone, Debug, Default)]
pub struct ContractRegistry {
    contracts: HashMap<Name, Contract>,
    options: AbiOptions,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AbiOptions) -> Self {
        Self {
            contracts: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &AbiOptions {
        &self.options
    }

    pub fn set_abi(&mut self, contract: Name, source: AbiSource<'_>) -> AbiResult<&Contract> {
        let abi = match source {
            AbiSource::Json(text) => AbiDef::from_json(text)?,
            AbiSource::Binary(bytes) => {
                AbiDef::from_bin_with_policy(bytes, self.options.version_policy)?
            }
            AbiSource::Def(abi) => abi,
        };
        let built = Contract::from_abi(contract, abi, self.options)?;
        debug!(
            %contract,
            types = built.registry.len(),
            actions = built.actions.len(),
            tables = built.tables.len(),
            abi_hash = %built.abi_hash_hex(),
            "installed abi"
        );
        let slot = match self.contracts.entry(contract) {
            Entry::Occupied(mut entry) => {
                debug!(%contract, "replaced previous abi");
                entry.insert(built);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(built),
        };
        Ok(slot)
    }

    /// Returns whether the contract was loaded.
    pub fn unload(&mut self, contract: Name) -> bool {
        let removed = self.contracts.remove(&contract).is_some();
        if removed {
            debug!(%contract, "unloaded abi");
        }
        removed
    }

    pub fn contains(&self, contract: Name) -> bool {
        self.contracts.contains_key(&contract)
    }

    /// Loaded contract names, sorted by their numeric value.
    pub fn contracts(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.contracts.keys().copied().collect();
        names.sort();
        names
    }

    pub fn contract(&self, contract: Name) -> LookupResult<&Contract> {
        self.contracts
            .get(&contract)
            .ok_or_else(|| LookupError::ContractNotLoaded(contract.to_string()))
    }

    pub fn type_for_action(&self, contract: Name, action: Name) -> LookupResult<TypeHandle<'_>> {
        trace!(%contract, %action, "type for action");
        let loaded = self.contract(contract)?;
        loaded
            .action(action)
            .and_then(|binding| loaded.handle(binding))
            .ok_or_else(|| LookupError::ActionNotFound {
                contract: contract.to_string(),
                action: action.to_string(),
            })
    }

    pub fn type_for_table(&self, contract: Name, table: Name) -> LookupResult<TypeHandle<'_>> {
        trace!(%contract, %table, "type for table");
        let loaded = self.contract(contract)?;
        loaded
            .table(table)
            .and_then(|binding| loaded.handle(binding))
            .ok_or_else(|| LookupError::TableNotFound {
                contract: contract.to_string(),
                table: table.to_string(),
            })
    }

    pub fn type_for_action_result(
        &self,
        contract: Name,
        action: Name,
    ) -> LookupResult<TypeHandle<'_>> {
        trace!(%contract, %action, "type for action result");
        let loaded = self.contract(contract)?;
        loaded
            .action_result(action)
            .and_then(|binding| loaded.handle(binding))
            .ok_or_else(|| LookupError::ActionResultNotFound {
                contract: contract.to_string(),
                action: action.to_string(),
            })
    }

    /// Any type the contract's ABI can name, builtins and synthesized
    /// `[]`/`?`/`$` forms included.
    pub fn type_named(&self, contract: Name, type_name: &str) -> LookupResult<TypeHandle<'_>> {
        trace!(%contract, type_name, "type by name");
        self.contract(contract)?
            .registry
            .handle(type_name)
            .ok_or_else(|| LookupError::UnknownType {
                contract: contract.to_string(),
                type_name: type_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_ABI: &str = r#"{
        "version": "eosio::abi/1.1",
        "types": [{"new_type_name": "account_name", "type": "name"}],
        "structs": [
            {"name": "transfer", "base": "", "fields": [
                {"name": "from", "type": "account_name"},
                {"name": "to", "type": "account_name"},
                {"name": "quantity", "type": "asset"},
                {"name": "memo", "type": "string"}
            ]},
            {"name": "account", "base": "", "fields": [
                {"name": "balance", "type": "asset"}
            ]}
        ],
        "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}],
        "tables": [{"name": "accounts", "index_type": "i64", "key_names": [], "key_types": [], "type": "account"}]
    }"#;

    fn name(text: &str) -> Name {
        text.parse().unwrap()
    }

    #[test]
    fn routes_actions_and_tables() {
        let mut registry = ContractRegistry::new();
        registry
            .set_abi(name("eosio.token"), AbiSource::Json(TOKEN_ABI))
            .unwrap();
        let action = registry
            .type_for_action(name("eosio.token"), name("transfer"))
            .unwrap();
        assert_eq!(action.name(), "transfer");
        let table = registry
            .type_for_table(name("eosio.token"), name("accounts"))
            .unwrap();
        assert_eq!(table.name(), "account");
    }

    #[test]
    fn failed_install_keeps_previous_abi() {
        let mut registry = ContractRegistry::new();
        registry
            .set_abi(name("eosio.token"), AbiSource::Json(TOKEN_ABI))
            .unwrap();
        let broken = TOKEN_ABI.replace("\"type\": \"asset\"", "\"type\": \"nope\"");
        assert!(registry
            .set_abi(name("eosio.token"), AbiSource::Json(&broken))
            .is_err());
        assert!(registry
            .type_for_action(name("eosio.token"), name("transfer"))
            .is_ok());
    }

    #[test]
    fn lookup_errors_name_the_missing_piece() {
        let mut registry = ContractRegistry::new();
        assert_eq!(
            registry
                .type_for_action(name("eosio.token"), name("transfer"))
                .unwrap_err()
                .to_string(),
            "contract \"eosio.token\" is not loaded"
        );
        registry
            .set_abi(name("eosio.token"), AbiSource::Json(TOKEN_ABI))
            .unwrap();
        assert_eq!(
            registry
                .type_for_action(name("eosio.token"), name("issue"))
                .unwrap_err(),
            LookupError::ActionNotFound {
                contract: "eosio.token".into(),
                action: "issue".into(),
            }
        );
        assert!(registry.unload(name("eosio.token")));
        assert!(!registry.contains(name("eosio.token")));
    }
}
