use abicodec::hash::sha256;
use abicodec::{AbiDef, AbiError, AbiSource, ContractRegistry, LookupError, Name};

const TOKEN_ABI_JSON: &str = include_str!("fixtures/token_abi.json");
const TOKEN_ABI_HEX: &str = include_str!("fixtures/token_abi.hex");

fn name(text: &str) -> Name {
    text.parse().expect("name")
}

fn token_abi_bytes() -> Vec<u8> {
    hex::decode(TOKEN_ABI_HEX.trim()).expect("hex fixture")
}

fn loaded() -> ContractRegistry {
    let mut registry = ContractRegistry::new();
    registry
        .set_abi(name("eosio.token"), AbiSource::Json(TOKEN_ABI_JSON))
        .expect("set_abi");
    registry
}

#[test]
fn actions_and_tables_resolve_to_their_structs() {
    let registry = loaded();
    let token = name("eosio.token");
    for (action, type_name) in [("transfer", "transfer"), ("issue", "issue"), ("create", "create")] {
        let handle = registry
            .type_for_action(token, name(action))
            .expect("action");
        assert_eq!(handle.name(), type_name);
    }
    assert_eq!(
        registry
            .type_for_table(token, name("accounts"))
            .expect("accounts")
            .name(),
        "account"
    );
    assert_eq!(
        registry
            .type_for_table(token, name("stat"))
            .expect("stat")
            .name(),
        "currency_stats"
    );
}

#[test]
fn lookups_distinguish_missing_contracts_from_missing_actions() {
    let registry = loaded();
    assert_eq!(
        registry
            .type_for_action(name("eosio"), name("transfer"))
            .unwrap_err(),
        LookupError::ContractNotLoaded("eosio".into())
    );
    assert_eq!(
        registry
            .type_for_action(name("eosio.token"), name("retire"))
            .unwrap_err(),
        LookupError::ActionNotFound {
            contract: "eosio.token".into(),
            action: "retire".into(),
        }
    );
    assert_eq!(
        registry
            .type_for_table(name("eosio.token"), name("balances"))
            .unwrap_err(),
        LookupError::TableNotFound {
            contract: "eosio.token".into(),
            table: "balances".into(),
        }
    );
    assert_eq!(
        registry
            .type_for_action_result(name("eosio.token"), name("transfer"))
            .unwrap_err(),
        LookupError::ActionResultNotFound {
            contract: "eosio.token".into(),
            action: "transfer".into(),
        }
    );
}

#[test]
fn json_and_binary_abis_load_identically() {
    let mut registry = ContractRegistry::new();
    let from_json = registry
        .set_abi(name("a"), AbiSource::Json(TOKEN_ABI_JSON))
        .expect("json")
        .abi_hash_hex();
    let bytes = token_abi_bytes();
    let from_bin = registry
        .set_abi(name("b"), AbiSource::Binary(&bytes))
        .expect("binary")
        .abi_hash_hex();
    assert_eq!(from_json, from_bin);
    assert_eq!(from_bin, hex::encode_upper(sha256(&bytes)));
    assert_eq!(registry.contracts(), vec![name("a"), name("b")]);
}

#[test]
fn type_named_reaches_aliases_and_builtins() {
    let registry = loaded();
    let token = name("eosio.token");
    assert_eq!(
        registry.type_named(token, "account_name").expect("alias").name(),
        "name"
    );
    assert_eq!(registry.type_named(token, "asset").expect("asset").name(), "asset");
    assert_eq!(
        registry.type_named(token, "transfer[]").unwrap_err(),
        LookupError::UnknownType {
            contract: "eosio.token".into(),
            type_name: "transfer[]".into(),
        }
    );
}

#[test]
fn replacing_an_abi_swaps_the_whole_contract() {
    let mut registry = loaded();
    let token = name("eosio.token");
    let mut abi = AbiDef::from_json(TOKEN_ABI_JSON).expect("abi");
    abi.actions.retain(|action| action.name == name("transfer"));
    registry
        .set_abi(token, AbiSource::Def(abi))
        .expect("replace");
    assert!(registry.type_for_action(token, name("transfer")).is_ok());
    assert!(registry.type_for_action(token, name("issue")).is_err());
}

#[test]
fn rejected_abi_leaves_the_previous_one_installed() {
    let mut registry = loaded();
    let token = name("eosio.token");
    let before = registry.contract(token).expect("loaded").abi_hash_hex();
    let broken = TOKEN_ABI_JSON.replace("\"asset\"", "\"asset??\"");
    let err = registry
        .set_abi(token, AbiSource::Json(&broken))
        .unwrap_err();
    assert_eq!(err, AbiError::InvalidNesting("asset??".into()));
    assert_eq!(
        registry.contract(token).expect("still loaded").abi_hash_hex(),
        before
    );
}

#[test]
fn action_results_are_bound() {
    let mut registry = ContractRegistry::new();
    let abi = r#"{
        "version": "eosio::abi/1.2",
        "structs": [{"name": "sum", "base": "", "fields": [{"name": "a", "type": "uint32"}, {"name": "b", "type": "uint32"}]}],
        "actions": [{"name": "sum", "type": "sum", "ricardian_contract": ""}],
        "action_results": [{"name": "sum", "result_type": "uint64"}]
    }"#;
    registry
        .set_abi(name("calc"), AbiSource::Json(abi))
        .expect("set_abi");
    let result = registry
        .type_for_action_result(name("calc"), name("sum"))
        .expect("result type");
    assert_eq!(result.name(), "uint64");
    assert_eq!(result.bin_to_json(&7u64.to_le_bytes()).expect("decode"), "7");
}

#[test]
fn unload_forgets_the_contract() {
    let mut registry = loaded();
    let token = name("eosio.token");
    assert!(registry.unload(token));
    assert!(!registry.unload(token));
    assert!(registry.contracts().is_empty());
    assert!(matches!(
        registry.type_for_action(token, name("transfer")),
        Err(LookupError::ContractNotLoaded(_))
    ));
}

#[test]
fn binary_abis_with_newer_sections_still_load() {
    let mut bytes = token_abi_bytes();
    bytes.extend_from_slice(&[0x00, 0x00]);
    let mut registry = ContractRegistry::new();
    let contract = registry
        .set_abi(name("eosio.token"), AbiSource::Binary(&bytes))
        .expect("set_abi");
    assert_eq!(contract.abi_hash_hex(), hex::encode_upper(sha256(&bytes)));
    assert!(registry
        .type_for_action(name("eosio.token"), name("transfer"))
        .is_ok());
}
