use abicodec::abi_def::{AbiExtension, ErrorMessage};
use abicodec::serde_support::from_json_str;
use abicodec::{AbiDef, AbiError, VersionPolicy};

const TOKEN_ABI_JSON: &str = include_str!("fixtures/token_abi.json");
const TOKEN_ABI_HEX: &str = include_str!("fixtures/token_abi.hex");

fn token_abi_bytes() -> Vec<u8> {
    hex::decode(TOKEN_ABI_HEX.trim()).expect("hex fixture")
}

#[test]
fn binary_token_abi_decodes_to_its_json_form() {
    let abi = AbiDef::from_bin(&token_abi_bytes()).expect("from_bin");
    assert_eq!(abi.version, "eosio::abi/1.0");
    assert_eq!(abi.structs.len(), 5);
    assert_eq!(abi.tables[0].key_names, ["currency"]);
    assert_eq!(
        abi.to_jvalue(),
        from_json_str(TOKEN_ABI_JSON).expect("json fixture")
    );
}

#[test]
fn json_token_abi_encodes_to_the_binary_fixture() {
    let abi = AbiDef::from_json(TOKEN_ABI_JSON).expect("from_json");
    assert_eq!(abi.to_bin().expect("to_bin"), token_abi_bytes());
}

#[test]
fn bundled_abi_schema_describes_itself() {
    let schema = AbiDef::abi_schema();
    let bytes = schema.to_bin().expect("to_bin");
    assert_eq!(AbiDef::from_bin(&bytes).expect("from_bin"), schema);
}

#[test]
fn unknown_top_level_keys_survive_a_json_round_trip() {
    let abi = AbiDef::from_json(
        r#"{"version":"eosio::abi/1.1","structs":[],"protobuf_types":{"file":"x.proto"}}"#,
    )
    .expect("abi");
    assert_eq!(abi.extra.len(), 1);
    let text = abi.to_json().expect("to_json");
    assert!(text.ends_with(r#","protobuf_types":{"file":"x.proto"}}"#), "{text}");
    assert_eq!(AbiDef::from_json(&text).expect("reparse"), abi);
}

#[test]
fn missing_sections_default_to_empty() {
    let abi = AbiDef::from_json(r#"{"version":"eosio::abi/1.0"}"#).expect("abi");
    assert_eq!(abi, AbiDef {
        version: "eosio::abi/1.0".into(),
        ..AbiDef::default()
    });
}

#[test]
fn error_messages_and_extensions_round_trip_through_binary() {
    let abi = AbiDef::from_json(
        r#"{"version":"eosio::abi/1.1",
            "error_messages":[{"error_code":"18446744073709551615","error_msg":"overdrawn"}],
            "abi_extensions":[{"tag":1,"value":"0a0B"}]}"#,
    )
    .expect("abi");
    assert_eq!(
        abi.error_messages,
        [ErrorMessage {
            error_code: u64::MAX,
            error_msg: "overdrawn".into(),
        }]
    );
    assert_eq!(
        abi.abi_extensions,
        [AbiExtension {
            tag: 1,
            value: vec![0x0a, 0x0b],
        }]
    );
    let decoded = AbiDef::from_bin(&abi.to_bin().expect("to_bin")).expect("from_bin");
    assert_eq!(decoded, abi);
}

#[test]
fn malformed_definitions_are_bad_abis() {
    let cases = [
        r#"{"structs":[{"name":"s","base":"","fields":[{"name":"a","type":"uint8","doc":"x"}]}]}"#,
        r#"{"types":[{"new_type_name":"t"}]}"#,
        r#"{"actions":[{"name":"NotAName","type":"s"}]}"#,
        r#"{"tables":[{"name":"t","type":7}]}"#,
        r#"{"variants":[{"name":"v","types":"uint8"}]}"#,
        r#"{"abi_extensions":[{"tag":70000,"value":""}]}"#,
        r#"{"structs":{}}"#,
        r#"[]"#,
    ];
    for text in cases {
        assert!(
            matches!(AbiDef::from_json(text), Err(AbiError::BadAbi(_))),
            "{text}"
        );
    }
}

#[test]
fn malformed_json_surfaces_as_a_codec_error() {
    assert!(matches!(
        AbiDef::from_json("{\"version\":"),
        Err(AbiError::Codec(_))
    ));
}

#[test]
fn binary_versions_follow_the_policy() {
    let mut abi = AbiDef::from_json(TOKEN_ABI_JSON).expect("abi");
    abi.version = "eosio::abi/2.0".into();
    let bytes = abi.to_bin().expect("to_bin");
    assert_eq!(
        AbiDef::from_bin(&bytes).unwrap_err(),
        AbiError::UnsupportedVersion("eosio::abi/2.0".into())
    );
    let relaxed = AbiDef::from_bin_with_policy(&bytes, VersionPolicy::Any).expect("any");
    assert_eq!(relaxed, abi);
}

#[test]
fn truncated_binary_abi_is_rejected() {
    let bytes = token_abi_bytes();
    assert!(AbiDef::from_bin(&bytes[..bytes.len() / 2]).is_err());
    assert!(AbiDef::from_bin(&[]).is_err());
}

#[test]
fn sections_after_action_results_survive_a_binary_round_trip() {
    let mut bytes = token_abi_bytes();
    // empty action_results, then a newer section this version cannot read
    bytes.extend_from_slice(&[0x00, 0x01, 0x7f]);
    let abi = AbiDef::from_bin(&bytes).expect("from_bin");
    assert!(abi.action_results.is_empty());
    assert_eq!(abi.extra_bin, [0x01, 0x7f]);
    assert_eq!(abi.to_bin().expect("to_bin"), bytes);

    let plain = AbiDef::from_bin(&token_abi_bytes()).expect("from_bin");
    assert!(plain.extra_bin.is_empty());
    assert_eq!(AbiDef { extra_bin: Vec::new(), ..abi }, plain);
}
