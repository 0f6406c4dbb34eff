//! The ABI document: what a contract publishes to describe its types.
//!
//! The top level is read permissively so newer documents still load:
//! absent sections default to empty and unrecognized keys are carried in
//! [`AbiDef::extra`]. Individual definitions are read strictly.

use std::sync::OnceLock;

use crate::binary::{self, BinReader, FieldOrder};
use crate::error::{AbiError, AbiResult};
use crate::name::Name;
use crate::options::{AbiOptions, VersionPolicy};
use crate::schema::{TypeHandle, TypeRegistry};
use crate::serde_support::from_json_str;
use crate::value::JValue;

pub const ABI_DEF_TYPE: &str = "abi_def";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDef {
    pub new_type_name: String,
    pub type_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub base: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionDef {
    pub name: Name,
    pub type_name: String,
    pub ricardian_contract: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableDef {
    pub name: Name,
    pub index_type: String,
    pub key_names: Vec<String>,
    pub key_types: Vec<String>,
    pub type_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClausePair {
    pub id: String,
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error_code: u64,
    pub error_msg: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbiExtension {
    pub tag: u16,
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionResultDef {
    pub name: Name,
    pub result_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbiDef {
    pub version: String,
    pub types: Vec<TypeDef>,
    pub structs: Vec<StructDef>,
    pub actions: Vec<ActionDef>,
    pub tables: Vec<TableDef>,
    pub ricardian_clauses: Vec<ClausePair>,
    pub error_messages: Vec<ErrorMessage>,
    pub abi_extensions: Vec<AbiExtension>,
    pub variants: Vec<VariantDef>,
    pub action_results: Vec<ActionResultDef>,
    /// Top-level keys this version does not understand, in input order.
    pub extra: Vec<(String, JValue)>,
    /// Binary sections after `action_results`, kept verbatim.
    pub extra_bin: Vec<u8>,
}

impl AbiDef {
    pub fn from_json(text: &str) -> AbiResult<Self> {
        let value = from_json_str(text)?;
        Self::from_jvalue(&value)
    }

    pub fn from_jvalue(value: &JValue) -> AbiResult<Self> {
        parse_abi(value)
    }

    /// Decode a binary ABI, checking its version against the v1 policy.
    pub fn from_bin(bytes: &[u8]) -> AbiResult<Self> {
        Self::from_bin_with_policy(bytes, VersionPolicy::AbiV1)
    }

    pub fn from_bin_with_policy(bytes: &[u8], policy: VersionPolicy) -> AbiResult<Self> {
        let mut reader = BinReader::new(bytes);
        let version = std::str::from_utf8(reader.read_sized()?)
            .map_err(|_| AbiError::BadAbi("version is not valid utf-8".into()))?;
        policy.check(version)?;
        let handle = abi_def_type()?;
        let mut reader = BinReader::new(bytes);
        let value = binary::decode_prefix(handle.registry(), handle.id(), &mut reader)?;
        let mut abi = Self::from_jvalue(&value)?;
        abi.extra_bin = bytes[reader.position()..].to_vec();
        Ok(abi)
    }

    pub fn to_bin(&self) -> AbiResult<Vec<u8>> {
        let mut value = self.to_jvalue();
        if !self.extra_bin.is_empty() && value.get("action_results").is_none() {
            // the tail sits after action_results, so its slot must be written
            if let JValue::Object(entries) = &mut value {
                entries.push(("action_results".to_string(), JValue::Array(Vec::new())));
            }
        }
        let mut bytes = abi_def_type()?.encode(&value, FieldOrder::Reorderable)?;
        bytes.extend_from_slice(&self.extra_bin);
        Ok(bytes)
    }

    pub fn to_json(&self) -> AbiResult<String> {
        Ok(crate::serde_support::to_json_string(&self.to_jvalue())?)
    }

    pub fn to_jvalue(&self) -> JValue {
        let mut entries = vec![
            ("version".to_string(), JValue::from(self.version.as_str())),
            ("types".to_string(), list(&self.types, |t| {
                JValue::object([
                    ("new_type_name", JValue::from(t.new_type_name.as_str())),
                    ("type", JValue::from(t.type_name.as_str())),
                ])
            })),
            ("structs".to_string(), list(&self.structs, |s| {
                JValue::object([
                    ("name", JValue::from(s.name.as_str())),
                    ("base", JValue::from(s.base.as_str())),
                    ("fields", list(&s.fields, |f| {
                        JValue::object([
                            ("name", JValue::from(f.name.as_str())),
                            ("type", JValue::from(f.type_name.as_str())),
                        ])
                    })),
                ])
            })),
            ("actions".to_string(), list(&self.actions, |a| {
                JValue::object([
                    ("name", JValue::from(a.name.to_string())),
                    ("type", JValue::from(a.type_name.as_str())),
                    ("ricardian_contract", JValue::from(a.ricardian_contract.as_str())),
                ])
            })),
            ("tables".to_string(), list(&self.tables, |t| {
                JValue::object([
                    ("name", JValue::from(t.name.to_string())),
                    ("index_type", JValue::from(t.index_type.as_str())),
                    ("key_names", strings(&t.key_names)),
                    ("key_types", strings(&t.key_types)),
                    ("type", JValue::from(t.type_name.as_str())),
                ])
            })),
            ("ricardian_clauses".to_string(), list(&self.ricardian_clauses, |c| {
                JValue::object([
                    ("id", JValue::from(c.id.as_str())),
                    ("body", JValue::from(c.body.as_str())),
                ])
            })),
            ("error_messages".to_string(), list(&self.error_messages, |e| {
                JValue::object([
                    ("error_code", JValue::UInt(e.error_code)),
                    ("error_msg", JValue::from(e.error_msg.as_str())),
                ])
            })),
            ("abi_extensions".to_string(), list(&self.abi_extensions, |e| {
                JValue::object([
                    ("tag", JValue::UInt(e.tag as u64)),
                    ("value", JValue::String(hex::encode_upper(&e.value))),
                ])
            })),
            ("variants".to_string(), list(&self.variants, |v| {
                JValue::object([
                    ("name", JValue::from(v.name.as_str())),
                    ("types", strings(&v.types)),
                ])
            })),
        ];
        if !self.action_results.is_empty() {
            entries.push(("action_results".to_string(), list(&self.action_results, |r| {
                JValue::object([
                    ("name", JValue::from(r.name.to_string())),
                    ("result_type", JValue::from(r.result_type.as_str())),
                ])
            })));
        }
        entries.extend(self.extra.iter().cloned());
        JValue::Object(entries)
    }

    /// The schema of `abi_def` itself, used to read and write binary ABIs.
    pub fn abi_schema() -> Self {
        AbiDef {
            version: "eosio::abi/1.1".into(),
            types: vec![typedef("type_name", "string"), typedef("field_name", "string")],
            structs: vec![
                struct_def("type_def", "", &[("new_type_name", "type_name"), ("type", "type_name")]),
                struct_def("field_def", "", &[("name", "field_name"), ("type", "type_name")]),
                struct_def(
                    "struct_def",
                    "",
                    &[("name", "type_name"), ("base", "type_name"), ("fields", "field_def[]")],
                ),
                struct_def(
                    "action_def",
                    "",
                    &[("name", "name"), ("type", "type_name"), ("ricardian_contract", "string")],
                ),
                struct_def(
                    "table_def",
                    "",
                    &[
                        ("name", "name"),
                        ("index_type", "type_name"),
                        ("key_names", "field_name[]"),
                        ("key_types", "type_name[]"),
                        ("type", "type_name"),
                    ],
                ),
                struct_def("clause_pair", "", &[("id", "string"), ("body", "string")]),
                struct_def(
                    "error_message",
                    "",
                    &[("error_code", "uint64"), ("error_msg", "string")],
                ),
                struct_def("extensions_entry", "", &[("tag", "uint16"), ("value", "bytes")]),
                struct_def("variant_def", "", &[("name", "type_name"), ("types", "type_name[]")]),
                struct_def(
                    "action_result_def",
                    "",
                    &[("name", "name"), ("result_type", "type_name")],
                ),
                struct_def(
                    ABI_DEF_TYPE,
                    "",
                    &[
                        ("version", "string"),
                        ("types", "type_def[]"),
                        ("structs", "struct_def[]"),
                        ("actions", "action_def[]"),
                        ("tables", "table_def[]"),
                        ("ricardian_clauses", "clause_pair[]"),
                        ("error_messages", "error_message[]"),
                        ("abi_extensions", "extensions_entry[]"),
                        ("variants", "variant_def[]$"),
                        ("action_results", "action_result_def[]$"),
                    ],
                ),
            ],
            ..AbiDef::default()
        }
    }

    /// Packed transaction layout: `transaction` and the types it is built from.
    pub fn transaction_schema() -> Self {
        AbiDef {
            version: "eosio::abi/1.0".into(),
            types: vec![typedef("account_name", "name"), typedef("action_name", "name")],
            structs: vec![
                struct_def(
                    "permission_level",
                    "",
                    &[("actor", "account_name"), ("permission", "name")],
                ),
                struct_def(
                    "action",
                    "",
                    &[
                        ("account", "account_name"),
                        ("name", "action_name"),
                        ("authorization", "permission_level[]"),
                        ("data", "bytes"),
                    ],
                ),
                struct_def("extension", "", &[("type", "uint16"), ("data", "bytes")]),
                struct_def(
                    "transaction_header",
                    "",
                    &[
                        ("expiration", "time_point_sec"),
                        ("ref_block_num", "uint16"),
                        ("ref_block_prefix", "uint32"),
                        ("max_net_usage_words", "varuint32"),
                        ("max_cpu_usage_ms", "uint8"),
                        ("delay_sec", "varuint32"),
                    ],
                ),
                struct_def(
                    "transaction",
                    "transaction_header",
                    &[
                        ("context_free_actions", "action[]"),
                        ("actions", "action[]"),
                        ("transaction_extensions", "extension[]"),
                    ],
                ),
            ],
            ..AbiDef::default()
        }
    }
}

fn typedef(new_type_name: &str, type_name: &str) -> TypeDef {
    TypeDef {
        new_type_name: new_type_name.into(),
        type_name: type_name.into(),
    }
}

fn struct_def(name: &str, base: &str, fields: &[(&str, &str)]) -> StructDef {
    StructDef {
        name: name.into(),
        base: base.into(),
        fields: fields
            .iter()
            .map(|(name, type_name)| FieldDef {
                name: (*name).into(),
                type_name: (*type_name).into(),
            })
            .collect(),
    }
}

fn list<T>(items: &[T], render: impl Fn(&T) -> JValue) -> JValue {
    JValue::Array(items.iter().map(render).collect())
}

fn strings(items: &[String]) -> JValue {
    JValue::Array(items.iter().map(|s| JValue::from(s.as_str())).collect())
}

fn abi_registry() -> AbiResult<&'static TypeRegistry> {
    static REGISTRY: OnceLock<AbiResult<TypeRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| TypeRegistry::register(&AbiDef::abi_schema(), AbiOptions::default()))
        .as_ref()
        .map_err(Clone::clone)
}

fn abi_def_type() -> AbiResult<TypeHandle<'static>> {
    abi_registry()?
        .handle(ABI_DEF_TYPE)
        .ok_or_else(|| AbiError::UnknownType(ABI_DEF_TYPE.into()))
}

fn bad(message: impl Into<String>) -> AbiError {
    AbiError::BadAbi(message.into())
}

fn expect_object<'v>(value: &'v JValue, ctx: &str) -> AbiResult<&'v [(String, JValue)]> {
    value
        .as_object()
        .ok_or_else(|| bad(format!("expected object for {ctx}, found {}", value.kind())))
}

fn expect_string(value: &JValue, ctx: &str) -> AbiResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| bad(format!("expected string for {ctx}, found {}", value.kind())))
}

fn expect_name(value: &JValue, ctx: &str) -> AbiResult<Name> {
    expect_string(value, ctx)?
        .parse()
        .map_err(|err| bad(format!("{ctx}: {err}")))
}

fn expect_list<T>(
    value: &JValue,
    ctx: &str,
    parse: impl Fn(&JValue) -> AbiResult<T>,
) -> AbiResult<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| bad(format!("expected array for {ctx}, found {}", value.kind())))?
        .iter()
        .map(parse)
        .collect()
}

fn expect_strings(value: &JValue, ctx: &str) -> AbiResult<Vec<String>> {
    expect_list(value, ctx, |item| expect_string(item, ctx))
}

fn expect_uint(value: &JValue, ctx: &str) -> AbiResult<u64> {
    match value {
        JValue::UInt(v) => Ok(*v),
        JValue::String(text) => text
            .parse()
            .map_err(|_| bad(format!("{ctx}: {text:?} is not an unsigned integer"))),
        other => Err(bad(format!("expected integer for {ctx}, found {}", other.kind()))),
    }
}

fn required<T>(slot: Option<T>, key: &str, ctx: &str) -> AbiResult<T> {
    slot.ok_or_else(|| bad(format!("{ctx} is missing {key:?}")))
}

fn unknown_key(key: &str, ctx: &str) -> AbiError {
    bad(format!("unknown key {key:?} in {ctx}"))
}

fn parse_abi(value: &JValue) -> AbiResult<AbiDef> {
    let entries = expect_object(value, "abi")?;
    let mut abi = AbiDef::default();
    for (key, val) in entries {
        match key.as_str() {
            "version" => abi.version = expect_string(val, "version")?,
            "types" => abi.types = expect_list(val, "types", parse_typedef)?,
            "structs" => abi.structs = expect_list(val, "structs", parse_struct)?,
            "actions" => abi.actions = expect_list(val, "actions", parse_action)?,
            "tables" => abi.tables = expect_list(val, "tables", parse_table)?,
            "ricardian_clauses" => {
                abi.ricardian_clauses = expect_list(val, "ricardian_clauses", parse_clause)?
            }
            "error_messages" => {
                abi.error_messages = expect_list(val, "error_messages", parse_error_message)?
            }
            "abi_extensions" => {
                abi.abi_extensions = expect_list(val, "abi_extensions", parse_extension)?
            }
            "variants" => abi.variants = expect_list(val, "variants", parse_variant)?,
            "action_results" => {
                abi.action_results = expect_list(val, "action_results", parse_action_result)?
            }
            _ => abi.extra.push((key.clone(), val.clone())),
        }
    }
    Ok(abi)
}

fn parse_typedef(value: &JValue) -> AbiResult<TypeDef> {
    const CTX: &str = "type definition";
    let mut new_type_name = None;
    let mut type_name = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "new_type_name" => new_type_name = Some(expect_string(val, "new_type_name")?),
            "type" => type_name = Some(expect_string(val, "type")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(TypeDef {
        new_type_name: required(new_type_name, "new_type_name", CTX)?,
        type_name: required(type_name, "type", CTX)?,
    })
}

fn parse_field(value: &JValue) -> AbiResult<FieldDef> {
    const CTX: &str = "field definition";
    let mut name = None;
    let mut type_name = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_string(val, "field name")?),
            "type" => type_name = Some(expect_string(val, "field type")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(FieldDef {
        name: required(name, "name", CTX)?,
        type_name: required(type_name, "type", CTX)?,
    })
}

fn parse_struct(value: &JValue) -> AbiResult<StructDef> {
    const CTX: &str = "struct definition";
    let mut name = None;
    let mut base = None;
    let mut fields = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_string(val, "struct name")?),
            "base" => base = Some(expect_string(val, "struct base")?),
            "fields" => fields = Some(expect_list(val, "struct fields", parse_field)?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(StructDef {
        name: required(name, "name", CTX)?,
        base: base.unwrap_or_default(),
        fields: required(fields, "fields", CTX)?,
    })
}

fn parse_action(value: &JValue) -> AbiResult<ActionDef> {
    const CTX: &str = "action definition";
    let mut name = None;
    let mut type_name = None;
    let mut ricardian_contract = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_name(val, "action name")?),
            "type" => type_name = Some(expect_string(val, "action type")?),
            "ricardian_contract" => {
                ricardian_contract = Some(expect_string(val, "ricardian_contract")?)
            }
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(ActionDef {
        name: required(name, "name", CTX)?,
        type_name: required(type_name, "type", CTX)?,
        ricardian_contract: ricardian_contract.unwrap_or_default(),
    })
}

fn parse_table(value: &JValue) -> AbiResult<TableDef> {
    const CTX: &str = "table definition";
    let mut table = TableDef::default();
    let mut name = None;
    let mut type_name = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_name(val, "table name")?),
            "type" => type_name = Some(expect_string(val, "table type")?),
            "index_type" => table.index_type = expect_string(val, "index_type")?,
            "key_names" => table.key_names = expect_strings(val, "key_names")?,
            "key_types" => table.key_types = expect_strings(val, "key_types")?,
            other => return Err(unknown_key(other, CTX)),
        }
    }
    table.name = required(name, "name", CTX)?;
    table.type_name = required(type_name, "type", CTX)?;
    Ok(table)
}

fn parse_clause(value: &JValue) -> AbiResult<ClausePair> {
    const CTX: &str = "ricardian clause";
    let mut id = None;
    let mut body = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "id" => id = Some(expect_string(val, "clause id")?),
            "body" => body = Some(expect_string(val, "clause body")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(ClausePair {
        id: required(id, "id", CTX)?,
        body: required(body, "body", CTX)?,
    })
}

fn parse_error_message(value: &JValue) -> AbiResult<ErrorMessage> {
    const CTX: &str = "error message";
    let mut error_code = None;
    let mut error_msg = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "error_code" => error_code = Some(expect_uint(val, "error_code")?),
            "error_msg" => error_msg = Some(expect_string(val, "error_msg")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(ErrorMessage {
        error_code: required(error_code, "error_code", CTX)?,
        error_msg: required(error_msg, "error_msg", CTX)?,
    })
}

fn parse_extension(value: &JValue) -> AbiResult<AbiExtension> {
    const CTX: &str = "abi extension";
    let mut tag = None;
    let mut data = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "tag" => {
                let raw = expect_uint(val, "extension tag")?;
                tag = Some(
                    u16::try_from(raw).map_err(|_| bad(format!("extension tag {raw} exceeds u16")))?,
                );
            }
            "value" => {
                let text = expect_string(val, "extension value")?;
                data = Some(hex::decode(&text).map_err(|err| bad(format!("extension value: {err}")))?);
            }
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(AbiExtension {
        tag: required(tag, "tag", CTX)?,
        value: required(data, "value", CTX)?,
    })
}

fn parse_variant(value: &JValue) -> AbiResult<VariantDef> {
    const CTX: &str = "variant definition";
    let mut name = None;
    let mut types = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_string(val, "variant name")?),
            "types" => types = Some(expect_strings(val, "variant types")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(VariantDef {
        name: required(name, "name", CTX)?,
        types: required(types, "types", CTX)?,
    })
}

fn parse_action_result(value: &JValue) -> AbiResult<ActionResultDef> {
    const CTX: &str = "action result";
    let mut name = None;
    let mut result_type = None;
    for (key, val) in expect_object(value, CTX)? {
        match key.as_str() {
            "name" => name = Some(expect_name(val, "action result name")?),
            "result_type" => result_type = Some(expect_string(val, "result_type")?),
            other => return Err(unknown_key(other, CTX)),
        }
    }
    Ok(ActionResultDef {
        name: required(name, "name", CTX)?,
        result_type: required(result_type, "result_type", CTX)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_is_permissive() {
        let abi = AbiDef::from_json(
            r#"{"version":"eosio::abi/1.2","structs":[],"kv_tables":{},"future":[1]}"#,
        )
        .expect("abi");
        assert!(abi.variants.is_empty());
        assert!(abi.types.is_empty());
        assert_eq!(abi.extra.len(), 2);
        assert_eq!(abi.extra[0].0, "kv_tables");
    }

    #[test]
    fn definitions_are_strict() {
        let unknown = AbiDef::from_json(
            r#"{"version":"eosio::abi/1.0","structs":[{"name":"s","base":"","fields":[],"extra":1}]}"#,
        );
        assert!(matches!(unknown, Err(AbiError::BadAbi(_))));

        let missing = AbiDef::from_json(
            r#"{"version":"eosio::abi/1.0","structs":[{"name":"s","fields":[{"name":"a"}]}]}"#,
        );
        assert!(matches!(missing, Err(AbiError::BadAbi(_))));

        let wrong_type = AbiDef::from_json(r#"{"version":"eosio::abi/1.0","types":{}}"#);
        assert!(matches!(wrong_type, Err(AbiError::BadAbi(_))));
    }

    #[test]
    fn bootstrap_schemas_register() {
        let registry = TypeRegistry::from_abi(&AbiDef::abi_schema()).expect("abi schema");
        assert!(registry.lookup(ABI_DEF_TYPE).is_some());
        let registry = TypeRegistry::from_abi(&AbiDef::transaction_schema()).expect("tx schema");
        assert!(registry.lookup("transaction").is_some());
    }

    #[test]
    fn binary_roundtrip_keeps_action_results() {
        let abi = AbiDef {
            version: "eosio::abi/1.2".into(),
            structs: vec![struct_def("ping", "", &[("n", "uint32")])],
            actions: vec![ActionDef {
                name: "ping".parse().expect("name"),
                type_name: "ping".into(),
                ricardian_contract: String::new(),
            }],
            action_results: vec![ActionResultDef {
                name: "ping".parse().expect("name"),
                result_type: "uint32".into(),
            }],
            ..AbiDef::default()
        };
        let bytes = abi.to_bin().expect("to_bin");
        assert_eq!(AbiDef::from_bin(&bytes).expect("from_bin"), abi);
    }

    #[test]
    fn binary_version_is_checked_first() {
        let mut bytes = vec![14u8];
        bytes.extend_from_slice(b"eosio::abi/9.0");
        assert_eq!(
            AbiDef::from_bin(&bytes),
            Err(AbiError::UnsupportedVersion("eosio::abi/9.0".into()))
        );
    }
}
