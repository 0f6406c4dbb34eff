//! Resolved type graph built from an [`AbiDef`].
//!
//! Nodes live in an arena owned by the registry and refer to each other by
//! [`TypeId`]. Aliases are resolved when the registry is built, so an alias
//! name maps straight to its target's node.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::abi_def::{AbiDef, StructDef};
use crate::binary::{self, FieldOrder};
use crate::builtin::Builtin;
use crate::error::{AbiError, AbiResult, CodecError, CodecResult};
use crate::json;
use crate::options::AbiOptions;
use crate::value::JValue;

/// Index of a node in its registry's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Builtin(Builtin),
    /// `fields` is the effective list: base fields first, then own fields.
    Struct {
        base: Option<TypeId>,
        fields: Vec<Field>,
    },
    /// Alternatives keyed by the type name they were declared with.
    Variant(Vec<Field>),
    Optional(TypeId),
    Array(TypeId),
    Extension(TypeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbiType {
    pub name: String,
    pub kind: TypeKind,
}

impl AbiType {
    pub fn is_extension(&self) -> bool {
        matches!(self.kind, TypeKind::Extension(_))
    }
}

#[derive(Clone, Debug)]
pub struct TypeRegistry {
    types: Vec<AbiType>,
    names: HashMap<String, TypeId>,
    aliases: BTreeMap<String, String>,
    options: AbiOptions,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the builtin types.
    pub fn new() -> Self {
        Self::with_options(AbiOptions::default())
    }

    pub fn with_options(options: AbiOptions) -> Self {
        let mut registry = Self {
            types: Vec::new(),
            names: HashMap::new(),
            aliases: BTreeMap::new(),
            options,
        };
        for builtin in Builtin::ALL {
            registry.push(builtin.name(), TypeKind::Builtin(*builtin));
        }
        let fields = [("quantity", Builtin::Asset), ("contract", Builtin::Name)]
            .into_iter()
            .filter_map(|(name, builtin)| {
                registry.lookup(builtin.name()).map(|ty| Field {
                    name: name.to_string(),
                    ty,
                })
            })
            .collect();
        registry.push("extended_asset", TypeKind::Struct { base: None, fields });
        registry
    }

    pub fn from_abi(abi: &AbiDef) -> AbiResult<Self> {
        Self::register(abi, AbiOptions::default())
    }

    /// Validate `abi` and resolve every type, action, and table it names.
    pub fn register(abi: &AbiDef, options: AbiOptions) -> AbiResult<Self> {
        options.version_policy.check(&abi.version)?;
        let mut registration = Registration::new(Self::with_options(options));
        registration.declare_all(abi)?;
        registration.resolve_all(abi)?;
        Ok(registration.registry)
    }

    pub fn options(&self) -> &AbiOptions {
        &self.options
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&AbiType> {
        self.types.get(id.0)
    }

    pub fn handle(&self, name: &str) -> Option<TypeHandle<'_>> {
        self.lookup(name).map(|id| TypeHandle { registry: self, id })
    }

    pub fn handle_of(&self, id: TypeId) -> Option<TypeHandle<'_>> {
        self.get(id).map(|_| TypeHandle { registry: self, id })
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Declared alias names and the type each one was written against.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn node(&self, id: TypeId) -> CodecResult<&AbiType> {
        self.get(id)
            .ok_or_else(|| CodecError::invalid("type", format!("id {} is not in this registry", id.0)))
    }

    fn push(&mut self, name: &str, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(AbiType {
            name: name.to_string(),
            kind,
        });
        self.names.insert(name.to_string(), id);
        id
    }
}

/// Working state while an ABI is turned into a registry.
struct Registration<'a> {
    registry: TypeRegistry,
    alias_targets: HashMap<&'a str, &'a str>,
    struct_defs: HashMap<TypeId, &'a StructDef>,
    filled: HashSet<TypeId>,
}

impl<'a> Registration<'a> {
    fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            alias_targets: HashMap::new(),
            struct_defs: HashMap::new(),
            filled: HashSet::new(),
        }
    }

    fn max_depth(&self) -> usize {
        self.registry.options.max_type_depth
    }

    fn check_new_name(&self, name: &str, ctx: &str) -> AbiResult<()> {
        if name.is_empty() {
            return Err(AbiError::MissingName(ctx.to_string()));
        }
        if self.registry.names.contains_key(name) || self.alias_targets.contains_key(name) {
            return Err(AbiError::RedefinedType(name.to_string()));
        }
        Ok(())
    }

    /// Reserve every declared name so definitions can refer to each other in any order.
    fn declare_all(&mut self, abi: &'a AbiDef) -> AbiResult<()> {
        for typedef in &abi.types {
            self.check_new_name(&typedef.new_type_name, "type definition")?;
            self.alias_targets
                .insert(&typedef.new_type_name, &typedef.type_name);
        }
        for def in &abi.structs {
            self.check_new_name(&def.name, "struct definition")?;
            let id = self.registry.push(
                &def.name,
                TypeKind::Struct {
                    base: None,
                    fields: Vec::new(),
                },
            );
            self.struct_defs.insert(id, def);
        }
        for def in &abi.variants {
            self.check_new_name(&def.name, "variant definition")?;
            self.registry.push(&def.name, TypeKind::Variant(Vec::new()));
        }
        Ok(())
    }

    fn resolve_all(&mut self, abi: &'a AbiDef) -> AbiResult<()> {
        for typedef in &abi.types {
            self.resolve(&typedef.new_type_name, 0)?;
            self.registry
                .aliases
                .insert(typedef.new_type_name.clone(), typedef.type_name.clone());
        }
        for def in &abi.structs {
            let id = self.declared(&def.name)?;
            self.fill_struct(id, 0)?;
        }
        for def in &abi.variants {
            let id = self.declared(&def.name)?;
            let mut alternatives = Vec::with_capacity(def.types.len());
            for type_name in &def.types {
                alternatives.push(Field {
                    name: type_name.clone(),
                    ty: self.resolve(type_name, 1)?,
                });
            }
            self.registry.types[id.0].kind = TypeKind::Variant(alternatives);
        }
        for action in &abi.actions {
            self.resolve_binding(&action.type_name, "action", &action.name.to_string())?;
        }
        for table in &abi.tables {
            self.resolve_binding(&table.type_name, "table", &table.name.to_string())?;
        }
        for result in &abi.action_results {
            self.resolve_binding(&result.result_type, "action result", &result.name.to_string())?;
        }
        Ok(())
    }

    fn declared(&self, name: &str) -> AbiResult<TypeId> {
        self.registry
            .lookup(name)
            .ok_or_else(|| AbiError::UnknownType(name.to_string()))
    }

    fn resolve_binding(&mut self, type_name: &str, what: &str, name: &str) -> AbiResult<TypeId> {
        if type_name.is_empty() {
            return Err(AbiError::MissingName(format!("type of {what} {name}")));
        }
        self.resolve(type_name, 0)
    }

    fn kind(&self, id: TypeId) -> &TypeKind {
        &self.registry.types[id.0].kind
    }

    fn resolve(&mut self, name: &str, depth: usize) -> AbiResult<TypeId> {
        if depth > self.max_depth() {
            return Err(AbiError::RecursionLimitReached(name.to_string()));
        }
        if let Some(id) = self.registry.lookup(name) {
            return Ok(id);
        }
        if let Some(target) = self.alias_targets.get(name).copied() {
            let id = self.resolve(target, depth + 1)?;
            if matches!(self.kind(id), TypeKind::Extension(_)) {
                return Err(AbiError::ExtensionTypedef(name.to_string()));
            }
            self.registry.names.insert(name.to_string(), id);
            return Ok(id);
        }
        if let Some(inner) = name.strip_suffix("[]") {
            let inner_id = self.resolve(inner, depth + 1)?;
            if matches!(
                self.kind(inner_id),
                TypeKind::Array(_) | TypeKind::Optional(_) | TypeKind::Extension(_)
            ) {
                return Err(AbiError::InvalidNesting(name.to_string()));
            }
            return Ok(self.registry.push(name, TypeKind::Array(inner_id)));
        }
        if let Some(inner) = name.strip_suffix('?') {
            let inner_id = self.resolve(inner, depth + 1)?;
            if matches!(
                self.kind(inner_id),
                TypeKind::Optional(_) | TypeKind::Extension(_)
            ) {
                return Err(AbiError::InvalidNesting(name.to_string()));
            }
            return Ok(self.registry.push(name, TypeKind::Optional(inner_id)));
        }
        if let Some(inner) = name.strip_suffix('$') {
            let inner_id = self.resolve(inner, depth + 1)?;
            if matches!(self.kind(inner_id), TypeKind::Extension(_)) {
                return Err(AbiError::InvalidNesting(name.to_string()));
            }
            return Ok(self.registry.push(name, TypeKind::Extension(inner_id)));
        }
        Err(AbiError::UnknownType(name.to_string()))
    }

    fn fill_struct(&mut self, id: TypeId, depth: usize) -> AbiResult<()> {
        if self.filled.contains(&id) {
            return Ok(());
        }
        let Some(def) = self.struct_defs.get(&id).copied() else {
            // builtin structs arrive complete
            return Ok(());
        };
        if depth > self.max_depth() {
            return Err(AbiError::RecursionLimitReached(def.name.clone()));
        }
        let mut fields = Vec::new();
        let base = if def.base.is_empty() {
            None
        } else {
            let base_id = self.resolve(&def.base, depth + 1)?;
            if !matches!(self.kind(base_id), TypeKind::Struct { .. }) {
                return Err(AbiError::BaseNotAStruct {
                    name: def.name.clone(),
                    base: def.base.clone(),
                });
            }
            self.fill_struct(base_id, depth + 1)?;
            if let TypeKind::Struct {
                fields: base_fields,
                ..
            } = self.kind(base_id)
            {
                fields.extend(base_fields.iter().cloned());
            }
            Some(base_id)
        };
        for field in &def.fields {
            if field.name.is_empty() {
                return Err(AbiError::MissingName(format!("field of struct {}", def.name)));
            }
            fields.push(Field {
                name: field.name.clone(),
                ty: self.resolve(&field.type_name, depth + 1)?,
            });
        }
        self.registry.types[id.0].kind = TypeKind::Struct { base, fields };
        self.filled.insert(id);
        Ok(())
    }
}

/// A type paired with the registry that owns it.
#[derive(Clone, Copy)]
pub struct TypeHandle<'a> {
    registry: &'a TypeRegistry,
    id: TypeId,
}

impl<'a> TypeHandle<'a> {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    fn node(&self) -> &'a AbiType {
        // ids in a handle always come from its own registry
        &self.registry.types[self.id.0]
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn kind(&self) -> &'a TypeKind {
        &self.node().kind
    }

    pub fn decode(&self, bytes: &[u8]) -> CodecResult<JValue> {
        binary::decode(self.registry, self.id, bytes)
    }

    pub fn encode(&self, value: &JValue, order: FieldOrder) -> CodecResult<Vec<u8>> {
        binary::encode(self.registry, self.id, value, order)
    }

    pub fn bin_to_json(&self, bytes: &[u8]) -> CodecResult<String> {
        json::bin_to_json(self.registry, self.id, bytes)
    }

    pub fn json_to_bin(&self, text: &str) -> CodecResult<Vec<u8>> {
        json::json_to_bin(self.registry, self.id, text)
    }

    pub fn json_to_bin_reorderable(&self, text: &str) -> CodecResult<Vec<u8>> {
        json::json_to_bin_reorderable(self.registry, self.id, text)
    }
}

impl fmt::Debug for TypeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandle")
            .field("name", &self.name())
            .field("id", &self.id)
            .finish()
    }
}
