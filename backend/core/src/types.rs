//! Extension data model: declared definitions, loaded modules and resolved extensions.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A registered service value. Extensions, collections and constructed
/// implementations are all stored behind this type.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Constructor declared by a plug-in; invoked once at bootstrap with the
/// extension's resolved dependencies.
pub type ConstructorFn = Arc<dyn Fn(&Construction<'_>) -> anyhow::Result<Service> + Send + Sync>;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Raw priority as declared on an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrioritySpec {
    Number(f64),
    Symbol(String),
    /// Any other JSON shape; always treated as unrecognised.
    Invalid(Value),
}

impl PrioritySpec {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Symbol(s) => Value::String(s.clone()),
            Self::Invalid(v) => v.clone(),
        }
    }
}

impl fmt::Display for PrioritySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Invalid(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for PrioritySpec {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PrioritySpec {
    fn from(s: &str) -> Self {
        Self::Symbol(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Extension definition
// ---------------------------------------------------------------------------

/// A declarative extension contributed by a bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDefinition {
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Module specifier handed to the implementation loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    /// Names of services this extension needs at construction time, in order.
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PrioritySpec>,
    /// Path of the bundle that declared this extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    /// Position within its declared category list; names keyless extensions in logs.
    #[serde(skip)]
    pub index: Option<usize>,
    /// Every other declared field, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtensionDefinition {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_implementation(mut self, specifier: impl Into<String>) -> Self {
        self.implementation = Some(specifier.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<PrioritySpec>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = depends.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Human-readable identity used in log messages.
    pub fn log_name(&self) -> String {
        let mut name = match (&self.key, self.index) {
            (Some(key), _) => format!("{} extension '{}'", self.category, key),
            (None, Some(index)) => format!("{} extension #{}", self.category, index),
            (None, None) => format!("{} extension (no key)", self.category),
        };
        if let Some(bundle) = &self.bundle {
            name.push_str(" from ");
            name.push_str(bundle);
        }
        name
    }

    /// All declared fields as a JSON object.
    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = self.extra.clone();
        fields.insert("category".into(), Value::String(self.category.clone()));
        if let Some(key) = &self.key {
            fields.insert("key".into(), Value::String(key.clone()));
        }
        if let Some(implementation) = &self.implementation {
            fields.insert("implementation".into(), Value::String(implementation.clone()));
        }
        fields.insert(
            "depends".into(),
            Value::Array(self.depends.iter().cloned().map(Value::String).collect()),
        );
        if let Some(priority) = &self.priority {
            fields.insert("priority".into(), priority.to_value());
        }
        if let Some(bundle) = &self.bundle {
            fields.insert("bundle".into(), Value::String(bundle.clone()));
        }
        fields
    }

    /// Build a definition from an arbitrary JSON value declared under `category`.
    ///
    /// Never fails: wrongly-typed fields are dropped with a warning and a
    /// non-object value yields an empty definition in the category.
    pub fn from_value(category: &str, index: usize, value: Value) -> Self {
        let Value::Object(mut map) = value else {
            warn!(category, index, "Extension is not an object; using an empty definition");
            return Self::new(category).with_index(index);
        };

        if let Some(declared) = map.remove("category") {
            if declared.as_str() != Some(category) {
                warn!(category, index, declared = %declared, "Ignoring declared category");
            }
        }

        let key = take_string(&mut map, "key", category, index);
        let implementation = take_string(&mut map, "implementation", category, index);
        let bundle = take_string(&mut map, "bundle", category, index);

        let depends = match map.remove("depends") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name),
                    other => {
                        warn!(category, index, dependency = %other, "Dropping non-string dependency");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!(category, index, depends = %other, "'depends' is not a list; treating as empty");
                Vec::new()
            }
        };

        let priority = match map.remove("priority") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(match n.as_f64() {
                Some(n) => PrioritySpec::Number(n),
                None => PrioritySpec::Invalid(Value::Number(n)),
            }),
            Some(Value::String(s)) => Some(PrioritySpec::Symbol(s)),
            Some(other) => Some(PrioritySpec::Invalid(other)),
        };

        Self {
            category: category.to_string(),
            key,
            implementation,
            depends,
            priority,
            bundle,
            index: Some(index),
            extra: map,
        }
    }
}

fn take_string(map: &mut Map<String, Value>, field: &str, category: &str, index: usize) -> Option<String> {
    match map.remove(field)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            warn!(category, index, field, value = %other, "Dropping non-string extension field");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Arguments handed to an extension constructor.
pub struct Construction<'a> {
    /// Service name the extension is registered under.
    pub name: &'a str,
    /// Merged extension metadata.
    pub fields: &'a Map<String, Value>,
    /// Resolved `depends` entries, in declaration order.
    pub dependencies: &'a [Service],
}

/// How a plug-in provides its behaviour.
#[derive(Clone)]
pub enum Implementation {
    /// Built once at bootstrap from the extension's dependencies.
    Constructor(ConstructorFn),
    /// A ready-made value shared as-is.
    Instance(Service),
}

impl Implementation {
    pub fn constructor<F>(construct: F) -> Self
    where
        F: Fn(&Construction<'_>) -> anyhow::Result<Service> + Send + Sync + 'static,
    {
        Self::Constructor(Arc::new(construct))
    }

    pub fn instance<T: Any + Send + Sync>(value: T) -> Self {
        Self::Instance(Arc::new(value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constructor(_) => "constructor",
            Self::Instance(_) => "instance",
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Implementation::{}", self.kind())
    }
}

/// What an implementation loader yields for a module specifier.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Metadata the module itself exports.
    pub fields: Map<String, Value>,
    pub implementation: Implementation,
}

impl LoadedModule {
    pub fn new(implementation: Implementation) -> Self {
        Self {
            fields: Map::new(),
            implementation,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// Resolved extension
// ---------------------------------------------------------------------------

/// An extension after its implementation, if any, has been loaded.
#[derive(Debug, Clone)]
pub struct ResolvedExtension {
    pub definition: ExtensionDefinition,
    /// Module fields overlaid with every definition field.
    pub fields: Map<String, Value>,
    /// `None` when the extension is metadata only.
    pub implementation: Option<Implementation>,
}

impl ResolvedExtension {
    pub fn metadata_only(definition: ExtensionDefinition) -> Self {
        Self {
            fields: definition.fields(),
            definition,
            implementation: None,
        }
    }

    /// Merge a loaded module with its definition. Definition fields win on
    /// conflicting names; the module itself is left untouched.
    pub fn with_module(definition: ExtensionDefinition, module: &LoadedModule) -> Self {
        let mut fields = module.fields.clone();
        fields.extend(definition.fields());
        Self {
            fields,
            implementation: Some(module.implementation.clone()),
            definition,
        }
    }

    pub fn category(&self) -> &str {
        &self.definition.category
    }

    pub fn key(&self) -> Option<&str> {
        self.definition.key.as_deref()
    }

    pub fn depends(&self) -> &[String] {
        &self.definition.depends
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_loaded(&self) -> bool {
        self.implementation.is_some()
    }

    pub fn log_name(&self) -> String {
        self.definition.log_name()
    }
}
