//! Read-only accessor over a FHIR `Parameters` resource.
//!
//! Terminology operations answer with a `Parameters` resource: a flat list of
//! `{ "name": ..., "value<Kind>": ... }` entries where names may repeat and a
//! `part` entry nests another list of the same shape. [`Parameters`] keeps the
//! raw entries and converts values only when they are looked up, so an entry
//! that is never asked for is never inspected.
//!
//! See: <https://hl7.org/fhir/R4/parameters.html>

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// A kind of parameter value: the JSON tag it is stored under and how to
/// convert it.
pub trait ParameterKind: Sized {
    /// Key of the value slot in a parameter entry (e.g. `valueBoolean`).
    const TAG: &'static str;

    fn convert(name: &str, value: &Value) -> Result<Self>;
}

impl ParameterKind for bool {
    const TAG: &'static str = "valueBoolean";

    fn convert(name: &str, value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::invalid_parameter_value(name, Self::TAG, "expected a boolean"))
    }
}

impl ParameterKind for String {
    const TAG: &'static str = "valueString";

    fn convert(name: &str, value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid_parameter_value(name, Self::TAG, "expected a string"))
    }
}

/// A FHIR `code` value (e.g. the `equivalence` of a translate match).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code(pub String);

impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ParameterKind for Code {
    const TAG: &'static str = "valueCode";

    fn convert(name: &str, value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(|s| Code(s.to_owned()))
            .ok_or_else(|| Error::invalid_parameter_value(name, Self::TAG, "expected a string"))
    }
}

/// A code from a code system, optionally with its display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Coding {
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

impl Coding {
    /// Exact, case-sensitive comparison of system and code.
    pub fn is(&self, system: &str, code: &str) -> bool {
        self.system.as_deref() == Some(system) && self.code.as_deref() == Some(code)
    }
}

impl ParameterKind for Coding {
    const TAG: &'static str = "valueCoding";

    fn convert(name: &str, value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::invalid_parameter_value(
                name,
                Self::TAG,
                "expected an object",
            ));
        }
        Coding::deserialize(value)
            .map_err(|e| Error::invalid_parameter_value(name, Self::TAG, e.to_string()))
    }
}

/// A multi-part parameter is itself a `Parameters` over the nested list.
impl ParameterKind for Parameters {
    const TAG: &'static str = "part";

    fn convert(name: &str, value: &Value) -> Result<Self> {
        value
            .as_array()
            .map(|entries| Parameters::new(entries.clone()))
            .ok_or_else(|| Error::invalid_parameter_value(name, Self::TAG, "expected an array"))
    }
}

/// Name-keyed, typed view over the entries of a `Parameters` resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<Value>,
}

impl Parameters {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    /// Wrap a `Parameters` resource as returned by a FHIR operation.
    ///
    /// A resource without a `parameter` array yields an empty accessor, so any
    /// expected lookup on it fails with [`Error::ParameterNotFound`].
    pub fn from_resource(resource: Value) -> Result<Self> {
        let mut resource = match resource {
            Value::Object(map) => map,
            other => return Err(Error::UnexpectedResource(json_type_name(&other).into())),
        };
        if let Some(rt) = resource.get("resourceType").and_then(Value::as_str)
            && rt != "Parameters"
        {
            return Err(Error::UnexpectedResource(rt.to_string()));
        }
        match resource.remove("parameter") {
            Some(Value::Array(entries)) => Ok(Self::new(entries)),
            Some(other) => Err(Error::invalid_parameter_value(
                "parameter",
                "parameter",
                format!("expected an array, got {}", json_type_name(&other)),
            )),
            None => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All values of kind `T` stored under `name`, in source order.
    ///
    /// Entries with the same name but a different value kind are skipped.
    pub fn get_values<'a, T: ParameterKind + 'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = Result<T>> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.get("name").and_then(Value::as_str) == Some(name))
            .filter_map(|entry| entry.get(T::TAG))
            .map(move |value| T::convert(name, value))
    }

    /// The first value of kind `T` stored under `name`.
    pub fn get_value<T: ParameterKind>(&self, name: &str) -> Result<T> {
        self.get_values::<T>(name)
            .next()
            .unwrap_or_else(|| Err(Error::parameter_not_found(name, T::TAG)))
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool> {
        self.get_value(name)
    }

    pub fn get_booleans<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Result<bool>> + 'a {
        self.get_values(name)
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        self.get_value(name)
    }

    pub fn get_strings<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Result<String>> + 'a {
        self.get_values(name)
    }

    pub fn get_code(&self, name: &str) -> Result<Code> {
        self.get_value(name)
    }

    pub fn get_codes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Result<Code>> + 'a {
        self.get_values(name)
    }

    pub fn get_coding(&self, name: &str) -> Result<Coding> {
        self.get_value(name)
    }

    pub fn get_codings<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Result<Coding>> + 'a {
        self.get_values(name)
    }

    pub fn get_part(&self, name: &str) -> Result<Parameters> {
        self.get_value(name)
    }

    pub fn get_parts<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = Result<Parameters>> + 'a {
        self.get_values(name)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
