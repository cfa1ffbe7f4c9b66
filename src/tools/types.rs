//! Tool metadata: parameter declarations advertised to the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Primitive or array type of a declared parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// A single declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    /// Element type, for array parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParameterType>,
}

/// Descriptive metadata for a tool.
///
/// This is what the model sees. Nothing here is enforced against the
/// arguments a handler actually receives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolDefinition {
    /// Start a definition with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter of any type.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        kind: ParameterType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.parameters.insert(
            name.clone(),
            Parameter {
                kind,
                description: description.into(),
                items: None,
            },
        );
        if required && !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Add a string property.
    pub fn string(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameter(name, ParameterType::String, description, required)
    }

    /// Add a number property.
    pub fn number(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameter(name, ParameterType::Number, description, required)
    }

    /// Add an integer property.
    pub fn integer(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameter(name, ParameterType::Integer, description, required)
    }

    /// Add a boolean property.
    pub fn boolean(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameter(name, ParameterType::Boolean, description, required)
    }

    /// Add an array property whose elements have type `items`.
    pub fn array(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        items: ParameterType,
        required: bool,
    ) -> Self {
        let name = name.into();
        self = self.parameter(name.clone(), ParameterType::Array, description, required);
        if let Some(param) = self.parameters.get_mut(&name) {
            param.items = Some(items);
        }
        self
    }

    /// JSON Schema object describing the parameters.
    pub fn schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|(name, param)| {
                let mut prop = serde_json::json!({
                    "type": param.kind.to_string(),
                    "description": param.description,
                });
                if let Some(items) = param.items {
                    prop["items"] = serde_json::json!({ "type": items.to_string() });
                }
                (name.clone(), prop)
            })
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}
