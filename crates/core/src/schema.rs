// Operation descriptors and parameter schemas

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Argument mapping passed to an operation handler (name -> JSON value).
pub type ArgumentMap = serde_json::Map<String, Value>;

/// Declared type of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Check whether a JSON value satisfies this declared type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Name of the JSON type actually supplied, for validation messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
        }
    }
}

/// Declared name, description, and parameters of one invocable operation.
///
/// Registered once at startup and immutable thereafter; the parameter list
/// keeps its declaration order for capability announcements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Validate an argument map against this schema.
    ///
    /// Reports the first failure in declaration order: a missing required
    /// parameter, then a type mismatch, then any argument that is not
    /// declared at all.
    pub fn validate(&self, arguments: &ArgumentMap) -> Result<(), ValidationError> {
        for param in &self.parameters {
            match arguments.get(&param.name) {
                Some(value) => {
                    if !param.param_type.matches(value) {
                        return Err(ValidationError::TypeMismatch {
                            name: param.name.clone(),
                            expected: param.param_type.name(),
                            actual: json_type_name(value),
                        });
                    }
                }
                None if param.required => {
                    return Err(ValidationError::MissingParameter {
                        name: param.name.clone(),
                    });
                }
                None => {}
            }
        }

        for name in arguments.keys() {
            if !self.parameters.iter().any(|p| &p.name == name) {
                return Err(ValidationError::UnexpectedParameter { name: name.clone() });
            }
        }

        Ok(())
    }
}

/// Argument validation failure, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("invalid parameter {name}: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unexpected parameter: {name}")]
    UnexpectedParameter { name: String },
}
