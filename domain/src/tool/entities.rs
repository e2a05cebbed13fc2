//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Argument name used to scope retrieval and memory calls to a tenant
pub const TENANT_ARG: &str = "tenant_id";

/// Retrieval argument for the number of documents to return
pub const TOP_K_ARG: &str = "top_k";

/// Retrieval argument for the minimum relevance score
pub const MIN_SCORE_ARG: &str = "min_score";

/// Semantic type tag of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Best-effort compatibility check of a JSON value against this type.
    ///
    /// `number` also accepts numeric strings, and `boolean` accepts the
    /// strings `"true"`/`"false"`, since models often quote scalars.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::String, Value::String(_)) => true,
            (ParamType::Number, Value::Number(_)) => true,
            (ParamType::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            (ParamType::Boolean, Value::Bool(_)) => true,
            (ParamType::Boolean, Value::String(s)) => matches!(s.as_str(), "true" | "false"),
            (ParamType::Array, Value::Array(_)) => true,
            (ParamType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name of the JSON type of a value, used in validation messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared schema of a tool: name, description and ordered parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "search_documents")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Semantic type tag
    pub param_type: ParamType,
    /// Value applied when an optional parameter is omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Enumerated allowed values, if restricted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
            default: None,
            allowed_values: None,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_allowed_values<V: Into<Value>>(
        mut self,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Closed set of tool categories used for discovery and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Document retrieval over the tenant's corpus
    Retrieval,
    /// External search APIs
    ExternalSearch,
    /// Source code inspection
    CodeAnalysis,
    /// Local filesystem access
    Filesystem,
    /// Agent memory operations
    Memory,
    #[default]
    Custom,
}

impl ToolCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ToolCategory::Retrieval => "retrieval",
            ToolCategory::ExternalSearch => "external_search",
            ToolCategory::CodeAnalysis => "code_analysis",
            ToolCategory::Filesystem => "filesystem",
            ToolCategory::Memory => "memory",
            ToolCategory::Custom => "custom",
        }
    }

    /// Categories whose calls are confined to the requesting tenant
    pub fn is_tenant_scoped(&self) -> bool {
        matches!(self, ToolCategory::Retrieval | ToolCategory::Memory)
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "retrieval" => Ok(ToolCategory::Retrieval),
            "external_search" => Ok(ToolCategory::ExternalSearch),
            "code_analysis" => Ok(ToolCategory::CodeAnalysis),
            "filesystem" => Ok(ToolCategory::Filesystem),
            "memory" => Ok(ToolCategory::Memory),
            "custom" => Ok(ToolCategory::Custom),
            other => Err(format!("Unknown tool category: {}", other)),
        }
    }
}

/// Descriptive metadata attached to a tool at registration time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires_auth: bool,
    pub version: String,
}

impl ToolMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            tags: Vec::new(),
            requires_auth: false,
            version: "1.0.0".to_string(),
        }
    }

    /// Metadata synthesized for a tool registered without any
    pub fn from_definition(definition: &ToolDefinition) -> Self {
        Self::new(&definition.name, &definition.description, ToolCategory::Custom)
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_auth_required(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn is_retrieval(&self) -> bool {
        self.category == ToolCategory::Retrieval
    }

    pub fn is_tenant_scoped(&self) -> bool {
        self.category.is_tenant_scoped()
    }

    /// Case-insensitive substring match against name, description and tags.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    arguments: HashMap<String, Value>,
    /// Optional reasoning for why this tool is being called
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            reasoning: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: HashMap<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn arguments(&self) -> &HashMap<String, Value> {
        &self.arguments
    }

    /// Inject a contextual argument unless the call already carries one.
    ///
    /// Returns `true` when the argument was added.
    pub fn inject_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.arguments.contains_key(key) {
            return false;
        }
        self.arguments.insert(key.to_string(), value.into());
        true
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument (numeric strings are accepted)
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.arguments.get(key)? {
            Value::String(s) => s.trim().parse().ok(),
            v => v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)),
        }
    }

    /// Get an optional f64 argument (numeric strings are accepted)
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.arguments.get(key)? {
            Value::String(s) => s.trim().parse().ok(),
            v => v.as_f64(),
        }
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.arguments.get(key)? {
            Value::String(s) => s.parse().ok(),
            v => v.as_bool(),
        }
    }

    /// Fill omitted (or explicitly null) parameters with their declared defaults
    pub fn apply_defaults(&mut self, definition: &ToolDefinition) {
        for param in &definition.parameters {
            let Some(default) = &param.default else {
                continue;
            };
            if self.arguments.get(&param.name).is_none_or(Value::is_null) {
                self.arguments.insert(param.name.clone(), default.clone());
            }
        }
    }

    /// Canonical serialization of (tool name, arguments).
    ///
    /// Object keys are sorted at every depth, so semantically identical
    /// argument maps produce the same key regardless of insertion order.
    pub fn cache_key(&self) -> String {
        let args: BTreeMap<&str, Value> = self
            .arguments
            .iter()
            .map(|(k, v)| (k.as_str(), canonicalize(v)))
            .collect();
        let args = serde_json::to_string(&args).unwrap_or_default();
        format!("{}:{}", self.tool_name, args)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
