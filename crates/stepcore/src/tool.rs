use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::Value;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Per-tool credentials and settings, e.g. `auth_token`, `auth_username`.
pub type ToolConfig = HashMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    Bearer,
    Basic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
    /// Header name for api-key auth.
    #[serde(default)]
    pub header: Option<String>,
    /// Config key holding the basic-auth username.
    #[serde(default)]
    pub username_key: Option<String>,
}

impl AuthConfig {
    pub fn new(auth_type: AuthType) -> Self {
        Self {
            auth_type,
            ..Self::default()
        }
    }
}

/// Structured description of how to build the outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub path_params: Vec<String>,
    #[serde(default)]
    pub query_params: Vec<String>,
    /// Header name -> template.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            content_type: default_content_type(),
        }
    }
}

impl RequestConfig {
    pub fn is_form_encoded(&self) -> bool {
        self.content_type == FORM_URLENCODED
    }
}

/// Output key -> dot-path into the HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseExtractConfig {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl ResponseExtractConfig {
    pub fn new<K, P>(fields: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
            strict: true,
        }
    }

    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }
}

/// An external HTTP/GraphQL capability a step can invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_url: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// May contain `{param}` placeholders.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub auth_header: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub request: Option<RequestConfig>,
    #[serde(default)]
    pub response_extract: Option<ResponseExtractConfig>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ToolDefinition {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            base_url: base_url.into(),
            method: default_method(),
            path: String::new(),
            auth_type: AuthType::None,
            auth_header: String::new(),
            auth: None,
            parameters: Vec::new(),
            request: None,
            response_extract: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response_extract(mut self, extract: ResponseExtractConfig) -> Self {
        self.response_extract = Some(extract);
        self
    }

    /// The structured auth descriptor, falling back to the legacy fields.
    pub fn auth_config(&self) -> AuthConfig {
        match &self.auth {
            Some(auth) => auth.clone(),
            None => AuthConfig {
                auth_type: self.auth_type,
                header: (!self.auth_header.is_empty()).then(|| self.auth_header.clone()),
                username_key: None,
            },
        }
    }
}
