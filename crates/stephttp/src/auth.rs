use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::collections::BTreeMap;

use stepcore::{AuthType, ToolConfig, ToolDefinition};

const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
const TOKEN_KEY: &str = "auth_token";
const DEFAULT_USERNAME_KEY: &str = "auth_username";

pub(crate) type Headers = BTreeMap<String, String>;

/// Auth headers for a tool with a structured request descriptor.
pub(crate) fn structured_headers(tool: &ToolDefinition, config: &ToolConfig) -> Headers {
    let auth = tool.auth_config();
    let token = config.get(TOKEN_KEY).map(String::as_str).unwrap_or("");
    let mut headers = Headers::new();

    match auth.auth_type {
        AuthType::None => {}
        AuthType::ApiKey if !token.is_empty() => {
            let name = auth.header.as_deref().unwrap_or(DEFAULT_API_KEY_HEADER);
            headers.insert(name.to_string(), token.to_string());
        }
        AuthType::Bearer if !token.is_empty() => {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        AuthType::Basic => {
            let username_key = auth.username_key.as_deref().unwrap_or(DEFAULT_USERNAME_KEY);
            let username = config.get(username_key).map(String::as_str).unwrap_or("");
            if !username.is_empty() || !token.is_empty() {
                let encoded = BASE64.encode(format!("{username}:{token}"));
                headers.insert("Authorization".to_string(), format!("Basic {encoded}"));
            }
        }
        AuthType::ApiKey | AuthType::Bearer => {
            tracing::debug!("Tool {} expects a token but none is configured", tool.id);
        }
    }
    headers
}

/// Auth headers for a legacy tool: api-key and bearer only.
pub(crate) fn legacy_headers(tool: &ToolDefinition, config: &ToolConfig) -> Headers {
    let mut headers = Headers::new();
    let Some(token) = config.get(TOKEN_KEY).filter(|t| !t.is_empty()) else {
        return headers;
    };
    match tool.auth_type {
        AuthType::ApiKey => {
            let name = if tool.auth_header.is_empty() {
                DEFAULT_API_KEY_HEADER
            } else {
                tool.auth_header.as_str()
            };
            headers.insert(name.to_string(), token.clone());
        }
        AuthType::Bearer => {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        AuthType::None | AuthType::Basic => {}
    }
    headers
}
