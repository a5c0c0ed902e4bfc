use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use stepcore::value::display_string;
use stepcore::{
    extract_template_keys, render_template, RequestConfig, StepExecutionError, ToolConfig,
    ToolDefinition, Value, ValueMap,
};
use stepruntime::ToolInvoker;

use crate::auth::{self, Headers};
use crate::request::{
    form_fields, join_url, substitute_declared, substitute_placeholders, take_query, to_pairs,
};
use crate::response;

/// Settings for the outbound HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Per-call timeout. A timed out call fails only its own step.
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// Calls tools over HTTP.
///
/// A tool with a structured request descriptor gets path, query, header
/// and body placement exactly as declared. A tool without one takes the
/// legacy route: `{name}` placeholders in its path, then everything else
/// as query params for GET or as a JSON body otherwise.
#[derive(Debug, Clone)]
pub struct HttpToolInvoker {
    client: Client,
}

impl HttpToolInvoker {
    pub fn new(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn call_structured(
        &self,
        tool: &ToolDefinition,
        request: &RequestConfig,
        mut inputs: ValueMap,
        config: &ToolConfig,
    ) -> Result<ValueMap, StepExecutionError> {
        let path = substitute_declared(&tool.path, &request.path_params, &mut inputs);
        let url = join_url(&tool.base_url, &path);
        let query = take_query(&request.query_params, &mut inputs);

        let mut headers = auth::structured_headers(tool, config);
        for (name, template) in &request.headers {
            let rendered = render(&Value::String(template.clone()), &inputs)?;
            headers.insert(name.clone(), display_string(&rendered));
        }

        let body = request
            .body
            .as_ref()
            .map(|template| render(template, &inputs))
            .transpose()?;

        let mut builder = self
            .client
            .request(parse_method(&tool.method)?, &url)
            .query(&to_pairs(&query));
        builder = with_headers(builder, &headers);
        if let Some(body) = &body {
            builder = if request.is_form_encoded() {
                builder.form(&form_fields(body)?)
            } else {
                builder.json(body)
            };
        }

        tracing::debug!("{} {} (tool {})", tool.method.to_uppercase(), url, tool.id);
        let (status, text) = send(builder).await?;
        response::to_output(status, &text, tool.response_extract.as_ref())
    }

    async fn call_legacy(
        &self,
        tool: &ToolDefinition,
        mut inputs: ValueMap,
        config: &ToolConfig,
    ) -> Result<ValueMap, StepExecutionError> {
        let path = substitute_placeholders(&tool.path, &mut inputs);
        let url = join_url(&tool.base_url, &path);
        let headers = auth::legacy_headers(tool, config);

        let builder = if tool.method.eq_ignore_ascii_case("GET") {
            self.client.get(&url).query(&to_pairs(&inputs))
        } else {
            self.client.post(&url).json(&inputs)
        };
        let builder = with_headers(builder, &headers);

        tracing::debug!("{} {} (legacy tool {})", tool.method.to_uppercase(), url, tool.id);
        let (status, text) = send(builder).await?;
        response::to_output(status, &text, None)
    }
}

#[async_trait]
impl ToolInvoker for HttpToolInvoker {
    async fn call(
        &self,
        tool: &ToolDefinition,
        inputs: ValueMap,
        config: &ToolConfig,
    ) -> Result<ValueMap, StepExecutionError> {
        match &tool.request {
            Some(request) => self.call_structured(tool, request, inputs, config).await,
            None => self.call_legacy(tool, inputs, config).await,
        }
    }
}

fn render(template: &Value, inputs: &ValueMap) -> Result<Value, StepExecutionError> {
    let unbound: Vec<String> = extract_template_keys(template)
        .into_iter()
        .filter(|key| !inputs.contains_key(key))
        .collect();
    if !unbound.is_empty() {
        tracing::debug!("Leaving unbound template keys as-is: {}", unbound.join(", "));
    }
    render_template(template, inputs, false)
        .map_err(|e| StepExecutionError::InvalidRequest(e.to_string()))
}

fn parse_method(method: &str) -> Result<Method, StepExecutionError> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| StepExecutionError::InvalidRequest(format!("Unsupported method: {method}")))
}

fn with_headers(mut builder: RequestBuilder, headers: &Headers) -> RequestBuilder {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

async fn send(builder: RequestBuilder) -> Result<(u16, String), StepExecutionError> {
    let response = builder
        .send()
        .await
        .map_err(|e| StepExecutionError::Request(e.to_string()))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| StepExecutionError::Request(format!("Failed to read response: {e}")))?;

    tracing::debug!("Response status: {}", status);
    if status >= 400 {
        return Err(StepExecutionError::Status { status, body: text });
    }
    Ok((status, text))
}
