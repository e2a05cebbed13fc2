//! OpenAI-compatible chat completions adapter
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama, vLLM). The system prompt and the
//! rendered transcript are sent as a system and a user message.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolweave_application::ports::llm_gateway::{
    ChatCompletion, ChatGateway, ChatRequest, GatewayError, TokenUsage,
};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for [`OpenAiGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: None,
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

pub struct OpenAiGateway {
    client: Client,
    settings: OpenAiSettings,
    label: String,
}

impl OpenAiGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        if settings.api_key.is_none() {
            warn!("No API key configured for {}; requests may be rejected", settings.base_url);
        }
        let label = format!("openai:{}", settings.model);
        Ok(Self {
            client,
            settings,
            label,
        })
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.settings.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: &request.context,
                },
            ],
            temperature: self.settings.temperature,
        }
    }
}

fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = format!("HTTP {}: {}", status.as_u16(), body.trim());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        s if s.is_server_error() => GatewayError::ConnectionError(detail),
        _ => GatewayError::RequestFailed(detail),
    }
}

fn parse_completion(body: &str) -> Result<ChatCompletion, GatewayError> {
    let response: WireResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let completion = ChatCompletion::text(text);
    Ok(match response.usage {
        Some(u) => completion.with_usage(TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
        None => completion,
    })
}

#[async_trait]
impl ChatGateway for OpenAiGateway {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, GatewayError> {
        let endpoint = self.settings.endpoint();
        debug!(endpoint = %endpoint, model = %self.settings.model, "Sending chat completion");

        let mut builder = self.client.post(&endpoint).json(&self.body(request));
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let settings =
            OpenAiSettings::new("gpt-4o-mini").with_base_url("http://localhost:11434/v1/");
        assert_eq!(settings.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let gateway =
            OpenAiGateway::new(OpenAiSettings::new("gpt-4o-mini").with_temperature(0.2)).unwrap();
        let request = ChatRequest::new("You are helpful.", "User: hi");

        let value = serde_json::to_value(gateway.body(&request)).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "You are helpful.");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "User: hi");
        assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_omitted_when_unset() {
        let gateway = OpenAiGateway::new(OpenAiSettings::new("m")).unwrap();
        let request = ChatRequest::new("s", "c");
        let value = serde_json::to_value(gateway.body(&request)).unwrap();
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_parse_completion_with_usage() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Refunds take 14 days."}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.text, "Refunds take 14 days.");
        assert_eq!(completion.usage.unwrap().total(), 128);
    }

    #[test]
    fn test_parse_completion_errors() {
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            GatewayError::RequestFailed(msg) if msg.contains("401")
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, ""),
            GatewayError::ConnectionError(_)
        ));
        assert!(matches!(
            status_error(StatusCode::GATEWAY_TIMEOUT, ""),
            GatewayError::Timeout
        ));
    }
}
