use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::OllamaOptions;

/// 聊天接口路径
const CHAT_ENDPOINT: &str = "/api/chat";

/// 推理调用错误，任何一张图片出错都不影响其余图片的处理
#[derive(Debug, Error)]
pub enum InferenceError {
    /// 请求超时
    #[error("推理请求超时")]
    Timeout,
    /// 无法连接推理服务
    #[error("无法连接推理服务: {0}")]
    Unreachable(String),
    /// 响应不符合预期格式
    #[error("推理响应无效: {0}")]
    BadResponse(String),
}

/// Ollama 视觉模型客户端
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
    prompt: String,
}

impl OllamaClient {
    pub fn new(options: &OllamaOptions) -> anyhow::Result<Self> {
        let http =
            reqwest::Client::builder().timeout(Duration::from_secs(options.timeout)).build()?;
        let url = format!("{}{}", options.ollama_url.trim_end_matches('/'), CHAT_ENDPOINT);
        Ok(Self { http, url, model: options.model.clone(), prompt: options.prompt.clone() })
    }

    /// 请求模型描述一张图片，返回响应中的正文文本
    pub async fn describe(&self, image: &[u8]) -> Result<String, InferenceError> {
        let payload = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": self.prompt,
                "images": [STANDARD.encode(image)],
            }],
            "stream": false,
        });

        debug!("请求推理服务: {}", self.url);
        let response = self.http.post(&self.url).json(&payload).send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else {
                InferenceError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("错误响应: {body}");
            return Err(InferenceError::BadResponse(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else {
                InferenceError::BadResponse(e.to_string())
            }
        })?;
        debug!("推理服务响应: {body}");

        extract_text(&body)
            .ok_or_else(|| InferenceError::BadResponse("响应中没有找到正文".to_string()))
    }
}

/// 从响应中提取正文文本
///
/// 依次探测 generate 风格的 `response`、chat 风格的 `message.content`、
/// OpenAI 风格的 `choices[0]`，最后是顶层的 `text` / `output` / `content`。
fn extract_text(body: &Value) -> Option<String> {
    if let Some(text) = body["response"].as_str() {
        return Some(text.to_string());
    }
    if let Some(text) = body["message"]["content"].as_str() {
        return Some(text.to_string());
    }
    let first = &body["choices"][0];
    if let Some(text) = first["message"]["content"].as_str() {
        return Some(text.to_string());
    }
    if let Some(text) = first["content"].as_str() {
        return Some(text.to_string());
    }
    for key in ["text", "output", "content"] {
        if let Some(text) = body[key].as_str() {
            return Some(text.to_string());
        }
    }
    None
}
