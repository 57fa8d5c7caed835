use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::state::HistoryEntry;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Delivered in place of (or after) the reply when the service cannot be reached.
pub const FALLBACK_MESSAGE: &str = "\n\n(系统提示: 网络连接异常或服务暂时不可用，请稍后再试。)";

pub const SYSTEM_INSTRUCTION: &str = r#"
You are the "LaiKe Agent" (来客 Agent), an intelligent business assistant for Douyin (TikTok China) merchants.
Your tone should be professional, encouraging, and data-driven, similar to a high-end business consultant.

Your capabilities include:
1. Store Management Advice (Products, Inventory).
2. Creative Asset Generation ideas (Short video scripts, Ad copy).
3. Marketing Promotion Strategies (Dou+ strategies, Feed ads).
4. Business Diagnosis (Analyzing traffic drops, conversion rates).

Formatting Rules:
- Use clear headers and bullet points.
- If mentioning metrics, try to simulate realistic scenarios or ask for specific data.
- Keep responses concise but helpful.
- Language: Simplified Chinese (zh-CN).
"#;

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<StreamCandidate>,
}

#[derive(Deserialize)]
struct StreamCandidate {
    content: Option<StreamContent>,
}

#[derive(Deserialize)]
struct StreamContent {
    #[serde(default)]
    parts: Vec<StreamPart>,
}

#[derive(Deserialize)]
struct StreamPart {
    text: Option<String>,
}

fn build_request<'a>(history: &'a [HistoryEntry], message: &'a str) -> GeminiRequest<'a> {
    let mut contents: Vec<GeminiContent<'a>> = history
        .iter()
        .filter(|entry| !entry.text.is_empty())
        .map(|entry| GeminiContent {
            role: Some(entry.role.as_str()),
            parts: vec![GeminiPart { text: &entry.text }],
        })
        .collect();
    contents.push(GeminiContent {
        role: Some("user"),
        parts: vec![GeminiPart { text: message }],
    });

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: SYSTEM_INSTRUCTION }],
        },
        contents,
    }
}

/// Splits a server-sent event stream into text fragments.
///
/// Bytes are buffered until a full line is available, so event lines (and
/// multi-byte characters) split across network chunks decode intact.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut fragments = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            fragments.extend(parse_event_line(&String::from_utf8_lossy(&line)));
        }
        fragments
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        parse_event_line(&String::from_utf8_lossy(&rest)).into_iter().collect()
    }
}

fn parse_event_line(line: &str) -> Option<String> {
    let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "skipping undecodable stream event");
            return None;
        }
    };

    let text: String = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    (!text.is_empty()).then_some(text)
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.map(|k| k.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_string());
    }

    /// Stream a reply to `message`, calling `on_chunk` for every fragment in
    /// arrival order. `on_chunk` returns false to stop reading early. Never
    /// fails: any error ends the stream with [`FALLBACK_MESSAGE`].
    pub async fn stream_chat<F>(&self, history: &[HistoryEntry], message: &str, mut on_chunk: F)
    where
        F: FnMut(&str) -> bool + Send,
    {
        match self.try_stream_chat(history, message, &mut on_chunk).await {
            Ok(fragments) => info!(model = %self.model, fragments, "Gemini stream finished"),
            Err(e) => {
                warn!(error = %e, "Gemini API error");
                let _ = on_chunk(FALLBACK_MESSAGE);
            }
        }
    }

    async fn try_stream_chat<F>(
        &self,
        history: &[HistoryEntry],
        message: &str,
        on_chunk: &mut F,
    ) -> Result<usize>
    where
        F: FnMut(&str) -> bool + Send,
    {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Gemini API key not configured"))?;

        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let request = build_request(history, message);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, text));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut delivered = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for fragment in decoder.feed(&chunk) {
                debug!(len = fragment.len(), "fragment");
                if !on_chunk(&fragment) {
                    debug!(delivered, "receiver gone, abandoning stream");
                    return Ok(delivered);
                }
                delivered += 1;
            }
        }
        for fragment in decoder.finish() {
            if !on_chunk(&fragment) {
                break;
            }
            delivered += 1;
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Role;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn event(text: &str) -> String {
        format!(
            "data: {}\r\n\r\n",
            serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            })
        )
    }

    /// Accepts one request, reports it back, then answers with `status` and
    /// `pieces` written one at a time.
    async fn serve_once(status: &'static str, pieces: Vec<Vec<u8>>) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                status
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for piece in pieces {
                socket.write_all(&piece).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
            let _ = socket.shutdown().await;
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn request_carries_system_instruction_and_history() {
        let history = vec![
            HistoryEntry { role: Role::Assistant, text: "您好".into() },
            HistoryEntry { role: Role::Assistant, text: String::new() },
            HistoryEntry { role: Role::User, text: "在吗".into() },
        ];
        let value = serde_json::to_value(build_request(&history, "帮我写文案")).unwrap();

        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("LaiKe Agent"));
        assert!(value["systemInstruction"].get("role").is_none());
        let contents = value["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "帮我写文案");
    }

    #[test]
    fn decoder_reassembles_split_lines() {
        let mut decoder = SseDecoder::default();
        let bytes = format!("{}{}", event("流心"), event("爆浆")).into_bytes();
        // Split inside a multi-byte character.
        let cut = bytes.iter().position(|b| *b >= 0x80).unwrap() + 1;

        let mut fragments = decoder.feed(&bytes[..cut]);
        assert!(fragments.is_empty());
        fragments.extend(decoder.feed(&bytes[cut..]));
        fragments.extend(decoder.finish());
        assert_eq!(fragments, vec!["流心", "爆浆"]);
    }

    #[test]
    fn decoder_ignores_noise() {
        let mut decoder = SseDecoder::default();
        let input = ": keep-alive\n\ndata: [DONE]\ndata: {oops\ndata: {\"candidates\":[]}\n";
        assert!(decoder.feed(input.as_bytes()).is_empty());
        assert_eq!(decoder.feed(b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\"},{\"text\":\"b\"}]}}]}"), Vec::<String>::new());
        assert_eq!(decoder.finish(), vec!["ab"]);
    }

    #[tokio::test]
    async fn streams_fragments_in_order() {
        let body = format!("{}{}{}", event("第一段"), event("第二段"), event("第三段")).into_bytes();
        let pieces = vec![body[..7].to_vec(), body[7..50].to_vec(), body[50..].to_vec()];
        let (base_url, request) = serve_once("200 OK", pieces).await;

        let client = GeminiClient::new(Some("test-key")).with_base_url(&base_url);
        let mut fragments = Vec::new();
        client
            .stream_chat(&[], "你好", |text| {
                fragments.push(text.to_string());
                true
            })
            .await;

        assert_eq!(fragments, vec!["第一段", "第二段", "第三段"]);
        let request = request.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn stops_reading_when_the_callback_declines() {
        let body = format!("{}{}{}", event("一"), event("二"), event("三")).into_bytes();
        let (base_url, _request) = serve_once("200 OK", vec![body]).await;

        let client = GeminiClient::new(Some("k")).with_base_url(&base_url);
        let mut fragments = Vec::new();
        client
            .stream_chat(&[], "你好", |text| {
                fragments.push(text.to_string());
                false
            })
            .await;

        assert_eq!(fragments, vec!["一"]);
    }

    #[tokio::test]
    async fn http_error_degrades_to_fallback() {
        let (base_url, _request) = serve_once("500 Internal Server Error", vec![b"boom".to_vec()]).await;

        let client = GeminiClient::new(Some("k")).with_base_url(&base_url);
        let mut fragments = Vec::new();
        client
            .stream_chat(&[], "你好", |text| {
                fragments.push(text.to_string());
                true
            })
            .await;

        assert_eq!(fragments, vec![FALLBACK_MESSAGE]);
    }

    #[tokio::test]
    async fn missing_key_degrades_to_fallback() {
        let client = GeminiClient::new(None).with_base_url("http://127.0.0.1:9");
        let mut fragments = Vec::new();
        client
            .stream_chat(&[], "你好", |text| {
                fragments.push(text.to_string());
                true
            })
            .await;
        assert_eq!(fragments, vec![FALLBACK_MESSAGE]);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_fallback() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = GeminiClient::new(Some("k")).with_base_url(&format!("http://127.0.0.1:{}", port));
        let mut fragments = Vec::new();
        client
            .stream_chat(&[], "你好", |text| {
                fragments.push(text.to_string());
                true
            })
            .await;
        assert_eq!(fragments, vec![FALLBACK_MESSAGE]);
    }
}
