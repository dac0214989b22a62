use std::time::Duration;

use async_trait::async_trait;
use nl_sql_engine::{
    db::SqlDialect,
    error::{EngineError, EngineResult},
    llm::{
        CompletionClient, GenerationOptions, LlmClient, LlmProvider, OPENAI_ENDPOINT,
        extract_sql, generate_sql
    },
    prompt::{Prompt, build_prompt}
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle
};

struct Canned(&'static str);

#[async_trait]
impl CompletionClient for Canned {
    async fn complete(&self, _prompt: &Prompt) -> EngineResult<String> {
        Ok(self.0.to_string())
    }
}

fn prompt() -> Prompt {
    build_prompt(
        "Available tables and columns:\nTable USERS: ID (int)",
        "How many users are there?",
        SqlDialect::MySQL
    )
}

/// Serve one HTTP response on a random local port; yields the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn openai(endpoint: String) -> LlmClient {
    LlmClient::new(
        LlmProvider::OpenAI {
            api_key: "sk-test".to_string(),
            model: "gpt-4".to_string(),
            endpoint
        },
        GenerationOptions::default()
    )
    .unwrap()
}

#[test]
fn test_extract_sql_plain() {
    assert_eq!(extract_sql("  SELECT 1  \n"), "SELECT 1");
}

#[test]
fn test_extract_sql_sql_fence() {
    assert_eq!(
        extract_sql("```sql\nSELECT COUNT(*) FROM USERS\n```"),
        "SELECT COUNT(*) FROM USERS"
    );
}

#[test]
fn test_extract_sql_uppercase_fence() {
    assert_eq!(extract_sql("```SQL\nSELECT 1\n```"), "SELECT 1");
}

#[test]
fn test_extract_sql_bare_fence() {
    assert_eq!(extract_sql("```\nSELECT 1\n```"), "SELECT 1");
}

#[test]
fn test_extract_sql_trailing_fence_only() {
    assert_eq!(extract_sql("SELECT 1\n```"), "SELECT 1");
}

#[test]
fn test_extract_sql_only_fences() {
    assert_eq!(extract_sql("```sql\n```"), "");
}

#[test]
fn test_extract_sql_keeps_inner_text() {
    let sql = "SELECT name FROM users WHERE note = 'a ``` b'";
    assert_eq!(extract_sql(sql), sql);
}

#[test]
fn test_llm_provider_model() {
    let provider = LlmProvider::Anthropic {
        api_key: "key".to_string(),
        model:   "claude-sonnet-4-20250514".to_string()
    };
    assert_eq!(provider.model(), "claude-sonnet-4-20250514");
}

#[test]
fn test_generation_options_default() {
    let options = GenerationOptions::default();
    assert_eq!(options.timeout, Duration::from_secs(30));
    assert_eq!(options.max_tokens, 500);
    assert!((options.temperature - 0.1).abs() < f32::EPSILON);
}

#[test]
fn test_openai_default_endpoint() {
    assert_eq!(OPENAI_ENDPOINT, "https://api.openai.com/v1/chat/completions");
}

#[tokio::test]
async fn test_generate_sql_extracts_statement() {
    let client = Canned("```sql\nSELECT COUNT(*) AS user_count FROM USERS\n```");
    let sql = generate_sql(&client, &prompt()).await.unwrap();
    assert_eq!(sql, "SELECT COUNT(*) AS user_count FROM USERS");
}

#[tokio::test]
async fn test_generate_sql_empty_is_error() {
    let client = Canned("```sql\n```");
    let err = generate_sql(&client, &prompt()).await.unwrap_err();
    assert!(matches!(err, EngineError::Generation(_)));
    assert_eq!(err.to_string(), "Language model returned an empty SQL query");
}

#[tokio::test]
async fn test_openai_success() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"```sql\nSELECT COUNT(*) FROM USERS\n```"}}]}"#
    )
    .await;
    let client = openai(format!("{}/v1/chat/completions", base));

    let raw = client.complete(&prompt()).await.unwrap();
    assert_eq!(extract_sql(&raw), "SELECT COUNT(*) FROM USERS");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions"));
    assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(request.contains("\"model\":\"gpt-4\""));
    assert!(request.contains("\"max_tokens\":500"));
    assert!(request.contains("Convert this to SQL: How many users are there?"));
}

#[tokio::test]
async fn test_openai_error_status() {
    let (base, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let client = openai(format!("{}/v1/chat/completions", base));

    let err = client.complete(&prompt()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("OpenAI API error 500"));
    assert!(message.contains("boom"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_openai_empty_choices() {
    let (base, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;
    let client = openai(format!("{}/v1/chat/completions", base));

    let err = client.complete(&prompt()).await.unwrap_err();
    assert_eq!(err.to_string(), "Empty response from OpenAI");
    server.await.unwrap();
}

#[tokio::test]
async fn test_openai_malformed_body() {
    let (base, server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
    let client = openai(format!("{}/v1/chat/completions", base));

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Unexpected language model response format")
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_ollama_success() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"message":{"role":"assistant","content":"SELECT 1"},"done":true}"#
    )
    .await;
    let client = LlmClient::new(
        LlmProvider::Ollama {
            base_url: format!("{}/", base),
            model:    "llama3.2".to_string()
        },
        GenerationOptions::default()
    )
    .unwrap();

    assert_eq!(client.complete(&prompt()).await.unwrap(), "SELECT 1");
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat"));
    assert!(request.contains("\"stream\":false"));
    assert!(request.contains("\"num_predict\":500"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = openai(format!("http://{}/v1/chat/completions", addr));

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(matches!(err, EngineError::Generation(_)));
    assert!(
        err.to_string()
            .starts_with("Network error calling language model")
    );
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(socket);
    });
    let client = LlmClient::new(
        LlmProvider::OpenAI {
            api_key:  "sk-test".to_string(),
            model:    "gpt-4".to_string(),
            endpoint: format!("http://{}/v1/chat/completions", addr)
        },
        GenerationOptions {
            timeout: Duration::from_millis(200),
            ..Default::default()
        }
    )
    .unwrap();

    let err = client.complete(&prompt()).await.unwrap_err();
    assert!(err.to_string().starts_with("Request timeout"));
    server.abort();
}
