use anyhow::Result;
use serde_json::{Value, json};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use weather_core::OpenWeather;

use crate::render;
use crate::rpc::{self, Reply, Request, ToolCall};

const PROTOCOL_VERSION: &str = "2025-06-18";
const GET_WEATHER: &str = "get_weather";

/// Stdio MCP server with a single tool.
///
/// Tool failures are conversational by design: a failed lookup is rendered
/// as an error-text result, never as a protocol-level fault, so the calling
/// agent always receives something it can show the user.
pub struct Server {
    lookup: OpenWeather,
}

impl Server {
    pub fn new(lookup: OpenWeather) -> Self {
        Self { lookup }
    }

    /// Serve requests from stdin until EOF.
    pub async fn run(self) -> Result<()> {
        self.serve(io::stdin(), io::stdout()).await
    }

    async fn serve(
        self,
        input: impl AsyncRead + Unpin,
        mut output: impl AsyncWrite + Unpin,
    ) -> Result<()> {
        let mut lines = BufReader::new(input).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(reply) = self.handle_line(&line).await {
                output.write_all(&serde_json::to_vec(&reply)?).await?;
                output.write_u8(b'\n').await?;
                output.flush().await?;
            }
        }

        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Option<Reply> {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(error) => {
                return Some(Reply::error(
                    Value::Null,
                    rpc::parse_error(format!("invalid JSON-RPC message: {error}")),
                ));
            }
        };

        match request.id {
            Some(id) => Some(self.handle_request(id, request.method, request.params).await),
            None => {
                // Notifications get no reply; the only one we expect is
                // notifications/initialized.
                if request.method != "notifications/initialized" {
                    tracing::debug!(method = %request.method, "ignoring notification");
                }
                None
            }
        }
    }

    async fn handle_request(&self, id: Value, method: String, params: Option<Value>) -> Reply {
        match method.as_str() {
            "initialize" => Reply::result(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => Reply::result(id, json!({})),
            "tools/list" => Reply::result(id, json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(id, params).await,
            _ => Reply::error(
                id,
                rpc::method_not_found(format!("unsupported method: {method}")),
            ),
        }
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> Reply {
        let call: ToolCall = match params.map(serde_json::from_value).transpose() {
            Ok(Some(call)) => call,
            Ok(None) | Err(_) => {
                return Reply::error(
                    id,
                    rpc::invalid_params("tools/call requires a tool name and arguments".to_owned()),
                );
            }
        };

        if call.name != GET_WEATHER {
            return Reply::error(
                id,
                rpc::invalid_params(format!("unknown tool: {}", call.name)),
            );
        }

        let city = call
            .arguments
            .get("city")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|city| !city.is_empty());

        let Some(city) = city else {
            return Reply::error(
                id,
                rpc::invalid_params("the city argument is required".to_owned()),
            );
        };

        match self.lookup.current(city).await {
            Ok(record) => Reply::result(id, tool_text(render::summary(&record), false)),
            Err(error) => {
                tracing::warn!(%error, city, "weather lookup failed");
                Reply::result(id, tool_text(format!("Error: {error}"), true))
            }
        }
    }
}

fn tool_descriptor() -> Value {
    json!({
        "name": GET_WEATHER,
        "description": "Get the current weather for a city",
        "inputSchema": {
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name to look up, e.g. Istanbul, Ankara, London",
                },
            },
            "required": ["city"],
        },
    })
}

fn tool_text(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use weather_core::{Config, RawReply, Transport, TransportError};

    const ISTANBUL_BODY: &str = r#"{"name":"Istanbul","sys":{"country":"TR"},"main":{"temp":21.37,"humidity":60,"pressure":1012,"feels_like":20.95},"weather":[{"description":"clear sky"}],"wind":{"speed":3.6},"dt":1700000000}"#;

    #[derive(Debug)]
    struct FakeTransport(Result<RawReply, TransportError>);

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(
            &self,
            _url: &str,
            _query: &[(&str, &str)],
        ) -> Result<RawReply, TransportError> {
            self.0.clone()
        }
    }

    fn test_server(reply: Result<RawReply, TransportError>) -> Server {
        let config = Config {
            api_key: "TESTKEY".to_owned(),
            base_url: "http://provider.invalid/data/2.5/weather".to_owned(),
            lang: "en".to_owned(),
            port: 5000,
            timeout: Duration::from_secs(10),
        };

        Server::new(OpenWeather::with_transport(
            config,
            Arc::new(FakeTransport(reply)),
        ))
    }

    fn ok_reply(status: u16, body: &str) -> Result<RawReply, TransportError> {
        Ok(RawReply {
            status,
            body: body.to_owned(),
        })
    }

    async fn reply_json(server: &Server, line: &str) -> Value {
        let reply = server.handle_line(line).await.expect("expected a reply");
        serde_json::to_value(&reply).expect("reply must serialize")
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server_info() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{}}}"#,
        )
        .await;

        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(reply["result"]["serverInfo"]["name"], "weather-mcp");
    }

    #[tokio::test]
    async fn tools_list_exposes_get_weather() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

        let tools = reply["result"]["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_weather");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["city"]));
    }

    #[tokio::test]
    async fn tool_call_renders_a_summary() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_weather","arguments":{"city":"Istanbul"}}}"#,
        )
        .await;

        assert_eq!(reply["result"]["isError"], false);
        let text = reply["result"]["content"][0]["text"]
            .as_str()
            .expect("text content");
        assert!(text.contains("Istanbul, TR"));
        assert!(text.contains("21.4°C"));
    }

    #[tokio::test]
    async fn lookup_failures_stay_conversational() {
        let server = test_server(ok_reply(404, r#"{"cod":"404","message":"city not found"}"#));
        let reply = reply_json(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"get_weather","arguments":{"city":"Nowhereistan"}}}"#,
        )
        .await;

        // Still a result, not a protocol error.
        assert!(reply.get("error").is_none());
        assert_eq!(reply["result"]["isError"], true);
        let text = reply["result"]["content"][0]["text"]
            .as_str()
            .expect("text content");
        assert!(text.contains("Nowhereistan"));
    }

    #[tokio::test]
    async fn missing_city_argument_is_invalid_params() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"get_weather","arguments":{}}}"#,
        )
        .await;

        assert_eq!(reply["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(
            &server,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_forecast","arguments":{"city":"Istanbul"}}}"#,
        )
        .await;

        assert_eq!(reply["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply =
            reply_json(&server, r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#).await;

        assert_eq!(reply["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn unparseable_line_is_a_parse_error_with_null_id() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = reply_json(&server, "{not json").await;

        assert_eq!(reply["error"]["code"], -32700);
        assert_eq!(reply["id"], Value::Null);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let reply = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;

        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn serve_answers_over_line_delimited_io() {
        let server = test_server(ok_reply(200, ISTANBUL_BODY));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();

        server
            .serve(input.as_bytes(), &mut output)
            .await
            .expect("serve must succeed");

        let replies: Vec<Value> = String::from_utf8(output)
            .expect("output must be UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("each line must be JSON"))
            .collect();

        // The notification produced no output line.
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["result"]["tools"][0]["name"], "get_weather");
    }
}
