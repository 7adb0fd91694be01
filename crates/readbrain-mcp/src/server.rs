use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, error};

use readbrain_store::FsGraphBuilder;

use crate::protocol::{Request, Response, INVALID_PARAMS, PARSE_ERROR};
use crate::tools;

const SERVER_NAME: &str = "readbrain";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

const INSTRUCTIONS: &str = "\
ReadBrain exposes a reading knowledge base: book notes, AI enrichment and a \
concept graph linking chapters that share themes.\n\
\n\
readbrain_rebuild after notes change; readbrain_graph for the full snapshot.\n\
readbrain_concept and readbrain_chapter to explore connections between books.\n\
readbrain_pending lists chapters still waiting for enrichment.";

/// Serve MCP over stdio until stdin closes.
pub fn run_server(builder: &FsGraphBuilder) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        if let Some(response) = handle_line(&line, builder) {
            write_response(&mut stdout, &response)?;
        }
    }

    Ok(())
}

/// Answer one line of input. Blank lines and notifications produce nothing.
pub fn handle_line(line: &str, builder: &FsGraphBuilder) -> Option<Response> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            error!("invalid JSON-RPC: {e}");
            return Some(Response::err(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ));
        }
    };

    let method = request.method.as_deref().unwrap_or("");
    debug!("MCP request: {method}");

    let id = request.id?;

    Some(match method {
        "initialize" => handle_initialize(id),
        "ping" => Response::ok(id, json!({})),
        "tools/list" => Response::ok(id, tools::tool_definitions()),
        "tools/call" => handle_tools_call(id, request.params.as_ref(), builder),
        other => Response::method_not_found(id, other),
    })
}

fn write_response(stdout: &mut io::Stdout, response: &Response) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

fn handle_initialize(id: Value) -> Response {
    Response::ok(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "instructions": INSTRUCTIONS
        }),
    )
}

fn handle_tools_call(id: Value, params: Option<&Value>, builder: &FsGraphBuilder) -> Response {
    let Some(params) = params else {
        return Response::err(id, INVALID_PARAMS, "missing params");
    };

    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return Response::err(id, INVALID_PARAMS, "missing tool name");
    };

    let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
    let result = tools::call_tool(builder, tool_name, &args);
    Response::ok(id, serde_json::to_value(result).unwrap_or(Value::Null))
}
