//! Drives a gcal-mcp server through a minimal MCP session: initialize,
//! list the tools, call one tool, print every response.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gcal_mcp_core::protocol::{LATEST_PROTOCOL_VERSION, Request, Response};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStdin, ChildStdout, Command};

#[derive(Parser)]
#[command(name = "test-client")]
#[command(about = "Call one gcal-mcp tool through a spawned server")]
struct Cli {
    /// Tool to call
    #[arg(default_value = "listEvents")]
    tool: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    args: String,

    /// Server binary (defaults to `gcal-mcp` next to this executable)
    #[arg(long)]
    server: Option<PathBuf>,
}

struct Session {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl Session {
    async fn send(&mut self, request: &Request) -> Result<()> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Response> {
        self.next_id += 1;
        self.send(&Request::new(self.next_id, method, params)).await?;

        let line = self
            .stdout
            .next_line()
            .await?
            .context("Server closed stdout before answering")?;

        serde_json::from_str(&line).with_context(|| format!("Unexpected server output: {}", line))
    }
}

fn default_server() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not locate test-client executable")?;
    Ok(exe.with_file_name(format!("gcal-mcp{}", std::env::consts::EXE_SUFFIX)))
}

fn print(label: &str, response: &Response) -> Result<()> {
    println!("{}: {}", label, serde_json::to_string_pretty(response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let arguments: Value = serde_json::from_str(&cli.args).context("--args must be JSON")?;
    if !arguments.is_object() {
        bail!("--args must be a JSON object");
    }

    let server = match cli.server {
        Some(server) => server,
        None => default_server()?,
    };

    let mut child = Command::new(&server)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start {}", server.display()))?;

    let mut session = Session {
        stdin: child.stdin.take().context("Server stdin unavailable")?,
        stdout: BufReader::new(child.stdout.take().context("Server stdout unavailable")?).lines(),
        next_id: 0,
    };

    let init = session
        .request(
            "initialize",
            json!({
                "protocolVersion": LATEST_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": env!("CARGO_PKG_VERSION") }
            }),
        )
        .await?;
    print("initialize", &init)?;

    session
        .send(&Request::notification("notifications/initialized"))
        .await?;

    let tools = session.request("tools/list", json!({})).await?;
    print("tools", &tools)?;

    let result = session
        .request(
            "tools/call",
            json!({ "name": cli.tool, "arguments": arguments }),
        )
        .await?;
    print("result", &result)?;

    drop(session);
    child.wait().await?;

    Ok(())
}
