use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use reqwest::Url;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "keyslot-cli")]
#[command(about = "Keyslot CLI - hash slot and cluster topology calculator", long_about = None)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value = "15600")]
    port: u16,

    /// Route prefix the server mounts cluster endpoints under
    #[arg(long, default_value = "/api/cluster")]
    prefix: String,

    /// Command to execute (if not in interactive mode)
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

struct KeyslotClient {
    base_url: String,
    prefix: String,
    client: reqwest::Client,
}

impl KeyslotClient {
    fn new(host: &str, port: u16, prefix: &str) -> Self {
        Self {
            base_url: format!("http://{}:{}", host, port),
            prefix: prefix.trim_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build an endpoint URL, percent-encoding every segment so keys
    /// containing `{`, `}` or `/` survive the trip.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid server address")?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("server address cannot carry a path"))?;
            path.clear();
            path.extend(self.prefix.split('/').filter(|s| !s.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }

    async fn execute_command(&self, command: &str, args: &[String]) -> Result<String> {
        let start = Instant::now();

        let response = match command.to_uppercase().as_str() {
            "SLOT" | "KEYSLOT" => self.cmd_slot(args).await?,
            "ANALYZE" => self.cmd_analyze(args).await?,
            "TOPOLOGY" => self.cmd_topology(args).await?,
            "ROUTE" => self.cmd_route(args).await?,
            "HEALTH" | "PING" => self.cmd_health().await?,
            "HELP" => help_text(),
            _ => return Err(anyhow::anyhow!("Unknown command: {}", command)),
        };

        let elapsed = start.elapsed();
        Ok(format!(
            "{}\n{}",
            response,
            format!("({:.2?})", elapsed).dimmed()
        ))
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let res = self.client.get(url).send().await?;
        read_body(res).await
    }

    async fn cmd_slot(&self, args: &[String]) -> Result<String> {
        if args.len() != 1 {
            return Err(anyhow::anyhow!("Usage: SLOT key"));
        }
        let body = self.get_json(self.url(&["slot", args[0].as_str()])?).await?;
        Ok(format_slot(&body))
    }

    async fn cmd_analyze(&self, args: &[String]) -> Result<String> {
        if args.is_empty() {
            return Err(anyhow::anyhow!("Usage: ANALYZE key [key ...]"));
        }
        let res = self
            .client
            .post(self.url(&["hash-tag", "analyze"])?)
            .json(&json!(args))
            .send()
            .await?;
        let body = read_body(res).await?;
        Ok(format_analysis(&body))
    }

    async fn cmd_topology(&self, args: &[String]) -> Result<String> {
        let url = match args {
            [] => self.url(&["topology"])?,
            [count] => {
                let count: usize = count
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Usage: TOPOLOGY [master_count]"))?;
                self.url(&["topology", count.to_string().as_str()])?
            }
            _ => return Err(anyhow::anyhow!("Usage: TOPOLOGY [master_count]")),
        };
        let body = self.get_json(url).await?;
        Ok(format_topology(&body))
    }

    async fn cmd_route(&self, args: &[String]) -> Result<String> {
        let (key, masters) = match args {
            [key] => (key, None),
            [key, masters] => {
                let masters: usize = masters
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Usage: ROUTE key [master_count]"))?;
                (key, Some(masters))
            }
            _ => return Err(anyhow::anyhow!("Usage: ROUTE key [master_count]")),
        };

        let mut url = self.url(&["route", key.as_str()])?;
        if let Some(masters) = masters {
            url.query_pairs_mut()
                .append_pair("masters", &masters.to_string());
        }
        let body = self.get_json(url).await?;
        Ok(format!(
            "{}\n{} {} ({})",
            format_slot(&body),
            "master:".bold(),
            body["master"]["nodeId"].as_str().unwrap_or("?"),
            body["master"]["address"].as_str().unwrap_or("?")
        ))
    }

    async fn cmd_health(&self) -> Result<String> {
        let url = Url::parse(&format!("{}/health", self.base_url))?;
        let body = self.get_json(url).await?;
        Ok(format!(
            "{} {} v{}",
            body["status"].as_str().unwrap_or("unknown").green(),
            body["service"].as_str().unwrap_or("?"),
            body["version"].as_str().unwrap_or("?")
        ))
    }
}

/// Turn a non-2xx response into an error carrying the server's message
async fn read_body(res: reqwest::Response) -> Result<Value> {
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    if status.is_success() {
        Ok(body)
    } else {
        Err(anyhow::anyhow!(
            "Error ({}): {}",
            status.as_u16(),
            body["error"].as_str().unwrap_or("Unknown")
        ))
    }
}

fn format_slot(body: &Value) -> String {
    let tag = match body["hashTag"].as_str() {
        Some(tag) => format!("{{{}}}", tag).cyan().to_string(),
        None => "(no hash tag)".dimmed().to_string(),
    };
    format!(
        "\"{}\" -> (integer) {} {}",
        body["key"].as_str().unwrap_or_default(),
        body["slot"],
        tag
    )
}

fn format_analysis(body: &Value) -> String {
    let count = body["keys"].as_array().map(Vec::len).unwrap_or(0);
    if body["coLocated"].as_bool().unwrap_or(false) {
        format!(
            "{} {} keys share hash tag {{{}}} in slot {}",
            "CO-LOCATED".green().bold(),
            count,
            body["hashTag"].as_str().unwrap_or_default(),
            body["slot"]
        )
    } else {
        format!(
            "{} {} keys do not share an explicit hash tag",
            "NOT CO-LOCATED".yellow().bold(),
            count
        )
    }
}

fn format_topology(body: &Value) -> String {
    let mut lines = vec![format!(
        "{} masters, {} replicas, {} slots",
        body["masterCount"], body["replicaCount"], body["totalSlots"]
    )];

    for node in body["nodes"].as_array().into_iter().flatten() {
        let id = node["nodeId"].as_str().unwrap_or("?");
        let address = node["address"].as_str().unwrap_or("?");
        let line = if node["role"] == "master" {
            format!(
                "  {:<8} {:<24} {:<22} slots {}-{}",
                "master".bold(),
                id,
                address,
                node["slotRangeStart"],
                node["slotRangeEnd"]
            )
        } else {
            format!(
                "  {:<8} {:<24} {:<22} replicates {}",
                "replica".dimmed(),
                id,
                address,
                node["pairedWith"].as_str().unwrap_or("?")
            )
        };
        lines.push(line);
    }

    lines.join("\n")
}

fn help_text() -> String {
    format!(
        r#"{}

{}
  SLOT key                   Hash slot of key (CRC16 mod 16384)
  ANALYZE key [key ...]      Check whether keys share a hash tag

{}
  TOPOLOGY [master_count]    Balanced layout (default 3 masters)
  ROUTE key [master_count]   Master that owns the key's slot

{}
  HEALTH                     Server status
  HELP                       Show this help
  QUIT | EXIT                Leave interactive mode"#,
        "Keyslot CLI Commands".bold().underline(),
        "Slots:".bold(),
        "Topology:".bold(),
        "Other:".bold()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for CLI output
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_target(false)
        .with_level(false)
        .without_time()
        .init();

    let args = Args::parse();
    let client = KeyslotClient::new(&args.host, args.port, &args.prefix);

    if !args.command.is_empty() {
        // Command mode: execute single command and exit
        let cmd = &args.command[0];
        let cmd_args: Vec<String> = args.command[1..].to_vec();

        match client.execute_command(cmd, &cmd_args).await {
            Ok(output) => {
                info!("{}", output);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "{}", format!("Error: {}", e).red());
                std::process::exit(1);
            }
        }
    } else {
        run_interactive(client, &args.host, args.port).await
    }
}

async fn run_interactive(client: KeyslotClient, host: &str, port: u16) -> Result<()> {
    info!(
        "{}",
        format!("Keyslot CLI v{}", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
    info!("Connected to {}:{}", host, port);
    info!("Type {} for available commands\n", "HELP".bold());

    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("{}> ", format!("keyslot {}:{}", host, port).green());

        match rl.readline(&prompt) {
            Ok(line) => {
                let parts: Vec<String> = line.split_whitespace().map(String::from).collect();
                let Some((cmd, args)) = parts.split_first() else {
                    continue;
                };

                rl.add_history_entry(&line)?;

                if cmd.eq_ignore_ascii_case("QUIT") || cmd.eq_ignore_ascii_case("EXIT") {
                    info!("Goodbye!");
                    break;
                }

                match client.execute_command(cmd, args).await {
                    Ok(output) => info!("{}", output),
                    Err(e) => {
                        error!(error = %e, "{}", format!("Error: {}", e).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                info!("Goodbye!");
                break;
            }
            Err(err) => {
                error!(error = ?err, "Readline error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_key_segments() {
        let client = KeyslotClient::new("127.0.0.1", 15600, "/api/cluster/");
        let url = client.url(&["slot", "foo{bar}/baz"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:15600/api/cluster/slot/foo%7Bbar%7D%2Fbaz"
        );
    }

    #[test]
    fn test_url_without_prefix() {
        let client = KeyslotClient::new("localhost", 8080, "/");
        let url = client.url(&["topology", "5"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/topology/5");
    }

    #[test]
    fn test_format_slot() {
        colored::control::set_override(false);
        let out = format_slot(&json!({"key": "foo{bar}", "slot": 5061, "hashTag": "bar"}));
        assert_eq!(out, "\"foo{bar}\" -> (integer) 5061 {bar}");

        let out = format_slot(&json!({"key": "foo", "slot": 12182, "hashTag": null}));
        assert_eq!(out, "\"foo\" -> (integer) 12182 (no hash tag)");
    }

    #[test]
    fn test_format_analysis() {
        colored::control::set_override(false);
        let out = format_analysis(&json!({
            "keys": ["{u}1", "{u}2"], "hashTag": "u", "coLocated": true, "slot": 42
        }));
        assert_eq!(out, "CO-LOCATED 2 keys share hash tag {u} in slot 42");

        let out = format_analysis(&json!({
            "keys": ["a", "b"], "hashTag": null, "coLocated": false, "slot": null
        }));
        assert!(out.starts_with("NOT CO-LOCATED 2 keys"));
    }

    #[test]
    fn test_format_topology_lists_every_node() {
        colored::control::set_override(false);
        let out = format_topology(&json!({
            "masterCount": 3, "replicaCount": 3, "totalSlots": 16384,
            "nodes": [
                {"nodeId": "master-0", "address": "127.0.0.1:7000", "role": "master",
                 "slotRangeStart": 0, "slotRangeEnd": 5461, "pairedWith": "master-0-replica"},
                {"nodeId": "master-0-replica", "address": "127.0.0.1:7003", "role": "replica",
                 "slotRangeStart": null, "slotRangeEnd": null, "pairedWith": "master-0"}
            ]
        }));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "3 masters, 3 replicas, 16384 slots");
        assert!(lines[1].contains("slots 0-5461"));
        assert!(lines[2].contains("replicates master-0"));
    }
}
