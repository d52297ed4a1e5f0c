use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use metrics::counter;
use serde_json::Value;
use shepherd_client::{ClientConfig, ShepherdClient};
use shepherd_core::{Label, Resource, ResourceKind, SortOrder};
use shepherd_kubehub::KubeTransport;
use shepherd_serializer::SerializerFactory;
use tracing::info;

mod render;

#[derive(Parser, Debug)]
#[command(name = "shepctl", version, about = "Shepherd backup/restore CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Namespace (default: current context)
    #[arg(long = "ns", global = true, env = "SHEPHERD_NAMESPACE")]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json, Yaml }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a local JSON/YAML document and print the entity
    Decode {
        file: PathBuf,
        /// Kind to decode as; read from the document when omitted
        #[arg(long)]
        kind: Option<String>,
    },
    /// Decode then re-encode a local document into its canonical wire form
    Encode {
        file: PathBuf,
        #[arg(long)]
        kind: String,
    },
    /// List backups sorted by creation time
    Backups {
        /// Label selector, e.g. "site=123"
        #[arg(long = "selector", short = 'l')]
        selector: Option<String>,
        #[arg(long = "order", default_value = "desc")]
        order: String,
    },
    /// List restores sorted by creation time
    Restores {
        #[arg(long = "selector", short = 'l')]
        selector: Option<String>,
        #[arg(long = "order", default_value = "desc")]
        order: String,
    },
    /// List syncs sorted by creation time
    Syncs {
        #[arg(long = "selector", short = 'l')]
        selector: Option<String>,
        #[arg(long = "order", default_value = "desc")]
        order: String,
    },
    /// Fetch one resource, e.g. `get backup node-1-backup-x`
    Get { kind: String, name: String },
    /// Create the resource described by a local document
    Create { file: PathBuf },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Decode { .. } => "decode",
            Commands::Encode { .. } => "encode",
            Commands::Backups { .. } => "backups",
            Commands::Restores { .. } => "restores",
            Commands::Syncs { .. } => "syncs",
            Commands::Get { .. } => "get",
            Commands::Create { .. } => "create",
        }
    }
}

fn init_tracing() {
    let env = std::env::var("SHEPHERD_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("SHEPHERD_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid SHEPHERD_METRICS_ADDR; expected host:port");
        }
    }
}

/// JSON or YAML; JSON parses as YAML so one reader covers both.
fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_kind(s: &str) -> Result<ResourceKind> {
    Ok(ResourceKind::from_str(s)?)
}

fn parse_selector(s: Option<&str>) -> Result<Option<Label>> {
    s.map(|s| match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok(Label::new(k, v)),
        _ => Err(anyhow!("invalid selector {s:?}; expected key=value")),
    })
    .transpose()
}

fn print_value(output: Output, v: &Value) -> Result<()> {
    match output {
        Output::Yaml => print!("{}", serde_yaml::to_string(v)?),
        Output::Human | Output::Json => println!("{}", serde_json::to_string_pretty(v)?),
    }
    Ok(())
}

fn print_resource(output: Output, r: &Resource) -> Result<()> {
    match output {
        Output::Human => println!("{}", render::summary(r, Utc::now())),
        Output::Json => println!("{}", serde_json::to_string_pretty(r)?),
        Output::Yaml => print!("{}", serde_yaml::to_string(r)?),
    }
    Ok(())
}

fn print_rows<T, F>(output: Output, header: &str, rows: &[&T], row: F) -> Result<()>
where
    T: serde::Serialize,
    F: Fn(&T) -> String,
{
    match output {
        Output::Human => {
            println!("{}", header);
            for r in rows.iter().copied() {
                println!("{}", row(r));
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        Output::Yaml => print!("{}", serde_yaml::to_string(rows)?),
    }
    Ok(())
}

async fn connect(namespace: Option<String>) -> Result<ShepherdClient<KubeTransport>> {
    let transport = KubeTransport::try_default().await.context("connecting to cluster")?;
    let mut config = ClientConfig::from_env();
    config.namespace = namespace.unwrap_or_else(|| transport.default_namespace().to_string());
    info!(ns = %config.namespace, group = %config.api_group, "client ready");
    Ok(ShepherdClient::new(transport, config))
}

async fn get(client: &ShepherdClient<KubeTransport>, kind: ResourceKind, name: &str) -> Result<Option<Resource>> {
    Ok(match kind {
        ResourceKind::Backup => client.get_backup(name).await?.map(Into::into),
        ResourceKind::ScheduledBackup => client.get_schedule(name).await?.map(Into::into),
        ResourceKind::Sync => client.get_sync(name).await?.map(Into::into),
        ResourceKind::ConfigMap => client.get_configmap(name).await?.map(Into::into),
        ResourceKind::Route => client.get_route(name).await?.map(Into::into),
        ResourceKind::NetworkPolicy => client.get_networkpolicy(name).await?.map(Into::into),
        ResourceKind::Hpa => client.get_hpa(name).await?.map(Into::into),
        ResourceKind::StatefulSet => client.get_statefulset(name).await?.map(Into::into),
        other => bail!("get is not supported for {other}"),
    })
}

async fn create(client: &ShepherdClient<KubeTransport>, resource: Resource) -> Result<Resource> {
    Ok(match resource {
        Resource::Backup(b) => client.create_backup(&b).await?.into(),
        Resource::Restore(r) => client.create_restore(&r).await?.into(),
        Resource::ScheduledBackup(s) => client.create_schedule(&s).await?.into(),
        Resource::Sync(s) => client.create_sync(&s).await?.into(),
        Resource::Route(r) => client.create_route(&r).await?.into(),
        Resource::Hpa(h) => client.create_hpa(&h).await?.into(),
        Resource::NetworkPolicy(np) => client.create_networkpolicy(&np).await?.into(),
        other => bail!("create is not supported for {}", other.kind()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    counter!("cli_command_total", 1u64, "command" => cli.command.name());
    let serializer = SerializerFactory::shared();

    match cli.command {
        Commands::Decode { file, kind } => {
            let doc = read_document(&file)?;
            let resource = match kind {
                Some(k) => serializer.decode(&doc, parse_kind(&k)?)?,
                None => serializer.decode_any(&doc)?,
            };
            print_resource(cli.output, &resource)?;
        }
        Commands::Encode { file, kind } => {
            let doc = read_document(&file)?;
            let resource = serializer.decode(&doc, parse_kind(&kind)?)?;
            print_value(cli.output, &serializer.encode(&resource)?)?;
        }
        Commands::Backups { selector, order } => {
            let order = SortOrder::from_str(&order)?;
            let selector = parse_selector(selector.as_deref())?;
            let client = connect(cli.namespace).await?;
            let list = client.list_backup(selector.as_ref()).await?;
            let now = Utc::now();
            print_rows(cli.output, render::BACKUP_HEADER, &list.backups_by_created_time(order), |b| render::backup_row(b, now))?;
        }
        Commands::Restores { selector, order } => {
            let order = SortOrder::from_str(&order)?;
            let selector = parse_selector(selector.as_deref())?;
            let client = connect(cli.namespace).await?;
            let list = client.list_restore(selector.as_ref()).await?;
            let now = Utc::now();
            print_rows(cli.output, render::BACKUP_HEADER, &list.restores_by_created_time(order), |r| render::backup_row(r, now))?;
        }
        Commands::Syncs { selector, order } => {
            let order = SortOrder::from_str(&order)?;
            let selector = parse_selector(selector.as_deref())?;
            let client = connect(cli.namespace).await?;
            let list = client.list_sync(selector.as_ref()).await?;
            let now = Utc::now();
            print_rows(cli.output, render::SYNC_HEADER, &list.syncs_by_created_time(order), |s| render::sync_row(s, now))?;
        }
        Commands::Get { kind, name } => {
            let kind = parse_kind(&kind)?;
            let client = connect(cli.namespace).await?;
            match get(&client, kind, &name).await? {
                Some(r) => print_resource(cli.output, &r)?,
                None => bail!("{kind} {name} not found"),
            }
        }
        Commands::Create { file } => {
            let doc = read_document(&file)?;
            let resource = serializer.decode_any(&doc)?;
            let client = connect(cli.namespace).await?;
            let created = create(&client, resource).await?;
            info!(kind = %created.kind(), name = created.name().unwrap_or("-"), "created");
            print_resource(cli.output, &created)?;
        }
    }

    Ok(())
}
