//! aval-admin: administrative CLI for the correlativos aval registry.
//!
//! Every command opens the data directory, which takes the directory lock
//! for the duration of the command. Results are printed to stdout as JSON;
//! logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};

use aval_registry::adapters::api_handler::{
    ApiRequest, AvalApiHandler, AvalView, DEFAULT_PAGE_LIMIT,
};
use aval_registry::{
    decode_text, parse_import, AvalFilters, AvalPayload, AvalRegistryApi, DataDirRegistry,
    Paging, RawFilters, ReconciliationApi, RegistryConfig, SequenceApi,
};
use aval_telemetry::{init_logging, TelemetryConfig};

/// Administrative CLI for the correlativos aval registry
#[derive(Parser, Debug)]
#[command(name = "aval-admin", version)]
#[command(about = "Issue, search, edit and void avales; import and counter maintenance")]
struct Cli {
    /// Data directory holding the registry store
    #[arg(long, global = true, env = "AVAL_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Correlativo prefix
    #[arg(long, global = true, env = "AVAL_PREFIX", default_value = "DTI|DSST|AVAL")]
    prefix: String,

    /// Counter namespace consulted on creation
    #[arg(long, global = true, env = "AVAL_SEQUENCE", default_value = "AVAL")]
    sequence: String,

    /// Debug output (repeat for more)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the data directory and provision the counter.
    Init,

    /// Issue a new aval with the next correlativo.
    Create(CreateArgs),

    /// Search the historical log, most recent first.
    List(ListArgs),

    /// Show one aval.
    Get { id: u64 },

    /// Change payload fields of an active aval.
    Edit {
        id: u64,
        /// Field assignment, e.g. `--set cargo=Jefa` (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Void an aval with a reason. Cannot be undone.
    Void {
        id: u64,
        #[arg(long)]
        motivo: String,
    },

    /// Replace every record with the contents of an exported sheet.
    Import {
        file: PathBuf,
        /// Parse and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the counter value.
    Current,

    /// Overwrite the counter value.
    Resync {
        value: u64,
        /// Required acknowledgement; a wrong value can reissue codes
        #[arg(long)]
        confirm: bool,
    },

    /// Run one JSON request through the request boundary (reads stdin when
    /// no request is given).
    Call { request: Option<String> },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Create(_) => "create",
            Command::List(_) => "list",
            Command::Get { .. } => "get",
            Command::Edit { .. } => "edit",
            Command::Void { .. } => "void",
            Command::Import { .. } => "import",
            Command::Current => "current",
            Command::Resync { .. } => "resync",
            Command::Call { .. } => "call",
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CreateArgs {
    #[arg(long)]
    fecha_registro: String,
    #[arg(long)]
    fecha_solicitud: String,
    #[arg(long)]
    direccion: String,
    #[arg(long)]
    unidad: String,
    #[arg(long)]
    solicitante: String,
    #[arg(long)]
    cargo: String,
    #[arg(long)]
    responsable: String,
    #[arg(long)]
    memorando: String,
}

impl From<CreateArgs> for AvalPayload {
    fn from(args: CreateArgs) -> Self {
        AvalPayload {
            fecha_registro: args.fecha_registro,
            fecha_solicitud: args.fecha_solicitud,
            direccion_administrativa: args.direccion,
            unidad_institucion: args.unidad,
            nombre_solicitante: args.solicitante,
            cargo: args.cargo,
            responsable: args.responsable,
            memorando_solicitud: args.memorando,
        }
    }
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    correlativo: Option<String>,
    #[arg(long)]
    solicitante: Option<String>,
    /// Registration date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long)]
    fecha: Option<String>,
    /// ACTIVO or ANULADO
    #[arg(long)]
    estado: Option<String>,
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    match cli.verbose {
        0 => {}
        1 => telemetry = telemetry.with_log_level("debug"),
        _ => telemetry = telemetry.with_log_level("trace"),
    }
    init_logging(&telemetry).context("Failed to initialize logging")?;

    let config = RegistryConfig::default()
        .with_prefix(cli.prefix.clone())
        .with_sequence_name(cli.sequence.clone());

    tracing::info!(
        command = cli.command.name(),
        data_dir = %cli.data_dir.display(),
        sequence = %cli.sequence,
        "Running aval-admin"
    );

    let output = run(&cli, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn open(data_dir: &Path, config: RegistryConfig) -> Result<DataDirRegistry> {
    DataDirRegistry::open(data_dir, config)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to render output")
}

fn run(cli: &Cli, config: RegistryConfig) -> Result<Value> {
    let sequence = config.sequence_name.clone();

    match &cli.command {
        Command::Init => {
            let registry = open(&cli.data_dir, config)?;
            Ok(json!({
                "data_dir": registry.data_dir(),
                "sequence": sequence,
                "value": registry.current_sequence(&sequence)?,
            }))
        }
        Command::Create(args) => {
            let mut registry = open(&cli.data_dir, config)?;
            let payload = AvalPayload::from(args.clone());
            let record = registry.create_aval(&payload)?;
            to_json(&AvalView::from(&record))
        }
        Command::List(args) => {
            let registry = open(&cli.data_dir, config)?;
            let filters = AvalFilters::from(&RawFilters {
                correlativo: args.correlativo.clone(),
                solicitante: args.solicitante.clone(),
                fecha: args.fecha.clone(),
                estado: args.estado.clone(),
            });
            let paging = match (args.limit, args.offset) {
                (None, None) => None,
                (limit, offset) => Some(Paging::new(
                    limit.unwrap_or(DEFAULT_PAGE_LIMIT),
                    offset.unwrap_or(0),
                )),
            };
            let page = registry.list_avales(&filters, paging)?;
            let items: Vec<AvalView> = page.items.iter().map(AvalView::from).collect();
            Ok(json!({ "total": page.total, "items": items }))
        }
        Command::Get { id } => {
            let registry = open(&cli.data_dir, config)?;
            to_json(&AvalView::from(&registry.get_aval(*id)?))
        }
        Command::Edit { id, set } => {
            let mut registry = open(&cli.data_dir, config)?;
            let fields = parse_assignments(set)?;
            let record = registry.edit_fields(*id, &fields)?;
            to_json(&AvalView::from(&record))
        }
        Command::Void { id, motivo } => {
            let mut registry = open(&cli.data_dir, config)?;
            let record = registry.void_aval(*id, motivo)?;
            to_json(&AvalView::from(&record))
        }
        Command::Import { file, dry_run } => {
            let bytes = std::fs::read(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let batch = parse_import(&decode_text(&bytes))
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            if *dry_run {
                tracing::info!(
                    rows = batch.rows.len(),
                    skipped = batch.skipped,
                    max_sequence = batch.max_sequence,
                    "Dry run, nothing written"
                );
                return Ok(json!({
                    "dry_run": true,
                    "rows": batch.rows.len(),
                    "skipped": batch.skipped,
                    "max_sequence": batch.max_sequence,
                }));
            }

            let mut registry = open(&cli.data_dir, config)?;
            let report = registry.reconcile(batch).context("Reconciliation failed")?;
            to_json(&report)
        }
        Command::Current => {
            let registry = open(&cli.data_dir, config)?;
            Ok(json!({ "sequence": sequence, "value": registry.current_sequence(&sequence)? }))
        }
        Command::Resync { value, confirm } => {
            if !confirm {
                bail!("Refusing to overwrite the counter without --confirm");
            }
            let mut registry = open(&cli.data_dir, config)?;
            let previous = registry.current_sequence(&sequence)?;
            tracing::warn!(%sequence, previous, value, "Overwriting counter");
            registry.resync_sequence(&sequence, *value)?;
            Ok(json!({ "sequence": sequence, "previous": previous, "value": value }))
        }
        Command::Call { request } => {
            let raw = match request {
                Some(raw) => raw.clone(),
                None => {
                    let mut raw = String::new();
                    std::io::stdin()
                        .read_to_string(&mut raw)
                        .context("Failed to read request from stdin")?;
                    raw
                }
            };
            let request: ApiRequest =
                serde_json::from_str(&raw).context("Request is not a valid ApiRequest")?;

            let mut registry = open(&cli.data_dir, config)?;
            let mut handler = AvalApiHandler::new(&mut *registry);
            to_json(&handler.handle(request))
        }
    }
}

/// Turn `field=value` pairs into the raw map accepted by the edit path.
fn parse_assignments(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Expected FIELD=VALUE, got {:?}", pair);
        };
        fields.insert(name.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(fields)
}
