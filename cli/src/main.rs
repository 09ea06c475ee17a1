use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shavelog::api::{ApiError, Envelope, Resource};
use shavelog::config::{ClientConfig, Timeouts};
use shavelog::context::AppContext;
use shavelog::model::{
    CreateBladeRequest, CreateRazorRequest, CreateUsageRecordRequest, EntityId, PageParams,
};
use shavelog::store::{ResourceStore, StoreError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("backend reported failure: {0}")]
    Backend(String),
}

#[derive(Parser, Debug)]
#[command(name = "shavelog", about = "Shaving equipment tracker CLI")]
struct Cli {
    #[arg(long, env = "SHAVELOG_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SHAVELOG_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Print the raw response envelope instead of the store contents.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check `/health` on the backend.
    Ping,
    Dashboard,
    Statistics,
    Razors(RazorCommand),
    Blades(BladeCommand),
    Records(RecordCommand),
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
}

impl PageArgs {
    fn params(self) -> Option<PageParams> {
        if self.page.is_none() && self.page_size.is_none() {
            return None;
        }
        Some(PageParams { page: self.page, page_size: self.page_size })
    }
}

#[derive(Args, Debug)]
struct RazorCommand {
    #[command(subcommand)]
    command: RazorSubcommand,
}

#[derive(Subcommand, Debug)]
enum RazorSubcommand {
    List(PageArgs),
    Get {
        id: EntityId,
    },
    Create {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        model: String,
        #[arg(long, value_parser = parse_time)]
        purchase_date: Option<DateTime<Utc>>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    Update {
        id: EntityId,
        /// JSON object with the fields to change.
        #[arg(long)]
        data: String,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Args, Debug)]
struct BladeCommand {
    #[command(subcommand)]
    command: BladeSubcommand,
}

#[derive(Subcommand, Debug)]
enum BladeSubcommand {
    List(PageArgs),
    Get {
        id: EntityId,
    },
    Create(BladeCreateArgs),
    Update {
        id: EntityId,
        /// JSON object with the fields to change.
        #[arg(long)]
        data: String,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Args, Debug)]
struct BladeCreateArgs {
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    /// Comma-separated razor ids this blade fits.
    #[arg(long, value_delimiter = ',')]
    compatible: Vec<EntityId>,
    #[arg(long, value_parser = parse_time)]
    purchase_date: Option<DateTime<Utc>>,
    #[arg(long)]
    unit_price: Option<f64>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    notes: Option<String>,
}

impl BladeCreateArgs {
    /// Compatibility is only sent when `--compatible` was given.
    fn into_request(self) -> CreateBladeRequest {
        let mut request = CreateBladeRequest::new(self.brand, self.model);
        if !self.compatible.is_empty() {
            request = request.with_compatible_razors(&self.compatible);
        }
        CreateBladeRequest {
            purchase_date: self.purchase_date,
            unit_price: self.unit_price,
            total_quantity: self.quantity,
            remaining_quantity: self.quantity,
            notes: self.notes,
            ..request
        }
    }
}

#[derive(Args, Debug)]
struct RecordCommand {
    #[command(subcommand)]
    command: RecordSubcommand,
}

#[derive(Subcommand, Debug)]
enum RecordSubcommand {
    List(PageArgs),
    Get {
        id: EntityId,
    },
    Create {
        #[arg(long)]
        razor_id: EntityId,
        #[arg(long)]
        blade_id: EntityId,
        /// RFC 3339 timestamp; defaults to now.
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long)]
        blade_usage_count: Option<u32>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long, default_value_t = false)]
        need_blade_change: bool,
    },
    Update {
        id: EntityId,
        /// JSON object with the fields to change.
        #[arg(long)]
        data: String,
    },
    Delete {
        id: EntityId,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.base_url.as_deref(), cli.timeout_secs)?;
    tracing::debug!(
        base_url = %config.base_url,
        timeout_secs = config.timeouts.request_secs,
        connect_timeout_secs = config.timeouts.connect_secs,
        "resolved client config"
    );
    let ctx = AppContext::from_config(&config)?;

    match cli.command {
        Command::Ping => run_ping(&ctx, cli.json).await,
        Command::Dashboard => run_dashboard(&ctx, cli.json).await,
        Command::Statistics => run_statistics(&ctx, cli.json).await,
        Command::Razors(razors) => run_razors(&ctx, razors, cli.json).await,
        Command::Blades(blades) => run_blades(&ctx, blades, cli.json).await,
        Command::Records(records) => run_records(&ctx, records, cli.json).await,
    }
}

/// Flags win over the environment; `SHAVELOG_BASE_URL` is only read when
/// `--base-url` is absent.
fn resolve_config(base_url: Option<&str>, timeout_secs: Option<u64>) -> Result<ClientConfig, CliError> {
    let mut config = match base_url {
        Some(url) => ClientConfig::new(url)?.with_timeouts(Timeouts::from_env()),
        None => ClientConfig::from_env()?,
    };
    if let Some(secs) = timeout_secs {
        if secs == 0 {
            return Err(CliError::Config("--timeout-secs must be positive".to_owned()));
        }
        config.timeouts.request_secs = secs;
    }
    Ok(config)
}

async fn run_ping(ctx: &AppContext, json: bool) -> Result<(), CliError> {
    let envelope = ctx.client.health().await?;
    if json {
        return print_json(&envelope);
    }
    match envelope.data {
        Some(health) if envelope.success && health.is_healthy() => {
            println!("ok");
            Ok(())
        }
        _ => Err(CliError::Backend(envelope.failure_reason())),
    }
}

async fn run_dashboard(ctx: &AppContext, json: bool) -> Result<(), CliError> {
    let envelope = ctx.statistics.fetch_dashboard().await?;
    if json {
        return print_json(&envelope);
    }
    ensure_success(&envelope)?;
    print_json(&ctx.statistics.dashboard())
}

async fn run_statistics(ctx: &AppContext, json: bool) -> Result<(), CliError> {
    let envelope = ctx.statistics.fetch_statistics().await?;
    if json {
        return print_json(&envelope);
    }
    ensure_success(&envelope)?;
    print_json(&ctx.statistics.statistics())
}

async fn run_razors(ctx: &AppContext, razors: RazorCommand, json: bool) -> Result<(), CliError> {
    let store = &ctx.razors;
    match razors.command {
        RazorSubcommand::List(page) => run_list(store, page, json).await,
        RazorSubcommand::Get { id } => run_get(store, id, json).await,
        RazorSubcommand::Create { brand, model, purchase_date, price, notes } => {
            let payload = CreateRazorRequest { purchase_date, price, notes, ..CreateRazorRequest::new(brand, model) };
            let envelope = store.create(&payload).await?;
            print_mutation(store, &envelope, json)
        }
        RazorSubcommand::Update { id, data } => run_update(store, id, &data, json).await,
        RazorSubcommand::Delete { id } => run_delete(store, id, json).await,
    }
}

async fn run_blades(ctx: &AppContext, blades: BladeCommand, json: bool) -> Result<(), CliError> {
    let store = &ctx.blades;
    match blades.command {
        BladeSubcommand::List(page) => run_list(store, page, json).await,
        BladeSubcommand::Get { id } => run_get(store, id, json).await,
        BladeSubcommand::Create(args) => {
            let envelope = store.create(&args.into_request()).await?;
            print_mutation(store, &envelope, json)
        }
        BladeSubcommand::Update { id, data } => run_update(store, id, &data, json).await,
        BladeSubcommand::Delete { id } => run_delete(store, id, json).await,
    }
}

async fn run_records(ctx: &AppContext, records: RecordCommand, json: bool) -> Result<(), CliError> {
    let store = &ctx.usage_records;
    match records.command {
        RecordSubcommand::List(page) => run_list(store, page, json).await,
        RecordSubcommand::Get { id } => run_get(store, id, json).await,
        RecordSubcommand::Create { razor_id, blade_id, at, rating, blade_usage_count, experience, need_blade_change } => {
            let payload = CreateUsageRecordRequest {
                blade_usage_count,
                rating,
                experience_text: experience,
                need_blade_change: need_blade_change.then_some(true),
                ..CreateUsageRecordRequest::new(at.unwrap_or_else(Utc::now), razor_id, blade_id)
            };
            let envelope = store.create(&payload).await?;
            print_mutation(store, &envelope, json)
        }
        RecordSubcommand::Update { id, data } => run_update(store, id, &data, json).await,
        RecordSubcommand::Delete { id } => run_delete(store, id, json).await,
    }
}

/// Store contents printed after list and mutation commands.
#[derive(Serialize)]
struct ListView<'a, T> {
    total: u64,
    items: &'a [T],
}

async fn run_list<R: Resource>(store: &ResourceStore<R>, page: PageArgs, json: bool) -> Result<(), CliError> {
    let envelope = store.fetch_list(page.params()).await?;
    if json {
        return print_json(&envelope);
    }
    ensure_success(&envelope)?;
    print_store(store)
}

async fn run_get<R: Resource>(store: &ResourceStore<R>, id: EntityId, json: bool) -> Result<(), CliError> {
    let envelope = store.fetch_by_id(id).await?;
    if json {
        return print_json(&envelope);
    }
    ensure_success(&envelope)?;
    print_json(&store.current())
}

async fn run_update<R>(store: &ResourceStore<R>, id: EntityId, data: &str, json: bool) -> Result<(), CliError>
where
    R: Resource,
    R::Update: DeserializeOwned,
{
    let patch = serde_json::from_str::<R::Update>(data)?;
    let envelope = store.update(id, &patch).await?;
    print_mutation(store, &envelope, json)
}

async fn run_delete<R: Resource>(store: &ResourceStore<R>, id: EntityId, json: bool) -> Result<(), CliError> {
    let envelope = store.delete(id).await?;
    print_mutation(store, &envelope, json)
}

fn print_mutation<R: Resource, T: Serialize>(
    store: &ResourceStore<R>,
    envelope: &Envelope<T>,
    json: bool,
) -> Result<(), CliError> {
    if json {
        return print_json(envelope);
    }
    print_store(store)
}

fn print_store<R: Resource>(store: &ResourceStore<R>) -> Result<(), CliError> {
    let state = store.snapshot();
    print_json(&ListView { total: state.total, items: &state.items })
}

fn ensure_success<T>(envelope: &Envelope<T>) -> Result<(), CliError> {
    if envelope.success {
        Ok(())
    } else {
        Err(CliError::Backend(envelope.failure_reason()))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|error| format!("expected an RFC 3339 timestamp: {error}"))
}
