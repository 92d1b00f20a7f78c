// # porkbunctl - Porkbun glue/DNS record host
//
// Thin command-line host around porkbun-core and porkbun-client. It plays
// the orchestrator's part: it keeps tracked state in a file, plans each
// change against it and drives the lifecycle controllers.
//
// The host is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Refreshing tracked state and applying the planned action
// 4. Cancelling the in-flight call on SIGINT/SIGTERM
//
// ## Configuration
//
// - `PORKBUN_API_KEY`, `PORKBUN_SECRET_API_KEY`: API credentials
// - `PORKBUN_BASE_URL`: API base URL (default: https://api.porkbun.com/api/json/v3)
// - `PORKBUN_TIMEOUT_SECS`: Per-request timeout (default: 30)
// - `PORKBUN_STATE_PATH`: Tracked state file (default: porkbun-state.json)
// - `PORKBUN_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export PORKBUN_API_KEY=pk1_...
// export PORKBUN_SECRET_API_KEY=sk1_...
//
// porkbunctl glue apply ns1 --domain example.com --subdomain ns1 --ip 192.0.2.1 --ip 2001:db8::1
// porkbunctl dns apply www --domain example.com --name www --type A --content 192.0.2.10
// porkbunctl refresh
// porkbunctl destroy porkbun_glue_record.ns1
// ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use porkbun_client::PorkbunClient;
use porkbun_core::lifecycle::guarded;
use porkbun_core::traits::{
    GlueRecord, PlanAction, ReadOutcome, Resource, ResourceState, StateStore,
};
use porkbun_core::{
    DEFAULT_BASE_URL, DnsRecordPlan, DnsRecordResource, DnsRecordState, ErrorKind,
    FileStateStore, GlueRecordPlan, GlueRecordResource, GlueRecordState, ProviderConfig,
    RegistrarApi,
};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error (registrar, network, cancellation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PorkbunctlExitCode {
    /// Command completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<PorkbunctlExitCode> for ExitCode {
    fn from(code: PorkbunctlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "porkbunctl", version, about = "Manage Porkbun glue and DNS records")]
struct Cli {
    /// Porkbun API key
    #[arg(long, env = "PORKBUN_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Porkbun secret API key
    #[arg(long, env = "PORKBUN_SECRET_API_KEY", hide_env_values = true, global = true)]
    secret_api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "PORKBUN_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "PORKBUN_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Tracked state file
    #[arg(long, env = "PORKBUN_STATE_PATH", default_value = "porkbun-state.json", global = true)]
    state_path: PathBuf,

    /// Log level
    #[arg(long, env = "PORKBUN_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage glue records
    Glue {
        #[command(subcommand)]
        action: GlueCommand,
    },
    /// Manage DNS records
    Dns {
        #[command(subcommand)]
        action: DnsCommand,
    },
    /// Show or replace a domain's nameservers
    Ns {
        #[command(subcommand)]
        action: NsCommand,
    },
    /// Re-read every tracked resource and forget those gone upstream
    Refresh,
    /// Delete a tracked resource and forget it
    Destroy {
        /// Resource address, e.g. porkbun_glue_record.ns1
        address: String,
    },
    /// List tracked resources
    List,
}

#[derive(Debug, Subcommand)]
enum GlueCommand {
    /// Create or update a glue record
    Apply {
        /// Label of the tracked resource
        label: String,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        subdomain: String,
        /// Nameserver address (repeatable)
        #[arg(long = "ip", required = true)]
        ips: Vec<String>,
    },
    /// Start tracking an existing glue record (`domain:subdomain`)
    Import { label: String, id: String },
    /// Print every glue host of a domain
    Show { domain: String },
}

#[derive(Debug, Subcommand)]
enum DnsCommand {
    /// Create or update a DNS record
    Apply {
        /// Label of the tracked resource
        label: String,
        #[arg(long)]
        domain: String,
        /// Record label; empty for the apex
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        ttl: Option<u32>,
        #[arg(long)]
        prio: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Start tracking an existing DNS record (`domain:id`)
    Import { label: String, id: String },
}

#[derive(Debug, Subcommand)]
enum NsCommand {
    /// Print the nameservers of a domain
    Show { domain: String },
    /// Replace the nameservers of a domain
    Set {
        domain: String,
        #[arg(required = true)]
        nameservers: Vec<String>,
    },
}

/// Mapping between a controller's state and the tracked-state enum
trait Tracked: Sized {
    fn into_resource(self) -> ResourceState;
    fn from_resource(resource: ResourceState) -> Option<Self>;
}

impl Tracked for GlueRecordState {
    fn into_resource(self) -> ResourceState {
        ResourceState::GlueRecord(self)
    }

    fn from_resource(resource: ResourceState) -> Option<Self> {
        match resource {
            ResourceState::GlueRecord(state) => Some(state),
            _ => None,
        }
    }
}

impl Tracked for DnsRecordState {
    fn into_resource(self) -> ResourceState {
        ResourceState::DnsRecord(self)
    }

    fn from_resource(resource: ResourceState) -> Option<Self> {
        match resource {
            ResourceState::DnsRecord(state) => Some(state),
            _ => None,
        }
    }
}

/// Everything a command needs
struct Host {
    registrar: Option<Arc<dyn RegistrarApi>>,
    store: FileStateStore,
    cancel: CancellationToken,
}

impl Host {
    fn registrar(&self) -> Result<Arc<dyn RegistrarApi>> {
        self.registrar
            .clone()
            .ok_or_else(|| anyhow!(porkbun_core::Error::config("Porkbun API credentials are not set")))
    }

    fn glue(&self) -> Result<GlueRecordResource> {
        Ok(GlueRecordResource::new(self.registrar()?))
    }

    fn dns(&self) -> Result<DnsRecordResource> {
        Ok(DnsRecordResource::new(self.registrar()?))
    }
}

/// Tracked-state address of a resource
fn address(type_name: &str, label: &str) -> String {
    format!("{}.{}", type_name, label)
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn provider_config(cli: &Cli) -> Option<ProviderConfig> {
    match (&cli.api_key, &cli.secret_api_key) {
        (Some(api_key), Some(secret_api_key)) => Some(
            ProviderConfig::new(api_key.clone(), secret_api_key.clone())
                .with_base_url(cli.base_url.clone())
                .with_timeout_secs(cli.timeout_secs),
        ),
        _ => None,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_level) = parse_log_level(&cli.log_level) else {
        eprintln!(
            "Configuration error: PORKBUN_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return PorkbunctlExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PorkbunctlExitCode::ConfigError.into();
    }

    let registrar: Option<Arc<dyn RegistrarApi>> = match provider_config(&cli).map(PorkbunClient::new) {
        Some(Ok(client)) => Some(Arc::new(client)),
        Some(Err(e)) => {
            error!("{}", e);
            return PorkbunctlExitCode::ConfigError.into();
        }
        None => None,
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PorkbunctlExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async move {
        let store = match FileStateStore::new(&cli.state_path).await {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to open state file {}: {}", cli.state_path.display(), e);
                return PorkbunctlExitCode::ConfigError;
            }
        };

        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

        let host = Host {
            registrar,
            store,
            cancel,
        };

        match execute(cli.command, &host).await {
            Ok(()) => PorkbunctlExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    })
    .into()
}

fn exit_code_for(error: &anyhow::Error) -> PorkbunctlExitCode {
    match error.downcast_ref::<porkbun_core::Error>() {
        Some(porkbun_core::Error::Config(_)) => PorkbunctlExitCode::ConfigError,
        _ => PorkbunctlExitCode::RuntimeError,
    }
}

async fn execute(command: Command, host: &Host) -> Result<()> {
    match command {
        Command::Glue { action } => match action {
            GlueCommand::Apply {
                label,
                domain,
                subdomain,
                ips,
            } => {
                let resource = host.glue()?;
                let address = address(resource.type_name(), &label);
                let plan = GlueRecordPlan::new(domain, subdomain, ips);
                apply(&resource, host, &address, &plan).await
            }
            GlueCommand::Import { label, id } => {
                let resource = host.glue()?;
                let address = address(resource.type_name(), &label);
                import(&resource, host, &address, &id).await
            }
            GlueCommand::Show { domain } => {
                let registrar = host.registrar()?;
                for record in glue_records(registrar.as_ref(), &domain, &host.cancel).await? {
                    println!("{}\t{}", record.host, record.ips.join(","));
                }
                Ok(())
            }
        },
        Command::Dns { action } => match action {
            DnsCommand::Apply {
                label,
                domain,
                name,
                record_type,
                content,
                ttl,
                prio,
                notes,
            } => {
                let resource = host.dns()?;
                let address = address(resource.type_name(), &label);
                let plan = DnsRecordPlan {
                    domain,
                    name,
                    record_type,
                    content,
                    ttl,
                    prio,
                    notes,
                };
                apply(&resource, host, &address, &plan).await
            }
            DnsCommand::Import { label, id } => {
                let resource = host.dns()?;
                let address = address(resource.type_name(), &label);
                import(&resource, host, &address, &id).await
            }
        },
        Command::Ns { action } => {
            let registrar = host.registrar()?;
            match action {
                NsCommand::Show { domain } => {
                    for nameserver in nameservers(registrar.as_ref(), &domain, &host.cancel).await? {
                        println!("{}", nameserver);
                    }
                }
                NsCommand::Set {
                    domain,
                    nameservers,
                } => {
                    set_nameservers(registrar.as_ref(), &domain, &nameservers, &host.cancel).await?;
                    info!("Nameservers of {} set to {:?}", domain, nameservers);
                }
            }
            Ok(())
        }
        Command::Refresh => refresh(host).await,
        Command::Destroy { address } => destroy(host, &address).await,
        Command::List => {
            for address in host.store.list().await? {
                if let Some(record) = host.store.get(&address).await? {
                    println!(
                        "{}\t{}\t{}",
                        address,
                        record.resource.id(),
                        record.last_refreshed.to_rfc3339()
                    );
                }
            }
            Ok(())
        }
    }
}

async fn glue_records(
    registrar: &dyn RegistrarApi,
    domain: &str,
    cancel: &CancellationToken,
) -> porkbun_core::Result<Vec<GlueRecord>> {
    guarded(cancel, "get glue records", registrar.get_glue_records(domain)).await
}

async fn nameservers(
    registrar: &dyn RegistrarApi,
    domain: &str,
    cancel: &CancellationToken,
) -> porkbun_core::Result<Vec<String>> {
    guarded(cancel, "get nameservers", registrar.get_nameservers(domain)).await
}

async fn set_nameservers(
    registrar: &dyn RegistrarApi,
    domain: &str,
    nameservers: &[String],
    cancel: &CancellationToken,
) -> porkbun_core::Result<()> {
    guarded(
        cancel,
        "update nameservers",
        registrar.update_nameservers(domain, nameservers),
    )
    .await
}

/// Tracked state of `address`, refreshed against the registrar
///
/// A resource gone upstream is forgotten and reported as untracked.
async fn refreshed<R>(resource: &R, host: &Host, address: &str) -> Result<Option<R::State>>
where
    R: Resource,
    R::State: Tracked,
{
    let Some(record) = host.store.get(address).await? else {
        return Ok(None);
    };

    let prior = R::State::from_resource(record.resource)
        .ok_or_else(|| anyhow!("{} tracks a different resource type", address))?;

    match resource.read(&prior, &host.cancel).await? {
        ReadOutcome::Present(state) => Ok(Some(state)),
        ReadOutcome::Gone => {
            warn!("{} no longer exists upstream; forgetting it", address);
            host.store.remove(address).await?;
            Ok(None)
        }
    }
}

async fn apply<R>(resource: &R, host: &Host, address: &str, desired: &R::Plan) -> Result<()>
where
    R: Resource,
    R::State: Tracked,
{
    let prior = refreshed(resource, host, address).await?;
    let action = resource.plan(prior.as_ref(), desired);
    info!("{}: {:?}", address, action);

    let state = match (action, prior) {
        (PlanAction::NoOp, Some(prior)) => prior,
        (PlanAction::Update, Some(prior)) => resource.update(desired, &prior, &host.cancel).await?,
        (PlanAction::Replace, Some(prior)) => {
            resource.delete(&prior, &host.cancel).await?;
            host.store.remove(address).await?;
            resource.create(desired, &host.cancel).await?
        }
        _ => resource.create(desired, &host.cancel).await?,
    };

    host.store.put(address, state.into_resource()).await?;
    Ok(())
}

async fn import<R>(resource: &R, host: &Host, address: &str, id: &str) -> Result<()>
where
    R: Resource,
    R::State: Tracked,
{
    if host.store.get(address).await?.is_some() {
        return Err(anyhow!("{} is already tracked", address));
    }

    let seeded = resource.import(id)?;
    match resource.read(&seeded, &host.cancel).await? {
        ReadOutcome::Present(state) => {
            host.store.put(address, state.into_resource()).await?;
            info!("Imported {} as {}", id, address);
            Ok(())
        }
        ReadOutcome::Gone => Err(anyhow!("Cannot import non-existent remote object {}", id)),
    }
}

async fn refresh(host: &Host) -> Result<()> {
    let mut failed = 0usize;

    for address in host.store.list().await? {
        let result = match address.split_once('.').map(|(type_name, _)| type_name) {
            Some(GlueRecordResource::TYPE_NAME) => {
                refresh_one(&host.glue()?, host, &address).await
            }
            Some(DnsRecordResource::TYPE_NAME) => refresh_one(&host.dns()?, host, &address).await,
            _ => Err(anyhow!("Unknown resource type in address {}", address)),
        };

        if let Err(e) = result {
            if e
                .downcast_ref::<porkbun_core::Error>()
                .is_some_and(|e| e.kind() == ErrorKind::Cancelled)
            {
                return Err(e);
            }
            error!("Failed to refresh {}: {:#}", address, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} resource(s) failed to refresh", failed));
    }
    Ok(())
}

async fn refresh_one<R>(resource: &R, host: &Host, address: &str) -> Result<()>
where
    R: Resource,
    R::State: Tracked,
{
    if let Some(state) = refreshed(resource, host, address).await? {
        host.store.put(address, state.into_resource()).await?;
        info!("{} refreshed", address);
    }
    Ok(())
}

async fn destroy(host: &Host, address: &str) -> Result<()> {
    let record = host
        .store
        .get(address)
        .await?
        .with_context(|| format!("{} is not tracked", address))?;

    match record.resource {
        ResourceState::GlueRecord(state) => host.glue()?.delete(&state, &host.cancel).await?,
        ResourceState::DnsRecord(state) => host.dns()?.delete(&state, &host.cancel).await?,
    }

    host.store.remove(address).await?;
    info!("{} destroyed", address);
    Ok(())
}

/// Cancel `cancel` on SIGTERM or SIGINT
#[cfg(unix)]
async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to set up signal handlers: {}", e);
            return;
        }
    };

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    warn!("Received {}; cancelling in-flight operation", signal);
    cancel.cancel();
}

/// Cancel `cancel` on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received CTRL-C; cancelling in-flight operation");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to wait for CTRL-C: {}", e),
    }
}
