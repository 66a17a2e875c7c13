//! FleetDesk - command-line admin console for the vehicle-service platform.
//!
//! Lists and edits fleet data through the cached resource clients in
//! `fleetdesk-core`. Set `FLEETDESK_TOKEN` (or pass `--token`) after
//! running `fleetdesk login`.

mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleetdesk_core::config::TOKEN_ENV;
use fleetdesk_core::models::{
    AdminRequest, CustomerUpdate, OfferImage, OfferRequest, SocialLinkUpdate, StaticContent,
    SupportReply, VehicleUpdate,
};
use fleetdesk_core::{
    ApiClient, ApiError, Config, Console, ListParams, ResourceClient, Sort, SortDirection,
};

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "fleetdesk")]
#[command(about = "Admin console for the vehicle-service platform API")]
#[command(version)]
struct Cli {
    /// Bearer token (default: $FLEETDESK_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Path to config file (default: $XDG_CONFIG_HOME/fleetdesk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print a bearer token
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Revoke the current token
    Logout,
    /// List a collection
    List {
        resource: Resource,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// List a collection repeatedly, showing whether each answer came from the cache
    Watch {
        resource: Resource,
        /// Seconds between requests
        #[arg(long, default_value_t = 30)]
        interval: u64,
        /// Number of requests to make
        #[arg(long, default_value_t = 10)]
        count: u32,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Replace a record with a JSON body
    Update {
        resource: Resource,
        id: String,
        /// JSON object, e.g. '{"admin_response": "Done", "status": "resolved"}'
        #[arg(long)]
        data: String,
    },
    /// Create a record from a JSON body
    Create {
        resource: Resource,
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete { resource: Resource, id: String },
    /// Services per month
    Monthly {
        #[arg(long, default_value_t = 12)]
        months: u32,
    },
    /// The signed-in admin
    Profile,
    /// Available admin roles
    Roles,
    /// Available admin permissions
    Permissions,
    /// Publish a static page (terms, privacy policy, about)
    PublishContent {
        #[arg(long)]
        key: String,
        #[arg(long)]
        title: String,
        /// Page body, or @path to read it from a file
        #[arg(long)]
        content: String,
    },
    /// Create a promotional offer with a JPG or PNG banner
    CreateOffer {
        /// JSON object with title, description, discount_text and button_text
        /// (each {"en", "ar"}), start_date and end_date (YYYY-MM-DD)
        #[arg(long)]
        data: String,
        /// Banner image, at most 1 MiB
        #[arg(long)]
        image: PathBuf,
    },
    /// Show the effective configuration
    ShowConfig,
}

#[derive(Args, Debug, Clone, Default)]
struct QueryArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    /// Sort field, e.g. created_at
    #[arg(long)]
    sort: Option<String>,
    /// Sort ascending instead of descending
    #[arg(long)]
    asc: bool,
    /// Skip the cache
    #[arg(long)]
    refresh: bool,
}

impl QueryArgs {
    fn params(&self) -> ListParams {
        let mut params = ListParams::default();
        if let Some(page) = self.page {
            params = params.page(page);
        }
        if let Some(per_page) = self.per_page {
            params = params.per_page(per_page);
        }
        if let Some(ref term) = self.search {
            params = params.search(term);
        }
        if let Some(ref field) = self.sort {
            let direction = if self.asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            params = params.sort(Sort {
                field: field.clone(),
                direction,
            });
        }
        if self.refresh {
            params = params.refresh();
        }
        params
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Admins,
    Vehicles,
    Customers,
    SupportRequests,
    Workshops,
    SocialLinks,
    Statistics,
    MaintenanceLogs,
}

// ============================================================================
// Setup
// ============================================================================

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr, and also to a daily file when `log_dir` is configured.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "fleetdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// The config file in use: `--config` if given, else the default location.
fn config_path(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path(),
    }
}

fn client_for(config: &Config, token: Option<String>) -> Result<ApiClient> {
    let mut client = ApiClient::new(&config.api_base_url, config.request_timeout_secs)
        .context("Failed to build HTTP client")?;
    let token = token.or_else(|| std::env::var(TOKEN_ENV).ok());
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        client.set_token(token.trim().to_string());
    }
    Ok(client)
}

/// Parse `--data` into the payload type the collection accepts.
fn parse_body<B: DeserializeOwned>(data: &str) -> Result<B> {
    let body: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    if !body.is_object() {
        bail!("--data must be a JSON object");
    }
    serde_json::from_value(body).context("--data does not match the record's fields")
}

fn read_image(path: &Path) -> Result<OfferImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(OfferImage::new(file_name, bytes)?)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = config_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?.with_env_overrides();
    let _guard = init_tracing(config.log_dir.as_deref());
    info!(api = %config.api_base_url, "FleetDesk starting");

    let result = run(cli, config, &config_path).await;
    if let Err(ref err) = result {
        if let Some(api_err) = err.downcast_ref::<ApiError>() {
            if matches!(api_err, ApiError::Unauthorized) {
                eprintln!("hint: run `fleetdesk login` and export {}", TOKEN_ENV);
            } else if api_err.is_client_error() {
                eprintln!("hint: the server rejected the request; retrying will not help");
            }
        }
    }
    result
}

async fn run(cli: Cli, mut config: Config, config_path: &Path) -> Result<()> {
    let client = client_for(&config, cli.token.clone())?;
    let json = cli.json;

    let command = match cli.command {
        Command::Login { email } => return login(&client, &mut config, config_path, email).await,
        Command::Logout => {
            client.logout().await?;
            println!("Signed out");
            return Ok(());
        }
        Command::ShowConfig => {
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        other => other,
    };

    let console = Console::new(Arc::new(client), &config.client_options());

    match command {
        Command::List { resource, query } => {
            list(&console, resource, &query.params(), json).await?;
        }
        Command::Watch {
            resource,
            interval,
            count,
            query,
        } => {
            let params = query.params();
            for round in 1..=count.max(1) {
                if round > 1 {
                    tokio::time::sleep(Duration::from_secs(interval)).await;
                }
                list(&console, resource, &params, json).await?;
            }
            output::print_cache_report(&console.cache_report());
        }
        Command::Update { resource, id, data } => {
            let reply: Value = match resource {
                Resource::Admins => {
                    let body: AdminRequest = parse_body(&data)?;
                    console.admins.update(&id, &body).await?
                }
                Resource::Vehicles => {
                    let body: VehicleUpdate = parse_body(&data)?;
                    console.vehicles.update(&id, &body).await?
                }
                Resource::Customers => {
                    let body: CustomerUpdate = parse_body(&data)?;
                    console.customers.update(&id, &body).await?
                }
                Resource::SupportRequests => {
                    let body: SupportReply = parse_body(&data)?;
                    console.support_requests.update(&id, &body).await?
                }
                Resource::SocialLinks => {
                    let body: SocialLinkUpdate = parse_body(&data)?;
                    console.social_links.update(&id, &body).await?
                }
                other => bail!("{:?} cannot be edited", other),
            };
            output::print_reply(&reply);
        }
        Command::Create { resource, data } => {
            let reply: Value = match resource {
                Resource::Admins => {
                    let body: AdminRequest = parse_body(&data)?;
                    console.admins.create(&body).await?
                }
                other => bail!("{:?} records cannot be created here", other),
            };
            output::print_reply(&reply);
        }
        Command::Delete { resource, id } => {
            let reply: Value = match resource {
                Resource::Admins => console.admins.delete(&id).await?,
                Resource::Vehicles => console.vehicles.delete(&id).await?,
                Resource::Customers => console.customers.delete(&id).await?,
                Resource::SupportRequests => console.support_requests.delete(&id).await?,
                other => bail!("{:?} records cannot be deleted", other),
            };
            output::print_reply(&reply);
        }
        Command::Monthly { months } => {
            let data = console.monthly_maintenance_count(months).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Profile => {
            let admin = console.profile().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&admin)?);
            } else {
                output::print_admins(std::slice::from_ref(&admin));
                println!(
                    "permissions: {}",
                    admin
                        .all_permissions
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        Command::Roles => {
            for role in console.roles().await? {
                println!("{:<6} {}", role.id, role.name);
            }
        }
        Command::Permissions => {
            for permission in console.permissions().await? {
                println!("{:<6} {}", permission.id, permission.name);
            }
        }
        Command::PublishContent {
            key,
            title,
            content,
        } => {
            let content = match content.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path))?,
                None => content,
            };
            let reply = console
                .publish_static_content(&StaticContent { key, title, content })
                .await?;
            output::print_reply(&reply);
        }
        Command::CreateOffer { data, image } => {
            let offer: OfferRequest = parse_body(&data)?;
            let image = read_image(&image)?;
            let reply = console.create_offer(&offer, image).await?;
            output::print_reply(&reply);
        }
        // handled before the console is built
        Command::Login { .. } | Command::Logout | Command::ShowConfig => {}
    }

    Ok(())
}

async fn login(
    client: &ApiClient,
    config: &mut Config,
    config_path: &Path,
    email: Option<String>,
) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => bail!("--email is required"),
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;
    let token = client.login(&email, &password).await?;

    config.last_email = Some(email);
    if let Err(e) = config.save_to(config_path) {
        warn!("Failed to save config: {}", e);
    }
    println!("{}", token);
    Ok(())
}

/// Fetch one listing and print it with its provenance.
async fn list(
    console: &Console,
    resource: Resource,
    params: &ListParams,
    json: bool,
) -> Result<()> {
    match resource {
        Resource::Admins => {
            let data = fetch(&console.admins, params, json).await?;
            if !json {
                output::print_admins(&data.admins);
            }
        }
        Resource::Vehicles => {
            let data = fetch(&console.vehicles, params, json).await?;
            if !json {
                output::print_vehicles(&data.vehicles);
                output::print_meta(&data.meta);
            }
        }
        Resource::Customers => {
            let data = fetch(&console.customers, params, json).await?;
            if !json {
                output::print_customers(&data.customers);
                output::print_meta(&data.meta);
            }
        }
        Resource::SupportRequests => {
            let data = fetch(&console.support_requests, params, json).await?;
            if !json {
                output::print_support_requests(&data.support_requests);
                output::print_meta(&data.meta);
            }
        }
        Resource::Workshops => {
            let data = fetch(&console.workshops, params, json).await?;
            if !json {
                output::print_workshops(&data.workshops);
            }
        }
        Resource::SocialLinks => {
            let data = fetch(&console.social_links, params, json).await?;
            if !json {
                output::print_social_links(&data.social_media);
            }
        }
        Resource::Statistics => {
            let data = fetch(&console.statistics, params, json).await?;
            if !json {
                output::print_statistics(&data);
            }
        }
        Resource::MaintenanceLogs => {
            let data = fetch(&console.maintenance_logs, params, json).await?;
            if !json {
                output::print_maintenance_logs(&data.maintenance_logs);
                output::print_meta(&data.meta);
            }
        }
    }
    Ok(())
}

async fn fetch<T>(
    client: &ResourceClient<fleetdesk_core::models::Envelope<T>>,
    params: &ListParams,
    json: bool,
) -> Result<T>
where
    T: DeserializeOwned + serde::Serialize + Clone + Send + Sync + 'static,
{
    let listing = client.list(params).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        output::print_source(client.name(), &listing);
    }
    Ok(listing.data.data)
}
