use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use offerhub_client::{
    AppState,
    api::RecordId,
    api::offer::{BidForm, OfferFilter, OfferRequestFilter, OfferStatus, OfferStatusFilter},
    api::user::LoginRequest,
    cache::{FileSessionStore, RedisSessionStore, SessionStore},
    config::Config,
    utils::{MemoryNavigator, Navigator},
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "offerhub")]
#[command(about = "OfferHub command-line client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the cached user
    Whoami,
    /// List offers of the logged-in entity
    Offers {
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List offer requests from other entities
    Requests {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Delete an offer
    DeleteOffer { offer_id: String },
    /// Bid on an offer request
    Bid {
        offer_request_id: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Send the verification email again
    ResendVerification {
        #[arg(long)]
        email: String,
    },
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Inactive,
}

impl From<StatusArg> for OfferStatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => OfferStatusFilter::All,
            StatusArg::Active => OfferStatusFilter::Only(OfferStatus::Active),
            StatusArg::Inactive => OfferStatusFilter::Only(OfferStatus::Inactive),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env()?;
    tracing::debug!("Using API base {}", config.api_base_url);

    // 有 Redis 时用 Redis 保存会话，否则写本地文件
    let store: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessionStore::open(url, config.session_namespace.clone())?),
        None => Arc::new(FileSessionStore::new(config.session_file.clone())),
    };
    let navigator = Arc::new(MemoryNavigator::at("/cli"));
    let state = AppState::new(config, store, navigator.clone());

    let result = run(&state, cli.command).await;

    if navigator.current_path() == "/login" {
        eprintln!("Session ended. Run `offerhub login` to sign in again.");
    }
    result
}

async fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let response = state.auth.login(&LoginRequest { email, password }).await?;
            if response.password_reset_required {
                eprintln!("Password reset required before continuing.");
            }
            match response.profile()?.role.dashboard_path() {
                Some(path) => println!("Logged in. Dashboard: {}", path),
                None => println!("Logged in as admin."),
            }
        }
        Commands::Logout => {
            state.auth.logout().await?;
            println!("Logged out.");
        }
        Commands::Whoami => match state.auth.current_user().await? {
            Some(user) => print_json(&user)?,
            None => println!("Not logged in."),
        },
        Commands::Offers {
            status,
            page,
            search,
        } => {
            let entity_id = current_entity(state).await?;
            let filter = OfferFilter {
                status: status.into(),
                page,
                search,
                ..Default::default()
            };
            let page = state.offers.offers_by_entity(&entity_id, &filter).await?;
            print_json(&page.offers)?;
            eprintln!("total: {}, more: {}", page.total, page.has_more);
        }
        Commands::Requests { search } => {
            let filter = OfferRequestFilter {
                exclude_entity_id: state
                    .auth
                    .current_user()
                    .await?
                    .and_then(|user| user.entity_id),
                search,
            };
            print_json(&state.offers.offer_requests(&filter).await?)?;
        }
        Commands::DeleteOffer { offer_id } => {
            let value = state
                .offers
                .delete_offer(&RecordId::from(offer_id.as_str()))
                .await?;
            print_json(&value)?;
        }
        Commands::Bid {
            offer_request_id,
            amount,
            notes,
        } => {
            let entity_id = current_entity(state).await?;
            let bid = BidForm {
                bid_amount: amount,
                bid_notes: notes,
                ..Default::default()
            }
            .into_draft(entity_id)?;
            let value = state
                .offers
                .create_bid(&RecordId::from(offer_request_id.as_str()), &bid)
                .await?;
            print_json(&value)?;
        }
        Commands::ResendVerification { email } => {
            state.auth.resend_verification(&email).await?;
            println!("Verification email sent.");
        }
        Commands::ForgotPassword { email } => {
            state.auth.forgot_password(&email).await?;
            println!("Password reset email sent.");
        }
    }
    Ok(())
}

async fn current_entity(state: &AppState) -> anyhow::Result<RecordId> {
    state
        .auth
        .current_user()
        .await?
        .and_then(|user| user.entity_id)
        .ok_or_else(|| anyhow::anyhow!("not logged in as an entity member"))
}
