//! Bot assembly and the long-polling entry point.

use std::sync::Arc;

use anyhow::Result;
use storage::Database;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, instrument};

use crate::config::BotConfig;
use crate::core::{init_tracing, Transport};
use crate::handlers::{handle_callback, handle_command, handle_text};
use crate::pagination::ReplyPager;
use crate::relay::RelayDispatcher;
use crate::resolve::ThreadResolver;
use crate::session::{ReplyIndex, SessionRegistry};
use crate::telegram::{Command, TelegramTransport};

/// Result type for dispatcher endpoints.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Everything the handlers need, built once and shared through dptree.
/// Handlers receive their dependencies here instead of capturing them in
/// per-button closures, so one static dispatcher serves every update.
pub struct AppContext {
    pub config: BotConfig,
    pub db: Database,
    pub transport: Arc<dyn Transport>,
    pub reply_index: ReplyIndex,
    pub sessions: SessionRegistry,
    pub pager: ReplyPager,
    pub resolver: ThreadResolver,
    pub relay: RelayDispatcher,
}

impl AppContext {
    /// Wires the components around a database handle and a transport.
    pub fn new(config: BotConfig, db: Database, transport: Arc<dyn Transport>) -> Self {
        let reply_index = ReplyIndex::new();
        let sessions = SessionRegistry::new();
        let pager = ReplyPager::new(
            transport.clone(),
            db.clone(),
            reply_index.clone(),
            config.page_size,
        );
        let resolver = ThreadResolver::new(reply_index.clone(), db.clone());
        let relay = RelayDispatcher::new(transport.clone(), db.clone());
        Self {
            config,
            db,
            transport,
            reply_index,
            sessions,
            pager,
            resolver,
            relay,
        }
    }
}

/// Main entry: validate config, init logging, connect storage, register the
/// command menu, then long-poll until shutdown.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    if let Some(log_dir) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(log_dir)?;
    }
    init_tracing(&config.log_file)?;

    info!(database_url = %config.database_url, "Initializing bot");
    let db = Database::connect(&config.database_url).await?;

    let bot = Bot::new(config.bot_token.clone());
    bot.set_my_commands(Command::bot_commands()).await?;

    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
    let ctx = Arc::new(AppContext::new(config, db, transport));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_text))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    info!("Bot started, entering dispatch loop");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
