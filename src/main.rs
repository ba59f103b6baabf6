use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use cccc_chat::app::{App, APP_TITLE};
use cccc_chat::config::{Config, Overrides};
use cccc_chat::controller::ChatController;
use cccc_chat::export::write_html;
use cccc_chat::handler::handle_event;
use cccc_chat::keymap::Keymap;
use cccc_chat::session::ERROR_REPLY;
use cccc_chat::theme::{FileThemeStore, MemoryThemeStore, ThemeStore};
use cccc_chat::{logging, tui, ui, ChatClient};

#[derive(Parser)]
#[command(name = "cccc-chat", version)]
#[command(about = "Chat with the CCCC.AI assistant from your terminal")]
struct Cli {
    /// Backend base URL (empty means the local default)
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Maximum characters per message
    #[arg(long, global = true)]
    input_limit: Option<usize>,
    /// Give up on a reply after this many seconds (default: wait forever)
    #[arg(long = "timeout", global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
        /// Also write the exchange as an HTML transcript
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Show backend health
    Health,
    /// Ask the backend to reload its data bundle
    Reload,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = Overrides {
        api_base: cli.api_base,
        input_limit: cli.input_limit,
        request_timeout_secs: cli.timeout_secs,
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let log_path = logging::log_file_path().and_then(logging::init_file);
            let config = Config::resolve(overrides)?;
            if let Err(err) = &log_path {
                // The TUI has not taken the terminal yet
                eprintln!("logging disabled: {}", err);
            }
            run_chat(&config).await
        }
        Commands::Ask { question, html } => {
            logging::init_stderr()?;
            let config = Config::resolve(overrides)?;
            ask(&config, &question, html).await
        }
        Commands::Health => {
            logging::init_stderr()?;
            let config = Config::resolve(overrides)?;
            health(&config).await
        }
        Commands::Reload => {
            logging::init_stderr()?;
            let config = Config::resolve(overrides)?;
            reload(&config).await
        }
    }
}

fn client(config: &Config) -> Result<ChatClient> {
    Ok(ChatClient::new(config.api_base(), config.request_timeout())?)
}

fn theme_store() -> Box<dyn ThemeStore> {
    match FileThemeStore::default_location() {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "theme preference will not be persisted");
            Box::new(MemoryThemeStore::new())
        }
    }
}

fn controller(config: &Config) -> Result<ChatController> {
    let client = client(config)?;
    info!(api_base = client.base_url(), "using backend");
    Ok(ChatController::new(Arc::new(client), theme_store(), config.input_limit()))
}

async fn run_chat(config: &Config) -> Result<()> {
    let mut app = App::new(controller(config)?, Keymap::default());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(config: &Config, question: &str, html: Option<PathBuf>) -> Result<()> {
    let mut chat = controller(config)?;

    // Same truncation the input box applies while typing
    chat.input_mut().set_text(question);
    let text = chat.input().text().to_string();
    if !chat.submit(&text).await {
        return Err(anyhow!("nothing to send"));
    }

    let reply = chat
        .messages()
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();
    println!("{}", reply);

    if let Some(path) = html {
        write_html(&path, APP_TITLE, chat.messages(), chat.theme())?;
        info!(path = %path.display(), "transcript written");
    }

    if reply == ERROR_REPLY {
        return Err(anyhow!("request failed, see log output above"));
    }
    Ok(())
}

async fn health(config: &Config) -> Result<()> {
    let client = client(config)?;
    let status = client.health().await?;

    println!("backend:  {}", client.base_url());
    println!("ok:       {}", status.ok);
    println!("schema:   {}", status.schema);
    if let Some(creator) = status.creator {
        println!("creator:  {}", creator);
    }
    println!("sports:   {}", status.sports_indexed.join(", "));
    Ok(())
}

async fn reload(config: &Config) -> Result<()> {
    let client = client(config)?;
    let status = client.reload().await?;

    if !status.ok {
        return Err(anyhow!("backend refused to reload"));
    }
    println!("reloaded: {} sports indexed", status.sports_indexed.len());
    for sport in status.sports_indexed {
        println!("  • {}", sport);
    }
    Ok(())
}
