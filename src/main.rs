//! store-intel binary entry point.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use store_intel::agent::StoreAssistant;
use store_intel::cli::{AskArgs, ChatArgs, Cli, Commands, GenieArgs};
use store_intel::config::StoreIntelConfig;
use store_intel::generation::{GenerationControl, ToolCallNotice};
use store_intel::genie::GenieClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match StoreIntelConfig::load(Some(cli.config.as_path())) {
        Ok(config) => match cli.command {
            Commands::Chat(args) => handle_chat(&config, args).await,
            Commands::Ask(args) => handle_ask(&config, args).await,
            Commands::Genie(args) => handle_genie(&config, args).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn tool_notice() -> ToolCallNotice {
    Arc::new(|call| eprintln!("[tool-call] the {} tool was called", call.name))
}

/// Control for one turn; Ctrl-C cancels it. Abort the returned handle once
/// the turn is over.
fn turn_control() -> (GenerationControl, tokio::task::JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let control = GenerationControl {
        on_tool_call: Some(tool_notice()),
        cancel,
    };
    (control, watcher)
}

async fn handle_chat(
    config: &StoreIntelConfig,
    args: ChatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut assistant = StoreAssistant::from_config(config)?.with_settings(args.sampling.settings());

    println!("Hi, I'm a Store Intelligence Assistant! Ask about store performance, returns, BOPIS, policies or inventory.");
    println!("Commands: /clear to reset the conversation, /exit to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        match prompt {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                assistant.clear_history();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        let (control, watcher) = turn_control();
        let reply = assistant.respond(prompt, &control).await;
        watcher.abort();
        println!("{reply}\n");
    }

    Ok(())
}

async fn handle_ask(
    config: &StoreIntelConfig,
    args: AskArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut assistant = StoreAssistant::from_config(config)?.with_settings(args.sampling.settings());
    let (control, watcher) = turn_control();
    let reply = assistant.try_respond(&args.question, &control).await;
    watcher.abort();
    println!("{}", reply?);
    Ok(())
}

async fn handle_genie(
    config: &StoreIntelConfig,
    args: GenieArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let space_id = args.space_id(config)?;
    let genie = GenieClient::from_config(config)?;

    let (control, watcher) = turn_control();
    let answer = genie
        .fetch_answer_with_cancel(&space_id, &args.query, &control.cancel)
        .await;
    watcher.abort();

    println!("{}", serde_json::to_string_pretty(&answer?)?);
    Ok(())
}
