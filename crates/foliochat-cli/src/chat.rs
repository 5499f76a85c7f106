//! Interactive chat loop.
//!
//! Reads lines, dispatches slash commands, and runs each turn through
//! the session controller. The terminal shows a spinner while a turn is
//! in flight and renders the finalized assistant record afterwards.

use std::time::Duration;

use console::style;

use foliochat_core::controller::SessionController;
use foliochat_core::store::KvStore;
use foliochat_core::transport::{StreamTransport, SyncTransport};
use foliochat_types::chat::MessageRole;
use foliochat_types::config::ApiConfig;

use crate::commands::{self, ChatCommand};
use crate::input::{ChatInput, InputEvent};
use crate::render;

pub async fn run<S, F, K>(
    controller: &SessionController<S, F, K>,
    config: &ApiConfig,
) -> anyhow::Result<()>
where
    S: StreamTransport,
    F: SyncTransport,
    K: KvStore,
{
    render::print_banner(config);
    if let Some(welcome) = controller.messages().first() {
        render::print_reply(welcome);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => {
                            controller.clear().await;
                            render::print_notice("Conversation reset.");
                        }
                        ChatCommand::Retry => {
                            let has_user = controller
                                .messages()
                                .iter()
                                .any(|m| m.role == MessageRole::User);
                            if !has_user {
                                render::print_notice("Nothing to retry yet.");
                            } else {
                                run_turn(controller.retry()).await;
                                print_last_reply(controller);
                            }
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                run_turn(controller.send(&text)).await;
                print_last_reply(controller);
            }
        }
    }

    Ok(())
}

/// Run one controller operation behind a thinking spinner.
async fn run_turn(operation: impl Future<Output = ()>) {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    operation.await;

    spinner.finish_and_clear();
}

fn print_last_reply<S, F, K>(controller: &SessionController<S, F, K>)
where
    S: StreamTransport,
    F: SyncTransport,
    K: KvStore,
{
    if let Some(last) = controller.messages().last() {
        render::print_reply(last);
    }
}
