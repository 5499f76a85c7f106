//! Styled terminal output for chat records.

use console::style;

use foliochat_types::chat::ChatMessage;
use foliochat_types::config::ApiConfig;

pub fn print_banner(config: &ApiConfig) {
    println!();
    println!("  {}", style("foliochat").cyan().bold());
    println!("  {}", style(config.base_url()).dim());
    println!("  {}", style("Type /help for commands").dim());
    println!();
}

/// Print one assistant-side record: thinking steps, reply text, then
/// sources and the email confirmation when present.
pub fn print_reply(message: &ChatMessage) {
    println!();
    for step in &message.thinking_steps {
        println!("  {}", style(format!("· {step}")).dim());
    }
    if message.is_error {
        println!("  {} {}", style("!").red().bold(), message.text);
    } else {
        let label = if message.is_fallback {
            style("Assistant (fallback)").cyan().dim()
        } else {
            style("Assistant").cyan()
        };
        println!("  {} {}", label.bold(), message.text.trim());
    }

    if !message.sources.is_empty() {
        println!();
        println!("  {}", style("Sources:").bold());
        for source in &message.sources {
            println!(
                "    {} {} {}",
                style("-").dim(),
                source.document,
                style(format!("({:.2})", source.relevance_score)).dim()
            );
        }
    }

    if message.email_sent == Some(true) {
        println!("  {}", style("Email sent.").green());
    }
    println!();
}

pub fn print_notice(text: &str) {
    println!("\n  {}\n", style(text).yellow());
}
