use std::io::{BufRead, Write};

use calmroom_core::chat::{RejectReason, SendOutcome};
use calmroom_core::{ChatSession, Config, HttpChatService};

use super::CmdResult;

pub async fn run(message: Option<String>) -> CmdResult {
    let config = Config::load()?;
    config.backend.ensure_configured()?;

    let service = HttpChatService::new(config.chat_endpoint(), config.backend.anon_key.clone());
    let session = ChatSession::with_messages(
        service,
        config.chat.greeting.clone(),
        config.chat.apology.clone(),
    );

    if let Some(message) = message {
        send(&session, &message).await;
        return Ok(());
    }

    if let Some(greeting) = session.transcript().last() {
        println!("{}", greeting.content);
    }
    println!("(empty line or Ctrl-D to quit)");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        send(&session, line).await;
    }
    Ok(())
}

async fn send(session: &ChatSession<HttpChatService>, text: &str) {
    let outcome = session
        .send_with(text, |delta| {
            print!("{delta}");
            if let Err(e) = std::io::stdout().flush() {
                tracing::debug!(error = %e, "cannot flush stdout");
            }
        })
        .await;

    match outcome {
        SendOutcome::Replied(_) => println!(),
        SendOutcome::Failed => {
            if let Some(apology) = session.transcript().last() {
                println!();
                println!("{}", apology.content);
            }
        }
        SendOutcome::Rejected(RejectReason::EmptyMessage) => {}
        SendOutcome::Rejected(RejectReason::SendInFlight) => {
            eprintln!("still waiting for the previous reply");
        }
    }
}
