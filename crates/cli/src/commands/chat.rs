//! `distillery chat`: Terminal rendition of the site chat widget.
//!
//! Runs the same controller the widget uses against a gateway endpoint,
//! with a local identity standing in for the sign-in flow.

use std::io::Write;
use std::sync::Arc;

use distillery_config::AppConfig;
use distillery_widget::{
    ChatController, DisplayedMessage, HttpTransport, LocalIdentity, Speaker,
};
use tokio::io::{self, AsyncBufReadExt, BufReader};

const LOCAL_USER: &str = "local_user";

pub async fn run(
    endpoint: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let endpoint = endpoint.unwrap_or_else(|| config.client.endpoint.clone());
    let transport = Arc::new(HttpTransport::new(endpoint.clone()));

    if let Some(msg) = message {
        // Single message mode signs in implicitly
        let identity = Arc::new(LocalIdentity::new(LOCAL_USER).signed_in());
        let mut chat = ChatController::from_config(identity, transport, &config);

        eprint!("  Thinking...");
        let reply = chat.send(&msg).await.map(|m| m.content.clone());
        eprint!("\r              \r");
        match reply {
            Some(text) => println!("{text}"),
            None => return Err("Message is empty".into()),
        }
        return Ok(());
    }

    let identity = Arc::new(LocalIdentity::new(LOCAL_USER));
    let mut chat = ChatController::from_config(identity, transport, &config);

    println!();
    println!("  Distillery AI (interactive mode)");
    println!();
    println!("  Gateway:   {endpoint}");
    println!("  Commands:  /login, /logout, /exit");
    println!();
    render(chat.transcript().greeting());
    if !chat.state().is_authenticated() {
        println!("  Sign in with /login to start chatting.");
        println!();
    }

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/exit" | "/quit" | "exit" | "quit" => break,
            "/login" => match chat.sign_in().await {
                Ok(_) => println!("  Signed in."),
                Err(e) => eprintln!("  [Sign-in failed] {e}"),
            },
            "/logout" => {
                if chat.sign_out().await {
                    println!("  Signed out.");
                }
            }
            _ if !chat.can_send() => {
                if !chat.state().is_authenticated() {
                    println!("  Sign in with /login first.");
                }
            }
            _ => {
                eprint!("  ...");
                let reply = chat.send(&line).await.cloned();
                eprint!("\r     \r");
                if let Some(reply) = reply {
                    println!();
                    render(&reply);
                }
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn render(message: &DisplayedMessage) {
    let label = match message.speaker {
        Speaker::User => "You",
        Speaker::Agent => "Distillery AI",
    };
    for line in message.content.lines() {
        println!("  {label} > {line}");
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
