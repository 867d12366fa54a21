use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde::Serialize;

use clinic_client::api::types::{Audience, Broadcast};
use clinic_client::api::{auth, hospitals, notifications, RefreshOutcome};
use clinic_client::storage::{CredentialStore, KeychainStore, MemoryStore};
use clinic_client::{ApiClient, ApiResponse, AuthEvent, AuthEvents, ClientConfig, RequestOptions, Session};

#[derive(Parser, Debug)]
#[command(name = "clinic", about = "Command-line client for the clinic backend")]
struct Cli {
    /// Backend base URL (overrides CLINIC_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Locale sent in X-Locale / Accept-Language (overrides CLINIC_LOCALE)
    #[arg(long)]
    locale: Option<String>,

    /// Keep credentials in memory only instead of the OS keychain
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the current user
    Me,
    /// Exchange the stored refresh token for new credentials
    Refresh,
    /// Log out and clear stored credentials
    Logout,
    /// Search the hospital directory
    Hospitals {
        query: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Broadcast a notification
    Notify {
        title: String,
        body: String,
        #[arg(long, default_value = "all")]
        audience: Audience,
    },
    /// Send an arbitrary authenticated request
    Request {
        method: String,
        path: String,
        /// JSON body
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    log::info!("Using API at {}", config.api_url);

    let store: Arc<dyn CredentialStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(KeychainStore::new(config.keychain_service.clone()))
    };

    let events = AuthEvents::new();
    let mut auth_events = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = auth_events.recv().await {
            if event == AuthEvent::Expired {
                eprintln!("Session expired. Run `clinic login` to sign in again.");
            }
        }
    });

    let session = Arc::new(Session::restore(store, &config.locale, events));
    let client = ApiClient::new(&config, session);

    match cli.command {
        Command::Login { email, password } => {
            let user = auth::login(&client, &email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("Logged in as {}", email);
            if let Some(user) = user {
                print_json(&user)?;
            }
        }
        Command::Me => {
            let user = auth::me(&client).await.map_err(|e| e.to_string())?;
            print_json(&user)?;
        }
        Command::Refresh => match client.refresh().await {
            RefreshOutcome::Refreshed => println!("Session refreshed"),
            other => return Err(format!("Refresh failed: {:?}", other)),
        },
        Command::Logout => {
            auth::logout(&client).await;
            println!("Logged out");
        }
        Command::Hospitals {
            query,
            city,
            specialty,
        } => {
            let query = hospitals::HospitalQuery {
                search: query,
                city,
                specialty,
                page: None,
            };
            let found = hospitals::search(&client, &query)
                .await
                .map_err(|e| e.to_string())?;
            for h in found {
                println!(
                    "{}\t{}\t{}",
                    h.id,
                    h.name,
                    h.city.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Notify {
            title,
            body,
            audience,
        } => {
            let sent = notifications::broadcast(
                &client,
                &Broadcast {
                    title,
                    body,
                    audience,
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("Notification {} sent", sent.id);
        }
        Command::Request { method, path, body } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| format!("Invalid HTTP method: {}", method))?;
            let mut options = RequestOptions::new(method);
            if let Some(body) = body {
                options = options.with_body(body);
            }
            match client.fetch(&path, options).await.map_err(|e| e.to_string())? {
                ApiResponse::NoContent => println!("(no content)"),
                ApiResponse::Json(value) => print_json(&value)?,
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| format!("Failed to render JSON: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
