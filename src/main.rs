//! Interactive terminal front end for the triage assistant.
//!
//! Reads configuration from `PET_TRIAGE__*` environment variables (or a
//! `.env` file) and runs a line-based session on stdin.
//!
//! ```sh
//! PET_TRIAGE__AI__ANTHROPIC_API_KEY=sk-ant-... pet-triage
//! PET_TRIAGE__AI__PROVIDER=mock pet-triage
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use pet_triage::application::{
    CompleteProfileCommand, CreateProfileCommand, IntakeError, PendingTurn, ReopenProfileCommand,
    RetryReplyCommand, SendMessageCommand, SwitchProfileCommand,
};
use pet_triage::config::{AppConfig, LogFormat, LoggingConfig};
use pet_triage::domain::intake::{Attachment, PetProfile, Species};
use pet_triage::IntakeApp;

const HELP: &str = "\
Commands:
  /new <species>          start a profile (dog, cat, rodent, bird, reptile, other)
  /list                   list profiles
  /switch <n>             make profile n active
  /card                   show the active patient card
  /reply <n>              send quick reply n
  /attach <path> [text]   send a file with an optional message
  /retry                  retry the last failed reply
  /done                   mark the active profile completed
  /reopen                 reopen the active profile
  /help                   show this help
  /quit                   exit
Anything else is sent as a message.";

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);
    config.validate().context("invalid configuration")?;

    let app = IntakeApp::from_config(&config).context("failed to build AI providers")?;
    let mut session = Session::new(app);

    println!("Pet triage assistant. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Err(err) = session.dispatch(line).await {
            println!("! {err}");
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

struct Session {
    app: IntakeApp,
    failed_turn: Option<PendingTurn>,
}

impl Session {
    fn new(app: IntakeApp) -> Self {
        Self {
            app,
            failed_turn: None,
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<()> {
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/help" => println!("{HELP}"),
            "/new" => {
                let species: Species = rest.parse()?;
                let result = self
                    .app
                    .create_profile
                    .handle(CreateProfileCommand::new(species))
                    .await;
                let profile = self.settle(result.map(|r| r.profile))?;
                print_reply(&profile);
            }
            "/list" => {
                let listing = self.app.list_profiles.handle().await?;
                for (index, profile) in listing.profiles.iter().enumerate() {
                    let marker = if Some(profile.id()) == listing.active_id { "*" } else { " " };
                    println!("{marker}{} {}", index + 1, summary(profile));
                }
            }
            "/switch" => {
                let listing = self.app.list_profiles.handle().await?;
                let profile = pick(&listing.profiles, rest)?;
                let profile = self
                    .app
                    .switch_profile
                    .handle(SwitchProfileCommand { profile_id: profile.id() })
                    .await?;
                println!("Active: {}", summary(&profile));
            }
            "/card" => print_card(&self.active().await?),
            "/reply" => {
                let profile = self.active().await?;
                let replies = profile.quick_replies();
                let choice = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| replies.get(i))
                    .with_context(|| format!("no quick reply '{rest}'"))?
                    .clone();
                self.send(SendMessageCommand::new(choice)).await?;
            }
            "/attach" => {
                let (path, text) = rest.split_once(' ').unwrap_or((rest, ""));
                let attachment = read_attachment(Path::new(path)).await?;
                self.send(SendMessageCommand::new(text).with_attachment(attachment))
                    .await?;
            }
            "/retry" => {
                let pending = self.failed_turn.take().context("nothing to retry")?;
                let result = self
                    .app
                    .retry_reply
                    .handle(RetryReplyCommand::new(pending))
                    .await;
                let profile = self.settle(result.map(|r| r.profile))?;
                print_reply(&profile);
            }
            "/done" => {
                let profile_id = self.active().await?.id();
                self.app
                    .complete_profile
                    .handle(CompleteProfileCommand { profile_id })
                    .await?;
                println!("Profile completed. /reopen to continue.");
            }
            "/reopen" => {
                let profile_id = self.active().await?.id();
                self.app
                    .reopen_profile
                    .handle(ReopenProfileCommand { profile_id })
                    .await?;
                println!("Profile reopened.");
            }
            _ if command.starts_with('/') => println!("Unknown command. /help lists commands."),
            _ => self.send(SendMessageCommand::new(line)).await?,
        }
        Ok(())
    }

    async fn send(&mut self, cmd: SendMessageCommand) -> Result<()> {
        let result = self.app.send_message.handle(cmd).await;
        let profile = self.settle(result.map(|r| r.profile))?;
        print_reply(&profile);
        if profile.is_completed() {
            println!("(conversation completed)");
        }
        Ok(())
    }

    /// Keeps a failed turn around for `/retry`.
    fn settle(&mut self, result: Result<PetProfile, IntakeError>) -> Result<PetProfile> {
        match result {
            Ok(profile) => {
                self.failed_turn = None;
                Ok(profile)
            }
            Err(err) => {
                let message = err.to_string();
                if let Some(pending) = err.into_pending_turn() {
                    self.failed_turn = Some(pending);
                    anyhow::bail!("{message} (/retry to try again)");
                }
                anyhow::bail!(message)
            }
        }
    }

    async fn active(&self) -> Result<PetProfile> {
        let listing = self.app.list_profiles.handle().await?;
        listing.active().cloned().context("no active profile, use /new")
    }
}

fn pick<'a>(profiles: &'a [PetProfile], arg: &str) -> Result<&'a PetProfile> {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| profiles.get(i))
        .with_context(|| format!("no profile '{arg}'"))
}

fn summary(profile: &PetProfile) -> String {
    let card = profile.card();
    format!(
        "{} ({}) [{}]{}",
        card.name,
        profile.species(),
        profile.urgency().banner(),
        if profile.is_completed() { " completed" } else { "" }
    )
}

fn print_reply(profile: &PetProfile) {
    if let Some(message) = profile.transcript().last() {
        if profile.urgency().is_alarming() {
            println!("[{}]", profile.urgency().banner());
        }
        println!("\n{}\n", message.text);
    }
    let replies = profile.quick_replies();
    if !replies.is_empty() {
        let numbered: Vec<String> = replies
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}) {r}", i + 1))
            .collect();
        println!("  {}", numbered.join("  "));
    }
}

fn print_card(profile: &PetProfile) {
    let card = profile.card();
    println!("Species:  {}", profile.species());
    println!("Name:     {}", card.name);
    println!("Age:      {}", card.age);
    println!("Breed:    {}", card.breed);
    println!("Weight:   {}", card.weight);
    if card.symptoms.is_empty() {
        println!("Symptoms: none reported");
    } else {
        println!("Symptoms: {}", card.symptoms.join(", "));
    }
    println!("Track:    {}", profile.category());
    println!("Status:   {}", profile.urgency().banner());
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Attachment::new(data, media_type_for(path), filename))
}

fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
