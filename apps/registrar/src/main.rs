use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use form_core::{
    contact::{send_contact, ContactForm},
    countdown::time_remaining,
    DraftField, FormEvent, HttpSiteApi, MemberField, RegistrationClient,
};
use shared::domain::RegistrationMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(name = "registrar", about = "Drive the event site's registration API from the terminal")]
struct Args {
    /// Overrides the registration API base url from config.
    #[arg(long)]
    api_url: Option<String>,
    /// Overrides the notification service base url from config.
    #[arg(long)]
    notify_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the time left until registration closes.
    Countdown {
        /// Refresh every second until the deadline passes.
        #[arg(long)]
        watch: bool,
    },
    /// Send a contact-form message.
    Contact {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Register a team. Repeat --member for each row, leader first.
    Team {
        #[arg(long)]
        team_name: String,
        #[arg(long)]
        leader_phone: String,
        /// name,email,role — two to four occurrences.
        #[arg(long = "member")]
        members: Vec<String>,
        #[arg(long, default_value = "")]
        idea: String,
        #[arg(long)]
        request_add_member: bool,
    },
    /// Register as an individual participant.
    Individual {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        competence: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = config::load_settings();
    let api_url = args.api_url.unwrap_or_else(|| settings.api_base_url.clone());
    let notify_url = args
        .notify_url
        .unwrap_or_else(|| settings.notify_base_url.clone());
    info!(api = %api_url, notify = %notify_url, "using site backends");

    match args.command {
        Command::Countdown { watch } => run_countdown(&settings.registration_closes_at, watch).await,
        Command::Contact {
            first_name,
            last_name,
            email,
            message,
        } => {
            let api = HttpSiteApi::from_urls(&api_url, &notify_url)?;
            let mut form = ContactForm {
                first_name,
                last_name,
                email,
                message,
            };
            send_contact(&api, &mut form).await?;
            println!("Message Sent! Thank you for reaching out.");
            Ok(())
        }
        Command::Team {
            team_name,
            leader_phone,
            members,
            idea,
            request_add_member,
        } => {
            let client = new_client(&api_url, &notify_url)?;
            stage_team(
                &client,
                team_name,
                leader_phone,
                &members,
                idea,
                request_add_member,
            )
            .await?;
            drive_submission(&client).await
        }
        Command::Individual {
            name,
            email,
            role,
            competence,
        } => {
            let client = new_client(&api_url, &notify_url)?;
            stage_individual(&client, name, email, role, competence).await;
            drive_submission(&client).await
        }
    }
}

fn new_client(api_url: &str, notify_url: &str) -> Result<Arc<RegistrationClient>> {
    let api = Arc::new(HttpSiteApi::from_urls(api_url, notify_url)?);
    Ok(RegistrationClient::new(api))
}

fn parse_member(raw: &str) -> Result<(String, String, String)> {
    let mut parts = raw.splitn(3, ',').map(str::trim);
    let (Some(name), Some(email), Some(role)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("--member expects 'name,email,role', got '{raw}'");
    };
    Ok((name.to_string(), email.to_string(), role.to_string()))
}

async fn stage_team(
    client: &Arc<RegistrationClient>,
    team_name: String,
    leader_phone: String,
    members: &[String],
    idea: String,
    request_add_member: bool,
) -> Result<()> {
    if !(2..=4).contains(&members.len()) {
        bail!("a team needs between 2 and 4 members (got {})", members.len());
    }
    client.update_field(DraftField::TeamName(team_name)).await;
    client
        .update_field(DraftField::LeaderPhone(leader_phone))
        .await;
    client.update_field(DraftField::IdeaDescription(idea)).await;
    client
        .update_field(DraftField::RequestAddMember(request_add_member))
        .await;
    for (index, raw) in members.iter().enumerate() {
        // the draft opens with the leader and first teammate rows
        if index >= 2 {
            client.add_member().await;
        }
        let (name, email, role) = parse_member(raw)?;
        client.update_member(index, MemberField::Name, name).await;
        client.update_member(index, MemberField::Email, email).await;
        client.update_member(index, MemberField::Role, role).await;
    }
    Ok(())
}

async fn stage_individual(
    client: &Arc<RegistrationClient>,
    name: String,
    email: String,
    role: String,
    competence: String,
) {
    client.set_mode(RegistrationMode::Individual).await;
    client.update_member(0, MemberField::Name, name).await;
    client.update_member(0, MemberField::Email, email).await;
    client.update_member(0, MemberField::Role, role).await;
    client
        .update_field(DraftField::Competence(competence))
        .await;
}

async fn drive_submission(client: &Arc<RegistrationClient>) -> Result<()> {
    let mut events = client.subscribe_events();
    println!("Processing your registration...");
    if let Err(err) = client.submit().await {
        bail!("{err}");
    }
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .context("timed out waiting for the submission to wrap up")?;
        match event.context("event stream closed")? {
            FormEvent::SuccessPopupShown => println!("Registration Successful!"),
            FormEvent::NavigateHome => {
                println!("All done. See you at the event!");
                return Ok(());
            }
            FormEvent::SuccessPopupDismissed | FormEvent::SubmissionStateChanged(_) => {}
        }
    }
}

async fn run_countdown(closes_at: &str, watch: bool) -> Result<()> {
    let closes_at: DateTime<Utc> = closes_at
        .parse()
        .with_context(|| format!("invalid registration_closes_at '{closes_at}'"))?;
    if !watch {
        report_countdown(closes_at);
        return Ok(());
    }
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        if report_countdown(closes_at) {
            return Ok(());
        }
    }
}

fn report_countdown(closes_at: DateTime<Utc>) -> bool {
    let snapshot = time_remaining(Utc::now(), closes_at);
    if snapshot.closed {
        println!("Registration is closed.");
    } else {
        println!("Registration closes in: {snapshot}");
    }
    snapshot.closed
}
