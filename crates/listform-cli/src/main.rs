//! Listform CLI - run one list-item form session from a terminal
//!
//! Acts as the form host: loads a record with its vocabularies, prints what
//! a renderer would show, and saves records read from JSON files.

mod config;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Args, Command};
use listform::{
    ChoiceOption, DependentSelector, DisplayMode, FormController, FormHost, FormLayout,
    HttpListStore, Record, SessionState, Tag,
};

/// Host that reports callbacks through the log
struct ConsoleHost;

impl FormHost for ConsoleHost {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }

    fn alert(&self, message: &str) {
        warn!("{}", message);
    }

    fn form_saved(&self) {
        info!("Form saved");
    }

    fn form_closed(&self, was_saved: bool) {
        info!(was_saved, "Form closed");
    }
}

/// What a renderer would receive after the form opened
#[derive(Serialize)]
struct SessionSnapshot<'a> {
    state: SessionState,
    mode: DisplayMode,
    record_id: Option<u64>,
    record: &'a Record,
    assignee: Option<&'a str>,
    assignee_options: Vec<ChoiceOption>,
    document_type_options: Vec<ChoiceOption>,
    sub_type_options: &'a [ChoiceOption],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("listform={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    match &args.command {
        Command::Layout => print_json(&FormLayout::standard()),
        Command::Show { mode, item_id } => show(&args, *mode, *item_id).await,
        Command::SubTypes { doc_type } => sub_types(&args, doc_type).await,
        Command::Save { mode, item_id, record } => {
            let text = std::fs::read_to_string(record)
                .with_context(|| format!("reading {}", record.display()))?;
            let record: Record = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", record.display()))?;

            if !save(&args, *mode, *item_id, record).await? {
                std::process::exit(2);
            }
            Ok(())
        }
    }
}

fn connect(args: &Args) -> anyhow::Result<Arc<HttpListStore>> {
    let store = HttpListStore::connect(args.store_config(), args.form_config())
        .context("building list store")?;
    info!(site = %args.store_config().site_url, list = %args.record_list, "Connected list store");
    Ok(Arc::new(store))
}

fn form(args: &Args, mode: DisplayMode, item_id: Option<u64>) -> anyhow::Result<FormController> {
    let store = connect(args)?;
    Ok(FormController::new(
        store,
        Arc::new(ConsoleHost),
        &args.form_config(),
        mode,
        item_id,
    ))
}

async fn show(args: &Args, mode: DisplayMode, item_id: Option<u64>) -> anyhow::Result<()> {
    let form = form(args, mode, item_id)?;
    form.open().await?;

    let session = form.session().await;
    print_json(&SessionSnapshot {
        state: session.state(),
        mode: session.mode(),
        record_id: session.record_id(),
        record: session.record(),
        assignee: session.assignee_name(),
        assignee_options: session.assignee_options(),
        document_type_options: session.document_type_options(),
        sub_type_options: session.sub_type_options(),
    })
}

async fn sub_types(args: &Args, doc_type: &str) -> anyhow::Result<()> {
    let parent_id: u64 = doc_type
        .trim()
        .parse()
        .with_context(|| format!("document type key {:?} is not an item id", doc_type))?;

    let selector = DependentSelector::new(connect(args)?);
    let options = selector.fetch_children(parent_id, doc_type.trim()).await?;
    print_json(&options)
}

/// Open a session, apply `desired` through the form's edit operations, and
/// submit. Returns whether the record was written.
async fn save(
    args: &Args,
    mode: DisplayMode,
    item_id: Option<u64>,
    desired: Record,
) -> anyhow::Result<bool> {
    let form = form(args, mode, item_id)?;
    if form.open().await? != SessionState::Ready {
        bail!("form did not become ready");
    }

    {
        let mut session = form.session().await;
        session.set_title(desired.title.clone())?;
        session.set_description(desired.description.clone())?;
        session.set_status(desired.status)?;
        session.set_priority(desired.priority)?;
        session.set_due_date(desired.due_date)?;
        session.set_category(desired.category)?;
        session.set_completion_text(&desired.completion.get().to_string())?;
        session.set_comments(desired.comments.clone())?;

        let assignee = desired.assignee.map(|id| id.to_string());
        session.set_assignee_key(assignee.as_deref())?;

        for tag in Tag::ALL {
            if session.record().tags.contains(tag) != desired.tags.contains(tag) {
                session.toggle_tag(*tag)?;
            }
        }
    }

    match desired.classification {
        Some(classification) => {
            let changed = form.session().await.record().classification != Some(classification)
                || !desired.sub_classifications.is_empty();
            if changed {
                form.change_classification(&classification.to_string()).await?;
                let mut session = form.session().await;
                for child in &desired.sub_classifications {
                    session.toggle_sub_classification(&child.to_string())?;
                }
            }
        }
        None => form.session().await.clear_classification()?,
    }

    let outcome = form.submit().await?;
    println!("{}", outcome.user_message());
    Ok(outcome.is_saved())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
