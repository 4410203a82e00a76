mod console;
mod logging;
mod replay;
#[cfg(test)]
mod tests;

use std::{
    cell::Cell,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sosguard::{
    capability::{
        Capabilities, Contact, DetachedSurface, FixedLocation, Location, Recognizer, Sampler,
        SmsDispatcher, ThreadedRecognizer, ThreadedSampler, UnavailableRecognizer,
        UnavailableSampler,
    },
    settings::{JsonPhraseStore, MemoryPhraseStore, PhraseStore, Settings},
    EngineEvent, SosEngine,
};

use console::{ConsoleNotifications, ConsoleSender};
use logging::HostLogger;
use replay::{load_motion, load_transcript, ReplayMotion, ReplaySpeech};

#[derive(Debug, Parser)]
#[command(name = "sosguard")]
#[command(about = "SOS trigger engine host runner")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Run(RunArgs),
    Threshold(ThresholdArgs),
    Phrase(PhraseArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long)]
    settings: PathBuf,
    #[arg(long)]
    contacts: PathBuf,
    #[arg(long)]
    motion: Option<PathBuf>,
    #[arg(long)]
    transcript: Option<PathBuf>,
    #[arg(long = "fail-phone")]
    fail_phone: Vec<String>,
    #[arg(long = "phrase-store")]
    phrase_store: Option<PathBuf>,
    #[arg(long = "max-seconds", default_value_t = 30)]
    max_seconds: u64,
    #[arg(long)]
    lat: Option<f64>,
    #[arg(long)]
    lon: Option<f64>,
}

#[derive(Debug, Args)]
struct ThresholdArgs {
    #[arg(long)]
    sensitivity: u8,
}

#[derive(Debug, Args)]
struct PhraseArgs {
    #[command(subcommand)]
    action: PhraseAction,
}

#[derive(Debug, Subcommand)]
enum PhraseAction {
    Get {
        #[arg(long)]
        store: PathBuf,
    },
    Set {
        phrase: String,
        #[arg(long)]
        store: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    HostLogger::from_env()?.install()?;

    match cli.command {
        Commands::Run(args) => run_replay(args),
        Commands::Threshold(args) => {
            let settings = Settings {
                shake_sensitivity: args.sensitivity,
                ..Settings::default()
            }
            .sanitized();
            println!(
                "sensitivity {} -> shake threshold {:.2}",
                settings.shake_sensitivity,
                settings.shake_threshold()
            );
            Ok(())
        }
        Commands::Phrase(args) => match args.action {
            PhraseAction::Get { store } => {
                let phrase = JsonPhraseStore::new(store).load()?;
                println!("{}", phrase.as_deref().unwrap_or("<unset>"));
                Ok(())
            }
            PhraseAction::Set { phrase, store } => {
                let phrase = sosguard::settings::normalize_phrase(&phrase);
                JsonPhraseStore::new(store).save(&phrase)?;
                println!("{phrase}");
                Ok(())
            }
        },
    }
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read settings {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&raw).with_context(|| format!("parse settings {}", path.display()))?;
    Ok(settings.sanitized())
}

pub fn load_contacts(path: &Path) -> Result<Vec<Contact>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read contacts {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse contacts {}", path.display()))
}

fn run_replay(args: RunArgs) -> Result<()> {
    let settings = load_settings(&args.settings)?;
    let contacts = load_contacts(&args.contacts)?;

    let sampler: Box<dyn Sampler> = match &args.motion {
        Some(path) => Box::new(ThreadedSampler::new(ReplayMotion::new(load_motion(path)?))),
        None => Box::new(UnavailableSampler),
    };
    let recognizer: Box<dyn Recognizer> = match &args.transcript {
        Some(path) => Box::new(ThreadedRecognizer::new(ReplaySpeech::new(
            load_transcript(path)?,
        ))),
        None => Box::new(UnavailableRecognizer),
    };
    let phrase_store: Box<dyn PhraseStore + Send> = match args.phrase_store {
        Some(path) => Box::new(JsonPhraseStore::new(path)),
        None => Box::new(MemoryPhraseStore::default()),
    };
    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Location::new(lat, lon),
        _ => Location::unknown(),
    };

    let caps = Capabilities {
        sampler,
        recognizer,
        location: Box::new(FixedLocation(location)),
        dispatcher: Box::new(SmsDispatcher::new(ConsoleSender::new(args.fail_phone))),
        contacts: Box::new(contacts),
        notifications: Box::new(ConsoleNotifications),
        surface: Box::new(DetachedSurface::default()),
        phrase_store,
    };

    let mut engine = SosEngine::new(caps);
    let dispatched = Rc::new(Cell::new(false));
    let flag = Rc::clone(&dispatched);
    engine.subscribe(move |event: &EngineEvent| {
        match event {
            EngineEvent::CountdownStarted { source, remaining } => {
                println!("{source} trigger: alert in {remaining}s");
            }
            EngineEvent::CountdownTick { remaining } => println!("{remaining}..."),
            EngineEvent::DispatchCompleted(outcome) => {
                println!(
                    "dispatched: {} delivered, {} failed, {} skipped",
                    outcome.report.delivered_count(),
                    outcome.report.failed_count(),
                    outcome.report.skipped_count()
                );
                flag.set(true);
            }
            _ => {}
        }
    });

    let report = engine.apply_settings(settings);
    for err in &report.errors {
        log::warn!("{err}");
    }

    let deadline = Instant::now() + Duration::from_secs(args.max_seconds);
    engine.run_until(|_| dispatched.get() || Instant::now() >= deadline);
    engine.shutdown();

    if !dispatched.get() {
        log::info!("no alert dispatched within {}s", args.max_seconds);
    }
    Ok(())
}
