use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rihla_core::{calendar, ConversationMemory, Locale};
use rihla_engine::MemoryEngine;
use rihla_observability::{init_tracing, AppMetrics};
use rihla_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "rihla")]
#[command(about = "Rihla Concierge CLI")]
struct Cli {
    /// Session snapshot file; every mutation rewrites it.
    #[arg(long, default_value = "rihla-sessions.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive loop that records each exchange into one session.
    Chat {
        #[arg(long, default_value = "cli-session")]
        session: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    /// Record a single exchange without entering the loop.
    Record {
        #[arg(long)]
        session: String,
        #[arg(long)]
        user_message: String,
        #[arg(long)]
        ai_response: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Greeting {
        #[arg(long)]
        session: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Suggest {
        #[arg(long)]
        session: String,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Export {
        #[arg(long)]
        session: String,
    },
    /// Restore a session exported earlier; reads the JSON record from stdin.
    Import,
    Clear {
        #[arg(long)]
        session: String,
    },
    Recent {
        #[arg(long)]
        session: String,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CalendarCommand {
    /// Holidays within the activity window of a date (default: today).
    Holidays {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Season {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Customs {
        #[arg(long, default_value = "en")]
        locale: String,
    },
    Glossary {
        #[arg(long, default_value = "en")]
        locale: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("rihla_cli");
    let cli = Cli::parse();

    let engine = MemoryEngine::load(
        Arc::new(Store::file(&cli.snapshot)),
        AppMetrics::shared(),
    )
    .await;

    match cli.command {
        Command::Chat { session, locale } => {
            let locale = Locale::from_optional_str(Some(&locale));
            run_chat(&engine, &session, locale).await?;
        }
        Command::Record {
            session,
            user_message,
            ai_response,
            locale,
        } => {
            let locale = Locale::from_optional_str(Some(&locale));
            let interaction = engine
                .add_interaction(&session, &user_message, &ai_response, locale, None)
                .await;
            println!("{}", serde_json::to_string_pretty(&interaction)?);
        }
        Command::Greeting { session, locale } => {
            let locale = Locale::from_optional_str(Some(&locale));
            println!("{}", engine.personalized_greeting(&session, locale));
        }
        Command::Suggest { session, locale } => {
            let locale = Locale::from_optional_str(Some(&locale));
            for suggestion in engine.contextual_suggestions(&session, locale) {
                println!("- {suggestion}");
            }
        }
        Command::Export { session } => {
            let memory = engine
                .export_memory(&session)
                .with_context(|| format!("no memory recorded for session {session}"))?;
            println!("{}", serde_json::to_string_pretty(&memory)?);
        }
        Command::Import => {
            let memory: ConversationMemory = serde_json::from_reader(io::stdin())
                .context("stdin did not hold a valid session record")?;
            let session_id = memory.session_id.clone();
            engine.import_memory(memory).await;
            println!("imported session {session_id}");
        }
        Command::Clear { session } => {
            engine.clear_memory(&session).await;
            println!("cleared session {session}");
        }
        Command::Recent { session, count } => {
            let interactions = engine.recent_interactions(&session, count);
            println!("{}", serde_json::to_string_pretty(&interactions)?);
        }
        Command::Calendar { command } => run_calendar(command)?,
    }

    Ok(())
}

async fn run_chat(
    engine: &MemoryEngine<Store>,
    session_id: &str,
    locale: Locale,
) -> Result<()> {
    println!("{}", engine.personalized_greeting(session_id, locale));
    println!("(type 'exit' to quit)");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let reply = match locale {
            Locale::En => "Noted. Tell me more about your trip.",
            Locale::Ar => "تم التسجيل. أخبرني المزيد عن رحلتك.",
        };
        engine
            .add_interaction(session_id, message, reply, locale, None)
            .await;

        println!("\n{reply}\n");
        for suggestion in engine.contextual_suggestions(session_id, locale) {
            println!("- {suggestion}");
        }
    }

    Ok(())
}

fn run_calendar(command: CalendarCommand) -> Result<()> {
    match command {
        CalendarCommand::Holidays { date, locale } => {
            let reference = parse_date(date.as_deref())?;
            let locale = Locale::from_optional_str(Some(&locale));
            for holiday in calendar::active_holidays(reference) {
                println!(
                    "{} ({}): {}",
                    holiday.name.for_locale(locale),
                    holiday.date,
                    holiday.travel_considerations.for_locale(locale)
                );
            }
        }
        CalendarCommand::Season { date, locale } => {
            let reference = parse_date(date.as_deref())?;
            let locale = Locale::from_optional_str(Some(&locale));
            if let Some(season) = calendar::active_season(reference) {
                println!(
                    "{}: {}",
                    season.name.for_locale(locale),
                    season.travel_impact.for_locale(locale)
                );
            }
        }
        CalendarCommand::Customs { locale } => {
            let locale = Locale::from_optional_str(Some(&locale));
            for custom in calendar::regional_customs() {
                println!(
                    "[{}] {}: {}",
                    custom.region,
                    custom.summary.for_locale(locale),
                    custom.advice.for_locale(locale)
                );
            }
        }
        CalendarCommand::Glossary { locale } => {
            let locale = Locale::from_optional_str(Some(&locale));
            for entry in calendar::glossary() {
                println!(
                    "{}: {}",
                    entry.term.for_locale(locale),
                    entry.definition.for_locale(locale)
                );
            }
        }
    }
    Ok(())
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(Utc::now().date_naive()),
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .context("--date must be formatted YYYY-MM-DD"),
    }
}
