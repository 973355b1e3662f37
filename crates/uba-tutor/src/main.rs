//! A terminal chat with the UBA tutor.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;
use uba_tutor_core::{RequestOutcome, Session, SessionBuilder};
use uba_tutor_gemini_model::{GeminiConfigBuilder, GeminiProvider};

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        // The session itself is the error channel: the tutor will
        // answer every exchange with the apology turn.
        eprintln!(
            "GEMINI_API_KEY no está configurada; el tutor no va a poder \
             responder."
        );
    }
    let mut config = GeminiConfigBuilder::with_api_key(api_key);
    if let Ok(model) = env::var("GEMINI_MODEL") {
        config = config.with_model(model);
    }
    if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    let provider = GeminiProvider::new(config.build());

    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let session = SessionBuilder::with_provider(provider)
        .on_update(move |turns, pending| {
            let preview = turns
                .last()
                .map(|turn| turn.text().replace('\n', " "))
                .unwrap_or_default();
            update_tx.send((preview, pending)).ok();
        })
        .open();

    // The seeded greeting.
    if let Some(turn) = session.turns().first() {
        print_tutor_turn(turn.text());
    }

    // An optional course argument opens the chat with an automatic
    // study-plan exchange.
    if let Some(materia) = env::args().nth(1) {
        run_exchange(&session, session.request_plan(&materia), &mut update_rx)
            .await;
    }

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        run_exchange(&session, session.send(message), &mut update_rx).await;
    }
}

/// Drives one exchange to completion, previewing the streamed reply in
/// the spinner, then prints the settled tutor turn.
async fn run_exchange(
    session: &Session,
    exchange: impl Future<Output = RequestOutcome>,
    update_rx: &mut mpsc::UnboundedReceiver<(String, bool)>,
) {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message("🤔 Pensando...");

    let mut exchange = pin!(exchange);
    let outcome = loop {
        select! {
            outcome = &mut exchange => break outcome,
            update = update_rx.recv() => {
                if let Some((preview, pending)) = update {
                    if pending && !preview.is_empty() {
                        progress_bar.set_message(format!("🎓 {preview}"));
                    }
                }
                progress_bar.inc(1);
            }
            _ = sleep(Duration::from_millis(100)) => {
                progress_bar.inc(1);
            }
        }
    };
    progress_bar.finish_and_clear();

    // Drop whatever updates are left over from this exchange.
    while update_rx.try_recv().is_ok() {}

    // Rejected and blank submissions stay silent, like the portal UI
    // that simply keeps the input disabled.
    if outcome == RequestOutcome::Settled {
        if let Some(turn) = session.turns().last() {
            print_tutor_turn(turn.text());
        }
    }
}

fn print_tutor_turn(text: &str) {
    println!("{}🎓 {}", BAR_CHAR.bright_cyan(), text.bright_white());
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
