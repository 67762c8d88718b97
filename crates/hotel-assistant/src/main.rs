//! A terminal chat with the hotel assistant.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use hotel_assistant::core::stream::{self, Render, StreamingTranscript};
use hotel_assistant::core::{EmbeddingClient, ModelClient};
use hotel_assistant::{AssistantConfig, InventorySource, SessionBuilder};
use hotel_assistant_inventory::{
    HttpInventory, InventoryBackend, MemoryInventory,
};
use hotel_assistant_openai_model::OpenAIProvider;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

/// Prints streamed reply text, clearing the spinner on the first chunk.
struct TerminalRenderer {
    spinner: ProgressBar,
    printed: usize,
}

impl Render for TerminalRenderer {
    fn render(&mut self, transcript: &str) {
        let Some(fresh) = transcript.get(self.printed..) else {
            return;
        };
        if fresh.is_empty() {
            return;
        }
        if self.printed == 0 {
            self.spinner.finish_and_clear();
            print!("{}🤖 ", BAR_CHAR.bright_cyan());
        }
        print!("{}", fresh.bright_white());
        std::io::stdout().flush().ok();
        self.printed = transcript.len();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match AssistantConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("loaded config: {:?}", config);

    let inventory: Arc<dyn InventoryBackend> = match &config.inventory {
        InventorySource::Memory => Arc::new(MemoryInventory::seeded()),
        InventorySource::Http(base_url) => match HttpInventory::new(base_url) {
            Ok(inventory) => Arc::new(inventory),
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        },
    };

    let model_client =
        ModelClient::new(OpenAIProvider::new(config.chat_config()));
    let embedding_client =
        EmbeddingClient::new(OpenAIProvider::new(config.embedding_config()));

    let mut session =
        match SessionBuilder::new(model_client, embedding_client, inventory)
            .with_max_tool_rounds(config.max_tool_rounds)
            .build()
            .await
        {
            Ok(session) => session,
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        };

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(progress_style.clone());
        spinner.set_message("🤔 Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let renderer = TerminalRenderer {
            spinner: spinner.clone(),
            printed: 0,
        };
        let (chunk_tx, chunk_rx) = stream::channel();
        let (result, transcript) = tokio::join!(
            session.send_message(line, Some(chunk_tx)),
            StreamingTranscript::new(renderer).consume(chunk_rx),
        );
        spinner.finish_and_clear();

        if !transcript.is_empty() {
            println!();
        }
        match result {
            Ok(summary) => {
                debug!("turn finished: {:?}", summary);
            }
            Err(err) => {
                error!("turn failed: {}", err);
                println!("{}❌ {}", BAR_CHAR.bright_red(), err.red());
            }
        }
        println!();
    }
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
