// src/app.rs
use barista_config::{BaristaConfig, ScriptConfig};
use barista_core::{BaristaError, BaristaResult, OutputEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use crate::engine::DialogueEngine;
use crate::handlers::build_engine;
use crate::session::{OrderDraft, Session};

pub struct BaristaApp {
    engine: DialogueEngine,
    session: Session,
    scripted_utterances: Vec<String>,
    completed: Vec<OrderDraft>,
}

impl BaristaApp {
    pub fn new(config: BaristaConfig) -> BaristaResult<Self> {
        info!("Initializing barista components...");

        // Load dialogue script
        let script = match &config.app.script_path {
            Some(path) => {
                info!("Loading dialogue script from {:?}", path);
                ScriptConfig::load(path)?
            }
            None => ScriptConfig::builtin()?,
        };

        // Build engine
        let engine = build_engine(&script, &config)?;
        Ok(Self::with_engine(engine, config.app.scripted_utterances))
    }

    pub fn with_engine(engine: DialogueEngine, scripted_utterances: Vec<String>) -> Self {
        Self {
            engine,
            session: Session::new(),
            scripted_utterances,
            completed: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn completed_orders(&self) -> &[OrderDraft] {
        &self.completed
    }

    // Handles one utterance. A finished conversation is replaced by a fresh
    // session before the next utterance is processed.
    pub fn handle(&mut self, utterance: &str) -> BaristaResult<Vec<OutputEvent>> {
        if self.session.is_finished() {
            info!("Session {} finished, starting a new one", self.session.id());
            self.session = Session::new();
        }

        let events = self.engine.handle_utterance(&mut self.session, utterance)?;
        if self.session.is_finished() {
            self.completed.push(self.session.draft().clone());
        }
        Ok(events)
    }

    pub async fn run(&mut self) -> BaristaResult<()> {
        info!("Starting barista assistant...");

        if !self.scripted_utterances.is_empty() {
            let utterances = std::mem::take(&mut self.scripted_utterances);
            info!("Replaying {} scripted utterances", utterances.len());
            return self.replay(&utterances, tokio::io::stdout()).await;
        }

        let stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            result = self.serve(stdin, tokio::io::stdout()) => result,
            result = signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Received shutdown signal");
                    Ok(())
                }
                Err(e) => {
                    error!("Failed to listen for shutdown signal: {}", e);
                    Err(BaristaError::Io(e))
                }
            },
        }
    }

    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> BaristaResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let utterance = line.trim();
            if utterance.is_empty() {
                continue;
            }
            self.respond(utterance, &mut writer).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    pub async fn replay<W>(&mut self, utterances: &[String], mut writer: W) -> BaristaResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        for utterance in utterances {
            info!("> {}", utterance);
            self.respond(utterance, &mut writer).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    async fn respond<W>(&mut self, utterance: &str, writer: &mut W) -> BaristaResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self.handle(utterance) {
            Ok(events) => {
                for event in events {
                    let mut line = serde_json::to_string(&event)?;
                    line.push('\n');
                    writer.write_all(line.as_bytes()).await?;
                }
            }
            Err(BaristaError::NoIntentMatched(text)) => warn!("No intent matched: {}", text),
            Err(e) => error!("Failed to handle '{}': {}", utterance, e),
        }
        Ok(())
    }
}
