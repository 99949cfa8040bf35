use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use dostu_persist::HistoryEntry;
use dostu_session::{CancellationToken, SendOutcome, SessionCoordinator};

use crate::command::{Command, HELP};
use crate::render;

/// Line-oriented chat host driving a [`SessionCoordinator`]
pub struct Repl<R, W> {
    coordinator: SessionCoordinator,
    input: R,
    output: W,
    /// Session ids of the last history or search listing, for `/open <n>`
    listing: Vec<String>,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(coordinator: SessionCoordinator, input: R, output: W) -> Self {
        Self {
            coordinator,
            input,
            output,
            listing: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (SessionCoordinator, W) {
        (self.coordinator, self.output)
    }

    /// Run until `/quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        let opened = render::session(self.coordinator.initialize().await);
        self.say(&opened).await?;

        loop {
            // Pick up changes another process made to the active chat
            if self.coordinator.on_foreground_refresh().await {
                if let Some(session) = self.coordinator.active_session() {
                    let text = render::session(session);
                    self.say(&text).await?;
                }
            }

            self.output.write_all(b"> ").await?;
            self.output.flush().await?;

            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                break;
            }

            match Command::parse(&line) {
                Command::Quit => break,
                Command::Empty => {}
                command => self.execute(command).await?,
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Send(text) => {
                let outcome = self.send(&text).await;
                self.report(outcome).await?;
            }
            Command::Retry => {
                let outcome = self.coordinator.retry_last().await;
                if outcome == SendOutcome::Ignored {
                    self.say("Nothing to retry").await?;
                } else {
                    self.report(outcome).await?;
                }
            }
            Command::New => {
                let text = render::session(self.coordinator.start_new_session().await);
                self.say(&text).await?;
            }
            Command::History => {
                let entries = self.coordinator.history_entries().await;
                self.show_listing(entries).await?;
            }
            Command::Search(query) => {
                let now = Utc::now();
                let entries = self
                    .coordinator
                    .search_history(&query)
                    .await
                    .iter()
                    .map(|session| HistoryEntry::from_session(session, now))
                    .collect();
                self.show_listing(entries).await?;
            }
            Command::Open(target) => {
                let id = self.resolve(&target);
                match self.coordinator.select_session(&id).await.map(render::session) {
                    Ok(text) => self.say(&text).await?,
                    Err(e) => {
                        tracing::warn!(session_id = %id, "Failed to open chat: {}", e);
                        self.say(&format!("Chat not found: {}", target)).await?;
                    }
                }
            }
            Command::Delete(target) => {
                let id = self.resolve(&target);
                match self.coordinator.delete_session(&id).await {
                    Ok(()) => {
                        self.listing.retain(|listed| listed != &id);
                        self.say("Chat deleted").await?;
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %id, "Failed to delete chat: {}", e);
                        self.say(&format!("Could not delete chat: {}", target)).await?;
                    }
                }
            }
            Command::Help => self.say(HELP).await?,
            Command::Unknown(input) => {
                self.say(&format!("Unknown command: {} (try /help)", input)).await?;
            }
            Command::Quit | Command::Empty => {}
        }
        Ok(())
    }

    /// Send with Ctrl-C mapped to cancellation of the in-flight exchange
    async fn send(&mut self, text: &str) -> SendOutcome {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });

        let outcome = self
            .coordinator
            .send_message_with_cancel(text, Some(cancel))
            .await;
        interrupt.abort();
        outcome
    }

    async fn report(&mut self, outcome: SendOutcome) -> Result<()> {
        match outcome {
            SendOutcome::Succeeded => {
                if let Some(reply) = self.coordinator.messages().last() {
                    let text = render::message(reply);
                    self.say(&text).await?;
                }
            }
            SendOutcome::Failed => {
                if let Some(notice) = self.coordinator.messages().last() {
                    let text = render::message(notice);
                    self.say(&text).await?;
                }
                let label = self.coordinator.attempt_label().unwrap_or_default();
                let hint = format!("Type /retry to try again {}", label);
                self.say(hint.trim_end()).await?;
            }
            SendOutcome::Busy => self.say("Still waiting for the previous reply").await?,
            SendOutcome::Ignored => {}
        }
        Ok(())
    }

    async fn show_listing(&mut self, entries: Vec<HistoryEntry>) -> Result<()> {
        self.listing = entries.iter().map(|entry| entry.id.clone()).collect();
        self.say(&render::history(&entries)).await
    }

    /// A 1-based listing position, otherwise the argument as a session id
    fn resolve(&self, target: &str) -> String {
        target
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.listing.get(i))
            .cloned()
            .unwrap_or_else(|| target.to_string())
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
