use super::config::SessionConfig;
use super::events::{Completion, Sequence, SessionEvent, UserAction};
use super::stats::SessionStats;
use crate::api::ApiClient;
use crate::connection::{
    Connection, ConnectionEvent, ConnectionManager, Origin, Reachability, Transport, WsTransport,
};
use crate::dispatcher::Dispatcher;
use crate::protocol::OutboundMessage;
use crate::ui::{Synchronizer, UiEvent, View, VisibleState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Capacity of the session event queue
const EVENT_QUEUE: usize = 256;

/// A client session: connection manager plus the single state-owning event loop
pub struct ClientSession {
    config: SessionConfig,
    origin: Origin,
    transport: Arc<dyn Transport>,
    api: ApiClient,
}

/// Handle to a running session
pub struct SessionHandle {
    session_id: String,
    events: mpsc::Sender<SessionEvent>,
    manager_task: JoinHandle<Connection>,
    loop_task: JoinHandle<SessionStats>,
}

impl ClientSession {
    /// Create a session that talks WebSocket to the configured server
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(WsTransport::new()))
    }

    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let origin = Origin::parse(&config.server_url)?;
        let api = ApiClient::new(origin.clone()).context("Failed to create API client")?;

        info!(
            "Creating client session {} for {}",
            config.session_id,
            origin.channel_url()
        );

        Ok(Self {
            config,
            origin,
            transport,
            api,
        })
    }

    /// Spawn the connection manager and the event loop
    pub fn start(self, view: Box<dyn View>) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);

        let manager = ConnectionManager::new(
            Arc::clone(&self.transport),
            self.origin.channel_url(),
            self.config.retry_delay,
        );
        let manager_task = tokio::spawn(manager.run(events_tx.clone()));

        let event_loop = EventLoop {
            session_id: self.config.session_id.clone(),
            started_at: Utc::now(),
            state: VisibleState::default(),
            synchronizer: Synchronizer::new(&self.config.time_format),
            dispatcher: Dispatcher::new(),
            api: self.api,
            view,
            events: events_tx.clone(),
            epoch: 0,
            outbound: None,
            listening_seq: Sequence::default(),
            devices_seq: Sequence::default(),
            connection_attempts: 0,
            connections_opened: 0,
        };
        let loop_task = tokio::spawn(event_loop.run(events_rx));

        info!("Client session {} started", self.config.session_id);

        SessionHandle {
            session_id: self.config.session_id,
            events: events_tx,
            manager_task,
            loop_task,
        }
    }
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue a user action behind any events already received
    pub async fn send(&self, action: UserAction) -> Result<()> {
        self.events
            .send(action.into())
            .await
            .context("Session is no longer running")
    }

    /// Stop the session and return final statistics
    pub async fn stop(self) -> Result<SessionStats> {
        info!("Stopping client session {}", self.session_id);

        self.manager_task.abort();
        if let Err(e) = self.manager_task.await {
            if !e.is_cancelled() {
                error!("Connection manager panicked: {}", e);
            }
        }

        // Events queued before the shutdown marker are still handled
        self.events
            .send(SessionEvent::Shutdown)
            .await
            .context("Session loop already stopped")?;

        let stats = self.loop_task.await.context("Session loop panicked")?;
        info!("Client session {} stopped", self.session_id);

        Ok(stats)
    }
}

/// Owns `VisibleState`; handles one event to completion before the next
struct EventLoop {
    session_id: String,
    started_at: DateTime<Utc>,
    state: VisibleState,
    synchronizer: Synchronizer,
    dispatcher: Dispatcher,
    api: ApiClient,
    view: Box<dyn View>,
    /// Used only to hand one-shot completions back to this loop
    events: mpsc::Sender<SessionEvent>,
    /// Epoch of the currently open channel, 0 before the first open
    epoch: u64,
    outbound: Option<mpsc::Sender<String>>,
    /// Calls that write the listening flag: toggles and snapshots
    listening_seq: Sequence,
    /// Calls that write device state: selections and snapshots
    devices_seq: Sequence,
    connection_attempts: u64,
    connections_opened: u64,
}

impl EventLoop {
    async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> SessionStats {
        debug!("Session loop {} running", self.session_id);

        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Connection(event) => self.on_connection(event),
                SessionEvent::User(action) => self.on_user(action),
                SessionEvent::Completed(completion) => self.on_completion(completion),
                SessionEvent::Shutdown => break,
            }
        }

        self.stats()
    }

    fn on_connection(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connecting { attempt } => {
                self.connection_attempts = attempt;
            }
            ConnectionEvent::Reachable { epoch, outbound } => {
                self.epoch = epoch;
                self.outbound = Some(outbound);
                self.connections_opened += 1;
                self.apply(UiEvent::Reachability(Reachability::Reachable));
                self.initialize(epoch);
            }
            ConnectionEvent::Frame(raw) => {
                if let Some(event) = self.dispatcher.dispatch(&raw) {
                    self.apply(event);
                }
            }
            ConnectionEvent::Unreachable => {
                self.outbound = None;
                self.apply(UiEvent::Reachability(Reachability::Unreachable));
            }
        }
    }

    fn on_user(&mut self, action: UserAction) {
        debug!("User action: {:?}", action);

        match action {
            UserAction::ResetChat => self.apply(UiEvent::ResetChat),
            UserAction::ToggleListening => {
                let ticket = self.listening_seq.issue();
                let api = self.api.clone();
                self.spawn_call(async move {
                    match api.toggle_listening().await {
                        Ok(response) => Some(Completion::Listening {
                            ticket,
                            listening: response.is_listening(),
                        }),
                        Err(e) => {
                            warn!("Toggle listening failed: {:#}", e);
                            None
                        }
                    }
                });
            }
            UserAction::SelectDevice(index) => {
                let ticket = self.devices_seq.issue();
                let api = self.api.clone();
                self.spawn_call(async move {
                    match api.select_device(index).await {
                        Ok(()) => Some(Completion::DeviceSelected { ticket, index }),
                        Err(e) => {
                            warn!("Device selection failed: {:#}", e);
                            None
                        }
                    }
                });
            }
            UserAction::SendTranscription(text) => self.send_transcription(text),
            UserAction::UpdateKey { provider, key } => {
                let api = self.api.clone();
                self.spawn_call(async move {
                    match api.update_key(provider, &key).await {
                        Ok(response) => Some(Completion::KeyUpdated {
                            provider,
                            status: response.status,
                        }),
                        Err(e) => {
                            warn!("Key update failed: {:#}", e);
                            None
                        }
                    }
                });
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Snapshot {
                epoch,
                listening_ticket,
                devices_ticket,
                snapshot,
            } => {
                // Superseded by a later close or reopen
                if epoch != self.epoch || self.outbound.is_none() {
                    debug!(
                        "Discarding snapshot for epoch {} (current {})",
                        epoch, self.epoch
                    );
                    return;
                }
                if self.listening_seq.accept(listening_ticket) {
                    self.apply(UiEvent::Listening(snapshot.status.is_listening));
                } else {
                    debug!("Discarding snapshot listening status, a later toggle applied");
                }
                // The list stays valid after a selection; older selections are outdated by it
                self.devices_seq.supersede(devices_ticket);
                self.apply(UiEvent::Devices(snapshot.devices));
            }
            Completion::Listening { ticket, listening } => {
                if self.listening_seq.accept(ticket) {
                    self.apply(UiEvent::Listening(listening));
                } else {
                    debug!("Discarding toggle result {}, a later result applied", ticket);
                }
            }
            Completion::DeviceSelected { ticket, index } => {
                if self.devices_seq.accept(ticket) {
                    self.apply(UiEvent::DeviceSelected(index));
                } else {
                    debug!("Discarding selection of device {}, superseded", index);
                }
            }
            Completion::KeyUpdated { provider, status } => {
                info!("Key update for {}: {}", provider.as_str(), status);
            }
        }
    }

    /// Fetch status and devices for a freshly opened channel
    fn initialize(&mut self, epoch: u64) {
        let listening_ticket = self.listening_seq.issue();
        let devices_ticket = self.devices_seq.issue();
        let api = self.api.clone();
        self.spawn_call(async move {
            match api.snapshot().await {
                Ok(snapshot) => Some(Completion::Snapshot {
                    epoch,
                    listening_ticket,
                    devices_ticket,
                    snapshot,
                }),
                Err(e) => {
                    warn!("Initialization failed: {:#}", e);
                    None
                }
            }
        });
    }

    fn send_transcription(&self, text: String) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let Some(outbound) = &self.outbound else {
            warn!("Offline, dropping transcription");
            return;
        };

        let frame = match OutboundMessage::Transcription(text.to_string()).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize transcription: {}", e);
                return;
            }
        };

        match outbound.try_send(frame) {
            Ok(()) => debug!("Sent transcription ({} chars)", text.len()),
            Err(TrySendError::Full(_)) => warn!("Outbound queue full, dropping transcription"),
            Err(TrySendError::Closed(_)) => warn!("Channel closed, dropping transcription"),
        }
    }

    /// Run a one-shot call off the loop; its result re-enters as an event
    fn spawn_call<F>(&self, call: F)
    where
        F: Future<Output = Option<Completion>> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Some(completion) = call.await {
                let _ = events.send(SessionEvent::Completed(completion)).await;
            }
        });
    }

    fn apply(&mut self, event: UiEvent) {
        let changes = self.synchronizer.apply(&mut self.state, event);
        self.view.render(&self.state, &changes);
    }

    fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            connection_attempts: self.connection_attempts,
            connections_opened: self.connections_opened,
            frames: self.dispatcher.stats(),
            bubbles: self.state.chat.len(),
            history_entries: self.state.history.len(),
        }
    }
}
