//! Lifecycle signals published when appointments change state.
//!
//! Downstream consumers (notification senders, analytics) subscribe to a
//! [`SignalBus`] shared via `Arc`. Delivery is in-process fan-out over a
//! `tokio::sync::broadcast` channel; a signal published with no subscribers
//! is dropped, which is fine because every transition is also persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::appointment::Appointment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Scheduled,
    Cancelled,
    Completed,
    StartingSoon,
}

impl SignalKind {
    /// Dot-separated signal name, e.g. `"appointment.scheduled"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Scheduled => "appointment.scheduled",
            SignalKind::Cancelled => "appointment.cancelled",
            SignalKind::Completed => "appointment.completed",
            SignalKind::StartingSoon => "appointment.starting_soon",
        }
    }
}

/// Snapshot of an appointment at the moment of a lifecycle transition.
///
/// Signals carry everything a consumer needs to act without a database
/// round-trip: the parties, the service, the booked window and the provider
/// timezone the window was booked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSignal {
    pub kind: SignalKind,
    pub appointment_id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub emitted_at: DateTime<Utc>,
}

impl AppointmentSignal {
    /// Build a signal from an appointment's current state.
    pub fn for_appointment(
        kind: SignalKind,
        appointment: &Appointment,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            appointment_id: appointment.id,
            client_id: appointment.client_id,
            provider_id: appointment.provider_id,
            service_id: appointment.service_id,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            timezone: appointment.timezone.clone(),
            emitted_at,
        }
    }
}

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for [`AppointmentSignal`]s.
pub struct SignalBus {
    sender: broadcast::Sender<AppointmentSignal>,
}

impl SignalBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed signals are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a signal to all current subscribers.
    pub fn publish(&self, signal: AppointmentSignal) {
        // SendError only means there are zero receivers right now.
        let _ = self.sender.send(signal);
    }

    /// Subscribe to every signal published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentSignal> {
        self.sender.subscribe()
    }

    /// Spawn a task that logs every signal at info level.
    ///
    /// Both the API server and the scheduler attach one of these so lifecycle
    /// traffic is visible in the logs even when no other consumer is wired up.
    pub fn spawn_logger(&self) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(signal) => {
                        tracing::info!(
                            kind = signal.kind.as_str(),
                            appointment_id = %signal.appointment_id,
                            provider_id = %signal.provider_id,
                            start_time = %signal.start_time,
                            "lifecycle signal"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "signal logger lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
