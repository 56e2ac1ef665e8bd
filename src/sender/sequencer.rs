//! Sequential delivery of a whole row set.
//!
//! Rows are cut into batches of [`BATCH_SIZE`](crate::buffer::BATCH_SIZE) and
//! sent strictly one after another: batch N+1 is not issued before batch N has
//! an outcome. A failed batch is counted and logged, and the remaining batches
//! are still sent. There is no retry.

use super::transmission::{BatchTransport, RequestTarget};
use crate::buffer::{BatchConfig, batch_count, partition};
use crate::domain::{Destination, RowSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Sending,
}

/// Progress after a batch has completed, successfully or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed_batches: usize,
    pub total_batches: usize,
    pub percent: u8,
}

impl Progress {
    pub fn new(completed_batches: usize, total_batches: usize) -> Self {
        Self {
            completed_batches,
            total_batches,
            percent: percent(completed_batches, total_batches),
        }
    }
}

/// `round(100 * completed / total)`, halves rounded up.
fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    FullSuccess,
    PartialSuccess,
    FullFailure,
}

/// Counts accumulated over every batch of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransmissionSummary {
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub total_batches: usize,
    pub failed_batches: usize,
}

impl TransmissionSummary {
    pub fn classification(&self) -> Classification {
        if self.error_count == 0 {
            Classification::FullSuccess
        } else if self.success_count == 0 {
            Classification::FullFailure
        } else {
            Classification::PartialSuccess
        }
    }

    pub fn message(&self) -> String {
        match self.classification() {
            Classification::FullSuccess => {
                format!("Successfully sent {} records to New Relic.", self.success_count)
            }
            Classification::FullFailure => {
                format!("Failed to send all {} records to New Relic.", self.total_rows)
            }
            Classification::PartialSuccess => format!(
                "Partially successful: Sent {} records, failed to send {} records.",
                self.success_count, self.error_count
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another send is in flight on this sequencer.
    AlreadySending,
    /// The row set is empty.
    NothingToSend,
    /// No destination has been saved yet.
    NotConfigured,
    /// No file has been uploaded yet.
    NoData,
}

impl SkipReason {
    /// Hint shown next to a disabled send trigger.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SkipReason::NotConfigured => Some("Please configure New Relic settings first."),
            SkipReason::NoData => Some("Please upload a data file first."),
            SkipReason::AlreadySending | SkipReason::NothingToSend => None,
        }
    }
}

/// Terminal output of [`BatchSequencer::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Completed(TransmissionSummary),
    /// Failed before any batch could be attempted.
    Aborted { reason: String },
    Skipped(SkipReason),
}

impl SendOutcome {
    pub fn summary(&self) -> Option<&TransmissionSummary> {
        match self {
            SendOutcome::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    /// User-facing message. Skipped sends only have one when the trigger was
    /// missing a precondition.
    pub fn message(&self) -> Option<String> {
        match self {
            SendOutcome::Completed(summary) => Some(summary.message()),
            SendOutcome::Aborted { reason } => Some(format!("Error: {reason}")),
            SendOutcome::Skipped(reason) => reason.hint().map(str::to_string),
        }
    }

    /// Whether the outcome counts as a success to the user. Partial delivery
    /// does.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SendOutcome::Completed(summary)
                if summary.classification() != Classification::FullFailure
        )
    }
}

/// Resets the sequencer to idle however the send ends.
struct SendingGuard<'a> {
    sending: &'a AtomicBool,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.sending.store(false, Ordering::Release);
    }
}

/// Sends row sets batch by batch. At most one send is in flight per instance.
pub struct BatchSequencer<T> {
    transport: T,
    config: BatchConfig,
    sending: AtomicBool,
}

impl<T: BatchTransport> BatchSequencer<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BatchConfig::default())
    }

    pub fn with_config(transport: T, config: BatchConfig) -> Self {
        Self {
            transport,
            config,
            sending: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> SequencerState {
        if self.sending.load(Ordering::Acquire) {
            SequencerState::Sending
        } else {
            SequencerState::Idle
        }
    }

    pub fn is_sending(&self) -> bool {
        self.state() == SequencerState::Sending
    }

    fn try_begin(&self) -> Option<SendingGuard<'_>> {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendingGuard {
                sending: &self.sending,
            })
    }

    /// Send every row of `rows` to `destination`.
    ///
    /// `on_progress` is called once after each batch, with non-decreasing
    /// percentages ending at 100. A call made while another send is in flight
    /// returns [`SkipReason::AlreadySending`] without touching the network.
    pub async fn send<F>(
        &self,
        destination: &Destination,
        rows: &RowSet,
        mut on_progress: F,
    ) -> SendOutcome
    where
        F: FnMut(Progress),
    {
        let Some(_guard) = self.try_begin() else {
            warn!("Send requested while another send is in flight; ignoring");
            return SendOutcome::Skipped(SkipReason::AlreadySending);
        };

        if rows.is_empty() {
            return SendOutcome::Skipped(SkipReason::NothingToSend);
        }

        let target = match RequestTarget::new(destination) {
            Ok(target) => target,
            Err(e) => {
                error!("Error in send process: {}", e);
                return SendOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        };

        let batches = partition(rows, self.config);
        let mut summary = TransmissionSummary {
            total_rows: rows.len(),
            total_batches: batch_count(rows.len(), self.config.max_size),
            ..Default::default()
        };

        info!(
            "Sending {} rows in {} batches to {}",
            summary.total_rows, summary.total_batches, target.url
        );

        for batch in &batches {
            match self.transport.send_batch(&target, batch).await {
                Ok(result) if result.success => summary.success_count += batch.size(),
                Ok(result) => {
                    warn!(
                        "Batch {} failed with HTTP {} ({} rows counted as errors)",
                        batch.index(),
                        result.status_code,
                        batch.size()
                    );
                    summary.error_count += batch.size();
                    summary.failed_batches += 1;
                }
                Err(e) => {
                    error!("Error sending batch {}: {}", batch.index(), e);
                    summary.error_count += batch.size();
                    summary.failed_batches += 1;
                }
            }

            on_progress(Progress::new(batch.index() + 1, summary.total_batches));
        }

        info!(
            success = summary.success_count,
            errors = summary.error_count,
            "{}",
            summary.message()
        );

        SendOutcome::Completed(summary)
    }
}

impl<T> fmt::Debug for BatchSequencer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSequencer")
            .field("config", &self.config)
            .field("sending", &self.sending.load(Ordering::Relaxed))
            .finish()
    }
}
