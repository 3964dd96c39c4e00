//! # Submission Records
//!
//! Lifecycle of one queued ledger write.
//!
//! ```text
//! Pending ──► Submitted ──► Confirmed
//!                   └─────► Failed
//! ```
//!
//! `attempt_count` increments on every entry into `Submitted`.

use super::command::Command;
use super::errors::ChannelError;
use super::value_objects::{Proof, SubmissionId, TxHash};

/// Submission state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    /// Waiting in the queue.
    Pending,
    /// Being signed and sent.
    Submitted,
    /// Accepted by the ledger.
    Confirmed,
    /// Ended with an error.
    Failed,
}

impl SubmissionState {
    /// Confirmed or Failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Confirmed | SubmissionState::Failed)
    }
}

/// One command's trip through the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub command: Command,
    /// Proof used for the last attempt. Never persisted.
    pub proof: Option<Proof>,
    pub state: SubmissionState,
    pub attempt_count: u32,
    pub last_error: Option<ChannelError>,
    /// Ledger hash once confirmed.
    pub hash: Option<TxHash>,
}

impl SubmissionRecord {
    /// Fresh pending record.
    pub fn new(id: SubmissionId, command: Command) -> Self {
        Self {
            id,
            command,
            proof: None,
            state: SubmissionState::Pending,
            attempt_count: 0,
            last_error: None,
            hash: None,
        }
    }

    /// New pending record for the same command, keeping the attempt history.
    pub fn retry_of(previous: &SubmissionRecord, id: SubmissionId) -> Self {
        Self {
            attempt_count: previous.attempt_count,
            last_error: previous.last_error.clone(),
            ..Self::new(id, previous.command.clone())
        }
    }

    pub(crate) fn mark_submitted(&mut self) {
        debug_assert_eq!(self.state, SubmissionState::Pending);
        self.state = SubmissionState::Submitted;
        self.attempt_count += 1;
    }

    pub(crate) fn confirm(&mut self, hash: TxHash) {
        debug_assert_eq!(self.state, SubmissionState::Submitted);
        self.state = SubmissionState::Confirmed;
        self.hash = Some(hash);
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, error: ChannelError) {
        debug_assert!(!self.state.is_terminal());
        self.state = SubmissionState::Failed;
        self.last_error = Some(error);
    }

    /// Whether the record reached a final state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The ledger hash, or the failure that ended the submission.
    pub fn outcome(&self) -> Result<&TxHash, ChannelError> {
        match (&self.hash, &self.last_error) {
            (Some(hash), _) if self.state == SubmissionState::Confirmed => Ok(hash),
            (_, Some(error)) => Err(error.clone()),
            _ => Err(ChannelError::QueueClosed),
        }
    }
}

/// Terminal records of a batch, partitioned by outcome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    pub confirmed: Vec<SubmissionRecord>,
    pub failed: Vec<SubmissionRecord>,
}

impl BatchOutcome {
    /// Partition terminal records, preserving order within each side.
    pub fn from_records(records: impl IntoIterator<Item = SubmissionRecord>) -> Self {
        let (confirmed, failed) = records
            .into_iter()
            .partition(|record| record.state == SubmissionState::Confirmed);
        Self { confirmed, failed }
    }

    /// True when nothing failed.
    pub fn all_confirmed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.confirmed.len() + self.failed.len()
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
