//! # Submission Queue
//!
//! Serializes ledger writes.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | FIFO delivery | single `VecDeque`, popped from the front |
//! | At most one `Submitted` record | one drain task, guarded by `draining` |
//! | Failure isolation | a failed record is finalized and the drain continues |
//! | Panic isolation | each record is processed in its own task; a panic fails that record only |
//! | Nothing dropped | every record ends terminal, in its ticket and the archive |
//!
//! `pending`, `draining` and the archive live under one lock. The drain
//! clears `draining` under the same lock that observes the queue empty, so an
//! `enqueue` racing with the end of a drain always either lands in the
//! running drain or starts a new one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use channel_telemetry::{
    log_submission_event, HistogramTimer, QUEUE_DEPTH, SUBMISSIONS, SUBMISSIONS_ENQUEUED,
    SUBMISSION_DURATION,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::application::identity::IdentityProvider;
use crate::application::proof::ProofGenerator;
use crate::domain::{
    BatchOutcome, ChannelError, Command, SubmissionId, SubmissionRecord, SubmissionState,
};
use crate::ports::LedgerGateway;

/// Default number of terminal records kept for [`SubmissionQueue::completed`].
pub const DEFAULT_ARCHIVE_LIMIT: usize = 1024;

/// Handle to one enqueued submission.
#[derive(Debug)]
pub struct SubmissionTicket {
    /// Record as enqueued (state `Pending`).
    pub record: SubmissionRecord,
    completion: oneshot::Receiver<SubmissionRecord>,
}

impl SubmissionTicket {
    pub fn id(&self) -> SubmissionId {
        self.record.id
    }

    /// Wait for the terminal record.
    pub async fn wait(self) -> Result<SubmissionRecord, ChannelError> {
        self.completion.await.map_err(|_| ChannelError::QueueClosed)
    }
}

struct Queued {
    record: SubmissionRecord,
    reply: oneshot::Sender<SubmissionRecord>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Queued>,
    draining: bool,
    in_flight: Option<SubmissionId>,
    completed: VecDeque<SubmissionRecord>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    identity: Arc<IdentityProvider>,
    prover: ProofGenerator,
    ledger: Arc<dyn LedgerGateway>,
    next_id: AtomicU64,
    archive_limit: usize,
}

/// Ordered, single-flight submission queue.
///
/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct SubmissionQueue {
    inner: Arc<QueueInner>,
}

impl SubmissionQueue {
    pub fn new(identity: Arc<IdentityProvider>, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self::with_archive_limit(identity, ledger, DEFAULT_ARCHIVE_LIMIT)
    }

    /// Queue keeping at most `archive_limit` terminal records.
    pub fn with_archive_limit(
        identity: Arc<IdentityProvider>,
        ledger: Arc<dyn LedgerGateway>,
        archive_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                prover: ProofGenerator::new(identity.clone()),
                identity,
                ledger,
                next_id: AtomicU64::new(1),
                archive_limit,
            }),
        }
    }

    /// Append a command and make sure a drain is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, command: Command) -> SubmissionTicket {
        let id = SubmissionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.enqueue_record(SubmissionRecord::new(id, command))
    }

    /// Re-enqueue the command of a failed record as a new submission.
    pub fn retry(&self, record: &SubmissionRecord) -> SubmissionTicket {
        let id = SubmissionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let retry = SubmissionRecord::retry_of(record, id);
        log_submission_event!(info, "Retrying submission", retry.id, retry.command.kind(),
            previous = %record.id, attempts = retry.attempt_count);
        self.enqueue_record(retry)
    }

    fn enqueue_record(&self, record: SubmissionRecord) -> SubmissionTicket {
        let (reply, completion) = oneshot::channel();
        let start_drain = {
            let mut state = self.inner.state.lock();
            state.pending.push_back(Queued {
                record: record.clone(),
                reply,
            });
            QUEUE_DEPTH.set(state.pending.len() as f64);
            !std::mem::replace(&mut state.draining, true)
        };

        SUBMISSIONS_ENQUEUED.inc();
        log_submission_event!(debug, "Command enqueued", record.id, record.command.kind(),
            drain_started = start_drain);

        if start_drain {
            tokio::spawn(drain(self.inner.clone()));
        }

        SubmissionTicket { record, completion }
    }

    /// Enqueue and wait for the terminal record.
    pub async fn submit(&self, command: Command) -> Result<SubmissionRecord, ChannelError> {
        self.enqueue(command).wait().await
    }

    /// Enqueue all commands in order and partition the terminal records.
    pub async fn submit_batch(&self, commands: Vec<Command>) -> BatchOutcome {
        let tickets: Vec<SubmissionTicket> = commands
            .into_iter()
            .map(|command| self.enqueue(command))
            .collect();

        let mut records = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let mut snapshot = ticket.record.clone();
            let record = match ticket.wait().await {
                Ok(record) => record,
                Err(error) => {
                    snapshot.fail(error);
                    snapshot
                }
            };
            records.push(record);
        }
        BatchOutcome::from_records(records)
    }

    /// Archived terminal records, oldest first.
    pub fn completed(&self) -> Vec<SubmissionRecord> {
        self.inner.state.lock().completed.iter().cloned().collect()
    }

    /// Drain the archive.
    pub fn take_completed(&self) -> Vec<SubmissionRecord> {
        self.inner.state.lock().completed.drain(..).collect()
    }

    /// Records waiting behind the in-flight one.
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Record currently being signed or submitted.
    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.inner.state.lock().in_flight
    }

    /// True while a drain task is running.
    pub fn is_draining(&self) -> bool {
        self.inner.state.lock().draining
    }
}

async fn drain(inner: Arc<QueueInner>) {
    loop {
        let Queued { mut record, reply } = {
            let mut state = inner.state.lock();
            match state.pending.pop_front() {
                Some(mut next) => {
                    next.record.mark_submitted();
                    state.in_flight = Some(next.record.id);
                    QUEUE_DEPTH.set(state.pending.len() as f64);
                    next
                }
                None => {
                    state.draining = false;
                    state.in_flight = None;
                    return;
                }
            }
        };

        let processing = tokio::spawn(inner.clone().process(record.clone()));
        let record = match processing.await {
            Ok(done) => done,
            Err(join_error) => {
                let kind = record.command.kind();
                log_submission_event!(error, "Submission task aborted", record.id, kind,
                    error = %join_error);
                record.fail(ChannelError::SubmissionAborted(join_error.to_string()));
                SUBMISSIONS.with_label_values(&[kind.as_str(), "failed"]).inc();
                record
            }
        };

        {
            let mut state = inner.state.lock();
            state.in_flight = None;
            if state.completed.len() >= inner.archive_limit {
                state.completed.pop_front();
            }
            if inner.archive_limit > 0 {
                state.completed.push_back(record.clone());
            }
        }

        // A dropped ticket is fine; the record is archived
        let _ = reply.send(record);
    }
}

impl QueueInner {
    async fn process(self: Arc<Self>, mut record: SubmissionRecord) -> SubmissionRecord {
        let _timer = HistogramTimer::new(&SUBMISSION_DURATION);
        let kind = record.command.kind();

        let proof = match self.identity.ensure_identity().await {
            Ok(identity) => self.prover.prove(&record.command, &identity).await,
            Err(e) => Err(e),
        };

        let result = match proof {
            Ok(proof) => {
                record.proof = Some(proof.clone());
                self.ledger.submit(&record.command, &proof).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(hash) => {
                log_submission_event!(info, "Submission confirmed", record.id, kind,
                    hash = %hash, attempt = record.attempt_count);
                record.confirm(hash);
            }
            Err(error) => {
                log_submission_event!(warn, "Submission failed", record.id, kind,
                    error = %error, attempt = record.attempt_count);
                record.fail(error);
            }
        }

        let outcome = match record.state {
            SubmissionState::Confirmed => "confirmed",
            _ => "failed",
        };
        SUBMISSIONS.with_label_values(&[kind.as_str(), outcome]).inc();
        record
    }
}
