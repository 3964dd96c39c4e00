//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod builder;
pub mod cache;
pub mod identity;
pub mod poller;
pub mod proof;
pub mod queue;
pub mod reconciler;
pub mod service;
pub mod session;

pub use builder::TransactionBuilder;
pub use cache::{cache_key, ChannelCache};
pub use identity::IdentityProvider;
pub use poller::{ChannelPoller, PollUpdate};
pub use proof::ProofGenerator;
pub use queue::{SubmissionQueue, SubmissionTicket, DEFAULT_ARCHIVE_LIMIT};
pub use reconciler::StateReconciler;
pub use service::SalesChannelService;
pub use session::{SessionStore, ONBOARDED_KEY, SALES_CHANNEL_KEY, SELLERS_KEY};
