//! Cross-screen hand-off channel
//!
//! Each hosted-flow screen is a separately bootstrapped page, so the method
//! the user picks on the identifier screen travels to the next screen through
//! a single-slot mailbox in tab-scoped storage:
//! - the identifier screen writes a [`HandoffIntent`] (producer)
//! - the password / passwordless screen takes it on first render and either
//!   switches connection or pre-fills its identifier (consumer)
//!
//! The mailbox also holds a [`MethodsCache`] keyed by the transaction state.

pub mod cache;
pub mod consumer;
pub mod error;
pub mod intent;
pub mod producer;
pub mod storage;

pub use cache::MethodsCache;
pub use consumer::{ConsumeOutcome, HandoffConsumer};
pub use error::{HandoffError, HandoffResult};
pub use intent::{Connection, HandoffIntent};
pub use producer::{Dispatch, HandoffProducer, ProduceError};
pub use storage::{HandoffChannel, MemoryStorage, SessionStorage};
