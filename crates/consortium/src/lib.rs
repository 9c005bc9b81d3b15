//! Consortium membership sync for research project plans.
//!
//! A project's consortium is a tree of organizations and their members,
//! tracked per project year. [`ConsortiumSync`] holds the local copy, lets
//! the user build drafts, and reconciles them with the remote store through
//! a [`rimp_client::ConsortiumApi`].

pub mod error;
pub mod events;
pub mod id_generator;
pub mod mode;
pub mod propagation;
pub mod session;
pub mod store;
pub mod sync;

pub use error::{ConsortiumError, Result};
pub use events::{ConsortiumEvent, EventBus};
pub use id_generator::IdGenerator;
pub use mode::classify;
pub use propagation::{PropagationOutcome, PropagationStatus};
pub use session::{MemberEdit, MemberEditSession};
pub use store::ConsortiumStore;
pub use sync::ConsortiumSync;
