//! Editor events and the pub/sub plumbing that carries them to the host UI.
//!
//! The editing session publishes facts ("baseline captured", "edit rejected",
//! "upload progressed"); the host subscribes and renders them. Nothing here is
//! persisted.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
