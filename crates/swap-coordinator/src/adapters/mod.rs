//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports. Suitable for tests and
//! single-process simulation.

mod call_dispatcher;
mod clock;
mod escrow_factory;
mod event_bus;
mod order_engine;

pub use call_dispatcher::{RecordedCall, RecordingCallDispatcher};
pub use clock::{ManualClock, SystemClock};
pub use escrow_factory::{EscrowFactoryConfig, InMemoryEscrowFactory, Payout};
pub use event_bus::{InMemoryEventBus, DEFAULT_CHANNEL_CAPACITY};
pub use order_engine::InMemoryOrderEngine;
