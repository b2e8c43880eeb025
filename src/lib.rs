//! Motor de eventos de movimiento a partir de un acelerómetro.
//!
//! Varios llamadores registran patrones de sacudida, un productor privilegiado
//! alimenta muestras x/y/z y el motor despierta exactamente a los que esperan
//! un patrón que coincide con el movimiento reciente. Un evento se puede
//! destruir en cualquier momento aunque haya procesos bloqueados sobre él.

pub mod codec;
pub mod config;
pub mod csv_loader;
pub mod delta;
pub mod error;
pub mod event;
pub mod interrupt;
pub mod manager;
pub mod reference;
pub mod registry;
pub mod sample_buffer;
pub mod types;

pub use error::{EventError, Result};
pub use interrupt::Interrupt;
pub use manager::MotionEventManager;
pub use reference::Credentials;
pub use types::{
    Delta, DestroyOutcome, EventId, MotionSpec, Sample, TriggerState, WaitOutcome, WINDOW,
};
