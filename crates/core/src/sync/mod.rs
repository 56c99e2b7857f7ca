// Synchronization primitives shared by engines and adapters

pub mod collector;
mod one_shot;
mod panic_guard;

pub use collector::{Collector, ElementSink};
pub use one_shot::OneShot;
pub use panic_guard::{run_guarded, GuardOutcome};
