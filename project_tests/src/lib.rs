//! Test support for the ducq workspace: an in-process websocket bus.

pub mod dummy_bus;

pub use dummy_bus::DummyBus;
