//! Messages exchanged between systems.
//!
//! - [`pointer`] – sprite pointer edges produced by the scene update and
//!   delivered to script callbacks
pub mod pointer;
