//! fisio-client
//!
//! REST client for the FisioManager API with a transparent offline
//! fallback, plus the agenda controller that drives the calendar engine.

pub mod agenda;
pub mod api;
pub mod config;
pub mod error;
pub mod mock;
pub mod resilient;
pub mod scope;
pub mod session;
pub mod transport;
