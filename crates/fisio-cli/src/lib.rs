//! fisio-cli
//!
//! Terminal front end for the FisioManager client. The binary lives in
//! `main.rs`; text rendering is exposed here so it can be tested.

pub mod render;
