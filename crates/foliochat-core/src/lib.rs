//! Session state machine and portability seams for foliochat.
//!
//! This crate has no network or filesystem code of its own: transports
//! and persistence are traits ([`transport`], [`store`]) implemented in
//! `foliochat-infra`, which keeps the controller fully testable with
//! scripted doubles.

pub mod controller;
pub mod identity;
pub mod projector;
pub mod store;
pub mod transport;
