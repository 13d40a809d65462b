//! Virtual membership cards and the short-lived QR codes that resolve to them.
//!
//! Modules are public so the integration tests can drive the router and the
//! services directly.

pub mod card;
pub mod card_service;
pub mod entities;
pub mod errors;
pub mod jobs;
pub mod qr_code;
pub mod settings;
pub mod storage;
pub mod web;
