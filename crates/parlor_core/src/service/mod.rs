//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate game/calendar domain logic into use-case level APIs.
//! - Keep UI/FFI layers decoupled from engine and storage details.

pub mod calendar_service;
pub mod game_service;
