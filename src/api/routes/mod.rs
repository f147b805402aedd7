//! API Routes
//!
//! Route handlers organized by functionality.

pub mod appointments;
pub mod calendar;
pub mod chat;
pub mod contact;
pub mod health;
pub mod profile;
pub mod session;
pub mod staff;
