//! Domain Types
//!
//! Entities shared by the store, the booking wizard, the chat assistant and
//! the HTTP layer.

mod appointment;
mod profile;
mod staff;

pub use appointment::{Appointment, AppointmentStatus, AppointmentView, NewAppointment};
pub use profile::{ContactDetails, Identity, Preference, ProfileUpdate, UserProfile};
pub use staff::{default_directory, Staff};
