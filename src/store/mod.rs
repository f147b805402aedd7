//! Store
//!
//! Table-based persistence for `users`, `staff` and `appointments`.
//!
//! The HTTP layer and the chat assistant talk to the [`AppointmentStore`]
//! trait; [`SqliteStore`] is the production implementation. Every operation
//! is a single request/response against the store with no client-side
//! conflict detection, so concurrent edits resolve as last write wins.
//!
//! Appointment visibility is scoped to the owning user: asking for somebody
//! else's appointment is reported as not found.

mod appointments;
mod error;
mod sqlite;
mod staff;
mod users;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::{
    Appointment, ContactDetails, Identity, NewAppointment, ProfileUpdate, Staff, UserProfile,
};

/// Operations over users, staff and appointments
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> StoreResult<()>;

    /// Profile row for a provider user id, if one was created
    async fn find_user(&self, identity_id: &str) -> StoreResult<Option<UserProfile>>;

    /// Profile row for `identity`, created from the provider's name/email when absent
    async fn ensure_user(&self, identity: &Identity) -> StoreResult<UserProfile>;

    /// Apply a profile edit, creating the row first when absent
    async fn save_profile(
        &self,
        identity: &Identity,
        update: ProfileUpdate,
    ) -> StoreResult<UserProfile>;

    /// Record contact details left by a signed-out visitor
    async fn insert_guest(&self, contact: &ContactDetails) -> StoreResult<UserProfile>;

    /// Staff directory ordered by name
    async fn list_staff(&self) -> StoreResult<Vec<Staff>>;

    async fn get_staff(&self, id: i64) -> StoreResult<Option<Staff>>;

    /// Insert `staff` when the directory is empty. Returns the number of rows inserted.
    async fn seed_staff(&self, staff: &[Staff]) -> StoreResult<usize>;

    /// Insert a booked appointment, ensuring the user's profile row exists first
    async fn add_appointment(
        &self,
        identity: &Identity,
        new: NewAppointment,
    ) -> StoreResult<Appointment>;

    /// The user's appointments by date ascending. Cancelled rows only when asked.
    async fn list_appointments(
        &self,
        identity: &Identity,
        include_cancelled: bool,
    ) -> StoreResult<Vec<Appointment>>;

    async fn get_appointment(&self, identity: &Identity, id: Uuid) -> StoreResult<Appointment>;

    /// Soft cancel: flip status to cancelled and keep the row
    async fn cancel_appointment(&self, identity: &Identity, id: Uuid) -> StoreResult<Appointment>;

    /// Move to `scheduled_at` and flip status to rescheduled
    async fn reschedule_appointment(
        &self,
        identity: &Identity,
        id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> StoreResult<Appointment>;

    /// Next non-cancelled appointment strictly after `now`
    async fn upcoming_appointment(
        &self,
        identity: &Identity,
        now: NaiveDateTime,
    ) -> StoreResult<Option<Appointment>>;
}
