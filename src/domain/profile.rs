//! Users: the identity asserted by the identity provider and the profile row
//! kept in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            phone: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name used when a profile row is created lazily
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.split_whitespace().next())
    }
}

/// Stated preference category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    Sales,
    PropertyManagement,
    Investment,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Sales => "sales",
            Preference::PropertyManagement => "property-management",
            Preference::Investment => "investment",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Preference::Sales),
            "property-management" => Ok(Preference::PropertyManagement),
            "investment" => Ok(Preference::Investment),
            other => Err(format!("unknown preference '{}'", other)),
        }
    }
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    /// Provider user id; `None` for guests who only left contact details
    pub identity_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preference: Option<Preference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a user may change on their profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub preference: Option<Preference>,
}

/// Contact form submission
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub preference: Option<Preference>,
}

impl ContactDetails {
    /// Check the required fields in form order, returning the prompt for the
    /// first missing one.
    pub fn missing_field_prompt(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("Please enter your full name")
        } else if self.email.trim().is_empty() {
            Some("Please enter your email address")
        } else if self.phone.trim().is_empty() {
            Some("Please enter your phone number")
        } else {
            None
        }
    }

    /// Contact fields are stored trimmed, as guest rows are
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            address: self.address,
            preference: self.preference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(Identity::new("u1").display_name(), "Unknown");
        assert_eq!(Identity::new("u1").name("  ").display_name(), "Unknown");
        assert_eq!(Identity::new("u1").name("Ava Jones").display_name(), "Ava Jones");
    }

    #[test]
    fn test_first_name() {
        let identity = Identity::new("u1").name("Ava Jones");
        assert_eq!(identity.first_name(), Some("Ava"));
        assert_eq!(Identity::new("u2").first_name(), None);
    }

    #[test]
    fn test_preference_wire_values() {
        let json = serde_json::to_string(&Preference::PropertyManagement).unwrap();
        assert_eq!(json, "\"property-management\"");
        assert_eq!(
            "investment".parse::<Preference>().unwrap(),
            Preference::Investment
        );
        assert!("rentals".parse::<Preference>().is_err());
    }

    #[test]
    fn test_contact_prompts_in_form_order() {
        let mut details = ContactDetails::default();
        assert_eq!(details.missing_field_prompt(), Some("Please enter your full name"));

        details.name = "Ava".into();
        assert_eq!(
            details.missing_field_prompt(),
            Some("Please enter your email address")
        );

        details.email = "ava@example.com".into();
        assert_eq!(
            details.missing_field_prompt(),
            Some("Please enter your phone number")
        );

        details.phone = "0400 000 000".into();
        assert_eq!(details.missing_field_prompt(), None);
    }

    #[test]
    fn test_update_trims_contact_fields() {
        let details = ContactDetails {
            name: "  Ava Jones ".into(),
            email: " ava@example.com\t".into(),
            phone: " 0400 111 222 ".into(),
            address: Some("  12 King St".into()),
            preference: None,
        };

        let update = details.into_update();
        assert_eq!(update.name.as_deref(), Some("Ava Jones"));
        assert_eq!(update.email.as_deref(), Some("ava@example.com"));
        assert_eq!(update.phone.as_deref(), Some("0400 111 222"));
        assert_eq!(update.address.as_deref(), Some("  12 King St"));
    }
}
