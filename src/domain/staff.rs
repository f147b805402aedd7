//! Staff directory entries

use serde::{Deserialize, Serialize};

/// An agency specialist. Read-only to the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub rating: f64,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub image_url: Option<String>,
}

impl Staff {
    pub fn new(id: i64, name: &str, role: &str, specialty: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: role.to_string(),
            rating: 0.0,
            specialty: specialty.to_string(),
            email: String::new(),
            phone: String::new(),
            image_url: None,
        }
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn contact(mut self, email: &str, phone: &str) -> Self {
        self.email = email.to_string();
        self.phone = phone.to_string();
        self
    }

    pub fn image(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    /// Note stored on appointments booked with this staff member
    pub fn appointment_note(&self) -> String {
        format!("Appointment with {} ({})", self.name, self.role)
    }
}

/// Directory seeded into an empty store
pub fn default_directory() -> Vec<Staff> {
    vec![
        Staff::new(1, "Sarah Mitchell", "Senior Sales Agent", "Residential sales")
            .rating(4.9)
            .contact("sarah.mitchell@aone.example", "08 8100 0001")
            .image("/staff/sarah-mitchell.jpg"),
        Staff::new(2, "James Chen", "Property Manager", "Rental portfolio management")
            .rating(4.8)
            .contact("james.chen@aone.example", "08 8100 0002")
            .image("/staff/james-chen.jpg"),
        Staff::new(3, "Olivia Brown", "Investment Advisor", "First-time investors")
            .rating(4.7)
            .contact("olivia.brown@aone.example", "08 8100 0003")
            .image("/staff/olivia-brown.jpg"),
        Staff::new(4, "Daniel Rossi", "Sales Specialist", "Valuations and auctions")
            .rating(4.6)
            .contact("daniel.rossi@aone.example", "08 8100 0004")
            .image("/staff/daniel-rossi.jpg"),
    ]
}
