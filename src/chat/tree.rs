//! Decision tree
//!
//! Maps the latest user input plus what is known about the user to the next
//! assistant reply. Every recognised input is a [`ChatIntent`]; anything else
//! falls through to a preference-specific default or the generic prompt.

use serde::Serialize;
use std::fmt;

use super::messages::ChatOption;
use crate::domain::{AppointmentView, Preference};

/// Every input value the tree recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatIntent {
    Sales,
    PropertyManagement,
    Investment,
    Buy,
    Sell,
    LearnMore,
    DiscussProperty,
    FirstTime,
    Experienced,
    ProvideDetails,
    ProvidePropertyDetails,
    Valuation,
    SpeakSpecialist,
    SpeakManager,
    Opportunities,
    Strategy,
    ContactInfo,
    BrowseFirst,
    MeetTeam,
    BookAppointment,
    ChatSpecialist,
    AppointmentYes,
    AppointmentNo,
}

impl ChatIntent {
    pub const ALL: [ChatIntent; 23] = [
        ChatIntent::Sales,
        ChatIntent::PropertyManagement,
        ChatIntent::Investment,
        ChatIntent::Buy,
        ChatIntent::Sell,
        ChatIntent::LearnMore,
        ChatIntent::DiscussProperty,
        ChatIntent::FirstTime,
        ChatIntent::Experienced,
        ChatIntent::ProvideDetails,
        ChatIntent::ProvidePropertyDetails,
        ChatIntent::Valuation,
        ChatIntent::SpeakSpecialist,
        ChatIntent::SpeakManager,
        ChatIntent::Opportunities,
        ChatIntent::Strategy,
        ChatIntent::ContactInfo,
        ChatIntent::BrowseFirst,
        ChatIntent::MeetTeam,
        ChatIntent::BookAppointment,
        ChatIntent::ChatSpecialist,
        ChatIntent::AppointmentYes,
        ChatIntent::AppointmentNo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatIntent::Sales => "sales",
            ChatIntent::PropertyManagement => "property-management",
            ChatIntent::Investment => "investment",
            ChatIntent::Buy => "buy",
            ChatIntent::Sell => "sell",
            ChatIntent::LearnMore => "learn-more",
            ChatIntent::DiscussProperty => "discuss-property",
            ChatIntent::FirstTime => "first-time",
            ChatIntent::Experienced => "experienced",
            ChatIntent::ProvideDetails => "provide-details",
            ChatIntent::ProvidePropertyDetails => "provide-property-details",
            ChatIntent::Valuation => "valuation",
            ChatIntent::SpeakSpecialist => "speak-specialist",
            ChatIntent::SpeakManager => "speak-manager",
            ChatIntent::Opportunities => "opportunities",
            ChatIntent::Strategy => "strategy",
            ChatIntent::ContactInfo => "contact-info",
            ChatIntent::BrowseFirst => "browse-first",
            ChatIntent::MeetTeam => "meet-team",
            ChatIntent::BookAppointment => "book-appointment",
            ChatIntent::ChatSpecialist => "chat-specialist",
            ChatIntent::AppointmentYes => "appointment-yes",
            ChatIntent::AppointmentNo => "appointment-no",
        }
    }

    /// Case-insensitive exact match on the trimmed input
    pub fn from_input(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == normalized)
    }

    /// The preference an input selects, if it is one of the top-level choices
    pub fn preference(&self) -> Option<Preference> {
        match self {
            ChatIntent::Sales => Some(Preference::Sales),
            ChatIntent::PropertyManagement => Some(Preference::PropertyManagement),
            ChatIntent::Investment => Some(Preference::Investment),
            _ => None,
        }
    }
}

impl fmt::Display for ChatIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the client should open alongside the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    ShowContactForm,
    ShowPropertyForm,
    ShowStaffDirectory,
    OpenBooking,
}

/// What is known about the user when the input arrives
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub first_name: Option<String>,
    pub preference: Option<Preference>,
    /// Name, email and phone are all on file
    pub has_contact: bool,
}

/// The assistant's answer to one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub options: Vec<ChatOption>,
    pub action: Option<ChatAction>,
    /// Set when the input chose a preference
    pub preference: Option<Preference>,
    /// Replaces the raw option value in the user's bubble
    pub echo: Option<String>,
}

impl Reply {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            action: None,
            preference: None,
            echo: None,
        }
    }

    fn options(mut self, options: Vec<ChatOption>) -> Self {
        self.options = options;
        self
    }

    fn action(mut self, action: ChatAction) -> Self {
        self.action = Some(action);
        self
    }
}

const FORM_PROMPT: &str = "To help you better, I'll need some information. Could you please fill out a quick form so we can connect you with the right specialist?";

const OPENING: &str = "I'm Emma, your A One Real Estate assistant. How can I help you today? Are you interested in buying, selling, or managing a property?";

/// Opening message of a conversation
pub fn greeting(first_name: Option<&str>) -> Reply {
    let text = match first_name.filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello {}! 👋 {}", name, OPENING),
        None => format!("Hello there! 👋 {}", OPENING),
    };

    Reply::new(text).options(vec![
        ChatOption::new("sales", "Looking to Buy/Sell"),
        ChatOption::new("property-management", "Property Management"),
        ChatOption::new("investment", "Investment Advice"),
        ChatOption::new("contact-info", "Provide Contact Info"),
    ])
}

/// Nudge about the user's next appointment
pub fn reminder(view: &AppointmentView) -> Reply {
    let text = format!(
        "By the way, I noticed you have an upcoming appointment with {} on {} at {}. Is there anything specific you'd like to discuss during this appointment?",
        view.staff_name,
        view.scheduled_at.format("%-d/%-m/%Y"),
        view.time
    );

    Reply::new(text).options(vec![
        ChatOption::new("appointment-yes", "Yes, I have questions"),
        ChatOption::new("appointment-no", "No, I'm all set"),
    ])
}

/// Reply to a completed contact form
pub fn contact_received(name: &str) -> Reply {
    Reply::new(format!(
        "Thanks {}! 🎉 I've received your contact information. Would you like to book an appointment with one of our specialists or meet our team?",
        name
    ))
    .options(follow_up_options())
}

/// Reply to a completed property form
pub fn property_received(property_type: &str, location: &str) -> Reply {
    Reply::new(format!(
        "Thanks for providing your property details! I've noted that you're looking for a {} in {}. Would you like to book an appointment with one of our specialists to discuss this further?",
        property_type, location
    ))
    .options(follow_up_options())
}

fn follow_up_options() -> Vec<ChatOption> {
    vec![
        ChatOption::new("book-appointment", "Book an appointment"),
        ChatOption::new("meet-team", "Meet our team"),
    ]
}

fn category_options() -> Vec<ChatOption> {
    vec![
        ChatOption::new("sales", "Property Sales"),
        ChatOption::new("property-management", "Property Management"),
        ChatOption::new("investment", "Investment Advice"),
    ]
}

/// Next assistant reply for `input`
pub fn respond(input: &str, ctx: &ChatContext) -> Reply {
    match ChatIntent::from_input(input) {
        Some(intent) => respond_to(intent, ctx),
        None => respond_to_text(input, ctx),
    }
}

fn respond_to(intent: ChatIntent, ctx: &ChatContext) -> Reply {
    use ChatIntent::*;

    let reply = match intent {
        Sales => Reply::new(
            "Great choice! 🏠 I'd be happy to help you with property sales. To provide you with the most relevant options, could you tell me a bit more about what you're looking for?",
        )
        .options(vec![
            ChatOption::new("buy", "I want to buy"),
            ChatOption::new("sell", "I want to sell"),
        ]),
        PropertyManagement => Reply::new(
            "Excellent! 🔑 Our property management team can help you manage your investment property efficiently. Would you like to learn more about our services or discuss your specific property?",
        )
        .options(vec![
            ChatOption::new("learn-more", "Learn about services"),
            ChatOption::new("discuss-property", "Discuss my property"),
        ]),
        Investment => Reply::new(
            "Smart choice! 📈 Our investment advisors can help you build a profitable property portfolio. Are you a first-time investor or looking to expand your existing portfolio?",
        )
        .options(vec![
            ChatOption::new("first-time", "First-time investor"),
            ChatOption::new("experienced", "Expanding portfolio"),
        ]),
        Buy => Reply::new(
            "Great! 🏡 To help you find the perfect property, I'll need to know a bit more about your requirements. Would you like to provide some details now?",
        )
        .options(vec![
            ChatOption::new("provide-details", "Provide details now"),
            ChatOption::new("browse-first", "Browse properties first"),
        ]),
        Sell => Reply::new(
            "Excellent! 💰 Our expert agents can help you get the best price for your property. Would you like to arrange a property valuation or speak to one of our sales specialists?",
        )
        .options(vec![
            ChatOption::new("valuation", "Property valuation"),
            ChatOption::new("speak-specialist", "Speak to a specialist"),
        ]),
        LearnMore => Reply::new(
            "Our property management services include tenant screening, rent collection, maintenance coordination, regular inspections, and financial reporting. Would you like to discuss your specific property or meet our property management team?",
        )
        .options(vec![
            ChatOption::new("discuss-property", "Discuss my property"),
            ChatOption::new("meet-team", "Meet the team"),
        ]),
        DiscussProperty => Reply::new(
            "I'd be happy to discuss your property. To provide you with the most relevant information, could you share some details about your property?",
        )
        .options(vec![
            ChatOption::new("provide-property-details", "Provide property details"),
            ChatOption::new("speak-manager", "Speak to a property manager"),
        ]),
        FirstTime | Experienced => {
            let investor = if intent == FirstTime {
                "first-time investor"
            } else {
                "experienced investor"
            };
            Reply::new(format!(
                "As a {}, our advisors can provide tailored guidance for your investment journey. Would you like to learn about current investment opportunities or discuss your investment strategy?",
                investor
            ))
            .options(vec![
                ChatOption::new("opportunities", "Investment opportunities"),
                ChatOption::new("strategy", "Investment strategy"),
            ])
        }
        ProvidePropertyDetails => Reply::new(FORM_PROMPT).action(ChatAction::ShowPropertyForm),
        ProvideDetails | Valuation | SpeakSpecialist | SpeakManager | Opportunities | Strategy
        | ContactInfo => Reply::new(FORM_PROMPT).action(ChatAction::ShowContactForm),
        BrowseFirst => Reply::new(
            "No problem! You can browse our available properties on our website. When you're ready to discuss specific properties or have questions, I'm here to help. Would you like me to show you some featured properties?",
        )
        .options(vec![
            ChatOption::new("show-featured", "Show featured properties"),
            ChatOption::new("specific-area", "Search by area"),
        ]),
        MeetTeam => Reply::new(
            "Great! Our property management team has years of experience and is dedicated to maximizing your investment returns. Would you like to meet them now?",
        )
        .action(ChatAction::ShowStaffDirectory),
        BookAppointment if ctx.has_contact => Reply::new(
            "Perfect! Let's find a time that suits you. Pick a date, a time and a specialist to book your appointment.",
        )
        .action(ChatAction::OpenBooking),
        BookAppointment | ChatSpecialist => Reply::new(
            "Perfect! To connect you with the right specialist, could you please provide some contact information?",
        )
        .action(ChatAction::ShowContactForm),
        AppointmentYes => Reply {
            echo: Some("I have some questions about my appointment".to_string()),
            ..Reply::new(
                "Great! Feel free to ask any questions you have about your upcoming appointment, and I'll make sure to note them for your specialist.",
            )
        },
        AppointmentNo => Reply {
            echo: Some("I'm all set for my appointment".to_string()),
            ..Reply::new(
                "Perfect! We look forward to seeing you at your appointment. Is there anything else I can help you with today?",
            )
            .options(category_options())
        },
    };

    Reply {
        preference: intent.preference(),
        ..reply
    }
}

fn respond_to_text(input: &str, ctx: &ChatContext) -> Reply {
    let lowered = input.to_lowercase();
    if lowered.contains("house") || lowered.contains("apartment") {
        return Reply::new(
            "I've noted your preferences. Based on what you're looking for, I'd recommend speaking with one of our specialists who can provide personalized assistance. Would you like to book an appointment or chat with a specialist now?",
        )
        .options(vec![
            ChatOption::new("book-appointment", "Book an appointment"),
            ChatOption::new("chat-specialist", "Chat with a specialist"),
        ]);
    }

    match ctx.preference {
        Some(Preference::Sales) => Reply::new(
            "Thanks for your message about property sales. To better assist you, would you like to discuss specific properties or your requirements with one of our sales specialists?",
        )
        .options(vec![
            ChatOption::new("specific-properties", "Discuss specific properties"),
            ChatOption::new("sales-specialist", "Speak to a specialist"),
        ]),
        Some(Preference::PropertyManagement) => Reply::new(
            "Thanks for your interest in our property management services. Would you like to learn more about how we can help manage your property effectively?",
        )
        .options(vec![
            ChatOption::new("management-services", "Management services"),
            ChatOption::new("property-manager", "Speak to a property manager"),
        ]),
        Some(Preference::Investment) => Reply::new(
            "Thanks for your interest in property investment. Our advisors can help you identify lucrative opportunities in the Adelaide market. Would you like to discuss your investment goals?",
        )
        .options(vec![
            ChatOption::new("investment-opportunities", "Investment opportunities"),
            ChatOption::new("investment-advisor", "Speak to an advisor"),
        ]),
        None => fallback(ctx.first_name.as_deref()),
    }
}

/// Generic prompt asking the user to pick a category
pub fn fallback(first_name: Option<&str>) -> Reply {
    let greeting = match first_name.filter(|n| !n.is_empty()) {
        Some(name) => format!(", {}", name),
        None => String::new(),
    };

    let mut options = category_options();
    options.push(ChatOption::new("contact-info", "Provide Contact Info"));

    Reply::new(format!(
        "Thanks for your message{}. To better assist you, could you let me know if you're interested in property sales, property management, or investment advice?",
        greeting
    ))
    .options(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentStatus, AppointmentView};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn values(reply: &Reply) -> Vec<&str> {
        reply.options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn test_every_intent_has_a_reply() {
        let ctx = ChatContext::default();
        let generic = fallback(None);

        for intent in ChatIntent::ALL {
            assert_eq!(ChatIntent::from_input(intent.as_str()), Some(intent));

            let reply = respond(intent.as_str(), &ctx);
            assert!(!reply.text.is_empty(), "{} has no text", intent);
            assert_ne!(reply.text, generic.text, "{} fell through", intent);
        }
    }

    #[test]
    fn test_unrecognised_input_falls_back() {
        let ctx = ChatContext {
            first_name: Some("Ava".into()),
            ..Default::default()
        };

        for input in ["", "   ", "hello", "what are your hours?", "🙂", "show-featured"] {
            let reply = respond(input, &ctx);
            assert!(reply.text.starts_with("Thanks for your message, Ava."));
            assert_eq!(
                values(&reply),
                vec!["sales", "property-management", "investment", "contact-info"]
            );
            assert_eq!(reply.action, None);
        }
    }

    #[test]
    fn test_matching_ignores_case_and_whitespace() {
        let ctx = ChatContext::default();
        assert_eq!(respond("  BUY ", &ctx), respond("buy", &ctx));
        assert_eq!(ChatIntent::from_input("Meet-Team"), Some(ChatIntent::MeetTeam));
    }

    #[test]
    fn test_preference_choice_is_reported() {
        let ctx = ChatContext::default();
        let reply = respond("property-management", &ctx);
        assert_eq!(reply.preference, Some(Preference::PropertyManagement));
        assert_eq!(values(&reply), vec!["learn-more", "discuss-property"]);

        assert_eq!(respond("buy", &ctx).preference, None);
    }

    #[test]
    fn test_property_keywords() {
        let ctx = ChatContext {
            preference: Some(Preference::Investment),
            ..Default::default()
        };
        let reply = respond("I'd like a 3 bedroom House near the beach", &ctx);
        assert!(reply.text.starts_with("I've noted your preferences."));
        assert_eq!(values(&reply), vec!["book-appointment", "chat-specialist"]);

        let reply = respond("an APARTMENT in the city", &ctx);
        assert!(reply.text.starts_with("I've noted your preferences."));
    }

    #[test]
    fn test_preference_defaults() {
        for (preference, opener) in [
            (Preference::Sales, "Thanks for your message about property sales."),
            (
                Preference::PropertyManagement,
                "Thanks for your interest in our property management services.",
            ),
            (
                Preference::Investment,
                "Thanks for your interest in property investment.",
            ),
        ] {
            let ctx = ChatContext {
                preference: Some(preference),
                ..Default::default()
            };
            assert!(respond("something else", &ctx).text.starts_with(opener));
        }
    }

    #[test]
    fn test_form_triggers() {
        let ctx = ChatContext::default();
        for input in [
            "provide-details",
            "valuation",
            "speak-specialist",
            "speak-manager",
            "opportunities",
            "strategy",
            "contact-info",
            "chat-specialist",
        ] {
            assert_eq!(respond(input, &ctx).action, Some(ChatAction::ShowContactForm));
        }
        assert_eq!(
            respond("provide-property-details", &ctx).action,
            Some(ChatAction::ShowPropertyForm)
        );
        assert_eq!(
            respond("meet-team", &ctx).action,
            Some(ChatAction::ShowStaffDirectory)
        );
    }

    #[test]
    fn test_booking_needs_contact_details_first() {
        let anonymous = ChatContext::default();
        assert_eq!(
            respond("book-appointment", &anonymous).action,
            Some(ChatAction::ShowContactForm)
        );

        let known = ChatContext {
            has_contact: true,
            ..Default::default()
        };
        assert_eq!(
            respond("book-appointment", &known).action,
            Some(ChatAction::OpenBooking)
        );
    }

    #[test]
    fn test_investor_wording() {
        let ctx = ChatContext::default();
        assert!(respond("first-time", &ctx).text.starts_with("As a first-time investor,"));
        assert!(respond("experienced", &ctx).text.starts_with("As a experienced investor,"));
    }

    #[test]
    fn test_reminder_answers_echo() {
        let ctx = ChatContext::default();
        let yes = respond("appointment-yes", &ctx);
        assert_eq!(
            yes.echo.as_deref(),
            Some("I have some questions about my appointment")
        );
        assert!(yes.options.is_empty());

        let no = respond("appointment-no", &ctx);
        assert_eq!(no.echo.as_deref(), Some("I'm all set for my appointment"));
        assert_eq!(values(&no), vec!["sales", "property-management", "investment"]);
    }

    #[test]
    fn test_greeting() {
        assert!(greeting(Some("Ava")).text.starts_with("Hello Ava! 👋 I'm Emma"));
        assert!(greeting(None).text.starts_with("Hello there! 👋"));
        assert_eq!(greeting(None).options.len(), 4);
    }

    #[test]
    fn test_reminder_mentions_staff_and_time() {
        let view = AppointmentView {
            id: Uuid::new_v4(),
            staff_id: 1,
            staff_name: "Sarah Mitchell".into(),
            staff_role: "Sales Specialist".into(),
            scheduled_at: NaiveDate::from_ymd_opt(2030, 3, 4)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            time: "2:00 PM".into(),
            status: AppointmentStatus::Booked,
            notes: None,
        };

        let reply = reminder(&view);
        assert!(reply
            .text
            .contains("with Sarah Mitchell on 4/3/2030 at 2:00 PM."));
        assert_eq!(values(&reply), vec!["appointment-yes", "appointment-no"]);
    }

    #[test]
    fn test_form_acknowledgements() {
        assert!(contact_received("Ava Jones").text.starts_with("Thanks Ava Jones! 🎉"));
        let reply = property_received("house", "Glenelg");
        assert!(reply.text.contains("looking for a house in Glenelg."));
        assert_eq!(values(&reply), vec!["book-appointment", "meet-team"]);
    }
}
