//! Extracts booking form fields from a calendar event description.
//!
//! Appointment schedule descriptions are HTML-flavoured text where every form
//! field is a bold label followed by its value on the next line, and the
//! booker's contact details sit under a `<b>Booked by</b>` marker. Parsing is
//! a fixed sequence of strategies; later ones override earlier ones.

mod strategies;

use serde::{Deserialize, Serialize};
use strategies::{booked_by_block, labeled_field, labeled_names, phone_after_email, split_lines};

/// Value of a contact field that could not be parsed
pub const NOT_AVAILABLE: &str = "N/A";
/// Guardian name used when neither name part was parsed
pub const UNKNOWN_GUARDIAN: &str = "Unknown Guardian";

/// Bold label text of each custom booking form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLabels {
    pub insurance: String,
    pub location: String,
    pub phone: String,
    pub client_name: String,
    pub age: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            insurance: "Insurance".to_string(),
            location: "Location".to_string(),
            phone: "Phone number".to_string(),
            client_name: "Client Name".to_string(),
            age: "Age".to_string(),
        }
    }
}

/// Values of the custom labeled fields, empty when the label is absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomFields {
    pub insurance: String,
    pub location: String,
    pub client_name: String,
    pub age: String,
    /// Phone from the labeled field or the line after the email.
    /// Never used for the contact phone; see [`ContactDetails::phone`].
    pub phone: String,
}

/// Everything parsed from one description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phone read from the "Booked by" block
    pub phone: String,
    pub fields: CustomFields,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            first_name: NOT_AVAILABLE.to_string(),
            last_name: NOT_AVAILABLE.to_string(),
            email: NOT_AVAILABLE.to_string(),
            phone: NOT_AVAILABLE.to_string(),
            fields: CustomFields::default(),
        }
    }
}

impl ContactDetails {
    /// Full guardian name, or [`UNKNOWN_GUARDIAN`] when no name part was found
    pub fn guardian_name(&self) -> String {
        if self.first_name != NOT_AVAILABLE || self.last_name != NOT_AVAILABLE {
            format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string()
        } else {
            UNKNOWN_GUARDIAN.to_string()
        }
    }
}

/// Parse an event description. Missing fields fall back to sentinels, never errors.
pub fn parse_description(description: Option<&str>, labels: &FieldLabels) -> ContactDetails {
    let mut details = ContactDetails::default();

    let description = match description {
        Some(text) if !text.is_empty() => text,
        _ => return details,
    };

    let lines = split_lines(description);

    if let Some(block) = booked_by_block(&lines) {
        if let Some(first) = block.first_name {
            details.first_name = first;
        }
        if let Some(last) = block.last_name {
            details.last_name = last;
        }
        if let Some(email) = block.email {
            details.email = email;
        }
        if let Some(phone) = block.phone {
            details.phone = phone;
        }
    }

    let names = labeled_names(&lines);
    if let Some(first) = names.first_name {
        details.first_name = first;
    }
    if let Some(last) = names.last_name {
        details.last_name = last;
    }

    let field = |label: &str| labeled_field(&lines, label).unwrap_or_default();
    details.fields = CustomFields {
        insurance: field(&labels.insurance),
        location: field(&labels.location),
        client_name: field(&labels.client_name),
        age: field(&labels.age),
        phone: phone_after_email(&lines, &details.email)
            .unwrap_or_else(|| field(&labels.phone)),
    };

    details
}
