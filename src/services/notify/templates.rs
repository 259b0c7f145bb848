use super::{Channel, Notification};
use crate::modules::property::model::Property;

/// Where a listing owner is reached on `channel`, if anywhere.
pub fn owner_destination(property: &Property, channel: Channel) -> Option<String> {
    let phone = property
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    let email = Some(property.owner_email.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    match channel {
        Channel::Email => email,
        Channel::Voice => phone,
        Channel::Log => phone.or(email),
    }
}

pub fn verification_reminder(property: &Property, to: String) -> Notification {
    Notification::new(
        to,
        "Your listing is awaiting verification",
        format!(
            "Hello {}, this is EstatePro. Your property at {} is still awaiting verification. \
             Our sales team will contact you shortly to confirm the details.",
            property.first_name.trim(),
            property.display_address()
        ),
    )
}

pub fn listing_received(property: &Property, to: String) -> Notification {
    Notification::new(
        to,
        "Property Listing Received",
        format!(
            "Hello {},\n\nYour property at {} has been received. \
             Our sales team will verify your documents within 48 hours.\n\nThank you!",
            property.first_name.trim(),
            property.display_address()
        ),
    )
}

pub fn one_time_code(to: String, code: &str, ttl_minutes: i64) -> Notification {
    Notification::new(
        to,
        "Your EstatePro verification code",
        format!(
            "Your EstatePro verification code is {}. It expires in {} minutes.",
            code,
            ttl_minutes.max(1)
        ),
    )
}
