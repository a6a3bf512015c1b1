//! Human-readable place names from reverse-geocode payloads.
//!
//! Address fields are optional and provider dependent, so the name is picked
//! by walking a fixed rule ladder; the first rule that has every field it
//! needs wins, even if a later rule would read better.

use crate::model::{Address, ReverseGeocodePayload};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Address field that can stand in for the locality, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    City,
    Town,
    Village,
    Hamlet,
    County,
}

impl Locality {
    fn field(self, address: &Address) -> Option<&str> {
        match self {
            Locality::City => address.city.as_deref(),
            Locality::Town => address.town.as_deref(),
            Locality::Village => address.village.as_deref(),
            Locality::Hamlet => address.hamlet.as_deref(),
            Locality::County => address.county.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceRule {
    /// `"{locality}, {country}"` when both fields are present.
    LocalityAndCountry(Locality),
    /// First and last comma-separated segments of `display_name`.
    DisplayName,
}

pub const PLACE_RULES: [PlaceRule; 6] = [
    PlaceRule::LocalityAndCountry(Locality::City),
    PlaceRule::LocalityAndCountry(Locality::Town),
    PlaceRule::LocalityAndCountry(Locality::Village),
    PlaceRule::LocalityAndCountry(Locality::Hamlet),
    PlaceRule::LocalityAndCountry(Locality::County),
    PlaceRule::DisplayName,
];

impl PlaceRule {
    /// The name this rule yields, or `None` when its fields are missing.
    pub fn apply(self, payload: &ReverseGeocodePayload) -> Option<String> {
        match self {
            PlaceRule::LocalityAndCountry(locality) => {
                let address = payload.address.as_ref()?;
                let place = locality.field(address)?;
                let country = address.country.as_deref()?;
                Some(format!("{place}, {country}"))
            }
            PlaceRule::DisplayName => payload.display_name.as_deref().map(shorten_display_name),
        }
    }
}

fn shorten_display_name(display_name: &str) -> String {
    let parts: Vec<&str> = display_name.split(',').collect();
    match parts.as_slice() {
        [first, .., last] => format!("{}, {}", first.trim(), last.trim()),
        _ => display_name.to_string(),
    }
}

/// Derive `"place, country"` from a reverse-geocode payload.
pub fn derive_place_name(payload: &ReverseGeocodePayload) -> String {
    PLACE_RULES
        .iter()
        .find_map(|rule| rule.apply(payload))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}
