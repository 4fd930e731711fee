pub mod client;
pub mod event;
pub mod facility;
pub mod link;

pub use client::{Client, ClientPatch, ClientSummary, CreateClientInput};
pub use event::{CreateEventInput, Event, EventCategory, EventPatch};
pub use facility::{CreateFacilityInput, Facility, FacilityPatch, FacilitySummary, FacilityType};
pub use link::{EventLinks, LinkKind, LinksPatch};

use serde::{Deserialize, Deserializer};

/// API возвращает `null` для незаполненных булевых и списковых полей.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Пустую строку из формы сохраняем как `null`.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
