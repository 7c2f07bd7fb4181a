//! Wire types for the booking REST API.
//!
//! Field names on the wire are Spanish (`nombre`, `hora`, `cantidad`, ...);
//! the Rust side uses English names and `serde(rename)` bridges the two.
//! Dates travel as `DD-MM-YYYY` strings.

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

// =============================================================================
// CATALOG
// =============================================================================

/// A court as returned by `courts/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtRecord {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "habilitada", default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Slot ids this court supports, in display order. `None` means every slot.
    #[serde(
        rename = "horarios",
        default,
        deserialize_with = "slot_refs",
        skip_serializing_if = "Option::is_none"
    )]
    pub slot_ids: Option<Vec<i64>>,
}

fn enabled_by_default() -> bool {
    true
}

/// A time slot as returned by `schedules/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub id: i64,
    /// `HH:MM-HH:MM`.
    #[serde(rename = "hora")]
    pub label: String,
}

/// `horarios` arrives either as bare ids or as embedded slot objects.
fn slot_refs<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SlotRef {
        Id(i64),
        Embedded { id: i64 },
    }

    let refs = Option::<Vec<SlotRef>>::deserialize(deserializer)?;
    Ok(refs.map(|refs| {
        refs.into_iter()
            .map(|r| match r {
                SlotRef::Id(id) | SlotRef::Embedded { id } => id,
            })
            .collect()
    }))
}

// =============================================================================
// OCCUPANCY
// =============================================================================

/// Active reservation count for one court and slot on the queried date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    #[serde(rename = "cancha")]
    pub court: String,
    #[serde(rename = "horario")]
    pub slot: String,
    #[serde(rename = "cantidad")]
    pub count: u32,
}

// =============================================================================
// RESERVATIONS
// =============================================================================

/// Body of `reservations/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    #[serde(rename = "cancha")]
    pub court: String,
    #[serde(rename = "horario")]
    pub slot: String,
    #[serde(rename = "fecha", with = "wire_date")]
    pub date: Date,
}

/// Query for `reservations/detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailQuery {
    pub court: String,
    pub slot: String,
    pub date: Date,
    pub user_id: Option<i64>,
}

impl DetailQuery {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("cancha", self.court.clone()),
            ("horario", self.slot.clone()),
            ("fecha", crate::dates::format_date(self.date)),
        ];
        if let Some(user_id) = self.user_id {
            pairs.push(("usuario_id", user_id.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(rename = "cancha")]
    pub court: String,
    #[serde(rename = "fecha", with = "wire_date")]
    pub date: Date,
    #[serde(rename = "horario")]
    pub slot: String,
    #[serde(rename = "usuarios", default)]
    pub players: Vec<Player>,
}

/// A player booked into a slot. Only `id` and `nombre` are relied on; the
/// rest of the backend's user record is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

mod wire_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub(super) fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::dates::format_date(*date))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::dates::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
