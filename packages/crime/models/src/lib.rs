#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! UK street-level crime type vocabulary.
//!
//! The police.uk street export labels every incident with one of a small,
//! fixed set of crime type strings. The dashboard discovers its crime type
//! options from the loaded data, so incident rows keep the raw string; this
//! crate only knows the published vocabulary so that loaders can flag
//! labels nobody has seen before.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A crime type from the police.uk street-level vocabulary.
///
/// The [`Display`](std::fmt::Display) and [`FromStr`](std::str::FromStr)
/// forms are the exact strings that appear in the `Crime type` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CrimeType {
    /// Personal, environmental and nuisance anti-social behaviour
    #[serde(rename = "Anti-social behaviour")]
    #[strum(serialize = "Anti-social behaviour")]
    AntiSocialBehaviour,
    /// Taking without consent or theft of a pedal cycle
    #[serde(rename = "Bicycle theft")]
    #[strum(serialize = "Bicycle theft")]
    BicycleTheft,
    /// Entering a building with intent to steal or cause damage
    #[serde(rename = "Burglary")]
    #[strum(serialize = "Burglary")]
    Burglary,
    /// Damage to buildings, vehicles or property, including arson
    #[serde(rename = "Criminal damage and arson")]
    #[strum(serialize = "Criminal damage and arson")]
    CriminalDamageAndArson,
    /// Possession, supply and production offences
    #[serde(rename = "Drugs")]
    #[strum(serialize = "Drugs")]
    Drugs,
    /// Forgery, perjury and other miscellaneous crime
    #[serde(rename = "Other crime")]
    #[strum(serialize = "Other crime")]
    OtherCrime,
    /// Theft by an employee, blackmail and making off without payment
    #[serde(rename = "Other theft")]
    #[strum(serialize = "Other theft")]
    OtherTheft,
    /// Possession of a weapon such as a firearm or knife
    #[serde(rename = "Possession of weapons")]
    #[strum(serialize = "Possession of weapons")]
    PossessionOfWeapons,
    /// Offences causing fear, alarm or distress
    #[serde(rename = "Public order")]
    #[strum(serialize = "Public order")]
    PublicOrder,
    /// Taking property by force or threat of force
    #[serde(rename = "Robbery")]
    #[strum(serialize = "Robbery")]
    Robbery,
    /// Theft from shops or stalls
    #[serde(rename = "Shoplifting")]
    #[strum(serialize = "Shoplifting")]
    Shoplifting,
    /// Theft directly from a person, such as pickpocketing
    #[serde(rename = "Theft from the person")]
    #[strum(serialize = "Theft from the person")]
    TheftFromThePerson,
    /// Theft from or of a vehicle, or interference with a vehicle
    #[serde(rename = "Vehicle crime")]
    #[strum(serialize = "Vehicle crime")]
    VehicleCrime,
    /// Offences against the person, including sexual offences
    #[serde(rename = "Violence and sexual offences")]
    #[strum(serialize = "Violence and sexual offences")]
    ViolenceAndSexualOffences,

    // ── Retired labels (pre-2013 exports) ───────────────
    /// Replaced by [`Self::ViolenceAndSexualOffences`]
    #[serde(rename = "Violent crime")]
    #[strum(serialize = "Violent crime")]
    ViolentCrime,
    /// Split into [`Self::PublicOrder`] and [`Self::PossessionOfWeapons`]
    #[serde(rename = "Public disorder and weapons")]
    #[strum(serialize = "Public disorder and weapons")]
    PublicDisorderAndWeapons,
}

impl CrimeType {
    /// Returns `true` if `raw` is a label from the published vocabulary,
    /// current or retired.
    #[must_use]
    pub fn is_known(raw: &str) -> bool {
        raw.parse::<Self>().is_ok()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AntiSocialBehaviour,
            Self::BicycleTheft,
            Self::Burglary,
            Self::CriminalDamageAndArson,
            Self::Drugs,
            Self::OtherCrime,
            Self::OtherTheft,
            Self::PossessionOfWeapons,
            Self::PublicOrder,
            Self::Robbery,
            Self::Shoplifting,
            Self::TheftFromThePerson,
            Self::VehicleCrime,
            Self::ViolenceAndSexualOffences,
            Self::ViolentCrime,
            Self::PublicDisorderAndWeapons,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_export_labels() {
        assert_eq!(
            CrimeType::AntiSocialBehaviour.to_string(),
            "Anti-social behaviour"
        );
        assert_eq!(
            "Theft from the person".parse::<CrimeType>().unwrap(),
            CrimeType::TheftFromThePerson
        );
    }

    #[test]
    fn display_parse_roundtrip() {
        for t in CrimeType::all() {
            assert_eq!(t.to_string().parse::<CrimeType>().unwrap(), *t);
        }
    }

    #[test]
    fn unknown_labels_are_not_known() {
        assert!(CrimeType::is_known("Burglary"));
        assert!(!CrimeType::is_known("burglary"));
        assert!(!CrimeType::is_known("Jaywalking"));
    }

    #[test]
    fn serde_uses_export_labels() {
        let json = serde_json::to_string(&CrimeType::VehicleCrime).unwrap();
        assert_eq!(json, "\"Vehicle crime\"");
    }
}
