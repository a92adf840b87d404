//! Destiny elements and the birth-year lookup table.
//!
//! The five-element scheme is a fixed cosmological table: the generation
//! and overcoming cycles between elements never change, and a birth year
//! maps to its element through the sexagenary (Nayin) cycle, which repeats
//! every sixty years in pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the five destiny elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestinyElement {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

/// All elements, in generation-cycle order starting from Wood.
pub const ALL_ELEMENTS: [DestinyElement; 5] = [
    DestinyElement::Wood,
    DestinyElement::Fire,
    DestinyElement::Earth,
    DestinyElement::Metal,
    DestinyElement::Water,
];

impl DestinyElement {
    /// Display name, matching the backend's destiny names.
    pub fn name(&self) -> &'static str {
        match self {
            DestinyElement::Wood => "Wood",
            DestinyElement::Fire => "Fire",
            DestinyElement::Earth => "Earth",
            DestinyElement::Metal => "Metal",
            DestinyElement::Water => "Water",
        }
    }

    /// Element this one generates (mutual generation cycle).
    pub fn generates(&self) -> DestinyElement {
        match self {
            DestinyElement::Wood => DestinyElement::Fire,
            DestinyElement::Fire => DestinyElement::Earth,
            DestinyElement::Earth => DestinyElement::Metal,
            DestinyElement::Metal => DestinyElement::Water,
            DestinyElement::Water => DestinyElement::Wood,
        }
    }

    /// Element that generates this one.
    pub fn generated_by(&self) -> DestinyElement {
        match self {
            DestinyElement::Wood => DestinyElement::Water,
            DestinyElement::Fire => DestinyElement::Wood,
            DestinyElement::Earth => DestinyElement::Fire,
            DestinyElement::Metal => DestinyElement::Earth,
            DestinyElement::Water => DestinyElement::Metal,
        }
    }

    /// Element this one overcomes (mutual overcoming cycle).
    pub fn overcomes(&self) -> DestinyElement {
        match self {
            DestinyElement::Wood => DestinyElement::Earth,
            DestinyElement::Fire => DestinyElement::Metal,
            DestinyElement::Earth => DestinyElement::Water,
            DestinyElement::Metal => DestinyElement::Wood,
            DestinyElement::Water => DestinyElement::Fire,
        }
    }

    /// Element this one is overcome by.
    pub fn overcome_by(&self) -> DestinyElement {
        match self {
            DestinyElement::Wood => DestinyElement::Metal,
            DestinyElement::Fire => DestinyElement::Water,
            DestinyElement::Earth => DestinyElement::Wood,
            DestinyElement::Metal => DestinyElement::Fire,
            DestinyElement::Water => DestinyElement::Earth,
        }
    }
}

impl fmt::Display for DestinyElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a backend name does not match any element.
#[derive(Debug, Clone, Error)]
#[error("Unknown destiny element: {0}")]
pub struct ParseElementError(String);

impl FromStr for DestinyElement {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wood" => Ok(DestinyElement::Wood),
            "fire" => Ok(DestinyElement::Fire),
            "earth" => Ok(DestinyElement::Earth),
            "metal" => Ok(DestinyElement::Metal),
            "water" => Ok(DestinyElement::Water),
            _ => Err(ParseElementError(s.to_string())),
        }
    }
}

/// First year of a sexagenary cycle (Jiazi year) used as the default anchor.
const CYCLE_ANCHOR_YEAR: i32 = 1924;

/// The standard Nayin assignment: thirty year-pair entries covering one
/// sixty-year cycle, starting from the anchor year.
const NAYIN_CYCLE: [DestinyElement; 30] = {
    use DestinyElement::*;
    [
        Metal, Fire, Wood, Earth, Metal, Fire, Water, Earth, Metal, Wood, //
        Water, Earth, Fire, Wood, Water, Metal, Fire, Wood, Earth, Metal, //
        Fire, Water, Earth, Metal, Wood, Water, Earth, Fire, Wood, Water,
    ]
};

/// Birth-year to destiny-element lookup table.
///
/// The mapping is an external business rule; the default table is the
/// standard Nayin cycle, and a different cycle or anchor can be injected
/// through [`DestinyTable::new`].
#[derive(Debug, Clone)]
pub struct DestinyTable {
    cycle: [DestinyElement; 30],
    anchor_year: i32,
}

impl DestinyTable {
    /// Build a table from a custom thirty-entry cycle anchored at the
    /// given first year.
    pub fn new(cycle: [DestinyElement; 30], anchor_year: i32) -> Self {
        Self { cycle, anchor_year }
    }

    /// Resolve a birth year to its destiny element.
    ///
    /// Total over any integer year: years before the anchor wrap backwards
    /// through the same cycle. Deterministic and side-effect free.
    pub fn resolve(&self, year: i32) -> DestinyElement {
        let offset = (i64::from(year) - i64::from(self.anchor_year)).rem_euclid(60);
        self.cycle[(offset / 2) as usize]
    }
}

impl Default for DestinyTable {
    fn default() -> Self {
        Self::new(NAYIN_CYCLE, CYCLE_ANCHOR_YEAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_years() {
        let table = DestinyTable::default();
        assert_eq!(table.resolve(1984), DestinyElement::Metal);
        assert_eq!(table.resolve(1990), DestinyElement::Earth);
        assert_eq!(table.resolve(1991), DestinyElement::Earth);
        assert_eq!(table.resolve(1996), DestinyElement::Water);
        assert_eq!(table.resolve(2000), DestinyElement::Metal);
        assert_eq!(table.resolve(2023), DestinyElement::Metal);
    }

    #[test]
    fn test_sixty_year_periodicity() {
        let table = DestinyTable::default();
        for year in 1924..1984 {
            assert_eq!(table.resolve(year), table.resolve(year + 60));
            assert_eq!(table.resolve(year), table.resolve(year - 60));
        }
    }

    #[test]
    fn test_total_over_pre_anchor_years() {
        let table = DestinyTable::default();
        // 1923 is the last year of the previous cycle.
        assert_eq!(table.resolve(1923), DestinyElement::Water);
        assert_eq!(table.resolve(1864), table.resolve(1924));
        // Resolution never panics, whatever the year.
        table.resolve(i32::MIN);
        table.resolve(i32::MAX);
    }

    #[test]
    fn test_deterministic() {
        let table = DestinyTable::default();
        for year in [1930, 1955, 1990, 2004, 2025] {
            assert_eq!(table.resolve(year), table.resolve(year));
        }
    }

    #[test]
    fn test_generation_cycle_is_consistent() {
        for element in ALL_ELEMENTS {
            assert_eq!(element.generates().generated_by(), element);
            assert_eq!(element.overcomes().overcome_by(), element);
        }
    }

    #[test]
    fn test_generation_cycle_values() {
        assert_eq!(DestinyElement::Earth.generated_by(), DestinyElement::Fire);
        assert_eq!(DestinyElement::Water.generates(), DestinyElement::Wood);
        assert_eq!(DestinyElement::Earth.overcomes(), DestinyElement::Water);
        assert_eq!(DestinyElement::Earth.overcome_by(), DestinyElement::Wood);
    }

    #[test]
    fn test_parse_backend_names() {
        assert_eq!("Earth".parse::<DestinyElement>().unwrap(), DestinyElement::Earth);
        assert_eq!(" water ".parse::<DestinyElement>().unwrap(), DestinyElement::Water);
        assert!("Plasma".parse::<DestinyElement>().is_err());
    }
}
