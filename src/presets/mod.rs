//! Built-in schemas.

pub mod simulation;

use std::fmt;
use std::str::FromStr;

use crate::record::{FromRecord, Record, RecordError};
use crate::schema::{Schema, SchemaError};

/// A schema bundled with the crate, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// [`simulation::SimulationConfig`].
    Simulation,
}

impl Preset {
    pub const ALL: [Preset; 1] = [Preset::Simulation];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Simulation => "simulation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Simulation => "Simulation automation settings (General, Filenames, SheetNames, ColumnHeaders, Time)",
        }
    }

    pub fn schema(self) -> Result<Schema, SchemaError> {
        match self {
            Preset::Simulation => simulation::SimulationConfig::schema(),
        }
    }

    /// Build the preset's typed configuration from `record`, discarding it.
    ///
    /// Catches mismatches between a preset's schema and its typed structs.
    pub fn check(self, record: &Record) -> Result<(), RecordError> {
        match self {
            Preset::Simulation => simulation::SimulationConfig::from_record(record).map(|_| ()),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned for a preset name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown preset: {0}")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!("simulation".parse::<Preset>().unwrap(), Preset::Simulation);
        assert_eq!(
            "nope".parse::<Preset>().unwrap_err(),
            UnknownPreset("nope".to_string())
        );
    }

    #[test]
    fn test_all_presets_build() {
        for preset in Preset::ALL {
            assert!(preset.schema().is_ok(), "preset {preset}");
        }
    }
}
