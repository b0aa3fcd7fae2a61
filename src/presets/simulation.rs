//! Configuration of the simulation-automation tool.
//!
//! Five sections are read from the INI file; [`Runtime`] is filled in by the
//! application once a run starts.
//!
//! ```ini
//! [General]
//! path_exe = C:\TRNSYS18\Exe\TrnEXE64.exe
//! multiprocessing_max = 4
//! multiprocessing_autodetect = yes
//! eval_save_interval = 10
//! conda_venv_name = sim
//!
//! [Time]
//! timeout_sim = 3600
//! ...
//! ```
//!
//! # Example
//!
//! ```no_run
//! use inischema::presets::simulation::{Runtime, SimulationConfig};
//! use std::path::Path;
//!
//! let mut config: SimulationConfig = inischema::load(Path::new("assets/simulation.ini"))?;
//! config.runtime = Some(Runtime {
//!     execution_time: "15:38".to_string(),
//!     filename_sim_variants_excel: "variants.xlsx".to_string(),
//!     dirname_sim_series: "series_01".to_string(),
//! });
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::record::{FromRecord, Record, RecordError, SectionValues, TypedSection};
use crate::schema::{FieldType, Schema, SchemaError, SectionSpec};

/// The complete simulation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// `[General]`
    pub general: General,
    /// `[Filenames]`
    pub filenames: Filenames,
    /// `[SheetNames]`
    pub sheet_names: SheetNames,
    /// `[ColumnHeaders]`
    pub column_headers: ColumnHeaders,
    /// `[Time]`
    pub time: Time,
    /// Not read from the file. Assigned by the caller after loading.
    pub runtime: Option<Runtime>,
}

impl FromRecord for SimulationConfig {
    fn schema() -> Result<Schema, SchemaError> {
        Schema::builder()
            .section(General::spec())
            .section(Filenames::spec())
            .section(SheetNames::spec())
            .section(ColumnHeaders::spec())
            .section(Time::spec())
            .section(Runtime::spec())
            .build()
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            general: record.extract()?,
            filenames: record.extract()?,
            sheet_names: record.extract()?,
            column_headers: record.extract()?,
            time: record.extract()?,
            runtime: record.extract_optional()?,
        })
    }
}

/// General program settings.
#[derive(Debug, Clone, PartialEq)]
pub struct General {
    /// Path to the simulator executable.
    pub path_exe: String,
    /// Maximum number of simulations run simultaneously.
    pub multiprocessing_max: i64,
    /// If set, `multiprocessing_max` is replaced by the number of CPU cores.
    pub multiprocessing_autodetect: bool,
    /// Evaluation progress is saved after this many simulations.
    pub eval_save_interval: i64,
    /// Name of the conda environment used for evaluation.
    pub conda_venv_name: String,
}

impl TypedSection for General {
    const NAME: &'static str = "general";

    fn spec() -> SectionSpec {
        SectionSpec::new(Self::NAME, "General")
            .field("path_exe", FieldType::Text)
            .field("multiprocessing_max", FieldType::Integer)
            .field("multiprocessing_autodetect", FieldType::Boolean)
            .field("eval_save_interval", FieldType::Integer)
            .field("conda_venv_name", FieldType::Text)
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            path_exe: values.get("path_exe")?,
            multiprocessing_max: values.get("multiprocessing_max")?,
            multiprocessing_autodetect: values.get("multiprocessing_autodetect")?,
            eval_save_interval: values.get("eval_save_interval")?,
            conda_venv_name: values.get("conda_venv_name")?,
        })
    }
}

/// Names of the files the tool reads, writes and cleans up.
#[derive(Debug, Clone, PartialEq)]
pub struct Filenames {
    /// Deck file used as the template for each simulation variant.
    pub dck_template: String,
    /// Log file name. `%` placeholders are kept as written.
    pub logger: String,
    /// File the simulator writes its results to.
    pub trnsys_output: String,
    /// File the evaluation progress is saved to.
    pub savefile: String,
    /// Glob patterns of simulator output removed after a run.
    pub redundant: Vec<String>,
    /// Deck templates copied into each simulation directory.
    pub templates: Vec<String>,
    /// Extra files copied alongside the templates. May be empty.
    pub templates_assets: Vec<String>,
}

impl TypedSection for Filenames {
    const NAME: &'static str = "filenames";

    fn spec() -> SectionSpec {
        SectionSpec::new(Self::NAME, "Filenames")
            .field("dck_template", FieldType::Text)
            .field("logger", FieldType::Text)
            .field("trnsys_output", FieldType::Text)
            .field("savefile", FieldType::Text)
            .field("redundant", FieldType::TextList)
            .field("templates", FieldType::TextList)
            .field("templates_assets", FieldType::TextList)
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            dck_template: values.get("dck_template")?,
            logger: values.get("logger")?,
            trnsys_output: values.get("trnsys_output")?,
            savefile: values.get("savefile")?,
            redundant: values.get("redundant")?,
            templates: values.get("templates")?,
            templates_assets: values.get("templates_assets")?,
        })
    }
}

/// Excel sheet names.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetNames {
    /// Sheet listing the simulation variants.
    pub sim_variants: String,
    /// Per-variant input sheet.
    pub variant_input: String,
    pub calculation: String,
    pub cumulative_input: String,
    /// Input sheets per zone.
    pub zone_1_input: String,
    pub zone_3_input: String,
    /// Result sheets per zone, with and without operating time.
    pub zone_1_with_operating_time: String,
    pub zone_1_without_operating_time: String,
    pub zone_3_with_operating_time: String,
    pub zone_3_without_operating_time: String,
}

/// Keys of `[SheetNames]`, in declaration order.
const SHEET_NAME_KEYS: [&str; 10] = [
    "sim_variants",
    "variant_input",
    "calculation",
    "cumulative_input",
    "zone_1_input",
    "zone_3_input",
    "zone_1_with_operating_time",
    "zone_1_without_operating_time",
    "zone_3_with_operating_time",
    "zone_3_without_operating_time",
];

impl TypedSection for SheetNames {
    const NAME: &'static str = "sheet_names";

    fn spec() -> SectionSpec {
        SHEET_NAME_KEYS
            .iter()
            .fold(SectionSpec::new(Self::NAME, "SheetNames"), |spec, key| {
                spec.field(*key, FieldType::Text)
            })
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            sim_variants: values.get("sim_variants")?,
            variant_input: values.get("variant_input")?,
            calculation: values.get("calculation")?,
            cumulative_input: values.get("cumulative_input")?,
            zone_1_input: values.get("zone_1_input")?,
            zone_3_input: values.get("zone_3_input")?,
            zone_1_with_operating_time: values.get("zone_1_with_operating_time")?,
            zone_1_without_operating_time: values.get("zone_1_without_operating_time")?,
            zone_3_with_operating_time: values.get("zone_3_with_operating_time")?,
            zone_3_without_operating_time: values.get("zone_3_without_operating_time")?,
        })
    }
}

/// Column headers of the Excel sheets and the simulator output.
///
/// Every key is a comma-separated list; long lists may continue on indented
/// lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeaders {
    /// Headers per zone.
    pub zone1: Vec<String>,
    pub zone2: Vec<String>,
    pub zone3: Vec<String>,
    /// Header of the column results are written to.
    pub result_column: Vec<String>,
    /// Columns of the simulator output file, in file order.
    pub trnsys_output: Vec<String>,
    /// Headers of the simulation variants sheet.
    pub sim_variant: Vec<String>,
}

impl TypedSection for ColumnHeaders {
    const NAME: &'static str = "column_headers";

    fn spec() -> SectionSpec {
        SectionSpec::new(Self::NAME, "ColumnHeaders")
            .field("zone1", FieldType::TextList)
            .field("zone2", FieldType::TextList)
            .field("zone3", FieldType::TextList)
            .field("result_column", FieldType::TextList)
            .field("trnsys_output", FieldType::TextList)
            .field("sim_variant", FieldType::TextList)
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            zone1: values.get("zone1")?,
            zone2: values.get("zone2")?,
            zone3: values.get("zone3")?,
            result_column: values.get("result_column")?,
            trnsys_output: values.get("trnsys_output")?,
            sim_variant: values.get("sim_variant")?,
        })
    }
}

/// Timeouts and delays, all in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    /// Stop the whole program if no simulation starts within this time.
    pub timeout_sim: i64,
    /// Stop a simulation whose deck selection window does not open in time.
    pub timeout_open_dck_window: i64,
    /// Stop a simulation whose window does not open in time.
    pub timeout_open_sim_window: i64,
    /// Pause between two simulation starts.
    pub buffer_sim_start: i64,
}

impl TypedSection for Time {
    const NAME: &'static str = "time";

    fn spec() -> SectionSpec {
        SectionSpec::new(Self::NAME, "Time")
            .field("timeout_sim", FieldType::Integer)
            .field("timeout_open_dck_window", FieldType::Integer)
            .field("timeout_open_sim_window", FieldType::Integer)
            .field("buffer_sim_start", FieldType::Integer)
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            timeout_sim: values.get("timeout_sim")?,
            timeout_open_dck_window: values.get("timeout_open_dck_window")?,
            timeout_open_sim_window: values.get("timeout_open_sim_window")?,
            buffer_sim_start: values.get("buffer_sim_start")?,
        })
    }
}

/// Settings known only once a run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Runtime {
    /// Start time of the run.
    pub execution_time: String,
    /// Excel workbook holding the simulation variants.
    pub filename_sim_variants_excel: String,
    /// Directory the run's simulations are created in.
    pub dirname_sim_series: String,
}

impl TypedSection for Runtime {
    const NAME: &'static str = "runtime";

    fn spec() -> SectionSpec {
        SectionSpec::runtime(Self::NAME)
            .field("execution_time", FieldType::Text)
            .field("filename_sim_variants_excel", FieldType::Text)
            .field("dirname_sim_series", FieldType::Text)
    }

    fn from_values(values: &SectionValues) -> Result<Self, RecordError> {
        Ok(Self {
            execution_time: values.get("execution_time")?,
            filename_sim_variants_excel: values.get("filename_sim_variants_excel")?,
            dirname_sim_series: values.get("dirname_sim_series")?,
        })
    }
}

/// For attaching a [`Runtime`] to an untyped [`Record`].
impl From<&Runtime> for SectionValues {
    fn from(runtime: &Runtime) -> Self {
        SectionValues::new(Runtime::NAME)
            .with("execution_time", runtime.execution_time.as_str())
            .with(
                "filename_sim_variants_excel",
                runtime.filename_sim_variants_excel.as_str(),
            )
            .with("dirname_sim_series", runtime.dirname_sim_series.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, decode_str};

    const SAMPLE: &str = include_str!("../../assets/simulation.ini");

    fn runtime() -> Runtime {
        Runtime {
            execution_time: "15:38".to_string(),
            filename_sim_variants_excel: "variants.xlsx".to_string(),
            dirname_sim_series: "series_01".to_string(),
        }
    }

    #[test]
    fn test_schema_is_valid() {
        let schema = SimulationConfig::schema().unwrap();
        assert_eq!(schema.sections().len(), 6);
        assert!(!schema.section("runtime").unwrap().is_loaded_from_file());
        assert_eq!(schema.section("sheet_names").unwrap().fields().len(), 10);
    }

    #[test]
    fn test_decode_sample() {
        let schema = SimulationConfig::schema().unwrap();
        let record = decode_str(&schema, SAMPLE).unwrap();
        let config = SimulationConfig::from_record(&record).unwrap();

        assert_eq!(config.general.path_exe, "C:\\TRNSYS18\\Exe\\TrnEXE64.exe");
        assert_eq!(config.general.multiprocessing_max, 4);
        assert!(config.general.multiprocessing_autodetect);
        assert_eq!(config.filenames.logger, "%(asctime)s_simulation.log");
        assert_eq!(
            config.filenames.redundant,
            vec!["*.out", "*.lst", "*.log"]
        );
        assert_eq!(config.sheet_names.calculation, "Calculation");
        assert_eq!(config.column_headers.zone2.len(), 3);
        assert_eq!(config.time.timeout_sim, 3600);
        assert!(config.runtime.is_none());
    }

    #[test]
    fn test_runtime_assigned_after_decode() {
        let schema = SimulationConfig::schema().unwrap();
        let record = decode_str(&schema, SAMPLE).unwrap();
        let mut config = SimulationConfig::from_record(&record).unwrap();

        config.runtime = Some(runtime());
        assert_eq!(config.runtime.as_ref().unwrap().execution_time, "15:38");
    }

    #[test]
    fn test_runtime_attached_to_record() {
        let schema = SimulationConfig::schema().unwrap();
        let mut record = decode_str(&schema, SAMPLE).unwrap();
        record.attach(SectionValues::from(&runtime())).unwrap();

        let config = SimulationConfig::from_record(&record).unwrap();
        assert_eq!(config.runtime, Some(runtime()));
    }

    #[test]
    fn test_missing_section() {
        let schema = SimulationConfig::schema().unwrap();
        let truncated = SAMPLE.split("[Time]").next().unwrap();

        let err = decode_str(&schema, truncated).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::SectionNotFound { ref section, .. } if section == "Time"
        ));
    }

    #[test]
    fn test_invalid_autodetect_flag() {
        let schema = SimulationConfig::schema().unwrap();
        let broken = SAMPLE.replace(
            "multiprocessing_autodetect = yes",
            "multiprocessing_autodetect = sometimes",
        );

        let err = decode_str(&schema, &broken).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidValue { ref raw, .. } if raw == "sometimes"
        ));
    }
}
