// Source archive
pub const ARCHIVE_FILE_NAME: &str = "100000-Patients.zip";

// Archive entries, matched by exact name
pub const PATIENTS_ENTRY: &str = "PatientCorePopulatedTable.txt";
pub const ADMISSIONS_ENTRY: &str = "AdmissionsCorePopulatedTable.txt";
pub const DIAGNOSES_ENTRY: &str = "AdmissionsDiagnosesCorePopulatedTable.txt";
pub const LABS_ENTRY: &str = "LabsCorePopulatedTable.txt";

// Raw tables are tab separated, outputs comma separated
pub const INPUT_SEPARATOR: u8 = b'\t';
pub const OUTPUT_SEPARATOR: u8 = b',';

// Canonical textual timestamp written for every date column
pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Processing defaults
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_PROGRESS_EVERY: usize = 10;
