use crate::constants::*;

/// Size class of a raw table, deciding whole-table versus chunked reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Standard,
    Large,
}

/// Cleaning policy for one source table.
///
/// Column names refer to the raw schema. They are checked against each batch
/// when it is cleaned rather than here, because raw headers vary between extracts.
#[derive(Debug, PartialEq, Eq)]
pub struct TableSpec {
    pub source_entry_name: &'static str,
    pub output_name: &'static str,
    pub primary_key_column: &'static str,
    pub date_columns: &'static [&'static str],
    pub numeric_columns: &'static [&'static str],
    /// `(original, normalized)` pairs. Columns without an entry keep their name.
    pub column_rename: &'static [(&'static str, &'static str)],
    /// Default size class. `ResolvedConfig::large_tables` is built from it.
    pub size_class: SizeClass,
}

impl TableSpec {
    /// Returns the output name for a raw column.
    pub fn renamed<'a>(&self, column: &'a str) -> &'a str {
        self.column_rename
            .iter()
            .find(|(from, _)| *from == column)
            .map(|(_, to)| *to)
            .unwrap_or(column)
    }

    /// Looks up the spec for an archive entry. Unknown entries are simply absent.
    pub fn for_entry(entry_name: &str) -> Option<&'static TableSpec> {
        TableKind::from_entry_name(entry_name).map(|kind| kind.spec())
    }
}

static PATIENTS_SPEC: TableSpec = TableSpec {
    source_entry_name: PATIENTS_ENTRY,
    output_name: "patients_cleaned.csv",
    primary_key_column: "PatientID",
    date_columns: &["PatientDateOfBirth"],
    numeric_columns: &["PatientPopulationPercentageBelowPoverty"],
    column_rename: &[
        ("PatientID", "patient_id"),
        ("PatientGender", "gender"),
        ("PatientDateOfBirth", "date_of_birth"),
        ("PatientRace", "race"),
        ("PatientMaritalStatus", "marital_status"),
        ("PatientLanguage", "language"),
        ("PatientPopulationPercentageBelowPoverty", "poverty_pct"),
    ],
    size_class: SizeClass::Standard,
};

static ADMISSIONS_SPEC: TableSpec = TableSpec {
    source_entry_name: ADMISSIONS_ENTRY,
    output_name: "admissions_cleaned.csv",
    primary_key_column: "PatientID",
    date_columns: &["AdmissionStartDate", "AdmissionEndDate"],
    numeric_columns: &["AdmissionID"],
    column_rename: &[
        ("PatientID", "patient_id"),
        ("AdmissionID", "admission_id"),
        ("AdmissionStartDate", "admission_start"),
        ("AdmissionEndDate", "admission_end"),
    ],
    size_class: SizeClass::Standard,
};

static DIAGNOSES_SPEC: TableSpec = TableSpec {
    source_entry_name: DIAGNOSES_ENTRY,
    output_name: "diagnoses_cleaned.csv",
    primary_key_column: "PatientID",
    date_columns: &[],
    numeric_columns: &["AdmissionID"],
    column_rename: &[
        ("PatientID", "patient_id"),
        ("AdmissionID", "admission_id"),
        ("PrimaryDiagnosisCode", "diagnosis_code"),
        ("PrimaryDiagnosisDescription", "diagnosis_description"),
    ],
    size_class: SizeClass::Standard,
};

// ~4 GB uncompressed, always streamed
static LABS_SPEC: TableSpec = TableSpec {
    source_entry_name: LABS_ENTRY,
    output_name: "labs_cleaned.csv",
    primary_key_column: "PatientID",
    date_columns: &["LabDateTime"],
    numeric_columns: &["AdmissionID", "LabValue"],
    column_rename: &[
        ("PatientID", "patient_id"),
        ("AdmissionID", "admission_id"),
        ("LabName", "lab_name"),
        ("LabValue", "lab_value"),
        ("LabUnits", "lab_units"),
        ("LabDateTime", "lab_datetime"),
    ],
    size_class: SizeClass::Large,
};

/// The four tables shipped in the patient archive, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Patients,
    Admissions,
    Diagnoses,
    Labs,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Patients,
        TableKind::Admissions,
        TableKind::Diagnoses,
        TableKind::Labs,
    ];

    /// Returns a human-readable name for the table.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Patients => "Patients",
            Self::Admissions => "Admissions",
            Self::Diagnoses => "Diagnoses",
            Self::Labs => "Labs",
        }
    }

    pub fn spec(&self) -> &'static TableSpec {
        match self {
            Self::Patients => &PATIENTS_SPEC,
            Self::Admissions => &ADMISSIONS_SPEC,
            Self::Diagnoses => &DIAGNOSES_SPEC,
            Self::Labs => &LABS_SPEC,
        }
    }

    /// Exact-name match against the archive entry; no globbing or case folding.
    pub fn from_entry_name(entry_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.spec().source_entry_name == entry_name)
    }
}
