//! Common test utilities for integration tests

use std::fs;
use std::io::Write;
use std::path::Path;

/// Helper function to create a test ZIP file with specified files
#[allow(dead_code)]
pub fn create_test_zip(
    zip_path: &Path,
    files: &[(&str, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in files {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Joins a header and rows into TSV text
#[allow(dead_code)]
pub fn tsv(header: &[&str], rows: &[Vec<&str>]) -> String {
    let mut out = header.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Patients table: one valid row, its exact duplicate, and an empty primary key
#[allow(dead_code)]
pub const PATIENTS_TSV: &str = "PatientID\tPatientGender\tPatientDateOfBirth\tPatientRace\tPatientMaritalStatus\tPatientLanguage\tPatientPopulationPercentageBelowPoverty
1\tMale\t1980-01-01\tWhite\tMarried\tEnglish\t12.5
1\tMale\t1980-01-01\tWhite\tMarried\tEnglish\t12.5
\tFemale\t1975-05-05\tAsian\tSingle\tEnglish\t3.1
";

#[allow(dead_code)]
pub const ADMISSIONS_TSV: &str = "PatientID\tAdmissionID\tAdmissionStartDate\tAdmissionEndDate
1\t1\t2011-10-12 14:55:02.027\t2011-10-22 01:16:07.557
1\t2\t2013-02-24 07:08:14.930\tnot recorded
";

#[allow(dead_code)]
pub const DIAGNOSES_TSV: &str = "PatientID\tAdmissionID\tPrimaryDiagnosisCode\tPrimaryDiagnosisDescription
1\t1\tM01.X\tDirect infection of joint, left elbow
1\t2\tD65\t  Disseminated intravascular coagulation  
";

#[allow(dead_code)]
pub const LABS_TSV: &str = "PatientID\tAdmissionID\tLabName\tLabValue\tLabUnits\tLabDateTime
1\t1\tCBC: WBC\t5.5\tk/cumm\t2011-10-13 01:36:17.910
1\t1\tCBC: WBC\t5.5\tk/cumm\t2011-10-13 01:36:17.910
1\t1\tCBC: RBC\t4.1\tm/cumm\t2011-10-13 01:36:17.910
1\t2\tCBC: RBC\tpending\tm/cumm\t2013-02-25 02:00:00
";

/// All four tables, keyed by entry name
#[allow(dead_code)]
pub fn full_archive_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("PatientCorePopulatedTable.txt", PATIENTS_TSV),
        ("AdmissionsCorePopulatedTable.txt", ADMISSIONS_TSV),
        ("AdmissionsDiagnosesCorePopulatedTable.txt", DIAGNOSES_TSV),
        ("LabsCorePopulatedTable.txt", LABS_TSV),
    ]
}
