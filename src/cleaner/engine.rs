use super::dates::normalize_datetime;
use super::dedup::drop_duplicate_rows;
use crate::errors::{AppError, AppResult};
use crate::models::TableSpec;
use polars::prelude::*;
use tracing::debug;

/// A cleaned batch together with its row-count statistics.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub batch: DataFrame,
    /// Rows before any cleaning step
    pub raw_rows: usize,
    /// Rows after duplicate removal
    pub clean_rows: usize,
}

impl CleanOutcome {
    pub fn dropped_rows(&self) -> usize {
        self.raw_rows - self.clean_rows
    }
}

/// Applies a table's cleaning policy to one batch.
///
/// The same function serves whole tables and individual chunks. It has no state
/// of its own, so a chunk is cleaned exactly as it would be inside a whole table,
/// except that duplicates are only detected within the batch.
///
/// # Steps
///
/// 1. Trim surrounding whitespace in every text column.
/// 2. Drop rows whose primary key is null or empty. Skipped when the key column is absent.
/// 3. Rewrite configured date columns as `YYYY-MM-DD HH:MM:SS`; unparseable values become null.
/// 4. Coerce configured numeric columns to `Float64`; unparseable values become null.
/// 5. Drop exact duplicate rows, keeping the first.
/// 6. Rename columns through the spec's mapping.
///
/// Configured columns missing from the batch are ignored. An empty batch yields an
/// empty batch with all counts at zero.
///
/// # Errors
///
/// Returns `ParseError` if a column operation fails or a rename would collide with
/// an existing column.
pub fn clean_batch(batch: DataFrame, spec: &TableSpec) -> AppResult<CleanOutcome> {
    let raw_rows = batch.height();
    let mut df = batch;

    trim_text_columns(&mut df)?;
    df = drop_missing_keys(df, spec.primary_key_column)?;

    for column in spec.date_columns {
        if has_column(&df, column) {
            normalize_date_column(&mut df, column)?;
        }
    }

    for column in spec.numeric_columns {
        if has_column(&df, column) {
            coerce_numeric_column(&mut df, column)?;
        }
    }

    df = drop_duplicate_rows(&df)?;
    rename_columns(&mut df, spec)?;

    let clean_rows = df.height();
    debug!(
        table = spec.source_entry_name,
        raw_rows = raw_rows,
        clean_rows = clean_rows,
        "Batch cleaned"
    );

    Ok(CleanOutcome {
        batch: df,
        raw_rows,
        clean_rows,
    })
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().contains(&name)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn trim_text_columns(df: &mut DataFrame) -> AppResult<()> {
    for name in column_names(df) {
        let trimmed = {
            let column = df.column(&name)?;
            if column.dtype() != &DataType::String {
                continue;
            }
            let values: Vec<Option<&str>> =
                column.str()?.into_iter().map(|v| v.map(str::trim)).collect();
            Series::new(&name, values)
        };
        df.with_column(trimmed)?;
    }
    Ok(())
}

fn drop_missing_keys(df: DataFrame, key: &str) -> AppResult<DataFrame> {
    if !has_column(&df, key) {
        return Ok(df);
    }

    let column = df.column(key)?;
    let keep = if column.dtype() == &DataType::String {
        let keep: Vec<bool> = column
            .str()?
            .into_iter()
            .map(|v| matches!(v, Some(s) if !s.is_empty()))
            .collect();
        BooleanChunked::from_slice("keep", &keep)
    } else {
        column.is_not_null()
    };

    Ok(df.filter(&keep)?)
}

fn normalize_date_column(df: &mut DataFrame, name: &str) -> AppResult<()> {
    let normalized = {
        let text = df.column(name)?.cast(&DataType::String)?;
        let values: Vec<Option<String>> = text
            .str()?
            .into_iter()
            .map(|v| v.and_then(normalize_datetime))
            .collect();
        Series::new(name, values)
    };
    df.with_column(normalized)?;
    Ok(())
}

fn coerce_numeric_column(df: &mut DataFrame, name: &str) -> AppResult<()> {
    let coerced = {
        let column = df.column(name)?;
        match column.dtype() {
            DataType::Float64 => return Ok(()),
            DataType::String => {
                let values: Vec<Option<f64>> = column
                    .str()?
                    .into_iter()
                    .map(|v| v.and_then(parse_finite))
                    .collect();
                Series::new(name, values)
            }
            _ => column.cast(&DataType::Float64)?,
        }
    };
    df.with_column(coerced)?;
    Ok(())
}

/// Parses a number, treating `NaN` and infinities as missing.
fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn rename_columns(df: &mut DataFrame, spec: &TableSpec) -> AppResult<()> {
    for (from, to) in spec.column_rename {
        if from == to || !has_column(df, from) {
            continue;
        }
        if has_column(df, to) {
            return Err(AppError::ParseError(format!(
                "Cannot rename column '{from}' to '{to}' in {}: '{to}' already exists",
                spec.source_entry_name
            )));
        }
        df.rename(from, to)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableKind;

    fn text_frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Series::new(name, values))
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn patients(rows: &[[Option<&str>; 4]]) -> DataFrame {
        let col = |i: usize| rows.iter().map(|r| r[i]).collect::<Vec<_>>();
        text_frame(vec![
            ("PatientID", col(0)),
            ("PatientGender", col(1)),
            ("PatientDateOfBirth", col(2)),
            ("PatientPopulationPercentageBelowPoverty", col(3)),
        ])
    }

    #[test]
    fn test_whitespace_is_trimmed_in_every_text_column() {
        let df = patients(&[[Some(" 1 "), Some("  X  "), None, Some(" 12.5 ")]]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(strings(&out.batch, "patient_id"), vec![Some("1".into())]);
        assert_eq!(strings(&out.batch, "gender"), vec![Some("X".into())]);
        assert_eq!(floats(&out.batch, "poverty_pct"), vec![Some(12.5)]);
    }

    #[test]
    fn test_missing_or_empty_keys_are_dropped() {
        let df = patients(&[
            [Some("1"), Some("M"), None, None],
            [None, Some("F"), None, None],
            [Some(""), Some("F"), None, None],
            [Some("   "), Some("F"), None, None],
            [Some("2"), Some("F"), None, None],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(
            strings(&out.batch, "patient_id"),
            vec![Some("1".into()), Some("2".into())]
        );
        assert_eq!(out.raw_rows, 5);
        assert_eq!(out.clean_rows, 2);
        assert_eq!(out.dropped_rows(), 3);
    }

    #[test]
    fn test_absent_key_column_skips_key_filter() {
        let df = text_frame(vec![("PatientGender", vec![Some("M"), None])]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(out.clean_rows, 2);
        assert_eq!(out.batch.get_column_names(), vec!["gender"]);
    }

    #[test]
    fn test_dates_are_normalized_and_bad_dates_become_null() {
        let df = patients(&[
            [Some("1"), None, Some("1947-12-28 02:45:40.547"), None],
            [Some("2"), None, Some("1980-01-01"), None],
            [Some("3"), None, Some("yesterday"), None],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(out.clean_rows, 3);
        assert_eq!(
            strings(&out.batch, "date_of_birth"),
            vec![
                Some("1947-12-28 02:45:40".into()),
                Some("1980-01-01 00:00:00".into()),
                None
            ]
        );
    }

    #[test]
    fn test_numerics_are_coerced_and_bad_values_become_null() {
        let df = patients(&[
            [Some("1"), None, None, Some("17.25")],
            [Some("2"), None, None, Some("n/a")],
            [Some("3"), None, None, Some("4")],
            [Some("4"), None, None, None],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(out.batch.column("poverty_pct").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            floats(&out.batch, "poverty_pct"),
            vec![Some(17.25), None, Some(4.0), None]
        );
    }

    #[test]
    fn test_nan_and_infinite_values_become_null() {
        let df = patients(&[
            [Some("1"), None, None, Some("NaN")],
            [Some("2"), None, None, Some("inf")],
            [Some("3"), None, None, Some("-infinity")],
            [Some("4"), None, None, Some("2.5")],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(out.batch.column("poverty_pct").unwrap().null_count(), 3);
        assert_eq!(
            floats(&out.batch, "poverty_pct"),
            vec![None, None, None, Some(2.5)]
        );
    }

    #[test]
    fn test_exact_duplicates_collapse_after_trim_and_normalization() {
        let df = patients(&[
            [Some("1"), Some("M"), Some("1980-01-01"), Some("10")],
            [Some("1 "), Some("M"), Some("1980-01-01 00:00:00"), Some("10.0")],
            [Some("1"), Some("F"), Some("1980-01-01"), Some("10")],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!(out.clean_rows, 2);
        assert_eq!(
            strings(&out.batch, "gender"),
            vec![Some("M".into()), Some("F".into())]
        );
    }

    #[test]
    fn test_columns_are_renamed_and_unmapped_kept() {
        let df = text_frame(vec![
            ("PatientID", vec![Some("1")]),
            ("AdmissionID", vec![Some("2")]),
            ("PrimaryDiagnosisCode", vec![Some("M01.X")]),
            ("Extra", vec![Some("e")]),
        ]);
        let out = clean_batch(df, TableKind::Diagnoses.spec()).unwrap();
        assert_eq!(
            out.batch.get_column_names(),
            vec!["patient_id", "admission_id", "diagnosis_code", "Extra"]
        );
        assert_eq!(floats(&out.batch, "admission_id"), vec![Some(2.0)]);
    }

    #[test]
    fn test_rename_collision_is_an_error() {
        let df = text_frame(vec![
            ("PatientID", vec![Some("1")]),
            ("patient_id", vec![Some("1")]),
        ]);
        let result = clean_batch(df, TableKind::Labs.spec());
        assert!(matches!(result, Err(AppError::ParseError(msg)) if msg.contains("patient_id")));
    }

    #[test]
    fn test_empty_batch_has_zero_counts() {
        let df = patients(&[]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert_eq!((out.raw_rows, out.clean_rows, out.dropped_rows()), (0, 0, 0));
        assert_eq!(out.batch.height(), 0);
        assert_eq!(out.batch.width(), 4);

        let out = clean_batch(DataFrame::empty(), TableKind::Labs.spec()).unwrap();
        assert_eq!((out.raw_rows, out.clean_rows), (0, 0));
    }

    #[test]
    fn test_counts_are_consistent() {
        let df = patients(&[
            [Some("1"), Some("M"), None, None],
            [Some("1"), Some("M"), None, None],
            [None, Some("M"), None, None],
            [Some("2"), Some("M"), None, None],
        ]);
        let out = clean_batch(df, TableKind::Patients.spec()).unwrap();
        assert!(out.clean_rows <= out.raw_rows);
        assert_eq!(out.raw_rows - out.clean_rows, out.dropped_rows());
        assert_eq!(out.clean_rows, out.batch.height());
    }

    #[test]
    fn test_cleaning_twice_changes_nothing() {
        let df = patients(&[
            [Some(" 1 "), Some(" M "), Some("1980-01-01"), Some("3.5")],
            [Some("1"), Some("M"), Some("1980-01-01"), Some("3.5")],
            [Some("2"), Some("F"), Some("bad"), Some("x")],
            [Some(""), Some("F"), None, None],
        ]);
        let spec = TableKind::Patients.spec();
        let first = clean_batch(df, spec).unwrap();
        let second = clean_batch(first.batch.clone(), spec).unwrap();

        assert_eq!(second.raw_rows, first.clean_rows);
        assert_eq!(second.clean_rows, first.clean_rows);
        assert!(second.batch.equals_missing(&first.batch));
        assert_eq!(
            second.batch.get_column_names(),
            first.batch.get_column_names()
        );
    }
}
