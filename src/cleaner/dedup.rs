use crate::errors::AppResult;
use polars::prelude::*;
use std::collections::HashSet;

/// Removes rows that exactly repeat an earlier row, keeping the first and
/// preserving order. Nulls compare equal to each other and to nothing else.
///
/// Only rows within this DataFrame are compared, so a chunked table can still
/// carry duplicates that straddle a chunk boundary.
pub fn drop_duplicate_rows(df: &DataFrame) -> AppResult<DataFrame> {
    let height = df.height();
    if height < 2 {
        return Ok(df.clone());
    }

    // Floats are compared through their textual form
    let columns = df
        .get_columns()
        .iter()
        .map(|s| Ok(s.cast(&DataType::String)?.str()?.clone()))
        .collect::<PolarsResult<Vec<StringChunked>>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(height);
    let keep: Vec<bool> = (0..height)
        .map(|row| seen.insert(columns.iter().map(|c| c.get(row)).collect()))
        .collect();

    if keep.iter().all(|&k| k) {
        return Ok(df.clone());
    }

    let mask = BooleanChunked::from_slice("keep", &keep);
    Ok(df.filter(&mask)?)
}
