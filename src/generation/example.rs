//! Example CSV generation.

use rand::Rng;

use crate::error::{ImportError, ImportResult};
use crate::types::{ColumnDeclaration, ColumnSet};

use super::ValueGenerator;

/// Number of example rows produced when the caller has no preference.
pub const DEFAULT_EXAMPLE_ROWS: usize = 3;

/// Build an example CSV: a header of column keys followed by `rows` generated data lines.
///
/// Per cell, in priority order:
///
/// 1. a uniformly random pick from the column's value options;
/// 2. the column's declared generator;
/// 3. a generator implied by the key (`name`, `email`, `phone`, `city`, ...);
/// 4. the placeholder `[<label> example]`.
///
/// Fields are quoted only where CSV requires it, so the output parses back cleanly. Returns an
/// empty string for an empty column set.
pub fn generate_example_csv<R: Rng>(
    columns: &ColumnSet,
    rows: usize,
    rng: &mut R,
) -> ImportResult<String> {
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(columns.keys())?;
    for _ in 0..rows {
        let record: Vec<String> = columns.iter().map(|col| example_value(col, rng)).collect();
        wtr.write_record(&record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| {
            let io = std::io::Error::new(e.error().kind(), e.error().to_string());
            ImportError::Csv(io.into())
        })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_end_matches('\n').to_string())
}

/// One example value for `col`.
pub fn example_value<R: Rng>(col: &ColumnDeclaration, rng: &mut R) -> String {
    if !col.value_options.is_empty() {
        let idx = rng.random_range(0..col.value_options.len());
        return col.value_options[idx].as_cell();
    }
    match col.generator.or_else(|| ValueGenerator::for_key(&col.key)) {
        Some(generator) => generator.generate(rng),
        None => col.placeholder(),
    }
}
