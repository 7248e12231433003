use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, warn};
use snafu::prelude::*;

use crate::survey::*;
use survey_tabulation::{Record, RecordBuilder};

/// Reads the first worksheet into one record per data row. The first row
/// holds the question headers; empty cells are skipped, so records come out
/// sparse the same way the engine expects them.
pub fn read_xlsx_records(path: &str) -> SurveyResult<Vec<Record>> {
    let p = path.to_string();
    let mut workbook: Xlsx<_> = open_workbook(p).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("read_xlsx_records: header: {:?}", header);
    let headers: Vec<Option<String>> = header.iter().map(cell_to_string).collect();

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<Record> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_xlsx_records: row {:?}: {:?}", idx, row);
        let mut builder = RecordBuilder::new();
        for (col, cell) in row.iter().enumerate() {
            let question = match headers.get(col) {
                Some(Some(question)) => question,
                // A value under an unnamed column has nothing to tally under.
                _ => continue,
            };
            if let Some(answer) = cell_to_string(cell) {
                builder = builder.field(question, &answer);
            }
        }
        res.push(builder.build());
    }
    Ok(res)
}

/// Best-effort coercion of a cell to the string form the engine tallies.
/// Integral floats print without a fractional part, so a numeric answer
/// stored as 3.0 counts under "3".
pub fn cell_to_string(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) if s.is_empty() => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(format_float(*f)),
        DataType::DateTime(f) => Some(format_float(*f)),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::Empty => None,
        other => {
            warn!("cell_to_string: skipping cell {:?}", other);
            None
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_coerce_like_spreadsheet_values() {
        assert_eq!(
            cell_to_string(&DataType::String("yes".to_string())),
            Some("yes".to_string())
        );
        assert_eq!(cell_to_string(&DataType::String(String::new())), None);
        assert_eq!(cell_to_string(&DataType::Int(4)), Some("4".to_string()));
        assert_eq!(cell_to_string(&DataType::Float(3.0)), Some("3".to_string()));
        assert_eq!(
            cell_to_string(&DataType::Float(3.5)),
            Some("3.5".to_string())
        );
        assert_eq!(
            cell_to_string(&DataType::Bool(true)),
            Some("true".to_string())
        );
        assert_eq!(cell_to_string(&DataType::Empty), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = read_xlsx_records("does-not-exist.xlsx");
        assert!(res.is_err());
    }
}
