// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::survey::*;
use survey_tabulation::{Record, RecordBuilder};

/// Reads a CSV file into one record per data row, with the first row as the
/// question headers. CSV carries no cell types, so values stay raw strings.
pub fn read_csv_records(path: &str) -> SurveyResult<Vec<Record>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut records = rdr.into_records();
    let headers: Vec<String> = match records.next() {
        Some(line_r) => {
            let line = line_r.context(CsvLineParseSnafu { path })?;
            line.iter().map(|field| field.to_string()).collect()
        }
        None => return EmptyCsvSnafu { path }.fail(),
    };
    debug!("read_csv_records: header: {:?}", headers);

    let mut res: Vec<Record> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header row is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        debug!("read_csv_records: line {:?}: {:?}", lineno, line);
        let mut builder = RecordBuilder::new();
        for (col, value) in line.iter().enumerate() {
            if let Some(question) = headers.get(col) {
                builder = builder.field(question, value);
            }
        }
        res.push(builder.build());
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("responses.csv")).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn rows_become_sparse_records() {
        let dir = write_csv("Q1,Q2,Q3\nyes,,blue\nno,x;y;,\n");
        let path = dir.path().join("responses.csv");
        let records = read_csv_records(path.to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Q1"), Some("yes"));
        assert_eq!(records[0].get("Q2"), None);
        assert_eq!(records[0].get("Q3"), Some("blue"));
        assert_eq!(records[1].get("Q2"), Some("x;y;"));
        assert_eq!(records[1].len(), 2);
    }

    #[test]
    fn field_order_follows_the_columns() {
        let dir = write_csv("B,A\n1,2\n");
        let path = dir.path().join("responses.csv");
        let records = read_csv_records(path.to_str().unwrap()).unwrap();
        let questions: Vec<&str> = records[0].iter().map(|(q, _)| q).collect();
        assert_eq!(questions, vec!["B", "A"]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = write_csv("");
        let path = dir.path().join("responses.csv");
        let res = read_csv_records(path.to_str().unwrap());
        assert!(res.is_err());
    }
}
