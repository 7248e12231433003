use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use survey_tabulation::{run_survey_stats, Record, SurveyStats, TabulationRules};

pub mod charts;
pub mod config_reader;
pub mod io_csv;
pub mod io_xlsx;
pub mod report;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet or no rows in spreadsheet {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line in {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("The CSV file {path} has no header row"))]
    EmptyCsv { path: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingArtifact {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The optional knobs of a run, besides the two paths.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub input_type: Option<String>,
    pub rules: Option<String>,
    pub summary: Option<String>,
    pub reference: Option<String>,
}

/// Runs the whole pipeline: read the records, tabulate, print the report,
/// export the charts, and optionally write/check the JSON summary.
///
/// The chart export only starts after the tabulation pass has fully
/// completed; the sequencing here is the barrier.
pub fn run_analysis(
    spreadsheet_path: &str,
    output_dir: &str,
    opts: &AnalysisOptions,
) -> SurveyResult<()> {
    let rules = match &opts.rules {
        Some(path) => config_reader::read_rules(path)?,
        None => TabulationRules::default_rules(),
    };

    let records = read_records(spreadsheet_path, opts.input_type.as_deref())?;
    info!(
        "run_analysis: {:?} records read from {:?}",
        records.len(),
        spreadsheet_path
    );

    let stats = run_survey_stats(&records, &rules);

    report::print_report(&stats, &records);

    let chart_report = charts::export_charts(
        &stats,
        Path::new(output_dir),
        &charts::SvgPieRenderer::default(),
    )?;
    info!("run_analysis: {}", chart_report.summary());

    let summary_js = build_summary_js(&stats);
    let pretty_summary = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match opts.summary.as_deref() {
        Some("stdout") => println!("{}", pretty_summary),
        Some(path) => {
            info!("run_analysis: writing summary to {:?}", path);
            fs::write(path, &pretty_summary).context(WritingArtifactSnafu { path })?;
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &opts.reference {
        let reference_js = read_summary(reference_path)?;
        debug!("run_analysis: reference summary: {:?}", reference_js);
        let pretty_reference =
            serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_summary {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty_summary.as_str(), "\n");
            whatever!("Difference detected between the tabulated summary and the reference summary");
        }
    }

    Ok(())
}

fn read_records(path: &str, input_type: Option<&str>) -> SurveyResult<Vec<Record>> {
    let detected = match input_type {
        Some(input_type) => input_type.to_string(),
        None => Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("xlsx")
            .to_lowercase(),
    };
    info!("read_records: input type {:?} for {:?}", detected, path);
    match detected.as_str() {
        "xlsx" | "xls" => io_xlsx::read_xlsx_records(path),
        "csv" => io_csv::read_csv_records(path),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

pub fn read_summary(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_summary: read {:?} bytes", contents.len());
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Assembles the JSON summary of a run: category totals, the merged word
/// counts, and every question table. Questions are kept in a JSON array so
/// their order survives serialization.
pub fn build_summary_js(stats: &SurveyStats) -> JSValue {
    let mut categories: JSMap<String, JSValue> = JSMap::new();
    for (category, count) in stats.category_tally.iter() {
        categories.insert(category.label().to_string(), json!(count));
    }

    let mut word_counts: JSMap<String, JSValue> = JSMap::new();
    for (word, count) in stats.legacy_word_counts().iter() {
        word_counts.insert(word.to_string(), json!(count));
    }

    let mut questions: Vec<JSValue> = Vec::new();
    for table in stats.questions.iter() {
        let mut answers: JSMap<String, JSValue> = JSMap::new();
        for (answer, count) in table.answers.iter() {
            answers.insert(answer.to_string(), json!(count));
        }
        questions.push(json!({"question": table.question, "answers": answers}));
    }

    json!({
        "categories": categories,
        "wordCounts": word_counts,
        "questions": questions,
    })
}
