use clap::Parser;

/// This is a survey tabulation and charting program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The spreadsheet with the survey responses. Only the first
    /// worksheet is read and its first row must hold the question headers.
    /// Prompted for interactively when omitted.
    #[clap(value_parser)]
    pub spreadsheet: Option<String>,

    /// (directory path) Where the chart images and the combined HTML report
    /// are written. Created when absent. Prompted for interactively when omitted.
    #[clap(value_parser)]
    pub output_dir: Option<String>,

    /// (default: the file extension) The type of the input: xlsx or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) A JSON file overriding the built-in tabulation
    /// rules: the designated questions, the keyword map and the stop words.
    #[clap(long, value_parser)]
    pub rules: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a JSON summary of the
    /// tabulation will be written to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, surveytab
    /// will check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
