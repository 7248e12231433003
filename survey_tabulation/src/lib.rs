mod builder;
mod config;

use log::{debug, info};

pub use crate::builder::RecordBuilder;
pub use crate::config::*;

/// Runs the tabulation pass over the given records with the given rules.
///
/// Arguments:
/// * `records` the ordered sequence of respondent rows
/// * `rules` the rule set to tabulate with. Use
/// [`TabulationRules::default_rules`] for the built-in questionnaire.
///
/// The pass is strictly sequential: records are visited in input order and
/// fields in their record order, so duplicate-column merging always resolves
/// the same way for the same input.
pub fn run_survey_stats(records: &[Record], rules: &TabulationRules) -> SurveyStats {
    info!(
        "run_survey_stats: processing {:?} records, {:?} keywords, {:?} stop words",
        records.len(),
        rules.keywords.len(),
        rules.stop_words.len()
    );

    let mut questions: Vec<QuestionTable> = Vec::new();
    let mut category_tally: Vec<(Category, u64)> =
        Category::ALL.iter().map(|category| (*category, 0)).collect();
    let mut employer_terms = FrequencyTable::new();

    for (idx, record) in records.iter().enumerate() {
        let canonical = canonicalize_record(record);
        debug!("run_survey_stats: record {:?}: {:?}", idx, canonical);

        for (question, answer) in canonical.iter() {
            if answer.is_empty() {
                continue;
            }

            register_answer(&mut questions, question, answer);

            if question == rules.narrative_question {
                for token in tokenize(answer) {
                    if let Some(category) = rules.keywords.get(token.as_str()) {
                        if let Some(entry) =
                            category_tally.iter_mut().find(|(c, _)| c == category)
                        {
                            entry.1 += 1;
                        }
                    }
                }
            }

            if question == rules.employer_question {
                for token in tokenize(answer) {
                    if !rules.stop_words.contains(&token) {
                        employer_terms.increment(&token);
                    }
                }
            }
        }
    }

    // The synthetic table always carries all the categories, zeros included.
    let mut summary = FrequencyTable::new();
    for (category, count) in category_tally.iter() {
        summary.add(category.label(), *count);
    }
    questions.push(QuestionTable {
        question: rules.summary_heading.clone(),
        answers: summary,
    });

    for table in questions.iter_mut() {
        table.question = rewrite_question_label(&table.question);
    }

    debug!("run_survey_stats: {:?} question tables", questions.len());

    SurveyStats {
        questions,
        category_tally,
        employer_terms,
    }
}

/// Returns a copy of the record with duplicate-suffixed question columns
/// folded onto their canonical question.
///
/// A question key ending in a digit run is a re-numbered repeat of the key
/// without the digits. The merge policy is first-registered-wins: a question
/// keeps the first non-empty value seen for it in field order, and later
/// duplicates only fill slots that are still empty. Suffixed keys never
/// survive into the returned record.
pub fn canonicalize_record(record: &Record) -> Record {
    let mut out = Record::new();
    for (question, answer) in record.iter() {
        let canonical = strip_duplicate_suffix(question).unwrap_or(question);
        out.merge_field(canonical, answer);
    }
    out
}

/// Cosmetic cleanup applied to every question label after tabulation. It
/// collapses the spreadsheet range artifact "V+AZ:CP" back to "V" and drops
/// the stray space some forms insert before a question mark.
pub fn rewrite_question_label(label: &str) -> String {
    label.replacen("V+AZ:CP", "V", 1).replace(" ?", "?")
}

fn register_answer(questions: &mut Vec<QuestionTable>, question: &str, answer: &str) {
    let idx = match questions.iter().position(|table| table.question == question) {
        Some(idx) => idx,
        None => {
            questions.push(QuestionTable {
                question: question.to_string(),
                answers: FrequencyTable::new(),
            });
            questions.len() - 1
        }
    };
    let table = &mut questions[idx];

    match split_list_items(answer) {
        Some(items) => {
            for item in items.iter() {
                table.answers.increment(item);
            }
        }
        None => table.answers.increment(answer),
    }
}

/// Splits a list-style answer into its items.
///
/// An item is a maximal run of non-semicolon, non-whitespace characters that
/// is immediately followed by a semicolon. An answer with no such run is not
/// a list and is returned as `None`; note that a trailing run without its
/// closing semicolon is not an item.
fn split_list_items(answer: &str) -> Option<Vec<String>> {
    let mut items: Vec<String> = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in answer.char_indices() {
        if c == ';' {
            if let Some(s) = start {
                items.push(answer[s..idx].to_string());
            }
            start = None;
        } else if c.is_whitespace() {
            start = None;
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

// Tokens are opaque: no punctuation stripping, no accent folding. "área,"
// with a trailing comma does not match the keyword "área".
fn tokenize(answer: &str) -> Vec<String> {
    answer
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.to_string())
        .collect()
}

fn strip_duplicate_suffix(question: &str) -> Option<&str> {
    let stripped = question.trim_end_matches(|c: char| c.is_ascii_digit());
    if stripped.len() == question.len() {
        None
    } else {
        Some(stripped)
    }
}
