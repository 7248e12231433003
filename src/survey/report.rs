// Console report of a tabulation run. Read-only: everything here formats
// what the engine already computed.

use survey_tabulation::{Record, SurveyStats};

/// Formats the full report, one output row per line, so the shape can be
/// asserted on without capturing stdout.
pub fn format_report(stats: &SurveyStats, records: &[Record]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for (category, count) in stats.category_tally.iter() {
        lines.push(format!(
            "Total keyword hits in category {}: {}",
            category.label(),
            count
        ));
    }

    lines.push("Global word counts:".to_string());
    for (word, count) in stats.legacy_word_counts().iter() {
        lines.push(format!("  {}: {}", word, count));
    }

    lines.push("Answer counts per question:".to_string());
    for table in stats.questions.iter() {
        lines.push(format!("  {}", table.question));
        for (answer, count) in table.answers.iter() {
            lines.push(format!("    {}: {}", answer, count));
        }
    }

    lines.push(format!("Records ({}):", records.len()));
    for record in records.iter() {
        lines.push(format!("  {:?}", record));
    }

    lines
}

pub fn print_report(stats: &SurveyStats, records: &[Record]) {
    for line in format_report(stats, records) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_tabulation::{run_survey_stats, Category, RecordBuilder, TabulationRules};

    #[test]
    fn report_covers_every_section() {
        let rules = TabulationRules::default_rules();
        let records = vec![RecordBuilder::new()
            .field("Q", "yes")
            .field(&rules.employer_question, "empresa acme")
            .build()];
        let stats = run_survey_stats(&records, &rules);

        let lines = format_report(&stats, &records);

        assert!(lines
            .iter()
            .any(|l| l.contains(Category::Career.label()) && l.starts_with("Total keyword hits")));
        assert!(lines.contains(&"Global word counts:".to_string()));
        assert!(lines.contains(&"  empresa: 1".to_string()));
        assert!(lines.contains(&"  Q".to_string()));
        assert!(lines.contains(&"    yes: 1".to_string()));
        assert!(lines.contains(&"Records (1):".to_string()));
    }
}
