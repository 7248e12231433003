use std::collections::HashMap;
use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::survey::*;
use survey_tabulation::{Category, TabulationRules};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub word: String,
    pub category: String,
}

/// The on-disk shape of a rules-override file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "narrativeQuestion")]
    pub narrative_question: String,
    #[serde(rename = "employerQuestion")]
    pub employer_question: String,
    #[serde(rename = "summaryHeading")]
    pub summary_heading: String,
    pub keywords: Vec<KeywordEntry>,
    #[serde(rename = "stopWords")]
    pub stop_words: Vec<String>,
}

pub fn read_rules(path: &str) -> SurveyResult<TabulationRules> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RulesConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_rules: config: {:?}", config);
    validate_rules(&config)
}

/// Validates a parsed rules file into engine configuration. Keywords and stop
/// words are lowercased on the way in, since matching happens on lowercased
/// tokens.
pub fn validate_rules(config: &RulesConfig) -> SurveyResult<TabulationRules> {
    let mut keywords: HashMap<String, Category> = HashMap::new();
    for entry in config.keywords.iter() {
        let category = match entry.category.as_str() {
            "career" => Category::Career,
            "finance" => Category::Finance,
            "education" => Category::Education,
            "personalRelationships" => Category::PersonalRelationships,
            x => {
                whatever!("Unknown category {:?} for keyword {:?}", x, entry.word)
            }
        };
        keywords.insert(entry.word.to_lowercase(), category);
    }
    Ok(TabulationRules {
        narrative_question: config.narrative_question.clone(),
        employer_question: config.employer_question.clone(),
        summary_heading: config.summary_heading.clone(),
        keywords,
        stop_words: config
            .stop_words
            .iter()
            .map(|word| word.to_lowercase())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "narrativeQuestion": "Tell us about your plans.",
        "employerQuestion": "Who employs you?",
        "summaryHeading": "Category distribution",
        "keywords": [
            {"word": "Job", "category": "career"},
            {"word": "money", "category": "finance"}
        ],
        "stopWords": ["A", "the"]
    }"#;

    #[test]
    fn rules_file_round_trip() {
        let config: RulesConfig = serde_json::from_str(SAMPLE).unwrap();
        let rules = validate_rules(&config).unwrap();
        assert_eq!(rules.narrative_question, "Tell us about your plans.");
        assert_eq!(rules.keywords.get("job"), Some(&Category::Career));
        assert_eq!(rules.keywords.len(), 2);
        assert!(rules.stop_words.contains("a"));
        assert!(rules.stop_words.contains("the"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let config = RulesConfig {
            narrative_question: "n".to_string(),
            employer_question: "e".to_string(),
            summary_heading: "s".to_string(),
            keywords: vec![KeywordEntry {
                word: "job".to_string(),
                category: "careers".to_string(),
            }],
            stop_words: vec![],
        };
        assert!(validate_rules(&config).is_err());
    }
}
