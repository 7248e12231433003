// ********* Input data structures ***********

use std::collections::{HashMap, HashSet};

/// A single respondent's row: the ordered list of (question, answer) pairs.
///
/// Field order is the column order of the source spreadsheet and it matters:
/// duplicate-column merging resolves in field order, and the output tables
/// enumerate questions in the order they were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    /// Appends a field without any merge policy. Readers and tests use this
    /// to lay out a row exactly as it appears in the source.
    pub fn push_field(&mut self, question: &str, answer: &str) {
        self.fields.push((question.to_string(), answer.to_string()));
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(q, _)| *q == question)
            .map(|(_, a)| a.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First-registered-wins merge: the value lands on the question only if
    /// its slot is still empty. A missing question is inserted at the current
    /// position, so the earliest column of a merged pair keeps its place.
    pub(crate) fn merge_field(&mut self, question: &str, answer: &str) {
        match self.fields.iter_mut().find(|(q, _)| *q == question) {
            Some((_, existing)) if existing.is_empty() => {
                *existing = answer.to_string();
            }
            Some(_) => {
                // The slot already holds a value. Later duplicates lose.
            }
            None => {
                self.fields.push((question.to_string(), answer.to_string()));
            }
        }
    }
}

// ******** Output data structures *********

/// A frequency table with first-seen key order.
///
/// Backed by a vector of pairs rather than a map: enumeration order drives
/// the chart rendering order, so it has to stay exactly as inserted.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        FrequencyTable {
            entries: Vec::new(),
        }
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// Adds `amount` to the key, inserting it first if needed. An insert with
    /// amount zero still creates the entry, which the category summary relies
    /// on to always show all categories.
    pub fn add(&mut self, key: &str, amount: u64) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += amount,
            None => self.entries.push((key.to_string(), amount)),
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, count)| (k.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

/// The answer tally of one canonical question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionTable {
    pub question: String,
    pub answers: FrequencyTable,
}

impl QuestionTable {
    /// A table is worth a pie chart only when at least one answer repeats.
    /// When the sum of the counts equals the number of distinct answers,
    /// every slice would be the same size and the chart says nothing.
    pub fn is_chartable(&self) -> bool {
        self.answers.total() != self.answers.len() as u64
    }
}

/// One of the fixed thematic groups used to classify narrative answers.
///
/// Each category doubles as its own human-readable label, which is also the
/// key it appears under in the output tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Category {
    Career,
    Finance,
    Education,
    PersonalRelationships,
}

impl Category {
    /// All the categories, in the order they appear in reports and in the
    /// synthetic summary table.
    pub const ALL: [Category; 4] = [
        Category::Career,
        Category::Finance,
        Category::Education,
        Category::PersonalRelationships,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Career => {
                "Carreira (pessoas que querem garantir um emprego/carreira na área)"
            }
            Category::Finance => {
                "Finanças (pessoas que buscam uma vida financeira estável com o curso)"
            }
            Category::Education => {
                "Educação (pessoas que querem buscar conhecimento/ou a conclusão do curso)"
            }
            Category::PersonalRelationships => {
                "Relações Pessoais (pessoas que começaram a estudar na área por amigos ou parentes e que querem sustentá-los)"
            }
        }
    }
}

/// The full output of one tabulation pass.
///
/// The keyword hits and the employer terms live in two separate tables. The
/// tool this replaces accumulated both in a single shared map; the merged
/// shape is only available through [`SurveyStats::legacy_word_counts`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyStats {
    /// One answer table per canonical question, in first-seen order, with the
    /// synthetic category-distribution table appended last.
    pub questions: Vec<QuestionTable>,
    /// Keyword hits per category, in [`Category::ALL`] order.
    pub category_tally: Vec<(Category, u64)>,
    /// Stop-word-filtered term counts from the employer question.
    pub employer_terms: FrequencyTable,
}

impl SurveyStats {
    pub fn category_count(&self, category: Category) -> u64 {
        self.category_tally
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn question_table(&self, question: &str) -> Option<&QuestionTable> {
        self.questions.iter().find(|qt| qt.question == question)
    }

    /// The merged word-count view kept for report compatibility: keyword hits
    /// keyed by category label, followed by the employer terms.
    ///
    /// This adapter is the only place where the two namespaces are joined.
    /// Categories without a single hit are omitted, matching the lazy
    /// insertion of the legacy table.
    pub fn legacy_word_counts(&self) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for (category, count) in self.category_tally.iter() {
            if *count > 0 {
                table.add(category.label(), *count);
            }
        }
        for (word, count) in self.employer_terms.iter() {
            table.add(word, count);
        }
        table
    }
}

// ********* Configuration **********

/// The rule set driving one tabulation pass.
///
/// There is no global rule state: the engine only sees what is passed here,
/// so tests can substitute a small fixture set. The production values live in
/// [`TabulationRules::default_rules`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabulationRules {
    /// The free-text question whose answers are scanned for category keywords.
    pub narrative_question: String,
    /// The free-text question whose answers feed the employer term counts.
    pub employer_question: String,
    /// Question label of the synthetic category-distribution table.
    pub summary_heading: String,
    /// Lowercase single-word token to the category it signals.
    pub keywords: HashMap<String, Category>,
    /// Lowercase tokens dropped from the employer answers before counting.
    pub stop_words: HashSet<String>,
}

impl TabulationRules {
    /// The rule set of the questionnaire this tool was written for, verbatim.
    pub fn default_rules() -> TabulationRules {
        let keywords: [(&str, Category); 22] = [
            ("trabalho", Category::Career),
            ("emprego", Category::Career),
            ("profissionalizar", Category::Career),
            ("trabalhar", Category::Career),
            ("área", Category::Career),
            ("conhecimento", Category::Education),
            ("formar", Category::Education),
            ("graduar", Category::Education),
            ("graduado", Category::Education),
            ("especializar", Category::Education),
            ("especialização", Category::Education),
            ("estudar", Category::Education),
            ("curso", Category::Education),
            ("diploma", Category::Education),
            ("família", Category::PersonalRelationships),
            ("mãe", Category::PersonalRelationships),
            ("pai", Category::PersonalRelationships),
            ("amigos", Category::PersonalRelationships),
            ("intercâmbio", Category::PersonalRelationships),
            ("estabilidade", Category::Finance),
            ("dinheiro", Category::Finance),
            ("sustentar", Category::Finance),
        ];
        let stop_words = ["a", "o", "em", "de", "para", "com", "que", "você", "está"];

        TabulationRules {
            narrative_question: "Escreva algumas linhas sobre sua história e seus sonhos de vida."
                .to_string(),
            employer_question: "Qual empresa que você está contratado agora?".to_string(),
            summary_heading:
                "Distribuição de alunos que responderam o questionário do perfil socioeconômico"
                    .to_string(),
            keywords: keywords
                .iter()
                .map(|(word, category)| (word.to_string(), *category))
                .collect(),
            stop_words: stop_words.iter().map(|word| word.to_string()).collect(),
        }
    }
}
