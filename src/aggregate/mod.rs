//! Response aggregation.
//!
//! Turns a raw response table (header row plus response rows, all strings)
//! into per-question answer distributions. Column 0 of every row is an
//! identifier such as a timestamp and never counted. Answers are counted by
//! their literal cell text; nothing is trimmed or case-folded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Rows of string cells; row 0 is the header.
pub type ResponseTable = Vec<Vec<String>>;

/// One distinct answer and how often it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    /// Answer text exactly as it appeared in the cell.
    pub option: String,
    pub count: u64,
    /// Share of this question's votes, rounded to two decimals.
    pub percentage: f64,
}

/// Most common answer and distribution for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// `None` when the question received no votes.
    pub most_common_answer: Option<String>,
    /// Entries in order of first occurrence.
    pub distribution: Vec<DistributionEntry>,
}

/// Aggregated result for one header column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    pub question: String,
    pub analysis: Analysis,
}

/// Aggregated results for a whole response table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub title: String,
    pub description: String,
    /// One entry per question column, in header order.
    pub questions: Vec<QuestionAnalysis>,
}

/// Vote counter that remembers the order answers were first seen in.
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    total: u64,
}

impl Tally {
    fn record(&mut self, answer: &str) {
        self.total += 1;
        match self.index.get(answer) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(answer.to_string(), self.counts.len());
                self.counts.push((answer.to_string(), 1));
            }
        }
    }

    /// First answer, in first-seen order, holding the highest count.
    fn most_common(&self) -> Option<String> {
        let mut best: Option<&(String, u64)> = None;
        for entry in &self.counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(answer, _)| answer.clone())
    }

    fn into_analysis(self) -> Analysis {
        let most_common_answer = self.most_common();
        let total = self.total;
        let distribution = self
            .counts
            .into_iter()
            .map(|(option, count)| DistributionEntry {
                option,
                count,
                percentage: percentage(count, total),
            })
            .collect();

        Analysis {
            most_common_answer,
            distribution,
        }
    }
}

/// `count / total * 100` rounded to two decimals, or `0.0` for no votes.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Aggregate a response table into a report.
///
/// Never fails: an empty table yields no questions, a header-only table yields
/// one empty analysis per question column, and rows too short to reach a
/// column simply cast no vote for it.
pub fn aggregate(
    rows: &[Vec<String>],
    title: impl Into<String>,
    description: impl Into<String>,
) -> AggregationReport {
    let mut report = AggregationReport {
        title: title.into(),
        description: description.into(),
        questions: Vec::new(),
    };

    let Some((header, responses)) = rows.split_first() else {
        return report;
    };

    report.questions = header
        .iter()
        .enumerate()
        .skip(1)
        .map(|(column, label)| {
            let mut tally = Tally::default();
            for answer in responses.iter().filter_map(|row| row.get(column)) {
                tally.record(answer);
            }
            QuestionAnalysis {
                question: label.clone(),
                analysis: tally.into_analysis(),
            }
        })
        .collect();

    report
}

impl AggregationReport {
    /// Number of response rows that contributed to the busiest question
    pub fn max_votes(&self) -> u64 {
        self.questions
            .iter()
            .map(|q| q.analysis.distribution.iter().map(|d| d.count).sum::<u64>())
            .max()
            .unwrap_or(0)
    }
}
