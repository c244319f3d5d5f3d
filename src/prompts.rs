//! Centralized prompt definitions for the survey pipes
//!
//! This module contains the system prompts the Langbase pipes are created with
//! and the builders that render per-request user messages.

use crate::aggregate::AggregationReport;
use crate::survey::Survey;

/// System prompt for survey generation.
///
/// Used by both the Langbase pipe creation and message building.
pub const SURVEY_GENERATION_PROMPT: &str = r#"You are a survey authoring assistant. Create a survey on the topic given by the user.

The survey must have the following structure:

1. Title: A short, concise title (maximum 5 words).
2. Introduction: A brief introduction (1-2 sentences) that introduces the topic.
3. Questions: A list of 3-5 questions. Each question must include three short answer options.

Your response MUST be valid JSON in this exact format:
{
  "title": "<Survey Title>",
  "introduction": "<Brief introduction>",
  "questions": [
    {
      "question": "<Question text>",
      "options": [{"option": "<Answer option>"}, {"option": "<Answer option>"}, {"option": "<Answer option>"}]
    }
  ]
}

Always respond with valid JSON only, no other text."#;

/// System prompt for survey editing.
pub const SURVEY_EDIT_PROMPT: &str = r#"You are a survey editing assistant. You receive an existing survey as JSON and a list of modifications.

Apply the modifications and return the complete updated survey. Keep everything the modifications do not mention unchanged.

Your response MUST be valid JSON with exactly the same structure as the input:
{
  "title": "<Survey Title>",
  "introduction": "<Brief introduction>",
  "questions": [
    {"question": "<Question text>", "options": [{"option": "<Answer option>"}]}
  ]
}

Always respond with valid JSON only, no other text."#;

/// System prompt for summarizing survey results.
pub const SURVEY_SUMMARY_PROMPT: &str = r#"You are a survey analyst writing an executive summary of survey results.

You receive the survey (title, introduction, questions and options) and the aggregated responses (for every question the most common answer and the distribution of answers with counts and percentages).

Structure your answer in exactly two sections:

Overview
A short paragraph on what the survey asked and how many people answered.

Analysis
The key findings per question and any notable patterns across questions.

Write in the same language the survey itself is written in. Do not invent numbers that are not in the data."#;

/// Render the user message for a generation request
pub fn generation_message(topic: &str) -> String {
    format!("Create a survey on the topic \"{}\".", topic.trim())
}

/// Render the user message for an edit request
pub fn edit_message(survey_json: &str, modifications: &str) -> String {
    format!(
        "Here is an existing survey:\n{}\n\nPlease update the survey based on the following modifications:\n{}\n\nOutput the updated survey in strictly valid JSON format adhering to the same structure.",
        survey_json,
        modifications.trim()
    )
}

/// Render the survey and its aggregated responses as descriptive text
pub fn summary_message(survey: &Survey, report: &AggregationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Survey title: {}\n", survey.title));
    out.push_str(&format!("Introduction: {}\n\nQuestions:\n", survey.introduction));
    for (i, q) in survey.questions.iter().enumerate() {
        let options: Vec<&str> = q.options.iter().map(|o| o.option.as_str()).collect();
        out.push_str(&format!(
            "{}. {} (options: {})\n",
            i + 1,
            q.question,
            options.join(", ")
        ));
    }

    out.push_str("\nAggregated responses:\n");
    if report.questions.is_empty() {
        out.push_str("No responses were collected.\n");
    }
    for qa in &report.questions {
        out.push_str(&format!("\nQuestion: {}\n", qa.question));
        match &qa.analysis.most_common_answer {
            Some(answer) => out.push_str(&format!("Most common answer: {}\n", answer)),
            None => out.push_str("Most common answer: none (no responses)\n"),
        }
        for entry in &qa.analysis.distribution {
            out.push_str(&format!(
                "- {}: {} ({:.2}%)\n",
                entry.option, entry.count, entry.percentage
            ));
        }
    }

    out
}
