//! Query expansion - turn one user query into related sub-questions
//!
//! Expansion is load-bearing for recall: the page and chunk stages fan out
//! over the expanded set, so a failed expansion fails the whole request.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::RetrieveError;
use crate::llm::LlmProvider;

/// Expands a query into up to `n` related sub-questions
#[async_trait]
pub trait QuestionExpander: Send + Sync {
    /// Returns between 1 and `n` non-empty questions, or an expansion error
    async fn expand(&self, query: &str, n: usize) -> Result<Vec<String>, RetrieveError>;
}

/// Prompt template with instructions and variable substitution
pub struct PromptTemplate {
    pub name: &'static str,
    pub instructions: &'static str,
    pub prompt: &'static str,
}

impl PromptTemplate {
    /// Render instructions and prompt into one generation request
    pub fn render(&self, query: &str, n_questions: usize) -> String {
        let body = self
            .prompt
            .replace("{query}", query)
            .replace("{n_questions}", &n_questions.to_string());
        format!("{}\n\n{}", self.instructions, body)
    }
}

/// Template used to expand a user query into candidate questions
pub const QUESTIONS_FROM_QUERY: PromptTemplate = PromptTemplate {
    name: "questions_query",
    instructions: "You are an assistant tasked with generating important questions from a user query.",
    prompt: "You are given the following user query:\n{query}\n\nCreate a list of {n_questions} most likely questions this query is related to.\nReturn one question per line.",
};

/// Prompt-based expander backed by a generative model
pub struct PromptExpander {
    llm: LlmProvider,
    template: PromptTemplate,
}

impl PromptExpander {
    /// Create an expander using the default question template
    pub fn new(llm: LlmProvider) -> Self {
        Self {
            llm,
            template: QUESTIONS_FROM_QUERY,
        }
    }
}

#[async_trait]
impl QuestionExpander for PromptExpander {
    async fn expand(&self, query: &str, n: usize) -> Result<Vec<String>, RetrieveError> {
        let prompt = self.template.render(query, n);

        let response = self.llm.generate(&prompt).await.map_err(|e| {
            RetrieveError::Expansion(format!(
                "{} generation failed: {}",
                self.template.name, e
            ))
        })?;

        let questions = parse_questions(&response, n);
        debug!(
            "Expanded query into {} sub-questions (requested {})",
            questions.len(),
            n
        );

        if questions.is_empty() {
            return Err(RetrieveError::Expansion(format!(
                "{} produced no usable questions",
                self.template.name
            )));
        }

        Ok(questions)
    }
}

/// Fixed expander returning a preset question list
///
/// Stand-in for prompt-based expansion when the sub-questions are already
/// known; also the deterministic stub used throughout the engine tests.
pub struct StaticExpander {
    questions: Vec<String>,
}

impl StaticExpander {
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionExpander for StaticExpander {
    async fn expand(&self, _query: &str, n: usize) -> Result<Vec<String>, RetrieveError> {
        if self.questions.is_empty() {
            return Err(RetrieveError::Expansion(
                "no preset questions configured".to_string(),
            ));
        }
        Ok(self.questions.iter().take(n).cloned().collect())
    }
}

/// Parse a model reply into at most `n` questions
///
/// Accepts numbered lists, bullet lists, and bare lines; strips list
/// markers and surrounding quotes. Blank lines are skipped.
fn parse_questions(response: &str, n: usize) -> Vec<String> {
    let marker = Regex::new(r"^\s*(?:\d+[.)]\s*|[-*\u{2022}]\s*)").expect("valid regex");

    response
        .lines()
        .map(|line| {
            let stripped = marker.replace(line, "");
            stripped.trim().trim_matches('"').trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .take(n)
        .collect()
}
