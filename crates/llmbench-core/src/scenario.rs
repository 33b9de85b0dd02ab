// Scenario catalog
//
// A scenario is one named prompt with an optional output-token cap.
// The catalog is built once at startup, either from the built-in list or
// from a YAML file, and is never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// One named test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name within the catalog, also used for chart file names
    pub name: String,
    pub prompt: String,
    /// Output-token cap; the invoker default applies when absent
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub description: String,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            max_tokens: None,
            description: description.into(),
        }
    }

    /// Set the output-token cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Catalog entry as written in a scenario file
///
/// `repeat` repeats the prompt text, which is how input-size scenarios
/// ("word " x 1000) are expressed without pasting the full prompt.
#[derive(Debug, Clone, Deserialize)]
struct ScenarioEntry {
    name: String,
    prompt: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    repeat: Option<usize>,
}

impl From<ScenarioEntry> for Scenario {
    fn from(entry: ScenarioEntry) -> Self {
        let prompt = match entry.repeat {
            Some(times) => entry.prompt.repeat(times),
            None => entry.prompt,
        };
        Scenario {
            name: entry.name,
            prompt,
            max_tokens: entry.max_tokens,
            description: entry.description,
        }
    }
}

/// Parse a YAML scenario list
pub fn parse_catalog(yaml: &str) -> Result<Vec<Scenario>> {
    let entries: Vec<ScenarioEntry> = serde_yaml::from_str(yaml)
        .map_err(|e| BenchError::config(format!("invalid scenario file: {}", e)))?;
    Ok(entries.into_iter().map(Scenario::from).collect())
}

/// Load a YAML scenario list from disk
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Scenario>> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|e| {
        BenchError::config(format!(
            "failed to read scenario file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_catalog(&yaml)
}

/// Check that a catalog is usable: non-empty, unique non-empty names
///
/// Names become chart file names, so path separators and `..` are rejected.
pub fn validate_catalog(scenarios: &[Scenario]) -> Result<()> {
    if scenarios.is_empty() {
        return Err(BenchError::config("scenario catalog is empty"));
    }

    let mut seen = HashSet::new();
    for scenario in scenarios {
        if scenario.name.trim().is_empty() {
            return Err(BenchError::config("scenario name must not be empty"));
        }
        if scenario.name.contains(['/', '\\']) || scenario.name == ".." {
            return Err(BenchError::config(format!(
                "scenario name '{}' must not contain path separators",
                scenario.name
            )));
        }
        if !seen.insert(scenario.name.as_str()) {
            return Err(BenchError::config(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
    }
    Ok(())
}

/// Built-in catalog of response-size and token-size scenarios
pub fn default_catalog() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new(
            "short_response",
            "What is 2+2? Answer with just the number.",
            "Testing short, quick responses",
        ),
        Scenario::new(
            "medium_response",
            "Write a paragraph about artificial intelligence.",
            "Testing medium-length responses",
        ),
        Scenario::new(
            "long_response",
            "Write a detailed essay about the history of computing. Include at least 5 major milestones.",
            "Testing long-form content generation",
        ),
    ];

    for (label, words) in [
        ("1k", 1_000),
        ("5k", 5_000),
        ("10k", 10_000),
        ("20k", 20_000),
        ("20", 20),
    ] {
        scenarios.push(Scenario::new(
            format!("input_{}_tokens", label),
            "word ".repeat(words),
            format!("Testing with a {} token input prompt", group_thousands(words)),
        ));
    }

    for (label, words) in [
        ("1k", 1_000),
        ("5k", 5_000),
        ("10k", 10_000),
        ("20k", 20_000),
        ("20", 20),
    ] {
        let count = group_thousands(words);
        scenarios.push(
            Scenario::new(
                format!("output_{}_tokens", label),
                format!("Repeat the word 'echo' {} times.", count),
                format!("Prompt to generate about {} output tokens", count),
            )
            .with_max_tokens(words as u32),
        );
    }

    for tokens in [500u32, 1_000, 2_000] {
        let count = group_thousands(tokens as usize);
        scenarios.push(
            Scenario::new(
                format!("small_input_large_output_{}", tokens),
                format!("Say 'echo' {} times.", count),
                format!("Small input, request {} output tokens", count),
            )
            .with_max_tokens(tokens),
        );
    }

    scenarios
}

// 20000 -> "20,000"
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
