//! Conventional commit parsing and classification.

use std::collections::BTreeMap;

use regex_lite::Regex;

/// Body tokens that mark a breaking change.
pub const BREAKING_MARKERS: [&str; 2] = ["BREAKING CHANGE", "BREAKING-CHANGE"];

/// A commit message that matched the conventional commit grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub commit_type: String,
    /// Scope including its parentheses, e.g. `"(auth)"`, or empty.
    pub scope: String,
    pub header: String,
    pub body: String,
    pub breaking: bool,
    /// Group label for `commit_type`, empty when the label table has none.
    pub group: String,
}

/// Header grammar compiled once from a type vocabulary.
#[derive(Debug, Clone)]
pub struct CommitGrammar {
    pattern: Option<Regex>,
}

impl CommitGrammar {
    /// Build the grammar `^<type>(\(<scope>\))?(!)?: <header>$` for the given types.
    ///
    /// An empty vocabulary produces a grammar that matches nothing.
    pub fn new<I, S>(vocabulary: I) -> Result<Self, regex_lite::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = vocabulary
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(Self { pattern: None });
        }

        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();

        let alternatives: Vec<String> = tokens.iter().map(|t| regex_lite::escape(t)).collect();
        let pattern = format!(r"^({})(\([^()]+\))?(!)?: (.*)$", alternatives.join("|"));

        Ok(Self {
            pattern: Some(Regex::new(&pattern)?),
        })
    }

    /// Parse a raw commit message. The group is left empty.
    ///
    /// Only the first line is matched; everything after the first newline is
    /// the body.
    pub fn parse(&self, message: &str) -> Option<ParsedCommit> {
        let pattern = self.pattern.as_ref()?;

        let (first_line, body) = message.split_once('\n').unwrap_or((message, ""));
        let first_line = first_line.strip_suffix('\r').unwrap_or(first_line);

        let caps = pattern.captures(first_line)?;
        let commit_type = caps.get(1)?.as_str().to_string();
        let scope = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        let breaking_mark = caps.get(3).is_some();
        let header = caps
            .get(4)
            .map(|m| m.as_str().trim_end_matches(['\r', '\n']).to_string())
            .unwrap_or_default();

        let breaking_in_body = BREAKING_MARKERS.iter().any(|marker| body.contains(marker));

        Some(ParsedCommit {
            commit_type,
            scope,
            header,
            body: body.to_string(),
            breaking: breaking_mark || breaking_in_body,
            group: String::new(),
        })
    }

    /// Parse a message and map its type through a label table.
    pub fn classify(&self, message: &str, labels: &BTreeMap<String, String>) -> Option<ParsedCommit> {
        let mut parsed = self.parse(message)?;
        parsed.group = labels.get(&parsed.commit_type).cloned().unwrap_or_default();
        Some(parsed)
    }
}

/// Classifier holding a label table and the grammar built from its keys.
#[derive(Debug, Clone)]
pub struct CommitClassifier {
    grammar: CommitGrammar,
    labels: BTreeMap<String, String>,
}

impl CommitClassifier {
    /// The vocabulary is the key set of `labels`.
    pub fn new(labels: BTreeMap<String, String>) -> Result<Self, regex_lite::Error> {
        let grammar = CommitGrammar::new(labels.keys())?;
        Ok(Self { grammar, labels })
    }

    /// Classify a message, returning `None` for non-conforming messages.
    ///
    /// Messages whose type maps to an empty label are non-conforming too.
    pub fn classify(&self, message: &str) -> Option<ParsedCommit> {
        self.grammar
            .classify(message, &self.labels)
            .filter(|parsed| !parsed.group.is_empty())
    }
}
