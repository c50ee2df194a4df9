//! Field-name driven sample values for plain strings.
//!
//! An ordered table of (predicate, generator) rules evaluated top to bottom.
//! The first rule whose predicate accepts the property name produces the
//! value. The table knows nothing about schema traversal.

use std::fmt;

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type Generator = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Sample address used for `format: email` and email-like field names.
pub const SAMPLE_EMAIL: &str = "john.doe@example.com";

/// A single heuristic.
pub struct HeuristicRule {
    label: &'static str,
    predicate: Predicate,
    generate: Generator,
}

impl HeuristicRule {
    /// Build a rule from arbitrary closures. Both receive the normalized
    /// property name (lowercase, `_`, `-` and spaces removed).
    pub fn new<P, G>(label: &'static str, predicate: P, generate: G) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
        G: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            label,
            predicate: Box::new(predicate),
            generate: Box::new(generate),
        }
    }

    /// Rule that yields `value` when the name contains any of `needles`.
    pub fn contains_any(label: &'static str, needles: &'static [&'static str], value: &'static str) -> Self {
        Self::new(
            label,
            move |name| needles.iter().any(|n| name.contains(n)),
            move |_| value.to_string(),
        )
    }

    /// Rule that yields `value` when the name equals one of `names`.
    pub fn exact(label: &'static str, names: &'static [&'static str], value: &'static str) -> Self {
        Self::new(
            label,
            move |name| names.iter().any(|n| *n == name),
            move |_| value.to_string(),
        )
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Debug for HeuristicRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeuristicRule").field("label", &self.label).finish()
    }
}

/// Ordered rule table.
#[derive(Debug)]
pub struct HeuristicTable {
    rules: Vec<HeuristicRule>,
}

impl HeuristicTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, rule: HeuristicRule) {
        self.rules.push(rule);
    }

    /// Insert a rule ahead of all existing ones.
    pub fn push_front(&mut self, rule: HeuristicRule) {
        self.rules.insert(0, rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sample value for `property_name`, or `None` when no rule applies.
    pub fn lookup(&self, property_name: &str) -> Option<String> {
        let normalized = normalize(property_name);
        if normalized.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(&normalized))
            .map(|rule| (rule.generate)(&normalized))
    }
}

/// The built-in dataset: people, contact details, postal fields.
impl Default for HeuristicTable {
    fn default() -> Self {
        let rules = vec![
            HeuristicRule::contains_any("first-name", &["firstname", "givenname", "forename"], "John"),
            HeuristicRule::contains_any("last-name", &["lastname", "surname", "familyname"], "Doe"),
            HeuristicRule::contains_any("company", &["company", "organization", "organisation", "employer"], "Acme Corporation"),
            HeuristicRule::contains_any("email", &["email"], SAMPLE_EMAIL),
            HeuristicRule::exact(
                "full-name",
                &["name", "fullname", "displayname", "contactname", "customername", "username"],
                "John Doe",
            ),
            HeuristicRule::contains_any("phone", &["phone", "tel", "mobile", "fax"], "(555) 123-4567"),
            HeuristicRule::contains_any("address", &["address", "street"], "123 Main Street"),
            HeuristicRule::contains_any("city", &["city", "town"], "New York"),
            HeuristicRule::contains_any("state", &["state", "province", "region"], "NY"),
            HeuristicRule::contains_any("postal", &["zip", "postal", "postcode"], "10001"),
            HeuristicRule::contains_any("country", &["country"], "USA"),
            HeuristicRule::contains_any("url", &["url", "website", "homepage"], "https://www.example.com"),
            HeuristicRule::contains_any(
                "description",
                &["description", "notes", "comment", "summary"],
                "This is a sample description.",
            ),
            HeuristicRule::exact("status", &["status"], "Active"),
            HeuristicRule::exact("title", &["title", "jobtitle"], "Sample Title"),
        ];
        Self { rules }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
