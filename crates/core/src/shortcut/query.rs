//! Search query construction
//!
//! Shortcut's search endpoints take a single free-text expression made of
//! `key:value` clauses. This module turns a base query plus structured filters
//! into that expression.

/// Query matching every record
pub const WILDCARD: &str = "*";

/// Structured search filters understood by the Shortcut search syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Project,
    Owner,
    State,
    Type,
    Label,
    Epic,
    Iteration,
    Team,
}

impl Filter {
    /// Search operator for this filter
    pub fn key(self) -> &'static str {
        match self {
            Filter::Project => "project",
            Filter::Owner => "owner",
            Filter::State => "state",
            Filter::Type => "type",
            Filter::Label => "label",
            Filter::Epic => "epic",
            Filter::Iteration => "iteration",
            Filter::Team => "group",
        }
    }

    /// Free-text names are quoted; handles, types and ids are not.
    fn quoted(self) -> bool {
        matches!(
            self,
            Filter::Project | Filter::State | Filter::Label | Filter::Epic | Filter::Team
        )
    }

    /// Render a single `key:value` clause
    pub fn clause(self, value: &str) -> String {
        let already_quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
        if self.quoted() && !already_quoted {
            format!("{}:\"{}\"", self.key(), value)
        } else {
            format!("{}:{}", self.key(), value)
        }
    }
}

/// Build a search expression from free text and ordered filters
///
/// Clauses appear in the order the filters were supplied. `None` or blank
/// values are skipped. When nothing remains, the wildcard is returned.
///
/// # Arguments
/// * `text` - Free-text part of the query, placed first
/// * `filters` - Ordered `(filter, value)` pairs
///
/// # Returns
/// * `String` - The space-joined query, or [`WILDCARD`]
pub fn build_query(text: Option<&str>, filters: &[(Filter, Option<String>)]) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        clauses.push(text.to_string());
    }

    for (filter, value) in filters {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            clauses.push(filter.clause(value));
        }
    }

    if clauses.is_empty() {
        WILDCARD.to_string()
    } else {
        clauses.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_build_query_text_and_type() {
        let query = build_query(Some("auth"), &[(Filter::Type, some("bug"))]);
        assert_eq!(query, "auth type:bug");
    }

    #[test]
    fn test_build_query_empty_is_wildcard() {
        assert_eq!(build_query(Some(""), &[]), "*");
        assert_eq!(build_query(None, &[]), "*");
    }

    #[test]
    fn test_build_query_all_filters_unset_is_wildcard() {
        let filters = vec![
            (Filter::Project, None),
            (Filter::Owner, some("")),
            (Filter::State, some("   ")),
        ];
        assert_eq!(build_query(None, &filters), WILDCARD);
    }

    #[test]
    fn test_build_query_preserves_filter_order() {
        let filters = vec![
            (Filter::Iteration, some("42")),
            (Filter::Owner, some("sarah")),
            (Filter::Label, some("urgent")),
        ];
        assert_eq!(
            build_query(None, &filters),
            "iteration:42 owner:sarah label:\"urgent\""
        );

        let reversed: Vec<_> = filters.into_iter().rev().collect();
        assert_eq!(
            build_query(None, &reversed),
            "label:\"urgent\" owner:sarah iteration:42"
        );
    }

    #[test]
    fn test_build_query_quotes_free_text_names() {
        let filters = vec![
            (Filter::Project, some("API Backend")),
            (Filter::Owner, some("alex")),
            (Filter::State, some("In Progress")),
            (Filter::Type, some("feature")),
            (Filter::Label, some("tech debt")),
            (Filter::Epic, some("Auth Epic")),
            (Filter::Iteration, some("20")),
            (Filter::Team, some("Backend")),
        ];

        assert_eq!(
            build_query(Some("login"), &filters),
            "login project:\"API Backend\" owner:alex state:\"In Progress\" type:feature \
             label:\"tech debt\" epic:\"Auth Epic\" iteration:20 group:\"Backend\""
        );
    }

    #[test]
    fn test_build_query_skips_unset_filters_between_set_ones() {
        let filters = vec![
            (Filter::Owner, some("sarah")),
            (Filter::State, None),
            (Filter::Type, some("chore")),
        ];
        assert_eq!(build_query(None, &filters), "owner:sarah type:chore");
    }

    #[test]
    fn test_clause_does_not_double_quote() {
        assert_eq!(Filter::State.clause("\"Done\""), "state:\"Done\"");
    }

    #[test]
    fn test_team_filter_uses_group_operator() {
        assert_eq!(Filter::Team.key(), "group");
    }
}
