// Filter and sort over the in-memory collection
//
// Everything here borrows; the collection owned by the controller is never
// reordered or mutated.
use crate::models::{RepositoryRecord, SortMode};
use std::cmp::{Ordering, Reverse};

/// Records whose name or description contains `query`, ignoring case.
///
/// The query is trimmed first; a blank query keeps every record in its
/// original order.
pub fn filter<'a>(collection: &'a [RepositoryRecord], query: &str) -> Vec<&'a RepositoryRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return collection.iter().collect();
    }

    collection
        .iter()
        .filter(|repo| {
            repo.name.to_lowercase().contains(&needle)
                || repo.description_text().to_lowercase().contains(&needle)
        })
        .collect()
}

/// A sorted copy of `subset`. Equal keys keep their incoming order.
pub fn sort<'a>(subset: &[&'a RepositoryRecord], mode: SortMode) -> Vec<&'a RepositoryRecord> {
    let mut sorted = subset.to_vec();

    match mode {
        SortMode::AlphabeticalAscending => {
            sorted.sort_by(|a, b| locale_cmp(&a.name, &b.name));
        }
        SortMode::CreatedDescending => {
            // None < Some, so under Reverse the unparseable ones land last
            sorted.sort_by_key(|repo| Reverse(repo.created()));
        }
    }

    sorted
}

/// Filter, then sort
pub fn arrange<'a>(
    collection: &'a [RepositoryRecord],
    query: &str,
    mode: SortMode,
) -> Vec<&'a RepositoryRecord> {
    sort(&filter(collection, query), mode)
}

/// Dictionary-style comparison: letters compare without regard to case, and
/// only when two names differ by case alone does lowercase come first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a.to_lowercase().cmp(&b.to_lowercase());
    if primary != Ordering::Equal {
        return primary;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            return match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => ca.cmp(&cb),
            };
        }
    }

    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, description: Option<&str>, created: Option<&str>) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            description: description.map(str::to_string),
            homepage: None,
            html_url: format!("https://github.com/owner/{}", name),
            has_pages: true,
            language: None,
            stargazers_count: 0,
            created_at: created.map(str::to_string),
            updated_at: None,
        }
    }

    fn names(repos: &[&RepositoryRecord]) -> Vec<String> {
        repos.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_blank_query_keeps_everything() {
        let repos = vec![repo("b", None, None), repo("a", None, None)];
        assert_eq!(names(&filter(&repos, "")), vec!["b", "a"]);
        assert_eq!(names(&filter(&repos, "   ")), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_matches_name_or_description() {
        let repos = vec![
            repo("Portfolio", None, None),
            repo("game", Some("A tiny PORTfolio of games"), None),
            repo("notes", Some("scratchpad"), None),
        ];

        assert_eq!(names(&filter(&repos, "port")), vec!["Portfolio", "game"]);
        assert_eq!(names(&filter(&repos, "  PAD ")), vec!["notes"]);
        assert!(filter(&repos, "zz").is_empty());
    }

    #[test]
    fn test_alphabetical_ignores_case() {
        let repos = vec![
            repo("beta", None, None),
            repo("Alpha", None, None),
            repo("", None, None),
            repo("alpha", None, None),
        ];
        let all = filter(&repos, "");
        assert_eq!(
            names(&sort(&all, SortMode::AlphabeticalAscending)),
            vec!["", "alpha", "Alpha", "beta"]
        );
    }

    #[test]
    fn test_created_descending_puts_bad_dates_last() {
        let repos = vec![
            repo("old", None, Some("2020-05-01T00:00:00Z")),
            repo("broken", None, Some("yesterday-ish")),
            repo("new", None, Some("2024-01-01T00:00:00Z")),
            repo("missing", None, None),
        ];
        let all = filter(&repos, "");
        assert_eq!(
            names(&sort(&all, SortMode::CreatedDescending)),
            vec!["new", "old", "broken", "missing"]
        );
    }

    #[test]
    fn test_sort_leaves_input_alone() {
        let repos = vec![repo("b", None, None), repo("a", None, None)];
        let all = filter(&repos, "");
        let _ = sort(&all, SortMode::AlphabeticalAscending);
        assert_eq!(names(&all), vec!["b", "a"]);
    }

    #[test]
    fn test_arrange_is_idempotent() {
        let repos = vec![
            repo("same", None, Some("2023-01-01")),
            repo("Same", None, Some("2023-01-01")),
            repo("other", Some("same-ish"), Some("2021-01-01")),
        ];

        for mode in [SortMode::CreatedDescending, SortMode::AlphabeticalAscending] {
            let first = names(&arrange(&repos, "same", mode));
            let second = names(&arrange(&repos, "same", mode));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("Alpha", "beta"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("abc", "abc"), Ordering::Equal);
        assert_eq!(locale_cmp("", "a"), Ordering::Less);
    }
}
