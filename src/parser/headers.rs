use std::collections::{HashMap, HashSet};

/// Column name given to blank header cells.
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Turn raw header cells into unique column names.
///
/// Blank cells become `__EMPTY`; repeated names get `_1`, `_2`, ... suffixes in
/// order of appearance.
pub fn unique_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for cell in raw {
        let base = match cell.as_ref() {
            name if name.trim().is_empty() => EMPTY_HEADER.to_string(),
            name => name.to_string(),
        };

        let mut candidate = base.clone();
        while used.contains(&candidate) {
            let next = suffixes.entry(base.clone()).or_insert(0);
            *next += 1;
            candidate = format!("{base}_{next}");
        }

        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_headers_pass_through() {
        assert_eq!(unique_headers(["a", "b", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicates_get_numbered() {
        assert_eq!(
            unique_headers(["id", "id", "name", "id"]),
            vec!["id", "id_1", "name", "id_2"]
        );
    }

    #[test]
    fn blank_headers_get_placeholder() {
        assert_eq!(
            unique_headers(["", "x", " "]),
            vec!["__EMPTY", "x", "__EMPTY_1"]
        );
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        assert_eq!(unique_headers(["a_1", "a", "a"]), vec!["a_1", "a", "a_2"]);
    }
}
