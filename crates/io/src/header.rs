use std::collections::HashSet;

/// Make header names unique: repeats get `.1`, `.2`, … and blank names
/// become `Unnamed: <index>`.
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.clone()
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        unique_headers(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn unique_names_unchanged() {
        assert_eq!(headers(&["id", "name"]), vec!["id", "name"]);
    }

    #[test]
    fn repeats_are_numbered() {
        assert_eq!(headers(&["id", "id", "id"]), vec!["id", "id.1", "id.2"]);
    }

    #[test]
    fn numbering_skips_taken_names() {
        assert_eq!(headers(&["id", "id.1", "id"]), vec!["id", "id.1", "id.2"]);
    }

    #[test]
    fn blanks_are_unnamed() {
        assert_eq!(headers(&["", "x", " "]), vec!["Unnamed: 0", "x", "Unnamed: 2"]);
    }
}
