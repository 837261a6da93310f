use crate::models::ticket::Ticket;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub count: usize,
}

/// Count rows per key, in the order each key is first encountered.
pub fn group_counts<T, K, F>(rows: &[T], key: F) -> Vec<DistributionEntry>
where
    K: AsRef<str>,
    F: Fn(&T) -> K,
{
    let mut out: Vec<DistributionEntry> = Vec::new();
    for row in rows {
        let k = key(row);
        match out.iter_mut().find(|e| e.name == k.as_ref()) {
            Some(entry) => entry.count += 1,
            None => out.push(DistributionEntry {
                name: k.as_ref().to_string(),
                count: 1,
            }),
        }
    }
    out
}

pub fn status_distribution(tickets: &[Ticket]) -> Vec<DistributionEntry> {
    group_counts(tickets, |t| t.status.to_db_str())
}

pub fn category_distribution(tickets: &[Ticket]) -> Vec<DistributionEntry> {
    group_counts(tickets, |t| t.category.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn as_map(entries: Vec<DistributionEntry>) -> HashMap<String, usize> {
        entries.into_iter().map(|e| (e.name, e.count)).collect()
    }

    #[test]
    fn counts_do_not_depend_on_input_order() {
        let a = ["open", "closed", "open"];
        let b = ["closed", "open", "open"];

        let expected: HashMap<String, usize> =
            [("open".to_string(), 2), ("closed".to_string(), 1)].into();

        assert_eq!(as_map(group_counts(&a, |s| *s)), expected);
        assert_eq!(as_map(group_counts(&b, |s| *s)), expected);
    }

    #[test]
    fn first_encountered_key_comes_first() {
        let rows = ["closed", "open", "closed", "on_hold"];
        let names: Vec<String> = group_counts(&rows, |s| *s)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["closed", "open", "on_hold"]);
    }

    #[test]
    fn empty_input_gives_empty_distribution() {
        let rows: [&str; 0] = [];
        assert!(group_counts(&rows, |s| *s).is_empty());
    }
}
