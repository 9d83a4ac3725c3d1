//! Priority ordering of extensions within a category.

use std::cmp::Ordering;

use plexus_core::ExtensionDefinition;

use crate::priority::PriorityResolver;

struct PrioritizedEntry<'a> {
    extension: &'a ExtensionDefinition,
    index: usize,
    priority: f64,
}

/// Stable sort by descending priority.
#[derive(Debug, Clone, Default)]
pub struct ExtensionSorter {
    priorities: PriorityResolver,
}

impl ExtensionSorter {
    pub fn new(priorities: PriorityResolver) -> Self {
        Self { priorities }
    }

    pub fn priorities(&self) -> &PriorityResolver {
        &self.priorities
    }

    /// Return `extensions` highest priority first; equal priorities keep
    /// their original relative order. The input is left untouched.
    pub fn sort(&self, extensions: &[ExtensionDefinition]) -> Vec<ExtensionDefinition> {
        self.ranked(extensions)
            .into_iter()
            .map(|(_, extension)| extension.clone())
            .collect()
    }

    /// Same order as [`sort`](Self::sort), paired with each resolved priority.
    pub fn ranked<'a>(&self, extensions: &'a [ExtensionDefinition]) -> Vec<(f64, &'a ExtensionDefinition)> {
        // Priorities are resolved once per element so each bad specifier warns once.
        let mut entries: Vec<PrioritizedEntry<'a>> = extensions
            .iter()
            .enumerate()
            .map(|(index, extension)| PrioritizedEntry {
                extension,
                index,
                priority: self.priorities.resolve(extension),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });

        entries
            .into_iter()
            .map(|entry| (entry.priority, entry.extension))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CapturedLogs;

    fn keyed(key: &str) -> ExtensionDefinition {
        ExtensionDefinition::new("things").with_key(key)
    }

    fn keys(extensions: &[ExtensionDefinition]) -> Vec<&str> {
        extensions.iter().filter_map(|e| e.key.as_deref()).collect()
    }

    fn three_levels() -> PriorityResolver {
        PriorityResolver::new(
            [
                ("high".to_string(), 1000.0),
                ("default".to_string(), 0.0),
                ("low".to_string(), -1000.0),
            ],
            0.0,
        )
    }

    #[test]
    fn sorts_by_descending_symbolic_priority() {
        let sorter = ExtensionSorter::new(three_levels());
        let input = vec![
            keyed("a").with_priority("low"),
            keyed("b"),
            keyed("c").with_priority("high"),
        ];
        let sorted = sorter.sort(&input);
        assert_eq!(keys(&sorted), ["c", "b", "a"]);
        assert_eq!(keys(&input), ["a", "b", "c"]);
    }

    #[test]
    fn equal_priorities_keep_original_order() {
        let sorter = ExtensionSorter::default();
        let input = vec![
            keyed("first"),
            keyed("second").with_priority(5.0),
            keyed("third"),
            keyed("fourth").with_priority(5.0),
            keyed("fifth").with_priority("default"),
        ];
        let sorted = sorter.sort(&input);
        assert_eq!(keys(&sorted), ["second", "fourth", "first", "third", "fifth"]);
    }

    #[test]
    fn sorting_twice_is_identical() {
        let sorter = ExtensionSorter::default();
        let input = vec![
            keyed("x").with_priority(-2.0),
            keyed("y"),
            keyed("z").with_priority("high"),
            keyed("w"),
        ];
        let once = sorter.sort(&input);
        let twice = sorter.sort(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn absent_priority_sorts_like_explicit_default() {
        let sorter = ExtensionSorter::default();
        let implicit = sorter.sort(&[keyed("p").with_priority(1.0), keyed("q"), keyed("r").with_priority(-1.0)]);
        let explicit = sorter.sort(&[
            keyed("p").with_priority(1.0),
            keyed("q").with_priority(0.0),
            keyed("r").with_priority(-1.0),
        ]);
        assert_eq!(keys(&implicit), keys(&explicit));
    }

    #[test]
    fn unrecognized_priority_warns_once_and_sorts_as_default() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let sorter = ExtensionSorter::new(three_levels());
        let input = vec![
            keyed("low").with_priority("low"),
            keyed("odd").with_priority("not-a-real-level"),
            keyed("plain"),
            keyed("high").with_priority("high"),
        ];
        let sorted = sorter.sort(&input);
        assert_eq!(keys(&sorted), ["high", "odd", "plain", "low"]);
        assert_eq!(logs.count("WARN"), 1);
    }

    #[test]
    fn ranked_reports_resolved_priorities() {
        let sorter = ExtensionSorter::default();
        let input = vec![keyed("a").with_priority("low"), keyed("b").with_priority("mandatory")];
        let ranked: Vec<(f64, &str)> = sorter
            .ranked(&input)
            .into_iter()
            .map(|(priority, e)| (priority, e.key.as_deref().unwrap_or_default()))
            .collect();
        assert_eq!(ranked, [(1_000_000.0, "b"), (-1000.0, "a")]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(ExtensionSorter::default().sort(&[]).is_empty());
    }
}
