//! Output label deduplication.

use std::collections::HashMap;

/// Make every label unique by suffixing repeated labels with their
/// occurrence number: `["a", "b", "a"]` becomes `["a_1", "b", "a_2"]`.
///
/// Suffixing can itself create new collisions (`["a", "a", "a_1"]`), so the
/// pass repeats until no label repeats. A single label is never renamed.
pub fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    if labels.len() == 1 {
        return labels;
    }
    let mut labels = labels;
    loop {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for label in &labels {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        if counts.values().all(|&count| count == 1) {
            return labels;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let renamed: Vec<String> = labels
            .iter()
            .map(|label| {
                let occurrence = seen.entry(label.as_str()).or_default();
                *occurrence += 1;
                if counts[label.as_str()] > 1 {
                    format!("{label}_{occurrence}")
                } else {
                    label.clone()
                }
            })
            .collect();
        labels = renamed;
    }
}
