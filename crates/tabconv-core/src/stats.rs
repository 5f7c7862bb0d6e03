//! Reductions used for statistic-based defaults.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the two middle values for even-sized input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Some(sorted[middle])
    }
}

/// Most frequent value; ties resolve to the smallest.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut index = 0;
    while index < sorted.len() {
        let current = sorted[index];
        let run = sorted[index..]
            .iter()
            .take_while(|value| value.total_cmp(&current).is_eq())
            .count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((current, run));
        }
        index += run;
    }
    best.map(|(value, _)| value)
}
