//! Aggregate statistics over run-log records.

use crate::runlog::RunRecord;

/// Statistics for one (model, multimodal, temperature) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Model name.
    pub model: String,
    /// Whether the group ran with image priming.
    pub multimodal: bool,
    /// Sampling temperature.
    pub temperature: f64,
    /// Number of logged queries.
    pub queries: usize,
    /// Queries that ended in success.
    pub successes: usize,
    /// Mean initial-attempt generation time in seconds.
    pub mean_question_time: f64,
    /// Mean number of retries per query.
    pub mean_retries: f64,
    /// Mean retry latency in seconds; `None` if no retries happened.
    pub mean_retry_time: Option<f64>,
    /// Shortest retry latency.
    pub min_retry_time: Option<f64>,
    /// Longest retry latency.
    pub max_retry_time: Option<f64>,
}

impl GroupSummary {
    /// Fraction of queries that succeeded, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        mean(self.successes as f64, self.queries)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Groups `records` and computes per-group statistics.
///
/// Groups are ordered by model, then multimodal, then temperature.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[RunRecord]) -> Vec<GroupSummary> {
    let mut groups: Vec<(String, bool, f64, Vec<&RunRecord>)> = Vec::new();
    for record in records {
        let existing = groups.iter_mut().find(|(model, multimodal, temp, _)| {
            *model == record.model
                && *multimodal == record.multimodal
                && temp.total_cmp(&record.temperature).is_eq()
        });
        match existing {
            Some((_, _, _, members)) => members.push(record),
            None => groups.push((
                record.model.clone(),
                record.multimodal,
                record.temperature,
                vec![record],
            )),
        }
    }

    groups.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    });

    groups
        .into_iter()
        .map(|(model, multimodal, temperature, members)| {
            let queries = members.len();
            let successes = members.iter().filter(|r| r.succeeded).count();
            let question_total: f64 = members.iter().map(|r| r.question_time).sum();
            let retry_times: Vec<f64> = members
                .iter()
                .flat_map(|r| r.retries.iter().map(|e| e.latency))
                .collect();

            GroupSummary {
                model,
                multimodal,
                temperature,
                queries,
                successes,
                mean_question_time: mean(question_total, queries),
                mean_retries: mean(retry_times.len() as f64, queries),
                mean_retry_time: (!retry_times.is_empty())
                    .then(|| mean(retry_times.iter().sum(), retry_times.len())),
                min_retry_time: retry_times.iter().copied().reduce(f64::min),
                max_retry_time: retry_times.iter().copied().reduce(f64::max),
            }
        })
        .collect()
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Renders summaries as a plain-text table.
#[must_use]
pub fn render_table(summaries: &[GroupSummary], skipped: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>5} {:>5} {:>7} {:>7} {:>7} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
        "model", "mm", "temp", "queries", "success", "rate", "q_time", "retries", "ret_avg", "ret_min", "ret_max"
    ));
    for s in summaries {
        out.push_str(&format!(
            "{:<24} {:>5} {:>5.2} {:>7} {:>7} {:>6.1}% {:>8.2} {:>8.2} {:>8} {:>8} {:>8}\n",
            s.model,
            if s.multimodal { "yes" } else { "no" },
            s.temperature,
            s.queries,
            s.successes,
            s.success_rate() * 100.0,
            s.mean_question_time,
            s.mean_retries,
            opt(s.mean_retry_time),
            opt(s.min_retry_time),
            opt(s.max_retry_time),
        ));
    }
    if skipped > 0 {
        out.push_str(&format!("({skipped} malformed line(s) skipped)\n"));
    }
    out
}
