use super::TaskMetrics;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub task: String,
    pub ticks: u64,
    pub errors: u64,
    pub avg_latency_us: u64,
}

/// Registry of per-task metrics, keyed by task name
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: BTreeMap<String, Arc<TaskMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metrics for `task`, creating them on first use
    pub fn register(&mut self, task: &str) -> Arc<TaskMetrics> {
        self.metrics
            .entry(task.to_string())
            .or_insert_with(|| Arc::new(TaskMetrics::new(task)))
            .clone()
    }

    pub fn get(&self, task: &str) -> Option<Arc<TaskMetrics>> {
        self.metrics.get(task).cloned()
    }

    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.metrics
            .values()
            .map(|metrics| TaskSnapshot {
                task: metrics.task().to_string(),
                ticks: metrics.ticks(),
                errors: metrics.errors(),
                avg_latency_us: metrics.avg_latency_us(),
            })
            .collect()
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.snapshot();

        if snapshot.is_empty() {
            return "No tasks registered".to_string();
        }

        let mut report = String::from("=== Pipeline Tasks ===\n");
        for task in snapshot {
            report.push_str(&format!(
                "\n[{}]\n  Ticks: {}\n  Errors: {}\n  Avg Latency: {}μs\n",
                task.task,
                task.ticks,
                match task.errors {
                    0 => "0 errors".to_string(),
                    1 => "1 error".to_string(),
                    n => format!("{} errors", n),
                },
                task.avg_latency_us
            ));
        }

        report
    }
}
