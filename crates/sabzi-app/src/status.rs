use std::fmt::Write;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;

/// Session counters
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub captures: u64,
    pub uploads: u64,
    pub detections: u64,
    pub items_detected: u64,
    pub failures: u64,
    pub last_detection_time: Option<DateTime<Local>>,
}

/// Application status
pub struct AppStatus {
    pub stats: Arc<RwLock<SessionStats>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(SessionStats::default())),
        }
    }

    pub async fn record_capture(&self) {
        self.stats.write().await.captures += 1;
    }

    pub async fn record_upload(&self) {
        self.stats.write().await.uploads += 1;
    }

    pub async fn record_detection(&self, items: usize) {
        let mut stats = self.stats.write().await;
        stats.detections += 1;
        stats.items_detected += items as u64;
        stats.last_detection_time = Some(Local::now());
    }

    pub async fn record_failure(&self) {
        self.stats.write().await.failures += 1;
    }

    pub async fn snapshot(&self) -> SessionStats {
        self.stats.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub fn summary(&self, state: &str, location: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "State:        {state}");
        let _ = writeln!(out, "Location:     {location}");
        let _ = writeln!(out, "Captures:     {}", self.captures);
        let _ = writeln!(out, "Uploads:      {}", self.uploads);
        let _ = writeln!(
            out,
            "Detections:   {} ({} items)",
            self.detections, self.items_detected
        );
        let _ = writeln!(out, "Failures:     {}", self.failures);
        match self.last_detection_time {
            Some(at) => {
                let _ = write!(out, "Last detect:  {}", at.format("%H:%M:%S"));
            }
            None => {
                let _ = write!(out, "Last detect:  never");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_accumulate() {
        let status = AppStatus::new();
        status.record_capture().await;
        status.record_upload().await;
        status.record_detection(3).await;
        status.record_detection(0).await;
        status.record_failure().await;

        let stats = status.snapshot().await;
        assert_eq!(stats.captures, 1);
        assert_eq!(stats.detections, 2);
        assert_eq!(stats.items_detected, 3);
        assert_eq!(stats.failures, 1);
        assert!(stats.last_detection_time.is_some());
    }

    #[test]
    fn summary_without_detections() {
        let summary = SessionStats::default().summary("idle", "Delhi");
        assert!(summary.contains("State:        idle"));
        assert!(summary.ends_with("Last detect:  never"));
    }
}
