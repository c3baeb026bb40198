//! Summary statistics for a generation run.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use threadkit_core::{mm_to_whole_meters, Edge};

/// Totals reported alongside a generated piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStats {
    /// Number of thread segments
    pub total_lines: usize,
    /// Thread needed, floored to whole meters
    pub thread_length_m: u64,
    /// Wall-clock time of the run
    pub total_time: Duration,
}

pub struct StatsCalculator;

impl StatsCalculator {
    pub fn calculate(paths: &[Edge], thread_length_mm: f64, elapsed: Duration) -> OutputStats {
        OutputStats {
            total_lines: paths.len(),
            thread_length_m: mm_to_whole_meters(thread_length_mm),
            total_time: elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate() {
        let paths = vec![Edge::new(0, 10), Edge::new(10, 3)];
        let stats = StatsCalculator::calculate(&paths, 2_999.9, Duration::from_millis(1500));
        assert_eq!(stats.total_lines, 2);
        assert_eq!(stats.thread_length_m, 2);
        assert_eq!(stats.total_time, Duration::from_millis(1500));
    }

    #[test]
    fn test_empty_run() {
        let stats = StatsCalculator::calculate(&[], 0.0, Duration::ZERO);
        assert_eq!(stats.total_lines, 0);
        assert_eq!(stats.thread_length_m, 0);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = StatsCalculator::calculate(&[Edge::new(1, 2)], 1000.0, Duration::from_secs(3));
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["total_lines"], 1);
        assert_eq!(json["thread_length_m"], 1);
        assert_eq!(json["total_time"]["secs"], 3);
    }
}
