// ==========================================
// 门店物料分配系统 - 门店容量跟踪
// ==========================================
// 红线: 任何非兜底门店的分配数不得超过 cap
// 约束: 调用方必须先 can_accept 再 record（顺序是契约，不做阻塞）
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// CapacityTracker - 单次运行内的门店分配计数
// ==========================================
#[derive(Debug, Clone)]
pub struct CapacityTracker {
    cap: u32,
    counts: HashMap<String, u32>,
}

impl CapacityTracker {
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            counts: HashMap::new(),
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// 当前计数 < cap 时返回 true
    pub fn can_accept(&self, store_code: &str) -> bool {
        self.count(store_code) < self.cap
    }

    /// 记录一次分配，返回记录后的计数
    pub fn record(&mut self, store_code: &str) -> EngineResult<u32> {
        if !self.can_accept(store_code) {
            return Err(EngineError::CapacityExceeded {
                store_code: store_code.to_string(),
                cap: self.cap,
            });
        }

        let count = self.counts.entry(store_code.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    pub fn count(&self, store_code: &str) -> u32 {
        self.counts.get(store_code).copied().unwrap_or(0)
    }

    /// 计数快照（按门店代码排序，便于稳定输出）
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.counts
            .iter()
            .map(|(store, count)| (store.clone(), *count))
            .collect()
    }

    /// 已记录的分配总数
    pub fn total_assigned(&self) -> u32 {
        self.counts.values().sum()
    }

    /// 运行开始时清零
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_until_cap() {
        let mut tracker = CapacityTracker::new(3);
        for expected in 1..=3 {
            assert!(tracker.can_accept("S1"));
            assert_eq!(tracker.record("S1").unwrap(), expected);
        }
        assert!(!tracker.can_accept("S1"));
        assert!(tracker.can_accept("S2"));
    }

    #[test]
    fn test_record_over_cap_fails() {
        let mut tracker = CapacityTracker::new(1);
        tracker.record("S1").unwrap();

        let err = tracker.record("S1").unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                store_code: "S1".to_string(),
                cap: 1
            }
        );
        // 失败的 record 不改变计数
        assert_eq!(tracker.count("S1"), 1);
    }

    #[test]
    fn test_zero_cap_accepts_nothing() {
        let mut tracker = CapacityTracker::new(0);
        assert!(!tracker.can_accept("S1"));
        assert!(tracker.record("S1").is_err());
    }

    #[test]
    fn test_reset_and_snapshot() {
        let mut tracker = CapacityTracker::new(3);
        tracker.record("B").unwrap();
        tracker.record("A").unwrap();
        tracker.record("B").unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(snapshot["B"], 2);
        assert_eq!(tracker.total_assigned(), 3);

        tracker.reset();
        assert_eq!(tracker.count("B"), 0);
        assert!(tracker.snapshot().is_empty());
    }
}
