// ==========================================
// 门店物料分配系统 - 候选门店排序引擎
// ==========================================
// 职责: 同一产品的候选门店排序
// 输入: 参考数据索引中的观测列表
// 输出: 排序后的新列表（不修改输入）
// ==========================================

use crate::domain::reference::ReferenceObservation;
use serde_json::json;
use std::cmp::Ordering;

// ==========================================
// StoreRanker - 候选门店排序引擎
// ==========================================
pub struct StoreRanker {
    // 无状态引擎,不需要注入依赖
}

impl StoreRanker {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序候选门店
    ///
    /// 排序键:
    /// 1) loss 升序（损耗低优先）
    /// 2) gross_revenue 降序（同损耗时营收高优先）
    /// 3) 原始候选顺序（稳定排序保证，重复运行结果一致）
    ///
    /// NaN 视为最差值，排在所有有效值之后。
    pub fn rank(&self, candidates: &[ReferenceObservation]) -> Vec<ReferenceObservation> {
        let mut ranked = candidates.to_vec();
        // slice::sort_by 是稳定排序
        ranked.sort_by(|a, b| self.compare(a, b));
        ranked
    }

    /// 生成排序说明（JSON，可用于日志/审计）
    pub fn explain(&self, ranked: &[ReferenceObservation]) -> String {
        let stores: Vec<_> = ranked
            .iter()
            .enumerate()
            .map(|(rank, o)| {
                json!({
                    "rank": rank,
                    "store_code": o.store_code,
                    "loss": o.loss,
                    "gross_revenue": o.gross_revenue,
                })
            })
            .collect();

        json!({
            "sort_keys": ["loss ASC", "gross_revenue DESC", "input_order"],
            "stores": stores,
        })
        .to_string()
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &ReferenceObservation, b: &ReferenceObservation) -> Ordering {
        // 1. loss 升序
        match compare_nan_last(a.loss, b.loss, false) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. gross_revenue 降序
        compare_nan_last(a.gross_revenue, b.gross_revenue, true)
    }
}

/// 浮点比较，NaN 永远排在最后
fn compare_nan_last(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for StoreRanker {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn obs(store: &str, loss: f64, revenue: f64) -> ReferenceObservation {
        ReferenceObservation::new(store, "A", loss, revenue)
    }

    fn stores(ranked: &[ReferenceObservation]) -> Vec<&str> {
        ranked.iter().map(|o| o.store_code.as_str()).collect()
    }

    #[test]
    fn test_loss_then_revenue() {
        let ranker = StoreRanker::new();
        let ranked = ranker.rank(&[
            obs("C1", 1.0, 100.0),
            obs("C2", 1.0, 200.0),
            obs("C3", 2.0, 50.0),
        ]);
        assert_eq!(stores(&ranked), vec!["C2", "C1", "C3"]);
    }

    #[test]
    fn test_lower_loss_wins_over_revenue() {
        let ranker = StoreRanker::new();
        let ranked = ranker.rank(&[obs("S1", 5.0, 100.0), obs("S2", 2.0, 50.0)]);
        assert_eq!(stores(&ranked), vec!["S2", "S1"]);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let ranker = StoreRanker::new();
        let input = vec![
            obs("X", 1.0, 10.0),
            obs("Y", 1.0, 10.0),
            obs("Z", 1.0, 10.0),
        ];
        for _ in 0..5 {
            assert_eq!(stores(&ranker.rank(&input)), vec!["X", "Y", "Z"]);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let ranker = StoreRanker::new();
        let input = vec![obs("S1", 9.0, 1.0), obs("S2", 1.0, 1.0)];
        let _ = ranker.rank(&input);
        assert_eq!(stores(&input), vec!["S1", "S2"]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let ranker = StoreRanker::new();
        let ranked = ranker.rank(&[
            obs("NAN_LOSS", f64::NAN, 500.0),
            obs("OK", 3.0, 1.0),
            obs("NAN_REV", 3.0, f64::NAN),
        ]);
        assert_eq!(stores(&ranked), vec!["OK", "NAN_REV", "NAN_LOSS"]);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        let ranker = StoreRanker::new();
        let ranked = ranker.rank(&[obs("A", 0.0, 1.0), obs("B", -0.0, 2.0)]);
        // 损耗相同，营收高者优先
        assert_eq!(stores(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn test_explain_contains_order() {
        let ranker = StoreRanker::new();
        let ranked = ranker.rank(&[obs("S1", 5.0, 100.0), obs("S2", 2.0, 50.0)]);
        let reason = ranker.explain(&ranked);
        let value: serde_json::Value = serde_json::from_str(&reason).unwrap();
        assert_eq!(value["stores"][0]["store_code"], "S2");
        assert_eq!(value["stores"][1]["rank"], 1);
    }
}
