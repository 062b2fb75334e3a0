// ==========================================
// 门店物料分配系统 - 参考数据索引
// ==========================================
// 职责: product_code → 观测列表（门店, 损耗, 营收）
// 约束: 不合并、不去重；同店同产品出现两次则两行都是候选
// ==========================================

use crate::domain::reference::ReferenceObservation;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ReferenceIndex - 按产品分组的只读索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_product: HashMap<String, Vec<ReferenceObservation>>,
    observation_count: usize,
}

impl ReferenceIndex {
    /// 构建索引（O(n)）
    ///
    /// 产品代码按去除首尾空白后的值分组；组内保持输入顺序，
    /// 排名阶段的稳定排序依赖这个顺序作为最终次序键。
    pub fn build<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = ReferenceObservation>,
    {
        let mut by_product: HashMap<String, Vec<ReferenceObservation>> = HashMap::new();
        let mut observation_count = 0;

        for observation in observations {
            let key = observation.product_code.trim().to_string();
            by_product.entry(key).or_default().push(observation);
            observation_count += 1;
        }

        debug!(
            products = by_product.len(),
            observations = observation_count,
            "参考数据索引构建完成"
        );

        Self {
            by_product,
            observation_count,
        }
    }

    /// 查询候选观测；产品不存在时返回空切片
    pub fn get(&self, product_code: &str) -> &[ReferenceObservation] {
        self.by_product
            .get(product_code.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, product_code: &str) -> bool {
        self.by_product.contains_key(product_code.trim())
    }

    /// 不同产品代码数量
    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// 观测总行数（含重复行）
    pub fn observation_count(&self) -> usize {
        self.observation_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(store: &str, product: &str, loss: f64, revenue: f64) -> ReferenceObservation {
        ReferenceObservation::new(store, product, loss, revenue)
    }

    #[test]
    fn test_build_groups_by_product() {
        let index = ReferenceIndex::build(vec![
            obs("S1", "A", 1.0, 10.0),
            obs("S2", "B", 2.0, 20.0),
            obs("S3", "A", 3.0, 30.0),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.observation_count(), 3);

        let a = index.get("A");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].store_code, "S1");
        assert_eq!(a[1].store_code, "S3");
    }

    #[test]
    fn test_missing_product_returns_empty() {
        let index = ReferenceIndex::build(vec![obs("S1", "A", 1.0, 10.0)]);
        assert!(index.get("Z").is_empty());
        assert!(!index.contains("Z"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let index = ReferenceIndex::build(vec![
            obs("S1", "A", 1.0, 10.0),
            obs("S1", "A", 1.0, 10.0),
        ]);
        assert_eq!(index.get("A").len(), 2);
    }

    #[test]
    fn test_codes_are_trimmed() {
        let index = ReferenceIndex::build(vec![obs("S1", " 123 ", 1.0, 10.0)]);
        assert_eq!(index.get("123").len(), 1);
        assert_eq!(index.get("123 ").len(), 1);
    }

    #[test]
    fn test_empty_index() {
        let index = ReferenceIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.observation_count(), 0);
    }
}
