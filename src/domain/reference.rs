// ==========================================
// 门店物料分配系统 - 参考数据领域模型
// ==========================================
// 来源: 门店 × 产品 的历史损耗/营收表（每次运行加载一次，只读）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ReferenceObservation - 门店产品表现观测
// ==========================================
// 同一 product_code 可对应多家门店（每店一行），允许重复行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObservation {
    pub store_code: String,   // 门店代码
    pub product_code: String, // 产品代码（与物料 code 关联）
    pub loss: f64,            // 损耗（越低越好）
    pub gross_revenue: f64,   // 毛营收（同损耗时越高越好）
}

impl ReferenceObservation {
    pub fn new(
        store_code: impl Into<String>,
        product_code: impl Into<String>,
        loss: f64,
        gross_revenue: f64,
    ) -> Self {
        Self {
            store_code: store_code.into(),
            product_code: product_code.into(),
            loss,
            gross_revenue,
        }
    }
}
