// ==========================================
// 门店物料分配系统 - 物料领域模型
// ==========================================
// 来源: 当日上传的物料清单（每行一条）
// 说明: quantity / description 仅用于展示与审计，不参与排名
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialRequest - 待分配物料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub product_code: String, // 产品代码
    pub description: String,  // 描述
    pub quantity: f64,        // 数量（> 0）
}

impl MaterialRequest {
    pub fn new(product_code: impl Into<String>, description: impl Into<String>, quantity: f64) -> Self {
        Self {
            product_code: product_code.into(),
            description: description.into(),
            quantity,
        }
    }
}

// ==========================================
// StoredMaterial - 已入库的当日物料
// ==========================================
// 对应 material_batch_item 表；position 保持上传顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMaterial {
    pub batch_date: NaiveDate,
    pub position: usize,
    pub request: MaterialRequest,
}
