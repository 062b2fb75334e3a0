// ==========================================
// 门店物料分配系统 - 分配引擎
// ==========================================
// 职责: 按输入顺序为每条物料选择门店
// 流程: 校验 → 查候选 → 排名 → 首个未满额门店 → 否则兜底门店
// 红线: 引擎内无 I/O；每条物料产出一条记录或一条显式错误
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::distribution::{AllocationDecision, DistributionRecord};
use crate::domain::material::MaterialRequest;
use crate::domain::reference::ReferenceObservation;
use crate::domain::types::SelectionReason;
use crate::engine::capacity_tracker::CapacityTracker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reference_index::ReferenceIndex;
use crate::engine::store_ranker::StoreRanker;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// AllocationFailure - 被拒绝的物料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationFailure {
    pub position: usize,
    pub request: MaterialRequest,
    #[serde(serialize_with = "serialize_error")]
    pub error: EngineError,
}

fn serialize_error<S: Serializer>(error: &EngineError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

// ==========================================
// AllocationOutcome - 单次分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationOutcome {
    pub records: Vec<DistributionRecord>,    // 按输入顺序
    pub decisions: Vec<AllocationDecision>,  // 与 records 一一对应
    pub failures: Vec<AllocationFailure>,    // 被拒绝的物料
    pub store_counts: BTreeMap<String, u32>, // 非兜底门店的分配数
    pub fallback_count: usize,               // 落入兜底门店的物料数
}

impl AllocationOutcome {
    /// 没有被拒绝的物料
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// 已处理物料总数（记录 + 拒绝）
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
pub struct AllocationEngine {
    ranker: StoreRanker,
    tracker: CapacityTracker,
    fallback_store_code: String,
}

impl AllocationEngine {
    pub fn new(config: &AllocationConfig) -> Self {
        Self {
            ranker: StoreRanker::new(),
            tracker: CapacityTracker::new(config.store_cap),
            fallback_store_code: config.fallback_store_code.clone(),
        }
    }

    pub fn fallback_store_code(&self) -> &str {
        &self.fallback_store_code
    }

    pub fn tracker(&self) -> &CapacityTracker {
        &self.tracker
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 分配一个批次
    ///
    /// 每次调用前重置门店计数，同一引擎可重复用于多个批次。
    ///
    /// # 参数
    /// - `materials`: 待分配物料（顺序即分配顺序）
    /// - `index`: 参考数据索引（只读）
    ///
    /// # 返回
    /// AllocationOutcome：`records.len() + failures.len() == materials.len()`
    #[instrument(skip(self, materials, index), fields(
        materials = materials.len(),
        products = index.len(),
        cap = self.tracker.cap()
    ))]
    pub fn allocate(
        &mut self,
        materials: &[MaterialRequest],
        index: &ReferenceIndex,
    ) -> EngineResult<AllocationOutcome> {
        self.tracker.reset();

        let mut records = Vec::with_capacity(materials.len());
        let mut decisions = Vec::with_capacity(materials.len());
        let mut failures = Vec::new();
        let mut fallback_count = 0;

        for (position, material) in materials.iter().enumerate() {
            if let Err(error) = validate(position, material) {
                warn!(position, error = %error, "物料被拒绝");
                failures.push(AllocationFailure {
                    position,
                    request: material.clone(),
                    error,
                });
                continue;
            }

            let candidates = index.get(&material.product_code);
            let ranked = self.ranker.rank(candidates);

            let (store_code, reason) = match self.select(&ranked)? {
                Some((rank, store_code)) => (store_code, SelectionReason::Ranked { rank }),
                None => {
                    fallback_count += 1;
                    let reason = if ranked.is_empty() {
                        SelectionReason::FallbackNoCandidates
                    } else {
                        SelectionReason::FallbackSaturated
                    };
                    warn!(
                        position,
                        product_code = %material.product_code,
                        fallback = %self.fallback_store_code,
                        reason = %reason,
                        "物料落入兜底门店"
                    );
                    (self.fallback_store_code.clone(), reason)
                }
            };

            debug!(
                position,
                product_code = %material.product_code,
                store_code = %store_code,
                reason = %reason,
                ranking = %self.ranker.explain(&ranked),
                "物料已分配"
            );

            decisions.push(AllocationDecision {
                position,
                product_code: material.product_code.clone(),
                store_code: store_code.clone(),
                reason,
                candidate_count: ranked.len(),
            });
            records.push(DistributionRecord {
                store_code,
                product_code: material.product_code.clone(),
                description: material.description.clone(),
                total_quantity: material.quantity,
            });
        }

        info!(
            records = records.len(),
            failures = failures.len(),
            fallback_count,
            stores = self.tracker.snapshot().len(),
            "分配完成"
        );

        Ok(AllocationOutcome {
            records,
            decisions,
            failures,
            store_counts: self.tracker.snapshot(),
            fallback_count,
        })
    }

    /// 在排名列表中取第一个未满额门店并计数
    ///
    /// 返回 (排名, 门店代码)；全部满额或无候选时返回 None
    fn select(
        &mut self,
        ranked: &[ReferenceObservation],
    ) -> EngineResult<Option<(usize, String)>> {
        for (rank, candidate) in ranked.iter().enumerate() {
            if self.tracker.can_accept(&candidate.store_code) {
                self.tracker.record(&candidate.store_code)?;
                return Ok(Some((rank, candidate.store_code.clone())));
            }
        }
        Ok(None)
    }
}

/// 单条物料校验
fn validate(position: usize, material: &MaterialRequest) -> EngineResult<()> {
    let reject = |reason: &str| EngineError::MalformedInput {
        position,
        product_code: material.product_code.clone(),
        reason: reason.to_string(),
    };

    if material.product_code.trim().is_empty() {
        return Err(reject("产品代码为空"));
    }
    if !material.quantity.is_finite() {
        return Err(reject("数量不是有限数值"));
    }
    if material.quantity <= 0.0 {
        return Err(reject("数量必须大于 0"));
    }
    Ok(())
}
