// ==========================================
// 门店物料分配系统 - 单次运行编排器
// ==========================================
// 用途: 串联 索引 → 分配 → 导出 三个阶段
// 红线: 阶段严格顺序执行，单次运行内不可重入
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::material::MaterialRequest;
use crate::domain::reference::ReferenceObservation;
use crate::domain::types::RunPhase;
use crate::engine::allocation::{AllocationEngine, AllocationOutcome};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reference_index::ReferenceIndex;
use crate::exporter::DistributionExporter;
use crate::perf::PerfGuard;
use tracing::info;
use uuid::Uuid;

// ==========================================
// DistributionRun - 单次分配运行
// ==========================================
pub struct DistributionRun {
    run_id: String,
    phase: RunPhase,
    engine: AllocationEngine,
    index: ReferenceIndex,
    outcome: Option<AllocationOutcome>,
}

impl DistributionRun {
    pub fn new(config: &AllocationConfig) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            phase: RunPhase::Indexing,
            engine: AllocationEngine::new(config),
            index: ReferenceIndex::default(),
            outcome: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn outcome(&self) -> Option<&AllocationOutcome> {
        self.outcome.as_ref()
    }

    // ==========================================
    // 阶段操作
    // ==========================================

    /// INDEXING：构建参考数据索引
    pub fn build_index<I>(&mut self, observations: I) -> EngineResult<&ReferenceIndex>
    where
        I: IntoIterator<Item = ReferenceObservation>,
    {
        self.ensure_phase(RunPhase::Indexing)?;
        let _perf = PerfGuard::new("distribution_run.build_index");

        self.index = ReferenceIndex::build(observations);
        self.advance();
        Ok(&self.index)
    }

    /// ALLOCATING：分配整个批次
    pub fn allocate(&mut self, materials: &[MaterialRequest]) -> EngineResult<&AllocationOutcome> {
        self.ensure_phase(RunPhase::Allocating)?;
        let _perf = PerfGuard::new("distribution_run.allocate");

        let outcome = self.engine.allocate(materials, &self.index)?;
        self.advance();
        Ok(self.outcome.insert(outcome))
    }

    /// EXPORTING：序列化分配记录
    pub fn export(&mut self, exporter: &dyn DistributionExporter) -> EngineResult<Vec<u8>> {
        self.ensure_phase(RunPhase::Exporting)?;
        let _perf = PerfGuard::new("distribution_run.export");

        let records = self
            .outcome
            .as_ref()
            .map(|o| o.records.as_slice())
            .unwrap_or(&[]);
        let blob = exporter.export(records)?;

        info!(
            run_id = %self.run_id,
            format = %exporter.format(),
            records = records.len(),
            bytes = blob.len(),
            "分配表导出完成"
        );
        self.advance();
        Ok(blob)
    }

    /// 取出分配结果（任意阶段均可调用；未分配时为 None）
    pub fn into_outcome(self) -> Option<AllocationOutcome> {
        self.outcome
    }

    fn ensure_phase(&self, expected: RunPhase) -> EngineResult<()> {
        if self.phase != expected {
            return Err(EngineError::PhaseViolation {
                current: self.phase,
                expected,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            self.phase = next;
        }
    }
}
