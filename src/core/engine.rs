use crate::core::context::ExecutionContext;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 可執行的單一步驟
#[async_trait]
pub trait Step: Send + Sync {
    async fn run(&self, context: &mut ExecutionContext) -> Result<()>;
}

/// 附帶診斷標籤的步驟
pub struct LabeledStep {
    pub label: String,
    pub step: Box<dyn Step>,
}

impl LabeledStep {
    pub fn new<S: Step + 'static>(label: impl Into<String>, step: S) -> Self {
        Self {
            label: label.into(),
            step: Box::new(step),
        }
    }
}

impl std::fmt::Debug for LabeledStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabeledStep").field("label", &self.label).finish()
    }
}

/// 步驟執行紀錄
#[derive(Debug, Clone)]
pub struct StepReport {
    pub label: String,
    pub duration: Duration,
}

/// 依序執行步驟的簡易引擎
///
/// 一次只跑一個步驟，前一步的修改對下一步可見；遇到第一個錯誤即停止並原樣回傳。
#[derive(Debug, Default)]
pub struct StageRunner {
    steps: Vec<LabeledStep>,
}

impl StageRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: LabeledStep) {
        self.steps.push(step);
    }

    pub fn with_steps(mut self, steps: Vec<LabeledStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.label.as_str()).collect()
    }

    /// 執行所有步驟
    pub async fn execute_all(&self, context: &mut ExecutionContext) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for labeled in &self.steps {
            let start_time = Instant::now();
            tracing::info!("▶️ {} [{}]", labeled.label, context.execution_id);

            if let Err(e) = labeled.step.run(context).await {
                tracing::error!("❌ Step failed: {} ({})", labeled.label, e);
                return Err(e);
            }

            let report = StepReport {
                label: labeled.label.clone(),
                duration: start_time.elapsed(),
            };
            tracing::debug!("✅ {} finished in {:?}", report.label, report.duration);
            reports.push(report);
        }

        Ok(reports)
    }

    /// 取得執行摘要
    pub fn get_execution_summary(reports: &[StepReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_duration: Duration = reports.iter().map(|r| r.duration).sum();
        summary.insert("total_steps".to_string(), serde_json::Value::Number(reports.len().into()));
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let labels: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| serde_json::Value::String(r.label.clone()))
            .collect();
        summary.insert("executed_steps".to_string(), serde_json::Value::Array(labels));

        summary
    }
}
