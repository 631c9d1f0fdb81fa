use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// # Summary
/// ETL 阶段，用于错误归类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Extraction,
    Transformation,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extraction => write!(f, "extraction"),
            Stage::Transformation => write!(f, "transformation"),
            Stage::Load => write!(f, "load"),
        }
    }
}

/// # Summary
/// 单个信号的处理状态机。信号之间不共享状态。
///
/// # Invariants
/// - 只能按 `Pending → Extracting → Transforming → Loading` 前进，
///   任一非终态均可直接进入 `Failed`。
/// - `Succeeded`、`PartiallyLoaded`、`Failed` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Pending,
    Extracting,
    Transforming,
    Loading,
    Succeeded,
    PartiallyLoaded,
    Failed,
}

impl SignalState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SignalState::Succeeded | SignalState::PartiallyLoaded | SignalState::Failed
        )
    }

    /// # Summary
    /// 当前状态所处的 ETL 阶段，用于把意外故障归入正确的错误类别。
    ///
    /// # Returns
    /// `Pending` 归入抽取阶段；终态返回 None。
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SignalState::Pending | SignalState::Extracting => Some(Stage::Extraction),
            SignalState::Transforming => Some(Stage::Transformation),
            SignalState::Loading => Some(Stage::Load),
            _ => None,
        }
    }

    /// # Summary
    /// 校验状态迁移是否合法。
    pub fn can_transition_to(&self, next: SignalState) -> bool {
        use SignalState::*;
        match (self, next) {
            (Pending, Extracting)
            | (Extracting, Transforming)
            | (Transforming, Loading)
            | (Loading, Succeeded)
            | (Loading, PartiallyLoaded) => true,
            (s, Failed) => !s.is_terminal(),
            _ => false,
        }
    }
}

/// # Summary
/// 信号的终态结果。
///
/// # Invariants
/// - `PartiallyLoaded` 与 `Succeeded` 严格区分：只要有一个加载器未成功，就不是成功。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalStatus {
    // 所有加载器均成功
    Succeeded,
    // 已完成抽取与转换，但部分加载器失败
    PartiallyLoaded { failed_loaders: Vec<String> },
    // 在某个阶段失败
    Failed { stage: Stage, error: String },
}

/// 单个信号的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub signal_name: String,
    pub status: SignalStatus,
}

impl SignalOutcome {
    /// 是否完全成功
    pub fn is_success(&self) -> bool {
        self.status == SignalStatus::Succeeded
    }
}

/// # Summary
/// 一次 `run()` 的汇总报告。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    // 运行唯一标识
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    // 按配置顺序排列
    pub outcomes: Vec<SignalOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, SignalStatus::Succeeded))
    }

    pub fn partial(&self) -> usize {
        self.count(|s| matches!(s, SignalStatus::PartiallyLoaded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SignalStatus::Failed { .. }))
    }

    /// 按名称查找结果
    pub fn outcome(&self, signal_name: &str) -> Option<&SignalOutcome> {
        self.outcomes.iter().find(|o| o.signal_name == signal_name)
    }

    fn count(&self, pred: impl Fn(&SignalStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
