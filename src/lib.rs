//! # fuxi-algo - 间隔复习调度算法库
//!
//! 本 crate 提供纯 Rust 实现的间隔复习 (spaced repetition) 核心算法:
//!
//! - **Interval Table** - 复习阶段到基础等待间隔的映射 (超出上限钳制)
//! - **Scheduler** - 复习后的下次到期时间计算与到期判定
//! - **Ranker** - 全量词表的优先级打分与稳定排序
//! - **Stats** - 掌握/学习中/待复习/新词四态聚合统计
//!
//! ## 设计理念
//!
//! 本 crate 的设计目标:
//! - **显式时钟** - `now` 始终是参数, 算法内部不读系统时钟
//! - **可复现** - 抖动随机源可注入种子, 测试能精确断言调度边界
//! - **无全局状态** - 多个学习者/词库并发复用同一套逻辑互不干扰
//! - **边界清洗** - 外部数据在 ingestion 边界校验, 核心假定输入合法
//!
//! ## 模块结构
//!
//! - [`types`] - 公共类型 (进度记录、四态、统计)
//! - [`intervals`] - 间隔表 (阶段 → 小时, 含单调性校验)
//! - [`scheduler`] - 调度器 (下次到期时间、到期判定、状态划分)
//! - [`ranker`] - 优先级打分与排序
//! - [`stats`] - 聚合统计
//! - [`sanitize`] - 数据清洗 (历史 JSON 负载的校验与转换)
//! - [`store`] - 参考进度存储 (生命周期操作、乐观版本、快照)
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::Utc;
//! use fuxi_algo::{rank_catalog, ProgressStore, RankWeights, Scheduler};
//!
//! let mut store = ProgressStore::new();
//! let mut scheduler = Scheduler::with_seed(42);
//! let now = Utc::now();
//!
//! // 复习一次 "abandon"
//! store.record_review("abandon", true, now, &mut scheduler);
//!
//! // 排序: 未见过的新词排在最前
//! let ids = vec!["abandon".to_string(), "resilient".to_string()];
//! let ranked = rank_catalog(&ids, &store.progress_map(), now, &RankWeights::default());
//! assert_eq!(ranked[0].id, "resilient");
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod types;
pub mod intervals;
pub mod scheduler;
pub mod ranker;
pub mod stats;
pub mod sanitize;
pub mod store;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出间隔表
pub use intervals::{IntervalTable, IntervalTableError, REVIEW_INTERVAL_HOURS};

/// 重新导出调度器
pub use scheduler::{classify_item, is_due, Scheduler, SchedulerOptions, JITTER_MAX, JITTER_MIN};

/// 重新导出优先级排序
pub use ranker::{
    priority_score, rank, rank_catalog, RankWeights, RankedItem, MASTERED_SCORE, NEW_ITEM_SCORE,
    OVERDUE_WEIGHT,
};

/// 重新导出聚合统计
pub use stats::aggregate_stats;

/// 重新导出数据清洗
pub use sanitize::{
    sanitize_record, to_raw, ProgressSnapshot, RawProgressRecord, SanitizeError, SNAPSHOT_VERSION,
};

/// 重新导出进度存储
pub use store::{ProgressStore, StoreError, VersionedRecord};
