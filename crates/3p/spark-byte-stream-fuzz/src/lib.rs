//! spark-byte-stream-fuzz 公共支持库。
//!
//! # 教案式定位
//! - **Why**：将 fuzz target 使用的操作脚本与影子模型集中到库中，
//!   CI 可以在常规 `cargo test` 中直接重放同一逻辑，无需 libFuzzer 运行时。
//! - **What**：暴露 [`script`] 模块的 [`StreamScript`] 与 [`execute_stream_script`]。
//! - **How**：以 `std` 环境构建，脚本执行时同时驱动真实字节流与影子模型，出现分歧即 panic。

pub mod script;

pub use script::{StreamOp, StreamScript, execute_stream_script};
