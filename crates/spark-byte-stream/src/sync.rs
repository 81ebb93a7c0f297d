//! 共享状态的同步原语适配层。
//!
//! 教案级说明：为了让 Loom 在模型检查阶段能够捕获加锁顺序的所有调度交错，
//! 当启用 `loom-model` 且以 `--cfg loom` 编译时切换到 Loom 提供的 `Arc`/`Mutex`；
//! 常规构建沿用 `spin::Mutex`，保持 `no_std + alloc` 可用。

#[cfg(not(all(feature = "loom-model", any(loom, spark_loom))))]
mod imp {
    pub(crate) use alloc::sync::Arc;

    /// 对 `spin::Mutex` 的薄封装，统一 `lock` 的返回形态。
    pub(crate) struct Mutex<T>(spin::Mutex<T>);

    pub(crate) type MutexGuard<'a, T> = spin::MutexGuard<'a, T>;

    impl<T> Mutex<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(spin::Mutex::new(value))
        }

        pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
            self.0.lock()
        }
    }
}

#[cfg(all(feature = "loom-model", any(loom, spark_loom)))]
mod imp {
    pub(crate) use loom::sync::Arc;

    pub(crate) struct Mutex<T>(loom::sync::Mutex<T>);

    pub(crate) type MutexGuard<'a, T> = loom::sync::MutexGuard<'a, T>;

    impl<T> Mutex<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(loom::sync::Mutex::new(value))
        }

        // 持锁方不会在临界区内 panic，中毒时直接沿用内部数据。
        pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
            self.0
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }
}

pub(crate) use imp::{Arc, Mutex};
