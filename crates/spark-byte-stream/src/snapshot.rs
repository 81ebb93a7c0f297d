/// 字节流记账字段在某一时刻的只读快照。
///
/// # 意图（Why）
/// - 外部流控或监控逻辑往往需要同时读取多个字段（例如“已推送”与“已缓冲”），
///   逐个查询会各自加锁，读到的组合可能跨越一次写入；快照在同一临界区内采样，保证字段彼此自洽。
///
/// # 契约（What）
/// - `buffered <= capacity`；
/// - `pushed - popped == buffered`；
/// - 快照仅是副本，不随后续操作更新。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamSnapshot {
    /// 构造时固定的容量上限。
    pub capacity: u64,
    /// 已推送但尚未被弹出的字节数。
    pub buffered: u64,
    /// 累计推送的字节数。
    pub pushed: u64,
    /// 累计弹出的字节数。
    pub popped: u64,
    /// 写端是否已关闭。
    pub closed: bool,
    /// 是否已进入不可恢复错误态。
    pub errored: bool,
}

impl StreamSnapshot {
    /// 剩余可写容量。
    pub fn available_capacity(&self) -> u64 {
        self.capacity.saturating_sub(self.buffered)
    }

    /// 是否已关闭且全部排空。
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffered == 0
    }
}
