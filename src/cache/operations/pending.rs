//! 进行中请求登记表
//!
//! 同一个去重键在任意时刻最多只有一个进行中的请求。

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::cache::keys::PendingRequestKey;
use crate::cache::models::SharedResponse;

/// 查找或注册的结果
pub enum PendingSlot {
    /// 已有相同请求在进行，复用其结果
    Joined(SharedResponse),
    /// 新注册的请求
    Started(SharedResponse),
}

impl PendingSlot {
    pub fn is_joined(&self) -> bool {
        matches!(self, PendingSlot::Joined(_))
    }

    pub fn into_response(self) -> SharedResponse {
        match self {
            PendingSlot::Joined(response) | PendingSlot::Started(response) => response,
        }
    }
}

#[derive(Default)]
pub struct PendingCallRegistry {
    in_flight: DashMap<PendingRequestKey, SharedResponse>,
}

impl PendingCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子地查找或注册进行中的请求
    ///
    /// 检查与插入在同一个 entry 锁内完成，`start` 只在键空闲时调用，且不能等待。
    pub fn join_or_start<F>(&self, key: PendingRequestKey, start: F) -> PendingSlot
    where
        F: FnOnce() -> SharedResponse,
    {
        match self.in_flight.entry(key) {
            Entry::Occupied(entry) => PendingSlot::Joined(entry.get().clone()),
            Entry::Vacant(entry) => {
                let response = start();
                entry.insert(response.clone());
                PendingSlot::Started(response)
            }
        }
    }

    /// 请求结束后移除
    pub fn complete(&self, key: &PendingRequestKey) {
        self.in_flight.remove(key);
    }

    pub fn contains(&self, key: &PendingRequestKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// 请求结束（包括 panic）时移除登记
pub struct PendingGuard<'a> {
    registry: &'a PendingCallRegistry,
    key: PendingRequestKey,
}

impl<'a> PendingGuard<'a> {
    pub fn new(registry: &'a PendingCallRegistry, key: PendingRequestKey) -> Self {
        Self { registry, key }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.registry.complete(&self.key);
    }
}
