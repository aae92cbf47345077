use std::sync::atomic::{AtomicU64, Ordering};

/// 健康检查访问日志的默认采样阈值
pub const STATUS_LOG_THRESHOLD: u64 = 1000;

/// 访问日志采样器
///
/// 计数器超过阈值时归零并放行一次，其余调用只递增计数并抑制日志。
/// 读改写在一次原子操作中完成，可在多个请求间共享。
#[derive(Debug)]
pub struct StatusSampler {
    counter: AtomicU64,
    threshold: u64,
}

impl StatusSampler {
    pub fn new(threshold: u64) -> Self {
        Self {
            counter: AtomicU64::new(0),
            threshold,
        }
    }

    /// 返回本次请求是否应该输出访问日志
    pub fn sample(&self) -> bool {
        let threshold = self.threshold;
        let previous = self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                if n > threshold { Some(0) } else { Some(n + 1) }
            });

        match previous {
            Ok(n) | Err(n) => n > threshold,
        }
    }
}

impl Default for StatusSampler {
    fn default() -> Self {
        Self::new(STATUS_LOG_THRESHOLD)
    }
}
