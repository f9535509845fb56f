//! Identifier Allocator - 겹치지 않는 정수 범위 발급

use std::ops::Range;
use tracing::debug;

/// 단조 증가 워터마크 기반 범위 발급기
///
/// 발급된 범위는 서로 겹치지 않으며, 남은 공간이 부족하면 워터마크를 바꾸지 않고 실패한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRange {
    next: u32,
    max: u32,
}

impl IdentifierRange {
    /// `[start, max)` 범위 발급기
    pub fn new(start: u32, max: u32) -> Self {
        Self {
            next: start,
            max: max.max(start),
        }
    }

    /// `count` 개 연속 ID 발급 (count == 0 이거나 공간 부족이면 None)
    pub fn allocate(&mut self, count: u32) -> Option<Range<u32>> {
        if count == 0 {
            return None;
        }
        let end = self.next.checked_add(count)?;
        if end > self.max {
            debug!(
                "Allocation of {} ids refused ({} remaining)",
                count,
                self.remaining()
            );
            return None;
        }
        let range = self.next..end;
        self.next = end;
        Some(range)
    }

    /// 다음 발급 시작값
    pub fn watermark(&self) -> u32 {
        self.next
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.next
    }
}
