use std::sync::{Arc, Mutex, PoisonError};

/// 擷取階段的編號資料夾輪替狀態
///
/// 累計成功數超過目前門檻時換到下一個資料夾，門檻再往上加一個上限值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRollover {
    limit: usize,
    threshold: usize,
    placed: usize,
    index: usize,
}

impl DirectoryRollover {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            threshold: limit,
            placed: 0,
            index: 0,
        }
    }

    /// 放入一個檔案，回傳它所屬的資料夾編號
    pub fn place(&mut self) -> usize {
        self.placed += 1;
        if self.placed > self.threshold {
            self.index += 1;
            self.threshold += self.limit;
        }
        self.index
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    #[must_use]
    pub const fn placed(&self) -> usize {
        self.placed
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// 所有工作共用的輪替狀態，每次放置都在鎖內完成
#[derive(Debug, Clone)]
pub struct SharedRollover(Arc<Mutex<DirectoryRollover>>);

impl SharedRollover {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self(Arc::new(Mutex::new(DirectoryRollover::new(limit))))
    }

    /// 放入一個檔案，回傳放置後的狀態快照
    pub fn place(&self) -> DirectoryRollover {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        state.place();
        *state
    }

    #[must_use]
    pub fn snapshot(&self) -> DirectoryRollover {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rollover_after_limit_exceeded() {
        let mut rollover = DirectoryRollover::new(2);
        let indexes: Vec<usize> = (0..5).map(|_| rollover.place()).collect();

        assert_eq!(indexes, vec![0, 0, 1, 1, 2]);
        assert_eq!(rollover.threshold(), 6);
        assert_eq!(rollover.placed(), 5);
        assert_eq!(rollover.limit(), 2);
    }

    #[test]
    fn test_shared_rollover_is_serialized() {
        let shared = SharedRollover::new(10);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared.place();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = shared.snapshot();
        assert_eq!(state.placed(), 100);
        assert_eq!(state.index(), 9);
        assert_eq!(state.threshold(), 100);
    }
}
