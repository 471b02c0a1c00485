use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct SlotState {
    busy: Vec<bool>,
    completed: usize,
    peak_busy: usize,
}

/// 固定大小的工作槽位表
///
/// 協調者認領槽位，收集者釋放槽位並累計完成數；兩邊都透過同一把鎖與條件變數同步
#[derive(Debug)]
pub struct SlotTable {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl SlotTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(SlotState {
                busy: vec![false; capacity.max(1)],
                completed: 0,
                peak_busy: 0,
            }),
            changed: Condvar::new(),
        }
    }

    // 槽位表只有布林值與計數，持鎖的執行緒崩潰也不會留下不一致的狀態
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 阻塞直到有空槽位，認領編號最小的那一個
    ///
    /// 收到中斷信號時回傳 `None`，不再派出新工作
    pub fn claim(&self, shutdown_signal: &AtomicBool) -> Option<usize> {
        let mut state = self.lock();
        loop {
            if shutdown_signal.load(Ordering::SeqCst) {
                return None;
            }

            if let Some(slot) = state.busy.iter().position(|busy| !busy) {
                state.busy[slot] = true;
                let busy_now = state.busy.iter().filter(|busy| **busy).count();
                state.peak_busy = state.peak_busy.max(busy_now);
                return Some(slot);
            }

            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn release(&self, slot: usize) {
        let mut state = self.lock();
        if let Some(busy) = state.busy.get_mut(slot) {
            *busy = false;
        }
        self.changed.notify_all();
    }

    pub fn mark_completed(&self) {
        let mut state = self.lock();
        state.completed += 1;
        self.changed.notify_all();
    }

    /// 阻塞直到完成數達到 `target`
    pub fn wait_for_completion(&self, target: usize) {
        let mut state = self.lock();
        while state.completed < target {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.lock().busy.len()
    }

    #[cfg(test)]
    fn busy_count(&self) -> usize {
        self.lock().busy.iter().filter(|busy| **busy).count()
    }

    #[cfg(test)]
    fn completed(&self) -> usize {
        self.lock().completed
    }

    /// 執行期間同時忙碌槽位數的最大值
    #[must_use]
    pub fn peak_busy(&self) -> usize {
        self.lock().peak_busy
    }
}
