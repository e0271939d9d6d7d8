use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct Slot<T> {
    pending: Option<T>,
    generation: u64,
    task: Option<smol::Task<()>>,
}

/// Collapses bursts of calls into one callback run with the last argument.
///
/// Every [`call`](Debouncer::call) stores its argument and reschedules a
/// timer; the callback only runs once `delay` passes without another call.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    slot: Arc<Mutex<Slot<T>>>,
    callback: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            slot: Arc::new(Mutex::new(Slot {
                pending: None,
                generation: 0,
                task: None,
            })),
            callback: Arc::new(callback),
        }
    }

    pub fn call(&self, arg: T) {
        let mut slot = self.slot.lock();
        slot.pending = Some(arg);
        slot.generation += 1;
        let generation = slot.generation;

        let delay = self.delay;
        let shared = self.slot.clone();
        let callback = self.callback.clone();
        // Dropping the previous task cancels its timer.
        slot.task = Some(smol::spawn(async move {
            smol::Timer::after(delay).await;
            let arg = {
                let mut slot = shared.lock();
                if slot.generation != generation {
                    return;
                }
                slot.pending.take()
            };
            if let Some(arg) = arg {
                callback(arg);
            }
        }));
    }

    /// Drop a scheduled run, if any.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.pending = None;
        slot.generation += 1;
        slot.task = None;
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}
