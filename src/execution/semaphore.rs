use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A blocking counting semaphore handing out RAII permits.
///
/// Bounds how many tasks run at once on the engine's pool.
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// A held permit; released on drop.
pub struct Permit<'a> {
    sem: &'a Semaphore,
    /// Time spent blocked before the permit was granted.
    pub waited: Duration,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits.max(1)),
            cv: Condvar::new(),
        }
    }

    /// Block until a permit is available.
    pub fn acquire(&self) -> Permit<'_> {
        let start = Instant::now();
        let mut blocked = false;
        let mut available = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        while *available == 0 {
            blocked = true;
            available = self
                .cv
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        Permit {
            sem: self,
            waited: if blocked { start.elapsed() } else { Duration::ZERO },
        }
    }

    fn release(&self) {
        let mut available = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        *available += 1;
        self.cv.notify_one();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.sem.release();
    }
}

#[cfg(test)]
mod tests {
    use super::Semaphore;

    #[test]
    fn permits_return_on_drop() {
        let sem = Semaphore::new(1);
        {
            let p = sem.acquire();
            assert!(p.waited.is_zero());
        }
        let again = sem.acquire();
        assert!(again.waited.is_zero());
    }
}
