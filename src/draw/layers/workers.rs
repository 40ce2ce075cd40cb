//! Worker fan-out
//!
//! A fixed pool of scoped threads claims work items through one shared
//! atomic counter. Leaving the scope joins every worker, so callers see all
//! results as soon as `fan_out` returns.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `work(index, item)` for every item on up to `workers` threads.
/// Blocks until all items are done.
pub fn fan_out<T, F>(items: &[T], workers: usize, work: F)
where
    T: Sync,
    F: Fn(usize, &T) + Sync,
{
    if items.is_empty() {
        return;
    }
    let workers = workers.clamp(1, items.len());
    if workers == 1 {
        for (i, item) in items.iter().enumerate() {
            work(i, item);
        }
        return;
    }

    let next = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= items.len() {
                    break;
                }
                work(i, &items[i]);
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_every_item_once() {
        let items: Vec<usize> = (0..257).collect();
        let seen = Mutex::new(vec![0u32; items.len()]);
        fan_out(&items, 4, |i, item| {
            assert_eq!(i, *item);
            seen.lock().unwrap()[i] += 1;
        });
        assert!(seen.into_inner().unwrap().iter().all(|&n| n == 1));
    }

    #[test]
    fn test_empty_and_single_worker() {
        let empty: Vec<u8> = Vec::new();
        fan_out(&empty, 8, |_, _| panic!("no work expected"));
        let total = AtomicUsize::new(0);
        fan_out(&[1usize, 2, 3], 1, |_, v| {
            total.fetch_add(*v, Ordering::Relaxed);
        });
        assert_eq!(total.into_inner(), 6);
    }
}
