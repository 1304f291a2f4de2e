//! Transfer options, part planning and progress state

use std::sync::atomic::{AtomicU64, Ordering};

use super::writer::ProgressObserver;

/// Default size of each ranged GET (5 MB)
pub const DEFAULT_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Default number of parts fetched concurrently
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound on parts fetched concurrently
pub const MAX_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub part_size: u64,
    pub concurrency: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// One inclusive byte range of the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub number: u64,
    pub start: u64,
    pub end: u64,
}

impl Part {
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Contiguous parts of at most `part_size` bytes, produced on demand so the
/// plan never holds more than one part in memory.
#[derive(Debug, Clone)]
pub struct PartPlan {
    total_bytes: u64,
    part_size: u64,
    next_index: u64,
    total_parts: u64,
}

impl Iterator for PartPlan {
    type Item = Part;

    fn next(&mut self) -> Option<Part> {
        if self.next_index >= self.total_parts {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        let start = index * self.part_size;
        let end = std::cmp::min(start.saturating_add(self.part_size), self.total_bytes) - 1;
        Some(Part {
            number: index + 1,
            start,
            end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_parts - self.next_index;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl PartPlan {
    pub fn total_parts(&self) -> u64 {
        self.total_parts
    }
}

/// Split `total_bytes` into contiguous parts of at most `part_size` bytes.
pub fn plan_parts(total_bytes: u64, part_size: u64) -> PartPlan {
    let part_size = part_size.max(1);
    PartPlan {
        total_bytes,
        part_size,
        next_index: 0,
        total_parts: total_bytes.div_ceil(part_size),
    }
}

/// Bytes expected versus bytes written so far
#[derive(Debug, Default)]
pub struct TransferState {
    total_bytes: u64,
    bytes_written: AtomicU64,
}

impl TransferState {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            bytes_written: AtomicU64::new(0),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::SeqCst)
    }

    pub fn percent(&self) -> u32 {
        if self.total_bytes == 0 {
            return 100;
        }
        std::cmp::min(
            ((self.bytes_written() as f64 / self.total_bytes as f64) * 100.0) as u32,
            100,
        )
    }
}

impl ProgressObserver for TransferState {
    fn on_write(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::{plan_parts, Part, TransferState};
    use crate::download::ProgressObserver;
    use std::sync::Arc;

    #[test]
    fn plan_parts_covers_object_without_overlap() {
        let parts: Vec<Part> = plan_parts(12, 5).collect();
        assert_eq!(
            parts,
            vec![
                Part { number: 1, start: 0, end: 4 },
                Part { number: 2, start: 5, end: 9 },
                Part { number: 3, start: 10, end: 11 },
            ]
        );
        assert_eq!(parts.iter().map(Part::size).sum::<u64>(), 12);
    }

    #[test]
    fn plan_parts_handles_exact_multiple_and_empty_object() {
        let parts: Vec<Part> = plan_parts(10, 5).collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].end, 9);

        assert_eq!(plan_parts(0, 5).next(), None);
    }

    #[test]
    fn plan_parts_is_lazy_for_tiny_part_sizes() {
        let mut plan = plan_parts(1 << 40, 1);
        assert_eq!(plan.total_parts(), 1 << 40);
        assert_eq!(plan.next(), Some(Part { number: 1, start: 0, end: 0 }));
        assert_eq!(plan.next(), Some(Part { number: 2, start: 1, end: 1 }));
    }

    #[test]
    fn transfer_state_accumulates_concurrent_writes() {
        let state = Arc::new(TransferState::new(8 * 1000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        state.on_write(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.bytes_written(), 8000);
        assert_eq!(state.percent(), 100);
    }
}
