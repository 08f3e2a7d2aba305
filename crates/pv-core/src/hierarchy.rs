//! Process/thread hierarchy with dense ids.
//!
//! Raw tasks are sorted once by `(process, thread, start)` and then walked in a
//! single forward pass. Each change of raw process id opens a new process and
//! each change of raw thread id opens a new thread, so the dense ids handed out
//! are `0..n` with no gaps whatever the raw ids looked like.
//!
//! Tasks live in one arena in sorted order; thread buckets hold arena indices.

use rayon::slice::ParallelSliceMut;

use crate::format::to_display;
use crate::ingest::RawTask;

/// A normalized task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Dense process id.
    pub process: usize,
    /// Dense thread id within the process.
    pub thread: usize,
    /// Start time relative to the first task of the process once time
    /// normalization has run; absolute before that.
    pub start: u64,
    pub length: u64,
    pub name_id: usize,
    /// First of the three vertices emitted for this task. Only meaningful after
    /// geometry generation and never used for ordering.
    pub vertex_index: u32,
}

impl Task {
    /// End time, saturating at `u64::MAX`.
    pub const fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    /// Start in display units.
    pub fn display_start(&self) -> f64 {
        to_display(self.start)
    }

    /// End in display units.
    pub fn display_end(&self) -> f64 {
        to_display(self.end())
    }
}

/// The tasks of one thread, as arena indices ordered by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thread {
    tasks: Vec<usize>,
}

impl Thread {
    pub fn tasks(&self) -> &[usize] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The threads of one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Process {
    threads: Vec<Thread>,
}

impl Process {
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }
}

/// Task arena plus the process → thread → task nesting over it.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    tasks: Vec<Task>,
    processes: Vec<Process>,
}

impl Hierarchy {
    /// Sorts `raw` and renumbers it into dense process and thread ids.
    pub fn build(mut raw: Vec<RawTask>) -> Self {
        raw.par_sort_by_key(|t| (t.process, t.thread, t.start));
        tracing::debug!(tasks = raw.len(), "sorted");

        let mut tasks = Vec::with_capacity(raw.len());
        let mut processes: Vec<Process> = Vec::new();
        let mut current: Option<(u64, u64)> = None;
        let mut process_counter = 0usize;
        let mut thread_counter = 0usize;

        for task in raw {
            match current {
                None => {
                    processes.push(Process {
                        threads: vec![Thread::default()],
                    });
                }
                Some((process, _)) if process != task.process => {
                    process_counter += 1;
                    thread_counter = 0;
                    processes.push(Process {
                        threads: vec![Thread::default()],
                    });
                }
                Some((_, thread)) if thread != task.thread => {
                    thread_counter += 1;
                    processes[process_counter].threads.push(Thread::default());
                }
                Some(_) => {}
            }
            current = Some((task.process, task.thread));

            let slot = tasks.len();
            tasks.push(Task {
                process: process_counter,
                thread: thread_counter,
                start: task.start,
                length: task.length,
                name_id: task.name_id,
                vertex_index: 0,
            });
            processes[process_counter].threads[thread_counter]
                .tasks
                .push(slot);
        }

        Self { tasks, processes }
    }

    /// All tasks in `(process, thread, start)` order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Looks up a thread by dense ids.
    pub fn thread(&self, process: usize, thread: usize) -> Option<&Thread> {
        self.processes.get(process)?.threads.get(thread)
    }

    /// Task at arena index `slot`.
    pub fn task(&self, slot: usize) -> Option<&Task> {
        self.tasks.get(slot)
    }

    /// Iterates every `(process, thread)` pair in traversal order.
    pub fn threads(&self) -> impl Iterator<Item = (usize, usize, &Thread)> {
        self.processes.iter().enumerate().flat_map(|(p, process)| {
            process
                .threads
                .iter()
                .enumerate()
                .map(move |(t, thread)| (p, t, thread))
        })
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn thread_count(&self) -> usize {
        self.processes.iter().map(|p| p.threads.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(process: u64, thread: u64, start: u64) -> RawTask {
        RawTask {
            process,
            thread,
            start,
            length: 10,
            name_id: 0,
        }
    }

    fn starts(h: &Hierarchy, process: usize, thread: usize) -> Vec<u64> {
        h.thread(process, thread)
            .unwrap()
            .tasks()
            .iter()
            .map(|&slot| h.task(slot).unwrap().start)
            .collect()
    }

    #[test]
    fn test_single_thread_sorted_by_start() {
        let h = Hierarchy::build(vec![raw(0, 0, 0), raw(0, 0, 1_000_000), raw(0, 0, 500_000)]);
        assert_eq!(h.process_count(), 1);
        assert_eq!(h.thread_count(), 1);
        assert_eq!(starts(&h, 0, 0), vec![0, 500_000, 1_000_000]);
    }

    #[test]
    fn test_sparse_thread_ids_become_dense() {
        let h = Hierarchy::build(vec![raw(0, 900, 5), raw(0, 7, 1), raw(0, 42, 3), raw(0, 7, 0)]);
        assert_eq!(h.thread_count(), 3);
        assert_eq!(starts(&h, 0, 0), vec![0, 1]);
        assert_eq!(starts(&h, 0, 1), vec![3]);
        assert_eq!(starts(&h, 0, 2), vec![5]);
        for (p, t, thread) in h.threads() {
            for &slot in thread.tasks() {
                let task = h.task(slot).unwrap();
                assert_eq!((task.process, task.thread), (p, t));
            }
        }
    }

    #[test]
    fn test_process_change_resets_thread_counter() {
        let h = Hierarchy::build(vec![
            raw(30, 1, 0),
            raw(10, 5, 0),
            raw(10, 6, 0),
            raw(30, 2, 0),
            raw(20, 5, 0),
        ]);
        assert_eq!(h.process_count(), 3);
        let shape: Vec<(usize, usize)> = h.threads().map(|(p, t, _)| (p, t)).collect();
        assert_eq!(shape, vec![(0, 0), (0, 1), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_dense_ids_are_contiguous() {
        let input: Vec<RawTask> = (0..50u64)
            .map(|i| raw((i * 7919) % 5 * 1000, (i * 104_729) % 9 * 13, i))
            .collect();
        let h = Hierarchy::build(input);

        let mut processes: Vec<usize> = h.tasks().iter().map(|t| t.process).collect();
        processes.dedup();
        assert_eq!(processes, (0..h.process_count()).collect::<Vec<_>>());

        for (p, process) in h.processes().iter().enumerate() {
            let mut threads: Vec<usize> = h
                .tasks()
                .iter()
                .filter(|t| t.process == p)
                .map(|t| t.thread)
                .collect();
            threads.dedup();
            assert_eq!(threads, (0..process.threads().len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let mut a = raw(0, 0, 5);
        a.name_id = 1;
        let mut b = raw(0, 0, 5);
        b.name_id = 2;
        let h = Hierarchy::build(vec![a, b]);
        let names: Vec<usize> = h.tasks().iter().map(|t| t.name_id).collect();
        assert_eq!(names, vec![1, 2]);
    }

    #[test]
    fn test_buckets_are_non_decreasing() {
        let input: Vec<RawTask> = (0..40u64).map(|i| raw(0, i % 3, (i * 37) % 11)).collect();
        let h = Hierarchy::build(input);
        for (p, t, _) in h.threads() {
            let s = starts(&h, p, t);
            assert!(s.windows(2).all(|w| w[0] <= w[1]), "{s:?}");
        }
    }

    #[test]
    fn test_empty_input_builds_empty_hierarchy() {
        let h = Hierarchy::build(Vec::new());
        assert_eq!(h.process_count(), 0);
        assert!(h.tasks().is_empty());
    }
}
