//! # Task Management System
//!
//! A small worker pool for executing `Task`s on background threads.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the workers, distributes tasks and collects results
//! - `Task`: a unit of work executed on a worker
//! - `TaskResult`: the outcome of a task, which can spawn follow-up tasks
//! - `TaskChannel`: the pair of channels connecting the manager to one worker
//!
//! Each worker is a `std::thread` fed by its own `mpsc` channel. The manager is
//! owned by a single thread (the chunk builder's worker), which publishes tasks,
//! drains results and republishes whatever the results ask for.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to idle workers round-robin, or queues them
//! 3. Workers process tasks and send back results
//! 4. `process_completed_tasks()` handles results and publishes follow-ups
//! 5. `process_queued_tasks()` moves queued tasks onto workers as they free up
//!
//! Dropping the manager closes every task channel; workers finish the task in
//! hand and exit.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In the owning loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use log::info;
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

/// A communication channel between the manager and one worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Number of tasks sent but not yet collected
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: One channel per worker
/// - `queued_tasks`: Tasks waiting for an idle worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// With one task per worker, a queued task always goes to the next worker that
/// frees up instead of waiting behind a busy one.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::spawn(task_closure);

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent
    /// - `Err(task)` if the worker has disconnected, so the task can be requeued
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last one used.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel that can accept a new task
    /// - `None` if every channel is busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto idle workers, oldest first.
    ///
    /// Stops at the first task that cannot be scheduled.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                return;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Handles every result the workers have sent back so far.
    ///
    /// Follow-up tasks returned by the results are published.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut handled = 0;
        let mut tasks_to_queue = Vec::new();
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                handled += 1;
                tasks_to_queue.extend(result.handle_result());
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Number of tasks handed to workers whose results have not been handled.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Number of tasks waiting for an idle worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Returns `true` when nothing is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::{Duration, Instant};

    struct CountingTask {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    struct CountingResult {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult {
                counter: self.counter.clone(),
                follow_ups: self.follow_ups,
            })
        }
    }

    impl TaskResult for CountingResult {
        fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
            (0..self.follow_ups)
                .map(|_| {
                    Box::new(CountingTask {
                        counter: self.counter.clone(),
                        follow_ups: 0,
                    }) as Box<dyn Task + Send>
                })
                .collect()
        }
    }

    fn drain(manager: &mut TaskManager) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !manager.is_idle() {
            assert!(Instant::now() < deadline, "task manager never went idle");
            manager.process_completed_tasks();
            manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn excess_tasks_are_queued_and_all_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(2);
        for _ in 0..10 {
            manager.publish_task(Box::new(CountingTask {
                counter: counter.clone(),
                follow_ups: 0,
            }));
        }
        assert!(manager.tasks_in_flight() <= 2);
        assert_eq!(manager.tasks_in_flight() + manager.queued_task_count(), 10);

        drain(&mut manager);
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn results_can_spawn_follow_up_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(3);
        manager.publish_task(Box::new(CountingTask {
            counter: counter.clone(),
            follow_ups: 4,
        }));

        drain(&mut manager);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn a_pool_without_workers_only_queues() {
        let mut manager = TaskManager::new(0);
        let accepted = manager.publish_task(Box::new(CountingTask {
            counter: Arc::new(AtomicUsize::new(0)),
            follow_ups: 0,
        }));
        assert!(!accepted);
        assert_eq!(manager.queued_task_count(), 1);
        manager.process_queued_tasks();
        assert_eq!(manager.queued_task_count(), 1);
    }
}
