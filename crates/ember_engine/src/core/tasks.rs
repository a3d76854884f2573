//! # Main-Thread Task Queue
//!
//! Background mechanisms (the script assembly watcher) never touch engine
//! state directly. They submit closures here; the owning thread drains the
//! queue once per frame, before any layer update.
//!
//! The queue is generic over the context handed to each task so the engine
//! can lend its own services without the queue knowing about them.

use parking_lot::Mutex;
use std::sync::Arc;

/// A deferred unit of work run on the main thread
pub type MainThreadTask<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Mutex-guarded queue of pending main-thread tasks
pub struct MainThreadQueue<C> {
    tasks: Arc<Mutex<Vec<MainThreadTask<C>>>>,
}

impl<C> Default for MainThreadQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MainThreadQueue<C> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Cloneable handle that other threads use to submit work
    pub fn sender(&self) -> MainThreadSender<C> {
        MainThreadSender {
            tasks: Arc::clone(&self.tasks),
        }
    }

    /// Queue a task from the main thread itself
    pub fn submit(&self, task: impl FnOnce(&mut C) + Send + 'static) {
        self.tasks.lock().push(Box::new(task));
    }

    /// Number of tasks waiting
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every queued task against `context`, in submission order.
    ///
    /// The lock is released before any task runs, so tasks may submit
    /// follow-up work; that work runs on the next drain.
    pub fn execute(&self, context: &mut C) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let count = tasks.len();
        for task in tasks {
            task(context);
        }
        if count > 0 {
            log::trace!("Executed {count} main-thread task(s)");
        }
        count
    }
}

/// Thread-safe submission handle for a [`MainThreadQueue`]
pub struct MainThreadSender<C> {
    tasks: Arc<Mutex<Vec<MainThreadTask<C>>>>,
}

impl<C> Clone for MainThreadSender<C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
        }
    }
}

impl<C> MainThreadSender<C> {
    /// Queue a task to run on the main thread during the next drain
    pub fn submit(&self, task: impl FnOnce(&mut C) + Send + 'static) {
        self.tasks.lock().push(Box::new(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_in_order_on_drain() {
        let queue: MainThreadQueue<Vec<u32>> = MainThreadQueue::new();
        queue.submit(|log| log.push(1));
        queue.submit(|log| log.push(2));
        assert_eq!(queue.pending(), 2);

        let mut log = Vec::new();
        assert_eq!(queue.execute(&mut log), 2);
        assert_eq!(log, vec![1, 2]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_submission_from_background_thread() {
        let queue: MainThreadQueue<u32> = MainThreadQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || sender.submit(|count| *count += 5))
            .join()
            .unwrap();

        let mut count = 0;
        queue.execute(&mut count);
        assert_eq!(count, 5);
    }

    #[test]
    fn test_follow_up_work_waits_for_next_drain() {
        struct Ctx {
            queue: MainThreadSender<Ctx>,
            hits: u32,
        }
        let queue: MainThreadQueue<Ctx> = MainThreadQueue::new();
        let mut ctx = Ctx { queue: queue.sender(), hits: 0 };
        queue.submit(|ctx| {
            ctx.hits += 1;
            ctx.queue.submit(|ctx| ctx.hits += 10);
        });

        assert_eq!(queue.execute(&mut ctx), 1);
        assert_eq!(ctx.hits, 1);
        assert_eq!(queue.execute(&mut ctx), 1);
        assert_eq!(ctx.hits, 11);
    }
}
