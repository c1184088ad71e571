use super::TaskId;

/// One unit of work flowing through the pipeline.
///
/// A task is never `Clone`: it moves from the publisher into the queue and from
/// the queue into exactly one worker, which drops it after processing.
///
/// `P` is whatever a downstream consumer wants to carry (a video frame, say).
/// The pipeline itself only looks at the processed flag.
#[derive(Debug)]
pub struct Task<P = ()> {
    id: TaskId,
    payload: P,
    processed: bool,
}

impl Task<()> {
    /// Payload-less task, initially unprocessed.
    pub fn new() -> Self {
        Self::with_payload(())
    }
}

impl Default for Task<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Task<P> {
    pub fn with_payload(payload: P) -> Self {
        Self {
            id: TaskId::generate(),
            payload,
            processed: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Mark the task processed. Calling it again is a no-op.
    pub fn mark_processed(&mut self) {
        self.processed = true;
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_task_is_unprocessed() {
        let task = Task::new();
        assert!(!task.is_processed());
    }

    #[rstest]
    #[case::once(1)]
    #[case::twice(2)]
    #[case::many(5)]
    fn mark_processed_is_idempotent(#[case] times: usize) {
        let mut task = Task::new();
        for _ in 0..times {
            task.mark_processed();
        }
        assert!(task.is_processed());
    }

    #[test]
    fn payload_is_carried_through() {
        let mut task = Task::with_payload(vec![1u8, 2, 3]);
        task.payload_mut().push(4);
        task.mark_processed();

        assert_eq!(task.payload(), &vec![1, 2, 3, 4]);
        assert_eq!(task.into_payload(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn each_task_gets_its_own_id() {
        let a = Task::new();
        let b = Task::new();
        assert_ne!(a.id(), b.id());
    }
}
