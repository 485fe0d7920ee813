use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cliprobe::exec::{ExecutionRequest, ExecutionResult, ExecutorBackend};

/// A fake executor that:
/// - records every request it is handed
/// - replies with queued results, or a successful empty run once the queue
///   is exhausted.
#[derive(Clone)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<ExecutionRequest>>>,
    replies: Arc<Mutex<VecDeque<ExecutionResult>>>,
    budget: Duration,
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self {
            executed: Arc::default(),
            replies: Arc::default(),
            budget: Duration::from_secs(60),
        }
    }
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Budget reported through [`ExecutorBackend::budget`].
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Queue the result returned for the next request.
    pub fn reply(&self, result: ExecutionResult) -> &Self {
        self.replies.lock().unwrap().push_back(result);
        self
    }

    pub fn executed(&self) -> Vec<ExecutionRequest> {
        self.executed.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        self.executed.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ExecutionResult::completed(Some(0), String::new()))
    }

    fn budget(&self) -> Duration {
        self.budget
    }
}
