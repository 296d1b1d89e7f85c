use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::tool::{FunctionTool, Handler};

impl FunctionTool {
    /// Pace this tool so consecutive call starts are at least `min_interval`
    /// apart, even under concurrent callers.
    ///
    /// Throttling lives in the tool, not in the dispatch loop: downstream
    /// services with a fixed requests-per-second ceiling get their pacing
    /// here while the rest of the batch runs unthrottled.
    pub fn rate_limited(self, min_interval: Duration) -> FunctionTool {
        let inner = Arc::clone(&self.handler);
        let last_start: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));

        let handler: Handler = Arc::new(move |arguments| {
            let inner = Arc::clone(&inner);
            let last_start = Arc::clone(&last_start);
            Box::pin(async move {
                {
                    let mut last = last_start.lock().await;
                    let now = Instant::now();
                    let start = match *last {
                        Some(prev) => (prev + min_interval).max(now),
                        None => now,
                    };
                    if start > now {
                        sleep_until(start).await;
                    }
                    *last = Some(start);
                }
                inner(arguments).await
            })
        });

        FunctionTool { handler, ..self }
    }
}
