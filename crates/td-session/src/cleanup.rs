use std::fmt::Display;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

/// One named, independently failing unit of cleanup work.
pub struct CleanupStep<'a> {
    name: &'static str,
    run: BoxFuture<'a, Result<(), String>>,
}

impl<'a> CleanupStep<'a> {
    pub fn new<Fut, E>(name: &'static str, step: Fut) -> Self
    where
        Fut: Future<Output = Result<(), E>> + Send + 'a,
        E: Display,
    {
        Self {
            name,
            run: step.map(|result| result.map_err(|e| e.to_string())).boxed(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub step: &'static str,
    pub message: String,
}

/// What happened to each step of a [`run_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub completed: Vec<&'static str>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every step in order. A failing step is logged and recorded; it
/// never prevents the steps after it from running.
pub async fn run_all(steps: Vec<CleanupStep<'_>>) -> CleanupReport {
    let mut report = CleanupReport::default();

    for step in steps {
        match step.run.await {
            Ok(()) => {
                log::debug!("Cleanup step '{}' completed", step.name);
                report.completed.push(step.name);
            }
            Err(message) => {
                log::warn!("Cleanup step '{}' failed: {}", step.name, message);
                report.failures.push(CleanupFailure {
                    step: step.name,
                    message,
                });
            }
        }
    }

    report
}
