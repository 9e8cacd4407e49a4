//! Background job port.
//!
//! The crate does not run jobs itself: [`enqueue`](crate::ActionExt::enqueue)
//! turns a call into a serializable [`Job`] and hands it to a [`JobQueue`];
//! whatever drains the queue replays it through
//! [`ActionRegistry::perform`](crate::ActionRegistry::perform).

use std::collections::VecDeque;

use axn_validator::BoxError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::context::Fields;
use crate::contract::Contract;
use crate::error::{ActionError, Exception};
use crate::field::Direction;

/// A deferred invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Contract name of the action to run.
    pub action: String,
    /// Declared inbound fields with non-null values.
    pub fields: Fields,
    /// Replay through `call_strict` instead of `call`.
    #[serde(default)]
    pub strict: bool,
}

impl Job {
    /// A job for `contract`; undeclared and null fields are dropped.
    pub fn for_contract(contract: &Contract, fields: Fields, strict: bool) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(name, value)| !value.is_null() && contract.declares(Direction::Inbound, name))
            .collect();
        Self {
            action: contract.name().to_owned(),
            fields,
            strict,
        }
    }
}

/// Port trait for job backends.
pub trait JobQueue: Send + Sync {
    /// Accept a job for later execution.
    fn push(&self, job: Job) -> Result<(), BoxError>;
}

/// In-process FIFO queue.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl MemoryQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest job.
    pub fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    /// Number of waiting jobs.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Returns `true` if no jobs are waiting.
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

impl JobQueue for MemoryQueue {
    fn push(&self, job: Job) -> Result<(), BoxError> {
        self.jobs.lock().push_back(job);
        Ok(())
    }
}

pub(crate) fn push(queue: &dyn JobQueue, contract: &Contract, fields: Fields, strict: bool) -> Result<(), ActionError> {
    let job = Job::for_contract(contract, fields, strict);
    tracing::debug!(target: "axn", action = %job.action, strict, "enqueueing job");
    queue
        .push(job)
        .map_err(|err| ActionError::Exception(Exception::from_boxed(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn job_keeps_declared_non_null_fields() {
        let contract = Contract::builder("Mail")
            .expects(Field::new("to"))
            .and_then(|b| b.expects(Field::new("cc").allow_blank()))
            .expect("valid contract")
            .build();
        let fields = crate::fields! { "to": "ada@example.com", "cc": null, "extra": 1 };

        let job = Job::for_contract(&contract, fields, false);
        assert_eq!(job.action, "Mail");
        assert_eq!(serde_json::Value::Object(job.fields), json!({ "to": "ada@example.com" }));
    }

    #[test]
    fn job_serializes() {
        let job = Job {
            action: "Mail".into(),
            fields: crate::fields! { "to": "x" },
            strict: true,
        };
        let encoded = serde_json::to_value(&job).expect("serialize");
        assert_eq!(encoded, json!({ "action": "Mail", "fields": { "to": "x" }, "strict": true }));
    }

    #[test]
    fn memory_queue_is_fifo() {
        let queue = MemoryQueue::new();
        for name in ["a", "b"] {
            queue
                .push(Job {
                    action: name.into(),
                    fields: Fields::new(),
                    strict: false,
                })
                .expect("push");
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|j| j.action).as_deref(), Some("a"));
        assert_eq!(queue.pop().map(|j| j.action).as_deref(), Some("b"));
        assert!(queue.is_empty());
    }
}
