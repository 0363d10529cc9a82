//! In-process transport for tests and offline runs
//!
//! Messages queued with [`MemoryTransport::push`] are pending immediately;
//! batches queued with [`MemoryTransport::push_batch`] arrive one per
//! `wait()`. Once every batch has been delivered `wait()` reports the
//! connection as closed, which ends a monitor loop.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use zbus::MatchRule;

use crate::error::BusError;
use crate::message::IncomingSignal;
use crate::{BusTransport, SetPropertyRequest};

#[derive(Debug, Default)]
pub struct MemoryTransport {
    rules: Vec<MatchRule<'static>>,
    ready: VecDeque<IncomingSignal>,
    batches: VecDeque<Vec<IncomingSignal>>,
    calls: RefCell<Vec<SetPropertyRequest>>,
    fail_calls: bool,
    waits: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message that `process()` returns without waiting
    pub fn push(&mut self, signal: IncomingSignal) {
        self.ready.push_back(signal);
    }

    /// Queue messages delivered together by a later `wait()`
    pub fn push_batch(&mut self, batch: Vec<IncomingSignal>) {
        self.batches.push_back(batch);
    }

    /// Make every subsequent `set_property` call fail
    pub fn fail_calls(&mut self, fail: bool) {
        self.fail_calls = fail;
    }

    /// Rules registered so far
    pub fn rules(&self) -> &[MatchRule<'static>] {
        &self.rules
    }

    /// Every `set_property` request seen, in order
    pub fn calls(&self) -> Vec<SetPropertyRequest> {
        self.calls.borrow().clone()
    }

    /// Number of `wait()` calls that returned successfully
    pub fn waits(&self) -> usize {
        self.waits
    }
}

#[async_trait(?Send)]
impl BusTransport for MemoryTransport {
    async fn add_match(&mut self, rule: MatchRule<'static>) -> Result<(), BusError> {
        self.rules.push(rule);
        Ok(())
    }

    fn process(&mut self) -> Result<Option<IncomingSignal>, BusError> {
        if self.rules.is_empty() {
            return Err(BusError::NotSubscribed);
        }
        Ok(self.ready.pop_front())
    }

    async fn wait(&mut self) -> Result<(), BusError> {
        if self.rules.is_empty() {
            return Err(BusError::NotSubscribed);
        }
        if self.ready.is_empty() {
            let batch = self.batches.pop_front().ok_or(BusError::Disconnected)?;
            self.ready.extend(batch);
        }
        self.waits += 1;
        Ok(())
    }

    async fn set_property(&self, request: &SetPropertyRequest) -> Result<(), BusError> {
        self.calls.borrow_mut().push(request.clone());
        if self.fail_calls {
            return Err(BusError::CallFailed(format!(
                "{} rejected {}.{}",
                request.destination, request.interface, request.property
            )));
        }
        Ok(())
    }
}
