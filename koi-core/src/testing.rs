//! Testing utilities for the consultation core.
//!
//! This module provides:
//! - `ScriptedSource`, a deterministic [`RelationSource`] with queued
//!   responses and a fetch counter, for tests without network access
//! - Sample payload builders matching the 1990 (Earth) scenario

use crate::source::RelationSource;
use async_trait::async_trait;
use koi_api::{ConsultationPayload, DestinyRelations, RelationEntry};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A scripted backend that returns queued responses in order.
///
/// Every fetch increments a shared counter before it completes, so tests
/// can assert how many network calls a code path would have made. With a
/// gate installed, fetches are held in flight until the gate is notified,
/// which makes in-flight de-duplication observable.
pub struct ScriptedSource {
    relations: Mutex<VecDeque<Result<DestinyRelations, koi_api::Error>>>,
    consultations: Mutex<VecDeque<Result<ConsultationPayload, koi_api::Error>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            relations: Mutex::new(VecDeque::new()),
            consultations: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold every fetch in flight until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue the next relation-lookup outcome.
    pub fn queue_relations(&self, outcome: Result<DestinyRelations, koi_api::Error>) {
        self.relations
            .lock()
            .expect("scripted source lock poisoned")
            .push_back(outcome);
    }

    /// Queue the next consultation outcome.
    pub fn queue_consultation(&self, outcome: Result<ConsultationPayload, koi_api::Error>) {
        self.consultations
            .lock()
            .expect("scripted source lock poisoned")
            .push_back(outcome);
    }

    /// Number of fetches the source has seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn exhausted() -> koi_api::Error {
        koi_api::Error::Network("no scripted response queued".to_string())
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelationSource for ScriptedSource {
    async fn destiny_relations(&self, _destiny: &str) -> Result<DestinyRelations, koi_api::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.relations
            .lock()
            .expect("scripted source lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted()))
    }

    async fn consultation_by_year(
        &self,
        _year: i32,
    ) -> Result<ConsultationPayload, koi_api::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.consultations
            .lock()
            .expect("scripted source lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted()))
    }
}

/// Relation name lists for the Earth destiny.
pub fn sample_relations() -> DestinyRelations {
    DestinyRelations {
        generation: vec!["Fire".to_string()],
        overcoming: vec!["Water".to_string()],
    }
}

/// Consultation payload for a 1990 birth year (Earth, generated by Fire).
pub fn sample_consultation() -> ConsultationPayload {
    ConsultationPayload {
        destiny: "Earth".to_string(),
        generating: "Fire".to_string(),
        generation: RelationEntry {
            numbers: vec![2, 7],
            colors: vec!["Red".to_string(), "Orange".to_string()],
            directions: vec!["South".to_string()],
            shapes: vec!["Triangle".to_string()],
            ..RelationEntry::default()
        },
        own: RelationEntry {
            numbers: vec![5, 10],
            colors: vec!["Yellow".to_string(), "Brown".to_string()],
            directions: vec!["Northeast".to_string(), "Southwest".to_string()],
            ..RelationEntry::default()
        },
    }
}
