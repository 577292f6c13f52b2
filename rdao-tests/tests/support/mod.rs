//! An in-memory pool that records every call made on it.
//!
//! `MockPool` hands out `MockConnection`s that answer statements from a
//! scripted responder and log acquire, release, transaction boundaries and
//! executed statements in order. Failures can be injected at each step.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use rdao::{
    Connection, ConnectionPool, Error, IsolationLevel, Result, Row, RowStream, Segment, Statement,
    Value,
};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Acquire,
    Release,
    Begin(IsolationLevel),
    Commit,
    Rollback,
    Execute(Statement),
}

pub type Responder = Box<dyn Fn(&Statement) -> Vec<Result<Segment<MockRow>>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct MockRow {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl MockRow {
    pub fn new(cells: &[(&str, Value)]) -> Self {
        Self {
            columns: cells.iter().map(|(name, _)| name.to_string()).collect(),
            values: cells.iter().map(|(_, value)| value.clone()).collect(),
        }
    }
}

impl Row for MockRow {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn get_value_at(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index)))
    }
}

struct Inner {
    events: Mutex<Vec<Event>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    rows_pulled: AtomicUsize,
    next_id: AtomicI64,
    fail_acquire: AtomicBool,
    fail_begin: AtomicBool,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
    responder: Mutex<Option<Responder>>,
}

impl Inner {
    fn record(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// One update count per slot, or one generated id per slot when the
    /// statement asks for generated values.
    fn default_response(&self, statement: &Statement) -> Vec<Result<Segment<MockRow>>> {
        match statement.generated_columns().first() {
            Some(column) => statement
                .slots()
                .iter()
                .map(|_| {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    Ok(Segment::Row(MockRow::new(&[(column.as_str(), Value::I64(id))])))
                })
                .collect(),
            None => statement
                .slots()
                .iter()
                .map(|_| Ok(Segment::RowsAffected(1)))
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct MockPool {
    inner: Arc<Inner>,
}

impl Default for MockPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPool {
    pub fn new() -> Self {
        init_tracing();
        Self {
            inner: Arc::new(Inner {
                events: Mutex::new(Vec::new()),
                acquired: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                rows_pulled: AtomicUsize::new(0),
                next_id: AtomicI64::new(1),
                fail_acquire: AtomicBool::new(false),
                fail_begin: AtomicBool::new(false),
                fail_commit: AtomicBool::new(false),
                fail_rollback: AtomicBool::new(false),
                responder: Mutex::new(None),
            }),
        }
    }

    /// Answer every statement with `responder` instead of the default
    /// update counts.
    pub fn respond_with<F>(&self, responder: F) -> &Self
    where
        F: Fn(&Statement) -> Vec<Result<Segment<MockRow>>> + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.inner.responder.lock() {
            *slot = Some(Box::new(responder));
        }
        self
    }

    pub fn fail_acquire(&self) -> &Self {
        self.inner.fail_acquire.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_begin(&self) -> &Self {
        self.inner.fail_begin.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_commit(&self) -> &Self {
        self.inner.fail_commit.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_rollback(&self) -> &Self {
        self.inner.fail_rollback.store(true, Ordering::SeqCst);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.events.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Execute(statement) => Some(statement),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|event| *event == wanted).count()
    }

    pub fn acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    pub fn rows_pulled(&self) -> usize {
        self.inner.rows_pulled.load(Ordering::SeqCst)
    }

    /// Wait until every acquired connection is back, e.g. after a dropped
    /// transaction spawned its rollback.
    pub async fn wait_for_release(&self) {
        for _ in 0..200 {
            if self.released() == self.acquired() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "connections not released: acquired {}, released {}",
            self.acquired(),
            self.released()
        );
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    type Conn = MockConnection;

    async fn acquire(&self) -> Result<MockConnection> {
        if self.inner.fail_acquire.load(Ordering::SeqCst) {
            return Err(Error::Acquisition("pool exhausted".to_string()));
        }
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.record(Event::Acquire);
        Ok(MockConnection {
            inner: self.inner.clone(),
        })
    }

    fn release(&self, _conn: MockConnection) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
        self.inner.record(Event::Release);
    }
}

pub struct MockConnection {
    inner: Arc<Inner>,
}

#[async_trait]
impl Connection for MockConnection {
    type Row = MockRow;

    fn execute(&mut self, statement: Statement) -> RowStream<'_, Segment<MockRow>> {
        let response = match self.inner.responder.lock() {
            Ok(responder) => match responder.as_ref() {
                Some(respond) => respond(&statement),
                None => self.inner.default_response(&statement),
            },
            Err(_) => vec![Err(Error::Execution("responder poisoned".to_string()))],
        };
        self.inner.record(Event::Execute(statement));

        let inner = self.inner.clone();
        Box::pin(futures::stream::iter(response).inspect(move |_| {
            inner.rows_pulled.fetch_add(1, Ordering::SeqCst);
        }))
    }

    async fn begin_transaction(&mut self, level: IsolationLevel) -> Result<()> {
        if self.inner.fail_begin.load(Ordering::SeqCst) {
            return Err(Error::Execution("begin refused".to_string()));
        }
        self.inner.record(Event::Begin(level));
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<()> {
        self.inner.record(Event::Commit);
        if self.inner.fail_commit.load(Ordering::SeqCst) {
            return Err(Error::Execution("commit refused".to_string()));
        }
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<()> {
        self.inner.record(Event::Rollback);
        if self.inner.fail_rollback.load(Ordering::SeqCst) {
            return Err(Error::Execution("rollback refused".to_string()));
        }
        Ok(())
    }
}

/// Rows `1..=count` with a single `n` column.
pub fn numbered_rows(count: i64) -> Vec<Result<Segment<MockRow>>> {
    (1..=count)
        .map(|n| Ok(Segment::Row(MockRow::new(&[("n", Value::I64(n))]))))
        .collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
