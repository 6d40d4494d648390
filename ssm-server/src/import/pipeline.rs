//! Import pipeline orchestration

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use ssm_common::config::ImportConfig;
use ssm_common::{Student, StudentStore};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::row::{classify_row, RowFault};

/// Pipeline-level import failure
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source itself could not be read
    #[error("Failed to read import source: {0}")]
    Read(#[source] csv::Error),

    /// Cancellation was requested before the import drained
    #[error("Import cancelled")]
    Cancelled,

    /// A pipeline task panicked or was aborted
    #[error("Import task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

/// One decoded row waiting for a worker
struct DecodedRow {
    line: u64,
    fields: StringRecord,
}

#[derive(Debug, Default)]
struct ImportCounters {
    rows_read: AtomicUsize,
    decode_faults: AtomicUsize,
    skipped: AtomicUsize,
    /// Rows accepted into the work queue
    admitted: AtomicUsize,
    /// Admitted rows that were either skipped or handed to the collector
    settled: AtomicUsize,
}

impl ImportCounters {
    /// Every admitted row reached a verdict
    fn all_settled(&self) -> bool {
        self.settled.load(Ordering::Relaxed) == self.admitted.load(Ordering::Relaxed)
    }
}

/// Concurrent CSV import into a shared [`StudentStore`]
pub struct ImportPipeline {
    store: Arc<StudentStore>,
    config: ImportConfig,
}

impl ImportPipeline {
    pub fn new(store: Arc<StudentStore>, config: ImportConfig) -> Self {
        Self { store, config }
    }

    /// Import every row of `source`, blocking until the stream is fully drained.
    ///
    /// Success means the stream was drained, not that every row was stored:
    /// malformed and unclassifiable rows are skipped and only logged.
    pub async fn run<R>(&self, source: R) -> Result<(), ImportError>
    where
        R: Read + Send + 'static,
    {
        self.run_until_cancelled(source, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops admitting rows once `cancel` fires.
    ///
    /// Records already handed off are still merged before returning
    /// [`ImportError::Cancelled`]. A token that fires after the source was
    /// exhausted and every row settled does not turn the import into a
    /// cancellation.
    pub async fn run_until_cancelled<R>(
        &self,
        source: R,
        cancel: CancellationToken,
    ) -> Result<(), ImportError>
    where
        R: Read + Send + 'static,
    {
        let import_id = Uuid::new_v4();
        let workers = self.config.workers.max(1);
        let counters = Arc::new(ImportCounters::default());

        info!(%import_id, workers, "Import started");

        let (work_tx, work_rx) = mpsc::channel::<DecodedRow>(self.config.queue_capacity.max(1));
        let (handoff_tx, mut handoff_rx) =
            mpsc::channel::<Student>(self.config.handoff_capacity.max(1));

        let reader = {
            let cancel = cancel.clone();
            let counters = Arc::clone(&counters);
            tokio::task::spawn_blocking(move || {
                read_rows(import_id, source, work_tx, &cancel, &counters)
            })
        };

        let work_rx = Arc::new(Mutex::new(work_rx));
        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(run_worker(
                import_id,
                worker_id,
                Arc::clone(&work_rx),
                handoff_tx.clone(),
                cancel.clone(),
                Arc::clone(&counters),
            ));
        }
        // Workers hold the only receiver handles, so the reader unblocks if they all exit
        drop(work_rx);

        // Sole owner of the hand-off close: the channel stays open until every worker is done
        let coordinator = tokio::spawn(async move {
            let mut failures = Vec::new();
            while let Some(joined) = pool.join_next().await {
                if let Err(e) = joined {
                    error!(%import_id, error = %e, "Import worker failed");
                    failures.push(e);
                }
            }
            drop(handoff_tx);
            failures
        });

        let mut merged = 0usize;
        while let Some(student) = handoff_rx.recv().await {
            debug!(%import_id, student_id = student.id, "Merging imported student");
            self.store.add(student).await;
            merged += 1;
        }

        let mut failures = coordinator.await?;
        let read_result = reader.await?;

        info!(
            %import_id,
            rows_read = counters.rows_read.load(Ordering::Relaxed),
            decode_faults = counters.decode_faults.load(Ordering::Relaxed),
            skipped = counters.skipped.load(Ordering::Relaxed),
            merged,
            "Import finished"
        );

        if let Some(failure) = failures.pop() {
            return Err(ImportError::TaskFailed(failure));
        }
        let exhausted = read_result.map_err(ImportError::Read)?;
        // Rows stop short only when the reader or a worker bailed out on cancellation
        if !exhausted || !counters.all_settled() {
            warn!(%import_id, merged, "Import cancelled before completion");
            return Err(ImportError::Cancelled);
        }
        Ok(())
    }
}

/// Decode rows into the work queue. Runs on the blocking pool.
///
/// Returns `true` when the source was read to the end and `false` when the
/// reader stopped early. Errors only when the underlying source fails; per-row
/// decode faults are counted and skipped.
fn read_rows<R: Read>(
    import_id: Uuid,
    source: R,
    work_tx: mpsc::Sender<DecodedRow>,
    cancel: &CancellationToken,
    counters: &ImportCounters,
) -> Result<bool, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    for result in reader.records() {
        if cancel.is_cancelled() {
            debug!(%import_id, "Reader stopping on cancellation");
            return Ok(false);
        }

        match result {
            Ok(fields) => {
                counters.rows_read.fetch_add(1, Ordering::Relaxed);
                let line = fields.position().map(|p| p.line()).unwrap_or_default();
                if work_tx.blocking_send(DecodedRow { line, fields }).is_err() {
                    warn!(%import_id, "Work queue closed, reader stopping early");
                    return Ok(false);
                }
                counters.admitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) if e.is_io_error() => {
                error!(%import_id, error = %e, "Import source unreadable");
                return Err(e);
            }
            Err(e) => {
                counters.decode_faults.fetch_add(1, Ordering::Relaxed);
                let line = e.position().map(|p| p.line());
                let fault = RowFault::Decode(e.to_string());
                warn!(%import_id, ?line, error = %fault, "Skipping import row");
            }
        }
    }

    Ok(true)
}

async fn run_worker(
    import_id: Uuid,
    worker_id: usize,
    work_rx: Arc<Mutex<mpsc::Receiver<DecodedRow>>>,
    handoff_tx: mpsc::Sender<Student>,
    cancel: CancellationToken,
    counters: Arc<ImportCounters>,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            row = async { work_rx.lock().await.recv().await } => row,
        };
        let Some(row) = next else {
            break;
        };

        let student = match classify_row(&row.fields) {
            Ok(student) => student,
            Err(fault) => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                counters.settled.fetch_add(1, Ordering::Relaxed);
                warn!(%import_id, line = row.line, error = %fault, "Skipping import row");
                continue;
            }
        };

        if handoff_tx.send(student).await.is_err() {
            warn!(%import_id, worker_id, "Collector gone, worker stopping");
            break;
        }
        counters.settled.fetch_add(1, Ordering::Relaxed);
    }

    debug!(%import_id, worker_id, "Import worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pipeline(store: &Arc<StudentStore>, workers: usize) -> ImportPipeline {
        ImportPipeline::new(
            Arc::clone(store),
            ImportConfig {
                workers,
                queue_capacity: 2,
                handoff_capacity: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_empty_source_completes() {
        let store = Arc::new(StudentStore::new());
        pipeline(&store, 2).run(Cursor::new(Vec::<u8>::new())).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_single_worker_imports_all_rows() {
        let store = Arc::new(StudentStore::new());
        let csv = "undergraduate,1,wei,male,28\ngraduate,2,hao,female,27\n";

        pipeline(&store, 1).run(Cursor::new(csv)).await.unwrap();

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_zero_workers_treated_as_one() {
        let store = Arc::new(StudentStore::new());
        let csv = "graduate,7,li,female,30\n";

        pipeline(&store, 0).run(Cursor::new(csv)).await.unwrap();

        assert!(store.contains(7).await);
    }
}
