use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvError},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use nesai_engine::PieceKind;
use nesai_evaluator::{
    move_evaluator::{MoveEvaluator, SearchDepth},
    possibility::format_possibility,
};

use crate::{
    PrecomputeError,
    protocol::{WorkerResponse, WorkerTask},
};

/// Coordinator-side end of one worker thread.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    piece: PieceKind,
    tx: Option<mpsc::Sender<WorkerTask>>,
    cancelled: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Starts the worker that evaluates states whose next piece is `piece`.
    pub(crate) fn spawn<E>(
        piece: PieceKind,
        evaluator: E,
        depth: SearchDepth,
        responses: mpsc::Sender<WorkerResponse>,
    ) -> io::Result<Self>
    where
        E: MoveEvaluator + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            piece,
            evaluator,
            depth,
            cancelled: Arc::clone(&cancelled),
        };
        let join = thread::Builder::new()
            .name(format!("precompute-{piece}"))
            .spawn(move || worker_thread(&worker, &rx, &responses))?;
        Ok(Self {
            piece,
            tx: Some(tx),
            cancelled,
            join: Some(join),
        })
    }

    /// Hands a task to the worker, clearing any earlier cancellation.
    pub(crate) fn dispatch(&self, task: WorkerTask) -> Result<(), PrecomputeError> {
        debug_assert_eq!(task.piece, self.piece);
        self.cancelled.store(false, Ordering::Release);
        let tx = self
            .tx
            .as_ref()
            .ok_or(PrecomputeError::WorkerDisconnected)?;
        tx.send(task).map_err(|_| PrecomputeError::WorkerDisconnected)
    }

    /// Asks the worker to drop the task it is working on.
    ///
    /// A search already running is not interrupted, but its result is thrown
    /// away instead of being sent back.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Closes the task channel and waits for the thread to exit.
    pub(crate) fn join(mut self) {
        self.tx = None;
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            log::error!("precompute worker for {} panicked", self.piece);
        }
    }
}

#[derive(Debug)]
struct Worker<E> {
    piece: PieceKind,
    evaluator: E,
    depth: SearchDepth,
    cancelled: Arc<AtomicBool>,
}

impl<E> Worker<E>
where
    E: MoveEvaluator,
{
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn evaluate(&self, task: &WorkerTask) -> Option<WorkerResponse> {
        if self.is_cancelled() {
            log::debug!(
                "{}: skipping cancelled task of session {}",
                self.piece,
                task.session
            );
            return None;
        }

        let start = Instant::now();
        let result = self.evaluator.best_move(
            &task.new_search_state,
            task.should_log,
            &task.initial_ai_params,
            &task.param_mods,
            &task.input_frame_timeline,
            self.depth,
        );

        if self.is_cancelled() {
            log::debug!(
                "{}: dropping result of cancelled session {}",
                self.piece,
                task.session
            );
            return None;
        }
        if task.should_log {
            log::debug!(
                "{}: {} in {:?}",
                self.piece,
                format_possibility(result.as_ref()),
                start.elapsed()
            );
        }
        Some(WorkerResponse::Result {
            session: task.session,
            piece: task.piece,
            result,
        })
    }
}

fn worker_thread<E>(
    worker: &Worker<E>,
    rx: &mpsc::Receiver<WorkerTask>,
    tx: &mpsc::Sender<WorkerResponse>,
) where
    E: MoveEvaluator,
{
    if tx.send(WorkerResponse::Ready).is_err() {
        return;
    }

    loop {
        let task = match rx.recv() {
            Ok(task) => task,
            Err(RecvError) => return,
        };
        let Some(response) = worker.evaluate(&task) else {
            continue;
        };
        if tx.send(response).is_err() {
            return;
        }
    }
}
