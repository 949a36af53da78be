use std::{
    sync::mpsc::{self, RecvTimeoutError, TryRecvError},
    time::Instant,
};

use nesai_engine::{InputFrameTimeline, InputSequence, PieceKind, SearchState};
use nesai_evaluator::{
    ai_params::{AiParams, ParamMods},
    move_evaluator::{MoveEvaluator, SearchDepth},
    possibility::{PossibilityChain, format_possibility},
};

use crate::{
    NUM_THREADS, PrecomputeError,
    config::PrecomputeConfig,
    predictor::predict_search_state_at_adjustment_time,
    protocol::{SessionId, WorkerResponse, WorkerTask},
    report::PrecomputeReport,
    session::PrecomputeSession,
    worker::WorkerHandle,
};

/// Inputs of one precompute session.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputeRequest {
    /// State of the freshly spawned current piece. Its `next_piece_id` is
    /// ignored: every candidate is tried.
    pub search_state: SearchState,
    pub should_log: bool,
    pub initial_ai_params: AiParams,
    pub param_mods: ParamMods,
    pub input_frame_timeline: InputFrameTimeline,
    /// Frames between the reveal of the next piece and the first adjusted
    /// input.
    pub reaction_time_frames: u32,
}

type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Coordinates a fixed pool of [`NUM_THREADS`] workers, one per possible next
/// piece.
///
/// The manager itself is not shared between threads. Responses are collected
/// by whichever thread owns it, through [`run_until_idle`], [`poll`] or by
/// feeding them to [`handle_message`].
///
/// [`run_until_idle`]: PrecomputeManager::run_until_idle
/// [`poll`]: PrecomputeManager::poll
/// [`handle_message`]: PrecomputeManager::handle_message
#[derive(derive_more::Debug)]
pub struct PrecomputeManager<E> {
    evaluator: E,
    config: PrecomputeConfig,
    workers: Vec<WorkerHandle>,
    responses: mpsc::Receiver<WorkerResponse>,
    workers_still_loading: usize,
    #[debug(skip)]
    on_ready: Option<ReadyCallback>,
    session: Option<PrecomputeSession>,
    last_session: SessionId,
}

impl<E> PrecomputeManager<E>
where
    E: MoveEvaluator + Clone + 'static,
{
    /// Spawns the workers.
    ///
    /// `on_ready` runs once, on the thread that observes the last worker
    /// reporting ready.
    pub fn initialize<F>(
        evaluator: E,
        config: PrecomputeConfig,
        on_ready: F,
    ) -> Result<Self, PrecomputeError>
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, responses) = mpsc::channel();
        let workers = PieceKind::ALL
            .into_iter()
            .map(|piece| {
                WorkerHandle::spawn(piece, evaluator.clone(), config.worker_depth, tx.clone())
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(PrecomputeError::Spawn)?;
        log::debug!("spawned {} precompute workers", workers.len());

        Ok(Self {
            evaluator,
            config,
            workers,
            responses,
            workers_still_loading: NUM_THREADS,
            on_ready: Some(Box::new(on_ready)),
            session: None,
            last_session: SessionId::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PrecomputeConfig {
        &self.config
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.workers_still_loading == 0
    }

    /// Whether no session is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Id of the pending session, if any.
    #[must_use]
    pub fn pending_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(PrecomputeSession::id)
    }

    /// Blocks until every worker has reported ready.
    pub fn wait_until_ready(&mut self) -> Result<(), PrecomputeError> {
        let deadline = self
            .config
            .startup_timeout()
            .map(|timeout| Instant::now() + timeout);
        while !self.is_ready() {
            let message = match self.recv_before(deadline) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(PrecomputeError::StartupTimeout {
                        still_loading: self.workers_still_loading,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(PrecomputeError::WorkerDisconnected);
                }
            };
            self.handle_message(message)?;
        }
        Ok(())
    }

    /// Starts a session for `request`.
    ///
    /// Computes the default placement of the current piece on the calling
    /// thread, then sends one task per candidate next piece. The report is
    /// passed to `on_result` once all workers have answered.
    pub fn precompute<F>(
        &mut self,
        request: &PrecomputeRequest,
        on_result: F,
    ) -> Result<SessionId, PrecomputeError>
    where
        F: FnOnce(PrecomputeReport) + Send + 'static,
    {
        if !self.is_ready() {
            return Err(PrecomputeError::NotReady {
                still_loading: self.workers_still_loading,
            });
        }
        if let Some(session) = &self.session {
            return Err(PrecomputeError::SessionInProgress(session.id()));
        }

        let id = self.last_session.next();
        self.last_session = id;

        let default_placement = self.evaluator.best_move(
            &request.search_state,
            request.should_log,
            &request.initial_ai_params,
            &request.param_mods,
            &request.input_frame_timeline,
            SearchDepth::DEFAULT_PLACEMENT,
        );
        if request.should_log {
            log::debug!(
                "session {id}: default placement {}",
                format_possibility(default_placement.as_ref())
            );
        }

        let no_inputs = InputSequence::default();
        let input_sequence = default_placement
            .as_ref()
            .map_or(&no_inputs, PossibilityChain::input_sequence);
        for (worker, piece) in self.workers.iter().zip(PieceKind::ALL) {
            let new_search_state = predict_search_state_at_adjustment_time(
                &request.search_state.with_next_piece(piece),
                input_sequence,
                &request.input_frame_timeline,
                request.reaction_time_frames,
            );
            let task = WorkerTask {
                session: id,
                piece,
                new_search_state,
                should_log: request.should_log,
                initial_ai_params: request.initial_ai_params.clone(),
                param_mods: request.param_mods.clone(),
                input_frame_timeline: request.input_frame_timeline.clone(),
            };
            if let Err(err) = worker.dispatch(task) {
                self.cancel_all();
                return Err(err);
            }
        }

        self.session = Some(PrecomputeSession::new(
            id,
            default_placement,
            Box::new(on_result),
        ));
        Ok(id)
    }

    /// Processes one response from a worker.
    pub fn handle_message(&mut self, message: WorkerResponse) -> Result<(), PrecomputeError> {
        match message {
            WorkerResponse::Ready => {
                self.handle_ready();
                Ok(())
            }
            WorkerResponse::Result {
                session,
                piece,
                result,
            } => self.handle_result(session, piece, result),
        }
    }

    /// Decodes a JSON response and processes it.
    pub fn handle_json(&mut self, json: &str) -> Result<(), PrecomputeError> {
        let message = WorkerResponse::from_json(json)?;
        self.handle_message(message)
    }

    /// Processes every response already received, without blocking.
    pub fn poll(&mut self) -> Result<(), PrecomputeError> {
        loop {
            match self.responses.try_recv() {
                Ok(message) => self.handle_message(message)?,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(PrecomputeError::WorkerDisconnected),
            }
        }
    }

    /// Blocks until the pending session, if any, has delivered its report.
    ///
    /// When the configured deadline passes first, the session is abandoned:
    /// the missing workers are cancelled, the result callback is dropped
    /// without being called and a [`PrecomputeError::Timeout`] is returned.
    pub fn run_until_idle(&mut self) -> Result<(), PrecomputeError> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        let deadline = self
            .config
            .task_deadline()
            .map(|deadline| session.started_at() + deadline);

        while self.session.is_some() {
            let message = match self.recv_before(deadline) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => return Err(self.abandon_session()),
                Err(RecvTimeoutError::Disconnected) => {
                    self.session = None;
                    return Err(PrecomputeError::WorkerDisconnected);
                }
            };
            self.handle_message(message)?;
        }
        Ok(())
    }

    /// Runs a whole session and returns its report.
    pub fn precompute_blocking(
        &mut self,
        request: &PrecomputeRequest,
    ) -> Result<PrecomputeReport, PrecomputeError> {
        let (tx, rx) = mpsc::channel();
        self.precompute(request, move |report| {
            tx.send(report).ok();
        })?;
        self.run_until_idle()?;
        rx.try_recv()
            .map_err(|_| PrecomputeError::MissingResultCallback)
    }

    /// Stops every worker and waits for the threads to exit.
    ///
    /// Blocks until searches that are still running have returned.
    pub fn shutdown(mut self) {
        self.cancel_all();
        self.session = None;
        for worker in self.workers.drain(..) {
            worker.join();
        }
        log::debug!("precompute workers stopped");
    }

    fn recv_before(&self, deadline: Option<Instant>) -> Result<WorkerResponse, RecvTimeoutError> {
        match deadline {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                self.responses.recv_timeout(timeout)
            }
            None => self
                .responses
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        }
    }

    fn handle_ready(&mut self) {
        if self.workers_still_loading == 0 {
            log::warn!("ready message received after all workers were ready");
            return;
        }
        self.workers_still_loading -= 1;
        if self.workers_still_loading > 0 {
            return;
        }
        log::info!("all {NUM_THREADS} precompute workers ready");
        if let Some(on_ready) = self.on_ready.take() {
            on_ready();
        }
    }

    fn handle_result(
        &mut self,
        session_id: SessionId,
        piece: PieceKind,
        result: Option<PossibilityChain>,
    ) -> Result<(), PrecomputeError> {
        let Some(session) = self.session.as_mut().filter(|s| s.id() == session_id) else {
            if session_id <= self.last_session {
                log::debug!("discarding stale result of session {session_id} for {piece}");
                return Ok(());
            }
            return Err(PrecomputeError::UnexpectedResult {
                session: session_id,
                piece,
            });
        };

        log::debug!(
            "received response for {piece}: {}",
            format_possibility(result.as_ref())
        );
        session.record(piece, result)?;
        if !session.is_complete() {
            return Ok(());
        }

        let Some(session) = self.session.take() else {
            return Ok(());
        };
        log::info!(
            "precompute session {session_id} finished in {:?}",
            session.started_at().elapsed()
        );
        session.complete()
    }

    fn abandon_session(&mut self) -> PrecomputeError {
        let Some(session) = self.session.take() else {
            return PrecomputeError::WorkerDisconnected;
        };
        let missing = session.missing_pieces();
        for piece in &missing {
            self.workers[piece.index()].cancel();
        }
        log::warn!(
            "precompute session {} timed out waiting for {missing:?}",
            session.id()
        );
        PrecomputeError::Timeout {
            session: session.id(),
            missing,
        }
    }

    fn cancel_all(&self) {
        for worker in &self.workers {
            worker.cancel();
        }
    }
}
