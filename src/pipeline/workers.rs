//! A center finding thread feeding a vortex analysis thread.
//!
//! Volumes are handed from the caller to the center thread, and from the center thread to the
//! vortex thread, through single slot mailboxes. A newer volume replaces one that has not been
//! picked up yet. Finished profiles come back on a channel.
use super::Analysis;
use crate::{
    cancel::CancelToken,
    center::VortexCenter,
    error::{AnalysisError, Result},
    geo::GeoPoint,
    grid::GriddedData,
    vortex::{PressureObservation, VortexProfile},
};
use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use std::{
    io,
    sync::{
        mpsc::{channel, Receiver, Sender},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
};

/// One radar volume to analyze.
#[derive(Clone)]
pub struct VolumeRequest {
    /// Read only snapshot of the gridded volume.
    pub grid: Arc<dyn GriddedData>,
    /// Seed for the center search.
    pub first_guess: GeoPoint,
    /// Time of the volume.
    pub time: NaiveDateTime,
    /// Surface pressure observations near the vortex.
    pub observations: Vec<PressureObservation>,
}

/// The outcome of analyzing one volume. Aborted volumes are never reported.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    /// Time of the volume.
    pub time: NaiveDateTime,
    /// The profile, or why there is none.
    pub result: Result<VortexProfile>,
}

struct Job<T> {
    item: T,
    cancel: CancelToken,
}

struct CenterJob {
    request: VolumeRequest,
    centers: Vec<Option<VortexCenter>>,
}

struct SlotState<T> {
    pending: Option<Job<T>>,
    closed: bool,
}

/// Holds at most one pending job. Posting replaces a job that was not taken yet.
struct Mailbox<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Mailbox<T> {
    fn new() -> Self {
        Mailbox {
            state: Mutex::new(SlotState {
                pending: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if the mailbox is closed.
    fn post(&self, job: Job<T>) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }

        if state.pending.replace(job).is_some() {
            debug!("Replacing a volume that was not started.");
        }
        self.ready.notify_one();
        true
    }

    /// Block until a job is posted, or return `None` once closed.
    fn take(&self) -> Option<Job<T>> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(job) = state.pending.take() {
                return Some(job);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn clear(&self) {
        self.lock().pending = None;
    }

    fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.pending = None;
        self.ready.notify_all();
    }
}

/// Background threads analyzing a stream of radar volumes.
///
/// The center thread finishes the center search for a volume before handing it to the vortex
/// thread, so the two threads can work on consecutive volumes at the same time.
pub struct AnalysisWorkers {
    volumes: Arc<Mailbox<VolumeRequest>>,
    centers: Arc<Mailbox<CenterJob>>,
    cancel: Mutex<CancelToken>,
    handles: Vec<JoinHandle<()>>,
}

impl AnalysisWorkers {
    /// Start the worker threads. Results arrive on the returned receiver.
    pub fn spawn(analysis: Analysis) -> io::Result<(Self, Receiver<AnalysisOutput>)> {
        let analysis = Arc::new(analysis);
        let volumes = Arc::new(Mailbox::new());
        let centers = Arc::new(Mailbox::new());
        let (sender, receiver) = channel();

        let mut workers = AnalysisWorkers {
            volumes: Arc::clone(&volumes),
            centers: Arc::clone(&centers),
            cancel: Mutex::new(CancelToken::new()),
            handles: Vec::with_capacity(2),
        };

        let center_thread = {
            let analysis = Arc::clone(&analysis);
            let volumes = Arc::clone(&volumes);
            let centers = Arc::clone(&centers);
            let sender = sender.clone();
            thread::Builder::new()
                .name("center-solver".to_owned())
                .spawn(move || center_loop(&analysis, &volumes, &centers, &sender))?
        };
        workers.handles.push(center_thread);

        // Dropping the workers on error closes the mailboxes and joins the center thread.
        let vortex_thread = thread::Builder::new()
            .name("vortex-analysis".to_owned())
            .spawn(move || vortex_loop(&analysis, &centers, &sender))?;
        workers.handles.push(vortex_thread);

        info!("Analysis workers started.");
        Ok((workers, receiver))
    }

    /// Queue a volume, replacing any volume still waiting for the center thread.
    ///
    /// Fails with `Cancelled` after shutdown.
    pub fn submit(&self, request: VolumeRequest) -> Result<()> {
        let job = Job {
            item: request,
            cancel: self.current_token(),
        };

        if self.volumes.post(job) {
            Ok(())
        } else {
            Err(AnalysisError::Cancelled)
        }
    }

    /// Stop every volume in flight or waiting. Their results are discarded.
    pub fn abort(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancelToken::new();
        drop(token);

        self.volumes.clear();
        self.centers.clear();
        info!("Aborted volumes in flight.");
    }

    /// Stop both threads and wait for them to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn current_token(&self) -> CancelToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn stop(&mut self) {
        self.current_token().cancel();
        self.volumes.close();
        self.centers.close();

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("Analysis worker thread panicked.");
            }
        }
    }
}

impl Drop for AnalysisWorkers {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            debug!("Shutting down analysis workers.");
            self.stop();
        }
    }
}

fn center_loop(
    analysis: &Analysis,
    volumes: &Mailbox<VolumeRequest>,
    centers: &Mailbox<CenterJob>,
    results: &Sender<AnalysisOutput>,
) {
    while let Some(Job { item: request, cancel }) = volumes.take() {
        debug!("Searching for the center of volume {}.", request.time);

        match analysis.find_centers(request.grid.as_ref(), request.first_guess, &cancel) {
            Ok(found) => {
                let job = Job {
                    item: CenterJob {
                        request,
                        centers: found,
                    },
                    cancel,
                };
                if !centers.post(job) {
                    break;
                }
            }
            Err(_) if cancel.is_cancelled() => {
                info!("Discarding aborted volume {}.", request.time)
            }
            Err(err) => {
                warn!("Center search failed for volume {}: {}", request.time, err);
                let output = AnalysisOutput {
                    time: request.time,
                    result: Err(err),
                };
                if results.send(output).is_err() {
                    break;
                }
            }
        }
    }

    debug!("Center thread exiting.");
}

fn vortex_loop(
    analysis: &Analysis,
    centers: &Mailbox<CenterJob>,
    results: &Sender<AnalysisOutput>,
) {
    while let Some(Job { item, cancel }) = centers.take() {
        let CenterJob { request, centers } = item;
        debug!("Analyzing the vortex of volume {}.", request.time);

        let result = analysis.analyze_vortex(
            request.grid.as_ref(),
            &centers,
            request.time,
            &request.observations,
            &cancel,
        );

        // An abort that lands after the last cancellation check still drops the profile.
        if cancel.is_cancelled() {
            info!("Discarding aborted volume {}.", request.time);
            continue;
        }

        let output = AnalysisOutput {
            time: request.time,
            result,
        };
        if results.send(output).is_err() {
            break;
        }
    }

    debug!("Vortex thread exiting.");
}
