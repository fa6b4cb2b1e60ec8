// Metronome engine - Command surface and coarse timer driver
//
// One mutex guards store + scheduler + emitter as a single unit: the tick
// thread and every command serialize through it, so a tick always runs to
// completion before a command can observe or mutate playback state. The
// clock and the notification/tone ring buffers are the only lock-free paths.

use crate::messaging::channels::EventProducer;
use crate::persist::{self, PersistError};
use crate::sequencer::{
    AudioClock, LookaheadScheduler, Measure, PlaybackPosition, SchedulerConfig, SequenceStore,
    SequencerError, ToneEmitter,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

struct EngineState<E> {
    store: SequenceStore,
    scheduler: LookaheadScheduler,
    emitter: E,
    // True while a ticker thread is committed to driving the scheduler.
    // Set under the lock by play() before spawning and cleared under the
    // lock by the thread on its way out, so play() never observes a ticker
    // that has already decided to exit.
    ticker_running: bool,
}

/// The application object: sequence commands plus play/stop
///
/// `play()` spawns the coarse timer thread; each wake-up locks the shared
/// state, lets the scheduler drain its lookahead window, and sleeps for the
/// configured interval. `stop()` (or a tick error) ends the thread.
pub struct MetronomeEngine<C, E>
where
    C: AudioClock + Clone + Send + 'static,
    E: ToneEmitter + Send + 'static,
{
    state: Arc<Mutex<EngineState<E>>>,
    clock: C,
    tick_thread: Option<JoinHandle<()>>,
}

impl<C, E> MetronomeEngine<C, E>
where
    C: AudioClock + Clone + Send + 'static,
    E: ToneEmitter + Send + 'static,
{
    /// Create an engine with an empty sequence
    pub fn new(config: SchedulerConfig, events: EventProducer, clock: C, emitter: E) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                store: SequenceStore::new(),
                scheduler: LookaheadScheduler::new(config, events),
                emitter,
                ticker_running: false,
            })),
            clock,
            tick_thread: None,
        }
    }

    /// Append a measure, returning its index
    pub fn add_measure(&self, measure: Measure) -> Result<usize, SequencerError> {
        self.lock().store.add(measure)
    }

    /// Replace the measure at `index`
    /// Takes effect immediately for beats not yet scheduled.
    pub fn edit_measure(&self, index: usize, measure: Measure) -> Result<(), SequencerError> {
        self.lock().store.edit(index, measure)
    }

    /// Remove the measure at `index`
    pub fn delete_measure(&self, index: usize) -> Result<(), SequencerError> {
        self.lock().store.delete(index)
    }

    /// Replace the sequence from JSON; the store is unchanged on failure
    pub fn load_sequence(&self, json: &str) -> Result<(), PersistError> {
        let mut state = self.lock();
        persist::load_from_str(&mut state.store, json)
    }

    /// Serialize the sequence to JSON
    pub fn save_sequence(&self) -> Result<String, PersistError> {
        persist::save_to_string(&self.lock().store)
    }

    /// Load the sequence from a JSON file
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let mut state = self.lock();
        persist::load_from_path(&mut state.store, path)
    }

    /// Write the sequence to a JSON file
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        persist::save_to_path(&self.lock().store, path)
    }

    /// Start playback from the first measure and spawn the timer thread
    pub fn play(&mut self) -> Result<(), SequencerError> {
        let needs_ticker = {
            let mut state = self.lock();
            let EngineState {
                store, scheduler, ..
            } = &mut *state;
            scheduler.play(store, &self.clock)?;
            let needs_ticker = !state.ticker_running;
            state.ticker_running = true;
            needs_ticker
        };
        if needs_ticker {
            self.spawn_tick_thread();
        }
        Ok(())
    }

    /// Stop playback and join the timer thread
    /// Idempotent. Tones already handed to the audio layer still sound.
    pub fn stop(&mut self) {
        self.lock().scheduler.stop();
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }
    }

    /// True while the scheduler is playing
    pub fn is_playing(&self) -> bool {
        self.lock().scheduler.is_playing()
    }

    /// Current playback position
    pub fn position(&self) -> PlaybackPosition {
        self.lock().scheduler.position()
    }

    /// Snapshot of the sequence, for a renderer
    pub fn measures(&self) -> Vec<Measure> {
        self.lock().store.measures().to_vec()
    }

    /// Number of measures
    pub fn measure_count(&self) -> usize {
        self.lock().store.len()
    }

    fn spawn_tick_thread(&mut self) {
        // Reap a thread that stopped on its own (tick error or stop())
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }

        let state = Arc::clone(&self.state);
        let clock = self.clock.clone();
        let interval = self.lock().scheduler.config().lookahead_interval;

        self.tick_thread = Some(thread::spawn(move || {
            loop {
                {
                    let mut guard = match state.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    if !guard.scheduler.is_playing() {
                        guard.ticker_running = false;
                        break;
                    }
                    let EngineState {
                        store,
                        scheduler,
                        emitter,
                        ..
                    } = &mut *guard;
                    if let Err(e) = scheduler.tick(store, &clock, emitter) {
                        // The scheduler has already stopped and notified
                        log::warn!("playback stopped: {e}");
                        guard.ticker_running = false;
                        break;
                    }
                }
                thread::sleep(interval);
            }
        }));
    }

    fn lock(&self) -> MutexGuard<'_, EngineState<E>> {
        // A panic under the lock cannot leave the state half-mutated, so a
        // poisoned lock is recovered rather than propagated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C, E> Drop for MetronomeEngine<C, E>
where
    C: AudioClock + Clone + Send + 'static,
    E: ToneEmitter + Send + 'static,
{
    fn drop(&mut self) {
        self.lock().scheduler.stop();
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }
    }
}
