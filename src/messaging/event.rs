// Playback notifications - Scheduler -> render sink

/// Event emitted by the scheduler for a renderer to drain
/// Fire-and-forget; no return value flows back into the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started from the first measure
    Started,
    /// Playback stopped
    Stopped,
    /// A beat was scheduled; the highlighted position changed
    PositionChanged { measure: usize, beat: usize },
}
