use clickseq::{
    AudioOutput, Measure, MetronomeEngine, PlaybackEvent, QueuedToneEmitter, SchedulerConfig,
    Tempo, TimeSignature, create_event_channel, create_tone_channel,
};
use ringbuf::traits::Consumer;
use std::time::Duration;

// Ringbuffer capacity constants
// At the fixed 0.1s lookahead window a tick schedules a handful of beats at
// most; 256 entries cover seconds of backlog even at extreme tempos.
const EVENT_RINGBUFFER_CAPACITY: usize = 256;
const TONE_RINGBUFFER_CAPACITY: usize = 256;

const PLAY_SECONDS: u64 = 8;

fn main() {
    env_logger::init(); // Log to stderr (run with RUST_LOG=debug for detail)

    println!("=== clickseq ===");

    let (event_tx, mut event_rx) = create_event_channel(EVENT_RINGBUFFER_CAPACITY);
    let (tone_tx, tone_rx) = create_tone_channel(TONE_RINGBUFFER_CAPACITY);

    let output = match AudioOutput::new(tone_rx) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return;
        }
    };
    println!("Audio output at {} Hz", output.sample_rate());

    let clock = output.clock();
    let emitter = QueuedToneEmitter::new(tone_tx, output.clock());
    let mut engine = MetronomeEngine::new(SchedulerConfig::default(), event_tx, clock, emitter);

    // Load a saved sequence when a path is given, otherwise use a demo
    // sequence: an octave-up click on every downbeat
    match std::env::args().nth(1) {
        Some(path) => {
            if let Err(e) = engine.load_from_path(&path) {
                eprintln!("ERROR loading {path}: {e}");
                return;
            }
            println!("Loaded {} measures from {path}", engine.measure_count());
        }
        None => {
            let demo = [
                Measure::new(
                    Tempo::new(120.0),
                    TimeSignature::four_four(),
                    vec![880.0, 440.0, 440.0, 440.0],
                ),
                Measure::new(
                    Tempo::new(120.0),
                    TimeSignature::three_four(),
                    vec![880.0, 440.0, 440.0],
                ),
            ];
            for measure in demo {
                if let Err(e) = engine.add_measure(measure) {
                    eprintln!("ERROR: {e}");
                    return;
                }
            }
            println!("Using the built-in demo sequence (4/4 then 3/4)");
        }
    }

    if let Err(e) = engine.play() {
        eprintln!("ERROR: {e}");
        return;
    }
    println!("Playing for {PLAY_SECONDS}s...\n");

    // Drain render notifications the way a UI would
    let deadline = std::time::Instant::now() + Duration::from_secs(PLAY_SECONDS);
    while std::time::Instant::now() < deadline {
        while let Some(event) = event_rx.try_pop() {
            match event {
                PlaybackEvent::Started => println!("[play]"),
                PlaybackEvent::Stopped => println!("[stop]"),
                PlaybackEvent::PositionChanged { measure, beat } => {
                    println!("  measure {} beat {}", measure + 1, beat + 1);
                }
            }
        }
        std::thread::sleep(Duration::from_millis(25));
    }

    engine.stop();
    while let Some(event) = event_rx.try_pop() {
        if event == PlaybackEvent::Stopped {
            println!("[stop]");
        }
    }
}
