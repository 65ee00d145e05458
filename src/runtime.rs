use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the main loop reacts to
#[derive(Clone, Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    /// Wall time since the previous tick
    Tick(Duration),
}

/// Where terminal input comes from
pub trait QuizEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Events arriving over a channel: from the crossterm reader thread in the
/// app, or straight from a test
pub struct ChannelEventSource {
    rx: Receiver<QuizEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }

    /// Spawn a thread that forwards key presses and resizes from the terminal
    pub fn crossterm() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // windows reports releases too
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => QuizEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => QuizEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self::new(rx)
    }
}

impl QuizEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Interleaves input with ticks at a steady rate.
///
/// Ticks are due every `tick_rate` no matter how much input arrives, and each
/// one carries the time actually elapsed so reveal timers follow the clock.
pub struct Runner<E: QuizEventSource> {
    event_source: E,
    tick_rate: Duration,
    last_tick: Instant,
}

impl<E: QuizEventSource> Runner<E> {
    pub fn new(event_source: E, tick_rate: Duration) -> Self {
        Self {
            event_source,
            tick_rate,
            last_tick: Instant::now(),
        }
    }

    /// Blocks until the next event, or until the next tick is due
    pub fn step(&mut self) -> QuizEvent {
        let since = self.last_tick.elapsed();
        if since >= self.tick_rate {
            return self.tick();
        }

        let wait = self.tick_rate - since;
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                // no more input; keep ticking at the normal pace
                std::thread::sleep(wait);
                self.tick()
            }
        }
    }

    fn tick(&mut self) -> QuizEvent {
        let now = Instant::now();
        let dt = now - self.last_tick;
        self.last_tick = now;
        QuizEvent::Tick(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn runner(rate_ms: u64) -> (mpsc::Sender<QuizEvent>, Runner<ChannelEventSource>) {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(rate_ms));
        (tx, runner)
    }

    #[test]
    fn step_ticks_with_elapsed_time_when_idle() {
        let (_tx, mut runner) = runner(5);

        match runner.step() {
            QuizEvent::Tick(dt) => assert!(dt >= Duration::from_millis(5)),
            other => panic!("expected Tick, got {:?}", other),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, mut runner) = runner(1_000);
        tx.send(QuizEvent::Resize).unwrap();

        assert!(matches!(runner.step(), QuizEvent::Resize));
    }

    #[test]
    fn overdue_tick_comes_before_queued_input() {
        let (tx, mut runner) = runner(10);
        std::thread::sleep(Duration::from_millis(20));
        tx.send(QuizEvent::Resize).unwrap();

        assert!(matches!(runner.step(), QuizEvent::Tick(_)));
        assert!(matches!(runner.step(), QuizEvent::Resize));
    }

    #[test]
    fn disconnected_source_still_ticks_at_rate() {
        let (tx, mut runner) = runner(5);
        drop(tx);

        for _ in 0..3 {
            match runner.step() {
                QuizEvent::Tick(dt) => assert!(dt >= Duration::from_millis(5)),
                other => panic!("expected Tick, got {:?}", other),
            }
        }
    }
}
