//! Typing queue state machine
//!
//! [`TypingQueue`] holds the printed lines, the active line and the pending
//! FIFO, and advances the drain loop one step per [`TypingQueue::step`] call.
//! It never sleeps: each step reports how long the driver has to wait before
//! the next one. The tokio driver lives in `typewriter`; the wasm crate drives
//! it from `setTimeout`.

use std::collections::VecDeque;
use std::mem;
use std::time::Duration;

use crate::config::TyperConfig;
use crate::line::{ActiveLine, ProcessedLine};
use crate::snapshot::Snapshot;

/// What the driver does after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Step again right away
    Continue,
    /// Suspend for the given time, then step again
    Sleep(Duration),
    /// Queue drained, the loop is over
    Idle,
}

#[derive(Debug, Clone)]
enum Phase {
    /// Take the next pending line
    Next,
    /// Inter-line pause is over, start showing the line
    Begin(ProcessedLine),
    /// `pos` bytes of the line's text are revealed
    Typing { line: ProcessedLine, pos: usize },
    /// Settle pause is over, move the line to printed
    Commit(ProcessedLine),
}

#[derive(Debug, Clone)]
pub struct TypingQueue {
    config: TyperConfig,
    printed: Vec<ProcessedLine>,
    active: ActiveLine,
    pending: VecDeque<ProcessedLine>,
    running: bool,
    phase: Phase,
    epoch: u64,
    revision: u64,
}

impl TypingQueue {
    pub fn new(config: TyperConfig) -> Self {
        TypingQueue {
            config,
            printed: Vec::new(),
            active: ActiveLine::default(),
            pending: VecDeque::new(),
            running: false,
            phase: Phase::Next,
            epoch: 0,
            revision: 0,
        }
    }

    /// Append lines to the pending FIFO.
    ///
    /// Returns `true` when the queue was idle and a drain loop has to be
    /// started; a running loop picks the new lines up on its own.
    ///
    /// # Panics
    ///
    /// Panics if a line's tokens and images do not correspond.
    pub fn enqueue<I>(&mut self, lines: I) -> bool
    where
        I: IntoIterator<Item = ProcessedLine>,
    {
        for line in lines {
            if let Err(err) = line.check() {
                panic!("refusing to enqueue inconsistent line {:?}: {}", line.text(), err);
            }
            self.pending.push_back(line);
        }

        if self.running || self.pending.is_empty() {
            return false;
        }
        self.running = true;
        self.revision += 1;
        true
    }

    /// Drop everything and stop the loop. Loops started before the reset see
    /// a different epoch and must not step again.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.printed.clear();
        self.active = ActiveLine::default();
        self.running = false;
        self.phase = Phase::Next;
        self.epoch += 1;
        self.revision += 1;
    }

    /// Takes effect for lines started from now on
    pub fn set_skip_mode(&mut self, enabled: bool) {
        self.config.skip_mode = enabled;
    }

    /// Advance the drain loop by one step
    pub fn step(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        match mem::replace(&mut self.phase, Phase::Next) {
            Phase::Next => match self.pending.pop_front() {
                None => {
                    self.running = false;
                    self.revision += 1;
                    Tick::Idle
                }
                Some(line) => {
                    let first = self.printed.is_empty() && self.active.is_empty();
                    self.phase = Phase::Begin(line);
                    if self.config.skip_mode || first {
                        Tick::Continue
                    } else {
                        Tick::Sleep(self.config.line_delay)
                    }
                }
            },
            Phase::Begin(line) => {
                self.active = ActiveLine::start(&line);
                self.revision += 1;
                if self.config.skip_mode {
                    self.commit(line);
                } else {
                    self.phase = Phase::Typing { line, pos: 0 };
                }
                Tick::Continue
            }
            Phase::Typing { line, pos } => {
                let next = line.text()[pos..].chars().next();
                match next {
                    Some(ch) => {
                        self.active.text.push(ch);
                        self.revision += 1;
                        self.phase = Phase::Typing {
                            pos: pos + ch.len_utf8(),
                            line,
                        };
                        Tick::Sleep(self.config.delay_after(ch))
                    }
                    None => {
                        self.phase = Phase::Commit(line);
                        Tick::Sleep(self.config.settle_delay())
                    }
                }
            }
            Phase::Commit(line) => {
                self.commit(line);
                Tick::Continue
            }
        }
    }

    /// Step on behalf of the drain loop started in `epoch`. A loop from before
    /// the last reset gets `Idle` and leaves the queue untouched.
    pub fn step_in(&mut self, epoch: u64) -> Tick {
        if epoch != self.epoch {
            tracing::trace!(epoch, current = self.epoch, "stale step ignored");
            return Tick::Idle;
        }
        self.step()
    }

    fn commit(&mut self, line: ProcessedLine) {
        tracing::trace!(text = line.text(), "line committed");
        self.printed.push(line);
        self.active = ActiveLine::default();
        self.phase = Phase::Next;
        self.revision += 1;
    }

    /// Step until idle without waiting, returning the total time the loop
    /// would have slept
    pub fn run_to_idle(&mut self) -> Duration {
        let mut total = Duration::ZERO;
        loop {
            match self.step() {
                Tick::Continue => {}
                Tick::Sleep(delay) => total += delay,
                Tick::Idle => return total,
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.printed.clone(), self.active.clone(), self.running)
    }

    pub fn printed(&self) -> &[ProcessedLine] {
        &self.printed
    }

    pub fn active(&self) -> &ActiveLine {
        &self.active
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn skip_mode(&self) -> bool {
        self.config.skip_mode
    }

    pub fn config(&self) -> &TyperConfig {
        &self.config
    }

    /// Bumped by every reset
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Bumped by every observable change
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for TypingQueue {
    fn default() -> Self {
        Self::new(TyperConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceHandle;
    use crate::line::ResolvedImageRef;

    const BASE: Duration = Duration::from_millis(10);
    const LINE: Duration = Duration::from_millis(100);

    fn queue() -> TypingQueue {
        TypingQueue::new(TyperConfig::new(BASE, LINE))
    }

    fn plain(text: &str) -> ProcessedLine {
        ProcessedLine::plain(text).unwrap()
    }

    #[test]
    fn test_idle_queue_does_nothing() {
        let mut q = queue();
        assert_eq!(q.step(), Tick::Idle);
        assert!(!q.enqueue(Vec::new()));
        assert!(!q.is_running());
    }

    #[test]
    fn test_enqueue_starts_once() {
        let mut q = queue();
        assert!(q.enqueue(vec![plain("a")]));
        assert!(!q.enqueue(vec![plain("b")]));
        assert!(q.is_running());
        assert_eq!(q.pending_len(), 2);
    }

    #[test]
    fn test_dot_pacing_and_settle() {
        let mut q = queue();
        q.enqueue(vec![plain("a.b")]);

        // First line of the session: no inter-line pause
        assert_eq!(q.step(), Tick::Continue);
        assert_eq!(q.step(), Tick::Continue);
        assert_eq!(q.active().text, "");

        assert_eq!(q.step(), Tick::Sleep(BASE));
        assert_eq!(q.active().text, "a");
        assert_eq!(q.step(), Tick::Sleep(BASE * 6));
        assert_eq!(q.active().text, "a.");
        assert_eq!(q.step(), Tick::Sleep(BASE));
        assert_eq!(q.active().text, "a.b");
        assert_eq!(q.step(), Tick::Sleep(BASE * 4));
        assert_eq!(q.step(), Tick::Continue);

        assert_eq!(q.printed(), &[plain("a.b")]);
        assert!(q.active().is_empty());
        assert_eq!(q.step(), Tick::Idle);
        assert!(!q.is_running());
    }

    #[test]
    fn test_inter_line_pause_after_first_line() {
        let mut q = queue();
        q.enqueue(vec![plain("a"), plain("b")]);
        // a: begin + 1 char + settle
        assert_eq!(q.run_to_idle(), BASE + BASE * 4 + LINE + BASE + BASE * 4);
        assert_eq!(q.printed(), &[plain("a"), plain("b")]);
    }

    #[test]
    fn test_empty_line_only_settles() {
        let mut q = queue();
        q.enqueue(vec![plain("")]);
        assert_eq!(q.run_to_idle(), BASE * 4);
        assert_eq!(q.printed(), &[plain("")]);
    }

    #[test]
    fn test_multibyte_characters_are_revealed_whole() {
        let mut q = queue();
        q.enqueue(vec![plain("sí ✅")]);
        let mut prefixes = Vec::new();
        loop {
            match q.step() {
                Tick::Sleep(_) if !q.active().text.is_empty() => {
                    prefixes.push(q.active().text.clone())
                }
                Tick::Idle => break,
                _ => {}
            }
        }
        prefixes.dedup();
        assert_eq!(prefixes, vec!["s", "sí", "sí ", "sí ✅"]);
    }

    #[test]
    fn test_skip_mode_commits_in_one_step() {
        let mut q = queue();
        q.set_skip_mode(true);
        q.enqueue(vec![plain("one"), plain("two")]);

        assert_eq!(q.step(), Tick::Continue);
        let before = q.revision();
        assert_eq!(q.step(), Tick::Continue);
        assert_eq!(q.printed(), &[plain("one")]);
        assert!(q.active().is_empty());
        assert!(q.revision() > before);

        assert_eq!(q.run_to_idle(), Duration::ZERO);
        assert_eq!(q.printed(), &[plain("one"), plain("two")]);
    }

    #[test]
    fn test_active_carries_images_before_token() {
        let image = ResolvedImageRef::new(0, ResourceHandle::new("heart"));
        let line = ProcessedLine::new("{{IMG_0}}!", vec![image.clone()]).unwrap();
        let mut q = queue();
        q.enqueue(vec![line]);
        q.step();
        q.step();
        assert_eq!(q.active().text, "");
        assert_eq!(q.active().images, vec![image]);
    }

    #[test]
    fn test_enqueue_while_running_appends() {
        let mut q = queue();
        q.enqueue(vec![plain("a1"), plain("a2")]);
        for _ in 0..4 {
            q.step();
        }
        q.enqueue(vec![plain("b1")]);
        q.run_to_idle();
        assert_eq!(q.printed(), &[plain("a1"), plain("a2"), plain("b1")]);
    }

    #[test]
    fn test_reset_clears_and_bumps_epoch() {
        let mut q = queue();
        q.enqueue(vec![plain("abc"), plain("def")]);
        for _ in 0..4 {
            q.step();
        }
        let epoch = q.epoch();
        q.reset();

        assert_eq!(q.epoch(), epoch + 1);
        assert!(q.snapshot().is_blank());
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.step(), Tick::Idle);
    }

    #[test]
    fn test_loop_from_before_reset_cannot_step() {
        let mut q = queue();
        q.enqueue(vec![plain("old line")]);
        let old = q.epoch();
        for _ in 0..3 {
            q.step_in(old);
        }

        q.reset();
        assert!(q.enqueue(vec![plain("abcdef")]));
        let new = q.epoch();
        q.step_in(new);
        q.step_in(new);
        let before = q.snapshot();
        let revision = q.revision();

        assert_eq!(q.step_in(old), Tick::Idle);
        assert_eq!(q.snapshot(), before);
        assert_eq!(q.revision(), revision);
        assert!(q.is_running());

        assert_eq!(q.step_in(new), Tick::Sleep(BASE));
        assert_eq!(q.active().text, "a");
    }

    #[test]
    fn test_first_line_after_reset_has_no_pause() {
        let mut q = queue();
        q.enqueue(vec![plain("x")]);
        q.run_to_idle();
        q.reset();
        q.enqueue(vec![plain("y")]);
        assert_eq!(q.step(), Tick::Continue);
    }

    #[test]
    #[should_panic(expected = "refusing to enqueue")]
    fn test_inconsistent_line_panics() {
        let image = ResolvedImageRef::new(1, ResourceHandle::new("x"));
        let line = ProcessedLine::unchecked("{{IMG_0}}", vec![image]);
        let mut q = queue();
        q.enqueue(vec![line]);
    }
}
