//! Scenario orchestration: attempt counting, the one-way unlock, and choosing
//! which script lines go to the typewriter.

use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::AssetCatalog;
use crate::config::ScenarioConfig;
use crate::line::ProcessedLine;
use crate::preprocessor::Preprocessor;
use crate::queue::TypingQueue;
use crate::script::Script;

/// Where resolved lines go. Implemented by the tokio typewriter and by the
/// bare typing queue.
pub trait LineSink {
    fn enqueue_lines(&mut self, lines: Vec<ProcessedLine>);
    fn reset(&mut self);
    fn set_skip_mode(&mut self, enabled: bool);
}

impl LineSink for TypingQueue {
    fn enqueue_lines(&mut self, lines: Vec<ProcessedLine>) {
        self.enqueue(lines);
    }

    fn reset(&mut self) {
        TypingQueue::reset(self);
    }

    fn set_skip_mode(&mut self, enabled: bool) {
        TypingQueue::set_skip_mode(self, enabled);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Intro,
    Unlock,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineOutcome {
    /// "Yes" was already accepted
    Ignored,
    Attempt { attempt: u32, unlocked_now: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffirmOutcome {
    /// Still locked; the permission-denied lines were queued
    Denied,
    Accepted,
    /// Already accepted
    Ignored,
}

/// The interactive part of the terminal
pub struct Scenario<R: Rng, S: LineSink> {
    config: ScenarioConfig,
    script: Arc<Script>,
    preprocessor: Preprocessor<R>,
    sink: S,
    attempts: u32,
    unlocked: bool,
    step: Step,
    choice: Option<Choice>,
    skip_mode: bool,
}

impl<R: Rng, S: LineSink> Scenario<R, S> {
    pub fn new(
        config: ScenarioConfig,
        script: Arc<Script>,
        catalog: Arc<AssetCatalog>,
        rng: R,
        sink: S,
    ) -> Self {
        let preprocessor = Preprocessor::new(catalog, rng).with_images(config.images_enabled);
        let skip_mode = config.skip_enabled && config.typer.skip_mode;
        Scenario {
            unlocked: config.unlocked_initially,
            config,
            script,
            preprocessor,
            sink,
            attempts: 0,
            step: Step::Intro,
            choice: None,
            skip_mode,
        }
    }

    /// Clear the terminal and type the intro
    pub fn start(&mut self) {
        self.sink.reset();
        self.sink.set_skip_mode(self.skip_mode);
        let intro = self.script.intro.clone();
        self.enqueue(&intro);
    }

    /// The "no" button
    pub fn decline(&mut self) -> DeclineOutcome {
        if self.choice == Some(Choice::Yes) {
            return DeclineOutcome::Ignored;
        }

        self.choice = Some(Choice::No);
        self.attempts += 1;
        let attempt = self.attempts;
        let threshold = self.config.unlock_threshold;

        let message = if attempt < threshold {
            self.script.decline_message(attempt).to_string()
        } else {
            self.script.escalate.clone()
        };
        let lines = vec![
            String::new(),
            String::new(),
            format!("> {}_input: \"No\"", self.config.who),
            format!("hmm... attempt {}/{}", attempt, threshold),
            message,
        ];
        self.enqueue(&lines);

        let unlocked_now = attempt >= threshold && self.unlock();
        tracing::debug!(attempt, unlocked_now, "decline");
        DeclineOutcome::Attempt {
            attempt,
            unlocked_now,
        }
    }

    /// Unlock "yes" and type the unlock script. Returns `false` if it was
    /// already unlocked.
    fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.step = Step::Unlock;
        let unlock = self.script.unlock.clone();
        self.enqueue(&unlock);
        true
    }

    /// The "yes" button
    pub fn affirm(&mut self) -> AffirmOutcome {
        if !self.unlocked {
            let denied = self.script.denied.clone();
            self.enqueue(&denied);
            return AffirmOutcome::Denied;
        }
        if self.choice == Some(Choice::Yes) {
            return AffirmOutcome::Ignored;
        }

        self.choice = Some(Choice::Yes);
        self.step = Step::Accepted;
        let accepted = self.script.accepted.clone();
        self.enqueue(&accepted);
        tracing::debug!("accepted");
        AffirmOutcome::Accepted
    }

    /// Back to the initial state and type the intro again
    pub fn restart(&mut self) {
        self.attempts = 0;
        self.choice = None;
        self.step = Step::Intro;
        self.unlocked = self.config.unlocked_initially;
        self.skip_mode = false;
        tracing::debug!("restart");
        self.start();
    }

    /// Flip skip mode. Does nothing when the skip control is disabled.
    pub fn toggle_skip(&mut self) -> bool {
        if self.config.skip_enabled {
            self.skip_mode = !self.skip_mode;
            self.sink.set_skip_mode(self.skip_mode);
        }
        self.skip_mode
    }

    fn enqueue(&mut self, raw: &[String]) {
        let lines = self.preprocessor.resolve(raw);
        self.sink.enqueue_lines(lines);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn choice(&self) -> Option<Choice> {
        self.choice
    }

    pub fn skip_mode(&self) -> bool {
        self.skip_mode
    }

    pub fn can_affirm(&self) -> bool {
        self.unlocked && self.choice != Some(Choice::Yes)
    }

    pub fn can_decline(&self) -> bool {
        self.choice != Some(Choice::Yes)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records what the scenario sends without typing anything
    #[derive(Default)]
    struct Recorder {
        batches: Vec<Vec<ProcessedLine>>,
        resets: usize,
        skip: bool,
    }

    impl LineSink for Recorder {
        fn enqueue_lines(&mut self, lines: Vec<ProcessedLine>) {
            self.batches.push(lines);
        }

        fn reset(&mut self) {
            self.resets += 1;
            self.batches.clear();
        }

        fn set_skip_mode(&mut self, enabled: bool) {
            self.skip = enabled;
        }
    }

    fn script() -> Script {
        Script::parse(
            "[intro]\nhello\n[unlock]\nunlocked {{dumb}}\n[accepted]\nyay\n\
             [decline]\nfirst {{IMG:sad}}\nsecond\n[escalate]\nenough\n[denied]\nnope\n",
        )
        .unwrap()
    }

    fn scenario(config: ScenarioConfig) -> Scenario<StdRng, Recorder> {
        Scenario::new(
            config,
            Arc::new(script()),
            Arc::new(AssetCatalog::builtin()),
            StdRng::seed_from_u64(1),
            Recorder::default(),
        )
    }

    fn texts(batch: &[ProcessedLine]) -> Vec<&str> {
        batch.iter().map(|line| line.text()).collect()
    }

    #[test]
    fn test_start_queues_intro() {
        let mut s = scenario(ScenarioConfig::new());
        s.start();
        assert_eq!(s.sink().resets, 1);
        assert_eq!(texts(&s.sink().batches[0]), vec!["hello"]);
    }

    #[test]
    fn test_decline_lines() {
        let mut s = scenario(ScenarioConfig::new().with_unlock_threshold(3));
        s.start();
        s.decline();
        let batch = &s.sink().batches[1];
        assert_eq!(
            texts(batch),
            vec![
                "",
                "",
                "> polita_input: \"No\"",
                "hmm... attempt 1/3",
                "first {{IMG_0}}"
            ]
        );

        s.decline();
        assert_eq!(s.sink().batches[2][4].text(), "second");
    }

    #[test]
    fn test_decline_messages_clamp_to_last() {
        let mut s = scenario(ScenarioConfig::new().with_unlock_threshold(10));
        for _ in 0..5 {
            s.decline();
        }
        assert_eq!(s.sink().batches[4][4].text(), "second");
    }

    #[test]
    fn test_unlock_at_threshold_exactly_once() {
        let mut s = scenario(ScenarioConfig::new().with_unlock_threshold(10));
        for attempt in 1..10 {
            let outcome = s.decline();
            assert_eq!(
                outcome,
                DeclineOutcome::Attempt {
                    attempt,
                    unlocked_now: false
                }
            );
            assert!(!s.is_unlocked());
        }

        let outcome = s.decline();
        assert_eq!(
            outcome,
            DeclineOutcome::Attempt {
                attempt: 10,
                unlocked_now: true
            }
        );
        assert!(s.is_unlocked());
        assert_eq!(s.step(), Step::Unlock);
        let last = s.sink().batches.len();
        assert_eq!(texts(&s.sink().batches[last - 2])[4], "enough");
        assert_eq!(texts(&s.sink().batches[last - 1]), vec!["unlocked {{IMG_0}}"]);

        let outcome = s.decline();
        assert_eq!(
            outcome,
            DeclineOutcome::Attempt {
                attempt: 11,
                unlocked_now: false
            }
        );
        assert!(s.is_unlocked());
    }

    #[test]
    fn test_affirm_denied_while_locked() {
        let mut s = scenario(ScenarioConfig::new());
        assert!(!s.can_affirm());
        assert_eq!(s.affirm(), AffirmOutcome::Denied);
        assert_eq!(texts(&s.sink().batches[0]), vec!["nope"]);
        assert_eq!(s.choice(), None);
    }

    #[test]
    fn test_affirm_after_unlock() {
        let mut s = scenario(ScenarioConfig::new().with_unlocked_initially(true));
        assert!(s.can_affirm());
        assert_eq!(s.affirm(), AffirmOutcome::Accepted);
        assert_eq!(s.step(), Step::Accepted);
        assert!(!s.can_affirm());
        assert!(!s.can_decline());
        assert_eq!(s.affirm(), AffirmOutcome::Ignored);
        assert_eq!(s.decline(), DeclineOutcome::Ignored);
        assert_eq!(s.attempts(), 0);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut s = scenario(ScenarioConfig::new().with_unlock_threshold(1));
        s.toggle_skip();
        s.decline();
        s.affirm();
        assert_eq!(s.step(), Step::Accepted);

        s.restart();
        assert_eq!(s.attempts(), 0);
        assert!(!s.is_unlocked());
        assert_eq!(s.step(), Step::Intro);
        assert_eq!(s.choice(), None);
        assert!(!s.skip_mode());
        assert!(!s.sink().skip);
        assert_eq!(texts(&s.sink().batches[0]), vec!["hello"]);
    }

    #[test]
    fn test_skip_toggle_respects_variant() {
        let mut s = scenario(ScenarioConfig::new());
        assert!(s.toggle_skip());
        assert!(s.sink().skip);
        assert!(!s.toggle_skip());

        let mut s = scenario(ScenarioConfig::new().with_skip_enabled(false));
        assert!(!s.toggle_skip());
        assert!(!s.sink().skip);
    }

    #[test]
    fn test_images_disabled_variant() {
        let mut s = scenario(ScenarioConfig::new().with_images(false));
        s.decline();
        assert_eq!(s.sink().batches[0][4].text(), "first ");
        assert!(s.sink().batches[0][4].images().is_empty());
    }

    #[test]
    fn test_drives_bare_queue() {
        let mut s = Scenario::new(
            ScenarioConfig::new(),
            Arc::new(script()),
            Arc::new(AssetCatalog::builtin()),
            StdRng::seed_from_u64(3),
            TypingQueue::default(),
        );
        s.start();
        s.affirm();
        s.sink_mut().run_to_idle();
        let printed: Vec<_> = s.sink().printed().iter().map(|l| l.text()).collect();
        assert_eq!(printed, vec!["hello", "nope"]);
    }
}
