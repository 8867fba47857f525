use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use terminal_typer::{AssetCatalog, Preprocessor, Tick, TyperConfig, TypingQueue};
use wasm_bindgen::prelude::*;

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn advance(queue: &mut TypingQueue, epoch: u64) -> Option<Duration> {
    loop {
        match queue.step_in(epoch) {
            Tick::Continue => {}
            Tick::Sleep(delay) => return Some(delay),
            Tick::Idle => return None,
        }
    }
}

fn raw_lines(lines: JsValue) -> Result<Vec<String>, String> {
    serde_wasm_bindgen::from_value(lines).map_err(|e| format!("{}", e))
}

/// A typewriter terminal driven from JS.
///
/// The page calls `step()` and waits the returned number of milliseconds
/// (with `setTimeout`) before calling it again; `null` means the queue is idle.
#[wasm_bindgen]
pub struct WasmTerminal {
    queue: TypingQueue,
    preprocessor: Preprocessor<StdRng>,
}

#[wasm_bindgen]
impl WasmTerminal {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>, char_delay_ms: Option<u32>, line_delay_ms: Option<u32>) -> Self {
        let defaults = TyperConfig::default();
        let config = TyperConfig::new(
            char_delay_ms.map_or(defaults.char_delay, |ms| Duration::from_millis(ms.into())),
            line_delay_ms.map_or(defaults.line_delay, |ms| Duration::from_millis(ms.into())),
        );
        WasmTerminal {
            queue: TypingQueue::new(config),
            preprocessor: Preprocessor::new(Arc::new(AssetCatalog::builtin()), rng_from(seed)),
        }
    }

    /// Resolve and append an array of raw lines.
    ///
    /// Returns the epoch to pass to `step()` when the page has to start a new
    /// timer chain, or `null` when a running chain picks the lines up.
    pub fn enqueue(&mut self, lines: JsValue) -> Result<Option<u64>, String> {
        let lines = raw_lines(lines)?;
        let started = self.queue.enqueue(self.preprocessor.resolve(&lines));
        Ok(started.then(|| self.queue.epoch()))
    }

    pub fn reset(&mut self) {
        self.queue.reset();
    }

    pub fn set_skip_mode(&mut self, enabled: bool) {
        self.queue.set_skip_mode(enabled);
    }

    pub fn set_images(&mut self, enabled: bool) {
        self.preprocessor.set_images(enabled);
    }

    /// Advance the chain started in `epoch` until it has to wait. Returns the
    /// wait in milliseconds, or `null` once idle or when a reset has made the
    /// chain stale.
    pub fn step(&mut self, epoch: u64) -> Option<f64> {
        advance(&mut self.queue, epoch).map(|delay| delay.as_secs_f64() * 1000.0)
    }

    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// `{ printed, active, is_running }`
    pub fn snapshot(&self) -> Result<JsValue, String> {
        serde_wasm_bindgen::to_value(&self.queue.snapshot()).map_err(|e| format!("{}", e))
    }
}

/// Resolve raw lines to `{ text, images }` objects without typing them
#[wasm_bindgen]
pub fn resolve_lines(lines: JsValue, seed: Option<u64>) -> Result<JsValue, String> {
    let lines = raw_lines(lines)?;
    let mut preprocessor = Preprocessor::new(Arc::new(AssetCatalog::builtin()), rng_from(seed));
    let resolved = preprocessor.resolve(&lines);
    serde_wasm_bindgen::to_value(&resolved).map_err(|e| format!("{}", e))
}

/// Names of the builtin scripts
#[cfg(feature = "builtin-scripts")]
#[wasm_bindgen]
pub fn builtin_script_names() -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(&terminal_typer::list_builtin_scripts())
        .map_err(|e| format!("{}", e))
}

/// The lines of one section of a builtin script
#[cfg(feature = "builtin-scripts")]
#[wasm_bindgen]
pub fn builtin_script_section(name: &str, section: &str) -> Result<JsValue, String> {
    let script = terminal_typer::builtin_script(name).map_err(|e| format!("{}", e))?;
    let lines = match section {
        "intro" => script.intro,
        "unlock" => script.unlock,
        "accepted" => script.accepted,
        "denied" => script.denied,
        "decline" => script.decline,
        "escalate" => vec![script.escalate],
        other => return Err(format!("Unknown section: {}", other)),
    };
    serde_wasm_bindgen::to_value(&lines).map_err(|e| format!("{}", e))
}
