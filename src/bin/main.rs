/// CLI that plays a typewriter script in the terminal
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use terminal_typer::builtin_scripts::DEFAULT_SCRIPT;
use terminal_typer::loader::{BuiltinScriptsLoader, ChainLoader, FolderLoader, ScriptLoader};
use terminal_typer::render::{active_segments, line_segments, to_plain, Segment};
use terminal_typer::{
    diagnostic, AffirmOutcome, AssetCatalog, DeclineOutcome, ResourceHandle, Scenario,
    ScenarioConfig, Script, Snapshot, TyperConfig, Typewriter,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const CURSOR: &str = "█";
const CLEAR_LINE: &str = "\r\x1b[2K";

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  terminal-typer [options]          Play a script in the terminal");
    eprintln!("  terminal-typer --help             Show this help message");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --script <name|file>   Script name or path to a .typer file (default: {})", DEFAULT_SCRIPT);
    eprintln!("  --scripts-dir <dir>    Directory searched for <name>.typer before the builtins");
    eprintln!("  --seed <n>             Seed for image picks (default: random)");
    eprintln!("  --char-delay <ms>      Delay after each character (default: 50)");
    eprintln!("  --line-delay <ms>      Delay between lines (default: 400)");
    eprintln!("  --threshold <n>        Number of \"no\" answers that unlock \"yes\" (default: 10)");
    eprintln!("  --unlocked             Start with \"yes\" unlocked");
    eprintln!("  --no-images            Drop image placeholders");
    eprintln!("  --no-skip              Disable the skip toggle");
    eprintln!("  --skip                 Start in skip mode");
    eprintln!("  --check                Check the script and exit");
    eprintln!();
    eprintln!("Keys (followed by Enter):");
    eprintln!("  y  yes    n  no    s  toggle skip    r  restart    q  quit");
}

struct Options {
    script: String,
    scripts_dir: Option<PathBuf>,
    seed: Option<u64>,
    config: ScenarioConfig,
    check: bool,
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("Missing value for {}", flag)))
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .unwrap_or_else(|e| fail(format!("Error parsing {} '{}': {}", flag, raw, e)))
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        script: DEFAULT_SCRIPT.to_string(),
        scripts_dir: None,
        seed: None,
        config: ScenarioConfig::new(),
        check: false,
    };
    let mut typer = TyperConfig::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--script" => options.script = value(args, &mut i, flag).to_string(),
            "--scripts-dir" => {
                options.scripts_dir = Some(PathBuf::from(value(args, &mut i, flag)))
            }
            "--seed" => options.seed = Some(number(value(args, &mut i, flag), flag)),
            "--char-delay" => {
                typer.char_delay = Duration::from_millis(number(value(args, &mut i, flag), flag))
            }
            "--line-delay" => {
                typer.line_delay = Duration::from_millis(number(value(args, &mut i, flag), flag))
            }
            "--threshold" => {
                let threshold: u32 = number(value(args, &mut i, flag), flag);
                options.config = options.config.with_unlock_threshold(threshold);
            }
            "--unlocked" => options.config = options.config.with_unlocked_initially(true),
            "--no-images" => options.config = options.config.with_images(false),
            "--no-skip" => options.config = options.config.with_skip_enabled(false),
            "--skip" => typer.skip_mode = true,
            "--check" => options.check = true,
            other => {
                print_usage();
                fail(format!("Unknown argument '{}'", other));
            }
        }
        i += 1;
    }

    options.config = options.config.with_typer(typer);
    options
}

/// Read the script from a file path, or by name through the loaders
async fn read_script(options: &Options) -> (String, String) {
    let path = PathBuf::from(&options.script);
    if path.is_file() {
        return match tokio::fs::read_to_string(&path).await {
            Ok(source) => (options.script.clone(), source),
            Err(e) => fail(format!("Error reading file '{}': {}", options.script, e)),
        };
    }

    let mut chain = ChainLoader::new();
    if let Some(dir) = &options.scripts_dir {
        chain = chain.with_loader(Arc::new(FolderLoader::new(dir.clone())));
    }
    let chain = chain.with_loader(Arc::new(BuiltinScriptsLoader::new()));

    match chain.load(&options.script).await {
        Ok(source) => (options.script.clone(), source),
        Err(e) => fail(format!(
            "{}\nAvailable scripts: {}",
            e,
            chain.list_available().join(", ")
        )),
    }
}

fn draw_image(resource: &ResourceHandle) -> String {
    format!("[img:{}]", resource)
}

fn draw(segments: &[Segment<'_>]) -> String {
    to_plain(segments, draw_image)
}

/// Prints new committed lines and redraws the active line in place
struct TerminalView {
    shown: usize,
}

impl TerminalView {
    fn update<W: Write>(&mut self, out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
        if snapshot.printed.len() < self.shown {
            write!(out, "{}\n--- restart ---\n", CLEAR_LINE)?;
            self.shown = 0;
        }
        for line in &snapshot.printed[self.shown..] {
            writeln!(out, "{}{}", CLEAR_LINE, draw(&line_segments(line)))?;
        }
        self.shown = snapshot.printed.len();

        write!(
            out,
            "{}{}{}",
            CLEAR_LINE,
            draw(&active_segments(&snapshot.active)),
            CURSOR
        )?;
        out.flush()
    }
}

fn status(scenario: &Scenario<StdRng, Typewriter>) {
    tracing::info!(
        attempts = scenario.attempts(),
        step = ?scenario.step(),
        unlocked = scenario.is_unlocked(),
        skip = scenario.skip_mode(),
        "status"
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let (source_name, source) = read_script(&options).await;
    let script = Script::parse(&source).unwrap_or_else(|e| {
        eprint!("{}", diagnostic::report_script_error(&source_name, &source, &e));
        process::exit(1);
    });

    let catalog = Arc::new(AssetCatalog::builtin());
    let warnings = Script::lint(&source, &catalog);
    if !warnings.is_empty() {
        eprint!(
            "{}",
            diagnostic::report_script_warnings(&source_name, &source, &warnings)
        );
    }
    if options.check {
        println!("{}: ok ({} warnings)", source_name, warnings.len());
        return;
    }

    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let typewriter = Typewriter::new(options.config.typer);
    let mut updates = typewriter.subscribe();
    let renderer = tokio::spawn(async move {
        let mut view = TerminalView { shown: 0 };
        while let Some(snapshot) = updates.recv().await {
            let drawn = {
                let mut out = io::stdout().lock();
                view.update(&mut out, &snapshot)
            };
            if let Err(e) = drawn {
                tracing::warn!(error = %e, "stdout closed, renderer stopped");
                break;
            }
        }
    });

    let mut scenario = Scenario::new(
        options.config,
        Arc::new(script),
        catalog,
        rng,
        typewriter.clone(),
    );
    scenario.start();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "reading stdin");
                break;
            }
        };

        match line.trim() {
            "y" => {
                if scenario.affirm() == AffirmOutcome::Ignored {
                    tracing::info!("already accepted");
                }
            }
            "n" => {
                if let DeclineOutcome::Attempt {
                    unlocked_now: true, ..
                } = scenario.decline()
                {
                    tracing::info!("yes unlocked");
                }
            }
            "s" => {
                scenario.toggle_skip();
            }
            "r" => scenario.restart(),
            "q" => break,
            "" => {}
            other => tracing::warn!(input = other, "unknown key"),
        }
        status(&scenario);
    }

    typewriter.reset();
    drop(scenario);
    drop(typewriter);
    renderer.abort();
    println!();
}
