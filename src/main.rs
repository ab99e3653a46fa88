// tracejs: step through a JavaScript program one frame at a time

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tracejs::snapshot::{Frame, LogLine};
use tracejs::ui::App;
use tracejs::{describe_frame, evaluate_function, interpret, CompileError, EvaluationContext, LanguageFeatures, Value};

#[derive(Debug, Parser)]
#[command(name = "tracejs", version, about = "Step through a JavaScript program frame by frame")]
struct Cli {
    /// Program to run
    file: PathBuf,

    /// Language features as JSON (same shape an exercise ships with)
    #[arg(long, value_name = "FILE")]
    features: Option<PathBuf>,

    /// Call this function after the top level has run
    #[arg(long, value_name = "NAME")]
    call: Option<String>,

    /// Argument for --call, as JSON; repeat for more arguments
    #[arg(long = "arg", value_name = "JSON", requires = "call")]
    args: Vec<String>,

    /// Print the frames and console output instead of opening the TUI
    #[arg(long)]
    dump: bool,

    /// Do not open the TUI (implied by --dump)
    #[arg(long)]
    no_tui: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let source = fs::read_to_string(&cli.file)?;

    let mut context = EvaluationContext::default();
    if let Some(path) = &cli.features {
        let features: LanguageFeatures = serde_json::from_str(&fs::read_to_string(path)?)?;
        context = context.with_language_features(features);
    }

    let (frames, log_lines, error, success) = match &cli.call {
        Some(name) => {
            let args = cli
                .args
                .iter()
                .map(|arg| serde_json::from_str::<serde_json::Value>(arg).map(|json| Value::from_json(&json)))
                .collect::<Result<Vec<_>, _>>()?;
            let result = evaluate_function(&source, &context, name, args);
            if let Some(value) = &result.value {
                eprintln!("{} returned {}", name, value.inspect());
            }
            (result.frames, result.log_lines, result.error, result.success)
        }
        None => {
            let result = interpret(&source, &context);
            (result.frames, result.log_lines, result.error, result.success)
        }
    };

    if let Some(error) = error {
        report_compile_error(&cli.file, &error);
        return Ok(ExitCode::FAILURE);
    }

    if cli.dump {
        dump(&frames, &log_lines, &context);
    } else if !cli.no_tui {
        run_tui(frames, log_lines, Arc::clone(&context.translator), source)?;
    }

    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn report_compile_error(file: &std::path::Path, error: &CompileError) {
    let location = error.location();
    eprintln!(
        "{}:{}:{}: {} ({})",
        file.display(),
        location.line,
        location.col_start,
        error.message(),
        error.type_name()
    );
}

fn dump(frames: &[Frame], log_lines: &[LogLine], context: &EvaluationContext) {
    for frame in frames {
        println!(
            "{:>4} {:>4} {:<7} {}",
            frame.time,
            frame.line,
            frame.status,
            describe_frame(frame, &context.translator)
        );
    }
    if !log_lines.is_empty() {
        println!("--- console ---");
        for line in log_lines {
            println!("[{}] {}", line.time, line.output);
        }
    }
}

fn run_tui(
    frames: Vec<Frame>,
    log_lines: Vec<LogLine>,
    translator: Arc<tracejs::Translator>,
    source: String,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(frames, log_lines, translator, source);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
