use clap::{CommandFactory, Parser};
use log::{LevelFilter, warn};
use std::process::ExitCode;
use webpage2pdf::browser::ChromeLauncher;
use webpage2pdf::cli::Args;
use webpage2pdf::render::{self, CancelToken, RenderError};

fn init_logging(args: &Args) {

    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    let chrome_level = if args.verbose >= 2 { level } else { level.min(LevelFilter::Warn) };

    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("headless_chrome", chrome_level)
        .format_timestamp(None)
        .format_target(false)
        .parse_env(env_logger::Env::new().filter("WEBPAGE2PDF_LOG"))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {

    let args = Args::parse();
    init_logging(&args);

    let (request, options) = match args.into_job() {
        Ok(job) => job,
        Err(e) => {
            let err = RenderError::from(e);
            eprintln!("{err}\n\n{}", Args::command().render_usage());
            return ExitCode::from(err.exit_code());
        }
    };

    let cancel = CancelToken::new();
    let mut worker = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || render::render(&ChromeLauncher, &request, &options, &cancel)
    });

    let outcome = tokio::select! {
        outcome = &mut worker => outcome,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupted, closing the browser...");
            cancel.cancel();
            worker.await
        }
    };

    match outcome {
        Ok(Ok(report)) => {
            if let Some(path) = &report.screenshot_path {
                println!("Saved screenshot: {}", path.display());
            }
            println!("Successfully created PDF: {}", report.output_path.display());
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("Error: render task failed: {e}");
            ExitCode::FAILURE
        }
    }
}
