pub mod benchmarker;
pub mod codecs;
pub mod disk_usage;
pub mod error;
pub mod fstools;
pub mod job;
pub mod metrics;
pub mod options;
pub mod plot;
pub mod runner;

use std::ffi::c_int;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use kdam::term;
use log::{error, info, warn, Level};
use rustop::opts;
use signal_hook::consts::{SIGINT, SIGTERM};

use benchmarker::{plan_compression, plan_decompression, Benchmarker};
use error::SetupError;
use job::Batch;
use metrics::{MetricRecord, Report};
use options::BenchmarkOptions;
use plot::BarChart;
use runner::{CommandRunner, ProcessRunner};

fn main() -> ExitCode {
    let (args, _rest) = opts! {
        synopsis "Benchmark external image codecs: time batch compression/decompression and measure output size.";
        opt root:String=String::from("."), short:'r', desc:"Directory holding the input and output directories.";
        opt input_dir:String=String::from("tiff_files"), short:'i', desc:"Directory of source images, relative to root.";
        opt input_ext:String=String::from("tiff"), short:'e', desc:"Extension of the source images.";
        opt codecs:String=String::from("png,webp,felics,qoi"), short:'c', desc:"Codecs to benchmark. [png, webp, felics, qoi]";
        opt mode:String=String::from("both"), short:'m', desc:"Passes to run. [compress, decompress, both]";
        opt report:Option<String>, short:'o', desc:"Write the metrics as JSON to this file.";
        opt no_plot:bool=false, short:'n', desc:"Don't draw the bar charts.";
        opt progress:bool=false, short:'p', desc:"Show a progress bar per batch.";
        opt verbose:bool=false, short:'v', desc:"Log debug output.";
        opt chart_width:usize=50, short:'w', desc:"Width of the longest chart bar.";
    }.parse_or_exit();

    setup_logger(args.verbose);

    let mut options = match BenchmarkOptions::new(&args.root, &args.input_dir, &args.input_ext, &args.codecs, &args.mode) {
        Ok(options) => options,
        Err(msg) => {
            error!("{}", msg);
            return ExitCode::FAILURE;
        },
    };
    options.report = args.report.map(PathBuf::from);
    options.plot = !args.no_plot;
    options.progress = args.progress;
    options.chart_width = args.chart_width;

    let stop = Arc::new(AtomicBool::new(false));
    if let Err(err) = watch_signals(&[SIGINT, SIGTERM], &stop) {
        warn!("Unable to watch signals: {}", err);
    }

    if options.progress {
        term::init(false);
    }

    let runner = ProcessRunner::new();
    match run(&options, &runner, stop) {
        Ok(report) => {
            if options.plot {
                plot_report(&report, options.chart_width);
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        },
    }
}

fn setup_logger(verbose: bool) {
    let level = if verbose { Level::Debug } else { Level::Info };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("Unable to initialize logging: {}", err);
    }
}

/// The first signal raises `stop` so the pass ends after the running job; a
/// second one exits immediately.
fn watch_signals(signals: &[c_int], stop: &Arc<AtomicBool>) -> io::Result<()> {
    for &signal in signals {
        signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(stop))?;
        signal_hook::flag::register(signal, Arc::clone(stop))?;
    }
    Ok(())
}

fn run<R: CommandRunner>(options: &BenchmarkOptions, runner: &R, stop: Arc<AtomicBool>) -> Result<Report, SetupError> {
    let benchmarker = Benchmarker::new(runner, stop).progress(options.progress);
    let mut report = Report::default();

    if options.passes.compress() {
        let batches = plan_compression(&options.layout, &options.codecs)?;
        warn_missing_tools(&benchmarker, &batches);
        report.compression = benchmarker.run_pass(&batches)?;
        println!("Compression times: {}", Report::times(&report.compression));
        println!("Disk usages: {}", Report::usages(&report.compression));
    }

    if options.passes.decompress() && benchmarker.should_stop() {
        warn!("Stop requested; skipping decompression.");
    } else if options.passes.decompress() {
        let batches = plan_decompression(&options.layout, &options.codecs);
        warn_missing_tools(&benchmarker, &batches);
        report.decompression = benchmarker.run_pass(&batches)?;
        println!("Decompression times: {}", Report::times(&report.decompression));
    }

    if let Some(path) = &options.report {
        report.write_json(path)?;
        info!("Wrote report to {:?}", path);
    }
    Ok(report)
}

fn warn_missing_tools<R: CommandRunner>(benchmarker: &Benchmarker<R>, batches: &[Batch]) {
    for program in benchmarker.missing_tools(batches) {
        warn!("{} is not installed; its jobs will fail.", program);
    }
}

fn time_chart(ylabel: &str, records: &[MetricRecord], width: usize) -> BarChart {
    records.iter().fold(BarChart::new(ylabel, width), |chart, r| chart.bar(&r.format, r.elapsed.as_secs_f64()))
}

fn plot_report(report: &Report, width: usize) {
    if !report.compression.is_empty() {
        println!();
        print!("{}", time_chart("Compression elapsed time (seconds)", &report.compression, width));
        println!();
        let sizes = report.compression.iter()
            .fold(BarChart::new("Size (MB)", width), |chart, r| chart.bar(&r.format, r.disk_usage_mb.unwrap_or(0) as f64));
        print!("{}", sizes);
    }
    if !report.decompression.is_empty() {
        println!();
        print!("{}", time_chart("Decompression elapsed time (seconds)", &report.decompression, width));
    }
}
