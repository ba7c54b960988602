use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use kdam::{tqdm, BarExt};
use log::{info, warn};

use crate::codecs::Codec;
use crate::disk_usage::disk_usage_mb;
use crate::error::SetupError;
use crate::fstools::{ensure_dir, list_files};
use crate::job::{Batch, Job, Mode};
use crate::metrics::MetricRecord;
use crate::runner::{CommandLine, CommandRunner};

/// Where the source images live and where each codec's output goes.
#[derive(Clone, Debug)]
pub struct Layout {
    pub root: PathBuf,
    pub input_dir: PathBuf,
    /// Extension of the source images, without the dot.
    pub input_extension: String,
}

impl Layout {
    pub fn new(root: PathBuf) -> Self {
        Layout {
            root,
            input_dir: PathBuf::from("tiff_files"),
            input_extension: String::from("tiff"),
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.root.join(&self.input_dir)
    }

    pub fn input_suffix(&self) -> String {
        format!(".{}", self.input_extension.trim_start_matches('.'))
    }

    pub fn compressed_dir(&self, codec: Codec) -> PathBuf {
        self.root.join(codec.compressed_dir_name())
    }

    pub fn decompressed_dir(&self, codec: Codec) -> PathBuf {
        self.root.join(codec.decompressed_dir_name())
    }
}

/// One batch per codec over every source image.
pub fn plan_compression(layout: &Layout, codecs: &[Codec]) -> Result<Vec<Batch>, SetupError> {
    let input_dir = layout.input_path();
    let files = list_files(&input_dir, &layout.input_suffix())?;
    if files.is_empty() {
        warn!("No {} files found in {:?}.", layout.input_suffix(), input_dir);
    }
    Ok(codecs.iter().map(|&codec| Batch {
        codec,
        mode: Mode::Compress,
        input_dir: input_dir.clone(),
        output_dir: layout.compressed_dir(codec),
        output_extension: String::from(codec.extension()),
        files: files.clone(),
    }).collect())
}

/// One batch per codec over whatever that codec's compression batch left behind.
pub fn plan_decompression(layout: &Layout, codecs: &[Codec]) -> Vec<Batch> {
    codecs.iter().map(|&codec| {
        let input_dir = layout.compressed_dir(codec);
        let files = match list_files(&input_dir, codec.extension()) {
            Ok(files) => files,
            Err(err) => {
                warn!("{}; nothing to decompress for {}.", err, codec.extension());
                vec![]
            },
        };
        Batch {
            codec,
            mode: Mode::Decompress,
            input_dir,
            output_dir: layout.decompressed_dir(codec),
            output_extension: layout.input_suffix(),
            files,
        }
    }).collect()
}

pub struct Benchmarker<'a, R: CommandRunner> {
    runner: &'a R,
    stop: Arc<AtomicBool>,
    progress: bool,
}

impl<'a, R: CommandRunner> Benchmarker<'a, R> {
    pub fn new(runner: &'a R, stop: Arc<AtomicBool>) -> Self {
        Benchmarker {
            runner,
            stop,
            progress: false,
        }
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Programs needed by `batches` that do not answer their version flag.
    pub fn missing_tools(&self, batches: &[Batch]) -> Vec<&'static str> {
        let mut checked = vec![];
        let mut missing = vec![];
        for batch in batches {
            let (program, version_flag) = batch.codec.tools(batch.mode == Mode::Compress);
            if checked.contains(&program) {
                continue;
            }
            checked.push(program);
            if !self.runner.is_installed(program, version_flag) {
                missing.push(program);
            }
        }
        missing
    }

    /// Creates every output directory, then runs the batches in order.
    pub fn run_pass(&self, batches: &[Batch]) -> Result<Vec<MetricRecord>, SetupError> {
        for batch in batches {
            ensure_dir(&batch.output_dir)?;
        }

        let mut records = vec![];
        for batch in batches {
            if self.should_stop() {
                warn!("Stop requested; skipping the remaining batches.");
                break;
            }
            records.push(self.run_batch(batch));
        }
        Ok(records)
    }

    pub fn run_batch(&self, batch: &Batch) -> MetricRecord {
        info!("Benchmarking {} for: {}", batch.mode, batch.format());
        let mut record = MetricRecord::new(batch.format(), batch.mode);
        let mut pbar = tqdm!(
            total = batch.files.len(),
            desc = format!("{} {}", batch.mode, batch.codec),
            position = 0,
            disable = !self.progress
        );

        let start = Instant::now();
        for job in batch.jobs() {
            if self.should_stop() {
                warn!("Stop requested; ending {} batch for {} early.", batch.mode, batch.format());
                break;
            }
            let command = job.command();
            info!("{}", progress_line(&job, &command));
            if let Err(err) = self.runner.run(&command) {
                warn!("{}", err);
                record.failures += 1;
            }
            record.files += 1;
            let _ = pbar.update(1);
        }
        record.elapsed = start.elapsed();

        if self.progress {
            eprintln!();
        }

        record.disk_usage_mb = match disk_usage_mb(self.runner, &batch.output_dir) {
            Ok(mb) => Some(mb),
            Err(err) => {
                warn!("{}", err);
                None
            },
        };
        record
    }
}

fn progress_line(job: &Job, command: &CommandLine) -> String {
    format!("{} -> {}, command: {}", job.source.display(), job.destination.display(), command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use crate::runner::fake::FakeRunner;

    fn layout_with_sources(names: &[&str]) -> (tempfile::TempDir, Layout) {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().to_path_buf());
        fs::create_dir(layout.input_path()).unwrap();
        for name in names {
            fs::write(layout.input_path().join(name), b"raw").unwrap();
        }
        (tmp, layout)
    }

    fn count_files(dir: &std::path::Path) -> usize {
        fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    fn not_stopped() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_compression_produces_one_file_per_job() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff", "b.tiff", "c.tiff", "readme.txt"]);
        let batches = plan_compression(&layout, &Codec::ALL).unwrap();
        let runner = FakeRunner::new();
        let records = Benchmarker::new(&runner, not_stopped()).run_pass(&batches).unwrap();

        assert_eq!(records.len(), 4);
        for codec in Codec::ALL {
            assert_eq!(count_files(&layout.compressed_dir(codec)), 3);
        }
        assert!(layout.compressed_dir(Codec::Felics).join("b.fel").exists());
        for record in &records {
            assert_eq!(record.files, 3);
            assert_eq!(record.failures, 0);
            assert_eq!(record.disk_usage_mb, Some(3));
            assert_eq!(record.mode, Mode::Compress);
        }
        let formats: Vec<&str> = records.iter().map(|r| r.format.as_str()).collect();
        assert_eq!(formats, vec![".png", ".webp", ".fel", ".qoi"]);
    }

    #[test]
    fn test_existing_output_dir_is_reused() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff"]);
        let to_png = layout.compressed_dir(Codec::Png);
        fs::create_dir(&to_png).unwrap();
        fs::write(to_png.join("old.png"), b"old").unwrap();

        let batches = plan_compression(&layout, &[Codec::Png]).unwrap();
        let runner = FakeRunner::new();
        Benchmarker::new(&runner, not_stopped()).run_pass(&batches).unwrap();
        assert!(to_png.join("old.png").exists());
        assert!(to_png.join("a.png").exists());
    }

    #[test]
    fn test_failing_tool_does_not_stop_the_pass() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff", "b.tiff"]);
        let batches = plan_compression(&layout, &Codec::ALL).unwrap();
        let runner = FakeRunner::new().failing("cwebp");
        let records = Benchmarker::new(&runner, not_stopped()).run_pass(&batches).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[1].failures, 2);
        assert_eq!(records[1].files, 2);
        assert_eq!(count_files(&layout.compressed_dir(Codec::WebP)), 0);
        assert_eq!(count_files(&layout.compressed_dir(Codec::Qoi)), 2);
    }

    #[test]
    fn test_missing_disk_usage_is_recorded_as_none() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff"]);
        let batches = plan_compression(&layout, &[Codec::Qoi]).unwrap();
        let mut runner = FakeRunner::new();
        runner.disk_usage_mb = None;
        let records = Benchmarker::new(&runner, not_stopped()).run_pass(&batches).unwrap();
        assert_eq!(records[0].disk_usage_mb, None);
    }

    #[test]
    fn test_stop_flag_ends_pass() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff", "b.tiff"]);
        let batches = plan_compression(&layout, &Codec::ALL).unwrap();
        let runner = FakeRunner::new();
        let stop = Arc::new(AtomicBool::new(true));
        let benchmarker = Benchmarker::new(&runner, Arc::clone(&stop));

        let record = benchmarker.run_batch(&batches[0]);
        assert_eq!(record.files, 0);
        assert!(benchmarker.run_pass(&batches).unwrap().is_empty());
        assert!(!runner.programs().contains(&String::from("convert")));
        // output directories are still prepared
        assert!(layout.compressed_dir(Codec::Qoi).is_dir());
    }

    #[test]
    fn test_elapsed_grows_with_file_count() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff", "b.tiff", "c.tiff", "d.tiff"]);
        let mut runner = FakeRunner::new();
        runner.delay = Duration::from_millis(5);
        let benchmarker = Benchmarker::new(&runner, not_stopped());

        let mut batch = plan_compression(&layout, &[Codec::Png]).unwrap().remove(0);
        ensure_dir(&batch.output_dir).unwrap();
        let four = benchmarker.run_batch(&batch);
        batch.files.truncate(1);
        let one = benchmarker.run_batch(&batch);

        assert!(one.elapsed >= Duration::from_millis(5));
        assert!(four.elapsed >= Duration::from_millis(20));
        assert!(four.elapsed > one.elapsed);
    }

    #[test]
    fn test_decompression_after_compression() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff", "b.tiff"]);
        let runner = FakeRunner::new();
        let benchmarker = Benchmarker::new(&runner, not_stopped());
        benchmarker.run_pass(&plan_compression(&layout, &[Codec::WebP, Codec::Felics]).unwrap()).unwrap();

        let batches = plan_decompression(&layout, &[Codec::WebP, Codec::Felics, Codec::Qoi]);
        assert_eq!(batches[0].files, vec!["a.webp", "b.webp"]);
        assert!(batches[2].files.is_empty());

        let records = benchmarker.run_pass(&batches).unwrap();
        assert_eq!(records.len(), 3);
        assert!(layout.decompressed_dir(Codec::WebP).join("a.tiff").exists());
        assert!(layout.decompressed_dir(Codec::Felics).join("b.tiff").exists());
        assert_eq!(records[2].files, 0);
        assert!(runner.programs().contains(&String::from("dwebp")));
        assert!(runner.programs().contains(&String::from("dfelics")));
    }

    #[test]
    fn test_missing_input_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().to_path_buf());
        assert!(plan_compression(&layout, &Codec::ALL).is_err());
    }

    #[test]
    fn test_missing_tools() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff"]);
        let batches = plan_compression(&layout, &Codec::ALL).unwrap();
        let runner = FakeRunner::new().failing("cfelics");
        let benchmarker = Benchmarker::new(&runner, not_stopped());
        assert_eq!(benchmarker.missing_tools(&batches), vec!["cfelics"]);
        // convert is shared by png and qoi and checked once
        assert_eq!(runner.programs().iter().filter(|p| p.as_str() == "convert").count(), 1);
    }

    #[test]
    fn test_progress_line() {
        let (_tmp, layout) = layout_with_sources(&["a.tiff"]);
        let batch = plan_compression(&layout, &[Codec::Png]).unwrap().remove(0);
        let job = batch.jobs().next().unwrap();
        let source = layout.input_path().join("a.tiff");
        let destination = layout.compressed_dir(Codec::Png).join("a.png");
        assert_eq!(
            progress_line(&job, &job.command()),
            format!("{0} -> {1}, command: convert {0} -quality 100 {1}", source.display(), destination.display()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_source_is_benchmarked() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_tmp, layout) = layout_with_sources(&["a.tiff"]);
        fs::write(layout.input_path().join(OsStr::from_bytes(b"caf\xe9.tiff")), b"raw").unwrap();
        let batches = plan_compression(&layout, &[Codec::Png]).unwrap();
        let runner = FakeRunner::new();
        let records = Benchmarker::new(&runner, not_stopped()).run_pass(&batches).unwrap();

        assert_eq!(records[0].files, 2);
        assert!(layout.compressed_dir(Codec::Png).join(OsStr::from_bytes(b"caf\xe9.png")).exists());
    }

    #[test]
    fn test_input_suffix() {
        let mut layout = Layout::new(PathBuf::from("."));
        assert_eq!(layout.input_suffix(), ".tiff");
        layout.input_extension = String::from(".jpg");
        assert_eq!(layout.input_suffix(), ".jpg");
    }
}
