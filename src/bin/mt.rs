use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mt::{FfmpegLogLevel, ProgressCallback, ProgressInfo, Settings, SheetGenerator, Stage};

const CLI_AFTER_HELP: &str = "Examples:\n  mt movie.mp4\n  mt -n 16 -c 4 --header-meta movie.mkv\n  mt -b --filter greyscale -o '%s.sheet.png' *.mp4\n  mt --completions zsh > _mt\n\nSettings are read from mt.json in /etc/mt/, ~/.mt/ or ./, then MT_* environment variables, then flags.";

#[derive(Debug, Parser)]
#[command(
    name = "mt",
    version,
    about = "Generate contact sheets (thumbnail grids) from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video files.
    #[arg(required_unless_present = "completions")]
    inputs: Vec<PathBuf>,

    /// Number of captures to make.
    #[arg(short = 'n', long)]
    numcaps: Option<u32>,

    /// Number of columns in the grid.
    #[arg(short = 'c', long)]
    columns: Option<u32>,

    /// Padding between and around thumbnails in px.
    #[arg(short = 'p', long)]
    padding: Option<u32>,

    /// Width of a single thumbnail in px (0 derives it from --height).
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Height of a single thumbnail in px (used when width is 0).
    #[arg(long)]
    height: Option<u32>,

    /// Font name or path for timestamps and header.
    #[arg(short = 'f', long)]
    font: Option<String>,

    /// Font size in points.
    #[arg(long)]
    font_size: Option<u32>,

    /// Do not stamp timestamps onto thumbnails.
    #[arg(short = 'd', long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    disable_timestamps: Option<bool>,

    /// Opacity of the timestamp stamps (0.0 to 1.0).
    #[arg(long)]
    timestamp_opacity: Option<f32>,

    /// Output file name template; %s is replaced by the input path.
    #[arg(short = 'o', long)]
    filename: Option<String>,

    /// Show debug logging.
    #[arg(short = 'v', long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    verbose: Option<bool>,

    /// Save one image per capture instead of a contact sheet.
    #[arg(short = 's', long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    single_images: Option<bool>,

    /// Grid background color as R,G,B.
    #[arg(long)]
    bg_content: Option<String>,

    /// Show the metadata header.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    header: Option<bool>,

    /// Header background color as R,G,B.
    #[arg(long)]
    bg_header: Option<String>,

    /// Header text color as R,G,B.
    #[arg(long)]
    fg_header: Option<String>,

    /// Image shown at the right edge of the header.
    #[arg(long)]
    header_image: Option<String>,

    /// Add frame rate, bitrate and codec lines to the header.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    header_meta: Option<bool>,

    /// Image blended onto the middle thumbnail.
    #[arg(long)]
    watermark: Option<String>,

    /// Thumbnail filter (none, greyscale, invert).
    #[arg(long)]
    filter: Option<String>,

    /// Retry captures that land on blank frames.
    #[arg(short = 'b', long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    skip_blank: Option<bool>,

    /// Worker threads for thumbnail processing (0 = one per CPU).
    #[arg(long)]
    threads: Option<usize>,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Print shell completions and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    /// The command line as the highest-priority settings layer.
    fn settings(&self) -> Settings {
        Settings {
            numcaps: self.numcaps,
            columns: self.columns,
            padding: self.padding,
            width: self.width,
            height: self.height,
            font_all: self.font.clone(),
            font_size: self.font_size,
            disable_timestamps: self.disable_timestamps,
            timestamp_opacity: self.timestamp_opacity,
            filename: self.filename.clone(),
            verbose: self.verbose,
            bg_content: self.bg_content.clone(),
            single_images: self.single_images,
            header: self.header,
            bg_header: self.bg_header.clone(),
            fg_header: self.fg_header.clone(),
            header_image: self.header_image.clone(),
            header_meta: self.header_meta,
            watermark: self.watermark.clone(),
            filter: self.filter.clone(),
            skip_blank: self.skip_blank,
            threads: self.threads,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
    mt::set_ffmpeg_log_level(FfmpegLogLevel::for_filter(log::max_level()));
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg:>10} {bar:40.cyan/blue} {pos}/{len}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let message = match info.stage {
            Stage::Sampling => "sampling",
            Stage::Processing => "processing",
            _ => "working",
        };
        self.bar.set_message(message);
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "mt", &mut std::io::stdout());
        return Ok(());
    }

    let settings = Settings::discover()?
        .overlay(Settings::from_env(|key| std::env::var(key).ok()))
        .overlay(cli.settings());
    init_logging(settings.is_verbose());

    let options = settings.into_options()?;
    log::debug!("{options:?}");

    let mut generator = SheetGenerator::new(options)?;
    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        generator = generator.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let report = generator.run_batch(&cli.inputs);

    if let Some(progress) = progress {
        progress.bar.finish_and_clear();
    }

    for output in &report.succeeded {
        for path in &output.written {
            println!("{} {}", "saved".green().bold(), path.display());
        }
    }
    for (input, error) in &report.failed {
        eprintln!(
            "{} {}",
            "failed:".red().bold(),
            format!("{}: {error}", input.display()).red()
        );
    }

    if report.is_success() {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!("{} file(s) processed", report.succeeded.len()).green()
        );
        Ok(())
    } else {
        Err(format!(
            "{} of {} file(s) failed",
            report.failed.len(),
            cli.inputs.len()
        )
        .into())
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn flags_left_unset_stay_unset() {
        let cli = Cli::try_parse_from(["mt", "movie.mp4"]).unwrap();
        let settings = cli.settings();
        assert_eq!(settings.numcaps, None);
        assert_eq!(settings.header, None);
        assert_eq!(settings.skip_blank, None);
        assert_eq!(cli.inputs.len(), 1);
    }

    #[test]
    fn short_flags_map_to_settings() {
        let cli = Cli::try_parse_from([
            "mt", "-n", "9", "-c", "3", "-p", "0", "-w", "320", "-b", "-s", "a.mp4", "b.mp4",
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.numcaps, Some(9));
        assert_eq!(settings.columns, Some(3));
        assert_eq!(settings.padding, Some(0));
        assert_eq!(settings.width, Some(320));
        assert_eq!(settings.skip_blank, Some(true));
        assert_eq!(settings.single_images, Some(true));
        assert_eq!(cli.inputs.len(), 2);
    }

    #[test]
    fn boolean_flags_accept_explicit_values() {
        let cli =
            Cli::try_parse_from(["mt", "--header=false", "--header-meta", "movie.mp4"]).unwrap();
        assert_eq!(cli.header, Some(false));
        assert_eq!(cli.header_meta, Some(true));
        assert_eq!(cli.inputs, vec![std::path::PathBuf::from("movie.mp4")]);
    }

    #[test]
    fn inputs_are_required_without_completions() {
        assert!(Cli::try_parse_from(["mt"]).is_err());
        assert!(Cli::try_parse_from(["mt", "--completions", "bash"]).is_ok());
    }

    #[test]
    fn command_line_overrides_lower_layers() {
        let file = mt::Settings {
            numcaps: Some(12),
            columns: Some(4),
            ..mt::Settings::default()
        };
        let cli = Cli::try_parse_from(["mt", "-c", "2", "movie.mp4"]).unwrap();
        let merged = file.overlay(cli.settings());
        assert_eq!(merged.numcaps, Some(12));
        assert_eq!(merged.columns, Some(2));
    }
}
