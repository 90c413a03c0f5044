//! Reel CLI Tool
//!
//! Command-line interface for inspecting film feature files, resolving
//! time segments into feature records and querying the film database.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ndarray::{Array2, Axis};
use reel_core::film::DEFAULT_MOVIE_EXTENSION;
use reel_core::film_db::{self, ColorFilter};
use reel_core::grid::{self, GridSelector};
use reel_core::{AnalysisConfig, AnalysisConfigBuilder, FeatureFileWriter, FeatureKind, Film, TimeSpan};
use reel_probe::FfmpegProbe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Film feature files: time-aligned access to per-frame color and motion features")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding one sub-directory per film (default: ~/Movies/action)
    #[arg(long, global = true, env = "REEL_ACTION_DIR")]
    action_dir: Option<PathBuf>,

    /// Feature type to read
    #[arg(long, global = true, default_value = "color_lab")]
    kind: FeatureKind,

    /// Container extension of the source movies
    #[arg(long, global = true, default_value = DEFAULT_MOVIE_EXTENSION)]
    movie_ext: String,

    /// Configuration override, e.g. `stride=4` or `afps=23.976` (repeatable)
    #[arg(long = "param", global = true, value_name = "KEY=VALUE")]
    params: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show layout, record count, sidecar and length of a film's features
    Info {
        /// Film title
        title: String,
    },

    /// Print the length of a film in seconds
    Length {
        /// Film title
        title: String,
    },

    /// Resolve a time segment into feature records
    Segment {
        /// Film title
        title: String,

        /// Segment start in seconds
        #[arg(long, default_value = "0")]
        onset: f64,

        /// Segment length in seconds (negative or omitted = rest of the film)
        #[arg(long, allow_hyphen_values = true)]
        duration: Option<f64>,

        /// Segment end in seconds, instead of a duration
        #[arg(long, conflicts_with = "duration")]
        end: Option<f64>,

        /// Grid region selector (full, all, center-quad, middle-band, plus-band)
        #[arg(long)]
        selector: Option<String>,

        /// Keep only the luminance channel
        #[arg(long)]
        luminance: bool,

        /// Print the mean of every resolved record
        #[arg(long)]
        records: bool,
    },

    /// Probe a film's movie and write its metadata sidecar
    Probe {
        /// Film title
        title: String,

        /// Re-probe even if a sidecar exists
        #[arg(long)]
        force: bool,
    },

    /// Write metadata sidecars for every movie in the action directory
    Gather,

    /// List films from the database
    Films {
        /// Director code
        #[arg(long)]
        director: Option<String>,

        /// Color films only
        #[arg(long, conflicts_with = "bw")]
        color: bool,

        /// Black-and-white films only
        #[arg(long)]
        bw: bool,

        /// Release years, e.g. `1950-1959`
        #[arg(long)]
        years: Option<String>,
    },

    /// List director codes and names
    Directors,

    /// Write a synthetic feature file for a film
    Synth {
        /// Film title
        title: String,

        /// Number of records to write
        #[arg(long, default_value = "240")]
        records: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let source = &cli.source;

    match cli.command {
        Commands::Info { title } => show_info(source, &title)?,
        Commands::Length { title } => {
            let seconds = open_film(source, &title)?
                .determine_movie_length()
                .with_context(|| format!("Failed to determine the length of {title}"))?;
            println!("{seconds:.3}");
        }
        Commands::Segment {
            title,
            onset,
            duration,
            end,
            selector,
            luminance,
            records,
        } => {
            let span = match (end, duration) {
                (None, None) => TimeSpan::rest_of_film(onset),
                _ => TimeSpan::from_parts(onset, end, duration),
            }
            .context("Invalid segment")?;
            show_segment(source, &title, &span, selector.as_deref(), luminance, records)?;
        }
        Commands::Probe { title, force } => probe_film(source, &title, force)?,
        Commands::Gather => gather(source)?,
        Commands::Films {
            director,
            color,
            bw,
            years,
        } => {
            let filter = match (color, bw) {
                (true, _) => ColorFilter::Color,
                (_, true) => ColorFilter::BlackAndWhite,
                _ => ColorFilter::Any,
            };
            list_films(director.as_deref(), filter, years.as_deref())?;
        }
        Commands::Directors => {
            for code in film_db::available_directors() {
                let name = film_db::director_name(code).unwrap_or("?");
                let count = film_db::films_for_director(code).len();
                println!("{code:>6}  {name} ({count} films)");
            }
        }
        Commands::Synth { title, records } => synth(source, &title, records)?,
    }

    Ok(())
}

fn action_dir(source: &SourceArgs) -> Result<PathBuf> {
    if let Some(dir) = &source.action_dir {
        return Ok(dir.clone());
    }
    let home = std::env::var_os("HOME").context("HOME is not set; pass --action-dir")?;
    Ok(PathBuf::from(home).join("Movies").join("action"))
}

fn config_builder(source: &SourceArgs) -> Result<AnalysisConfigBuilder> {
    let mut builder = AnalysisConfig::builder(source.kind);
    for param in &source.params {
        let (key, value) = param
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{param}'"))?;
        builder = builder
            .set(key.trim(), value.trim())
            .with_context(|| format!("Invalid parameter '{param}'"))?;
    }
    Ok(builder)
}

fn open_film(source: &SourceArgs, title: &str) -> Result<Film> {
    let dir = action_dir(source)?;
    let film = Film::open(
        &dir,
        title,
        &source.movie_ext,
        config_builder(source)?,
        Box::new(FfmpegProbe::new()),
    )
    .with_context(|| format!("Failed to configure {title}"))?;
    log::debug!("{title}: {:?}", film.config());
    Ok(film)
}

fn show_info(source: &SourceArgs, title: &str) -> Result<()> {
    let film = open_film(source, title)?;
    let config = film.config();
    let layout = &config.layout;

    println!("Film: {}", film.title());
    if let Some(entry) = film_db::film_entry(title) {
        let director = film_db::director_name(entry.director).unwrap_or(entry.director);
        let year = entry.year.map_or_else(|| "unknown".to_string(), |y| y.to_string());
        let color = if entry.color { "color" } else { "black and white" };
        println!("  {director}, {year}, {color}");
    }

    println!("\nFeatures ({}):", config.kind);
    println!("  Path: {}", film.data_path().display());
    match layout.grid {
        Some(grid) => println!(
            "  Grid: {}x{} cells of {} channels x {} bins",
            grid.columns, grid.rows, layout.channels, layout.bins
        ),
        None => println!("  Grid: none"),
    }
    println!(
        "  Full frame: {} channels x {} bins ({:?})",
        layout.full_channels, layout.bins, layout.full_frame
    );
    println!(
        "  Record: {} values ({} bytes)",
        layout.record_width(),
        layout.record_bytes()
    );
    println!(
        "  Rates: nominal {} fps, stride {}, access {} fps ({} records/s)",
        config.nominal_fps,
        config.stride,
        config.access_fps,
        config.records_per_second()
    );

    match film.open_features() {
        Ok(file) => println!("  Records on disk: {}", file.record_count()),
        Err(e) => println!("  Records on disk: unavailable ({e})"),
    }

    println!("\nSidecar: {}", film.sidecar_path().display());
    match film.sidecar()? {
        Some(metadata) => println!(
            "  {} fps, {} frames, aspect {:.3}, {:.1} s",
            metadata.fps, metadata.frames, metadata.aspect, metadata.length
        ),
        None => println!("  not written"),
    }

    match film.determine_movie_length() {
        Ok(seconds) => println!("\nLength: {seconds:.3} s"),
        Err(e) => println!("\nLength: unknown ({e})"),
    }

    Ok(())
}

fn show_segment(
    source: &SourceArgs,
    title: &str,
    span: &TimeSpan,
    selector: Option<&str>,
    luminance: bool,
    records: bool,
) -> Result<()> {
    let film = open_film(source, title)?;
    let selector: GridSelector = match selector {
        Some(name) => name.parse()?,
        None => GridSelector::default(),
    };

    let mut features = film
        .features_for_segment(span, selector)
        .with_context(|| format!("Failed to resolve {span} of {title}"))?;
    if luminance {
        let layout = &film.config().layout;
        features = grid::luminance_only(&features, layout.channels, layout.bins)
            .context("Luminance selection does not fit this layout")?;
    }

    let (rows, width) = features.dim();
    println!("{title} {span} [{selector}]: {rows} records x {width} values");
    if records {
        print_record_means(&features);
    }
    Ok(())
}

fn print_record_means(features: &Array2<f32>) {
    if let Some(means) = features.mean_axis(Axis(1)) {
        for (i, mean) in means.iter().enumerate() {
            println!("{i:>6}  {mean:.6}");
        }
    }
}

fn probe_film(source: &SourceArgs, title: &str, force: bool) -> Result<()> {
    let film = open_film(source, title)?;
    if force && film.sidecar_path().exists() {
        std::fs::remove_file(film.sidecar_path())
            .with_context(|| format!("Failed to remove {}", film.sidecar_path().display()))?;
    }
    let metadata = film
        .ensure_sidecar()
        .with_context(|| format!("Failed to probe {}", film.movie_path().display()))?;
    println!(
        "{}: {} fps, {} frames, aspect {:.3}, {:.1} s",
        metadata.title, metadata.fps, metadata.frames, metadata.aspect, metadata.length
    );
    Ok(())
}

fn gather(source: &SourceArgs) -> Result<()> {
    let dir = action_dir(source)?;
    let gathered = reel_probe::gather_sidecars(&dir, &source.movie_ext, &FfmpegProbe::new())
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let failed = gathered.iter().filter(|g| g.result.is_err()).count();
    println!(
        "{} sidecars ready, {} failed",
        gathered.len() - failed,
        failed
    );
    for entry in gathered.iter().filter(|g| g.result.is_err()) {
        println!("  {}: {}", entry.title, entry.movie_path.display());
    }
    Ok(())
}

fn parse_years(years: &str) -> Result<std::ops::RangeInclusive<u16>> {
    let (from, to) = years.split_once('-').unwrap_or((years, years));
    let from: u16 = from.trim().parse().context("Invalid start year")?;
    let to: u16 = to.trim().parse().context("Invalid end year")?;
    if from > to {
        bail!("Year range {from}-{to} is empty");
    }
    Ok(from..=to)
}

fn list_films(director: Option<&str>, filter: ColorFilter, years: Option<&str>) -> Result<()> {
    let years = years.map(parse_years).transpose()?;
    let directors = match director {
        Some(code) => {
            if film_db::director_name(code).is_none() {
                bail!("Unknown director code '{code}'");
            }
            vec![code]
        }
        None => film_db::available_directors(),
    };

    for (code, titles) in film_db::analysis_pool(&directors, filter) {
        println!("{}:", film_db::director_name(code).unwrap_or(code));
        for title in titles {
            let year = film_db::film_entry(title).and_then(|f| f.year);
            if let Some(range) = &years {
                if !year.is_some_and(|y| range.contains(&y)) {
                    continue;
                }
            }
            match year {
                Some(year) => println!("  {title} ({year})"),
                None => println!("  {title}"),
            }
        }
    }
    Ok(())
}

fn synth(source: &SourceArgs, title: &str, records: usize) -> Result<()> {
    let dir = action_dir(source)?;
    let film_dir = dir.join(title);
    std::fs::create_dir_all(&film_dir)
        .with_context(|| format!("Failed to create {}", film_dir.display()))?;

    let config = config_builder(source)?.build()?;
    let width = config.layout.record_width();
    let values = Array2::from_shape_fn((records, width), |(record, offset)| {
        record as f32 + offset as f32 / width as f32
    });

    let path = film_dir.join(format!("{title}.{}", config.kind.extension()));
    let mut writer = FeatureFileWriter::create(&path, config.layout)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_records(&values)?;
    let written = writer.finish()?;
    println!("Wrote {written} records to {}", path.display());
    Ok(())
}
