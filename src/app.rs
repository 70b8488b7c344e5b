use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};

use crate::config;
use crate::data::{FileThreadSource, NoopGrowthCallback, NoopRenderer, ThreadSource};
use crate::post::Post;
use crate::projection::{ListProjection, PostViewMode, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Help,
    Show(ShowOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowOptions {
    pub thread_file: PathBuf,
    pub config_file: Option<PathBuf>,
    pub filter: Option<Vec<i64>>,
    pub highlight: Option<HighlightArg>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightArg {
    No(i64),
    Id(String),
}

pub const USAGE: &str = "threadview — print the rows of a discussion thread.\n\n\
Usage: threadview [OPTIONS] <THREAD.json>\n\n\
  --config PATH        Read configuration from PATH\n\
  --filter 1,2,3       Only show posts with these numbers\n\
  --highlight-no N     Highlight the post numbered N\n\
  --highlight-id ID    Highlight posts with this poster id\n\
  --error MSG          Show MSG on the status row\n\
  --version, -V        Show version and exit\n\
  --help,    -h        Show this help message";

pub fn parse_args<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut options = ShowOptions::default();
    let mut thread_file: Option<PathBuf> = None;
    let mut args = args.into_iter().map(Into::<String>::into);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            "--config" => {
                options.config_file = Some(PathBuf::from(expect_value(&mut args, &arg)?));
            }
            "--filter" => {
                let raw = expect_value(&mut args, &arg)?;
                options.filter = Some(parse_numbers(&raw)?);
            }
            "--highlight-no" => {
                let raw = expect_value(&mut args, &arg)?;
                let no = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("invalid post number {raw:?}"))?;
                options.highlight = Some(HighlightArg::No(no));
            }
            "--highlight-id" => {
                options.highlight = Some(HighlightArg::Id(expect_value(&mut args, &arg)?));
            }
            "--error" => {
                options.error = Some(expect_value(&mut args, &arg)?);
            }
            other if other.starts_with('-') => bail!("unknown option {other}"),
            _ => {
                if thread_file.is_some() {
                    bail!("only one thread file may be given");
                }
                thread_file = Some(PathBuf::from(&arg));
            }
        }
    }

    match thread_file {
        Some(path) => {
            options.thread_file = path;
            Ok(Command::Show(options))
        }
        None => bail!("missing thread file\n\n{USAGE}"),
    }
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{flag} requires a value"))
}

fn parse_numbers(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("invalid post number {s:?}"))
        })
        .collect()
}

pub fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(options: ShowOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    init_logging(&cfg.log.level);

    let source = Arc::new(
        FileThreadSource::open(&options.thread_file, cfg.view.default_loadable_mode())
            .context("open thread")?,
    );
    tracing::info!(
        path = %source.path().display(),
        posts = source.posts().len(),
        thread_mode = source.is_thread_mode(),
        "thread loaded"
    );

    let mut projection = ListProjection::new(
        source.clone(),
        Arc::new(NoopGrowthCallback),
        Arc::new(NoopRenderer),
    );
    projection.set_post_view_mode(cfg.view.mode);
    apply_options(&mut projection, &options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_rows(&mut projection, &mut out)?;
    out.flush().context("flush output")?;
    Ok(())
}

pub fn apply_options(projection: &mut ListProjection, options: &ShowOptions) {
    projection.reload();

    if let Some(nos) = options.filter.as_ref() {
        let allowed: Vec<Arc<Post>> = nos
            .iter()
            .map(|no| Arc::new(Post::new(String::new(), *no)))
            .collect();
        projection.apply_filter(&allowed);
    }

    match options.highlight.as_ref() {
        Some(HighlightArg::No(no)) => projection.highlight_post_no(*no),
        Some(HighlightArg::Id(id)) => projection.highlight_post_id(id.clone()),
        None => {}
    }

    if options.error.is_some() {
        projection.show_error(options.error.clone());
    }
}

pub fn write_rows<W: Write>(projection: &mut ListProjection, out: &mut W) -> Result<()> {
    for position in 0..projection.row_count() {
        let Some(row) = projection.bind_row(position) else {
            continue;
        };
        match row {
            Row::Post {
                post,
                highlighted,
                view_mode,
            } => {
                let marker = if highlighted { "*" } else { " " };
                let line = match view_mode {
                    PostViewMode::List => {
                        format!("#{} {} {}", post.no, marker, post.headline())
                    }
                    PostViewMode::Card => format!(
                        "#{} {} [{}] {} {}",
                        post.no,
                        marker,
                        post.id,
                        format_time(post.time),
                        post.headline()
                    ),
                };
                writeln!(out, "{}", line.trim_end()).context("write row")?;
            }
            Row::Status { error } => {
                let status = match error {
                    Some(message) => format!("[status] error: {message}"),
                    None => format!("[status] {} posts", projection.source().len()),
                };
                writeln!(out, "{status}").context("write status row")?;
            }
        }
    }
    Ok(())
}

fn format_time(time: i64) -> String {
    if time <= 0 {
        return "-".to_string();
    }
    Utc.timestamp_opt(time, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
