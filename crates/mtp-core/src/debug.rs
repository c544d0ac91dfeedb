use core::fmt;
use std::sync::Once;
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;


#[macro_export]
macro_rules! unimplemented_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!(
            "unimplemented: {}",
            format_args!($($arg)*),
        );
    }};
}

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

struct AlignedFormatter;

/// Extracts the `link` field, so every line can be tagged with the link name
struct LinkVisitor {
    link: Option<String>,
}

impl tracing::field::Visit for LinkVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "link" {
            self.link = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "link" {
            self.link = Some(format!("{:?}", value).trim_matches('"').to_string());
        }
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let mut visitor = LinkVisitor { link: None };
        event.record(&mut visitor);
        let has_link = visitor.link.is_some();
        let link_str = format!("{:<6}", visitor.link.unwrap_or_default());

        let (color_level, color_reset) = match *metadata.level() {
            tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
            tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
            tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
            tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
            tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
        };

        // "crates/mtp-entities/src/mtp2/components/deframer.rs"
        // becomes "link [entities/mtp2] deframer.rs"
        let file_path = metadata.file().unwrap_or("unknown");
        let formatted_path = if let Some(src_idx) = file_path.find("/src/") {
            let before_src = &file_path[..src_idx];
            let after_src = &file_path[src_idx + 5..];

            let crate_name = if let Some(mtp_idx) = before_src.rfind("mtp-") {
                &before_src[mtp_idx + 4..]
            } else {
                before_src.rsplit('/').next().unwrap_or("unknown")
            };

            if let Some(last_slash) = after_src.rfind('/') {
                let module_path = &after_src[..last_slash];
                let filename = &after_src[last_slash + 1..];
                let first_module = module_path.split('/').next().unwrap_or("");
                format!("{} [{}/{}] {}", link_str, crate_name, first_module, filename)
            } else {
                format!("{} [{}] {}", link_str, crate_name, after_src)
            }
        } else {
            file_path.to_string()
        };

        let location = format!(
            "{}{:<5}{} {}:{}:",
            color_level,
            metadata.level(),
            color_reset,
            formatted_path,
            metadata.line().unwrap_or(0)
        );

        let mut message_buf = String::new();
        let message_writer = format::Writer::new(&mut message_buf);
        ctx.field_format().format_fields(message_writer, event)?;

        // The link tag is already printed in front, drop it from the field list
        if has_link {
            if let Some(link_idx) = message_buf.find("link=") {
                if let Some(space_idx) = message_buf[link_idx..].find(' ') {
                    message_buf.replace_range(link_idx..link_idx + space_idx + 1, "");
                } else {
                    message_buf.truncate(link_idx);
                }
            }
        }

        // Messages starting with "->" or "<-" are frames on the wire, indent them less
        let mut padding = 70;
        if message_buf.starts_with("->") || message_buf.starts_with("<-") {
            padding -= 3;
        }

        write!(writer, "{:<width$} {}", location, message_buf, width = padding)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

fn with_directives(mut filter: EnvFilter, directives: &[&str]) -> EnvFilter {
    for d in directives {
        match d.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("ignoring log directive {}: {}", d, e),
        }
    }
    filter
}

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_filter() -> EnvFilter {
    EnvFilter::new("info")
}

pub fn get_default_stdout_filter() -> EnvFilter {
    with_directives(EnvFilter::new("info"), &[
        // Router and bit pump run once per tick
        "mtp_entities::messagerouter=warn",
        "mtp_entities::phy=info",

        // Framing runs once per bit, only report problems
        "mtp_entities::mtp2::components=info",
        "mtp_entities::mtp2=debug",

        // Higher layers
        "mtp_entities::mtp3=debug",
    ])
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Sets up logging to stdout and optionally, a verbose log file
/// If an output file is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If no output file is provided, or it
/// cannot be opened, returns None.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {

    let file = match outfile {
        Some((path, filter)) => match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some((f, filter)),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}, logging to stdout only", path, e);
                None
            }
        },
        None => None,
    };

    if let Some((file, outfile_filter)) = file {
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(file_writer)
                .with_ansi(false);

            let stdout_layer = tracingfmt::layer()
                .event_format(AlignedFormatter);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Some(guard)
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer()
                .event_format(AlignedFormatter);

            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });
        None
    }
}
