//! Trace level dump of an inbound request.
//!
//! Useful for inspecting requests during development. Every call returns
//! immediately when trace logging is disabled for the given logger.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, Log, Metadata, Record};

pub mod error;
pub mod view;
pub mod writer;

pub use error::{FieldError, FieldResult, TraceError};
pub use view::{BaseRequest, WebRequest};
pub use writer::NONE_MARKER;

use crate::dto::Session;
use writer::{Delimiter, TraceWriter};

/// A `log` sink paired with the target the trace is reported under.
#[derive(Clone, Copy)]
pub struct Logger<'a> {
    inner: &'a dyn Log,
    target: &'a str,
    global: bool,
}

impl<'a> Logger<'a> {
    pub fn new(inner: &'a dyn Log, target: &'a str) -> Self {
        Logger {
            inner,
            target,
            global: false,
        }
    }

    /// Logger backed by the globally installed `log` implementation.
    pub fn global(target: &'a str) -> Logger<'a> {
        Logger {
            inner: log::logger(),
            target,
            global: true,
        }
    }

    pub fn target(&self) -> &str {
        self.target
    }

    pub fn is_trace_enabled(&self) -> bool {
        // the global max level only gates the global logger
        if self.global && Level::Trace > log::max_level() {
            return false;
        }
        let metadata = Metadata::builder()
            .level(Level::Trace)
            .target(self.target)
            .build();
        self.inner.enabled(&metadata)
    }

    /// Emit a trace record located at the caller.
    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.trace_at(args, Location::caller())
    }

    fn trace_at(&self, args: fmt::Arguments<'_>, location: &'static Location<'static>) {
        self.inner.log(
            &Record::builder()
                .args(args)
                .level(Level::Trace)
                .target(self.target)
                .file_static(Some(location.file()))
                .line(Some(location.line()))
                .build(),
        );
    }
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .field("global", &self.global)
            .finish()
    }
}

/// Log the state of `request` at trace level.
///
/// Never fails: if the request cannot be rendered or the sink fails while
/// taking the record, a single line naming the request and the cause is
/// logged instead of the full dump. A panic raised by the request or the
/// sink is contained here, though the process panic hook still reports it.
#[track_caller]
pub fn trace_log(log: &Logger<'_>, request: &dyn BaseRequest) {
    if !log.is_trace_enabled() {
        return;
    }
    let location = Location::caller();

    let outcome = guarded(|| {
        let trace = render(request)?;
        log.trace_at(format_args!("{}", trace), location);
        Ok(())
    });
    if let Err(err) = outcome {
        // the sink may be the thing that failed
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            log.trace_at(
                format_args!("error in trace_log({:?}): {}", request, err),
                location,
            )
        }));
    }
}

/// Same as [`trace_log`], through the global logger.
#[track_caller]
pub fn trace_request(target: &str, request: &dyn BaseRequest) {
    trace_log(&Logger::global(target), request)
}

// Runs `f`, turning a panic inside a request accessor or the sink into an error
fn guarded<T, F>(f: F) -> Result<T, TraceError>
where
    F: FnOnce() -> Result<T, TraceError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TraceError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}

fn render(request: &dyn BaseRequest) -> Result<String, TraceError> {
    let mut trace = TraceWriter::new("Request");

    trace.optional("remote_addr", request.remote_addr());

    trace.open("parameters", Delimiter::Brace);
    for (name, values) in request.parameters()? {
        trace.field(&name, format_args!("[{}]", values.join(", ")));
    }
    trace.close();

    if let Some(web) = request.as_web() {
        render_web(&mut trace, web)?;
    }

    trace.optional("protocol", request.protocol());
    trace.optional("remote_host", request.remote_host());
    trace.field("remote_port", request.remote_port());
    trace.optional("scheme", request.scheme());
    trace.optional("server_name", request.server_name());
    trace.field("server_port", request.server_port());
    trace.field("secure", request.is_secure());

    trace.optional("character_encoding", request.character_encoding());
    trace.optional("content_length", request.content_length());
    trace.optional("content_type", request.content_type());
    trace.optional("local_addr", request.local_addr());
    trace.field("local_port", request.local_port());

    trace.open("attributes", Delimiter::Brace);
    for (name, value) in request.attributes()? {
        trace.field(&name, value);
    }
    trace.close();

    Ok(trace.finish())
}

fn render_web(trace: &mut TraceWriter, web: &dyn WebRequest) -> Result<(), TraceError> {
    trace.open("WebRequest", Delimiter::Brace);

    trace.optional("request_uri", web.request_uri());
    trace.optional("query_string", web.query_string());
    trace.optional("method", web.method());
    trace.optional("requested_session_id", web.requested_session_id());
    trace.field(
        "requested_session_id_valid",
        web.is_requested_session_id_valid(),
    );

    trace.open("session", Delimiter::Brace);
    match web.session()? {
        None => trace.entry("NONE"),
        Some(session) => render_session(trace, session)?,
    }
    trace.close();

    trace.open("cookies", Delimiter::Brace);
    match web.cookies()? {
        None => trace.entry("NONE"),
        Some(cookies) => {
            for cookie in cookies {
                trace.open(&cookie.name, Delimiter::Brace);
                trace.optional("comment", cookie.comment.as_deref());
                trace.optional("domain", cookie.domain.as_deref());
                trace.optional("max_age", cookie.max_age);
                trace.optional("path", cookie.path.as_deref());
                trace.field("secure", cookie.secure);
                trace.field("value", &cookie.value);
                trace.field("http_only", cookie.http_only);
                trace.close();
            }
        }
    }
    trace.close();

    trace.open("headers", Delimiter::Brace);
    for name in web.header_names()? {
        trace.open(&name, Delimiter::Bracket);
        for value in web.headers(&name)? {
            trace.entry(value);
        }
        trace.close();
    }
    trace.close();

    trace.optional("request_url", web.request_url());
    trace.optional("remote_user", web.remote_user());
    trace.optional("auth_type", web.auth_type());
    trace.optional("context_path", web.context_path());
    trace.optional("servlet_path", web.servlet_path());
    trace.optional("path_info", web.path_info());
    trace.optional("path_translated", web.path_translated());
    trace.field(
        "requested_session_id_from_cookie",
        web.is_requested_session_id_from_cookie(),
    );
    trace.field(
        "requested_session_id_from_url",
        web.is_requested_session_id_from_url(),
    );

    trace.close();
    Ok(())
}

fn render_session(trace: &mut TraceWriter, session: &Session) -> Result<(), TraceError> {
    trace.field("id", &session.id);
    trace.field(
        "creation_time",
        format_timestamp("creation_time", session.creation_time)?,
    );
    trace.field(
        "last_accessed_time",
        format_timestamp("last_accessed_time", session.last_accessed_time)?,
    );
    trace.field("max_inactive_interval", session.max_inactive_interval);
    trace.field("is_new", session.is_new);

    trace.open("attributes", Delimiter::Brace);
    for (name, value) in session.attributes.iter() {
        trace.field(name, value);
    }
    trace.close();
    Ok(())
}

// ISO-8601 combined date and time in UTC, with milliseconds
fn format_timestamp(field: &str, millis: i64) -> Result<String, FieldError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| FieldError::malformed(field, format!("timestamp {} is out of range", millis)))
}
