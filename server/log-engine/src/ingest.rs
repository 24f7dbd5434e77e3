//! Log ingestion: turn files, directories and inline text into a lazy stream of records.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{Config, RecordMode};
use crate::error::IngestError;
use crate::types::LogRecord;

/// Lines buffered ahead of the consumer by a file reader thread.
const READ_AHEAD_LINES: usize = 256;

/// Leading "[YYYY-MM-DD HH:MM:SS" (bracket optional, `T` separator allowed).
fn timestamp_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^\[?(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2})").expect("static timestamp regex")
  })
}

/// Whether the line opens a new entry in timestamped mode.
fn is_entry_start(line: &str) -> bool {
  timestamp_re().is_match(line)
}

/// Parse the leading timestamp, if the line has a valid one.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
  let caps = timestamp_re().captures(line)?;
  let joined = format!("{} {}", &caps[1], &caps[2]);
  NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S").ok()
}

/// Line prefixes that delimit records in block mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRules {
  /// A matching line opens a new block.
  pub start: Vec<String>,
  /// Matching lines are dropped, inside or outside a block.
  pub skip: Vec<String>,
  /// A matching line is the last line of the open block. Leading whitespace
  /// is ignored, since caret markers are indented under the offending column.
  pub end: Vec<String>,
}

impl Default for BlockRules {
  fn default() -> Self {
    Self {
      start: vec!["[WARN".to_string(), "[ERROR".to_string()],
      skip: vec!["[INFO".to_string()],
      end: vec!["^^^".to_string()],
    }
  }
}

fn starts_with_any(line: &str, prefixes: &[String]) -> bool {
  prefixes.iter().any(|p| line.starts_with(p.as_str()))
}

/// How a source is read.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
  pub mode: RecordMode,
  /// Deadline for the whole source, open included.
  pub timeout: Option<Duration>,
  pub block: BlockRules,
}

impl From<&Config> for IngestOptions {
  fn from(config: &Config) -> Self {
    Self {
      mode: config.record_mode,
      timeout: config.ingest_timeout_ms.map(Duration::from_millis),
      block: BlockRules {
        start: config.block_start_prefixes.clone(),
        skip: config.block_skip_prefixes.clone(),
        end: config.block_end_prefixes.clone(),
      },
    }
  }
}

#[derive(Debug, Clone)]
enum SourceKind {
  File(PathBuf),
  Text(Arc<str>),
}

/// A handle to one log source. Cheap to clone; nothing is opened until
/// [`LogSource::records`] is called.
#[derive(Debug, Clone)]
pub struct LogSource {
  id: String,
  kind: SourceKind,
}

impl LogSource {
  pub fn file(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    Self {
      id: path.display().to_string(),
      kind: SourceKind::File(path),
    }
  }

  pub fn text(id: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
    Self {
      id: id.into(),
      kind: SourceKind::Text(text.into()),
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Open the source and return its records.
  ///
  /// Every call starts from the beginning. The underlying handle lives inside
  /// the returned iterator (or its reader thread) and is closed once the
  /// iterator is dropped, whether or not it was drained.
  ///
  /// With a timeout, files are opened and read on a dedicated thread so that a
  /// source blocked in `open` or `read` still yields [`IngestError::Timeout`].
  pub fn records(&self, opts: &IngestOptions) -> Result<Records, IngestError> {
    let deadline = opts
      .timeout
      .map(|t| (Instant::now() + t, t.as_millis() as u64));

    let feed = match (&self.kind, deadline) {
      (SourceKind::File(path), Some(deadline)) => {
        let rx = spawn_reader(path.clone(), &self.id)?;
        match recv_feed(&rx, Some(deadline), &self.id)? {
          Feed::Opened => LineFeed::Thread(rx),
          Feed::Failed(e) => return Err(IngestError::unreadable(&self.id, e)),
          Feed::Line(_) | Feed::Eof => {
            return Err(IngestError::unreadable(
              &self.id,
              io::Error::new(io::ErrorKind::Other, "reader thread out of order"),
            ))
          }
        }
      }
      (SourceKind::File(path), None) => {
        let file = File::open(path).map_err(|e| IngestError::unreadable(&self.id, e))?;
        LineFeed::Reader(Box::new(BufReader::new(file)))
      }
      (SourceKind::Text(text), _) => {
        LineFeed::Reader(Box::new(Cursor::new(ArcBytes(Arc::clone(text)))))
      }
    };
    debug!(source = %self.id, mode = ?opts.mode, "source opened");
    Ok(Records::new(self.id.clone(), feed, opts, deadline))
  }
}

/// Shares inline text with the reader without copying it.
struct ArcBytes(Arc<str>);

impl AsRef<[u8]> for ArcBytes {
  fn as_ref(&self) -> &[u8] {
    self.0.as_bytes()
  }
}

/// Messages from a file reader thread, in order: `Opened`, any `Line`s, then
/// `Eof` or `Failed`.
enum Feed {
  Opened,
  Line(Vec<u8>),
  Eof,
  Failed(io::Error),
}

/// Open and read `path` on its own thread. The thread exits once the
/// receiving side is dropped, closing the file with it.
fn spawn_reader(path: PathBuf, source_id: &str) -> Result<Receiver<Feed>, IngestError> {
  let (tx, rx) = channel::bounded(READ_AHEAD_LINES);
  thread::Builder::new()
    .name("log-ingest".to_string())
    .spawn(move || {
      let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
          let _ = tx.send(Feed::Failed(e));
          return;
        }
      };
      if tx.send(Feed::Opened).is_err() {
        return;
      }
      let mut reader = BufReader::new(file);
      loop {
        let mut buf = Vec::new();
        let msg = match reader.read_until(b'\n', &mut buf) {
          Ok(0) => Feed::Eof,
          Ok(_) => Feed::Line(buf),
          Err(e) => Feed::Failed(e),
        };
        let last = !matches!(msg, Feed::Line(_));
        if tx.send(msg).is_err() || last {
          return;
        }
      }
    })
    .map_err(|e| IngestError::unreadable(source_id, e))?;
  Ok(rx)
}

/// Wait for the next message, giving up at the deadline.
fn recv_feed(
  rx: &Receiver<Feed>,
  deadline: Option<(Instant, u64)>,
  source_id: &str,
) -> Result<Feed, IngestError> {
  let stopped = || {
    IngestError::unreadable(
      source_id,
      io::Error::new(io::ErrorKind::BrokenPipe, "reader thread stopped"),
    )
  };
  match deadline {
    Some((at, limit_ms)) => rx.recv_deadline(at).map_err(|e| match e {
      RecvTimeoutError::Timeout => IngestError::Timeout {
        source_id: source_id.to_string(),
        limit_ms,
      },
      RecvTimeoutError::Disconnected => stopped(),
    }),
    None => rx.recv().map_err(|_| stopped()),
  }
}

enum LineFeed {
  Reader(Box<dyn BufRead + Send>),
  Thread(Receiver<Feed>),
}

/// Lazy, finite stream of records from one source. Stops after the first error.
pub struct Records {
  source_id: String,
  feed: LineFeed,
  mode: RecordMode,
  block: BlockRules,
  deadline: Option<(Instant, u64)>,
  line_no: usize,
  buf: Vec<u8>,
  /// Record being assembled in timestamped and block modes.
  pending: Option<LogRecord>,
  done: bool,
}

impl Records {
  fn new(
    source_id: String,
    feed: LineFeed,
    opts: &IngestOptions,
    deadline: Option<(Instant, u64)>,
  ) -> Self {
    Self {
      source_id,
      feed,
      mode: opts.mode,
      block: opts.block.clone(),
      deadline,
      line_no: 0,
      buf: Vec::new(),
      pending: None,
      done: false,
    }
  }

  pub fn source_id(&self) -> &str {
    &self.source_id
  }

  /// Pull the next raw line into `buf`. `Ok(false)` at end of input.
  fn fill(&mut self) -> Result<bool, IngestError> {
    match &mut self.feed {
      LineFeed::Reader(reader) => {
        if let Some((deadline, limit_ms)) = self.deadline {
          if Instant::now() >= deadline {
            return Err(IngestError::Timeout {
              source_id: self.source_id.clone(),
              limit_ms,
            });
          }
        }
        self.buf.clear();
        let n = reader
          .read_until(b'\n', &mut self.buf)
          .map_err(|e| IngestError::unreadable(&self.source_id, e))?;
        Ok(n > 0)
      }
      LineFeed::Thread(rx) => loop {
        match recv_feed(rx, self.deadline, &self.source_id)? {
          Feed::Line(bytes) => {
            self.buf = bytes;
            return Ok(true);
          }
          Feed::Eof => return Ok(false),
          Feed::Failed(e) => return Err(IngestError::unreadable(&self.source_id, e)),
          Feed::Opened => continue,
        }
      },
    }
  }

  /// Read one line without its terminator. `Ok(None)` at end of input.
  fn read_line(&mut self) -> Result<Option<String>, IngestError> {
    if !self.fill()? {
      return Ok(None);
    }
    self.line_no += 1;

    if self.buf.contains(&0) {
      return Err(IngestError::Binary {
        source_id: self.source_id.clone(),
        line: self.line_no,
      });
    }

    while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
      self.buf.pop();
    }

    let line = match std::str::from_utf8(&self.buf) {
      Ok(s) => s.to_string(),
      Err(_) => {
        debug!(source = %self.source_id, line = self.line_no, "invalid utf-8, decoding lossily");
        String::from_utf8_lossy(&self.buf).into_owned()
      }
    };
    Ok(Some(line))
  }

  fn start_record(&self, text: String) -> LogRecord {
    LogRecord {
      source_id: self.source_id.clone(),
      line: self.line_no,
      timestamp: parse_timestamp(&text),
      text,
    }
  }

  fn next_line_record(&mut self) -> Result<Option<LogRecord>, IngestError> {
    loop {
      match self.read_line()? {
        None => return Ok(None),
        Some(line) if line.trim().is_empty() => continue,
        Some(line) => return Ok(Some(self.start_record(line))),
      }
    }
  }

  fn next_timestamped_record(&mut self) -> Result<Option<LogRecord>, IngestError> {
    loop {
      let line = match self.read_line()? {
        Some(line) => line,
        None => return Ok(self.pending.take().map(finish)),
      };

      if is_entry_start(&line) {
        let next = self.start_record(line);
        if let Some(done) = self.pending.replace(next) {
          return Ok(Some(finish(done)));
        }
      } else if let Some(pending) = self.pending.as_mut() {
        pending.text.push('\n');
        pending.text.push_str(&line);
      } else if !line.trim().is_empty() {
        // Untimestamped preamble before the first entry.
        self.pending = Some(self.start_record(line));
      }
    }
  }

  /// Blocks open at a start prefix and close at an end prefix or a blank
  /// line. Lines outside any block stand alone.
  fn next_block_record(&mut self) -> Result<Option<LogRecord>, IngestError> {
    loop {
      let line = match self.read_line()? {
        Some(line) => line,
        None => return Ok(self.pending.take().map(finish)),
      };

      if starts_with_any(&line, &self.block.skip) {
        continue;
      }
      if starts_with_any(&line, &self.block.start) {
        let next = self.start_record(line);
        if let Some(done) = self.pending.replace(next) {
          return Ok(Some(finish(done)));
        }
        continue;
      }

      let blank = line.trim().is_empty();
      if let Some(pending) = self.pending.as_mut() {
        if blank {
          return Ok(self.pending.take().map(finish));
        }
        pending.text.push('\n');
        pending.text.push_str(&line);
        if starts_with_any(line.trim_start(), &self.block.end) {
          return Ok(self.pending.take().map(finish));
        }
      } else if !blank {
        return Ok(Some(self.start_record(line)));
      }
    }
  }
}

/// Drop trailing blank continuation lines.
fn finish(mut record: LogRecord) -> LogRecord {
  let trimmed = record.text.trim_end().len();
  record.text.truncate(trimmed);
  record
}

impl Iterator for Records {
  type Item = Result<LogRecord, IngestError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    let result = match self.mode {
      RecordMode::Line => self.next_line_record(),
      RecordMode::Timestamped => self.next_timestamped_record(),
      RecordMode::Block => self.next_block_record(),
    };
    match result {
      Ok(Some(record)) => Some(Ok(record)),
      Ok(None) => {
        self.done = true;
        None
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

/// Find log files under `dir` whose extension is in `extensions`
/// (case-insensitive, leading dot optional). Sorted by path.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<LogSource>, IngestError> {
  let dir_id = dir.display().to_string();
  let meta = std::fs::metadata(dir).map_err(|e| IngestError::unreadable(&dir_id, e))?;
  if !meta.is_dir() {
    return Err(IngestError::unreadable(
      &dir_id,
      io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
    ));
  }

  let wanted: Vec<String> = extensions
    .iter()
    .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
    .collect();

  let mut paths = Vec::new();
  for entry in WalkDir::new(dir) {
    let entry = entry.map_err(|e| {
      let id = e
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| dir_id.clone());
      IngestError::unreadable(&id, e.into())
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let matches = entry
      .path()
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| wanted.iter().any(|w| w.eq_ignore_ascii_case(e)))
      .unwrap_or(false);
    if matches {
      paths.push(entry.into_path());
    }
  }
  paths.sort();

  debug!(dir = %dir_id, found = paths.len(), "discovered log files");
  Ok(paths.into_iter().map(LogSource::file).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn collect(source: &LogSource, mode: RecordMode) -> Vec<LogRecord> {
    let opts = IngestOptions {
      mode,
      ..IngestOptions::default()
    };
    source
      .records(&opts)
      .unwrap()
      .collect::<Result<Vec<_>, _>>()
      .unwrap()
  }

  #[test]
  fn empty_source_yields_nothing() {
    let source = LogSource::text("empty", "");
    assert!(collect(&source, RecordMode::Line).is_empty());
    assert!(collect(&source, RecordMode::Timestamped).is_empty());
    assert!(collect(&source, RecordMode::Block).is_empty());
  }

  #[test]
  fn line_mode_skips_blank_lines() {
    let source = LogSource::text("t", "first\n\n   \nsecond\r\nthird");
    let records = collect(&source, RecordMode::Line);
    let texts: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(records[1].line, 4);
    assert_eq!(records[0].source_id, "t");
  }

  #[test]
  fn timestamped_mode_groups_continuation_lines() {
    let text = "\
boot banner
[2024-03-01 10:00:00] loading mods
[2024-03-01 10:00:01] stack traceback:
  in function foo
  in function bar

[2024-03-01 10:00:02] done
";
    let records = collect(&LogSource::text("t", text), RecordMode::Timestamped);
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].text, "boot banner");
    assert!(records[0].timestamp.is_none());
    assert_eq!(
      records[2].text,
      "[2024-03-01 10:00:01] stack traceback:\n  in function foo\n  in function bar"
    );
    assert_eq!(records[2].line, 3);
    assert_eq!(
      records[3].timestamp,
      NaiveDateTime::parse_from_str("2024-03-01 10:00:02", "%Y-%m-%d %H:%M:%S").ok()
    );
  }

  #[test]
  fn block_mode_follows_start_skip_and_end_markers() {
    let text = "\
[INFO] compiling 120 scripts
[WARN - mods/hud.reds:12] unused variable
  let x = 1;
      ^^^
[INFO] still compiling
[WARN - mods/map.reds:40] deprecated call
  Game.Old()
[INFO] interleaved info is dropped
  continued

[ERROR - mods/core.reds:3] unresolved symbol
standalone line
";
    let records = collect(&LogSource::text("redscript.log", text), RecordMode::Block);
    let texts: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
      texts,
      vec![
        "[WARN - mods/hud.reds:12] unused variable\n  let x = 1;\n      ^^^",
        "[WARN - mods/map.reds:40] deprecated call\n  Game.Old()\n  continued",
        "[ERROR - mods/core.reds:3] unresolved symbol\nstandalone line",
      ]
    );
    assert_eq!(records[0].line, 2);
    assert_eq!(records[2].line, 11);
  }

  #[test]
  fn block_mode_lines_outside_blocks_stand_alone() {
    let text = "plain one\n\nplain two\n[WARN x]\n  ^^^ here\nafter";
    let texts: Vec<_> = collect(&LogSource::text("t", text), RecordMode::Block)
      .into_iter()
      .map(|r| r.text)
      .collect();
    assert_eq!(
      texts,
      vec!["plain one", "plain two", "[WARN x]\n  ^^^ here", "after"]
    );
  }

  #[test]
  fn timestamp_parsing_variants() {
    assert!(parse_timestamp("[2024-03-01 10:00:00] x").is_some());
    assert!(parse_timestamp("2024-03-01T10:00:00Z x").is_some());
    assert!(parse_timestamp("x 2024-03-01 10:00:00").is_none());
    // Matches the shape but is not a real date.
    assert!(parse_timestamp("[2024-13-45 10:00:00]").is_none());
  }

  #[test]
  fn records_are_restartable() {
    let source = LogSource::text("t", "a\nb\nc");
    let first = collect(&source, RecordMode::Line);
    let second = collect(&source, RecordMode::Line);
    assert_eq!(first, second);
  }

  #[test]
  fn early_stop_leaves_source_reusable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.log");
    std::fs::write(&path, "one\ntwo\nthree\n").unwrap();
    let source = LogSource::file(&path);

    let first = source.records(&IngestOptions::default()).unwrap().next();
    assert_eq!(first.unwrap().unwrap().text, "one");
    assert_eq!(collect(&source, RecordMode::Line).len(), 3);
  }

  #[test]
  fn invalid_utf8_is_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.log");
    std::fs::write(&path, b"ok\n\xff\xfe bad\n").unwrap();

    let records: Vec<_> = LogSource::file(&path)
      .records(&IngestOptions::default())
      .unwrap()
      .collect::<Result<Vec<_>, _>>()
      .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "ok");
    assert!(records[1].text.contains('\u{FFFD}'));
    assert!(records[1].text.ends_with(" bad"));
  }

  #[test]
  fn binary_content_fails() {
    let source = LogSource::text("bin", "ok line\n\u{0}\u{1}\u{2}garbage\nlater");
    let mut records = source.records(&IngestOptions::default()).unwrap();
    assert!(records.next().unwrap().is_ok());
    match records.next() {
      Some(Err(IngestError::Binary { source_id, line })) => {
        assert_eq!(source_id, "bin");
        assert_eq!(line, 2);
      }
      other => panic!("expected binary error, got {:?}", other),
    }
    assert!(records.next().is_none());
  }

  #[test]
  fn missing_file_is_unreadable() {
    let source = LogSource::file("/definitely/not/here.log");
    let err = source.records(&IngestOptions::default()).err().unwrap();
    assert!(matches!(err, IngestError::Unreadable { .. }));
    assert_eq!(err.source_id(), "/definitely/not/here.log");
  }

  #[test]
  fn missing_file_is_unreadable_with_timeout() {
    let source = LogSource::file("/definitely/not/here.log");
    let opts = IngestOptions {
      timeout: Some(Duration::from_secs(5)),
      ..IngestOptions::default()
    };
    let err = source.records(&opts).err().unwrap();
    assert!(matches!(err, IngestError::Unreadable { .. }));
  }

  #[test]
  fn elapsed_deadline_times_out() {
    let source = LogSource::text("slow", "a\nb");
    let opts = IngestOptions {
      timeout: Some(Duration::ZERO),
      ..IngestOptions::default()
    };
    let first = source.records(&opts).unwrap().next().unwrap();
    assert!(matches!(first, Err(IngestError::Timeout { .. })));
  }

  #[test]
  fn file_reads_fully_through_reader_thread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.log");
    let body: String = (0..1000).map(|i| format!("line {}\n", i)).collect();
    std::fs::write(&path, body).unwrap();

    let opts = IngestOptions {
      timeout: Some(Duration::from_secs(30)),
      ..IngestOptions::default()
    };
    let records: Vec<_> = LogSource::file(&path)
      .records(&opts)
      .unwrap()
      .collect::<Result<Vec<_>, _>>()
      .unwrap();
    assert_eq!(records.len(), 1000);
    assert_eq!(records[999].text, "line 999");
    assert_eq!(records[999].line, 1000);
  }

  #[cfg(unix)]
  fn make_fifo(path: &Path) {
    let status = std::process::Command::new("mkfifo").arg(path).status().unwrap();
    assert!(status.success());
  }

  #[cfg(unix)]
  #[test]
  fn blocked_open_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("stuck.log");
    make_fifo(&fifo);

    let opts = IngestOptions {
      timeout: Some(Duration::from_millis(100)),
      ..IngestOptions::default()
    };
    let started = Instant::now();
    // No writer ever opens the fifo, so open blocks on the reader thread.
    let err = LogSource::file(&fifo).records(&opts).err().unwrap();
    assert!(matches!(err, IngestError::Timeout { limit_ms: 100, .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
  }

  #[cfg(unix)]
  #[test]
  fn blocked_read_times_out() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("slow.log");
    make_fifo(&fifo);

    let writer_path = fifo.clone();
    let writer = thread::spawn(move || {
      let mut w = std::fs::OpenOptions::new().write(true).open(writer_path).unwrap();
      w.write_all(b"first\n").unwrap();
      w.flush().unwrap();
      // Hold the write end open without sending anything else.
      thread::sleep(Duration::from_secs(2));
    });

    let opts = IngestOptions {
      timeout: Some(Duration::from_millis(500)),
      ..IngestOptions::default()
    };
    let started = Instant::now();
    let mut records = LogSource::file(&fifo).records(&opts).unwrap();
    assert_eq!(records.next().unwrap().unwrap().text, "first");
    assert!(matches!(records.next(), Some(Err(IngestError::Timeout { .. }))));
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert!(records.next().is_none());

    drop(records);
    writer.join().unwrap();
  }

  #[test]
  fn discover_finds_matching_extensions_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("r6").join("logs");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(dir.path().join("b.log"), "x").unwrap();
    std::fs::write(dir.path().join("a.LOG"), "x").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
    std::fs::write(nested.join("redscript.log"), "x").unwrap();

    let sources = discover(dir.path(), &["log".to_string()]).unwrap();
    let names: Vec<_> = sources
      .iter()
      .map(|s| Path::new(s.id()).file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["a.LOG", "b.log", "redscript.log"]);
  }

  #[test]
  fn discover_rejects_missing_dir() {
    let err = discover(Path::new("/no/such/dir"), &["log".to_string()]).unwrap_err();
    assert!(matches!(err, IngestError::Unreadable { .. }));
  }
}
