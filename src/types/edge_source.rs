use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::config::READ_BUFFER_SIZE;
use crate::error::LoadError;

/// A directed edge `(source, destination)`.
pub type Edge = (u64, u64);

/// Anything a graph can be loaded from.
///
/// Sources are read once per load, and the SCC passes load twice, so a
/// source must yield the same edges every time it is read.
pub trait EdgeSource {
    /// Reads every edge, checking each vertex id against `[1, vertex_count]`.
    ///
    /// # Errors
    /// The first malformed record or out-of-range id aborts the read.
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError>;
}

impl<S: EdgeSource + ?Sized> EdgeSource for &S {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        (**self).read_edges(vertex_count)
    }
}

/// Edge list text held in memory.
impl EdgeSource for str {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        parse_edges(self.as_bytes(), vertex_count, "<memory>", |_| {})
    }
}

impl EdgeSource for String {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        self.as_str().read_edges(vertex_count)
    }
}

impl EdgeSource for [u8] {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        parse_edges(self, vertex_count, "<memory>", |_| {})
    }
}

/// Pre-parsed edges; only the vertex range is checked.
impl EdgeSource for [Edge] {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        self.iter()
            .enumerate()
            .map(|(idx, &(src, dst))| {
                let line = idx + 1;
                Ok((
                    check_vertex(src, vertex_count, line)?,
                    check_vertex(dst, vertex_count, line)?,
                ))
            })
            .collect()
    }
}

impl EdgeSource for Vec<Edge> {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        self.as_slice().read_edges(vertex_count)
    }
}

/// An edge list file on disk: one `u v` pair per line.
///
/// Blank lines and lines starting with `#` or `%` are skipped, so SNAP-style
/// headers can stay in the file.
#[derive(Debug, Clone)]
pub struct EdgeFile {
    path: PathBuf,
    show_progress: bool,
}

impl EdgeFile {
    /// Creates a source reading `path`, with the progress bar off.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            show_progress: false,
        }
    }

    /// Draws a progress bar on stderr while the file is read.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The file the edges are read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn progress_bar(&self, total_bytes: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total_bytes);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message("Graph Loading.");
        pb
    }
}

impl EdgeSource for EdgeFile {
    fn read_edges(&self, vertex_count: u64) -> Result<Vec<Edge>, LoadError> {
        let origin = self.path.display().to_string();
        let io_error = |error| LoadError::Io {
            path: origin.clone(),
            error,
        };

        let graph_file = File::open(&self.path).map_err(io_error)?;
        let total_bytes = graph_file.metadata().map(|meta| meta.len()).unwrap_or(0);
        let graph_reader = BufReader::with_capacity(READ_BUFFER_SIZE, graph_file);

        let pb = self.progress_bar(total_bytes);
        let edges = parse_edges(graph_reader, vertex_count, &origin, |bytes| pb.inc(bytes as u64));
        pb.finish_and_clear();

        let edges = edges?;
        debug!(path = %origin, edge_count = edges.len(), "edge file read");
        Ok(edges)
    }
}

/// Parses an edge list, calling `on_read` with the byte length of every line read.
fn parse_edges<R, F>(
    mut reader: R,
    vertex_count: u64,
    origin: &str,
    mut on_read: F,
) -> Result<Vec<Edge>, LoadError>
where
    R: BufRead,
    F: FnMut(usize),
{
    let mut edges = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|error| LoadError::Io {
            path: origin.to_string(),
            error,
        })?;
        if read == 0 {
            break;
        }
        line_no += 1;
        on_read(read);

        let line = std::str::from_utf8(&buf).map_err(|err| LoadError::MalformedInput {
            line: line_no,
            record: String::from_utf8_lossy(&buf).trim().to_string(),
            reason: format!("record is not valid UTF-8: {}", err),
        })?;
        if let Some(edge) = parse_record(line, line_no, vertex_count)? {
            edges.push(edge);
        }
    }

    Ok(edges)
}

/// Parses one line; `None` for blank and comment lines.
fn parse_record(line: &str, line_no: usize, vertex_count: u64) -> Result<Option<Edge>, LoadError> {
    let record = line.trim();
    if record.is_empty() || record.starts_with('#') || record.starts_with('%') {
        return Ok(None);
    }

    let malformed = |reason: String| LoadError::MalformedInput {
        line: line_no,
        record: record.to_string(),
        reason,
    };

    let mut fields = record.split_whitespace();
    let (src, dst) = match (fields.next(), fields.next(), fields.next()) {
        (Some(src), Some(dst), None) => (src, dst),
        (Some(_), Some(_), Some(_)) => {
            return Err(malformed("expected two vertex ids, found more fields".to_string()))
        }
        _ => return Err(malformed("expected two vertex ids".to_string())),
    };

    let parse_vertex = |field: &str| {
        field
            .parse::<u64>()
            .map_err(|err| malformed(format!("`{}` is not a vertex id: {}", field, err)))
    };
    let src = check_vertex(parse_vertex(src)?, vertex_count, line_no)?;
    let dst = check_vertex(parse_vertex(dst)?, vertex_count, line_no)?;

    Ok(Some((src, dst)))
}

fn check_vertex(vertex: u64, vertex_count: u64, line: usize) -> Result<u64, LoadError> {
    if (1..=vertex_count).contains(&vertex) {
        Ok(vertex)
    } else {
        Err(LoadError::VertexOutOfRange {
            line,
            vertex,
            vertex_count,
        })
    }
}
