use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

/// Initial tail-read window in bytes. Doubles until a complete record is
/// found or the window covers the whole file.
const INITIAL_TAIL_WINDOW: u64 = 4096;

/// Mode for the containing directory when it has to be created.
#[cfg(unix)]
const DATA_DIR_MODE: u32 = 0o750;

/// The ledger's single storage file.
///
/// One record per line, append-only; written lines are immutable. This
/// type is the only component that touches the file. Appends take an
/// exclusive advisory lock scoped to the single whole-line write; reads
/// take no lock, since a reader racing an append observes either the
/// complete new line or none.
#[derive(Clone, Debug)]
pub struct LedgerFile {
    path: PathBuf,
    tail_window: u64,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tail_window: INITIAL_TAIL_WINDOW,
        }
    }

    #[cfg(test)]
    fn with_tail_window(path: impl Into<PathBuf>, tail_window: u64) -> Self {
        Self {
            path: path.into(),
            tail_window,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte length of the file; 0 if it does not exist.
    pub fn len(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append one record line under an exclusive advisory lock.
    ///
    /// The line plus its newline goes out in a single `write_all`, so
    /// concurrent readers never see a torn record. The lock is scoped to
    /// this write; dropping the handle releases it on every exit path.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        let result = (&file).write_all(buf.as_bytes());

        let _ = FileExt::unlock(&file);
        result?;

        debug!(path = %self.path.display(), bytes = buf.len(), "record appended");
        Ok(())
    }

    /// Locate the final complete, newline-delimited record without
    /// scanning the whole file.
    ///
    /// Reads a trailing window and doubles it — bounded by the file size —
    /// until the window is known to contain the start of the last record.
    /// Growing rather than truncating means an oversized record is still
    /// returned intact. Returns `None` for a missing or empty file.
    ///
    /// If the file does not end in a newline (a torn tail that the locked
    /// whole-line append cannot produce itself), the trailing fragment is
    /// returned as-is; the caller's parse/verify step then rejects it
    /// instead of silently skipping it.
    pub fn last_line(&self) -> io::Result<Option<String>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(None);
        }

        let mut window = self.tail_window.min(len).max(1);
        loop {
            file.seek(SeekFrom::End(-(window as i64)))?;
            let mut buf = Vec::with_capacity(window as usize);
            Read::by_ref(&mut file).take(window).read_to_end(&mut buf)?;

            match last_complete_line(&buf, window == len) {
                Tail::Found(line) => return Ok(Some(line)),
                Tail::Empty => return Ok(None),
                Tail::NeedMore => {
                    let grown = (window * 2).min(len);
                    debug!(window, grown, "tail window too small; growing");
                    window = grown;
                }
            }
        }
    }

    /// Open a buffered reader over the whole file, front to back.
    /// Returns `None` if the file does not exist.
    pub fn open_reader(&self) -> io::Result<Option<BufReader<File>>> {
        match File::open(&self.path) {
            Ok(f) => Ok(Some(BufReader::new(f))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the containing directory with restrictive permissions if it
    /// is absent.
    fn ensure_parent_dir(&self) -> io::Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || parent.exists() {
            return Ok(());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new()
                .recursive(true)
                .mode(DATA_DIR_MODE)
                .create(parent)
        }
        #[cfg(not(unix))]
        {
            fs::create_dir_all(parent)
        }
    }
}

enum Tail {
    /// A complete last line, terminator stripped.
    Found(String),
    /// The window holds no line start; caller must widen it.
    NeedMore,
    /// The file contains only line terminators.
    Empty,
}

fn last_complete_line(buf: &[u8], covers_file_start: bool) -> Tail {
    let end = buf
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map(|i| i + 1);
    let Some(end) = end else {
        return if covers_file_start {
            Tail::Empty
        } else {
            Tail::NeedMore
        };
    };
    let data = &buf[..end];

    match data.iter().rposition(|&b| b == b'\n') {
        // The byte before the line proves we have its start.
        Some(pos) => Tail::Found(String::from_utf8_lossy(&data[pos + 1..]).into_owned()),
        None if covers_file_start => Tail::Found(String::from_utf8_lossy(data).into_owned()),
        None => Tail::NeedMore,
    }
}
