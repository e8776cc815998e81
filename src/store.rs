//! Flat-file persistence for `Dict`: `name=value` lines with `#` comment
//! lines, plus mtime-based refresh with a stability check.

use crate::dict::Dict;
use crate::error::Result;
use crate::value::TextValue;
use core::hash::BuildHasher;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Delay between the two stat observations of the stability check.
const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Provenance recorded by `load` and consulted by `refresh`.
#[derive(Clone, Debug)]
pub(crate) struct FileSource {
    pub(crate) path: PathBuf,
    pub(crate) mtime: SystemTime,
    pub(crate) len: u64,
}

impl<V, S> Dict<V, S>
where
    V: TextValue,
    S: BuildHasher + Clone + Default,
{
    /// Overwrite `path` with the comment lines (each `#`-prefixed), a blank
    /// separator, then one `key=value` line per entry in native iteration
    /// order. Keys must not contain `=` and values must be single-line
    /// printable text; neither is checked here, that is the format contract.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut out = String::new();
        for line in self.comments() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        if !self.comments().is_empty() {
            out.push('\n');
        }
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push('=');
            out.push_str(value.text());
            out.push('\n');
        }
        fs::write(path, out)?;
        debug!(path = %path.display(), entries = self.len(), "saved dict");
        Ok(())
    }

    /// Read `name=value` lines from `path` into this dict with update
    /// semantics: present keys are overwritten, absent keys inserted, keys
    /// not in the file are left alone. Comment lines, blank lines, and lines
    /// without `=` are skipped; CRLF endings are tolerated. On success the
    /// file's path, modification time, and size are recorded for `refresh`.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        // Stat before reading: if the file changes mid-read, the recorded
        // mtime is older than the new content and the next refresh retries.
        let meta = fs::metadata(path)?;
        let mtime = meta.modified()?;
        let text = fs::read_to_string(path)?;

        let mut applied = 0usize;
        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            self.update(name, V::from_text(value));
            applied += 1;
        }

        self.source = Some(FileSource {
            path: path.to_path_buf(),
            mtime,
            len: meta.len(),
        });
        debug!(path = %path.display(), applied, "loaded dict");
        Ok(())
    }

    /// Reload the backing file recorded by `load` if it has changed and is
    /// no longer being written.
    ///
    /// No recorded file, or an unchanged modification time and size, is a
    /// no-op. A changed file is re-statted after a short settle delay and
    /// reloaded (update semantics, as in `load`) only when both observations
    /// agree; otherwise the reload is deferred to the next call. Fails with
    /// [`Error::Io`](crate::Error::Io) if the file became unreadable.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(source) = self.source.clone() else {
            return Ok(());
        };
        let meta = fs::metadata(&source.path)?;
        let mtime = meta.modified()?;
        if mtime == source.mtime && meta.len() == source.len {
            return Ok(());
        }

        std::thread::sleep(SETTLE_DELAY);
        let again = fs::metadata(&source.path)?;
        if again.modified()? != mtime || again.len() != meta.len() {
            debug!(path = %source.path.display(), "backing file still changing, reload deferred");
            return Ok(());
        }

        debug!(path = %source.path.display(), "backing file changed, reloading");
        self.load(&source.path)
    }
}
