//! Size-capped rotating log file
//!
//! `listing-indexer.log` is rolled over to `listing-indexer.log.1` before a
//! write would push it past the size cap. Older archives shift up by one and
//! the oldest is removed, so at most `max_files` files exist including the
//! live one. Events reach the file through tracing-appender's non-blocking
//! worker.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

pub const LOG_FILE_NAME: &str = "listing-indexer.log";

pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or continue) the log file in `dir`, creating the directory
    pub fn open(dir: impl AsRef<Path>, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(LOG_FILE_NAME);
        let file = append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes: max_bytes.max(1),
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `n`th archive, `.1` being the most recent
    pub fn archive_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        name.into()
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let archives = self.max_files - 1;
        if archives == 0 {
            self.file = File::create(&self.path)?;
        } else {
            let oldest = self.archive_path(archives);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..archives).rev() {
                let from = self.archive_path(n);
                if from.exists() {
                    fs::rename(&from, self.archive_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.archive_path(1))?;
            self.file = append(&self.path)?;
        }

        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Non-blocking writer over a [`RotatingFile`]. Keep the guard alive for as
/// long as events should be flushed.
pub fn file_writer(
    dir: impl AsRef<Path>,
    max_bytes: u64,
    max_files: usize,
) -> io::Result<(NonBlocking, WorkerGuard)> {
    Ok(tracing_appender::non_blocking(RotatingFile::open(dir, max_bytes, max_files)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn line(i: usize) -> String {
        format!("[2024-01-01 00:00:00] INFO: cycle {i:04} finished\n")
    }

    #[test]
    fn rotates_at_size_cap_and_keeps_max_files() {
        let dir = TempDir::new().unwrap();
        let line_len = line(0).len() as u64;
        let mut log = RotatingFile::open(dir.path(), line_len * 3, 3).unwrap();

        for i in 0..20 {
            log.write_all(line(i).as_bytes()).unwrap();
        }
        log.flush().unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "listing-indexer.log".to_string(),
                "listing-indexer.log.1".to_string(),
                "listing-indexer.log.2".to_string(),
            ]
        );

        for path in [log.path().to_path_buf(), log.archive_path(1), log.archive_path(2)] {
            assert!(fs::metadata(&path).unwrap().len() <= line_len * 3);
        }

        // newest lines in the live file, the ones before in .1
        let live = fs::read_to_string(log.path()).unwrap();
        assert!(live.ends_with(&line(19)));
        let previous = fs::read_to_string(log.archive_path(1)).unwrap();
        assert!(previous.ends_with(&line(17)));
    }

    #[test]
    fn reopening_continues_the_size_count() {
        let dir = TempDir::new().unwrap();
        let line_len = line(0).len() as u64;

        let mut log = RotatingFile::open(dir.path(), line_len * 2, 2).unwrap();
        log.write_all(line(0).as_bytes()).unwrap();
        log.write_all(line(1).as_bytes()).unwrap();
        drop(log);

        let mut log = RotatingFile::open(dir.path(), line_len * 2, 2).unwrap();
        log.write_all(line(2).as_bytes()).unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), line(2));
        assert_eq!(
            fs::read_to_string(log.archive_path(1)).unwrap(),
            format!("{}{}", line(0), line(1))
        );
    }

    #[test]
    fn single_file_is_truncated_in_place() {
        let dir = TempDir::new().unwrap();
        let line_len = line(0).len() as u64;
        let mut log = RotatingFile::open(dir.path(), line_len, 1).unwrap();

        log.write_all(line(0).as_bytes()).unwrap();
        log.write_all(line(1).as_bytes()).unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), line(1));
        assert!(!log.archive_path(1).exists());
    }

    #[test]
    fn non_blocking_writer_reaches_the_file() {
        let dir = TempDir::new().unwrap();
        let (mut writer, guard) = file_writer(dir.path(), 5_120_000, 5).unwrap();
        writer.write_all(line(7).as_bytes()).unwrap();
        drop(guard);

        let content = fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(content, line(7));
    }
}
