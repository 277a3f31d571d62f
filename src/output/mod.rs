//! Playlist output sinks
//!
//! A sink receives the header once and then one record at a time, in the
//! order the assembler produced them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod generator;

pub use generator::{render_entry, render_playlist, PLAYLIST_HEADER};

use crate::errors::{AppError, AppResult};
use crate::models::OutputRecord;

pub trait PlaylistSink {
    fn write_header(&mut self) -> AppResult<()>;
    fn append(&mut self, record: &OutputRecord) -> AppResult<()>;
    fn finish(&mut self) -> AppResult<()>;
}

/// Write a full playlist through a sink
pub fn write_playlist(sink: &mut dyn PlaylistSink, records: &[OutputRecord]) -> AppResult<()> {
    sink.write_header()?;
    for record in records {
        sink.append(record)?;
    }
    sink.finish()
}

/// Writes to a temporary sibling file and renames it into place on finish,
/// so an interrupted run never leaves a truncated playlist behind
pub struct M3uFileSink {
    path: PathBuf,
    temp_path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl M3uFileSink {
    pub fn create(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AppError::output(parent, e))?;
        }

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let file = File::create(&temp_path).map_err(|e| AppError::output(&temp_path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            temp_path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    fn write_str(&mut self, text: &str) -> AppResult<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            AppError::output(
                &self.path,
                std::io::Error::other("playlist already finished"),
            )
        })?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| AppError::output(&self.temp_path, e))
    }
}

impl PlaylistSink for M3uFileSink {
    fn write_header(&mut self) -> AppResult<()> {
        self.write_str(&format!("{PLAYLIST_HEADER}\n"))
    }

    fn append(&mut self, record: &OutputRecord) -> AppResult<()> {
        self.write_str(&render_entry(record))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> AppResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| AppError::output(&self.temp_path, e))?;
            drop(writer);
            fs::rename(&self.temp_path, &self.path).map_err(|e| AppError::output(&self.path, e))?;
            info!(
                "Wrote {} channels to {}",
                self.written,
                self.path.display()
            );
        }
        Ok(())
    }
}

/// Collects the rendered playlist in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub contents: String,
    pub records: Vec<OutputRecord>,
}

impl PlaylistSink for MemorySink {
    fn write_header(&mut self) -> AppResult<()> {
        self.contents.push_str(PLAYLIST_HEADER);
        self.contents.push('\n');
        Ok(())
    }

    fn append(&mut self, record: &OutputRecord) -> AppResult<()> {
        self.contents.push_str(&render_entry(record));
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> AppResult<()> {
        Ok(())
    }
}
