//! Fixed-layout binary feature files
//!
//! A feature file is a headerless run of records, one per analysis frame, each
//! holding `layout.record_width()` little-endian f32 values. Record 0 is
//! analysis frame 0 of the film. The layout is not stored in the file, so the
//! caller's layout is checked against the file size on open.

use crate::config::{RecordLayout, VALUE_BYTES};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::{Array2, ArrayView1};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Read-only handle on a feature file
#[derive(Debug)]
pub struct FeatureFile {
    path: PathBuf,
    file: File,
    layout: RecordLayout,
    record_count: usize,
}

impl FeatureFile {
    /// Opens a feature file, checking that its size is a whole number of records
    pub fn open<P: AsRef<Path>>(path: P, layout: RecordLayout) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_bytes = file.metadata()?.len();
        let record_count = record_count_for_size(file_bytes, &layout)?;

        log::debug!(
            "opened {} ({} records of {} bytes)",
            path.display(),
            record_count,
            layout.record_bytes()
        );

        Ok(Self {
            path,
            file,
            layout,
            record_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Total number of records in the file
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Reads a range of records as a `(records, record_width)` array.
    ///
    /// Only the requested window is read from disk. The range is clamped to
    /// the records present in the file.
    pub fn read_records(&self, range: Range<usize>) -> Result<Array2<f32>> {
        let end = range.end.min(self.record_count);
        let start = range.start.min(end);
        let width = self.layout.record_width();
        let count = end - start;

        let mut values = vec![0f32; count * width];
        if count > 0 {
            let mut file = &self.file;
            file.seek(SeekFrom::Start((start * self.layout.record_bytes()) as u64))?;
            let mut reader = BufReader::new(file);
            reader.read_f32_into::<LittleEndian>(&mut values)?;
        }

        Ok(Array2::from_shape_vec((count, width), values)?)
    }

    /// Reads every record in the file
    pub fn read_all(&self) -> Result<Array2<f32>> {
        self.read_records(0..self.record_count)
    }
}

/// Number of records in a file of `file_bytes` bytes
pub fn record_count_for_size(file_bytes: u64, layout: &RecordLayout) -> Result<usize> {
    let record_bytes = layout.record_bytes() as u64;
    if record_bytes == 0 || file_bytes % record_bytes != 0 {
        return Err(Error::ConfigMismatch {
            file_bytes,
            record_bytes,
        });
    }
    Ok((file_bytes / record_bytes) as usize)
}

/// Sequential writer producing a feature file one whole record at a time
pub struct FeatureFileWriter {
    writer: BufWriter<File>,
    layout: RecordLayout,
    records_written: usize,
}

impl FeatureFileWriter {
    /// Creates (or truncates) a feature file
    pub fn create<P: AsRef<Path>>(path: P, layout: RecordLayout) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            layout,
            records_written: 0,
        })
    }

    /// Appends one record; its length must equal the layout's record width
    pub fn write_record(&mut self, record: &[f32]) -> Result<()> {
        let expected = self.layout.record_width();
        if record.len() != expected {
            return Err(Error::RecordWidth {
                got: record.len(),
                expected,
            });
        }
        for value in record {
            self.writer.write_f32::<LittleEndian>(*value)?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Appends every row of a `(records, record_width)` array
    pub fn write_records(&mut self, records: &Array2<f32>) -> Result<()> {
        for row in records.rows() {
            self.write_row(row)?;
        }
        Ok(())
    }

    fn write_row(&mut self, row: ArrayView1<f32>) -> Result<()> {
        match row.as_slice() {
            Some(slice) => self.write_record(slice),
            None => self.write_record(&row.to_vec()),
        }
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flushes buffered records to disk
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        log::debug!(
            "wrote {} records ({} bytes)",
            self.records_written,
            self.records_written * self.layout.record_width() * VALUE_BYTES
        );
        Ok(self.records_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureKind;
    use crate::test_support::{ramp_value, write_ramp_file as write_ramp};
    use std::fs;

    #[test]
    fn test_record_count_from_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vertigo.color_lab");
        let layout = FeatureKind::ColorLab.default_layout();
        write_ramp(&path, layout, 12);

        let file = FeatureFile::open(&path, layout).unwrap();
        assert_eq!(file.record_count(), 12);
        assert_eq!(
            fs::metadata(&path).unwrap().len(),
            (12 * layout.record_bytes()) as u64
        );
    }

    #[test]
    fn test_read_window_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vertigo.tvl1");
        let layout = FeatureKind::Tvl1.default_layout();
        write_ramp(&path, layout, 10);

        let file = FeatureFile::open(&path, layout).unwrap();
        let window = file.read_records(3..6).unwrap();
        assert_eq!(window.dim(), (3, 144));
        assert_eq!(window[[0, 0]], ramp_value(3, 0));
        assert_eq!(window[[2, 143]], ramp_value(5, 143));
    }

    #[test]
    fn test_read_clamps_past_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vertigo.tvl1");
        let layout = FeatureKind::Tvl1.default_layout();
        write_ramp(&path, layout, 4);

        let file = FeatureFile::open(&path, layout).unwrap();
        assert_eq!(file.read_records(2..40).unwrap().nrows(), 2);
        assert_eq!(file.read_records(9..12).unwrap().nrows(), 0);
    }

    #[test]
    fn test_size_mismatch_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vertigo.color_lab");
        fs::write(&path, vec![0u8; 17 * 3 * 16 * 4 + 2]).unwrap();

        let err = FeatureFile::open(&path, FeatureKind::ColorLab.default_layout()).unwrap_err();
        assert!(matches!(err, Error::ConfigMismatch { record_bytes: 3264, .. }));
    }

    #[test]
    fn test_wrong_layout_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vertigo.phasecorr");
        write_ramp(&path, FeatureKind::PhaseCorr.default_layout(), 3);

        // 3 records of 520 bytes cannot be read as 3264-byte color records
        assert!(FeatureFile::open(&path, FeatureKind::ColorLab.default_layout()).is_err());
    }

    #[test]
    fn test_writer_rejects_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        let layout = FeatureKind::OpticalFlow24.default_layout();
        let mut writer = FeatureFileWriter::create(dir.path().join("x.opticalflow24"), layout).unwrap();
        let err = writer.write_record(&[0.0; 10]).unwrap_err();
        assert!(matches!(err, Error::RecordWidth { got: 10, expected: 512 }));
        assert_eq!(writer.records_written(), 0);
    }
}
