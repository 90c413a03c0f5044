//! Synthetic feature files shared by the unit tests

use crate::config::RecordLayout;
use crate::feature_file::FeatureFileWriter;
use std::path::Path;

/// Value stored at `(record, offset)` by [`write_ramp_file`]
pub fn ramp_value(record: usize, offset: usize) -> f32 {
    (record * 1000 + offset) as f32
}

/// Writes `records` records whose values encode their own position
pub fn write_ramp_file(path: &Path, layout: RecordLayout, records: usize) {
    let mut writer = FeatureFileWriter::create(path, layout).unwrap();
    for i in 0..records {
        let record: Vec<f32> = (0..layout.record_width())
            .map(|v| ramp_value(i, v))
            .collect();
        writer.write_record(&record).unwrap();
    }
    writer.finish().unwrap();
}
