//! Replication mirror layout and payload handling.

use std::io::{self, Read};

use flate2::read::GzDecoder;

/// Relative path of changeset `changeset_id` on a replication mirror.
///
/// The id is zero-padded to nine digits and split into three segments of
/// three; ids above 999,999,999 widen the first segment.
///
/// # Examples
/// ```
/// use change_merger_data::remote::replication_path;
///
/// assert_eq!(replication_path(1_234), "000/001/234.osc.gz");
/// assert_eq!(replication_path(5_987_654_321), "5987/654/321.osc.gz");
/// ```
pub fn replication_path(changeset_id: u64) -> String {
    format!(
        "{:03}/{:03}/{:03}.osc.gz",
        changeset_id / 1_000_000,
        (changeset_id / 1_000) % 1_000,
        changeset_id % 1_000
    )
}

/// Inflate a gzip payload.
pub fn decompress_gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}
