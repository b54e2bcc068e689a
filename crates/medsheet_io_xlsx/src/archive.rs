//! Zip bundling of rendered documents.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::spec::{Result, SpecArchiveEntry};
use crate::util::derive_unique_entry_name;

/// Bundle entries into one deflated zip, in order.
///
/// Clashing entry names get a `__<n>` suffix before the extension.
pub fn build_archive(entries: &[SpecArchiveEntry]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut set_names_existing = BTreeSet::new();
    for entry in entries {
        let c_name = derive_unique_entry_name(&entry.file_name, &mut set_names_existing);
        zip.start_file(c_name, options)?;
        zip.write_all(&entry.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
