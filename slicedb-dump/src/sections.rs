//! Schema section extraction (§4.3.6): two fire-and-forget tasks invoke the
//! external DDL tool for `pre-data` and `post-data`, split the output into
//! individual statements, and write one archive entry per statement.

use std::sync::Arc;

use slicedb_archive::ArchiveWriter;
use slicedb_db::ddl::split_statements;
use slicedb_errors::SliceError;

use crate::ddl_tool::DdlProvider;
use crate::manifest_builder::ManifestBuilder;

pub use slicedb_archive::Section;

/// Fetches one section's DDL, splits it into statements, and writes them to
/// the archive, returning how many statements were written.
async fn dump_section(
    ddl: &dyn DdlProvider,
    archive: &ArchiveWriter,
    section: Section,
) -> Result<usize, SliceError> {
    let text = ddl.dump_section(section).await?;
    let statements = split_statements(&text);
    for (i, statement) in statements.iter().enumerate() {
        archive.write_schema_statement(section, (i + 1) as u32, statement)?;
    }
    Ok(statements.len())
}

/// Runs both sections and records their statement counts in the manifest.
/// The two sections don't depend on each other, so they run concurrently;
/// both must succeed or the whole dump fails (§4.3.6, §7).
pub async fn dump_schema_sections(
    ddl: Arc<dyn DdlProvider>,
    archive: Arc<ArchiveWriter>,
    manifest: Arc<ManifestBuilder>,
) -> Result<(), SliceError> {
    let (pre_data, post_data) = tokio::try_join!(
        dump_section(ddl.as_ref(), archive.as_ref(), Section::PreData),
        dump_section(ddl.as_ref(), archive.as_ref(), Section::PostData),
    )?;
    manifest.record_sections(pre_data, post_data);
    Ok(())
}
