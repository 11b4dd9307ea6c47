use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::models::{ArcadeDefinitionEntry, Entry, LogicImageEntry};
use crate::scan::deps::resolve_dependencies;
use crate::scan::error::{ErrorKind, Result as ScanResult};
use exn::ResultExt;
use webmenu_extract::models::FileKind;
use webmenu_extract::{parse_arcade_definition, parse_logic_image_name};
use webmenu_storage::{FileInfo, digest_file, digest_reader};

/// Builds the index entry for a single file.
///
/// The file is classified by extension ([`FileKind`]); files of any other
/// kind produce `Ok(None)` without being opened.
///
/// - **Logic images** are streamed through the digest; their metadata comes
///   from the filename alone.
/// - **Arcade definitions** are read whole (they're small XML documents),
///   hashed, parsed, and have their ROM archives located.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Scan>`](LibraryErrorKind::Scan) raised from
/// an inner [`Exn<ErrorKind>`](ErrorKind) when the file can't be read or
/// the definition is malformed.
pub async fn scan_file(ctx: &Context, file: FileInfo) -> LibraryResult<Option<Entry>> {
    scan_file_inner(ctx, file).await.or_raise(|| LibraryErrorKind::Scan)
}

pub(crate) async fn scan_file_inner(ctx: &Context, file: FileInfo) -> ScanResult<Option<Entry>> {
    Ok(match FileKind::from_path(&file.path) {
        FileKind::LogicImage => Some(Entry::LogicImage(scan_logic_image(ctx, file).await?)),
        FileKind::ArcadeDefinition => Some(Entry::ArcadeDefinition(scan_arcade_definition(ctx, file).await?)),
        FileKind::Ignored => None,
    })
}

async fn scan_logic_image(ctx: &Context, file: FileInfo) -> ScanResult<LogicImageEntry> {
    tracing::debug!(path = %file.path.display(), "Scanning logic image");
    let digest = digest_file(&file.path).await.or_raise(|| ErrorKind::Storage(file.path.clone()))?;
    let filename = file.filename();
    let (code_name, code_date) = match parse_logic_image_name(&filename) {
        Some(name) => (Some(name.code_name), Some(name.code_date)),
        None => (None, None),
    };
    Ok(LogicImageEntry {
        logical_path: ctx.storage.logical_path(&file.path),
        path: file.path,
        filename,
        code_name,
        code_date,
        created_at: file.modified,
        digest,
    })
}

async fn scan_arcade_definition(ctx: &Context, file: FileInfo) -> ScanResult<ArcadeDefinitionEntry> {
    tracing::debug!(path = %file.path.display(), "Scanning arcade definition");
    let bytes = ctx.storage.read(&file.path).await.or_raise(|| ErrorKind::Storage(file.path.clone()))?;
    let digest = digest_reader(bytes.as_slice()).or_raise(|| ErrorKind::Storage(file.path.clone()))?;
    let definition = parse_arcade_definition(&bytes).or_raise(|| ErrorKind::Extract(file.path.clone()))?;
    // Walked files always have a parent.
    let dir = file.path.parent().unwrap_or_else(|| ctx.storage.root());
    let resolution = resolve_dependencies(&ctx.storage, dir, &ctx.archive_dirs, definition.archives).await;
    Ok(ArcadeDefinitionEntry {
        logical_path: ctx.storage.logical_path(&file.path),
        filename: file.filename(),
        created_at: file.modified,
        digest,
        display_name: definition.name,
        logic_image_ref: definition.logic_image,
        required_archives: resolution.archives,
        dependencies_satisfied: resolution.satisfied,
        path: file.path,
    })
}
