use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::models::{Entry, Index, ScanSummary};
use crate::scan::error::{ErrorKind as ScanErrorKind, Result as ScanResult};
use crate::scan::file::scan_file_inner;
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use webmenu_storage::FileInfo;
use webmenu_storage::error::Result as StorageResult;

/// Progress events emitted by [`scan`] as it walks the storage medium.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`CategoryRootsDiscovered`](Self::CategoryRootsDiscovered) exactly once,
///    with the number of top-level category directories found.
/// 3. [`Scanned`](Self::Scanned) zero or more times, one per indexed file.
/// 4. [`Complete`](Self::Complete) exactly once, signalling the stream is
///    finished.
///
/// A discovery failure terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted. That includes a missing or
/// unreadable storage root (an unmounted card): the scan fails instead of
/// reporting an empty medium, so a good persisted index is never replaced
/// by an empty one.
#[derive(Debug)]
pub enum ScanEvent {
    Started,
    CategoryRootsDiscovered(u64),
    Scanned(Box<Entry>),
    Complete,
}

/// Streams [`ScanEvent`]s for every logic image and arcade definition found
/// beneath the category roots of `ctx`'s storage.
///
/// Files are processed concurrently, up to `ctx.concurrency` at a time.
/// Individual file failures are surfaced as `Err` items without terminating
/// the stream; only failing to list the storage root is fatal.
pub fn scan(ctx: &Context) -> impl Stream<Item = LibraryResult<ScanEvent>> + '_ {
    // `rustfmt` does not format macro-specific syntax such as
    // `for await` even using the parentheses trick.
    stream! {
        for await event in scan_inner(ctx) {
            yield event.or_raise(|| LibraryErrorKind::Scan);
        }
    }
}

pub(crate) fn scan_inner(ctx: &Context) -> impl Stream<Item = ScanResult<ScanEvent>> + '_ {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(ScanEvent::Started);

        let root = ctx.storage.root();
        let category_roots =
            match ctx.storage.category_roots().await.or_raise(|| ScanErrorKind::Discovery(root.to_path_buf())) {
                Ok(roots) => roots,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(ScanEvent::CategoryRootsDiscovered(u64::try_from(category_roots.len()).unwrap_or(0)));

        for category_root in &category_roots {
            tracing::debug!(path = %category_root.display(), "Scanning category root");
            let results = ctx
                .storage
                .walk(category_root)
                .map(|item| scan_walked(ctx, item))
                .buffer_unordered(ctx.concurrency.max(1));
            for await result in results {
                match result {
                    Ok(Some(entry)) => yield Ok(ScanEvent::Scanned(Box::new(entry))),
                    Ok(None) => {},
                    Err(e) => yield Err(e),
                }
            }
        }

        yield Ok(ScanEvent::Complete);
    })
}

async fn scan_walked(ctx: &Context, item: StorageResult<FileInfo>) -> ScanResult<Option<Entry>> {
    let file = item.or_raise(|| ScanErrorKind::Traversal)?;
    scan_file_inner(ctx, file).await
}

/// Runs a complete scan and collects every entry into an [`Index`].
///
/// Per-file failures are logged and counted in the returned [`ScanSummary`];
/// the affected file is simply absent from the index.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Scan>`](LibraryErrorKind::Scan) if the
/// storage root couldn't be enumerated. No partial index is returned.
#[tracing::instrument(skip(ctx), fields(root = %ctx.storage.root().display()))]
pub async fn build_index(ctx: &Context) -> LibraryResult<(Index, ScanSummary)> {
    let mut index = Index::default();
    let mut summary = ScanSummary::default();
    let mut events = std::pin::pin!(scan_inner(ctx));
    while let Some(event) = events.next().await {
        match event {
            Ok(ScanEvent::CategoryRootsDiscovered(count)) => summary.category_roots = count,
            Ok(ScanEvent::Scanned(entry)) => index.push(*entry),
            Ok(ScanEvent::Started | ScanEvent::Complete) => {},
            Err(e) => {
                let kind: &ScanErrorKind = &e;
                if kind.is_fatal() {
                    return Err(e).or_raise(|| LibraryErrorKind::Scan);
                }
                tracing::warn!(error = %kind, details = ?e, "Skipping entry");
                summary.errors += 1;
            },
        }
    }
    summary.logic_images = index.logic_images.len();
    summary.arcade_definitions = index.arcade_definitions.len();
    tracing::info!(
        category_roots = summary.category_roots,
        logic_images = summary.logic_images,
        arcade_definitions = summary.arcade_definitions,
        errors = summary.errors,
        "Scan complete"
    );
    Ok((index, summary))
}
