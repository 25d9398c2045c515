use super::{error::ListResult, RemoteSession};
use crate::protocol::File;

/// Reads every record of the directory at `path`, minus `.` and `..`.
///
/// The handle is closed whether the read loop finishes or fails. When both
/// the read and the close fail, the read error is returned.
pub async fn read_directory<S>(session: &S, path: &str) -> ListResult<Vec<File>>
where
    S: RemoteSession + ?Sized,
{
    let handle = session.open_dir(path).await?;
    debug!("opened directory {}", path);

    let result = read_batches(session, &handle).await;
    let closed = session.close_dir(&handle).await;
    debug!("closed directory {}", path);

    match (result, closed) {
        (Ok(files), Ok(())) => Ok(files),
        (Ok(_), Err(err)) | (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!("failed to close directory {}: {}", path, close_err);
            Err(err)
        }
    }
}

async fn read_batches<S>(session: &S, handle: &str) -> ListResult<Vec<File>>
where
    S: RemoteSession + ?Sized,
{
    let mut files = Vec::new();

    loop {
        let batch = session.read_dir(handle).await?;
        if batch.is_empty() {
            break;
        }

        trace!("read batch of {} entries", batch.len());
        files.extend(
            batch
                .into_iter()
                .filter(|f| f.filename != "." && f.filename != ".."),
        );
    }

    Ok(files)
}
