use super::error::Error;
use crate::protocol::{Attrs, Handle, Name, Status, Version};

/// Receives decoded server responses from the read half of the stream.
/// This is `async_trait`
#[async_trait]
pub trait Handler: Sized {
    type Error: Into<Error>;

    /// Called on SSH_FXP_VERSION, the reply to INIT.
    #[allow(unused_variables)]
    async fn version(&mut self, version: Version) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called on SSH_FXP_STATUS. End of directory arrives as `Eof`.
    #[allow(unused_variables)]
    async fn status(&mut self, status: Status) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called on SSH_FXP_HANDLE for an opened directory.
    #[allow(unused_variables)]
    async fn handle(&mut self, handle: Handle) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called on SSH_FXP_NAME: a batch of directory records or a resolved path.
    #[allow(unused_variables)]
    async fn name(&mut self, name: Name) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when a reply to request `id` arrived but could not be decoded.
    /// `None` stands for the reply to INIT.
    #[allow(unused_variables)]
    async fn malformed(&mut self, id: Option<u32>, error: Error) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called on SSH_FXP_ATTRS in reply to STAT.
    #[allow(unused_variables)]
    async fn attrs(&mut self, attrs: Attrs) -> Result<(), Self::Error> {
        Ok(())
    }
}
