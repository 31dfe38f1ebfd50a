use crate::error::Error;
use crate::path::Path;
use crate::protocol::Value;
use crate::rpc::Stub;

/// Typed client wrapper around a [`Stub`] targeting the `Storage` interface.
/// The hand-written equivalent of a generated stub (spec §9 DESIGN NOTES).
#[derive(Clone, Debug, PartialEq)]
pub struct StorageClient(pub Stub);

impl StorageClient {
    pub fn new(stub: Stub) -> Self {
        Self(stub)
    }

    pub fn stub(&self) -> &Stub {
        &self.0
    }

    pub async fn size(&self, path: &Path) -> Result<u64, Error> {
        let result = self
            .0
            .call("size", vec![Value::new(path.to_string())])
            .await?;
        result.cast_as().map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, Error> {
        let result = self
            .0
            .call(
                "read",
                vec![
                    Value::new(path.to_string()),
                    Value::new(offset),
                    Value::new(length),
                ],
            )
            .await?;
        result.cast_as().map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn write(&self, path: &Path, offset: i64, data: &[u8]) -> Result<(), Error> {
        self.0
            .call(
                "write",
                vec![
                    Value::new(path.to_string()),
                    Value::new(offset),
                    Value::new(data.to_vec()),
                ],
            )
            .await?;
        Ok(())
    }
}

/// Typed client wrapper around a [`Stub`] targeting the `Command` interface.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandClient(pub Stub);

impl CommandClient {
    pub fn new(stub: Stub) -> Self {
        Self(stub)
    }

    pub fn stub(&self) -> &Stub {
        &self.0
    }

    pub async fn create(&self, path: &Path) -> Result<bool, Error> {
        let result = self
            .0
            .call("create", vec![Value::new(path.to_string())])
            .await?;
        result.cast_as().map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        let result = self
            .0
            .call("delete", vec![Value::new(path.to_string())])
            .await?;
        result.cast_as().map_err(|e| Error::internal(e.to_string()))
    }
}
