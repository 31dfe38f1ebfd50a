use crate::error::Error;
use crate::path::Path;
use crate::protocol::Value;
use crate::rpc::Stub;
use crate::storage::{ServerStubs, StorageClient};

/// Well-known ports exposed by a naming server (spec §6): one for the
/// client-facing `Service` interface, one for the storage-server-facing
/// `Registration` interface.
pub struct NamingStubs;

impl NamingStubs {
    pub const SERVICE_PORT: u16 = 11_530;
    pub const REGISTRATION_PORT: u16 = 11_531;
}

/// Typed client wrapper around a [`Stub`] targeting the `Service` interface.
#[derive(Clone, Debug, PartialEq)]
pub struct NamingServiceClient(pub Stub);

impl NamingServiceClient {
    pub fn new(stub: Stub) -> Self {
        Self(stub)
    }

    pub async fn is_directory(&self, path: &Path) -> Result<bool, Error> {
        self.0
            .call("is_directory", vec![Value::new(path.to_string())])
            .await?
            .cast_as()
            .map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn list(&self, path: &Path) -> Result<Vec<String>, Error> {
        self.0
            .call("list", vec![Value::new(path.to_string())])
            .await?
            .cast_as()
            .map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn create_file(&self, path: &Path) -> Result<bool, Error> {
        self.0
            .call("create_file", vec![Value::new(path.to_string())])
            .await?
            .cast_as()
            .map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn create_directory(&self, path: &Path) -> Result<bool, Error> {
        self.0
            .call("create_directory", vec![Value::new(path.to_string())])
            .await?
            .cast_as()
            .map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        self.0
            .call("delete", vec![Value::new(path.to_string())])
            .await?
            .cast_as()
            .map_err(|e| Error::internal(e.to_string()))
    }

    pub async fn get_storage(&self, path: &Path) -> Result<StorageClient, Error> {
        let value = self
            .0
            .call("get_storage", vec![Value::new(path.to_string())])
            .await?;
        let stub: Stub = value.cast_as().map_err(|e| Error::internal(e.to_string()))?;
        Ok(StorageClient::new(stub))
    }
}

/// Typed client wrapper around a [`Stub`] targeting the `Registration`
/// interface, used by a storage server to announce itself (spec §4.6, §4.8).
#[derive(Clone, Debug, PartialEq)]
pub struct NamingRegistrationClient(pub Stub);

impl NamingRegistrationClient {
    pub fn new(stub: Stub) -> Self {
        Self(stub)
    }

    pub async fn register(
        &self,
        stubs: ServerStubs,
        files: Vec<Path>,
    ) -> Result<Vec<Path>, Error> {
        let raw_files: Vec<String> = files.iter().map(Path::to_string).collect();
        let stubs_value = serde_json::to_value(&stubs).map_err(|e| Error::internal(e.to_string()))?;

        let value = self
            .0
            .call("register", vec![Value::new(stubs_value), Value::new(raw_files)])
            .await?;

        let raw_duplicates: Vec<String> =
            value.cast_as().map_err(|e| Error::internal(e.to_string()))?;
        raw_duplicates
            .into_iter()
            .map(|s| Path::parse(&s))
            .collect()
    }
}
