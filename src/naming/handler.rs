use std::sync::Arc;

use async_trait::async_trait;

use crate::naming::server::NamingServer;
use crate::path::Path;
use crate::protocol::Value;
use crate::rpc::{DispatchError, Handler};
use crate::storage::ServerStubs;

fn arg_path(args: &[Value], index: usize) -> Result<Path, DispatchError> {
    let raw: String = args
        .get(index)
        .cloned()
        .ok_or_else(|| DispatchError::bad_argument(format!("missing argument {index}")))?
        .cast_as()
        .map_err(|e| DispatchError::bad_argument(format!("argument {index} not a path: {e}")))?;
    Path::parse(&raw).map_err(DispatchError::from)
}

/// Dispatches the client-facing `Service` interface onto a shared
/// [`NamingServer`] (spec §4.8).
pub struct ServiceHandler(pub Arc<NamingServer>);

#[async_trait]
impl Handler for ServiceHandler {
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        match method {
            "is_directory" => {
                let path = arg_path(&args, 0)?;
                Ok(Value::new(self.0.is_directory(&path).await?))
            }
            "list" => {
                let path = arg_path(&args, 0)?;
                Ok(Value::new(self.0.list(&path).await?))
            }
            "create_file" => {
                let path = arg_path(&args, 0)?;
                Ok(Value::new(self.0.create_file(&path).await?))
            }
            "create_directory" => {
                let path = arg_path(&args, 0)?;
                Ok(Value::new(self.0.create_directory(&path).await?))
            }
            "delete" => {
                let path = arg_path(&args, 0)?;
                Ok(Value::new(self.0.delete(&path).await?))
            }
            "get_storage" => {
                let path = arg_path(&args, 0)?;
                let client = self.0.get_storage(&path).await?;
                Ok(Value::new(
                    serde_json::to_value(client.stub())
                        .map_err(|e| DispatchError::bad_argument(e.to_string()))?,
                ))
            }
            _ => Err(DispatchError::no_such_method(method)),
        }
    }
}

/// Dispatches the registration-facing `Registration` interface onto a shared
/// [`NamingServer`] (spec §4.8).
pub struct RegistrationHandler(pub Arc<NamingServer>);

#[async_trait]
impl Handler for RegistrationHandler {
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        match method {
            "register" => {
                let stubs: ServerStubs = args
                    .first()
                    .cloned()
                    .ok_or_else(|| DispatchError::bad_argument("missing stubs argument"))?
                    .cast_as()
                    .map_err(|e| DispatchError::bad_argument(format!("bad stubs: {e}")))?;
                let raw_files: Vec<String> = args
                    .get(1)
                    .cloned()
                    .ok_or_else(|| DispatchError::bad_argument("missing files argument"))?
                    .cast_as()
                    .map_err(|e| DispatchError::bad_argument(format!("bad files: {e}")))?;
                let files = raw_files
                    .into_iter()
                    .map(|s| Path::parse(&s))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(DispatchError::from)?;

                let duplicates = self.0.register(stubs, files).await?;
                let raw_duplicates: Vec<String> =
                    duplicates.iter().map(Path::to_string).collect();
                Ok(Value::new(raw_duplicates))
            }
            _ => Err(DispatchError::no_such_method(method)),
        }
    }
}
