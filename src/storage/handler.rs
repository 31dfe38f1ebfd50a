use std::sync::Arc;

use async_trait::async_trait;

use crate::path::Path;
use crate::protocol::Value;
use crate::rpc::{DispatchError, Handler};
use crate::storage::server::StorageServer;

fn arg_path(args: &[Value], index: usize) -> Result<Path, DispatchError> {
    let raw: String = args
        .get(index)
        .cloned()
        .ok_or_else(|| DispatchError::bad_argument(format!("missing argument {index}")))?
        .cast_as()
        .map_err(|e| DispatchError::bad_argument(format!("argument {index} not a path: {e}")))?;
    Path::parse(&raw).map_err(DispatchError::from)
}

fn arg_i64(args: &[Value], index: usize) -> Result<i64, DispatchError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| DispatchError::bad_argument(format!("missing argument {index}")))?
        .cast_as()
        .map_err(|e| DispatchError::bad_argument(format!("argument {index} not an integer: {e}")))
}

fn arg_bytes(args: &[Value], index: usize) -> Result<Vec<u8>, DispatchError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| DispatchError::bad_argument(format!("missing argument {index}")))?
        .cast_as()
        .map_err(|e| DispatchError::bad_argument(format!("argument {index} not bytes: {e}")))
}

/// Dispatches the `Storage` interface (`size`, `read`, `write`) onto a shared
/// [`StorageServer`] (spec §4.6, §6).
pub struct StorageHandler(pub Arc<StorageServer>);

#[async_trait]
impl Handler for StorageHandler {
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        match method {
            "size" => {
                let path = arg_path(&args, 0)?;
                let size = self.0.size(&path).await?;
                Ok(Value::new(size))
            }
            "read" => {
                let path = arg_path(&args, 0)?;
                let offset = arg_i64(&args, 1)?;
                let length = arg_i64(&args, 2)?;
                let bytes = self.0.read(&path, offset, length).await?;
                Ok(Value::new(bytes))
            }
            "write" => {
                let path = arg_path(&args, 0)?;
                let offset = arg_i64(&args, 1)?;
                let data = arg_bytes(&args, 2)?;
                self.0.write(&path, offset, &data).await?;
                Ok(Value::null())
            }
            _ => Err(DispatchError::no_such_method(method)),
        }
    }
}

/// Dispatches the `Command` interface (`create`, `delete`) onto a shared
/// [`StorageServer`] (spec §4.6, §6). Invoked by the naming server to
/// materialize or remove files on behalf of clients.
pub struct CommandHandler(pub Arc<StorageServer>);

#[async_trait]
impl Handler for CommandHandler {
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        match method {
            "create" => {
                let path = arg_path(&args, 0)?;
                let created = self.0.create(&path).await?;
                Ok(Value::new(created))
            }
            "delete" => {
                let path = arg_path(&args, 0)?;
                let deleted = self.0.delete(&path).await?;
                Ok(Value::new(deleted))
            }
            _ => Err(DispatchError::no_such_method(method)),
        }
    }
}
