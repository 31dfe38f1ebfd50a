//! End-to-end checks of the RPC substrate itself (spec §8): a skeleton and
//! stub talking over a real loopback TCP connection, independent of the
//! naming/storage domain logic.

use async_trait::async_trait;

use meshfs::error::{Error, ErrorKind};
use meshfs::protocol::Value;
use meshfs::rpc::{DispatchError, Handler, Skeleton, Stub};

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        match method {
            "echo" => Ok(args.into_iter().next().unwrap_or_else(Value::null)),
            "fail" => Err(DispatchError::from(Error::invalid_argument("requested failure"))),
            _ => Err(DispatchError::no_such_method(method)),
        }
    }
}

async fn running_echo() -> (Skeleton<EchoHandler>, Stub) {
    let skeleton = Skeleton::new(EchoHandler);
    let addr = skeleton.start(None).await.unwrap();
    let stub = Stub::new(addr, "Echo");
    (skeleton, stub)
}

#[tokio::test]
async fn echo_round_trips_values() {
    let (skeleton, stub) = running_echo().await;

    for input in ["", "hello", "\u{1F980}", "line one\nline two"] {
        let result: String = stub
            .call("echo", vec![Value::new(input)])
            .await
            .unwrap()
            .cast_as()
            .unwrap();
        assert_eq!(result, input);
    }

    skeleton.stop().await;
}

#[tokio::test]
async fn unknown_method_responds_not_found() {
    let (skeleton, stub) = running_echo().await;

    let err = stub.call("nonexistent", vec![]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    skeleton.stop().await;
}

#[tokio::test]
async fn domain_error_is_reraised_to_the_caller() {
    let (skeleton, stub) = running_echo().await;

    let err = stub.call("fail", vec![]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(err.description, "requested failure");

    skeleton.stop().await;
}

#[tokio::test]
async fn calling_after_stop_fails_remote() {
    let (skeleton, stub) = running_echo().await;
    skeleton.stop().await;

    let err = stub.call("echo", vec![Value::new("x")]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Remote);
}

#[test]
fn stub_equality_does_not_require_a_connection() {
    let addr = "127.0.0.1:9999".parse().unwrap();
    let a = Stub::new(addr, "Echo");
    let b = Stub::new(addr, "Echo");
    assert_eq!(a, b);
}
