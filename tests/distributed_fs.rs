//! End-to-end naming + storage scenarios (spec §8): real skeletons bound to
//! system-assigned ports, talking over real TCP connections, wired together
//! the same way `naming-server`/`storage-server` wire them in production.

use std::sync::Arc;

use meshfs::naming::{NamingRegistrationClient, NamingServer, NamingServiceClient, RegistrationHandler, ServiceHandler};
use meshfs::path::Path;
use meshfs::rpc::{Skeleton, Stub};
use meshfs::storage::{CommandHandler, ServerStubs, StorageHandler, StorageNode, StorageServer};

struct NamingFixture {
    service: Skeleton<ServiceHandler>,
    registration: Skeleton<RegistrationHandler>,
    service_client: NamingServiceClient,
    registration_client: NamingRegistrationClient,
}

async fn start_naming() -> NamingFixture {
    let server = Arc::new(NamingServer::new());
    let service = Skeleton::new(ServiceHandler(Arc::clone(&server)));
    let registration = Skeleton::new(RegistrationHandler(Arc::clone(&server)));

    let service_addr = service.start(None).await.unwrap();
    let registration_addr = registration.start(None).await.unwrap();

    NamingFixture {
        service,
        registration,
        service_client: NamingServiceClient::new(Stub::new(service_addr, "Service")),
        registration_client: NamingRegistrationClient::new(Stub::new(registration_addr, "Registration")),
    }
}

struct StorageFixture {
    storage_skeleton: Skeleton<StorageHandler>,
    command_skeleton: Skeleton<CommandHandler>,
    stubs: ServerStubs,
    _dir: tempfile::TempDir,
}

async fn start_storage() -> StorageFixture {
    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(StorageServer::new(dir.path()).unwrap());
    let storage_skeleton = Skeleton::new(StorageHandler(Arc::clone(&server)));
    let command_skeleton = Skeleton::new(CommandHandler(Arc::clone(&server)));

    let storage_addr = storage_skeleton.start(None).await.unwrap();
    let command_addr = command_skeleton.start(None).await.unwrap();

    let stubs = ServerStubs::new(
        Stub::new(storage_addr, "Storage"),
        Stub::new(command_addr, "Command"),
    );

    StorageFixture {
        storage_skeleton,
        command_skeleton,
        stubs,
        _dir: dir,
    }
}

#[tokio::test]
async fn scenario_c_create_file_delivers_a_real_create_command() {
    let naming = start_naming().await;
    let storage = start_storage().await;

    let duplicates = naming
        .registration_client
        .register(storage.stubs.clone(), vec![])
        .await
        .unwrap();
    assert!(duplicates.is_empty());

    let path = Path::parse("/greeting").unwrap();
    assert!(naming.service_client.create_file(&path).await.unwrap());

    // The file must now be visible both in the naming tree and, because the
    // naming server relayed a real `create` command, on disk at the storage
    // server that owns it.
    let mut children = naming.service_client.list(&Path::root()).await.unwrap();
    children.sort();
    assert_eq!(children, vec!["greeting".to_string()]);

    let owner = naming.service_client.get_storage(&path).await.unwrap();
    assert_eq!(owner.stub(), &storage.stubs.storage);
    assert_eq!(owner.size(&path).await.unwrap(), 0);

    owner.write(&path, 0, b"hello").await.unwrap();
    assert_eq!(owner.read(&path, 0, 5).await.unwrap(), b"hello");

    storage.storage_skeleton.stop().await;
    storage.command_skeleton.stop().await;
    naming.service.stop().await;
    naming.registration.stop().await;
}

#[tokio::test]
async fn delete_through_naming_server_cascades_to_storage() {
    let naming = start_naming().await;
    let storage = start_storage().await;

    naming
        .registration_client
        .register(storage.stubs.clone(), vec![])
        .await
        .unwrap();

    let path = Path::parse("/doomed").unwrap();
    naming.service_client.create_file(&path).await.unwrap();

    let owner = naming.service_client.get_storage(&path).await.unwrap();
    assert_eq!(owner.size(&path).await.unwrap(), 0);

    assert!(naming.service_client.delete(&path).await.unwrap());
    assert!(naming.service_client.is_directory(&path).await.is_err());

    // The underlying file must actually be gone on the storage server, not
    // merely unlisted in the naming tree.
    let err = owner.size(&path).await.unwrap_err();
    assert_eq!(err.kind, meshfs::error::ErrorKind::NotFound);

    storage.storage_skeleton.stop().await;
    storage.command_skeleton.stop().await;
    naming.service.stop().await;
    naming.registration.stop().await;
}

#[tokio::test]
async fn storage_node_start_registers_existing_files_and_drops_duplicates() {
    let naming = start_naming().await;

    let registration_addr = naming.registration_client.0.address();

    let dir_a = tempfile::tempdir().unwrap();
    std::fs::write(dir_a.path().join("shared"), b"from a").unwrap();
    let node_a = StorageNode::new(dir_a.path()).unwrap();
    node_a.start("127.0.0.1", registration_addr).await.unwrap();

    let dir_b = tempfile::tempdir().unwrap();
    std::fs::write(dir_b.path().join("shared"), b"from b").unwrap();
    std::fs::write(dir_b.path().join("unique"), b"only here").unwrap();
    let node_b = StorageNode::new(dir_b.path()).unwrap();
    node_b.start("127.0.0.1", registration_addr).await.unwrap();

    // node_b's "shared" duplicated an already-registered path, so node_b must
    // have deleted its own copy locally.
    assert!(!dir_b.path().join("shared").exists());
    assert!(dir_b.path().join("unique").exists());

    let mut children = naming.service_client.list(&Path::root()).await.unwrap();
    children.sort();
    assert_eq!(children, vec!["shared".to_string(), "unique".to_string()]);

    node_a.stop().await;
    node_b.stop().await;
    naming.service.stop().await;
    naming.registration.stop().await;
}
