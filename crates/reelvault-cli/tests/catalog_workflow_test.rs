use reelvault_cli::JsonCatalog;
use reelvault_core::{ListQuery, NewVideo, StorageConfig};
use reelvault_media::{Delivery, MediaService};
use reelvault_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;

fn open_service(dir: &TempDir) -> (Arc<JsonCatalog>, MediaService) {
    let config = StorageConfig::new(dir.path().join("videos")).with_allowed_extensions(["mp4"]);
    let storage = Arc::new(LocalStorage::new(Arc::new(config)).unwrap());
    let catalog = Arc::new(JsonCatalog::open(dir.path().join("catalog.json")).unwrap());
    let service = MediaService::new(storage, catalog.clone(), catalog.clone());
    (catalog, service)
}

#[test]
fn test_upload_survives_restart() {
    let dir = TempDir::new().unwrap();

    let (catalog, service) = open_service(&dir);
    let owner = catalog.add_owner("alice").unwrap();
    let video = service
        .upload(
            NewVideo {
                owner_id: Some(owner.id),
                title: Some("Beach Day".to_string()),
                description: None,
                is_public: true,
            },
            b"hello",
            Some("beach.mp4"),
        )
        .unwrap();
    drop(service);
    drop(catalog);

    let (_catalog, service) = open_service(&dir);
    let delivered = service.deliver(video.id, Delivery::Download).unwrap();
    assert_eq!(delivered.bytes, b"hello");
    assert_eq!(delivered.filename, "Beach_Day.mp4");

    let page = service
        .list(ListQuery {
            is_public: Some(true),
            ..ListQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);

    service.remove(video.id).unwrap();
    let (_catalog, service) = open_service(&dir);
    assert!(service.get(video.id).is_err());
    assert_eq!(
        std::fs::read_dir(dir.path().join("videos")).unwrap().count(),
        0
    );
}
