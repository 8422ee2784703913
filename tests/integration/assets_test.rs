//! Slot and gallery scenarios over the mock transfer service

mod common;

use bouquet_assets::{AssetRef, AssetSlot, GalleryCollection, SubmitOutcome, GALLERY_CAPACITY};
use bouquet_storage::DurableRef;
use common::{jpeg, jpegs, TestSession};

fn gallery(session: &TestSession) -> GalleryCollection {
    GalleryCollection::new("invitations/kim-and-lee/gallery", session.services.pipeline()).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_slot_last_submit_wins() {
    let session = TestSession::new();
    let slot = AssetSlot::new("invitations/kim-and-lee/cover", session.services.pipeline()).unwrap();
    let slow = session.storage.hold("a.jpg");

    let first = tokio::spawn({
        let slot = slot.clone();
        async move { slot.submit(jpeg("a.jpg")).await }
    });
    session.transfers_started(1).await;

    let second = slot.submit(jpeg("b.jpg")).await.unwrap();
    slow.release();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first, SubmitOutcome::Superseded);
    let SubmitOutcome::Stored(b) = second else {
        panic!("latest submit should be stored, got {second:?}");
    };
    assert_eq!(slot.snapshot().value, Some(AssetRef::Durable(b)));
    assert!(!slot.is_pending());
}

#[test_log::test(tokio::test)]
async fn test_gallery_with_29_accepts_one_of_two() {
    let session = TestSession::new();
    let gallery = gallery(&session);
    gallery.hydrate(
        (0..29)
            .map(|i| DurableRef(format!("https://cdn/{i}.jpg")))
            .collect(),
    );
    let mut notices = session.services.notices.subscribe();

    let report = gallery.add(jpegs("new", 2)).await;

    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.truncated, 1);
    assert_eq!(gallery.len(), GALLERY_CAPACITY);
    assert_eq!(notices.recv().await.unwrap().code, "GALLERY_TRUNCATED");
}

#[test_log::test(tokio::test)]
async fn test_gallery_size_bounded_across_many_batches() {
    let session = TestSession::new();
    let gallery = gallery(&session);

    for (batch, size) in [7, 19, 40, 3].into_iter().enumerate() {
        gallery.add(jpegs(&format!("batch{batch}"), size)).await;
        assert!(gallery.len() <= GALLERY_CAPACITY);
    }
    assert_eq!(gallery.len(), GALLERY_CAPACITY);
}

#[test_log::test(tokio::test)]
async fn test_remove_during_upload_never_resurrects() {
    let session = TestSession::new();
    let gallery = gallery(&session);
    let slow = session.storage.hold("photo-1.jpg");

    let batch = tokio::spawn({
        let gallery = gallery.clone();
        async move { gallery.add(jpegs("photo", 3)).await }
    });
    session.transfers_started(2).await;

    let victim = gallery.snapshot().ids()[1];
    assert!(gallery.remove(victim));
    slow.release();

    let report = batch.await.unwrap();
    assert!(!report.stored.contains(&victim));
    assert_eq!(report.stored.len(), 2);
    assert_eq!(gallery.snapshot().position(victim), None);
    assert_eq!(gallery.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_reorder_from_index_three_to_front() {
    let session = TestSession::new();
    let gallery = gallery(&session);
    gallery.add(jpegs("photo", 5)).await;
    let before = gallery.snapshot().ids();
    let moved = before[3];

    assert!(gallery.reorder(moved, 0));

    let after = gallery.snapshot().ids();
    assert_eq!(after, vec![moved, before[0], before[1], before[2], before[4]]);
}

#[test_log::test(tokio::test)]
async fn test_failed_upload_removes_only_that_entry() {
    let session = TestSession::new();
    let gallery = gallery(&session);
    session.storage.fail_file("photo-0.jpg");

    let report = gallery.add(jpegs("photo", 3)).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.stored.len(), 2);
    assert_eq!(gallery.durable_refs().len(), 2);
    assert!(gallery
        .snapshot()
        .items
        .iter()
        .all(|item| item.value.is_durable()));
}
