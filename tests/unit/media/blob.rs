use super::*;

#[test]
fn handles_are_unique_and_revocable() {
    let store = InMemoryBlobStore::new();
    let a = store.create(Arc::new(vec![1, 2, 3]), "video/mp4").unwrap();
    let b = store.create(Arc::new(vec![4]), "video/webm").unwrap();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("blob:"));
    assert_eq!(store.live_count(), 2);
    assert_eq!(store.bytes(&a).unwrap().as_slice(), &[1, 2, 3]);

    store.revoke(&a);
    assert!(!store.is_live(&a));
    assert!(store.is_live(&b));
    assert_eq!(store.revocations(&a), 1);
    assert_eq!(store.revocations(&b), 0);
}

#[test]
fn double_revoke_is_counted() {
    let store = InMemoryBlobStore::new();
    let a = store.create(Arc::new(vec![]), "video/mp4").unwrap();
    store.revoke(&a);
    store.revoke(&a);
    assert_eq!(store.revocations(&a), 2);
    assert_eq!(store.live_count(), 0);
}
