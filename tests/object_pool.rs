extern crate prism;

use prism::utils::*;

#[test]
fn basic() {
    let mut set = ObjectPool::<Handle, i32>::new();

    let e1 = set.create(3);
    assert_eq!(set.get(e1), Some(&3));
    assert_eq!(set.len(), 1);
    assert_eq!(set.free(e1), Some(3));
    assert_eq!(set.len(), 0);
    assert_eq!(set.get(e1), None);
    assert_eq!(set.free(e1), None);
    assert!(set.is_empty());
}

#[test]
fn iterator() {
    let mut set = ObjectPool::<Handle, i32>::new();
    for i in 0..10 {
        set.create(i);
    }

    assert_eq!(set.iter().count(), 10);
    for (i, (h, &v)) in set.iter().enumerate() {
        assert_eq!(h, Handle::new(i as u32, 1));
        assert_eq!(v, i as i32);
    }
}

#[test]
fn recycled_slots_reject_stale_handles() {
    let mut set = ObjectPool::<Handle, &str>::new();
    let stale = set.create("a");
    set.free(stale).unwrap();

    let fresh = set.create("b");
    assert_eq!(fresh.index(), stale.index());
    assert_ne!(fresh.version(), stale.version());
    assert!(!set.contains(stale));
    assert_eq!(set.get(stale), None);
    assert_eq!(set.get(fresh), Some(&"b"));

    *set.get_mut(fresh).unwrap() = "c";
    assert_eq!(set.get(fresh), Some(&"c"));
}

#[test]
fn handle_pool_versions_are_odd_while_alive() {
    let mut pool = HandlePool::<Handle>::new();
    let a = pool.create();
    assert_eq!(a.version() % 2, 1);
    assert!(pool.is_alive(a));

    assert!(pool.free(a));
    assert!(!pool.free(a));
    assert!(!pool.is_alive(a));

    let b = pool.create();
    assert_eq!(b.index(), a.index());
    assert_eq!(b.version() % 2, 1);
    assert!(pool.is_alive(b));
    assert_eq!(pool.iter().collect::<Vec<_>>(), vec![b]);
}

#[test]
fn nil_handle_is_never_alive() {
    let mut pool = HandlePool::<Handle>::new();
    pool.create();
    assert!(Handle::nil().is_nil());
    assert!(!pool.is_alive(Handle::nil()));
}
