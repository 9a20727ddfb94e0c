//! Unwinding through every constructing path must leave the vector either
//! exactly as it was (reallocating paths) or valid (in-place paths), and
//! must never leak or double-drop an element.

use std::panic::{self, AssertUnwindSafe};

use rivet::Vector;
use rivet_test_utils::{Fuse, LiveCounter, PanicOnDrop, Tracked};

fn filled(n: u32, live: &LiveCounter, fuse: &Fuse) -> Vector<Tracked> {
    let mut v = Vector::new();
    for i in 0..n {
        v.push_back(Tracked::with_fuse(i, live, fuse));
    }
    v
}

fn snapshot(v: &Vector<Tracked>) -> (usize, usize, *const Tracked, Vec<u32>) {
    (
        v.len(),
        v.capacity(),
        v.as_ptr(),
        v.iter().map(Tracked::value).collect(),
    )
}

#[test]
fn panicking_append_at_capacity_changes_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let mut v = filled(4, &live, &fuse);
    assert_eq!(v.len(), v.capacity());
    let before = snapshot(&v);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace_back_with(|| panic!("constructor failed"));
    }));

    assert!(result.is_err());
    assert_eq!(snapshot(&v), before);
    assert_eq!(live.live(), 4);
    drop(v);
    assert_eq!(live.live(), 0);
}

#[test]
fn panicking_append_with_spare_capacity_changes_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let mut v = filled(3, &live, &fuse);
    assert!(v.len() < v.capacity());
    let before = snapshot(&v);

    let ctor = Fuse::new(0);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace_back_with(|| {
            ctor.burn();
            Tracked::new(99, &live)
        });
    }));

    assert!(result.is_err());
    assert_eq!(snapshot(&v), before);
    assert_eq!(live.live(), 3);
}

#[test]
fn panicking_reallocating_insert_changes_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let mut v = filled(8, &live, &fuse);
    assert_eq!(v.len(), v.capacity());
    let before = snapshot(&v);

    for index in [0, 3, 8] {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            v.emplace_with(index, || panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(snapshot(&v), before);
    }
    assert_eq!(live.live(), 8);
}

#[test]
fn panicking_in_place_insert_changes_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let mut v = filled(5, &live, &fuse);
    assert!(v.len() < v.capacity());
    let before = snapshot(&v);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace_with(1, || panic!("constructor failed"));
    }));

    assert!(result.is_err());
    assert_eq!(snapshot(&v), before);
    assert_eq!(live.live(), 5);
}

#[test]
fn clone_that_fails_after_n_copies_leaks_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let v = filled(10, &live, &fuse);
    let before = snapshot(&v);

    for n in 0..10 {
        fuse.rearm(n);
        let result = panic::catch_unwind(AssertUnwindSafe(|| v.clone()));
        assert!(result.is_err(), "clone should fail after {n} copies");
        assert_eq!(live.live(), 10);
        assert_eq!(snapshot(&v), before);
    }

    fuse.rearm(usize::MAX);
    let copy = v.clone();
    assert_eq!(copy, v);
    assert_eq!(live.live(), 20);
}

#[test]
fn reallocating_clone_from_is_all_or_nothing() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let source = filled(8, &live, &fuse);
    let mut dst = filled(2, &live, &Fuse::unlimited());
    let before = snapshot(&dst);
    assert!(source.len() > dst.capacity());

    fuse.rearm(5);
    let result = panic::catch_unwind(AssertUnwindSafe(|| dst.clone_from(&source)));

    assert!(result.is_err());
    assert_eq!(snapshot(&dst), before);
    assert_eq!(live.live(), 10);
}

#[test]
fn in_place_clone_from_stays_valid_on_failure() {
    let live = LiveCounter::new();
    let fuse = Fuse::unlimited();
    let source = filled(6, &live, &fuse);
    let mut dst = Vector::with_capacity(8);
    for i in 0..2 {
        dst.push_back(Tracked::new(100 + i, &live));
    }

    // Two assignments and one suffix clone succeed, the fourth burn fails.
    fuse.rearm(3);
    let result = panic::catch_unwind(AssertUnwindSafe(|| dst.clone_from(&source)));

    assert!(result.is_err());
    assert_eq!(dst.len(), 3);
    assert_eq!(dst.iter().map(Tracked::value).collect::<Vec<_>>(), [0, 1, 2]);
    assert_eq!(live.live(), 6 + 3);
    drop(dst);
    assert_eq!(live.live(), 6);
}

#[test]
fn with_len_failure_releases_partial_build() {
    #[derive(Debug)]
    struct Picky(#[allow(dead_code)] Tracked);

    thread_local! {
        static STATE: (LiveCounter, Fuse) = (LiveCounter::new(), Fuse::new(3));
    }

    impl Default for Picky {
        fn default() -> Self {
            STATE.with(|(live, fuse)| {
                fuse.burn();
                Picky(Tracked::new(0, live))
            })
        }
    }

    let result = panic::catch_unwind(|| Vector::<Picky>::with_len(5));
    assert!(result.is_err());
    STATE.with(|(live, _)| assert_eq!(live.live(), 0));
}

#[test]
fn resize_failure_keeps_constructed_elements() {
    let live = LiveCounter::new();
    let mut v: Vector<Tracked> = Vector::new();
    let ctor = Fuse::new(3);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.resize_with(6, || {
            ctor.burn();
            Tracked::new(1, &live)
        });
    }));

    assert!(result.is_err());
    assert_eq!(v.len(), 3);
    assert_eq!(v.capacity(), 6);
    assert_eq!(live.live(), 3);
}

#[test]
fn panicking_destructor_still_drops_the_rest() {
    let live = LiveCounter::new();
    let mut v = Vector::new();
    v.push_back((Tracked::new(0, &live), PanicOnDrop::disarmed()));
    v.push_back((Tracked::new(1, &live), PanicOnDrop::armed()));
    v.push_back((Tracked::new(2, &live), PanicOnDrop::disarmed()));

    let result = panic::catch_unwind(AssertUnwindSafe(move || drop(v)));

    assert!(result.is_err());
    assert_eq!(live.live(), 0);
}

#[test]
fn truncate_with_panicking_destructor_does_not_double_drop() {
    let live = LiveCounter::new();
    let mut v = Vector::new();
    v.push_back((Tracked::new(0, &live), PanicOnDrop::disarmed()));
    v.push_back((Tracked::new(1, &live), PanicOnDrop::armed()));

    let result = panic::catch_unwind(AssertUnwindSafe(|| v.truncate(0)));

    assert!(result.is_err());
    assert_eq!(v.len(), 0);
    assert_eq!(live.live(), 0);
}
