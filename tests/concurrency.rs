//! Concurrency tests: the properties that fall over with count-as-id
//! allocation or unserialized suite read-modify-writes.

use casebook::prelude::*;
use casebook::HashBackend;
use casebook_storage::MemoryHashStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn concurrent_case_creation_yields_distinct_ids_and_exact_count() {
    init_tracing();
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let db = Arc::new(Casebook::open().unwrap());
    let suite_id = db.suites.create("contended").unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = Arc::clone(&db);
            let suite_id = suite_id.clone();
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        db.cases
                            .create(&suite_id, &format!("case {t}-{i}"), "")
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<EntityId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let total = THREADS * PER_THREAD;
    let distinct: HashSet<_> = ids.iter().cloned().collect();
    assert_eq!(distinct.len(), total, "duplicate case ids handed out");

    let suite = db.suites.get(&suite_id).unwrap();
    assert_eq!(suite.length as usize, total);
    assert_eq!(suite.cases.len(), total);
    let linked: HashSet<_> = suite.cases.iter().cloned().collect();
    assert_eq!(linked, distinct, "suite case list disagrees with created ids");
}

#[test]
fn concurrent_creation_across_suites_does_not_cross_link() {
    let db = Arc::new(Casebook::open().unwrap());
    let suites: Vec<EntityId> = (0..4)
        .map(|i| db.suites.create(&format!("suite {i}")).unwrap())
        .collect();

    let handles: Vec<_> = suites
        .iter()
        .cloned()
        .map(|suite_id| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..50 {
                    db.cases
                        .create(&suite_id, &format!("case {i}"), "")
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for suite_id in &suites {
        let suite = db.suites.get(suite_id).unwrap();
        assert_eq!(suite.length, 50);
        for case_id in &suite.cases {
            assert_eq!(db.cases.get(case_id).unwrap().suite_id, *suite_id);
        }
    }
}

#[test]
fn concurrent_create_and_delete_settle_consistent() {
    let db = Arc::new(Casebook::open().unwrap());
    let suite_id = db.suites.create("churn").unwrap();

    // Seed cases for the deleter threads.
    let seeded: Vec<EntityId> = (0..40)
        .map(|i| db.cases.create(&suite_id, &format!("seed {i}"), "").unwrap())
        .collect();

    let mut handles = Vec::new();
    for chunk in seeded.chunks(20) {
        let db = Arc::clone(&db);
        let chunk = chunk.to_vec();
        handles.push(thread::spawn(move || {
            for id in chunk {
                db.cases.delete(&id).unwrap();
            }
        }));
    }
    for t in 0..2 {
        let db = Arc::clone(&db);
        let suite_id = suite_id.clone();
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                db.cases
                    .create(&suite_id, &format!("new {t}-{i}"), "")
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let suite = db.suites.get(&suite_id).unwrap();
    assert_eq!(suite.length, 40, "40 created + 40 deleted of 40 seeded");
    assert_eq!(suite.length as usize, suite.cases.len());
    for case_id in &suite.cases {
        assert_eq!(db.cases.get(case_id).unwrap().suite_id, suite_id);
    }
}

/// Wraps the in-memory backend and stalls one designated read.
///
/// When armed, the first `get` of the configured hash/key reads its value
/// and then parks between the two barriers, letting the test run a
/// competing sequence to completion before the stalled caller proceeds on
/// its now-stale read.
struct StallingBackend {
    inner: MemoryHashStore,
    stall_hash: String,
    stall_key: String,
    armed: AtomicBool,
    paused: Barrier,
    resume: Barrier,
}

impl StallingBackend {
    fn new(stall_hash: &str, stall_key: &str) -> Self {
        StallingBackend {
            inner: MemoryHashStore::new(),
            stall_hash: stall_hash.to_string(),
            stall_key: stall_key.to_string(),
            armed: AtomicBool::new(false),
            paused: Barrier::new(2),
            resume: Barrier::new(2),
        }
    }
}

impl HashBackend for StallingBackend {
    fn set_if_absent(&self, hash: &str, key: &str, value: &str) -> Result<bool> {
        self.inner.set_if_absent(hash, key, value)
    }

    fn set_if_present(&self, hash: &str, key: &str, value: &str) -> Result<bool> {
        self.inner.set_if_present(hash, key, value)
    }

    fn get(&self, hash: &str, key: &str) -> Result<Option<String>> {
        let value = self.inner.get(hash, key)?;
        if hash == self.stall_hash
            && key == self.stall_key
            && self.armed.swap(false, Ordering::SeqCst)
        {
            self.paused.wait();
            self.resume.wait();
        }
        Ok(value)
    }

    fn get_all(&self, hash: &str) -> Result<Vec<(String, String)>> {
        self.inner.get_all(hash)
    }

    fn delete(&self, hash: &str, key: &str) -> Result<bool> {
        self.inner.delete(hash, key)
    }

    fn delete_hash(&self, hash: &str) -> Result<bool> {
        self.inner.delete_hash(hash)
    }

    fn count(&self, hash: &str) -> Result<usize> {
        self.inner.count(hash)
    }

    fn contains(&self, hash: &str, key: &str) -> Result<bool> {
        self.inner.contains(hash, key)
    }

    fn next_id(&self, hash: &str) -> Result<u64> {
        self.inner.next_id(hash)
    }
}

#[test]
fn delete_retries_when_relink_moves_the_case() {
    // A relink lands between the deleter's owner read and its suite lock.
    // The deleter must notice the stale read and chase the case to its new
    // suite instead of unlinking from the old one and leaving the dead id
    // listed in the new one.
    let backend = Arc::new(StallingBackend::new("test_case_hash", "1"));
    let db = Arc::new(
        Casebook::builder()
            .backend(backend.clone() as Arc<dyn HashBackend>)
            .open()
            .unwrap(),
    );
    let from = db.suites.create("from").unwrap();
    let to = db.suites.create("to").unwrap();
    let case_id = db.cases.create(&from, "t", "").unwrap();
    assert_eq!(case_id.as_str(), "1");

    backend.armed.store(true, Ordering::SeqCst);
    let deleter = {
        let db = Arc::clone(&db);
        let id = case_id.clone();
        thread::spawn(move || db.cases.delete(&id))
    };

    // The deleter has read the old owner and is parked.
    backend.paused.wait();
    db.cases.update(&case_id, &to, "t", "").unwrap();
    backend.resume.wait();

    deleter.join().unwrap().unwrap();

    assert!(db.cases.get(&case_id).unwrap_err().is_not_found());
    for suite_id in [&from, &to] {
        let suite = db.suites.get(suite_id).unwrap();
        assert!(suite.cases.is_empty(), "deleted case still linked");
        assert_eq!(suite.length, 0);
    }
}

#[test]
fn relink_races_forced_cascade_coherently() {
    // Whichever side wins the source suite's lock: the relink moved the
    // case out before the cascade, or the cascade removed it and the
    // relink reports the case gone. Nothing in between.
    for _ in 0..20 {
        let db = Arc::new(Casebook::open().unwrap());
        let from = db.suites.create("from").unwrap();
        let to = db.suites.create("to").unwrap();
        let case_id = db.cases.create(&from, "t", "").unwrap();

        let mover = {
            let db = Arc::clone(&db);
            let id = case_id.clone();
            let to = to.clone();
            thread::spawn(move || db.cases.update(&id, &to, "t", ""))
        };
        let reaper = {
            let db = Arc::clone(&db);
            let from = from.clone();
            thread::spawn(move || db.suites.delete(&from, true))
        };

        let moved = mover.join().unwrap();
        reaper.join().unwrap().unwrap();

        assert!(db.suites.get(&from).unwrap_err().is_not_found());
        match moved {
            Ok(()) => {
                assert_eq!(db.cases.get(&case_id).unwrap().suite_id, to);
                assert_eq!(db.suites.get(&to).unwrap().cases, vec![case_id.clone()]);
            }
            Err(e) => {
                assert!(e.is_not_found());
                assert!(db.cases.get(&case_id).unwrap_err().is_not_found());
                assert!(db.suites.get(&to).unwrap().cases.is_empty());
            }
        }
    }
}

#[test]
fn bulk_case_wipe_excludes_in_flight_creation() {
    let db = Arc::new(Casebook::open().unwrap());
    let suite_id = db.suites.create("wiped").unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let creators: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            let suite_id = suite_id.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut i = 0;
                while !stop.load(Ordering::SeqCst) {
                    db.cases
                        .create(&suite_id, &format!("case {t}-{i}"), "")
                        .unwrap();
                    i += 1;
                }
            })
        })
        .collect();

    for _ in 0..25 {
        db.cases.delete_all().unwrap();
    }
    stop.store(true, Ordering::SeqCst);
    for h in creators {
        h.join().unwrap();
    }

    // Whatever landed after the last wipe must be fully linked, and the
    // suite must list nothing that was wiped.
    let suite = db.suites.get(&suite_id).unwrap();
    let cases = db.cases.list().unwrap();
    assert_eq!(suite.length as usize, suite.cases.len());
    assert_eq!(cases.len(), suite.cases.len());
    for case in &cases {
        assert!(suite.cases.contains(&case.id));
        assert_eq!(case.suite_id, suite_id);
    }
}

#[test]
fn forced_suite_wipe_never_leaves_orphan_cases() {
    let db = Arc::new(Casebook::open().unwrap());

    let stop = Arc::new(AtomicBool::new(false));
    let creators: Vec<_> = (0..3)
        .map(|_| {
            let db = Arc::clone(&db);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Some(suite) = db.suites.list().unwrap().into_iter().next() else {
                        thread::yield_now();
                        continue;
                    };
                    // The suite may be wiped before the create lands.
                    match db.cases.create(&suite.id, "t", "") {
                        Ok(_) => {}
                        Err(e) if e.is_not_found() => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    for round in 0..15 {
        db.suites.create(&format!("round {round}")).unwrap();
        db.suites.delete_all(true).unwrap();
        // A create that lost the race must have written nothing.
        for case in db.cases.list().unwrap() {
            let owner = db.suites.get(&case.suite_id).unwrap();
            assert!(owner.cases.contains(&case.id), "case survived its suite");
        }
    }
    stop.store(true, Ordering::SeqCst);
    for h in creators {
        h.join().unwrap();
    }

    for case in db.cases.list().unwrap() {
        let owner = db.suites.get(&case.suite_id).unwrap();
        assert!(owner.cases.contains(&case.id));
    }
}

#[test]
fn forced_cascade_races_with_case_creation() {
    // Whichever side wins the suite lock, the end state is coherent:
    // either the creation landed first and was cascaded away, or it lost
    // and was rejected with SuiteNotFound.
    for _ in 0..20 {
        let db = Arc::new(Casebook::open().unwrap());
        let suite_id = db.suites.create("raced").unwrap();
        db.cases.create(&suite_id, "seed", "").unwrap();

        let creator = {
            let db = Arc::clone(&db);
            let suite_id = suite_id.clone();
            thread::spawn(move || db.cases.create(&suite_id, "late", ""))
        };
        let deleter = {
            let db = Arc::clone(&db);
            let suite_id = suite_id.clone();
            thread::spawn(move || db.suites.delete(&suite_id, true))
        };

        let create_result = creator.join().unwrap();
        deleter.join().unwrap().unwrap();

        match create_result {
            // Created before the cascade: the cascade must have removed it.
            Ok(case_id) => {
                // The suite is gone either way.
                assert!(db.suites.get(&suite_id).unwrap_err().is_not_found());
                assert!(db.cases.get(&case_id).unwrap_err().is_not_found());
            }
            Err(e) => assert_eq!(e, Error::SuiteNotFound(suite_id.clone())),
        }
        assert!(db.cases.list().unwrap().is_empty());
    }
}
