//! Tests for Dictionary
//!
//! These tests verify:
//! - Insert / update / remove bookkeeping
//! - Construction from pairs
//! - Concurrent readers and writers

use std::sync::Arc;
use std::thread;

use dictwire::Dictionary;

#[test]
fn test_empty() {
    let dict = Dictionary::new();
    assert!(dict.is_empty());
    assert_eq!(dict.len(), 0);
    assert_eq!(dict.get("cat"), None);
}

#[test]
fn test_insert_reports_new_vs_update() {
    let dict = Dictionary::new();

    assert!(dict.insert("cat".to_string(), "a feline".to_string()));
    assert!(!dict.insert("cat".to_string(), "a small feline".to_string()));

    assert_eq!(dict.get("cat").as_deref(), Some("a small feline"));
    assert_eq!(dict.len(), 1);
}

#[test]
fn test_remove_reports_presence() {
    let dict = Dictionary::from_iter([("cat", "a small feline")]);

    assert!(dict.contains("cat"));
    assert!(dict.remove("cat"));
    assert!(!dict.remove("cat"));
    assert!(!dict.contains("cat"));
}

#[test]
fn test_words_are_case_sensitive() {
    let dict = Dictionary::from_iter([("Rust", "a language")]);

    assert_eq!(dict.get("rust"), None);
    assert_eq!(dict.get("Rust").as_deref(), Some("a language"));
}

#[test]
fn test_concurrent_writers() {
    let dict = Arc::new(Dictionary::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || {
                for i in 0..100 {
                    dict.insert(format!("t{}-w{}", t, i), format!("m{}", i));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(dict.len(), 400);
    assert_eq!(dict.get("t3-w99").as_deref(), Some("m99"));
}

#[test]
fn test_readers_during_writes() {
    let dict = Arc::new(Dictionary::from_iter([("stable", "never changes")]));

    let writer = {
        let dict = Arc::clone(&dict);
        thread::spawn(move || {
            for i in 0..200 {
                dict.insert(format!("w{}", i), "x".to_string());
                dict.remove(&format!("w{}", i));
            }
        })
    };

    for _ in 0..200 {
        assert_eq!(dict.get("stable").as_deref(), Some("never changes"));
    }
    writer.join().unwrap();
    assert_eq!(dict.len(), 1);
}
