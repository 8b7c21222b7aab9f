//! Stress tests for interpose
//!
//! These tests push the processors to their limits to validate behavior
//! under extreme conditions. They are marked with `#[ignore]`.
//!
//! ## What We Test
//!
//! - **High volume**: Hundreds of thousands of invocations
//! - **High concurrency**: Many threads dispatching at once
//! - **State consistency**: Counters and stacks correct under load
//! - **Resource cleanup**: No leftover per-thread state

pub mod capture;
pub mod statistics;

use interpose_core::Dispatcher;
use std::sync::Arc;
use std::thread;

/// Utility: run `per_thread` iterations of `f` on each of `threads` threads.
pub fn hammer<F>(dispatcher: &Arc<Dispatcher>, threads: usize, per_thread: usize, f: F)
where
    F: Fn(&Dispatcher, usize, usize) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let d = Arc::clone(dispatcher);
            let f = Arc::clone(&f);
            thread::spawn(move || {
                for i in 0..per_thread {
                    f(&d, t, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
