use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

/// A named, monotonically increasing event counter.
#[derive(Default)]
pub struct Counter {
    atomic: AtomicU64,
}

impl Counter {
    pub const fn new() -> Self {
        Self {
            atomic: AtomicU64::new(0),
        }
    }

    pub fn add(&self, amount: u64) {
        self.atomic.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.atomic.load(Ordering::Acquire)
    }
}

lazy_static::lazy_static! {
    pub static ref __COUNTERS: Mutex<BTreeMap<&'static str, Arc<Counter>>> = Mutex::new(BTreeMap::new());
}

/// Registers a counter under `descr`, or returns the one already registered.
pub fn insert_counter(descr: &'static str) -> Arc<Counter> {
    let mut counters = __COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
    counters
        .entry(descr)
        .or_insert_with(|| Arc::new(Counter::new()))
        .clone()
}

pub fn counter_value(descr: &str) -> Option<u64> {
    let counters = __COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
    counters.get(descr).map(|c| c.value())
}

pub fn report_counters() {
    let counters = __COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
    for (counter_name, counter) in counters.iter() {
        log::log!(target: "counter_report", log::Level::Info, "{}: {}", counter_name, counter.value())
    }
}

#[macro_export]
macro_rules! counter {
    ($descr:literal) => {
        $crate::counter!($descr, 1)
    };
    ($descr:literal, $amount:expr) => {
        if cfg!(feature = "counter") {
            use $crate::utils::counter::{insert_counter, lazy_static, Counter};
            lazy_static::lazy_static! {
                static ref COUNTER_REF: std::sync::Arc<Counter> = insert_counter($descr);
            }
            COUNTER_REF.add($amount as u64);
        }
    };
}

// Reexport for ease of use
pub use lazy_static;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_under_their_name() {
        let c = insert_counter("test.accumulate");
        c.add(2);
        insert_counter("test.accumulate").add(3);
        assert_eq!(counter_value("test.accumulate"), Some(5));
        assert_eq!(counter_value("test.missing"), None);
    }

    #[test]
    #[cfg(feature = "counter")]
    fn counter_macro_registers_lazily() {
        for _ in 0..4 {
            crate::counter!("test.macro");
        }
        crate::counter!("test.macro", 6);
        assert_eq!(counter_value("test.macro"), Some(10));
    }
}
