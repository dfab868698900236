// The MIT License (MIT)

// Copyright (c) 2015 Rustcc Developers

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Per-kind sequential identifiers for the live entities the simulator tracks.
//!
//! Each kind (coroutine, CPU, mutex) owns its own counter so that ids are
//! dense and reproducible within a single run. Tests reset a kind's counter
//! to get deterministic ids across runs; nothing else depends on absolute
//! values, only on equality.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            fn counter() -> &'static AtomicUsize {
                static COUNTER: AtomicUsize = AtomicUsize::new(0);
                &COUNTER
            }

            pub(crate) fn next() -> Self {
                $name(Self::counter().fetch_add(1, Ordering::Relaxed))
            }

            /// Zero the counter for this kind. Used by tests to obtain
            /// reproducible identifiers; never called from production code.
            pub fn reset_instance_counter() {
                Self::counter().store(0, Ordering::Relaxed);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a single [`crate::coroutine::Coroutine`].
    CoroutineId,
    "Coro"
);
entity_id!(
    /// Identifies a single [`crate::cpu::Cpu`].
    CpuId,
    "CPU"
);
entity_id!(
    /// Identifies a single [`crate::mutex::Mutex`].
    MutexId,
    "Mutex"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_and_reset() {
        CoroutineId::reset_instance_counter();
        let a = CoroutineId::next();
        let b = CoroutineId::next();
        assert_ne!(a, b);
        assert_eq!(format!("{}", a), "Coro0");
        assert_eq!(format!("{}", b), "Coro1");

        CoroutineId::reset_instance_counter();
        let c = CoroutineId::next();
        assert_eq!(format!("{}", c), "Coro0");
    }

    #[test]
    fn kinds_are_independent() {
        CoroutineId::reset_instance_counter();
        CpuId::reset_instance_counter();
        let coro = CoroutineId::next();
        let cpu = CpuId::next();
        assert_eq!(format!("{}", coro), "Coro0");
        assert_eq!(format!("{}", cpu), "CPU0");
    }
}
