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

//! End-to-end scenarios run through the public API, the way a consumer of
//! this crate would use it: build a root [`Coroutine`], hand it to a
//! [`DumbScheduler`], and inspect the resulting trace and [`Stats`].

use crate::identity::{CoroutineId, CpuId, MutexId};
use crate::{Coroutine, DumbScheduler, Error, Instruction, Mutex};

fn reset_ids() {
    CoroutineId::reset_instance_counter();
    CpuId::reset_instance_counter();
    MutexId::reset_instance_counter();
}

/// Records `(now, cpu, coro, instruction)` for every dispatched instruction,
/// formatted the way a human-readable trace log would show them.
fn record(history: &mut Vec<String>) -> impl FnMut(u64, &crate::Cpu, &Coroutine, &Instruction) + '_ {
    move |now, cpu, coro, instruction| {
        history.push(format!("{} {} {} {:?}", now, cpu, coro, instruction));
    }
}

#[test]
fn hello_world() {
    reset_ids();
    let root = Coroutine::new(vec![
        Instruction::cpu_burn(1),
        Instruction::io(1),
        Instruction::cpu_burn(1),
    ]);
    let mut history = Vec::new();
    let mut sched = DumbScheduler::new();
    let stats = sched
        .run_program(root, 1, Some(&mut record(&mut history)))
        .unwrap();

    assert_eq!(
        history,
        vec![
            "0 CPU0 Coro0 CpuBurn(1)",
            "1 CPU0 Coro0 Io(1)",
            "2 CPU0 Coro0 CpuBurn(1)",
            "3 CPU0 Coro0 Terminate(Coro0)",
        ]
    );
    assert_eq!(stats.elapsed, 4);
    assert_eq!(stats.total_cpu_time, 4);
    assert_eq!(stats.burning_cpu_time, 4, "a single coroutine keeps its one CPU busy throughout");
    assert_eq!(stats.context_switches, 4);
}

#[test]
fn two_siblings_interleave_across_cpus() {
    reset_ids();
    let worker = || Coroutine::new(vec![Instruction::cpu_burn(1)]);
    let root = Coroutine::new(vec![Instruction::spawn(worker()), Instruction::spawn(worker())]);

    let mut history = Vec::new();
    let mut sched = DumbScheduler::new();
    sched
        .run_program(root, 2, Some(&mut record(&mut history)))
        .unwrap();

    assert_eq!(
        history,
        vec![
            "0 CPU0 Coro0 Spawn(Coro1)",
            "1 CPU0 Coro0 Spawn(Coro2)",
            "1 CPU1 Coro1 CpuBurn(1)",
            "2 CPU0 Coro0 Terminate(Coro0)",
            "2 CPU1 Coro1 Terminate(Coro1)",
            "3 CPU0 Coro2 CpuBurn(1)",
            "4 CPU0 Coro2 Terminate(Coro2)",
        ]
    );
}

#[test]
fn mutex_contention_serializes_second_arrival() {
    reset_ids();
    let mutex = Mutex::new();
    let worker = |mutex: Mutex| {
        Coroutine::new(vec![
            Instruction::cpu_burn(1),
            Instruction::lock(mutex),
            Instruction::io(10),
            Instruction::unlock(mutex),
        ])
    };
    let root = Coroutine::new(vec![
        Instruction::spawn(worker(mutex)),
        Instruction::spawn(worker(mutex)),
    ]);

    let mut history = Vec::new();
    let mut sched = DumbScheduler::new();
    let stats = sched
        .run_program(root, 2, Some(&mut record(&mut history)))
        .unwrap();

    assert_eq!(
        history,
        vec![
            "0 CPU0 Coro0 Spawn(Coro1)",
            "1 CPU0 Coro0 Spawn(Coro2)",
            "1 CPU1 Coro1 CpuBurn(1)",
            "2 CPU0 Coro0 Terminate(Coro0)",
            "2 CPU1 Coro1 Lock(Mutex0)",
            "3 CPU0 Coro1 Io(10)",
            "3 CPU1 Coro2 CpuBurn(1)",
            "4 CPU1 Coro2 Lock(Mutex0)",
            "13 CPU0 Coro1 Unlock(Mutex0)",
            "14 CPU0 Coro1 Terminate(Coro1)",
            "14 CPU1 Coro2 Lock(Mutex0)",
            "15 CPU0 Coro2 Io(10)",
            "25 CPU0 Coro2 Unlock(Mutex0)",
            "26 CPU0 Coro2 Terminate(Coro2)",
        ]
    );
    // The last dispatched instruction (Terminate at t=26) is due at 27; one
    // more tick is needed to observe every CPU idle with no coroutines left.
    assert_eq!(stats.elapsed, 27);
}

#[test]
fn single_cpu_many_coroutines_runs_fully_serial() {
    reset_ids();
    let root = Coroutine::new((0..4).map(|_| Instruction::spawn(Coroutine::new(vec![Instruction::cpu_burn(1)]))));

    let mut sched = DumbScheduler::new();
    let stats = sched.run_program(root, 1, None).unwrap();

    // root: 4 spawns + terminate = 5 ticks of work; each of the 4 workers
    // then runs cpu(1) + terminate serially on the single CPU.
    assert_eq!(stats.elapsed, 5 + 4 * 2);
    assert_eq!(stats.total_cpu_time, stats.elapsed);
    assert_eq!(stats.burning_cpu_time, stats.elapsed, "one CPU, never idle");
    // root keeps resuming on CPU0 across its own four spawns, and each
    // worker's terminate resumes right after its own cpu burn on the same
    // CPU: both are cache hits.
    assert!(stats.cache_hits >= 1);
}

#[test]
fn empty_body_still_elapses_one_tick_for_its_terminate() {
    reset_ids();
    let root = Coroutine::new(Vec::new());
    let mut sched = DumbScheduler::new();
    let stats = sched.run_program(root, 1, None).unwrap();
    assert_eq!(stats.elapsed, 1);
    assert_eq!(stats.context_switches, 1);
    assert_eq!(stats.cache_hits, 0);
}

#[test]
fn unlocking_a_mutex_you_never_locked_is_an_error() {
    reset_ids();
    let mutex = Mutex::new();
    let root = Coroutine::new(vec![Instruction::unlock(mutex)]);
    let root_id = root.id();
    let mut sched = DumbScheduler::new();
    match sched.run_program(root, 1, None) {
        Err(Error::UnlockNotOwned { mutex: m, coroutine }) => {
            assert_eq!(m, mutex.id());
            assert_eq!(coroutine, root_id);
        }
        other => panic!("expected UnlockNotOwned, got {:?}", other),
    }
}
