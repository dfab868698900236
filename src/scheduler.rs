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

//! The discrete-event driver: ticks simulated time forward, applies a
//! pluggable [`Policy`] to map idle CPUs onto ready coroutines, and
//! interprets the instruction each mapped coroutine pops.

use std::collections::HashMap;
use std::fmt;

use log::{debug, error, info, trace, warn};

use crate::cpu::{Cpu, CpuState};
use crate::error::Error;
use crate::identity::{CoroutineId, CpuId, MutexId};
use crate::mutex::MutexState;
use crate::op::Instruction;
use crate::Coroutine;

/// Observes every instruction as it is dispatched. Has no effect on the
/// simulation; its absence is equivalent to a no-op. Used by tests and by
/// callers that want a trace of the run.
pub type Monitor<'a> = dyn FnMut(u64, &Cpu, &Coroutine, &Instruction) + 'a;

/// A scheduling policy: given the current CPUs, the live coroutines, and the
/// current time, decide which idle CPU should run which ready coroutine
/// next. A policy must not mutate scheduler state directly; it only
/// observes and proposes a mapping.
pub trait Policy {
    /// Every returned CPU must be idle at `now` and every returned coroutine
    /// must be ready; no CPU or coroutine may appear twice. The driver
    /// validates this contract and aborts the run if it is violated.
    fn map(&mut self, cpus: &[Cpu], coros: &[Coroutine], now: u64) -> Vec<(CpuId, CoroutineId)>;
}

/// Maps the first N idle CPUs (by id) to the first M ready coroutines (in
/// spawn order), for `min(N, M)` scheduled pairs. Deterministic and
/// stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumbPolicy;

impl Policy for DumbPolicy {
    fn map(&mut self, cpus: &[Cpu], coros: &[Coroutine], now: u64) -> Vec<(CpuId, CoroutineId)> {
        let idle_cpus = cpus.iter().filter(|cpu| cpu.is_idle_at(now)).map(Cpu::id);
        let ready_coros = coros.iter().filter(|coro| coro.is_ready()).map(Coroutine::id);
        idle_cpus.zip(ready_coros).collect()
    }
}

/// Final statistics for a completed `run_program` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub elapsed: u64,
    pub total_cpu_time: u64,
    pub burning_cpu_time: u64,
    pub context_switches: u64,
    pub cache_hits: u64,
}

impl Stats {
    /// Fraction of context switches that were cache hits, in `[0, 1]`.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.context_switches == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.context_switches as f64
        }
    }

    /// Fraction of total CPU time spent burning rather than idle, in `[0, 1]`.
    pub fn cpu_utilization(&self) -> f64 {
        if self.total_cpu_time == 0 {
            0.0
        } else {
            self.burning_cpu_time as f64 / self.total_cpu_time as f64
        }
    }

    /// `burning_cpu_time / elapsed`: how many CPUs' worth of work ran in
    /// parallel, on average.
    pub fn speedup(&self) -> f64 {
        if self.elapsed == 0 {
            0.0
        } else {
            self.burning_cpu_time as f64 / self.elapsed as f64
        }
    }
}

/// Drives the simulated clock for a given [`Policy`].
///
/// `DumbScheduler::new()` is the reference instantiation wired to
/// [`DumbPolicy`]; bring your own `Policy` impl and construct
/// `Scheduler::with_policy` for anything else.
pub struct Scheduler<P: Policy> {
    policy: P,
}

/// The reference scheduler: `Scheduler` wired to the deterministic
/// [`DumbPolicy`].
pub type DumbScheduler = Scheduler<DumbPolicy>;

impl DumbScheduler {
    pub fn new() -> DumbScheduler {
        Scheduler::with_policy(DumbPolicy)
    }
}

impl Default for DumbScheduler {
    fn default() -> DumbScheduler {
        DumbScheduler::new()
    }
}

impl<P: Policy> Scheduler<P> {
    pub fn with_policy(policy: P) -> Scheduler<P> {
        Scheduler { policy }
    }

    /// Simulate `root` (and anything it transitively spawns) to completion
    /// on `ncpu` CPUs, returning the final [`Stats`].
    ///
    /// `monitor`, if given, is invoked once per dispatched instruction as
    /// `(now, cpu, coro, instruction)`.
    pub fn run_program(
        &mut self,
        root: Coroutine,
        ncpu: usize,
        mut monitor: Option<&mut Monitor<'_>>,
    ) -> Result<Stats, Error> {
        assert!(ncpu >= 1, "ncpu must be at least 1");

        let mut now: u64 = 0;
        let mut idle_cputime: u64 = 0;
        let mut context_switches: u64 = 0;
        let mut cache_hits: u64 = 0;

        let mut cpus: Vec<Cpu> = (0..ncpu).map(|_| Cpu::new()).collect();
        let mut coros: Vec<Coroutine> = vec![root];
        let mut mutexes: HashMap<MutexId, MutexState> = HashMap::new();
        let mut pending_unlocks: Vec<(u64, MutexId)> = Vec::new();

        info_run_start(ncpu);

        loop {
            debug!("{}", debug_snapshot(now, &cpus, &coros));

            // 1. Retire CPUs whose current task has completed.
            for cpu in cpus.iter_mut() {
                if let Some(due_coro) = cpu_due(cpu, now) {
                    trace!("retiring {} from {} at t={}", due_coro, cpu, now);
                    let retired = cpu.retire();
                    debug_assert_eq!(retired, Some(due_coro));
                    if let Some(coro) = find_coro_mut(&mut coros, due_coro) {
                        coro.set_cpu(None);
                    }
                }
            }

            // 2. Process mutex releases scheduled at or before `now`.
            let (fired, still_pending): (Vec<_>, Vec<_>) =
                pending_unlocks.into_iter().partition(|&(fire_at, _)| fire_at <= now);
            pending_unlocks = still_pending;
            for (_, mutex_id) in fired {
                let state = mutexes.entry(mutex_id).or_default();
                match state.dequeue_waiter() {
                    Some(next_owner) => {
                        debug!("mutex {} hands off to {}", mutex_id, next_owner);
                        state.set_owner(Some(next_owner));
                        if let Some(coro) = find_coro_mut(&mut coros, next_owner) {
                            coro.resume();
                        }
                    }
                    None => {
                        debug!("mutex {} released with no waiters", mutex_id);
                        state.set_owner(None);
                    }
                }
            }

            // 3. Ask the policy to map idle CPUs onto ready coroutines.
            let mut schedule = self.policy.map(&cpus, &coros, now);
            schedule.sort_by_key(|&(cpu_id, _)| cpu_id);
            validate_schedule(&schedule, &cpus, now)?;

            if schedule.is_empty() && !coros.is_empty() && cpus.iter().any(|c| c.is_idle_at(now)) {
                warn!("policy returned no mapping at t={} with ready work available", now);
            }

            // 4. Dispatch one instruction per mapped (cpu, coro) pair.
            for (cpu_id, coro_id) in schedule {
                let coro_index = coros
                    .iter()
                    .position(|c| c.id() == coro_id)
                    .expect("policy named an unknown coroutine");
                let instruction = coros[coro_index].pop()?;
                trace!("t={} {} pops {:?} for {}", now, coro_id, instruction, cpu_id);

                if let Some(monitor) = monitor.as_deref_mut() {
                    let cpu = cpus.iter().find(|c| c.id() == cpu_id).expect("cpu vanished");
                    monitor(now, cpu, &coros[coro_index], &instruction);
                }

                let due = now + instruction.duration();
                let mut spawned = None;
                let mut terminated = None;

                match instruction {
                    Instruction::Lock(mutex_id) => {
                        let state = mutexes.entry(mutex_id).or_default();
                        match state.owner() {
                            Some(owner) if owner != coro_id => {
                                debug!("{} blocks on {} (held by {})", coro_id, mutex_id, owner);
                                state.enqueue_waiter(coro_id);
                                coros[coro_index].suspend(Instruction::Lock(mutex_id));
                            }
                            _ => {
                                debug!("{} acquires {}", coro_id, mutex_id);
                                state.set_owner(Some(coro_id));
                            }
                        }
                    }
                    Instruction::Unlock(mutex_id) => {
                        let state = mutexes.entry(mutex_id).or_default();
                        if state.owner() != Some(coro_id) {
                            error!("{} attempted to unlock {} it does not own", coro_id, mutex_id);
                            return Err(Error::UnlockNotOwned {
                                mutex: mutex_id,
                                coroutine: coro_id,
                            });
                        }
                        state.set_owner(None);
                        pending_unlocks.push((now + 1, mutex_id));
                    }
                    Instruction::Spawn(child) => {
                        debug!("{} spawns {}", coro_id, child.id());
                        spawned = Some(*child);
                    }
                    Instruction::Terminate(terminated_id) => {
                        debug_assert_eq!(terminated_id, coro_id);
                        debug!("{} terminates", coro_id);
                        terminated = Some(coro_id);
                    }
                    Instruction::CpuBurn(_) | Instruction::Io(_) => {}
                }

                let hit = cpus
                    .iter_mut()
                    .find(|c| c.id() == cpu_id)
                    .expect("cpu vanished")
                    .wakeup(coro_id, CpuState::Running, due);
                coros[coro_index].set_cpu(Some(cpu_id));
                context_switches += 1;
                if hit {
                    cache_hits += 1;
                }

                if let Some(child) = spawned {
                    coros.push(child);
                }
                if let Some(dead) = terminated {
                    coros.retain(|c| c.id() != dead);
                }
            }

            // 5. Termination check.
            if cpus.iter().all(|c| c.is_idle_at(now)) && coros.is_empty() {
                break;
            }

            // 6. Advance time to the next CPU due-boundary.
            let next_now = cpus
                .iter()
                .map(Cpu::due)
                .filter(|&due| due > now)
                .min()
                .expect("a non-idle CPU must have a due time in the future, or step 5 would have returned");
            let idle_count = cpus.iter().filter(|c| c.is_idle_at(now)).count() as u64;
            idle_cputime += idle_count * (next_now - now);
            now = next_now;
        }

        let total_cpu_time = ncpu as u64 * now;
        let burning_cpu_time = total_cpu_time - idle_cputime;
        let stats = Stats {
            elapsed: now,
            total_cpu_time,
            burning_cpu_time,
            context_switches,
            cache_hits,
        };
        info!(
            "run complete: elapsed={} switches={} cache_hits={}",
            stats.elapsed, stats.context_switches, stats.cache_hits
        );
        Ok(stats)
    }
}

fn cpu_due(cpu: &Cpu, now: u64) -> Option<CoroutineId> {
    if cpu.due() <= now {
        cpu.current_coroutine()
    } else {
        None
    }
}

fn find_coro_mut(coros: &mut [Coroutine], id: CoroutineId) -> Option<&mut Coroutine> {
    coros.iter_mut().find(|c| c.id() == id)
}

fn validate_schedule(schedule: &[(CpuId, CoroutineId)], cpus: &[Cpu], now: u64) -> Result<(), Error> {
    let mut seen_cpus = HashMap::new();
    let mut seen_coros = HashMap::new();
    for &(cpu_id, coro_id) in schedule {
        if seen_cpus.insert(cpu_id, ()).is_some() {
            return Err(Error::PolicyContractViolation {
                name: "cpu",
                id: cpu_id.to_string(),
            });
        }
        if seen_coros.insert(coro_id, ()).is_some() {
            return Err(Error::PolicyContractViolation {
                name: "coroutine",
                id: coro_id.to_string(),
            });
        }
        let cpu = cpus.iter().find(|c| c.id() == cpu_id).expect("policy named an unknown cpu");
        if !cpu.is_idle_at(now) {
            return Err(Error::MappedBurningCpu {
                cpu: cpu_id,
                coroutine: coro_id,
            });
        }
    }
    Ok(())
}

fn info_run_start(ncpu: usize) {
    info!("starting simulation on {} CPU(s)", ncpu);
}

/// A one-line per-tick snapshot: each CPU's state and bound coroutine (or
/// `idle`), plus the ids of any coroutine that is ready but unbound. Built
/// purely for `debug!` logging; callers should not parse this string.
fn debug_snapshot(now: u64, cpus: &[Cpu], coros: &[Coroutine]) -> String {
    let cpu_states: Vec<String> = cpus
        .iter()
        .map(|cpu| match cpu.current_coroutine() {
            Some(coro) => format!("{}:{:?}({})", cpu.id(), cpu.state(), coro),
            None => format!("{}:idle", cpu.id()),
        })
        .collect();
    let idle: Vec<String> = coros
        .iter()
        .filter(|c| c.is_ready())
        .map(|c| c.id().to_string())
        .collect();

    let mut snapshot = format!("t={} cpus=[{}]", now, cpu_states.join(" "));
    if !idle.is_empty() {
        snapshot.push_str(&format!(" idle=[{}]", idle.join(" ")));
    }
    snapshot
}

impl<P: Policy> fmt::Debug for Scheduler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scheduler<{}>", std::any::type_name::<P>())
    }
}
