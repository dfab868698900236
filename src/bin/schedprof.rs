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

//! Runs a canonical connection-handling workload through the simulator and
//! prints its aggregate statistics.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use schedprof::{Coroutine, DumbScheduler, Error, Instruction, Mutex};

#[derive(Parser)]
#[command(name = "schedprof", about = "Discrete-event scheduler simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the canonical connection-handling workload and print its stats.
    Demo {
        /// Number of simulated CPUs.
        #[arg(long, default_value_t = num_cpus::get())]
        ncpu: usize,

        /// Scheduling policy to use.
        #[arg(long, default_value = "dumb")]
        scheduler: String,

        /// Number of worker coroutines (simulated connections) to spawn.
        #[arg(long, default_value_t = 32)]
        connections: usize,
    },
}

/// One simulated connection: wait for a request, do a little work while
/// holding a shared lock, wait for the reply, do a little more work.
fn connection_body(mutex: Mutex) -> Coroutine {
    Coroutine::new(vec![
        Instruction::io(3),
        Instruction::cpu_burn(1),
        Instruction::lock(mutex),
        Instruction::cpu_burn(1),
        Instruction::unlock(mutex),
        Instruction::io(5),
        Instruction::cpu_burn(6),
        Instruction::lock(mutex),
        Instruction::cpu_burn(1),
        Instruction::unlock(mutex),
        Instruction::io(3),
    ])
}

fn build_demo_workload(connections: usize) -> Coroutine {
    let mutex = Mutex::new();
    Coroutine::new((0..connections).map(move |_| Instruction::spawn(connection_body(mutex))))
}

fn run_demo(ncpu: usize, scheduler: &str, connections: usize) -> Result<(), Error> {
    if scheduler != "dumb" {
        return Err(Error::UnimplementedPolicy(scheduler.to_owned()));
    }

    let root = build_demo_workload(connections);
    let mut sched = DumbScheduler::new();
    let stats = sched.run_program(root, ncpu, None)?;

    println!("Elapsed time: {}", stats.elapsed);
    println!("Total CPU time: {}", stats.total_cpu_time);
    println!("Burning CPU time: {}", stats.burning_cpu_time);
    println!("Context switches: {}", stats.context_switches);
    println!("Cache hits: {}", stats.cache_hits);
    println!("Cache hit rate: {:.2}%", stats.cache_hit_rate() * 100.0);
    println!("CPU utilization: {:.2}%", stats.cpu_utilization() * 100.0);
    println!("Parallel speedup: {}", format_significant(stats.speedup(), 4));

    Ok(())
}

/// Formats `value` to `sig_figs` significant figures, matching the Python
/// original's type-less `"{:.4}".format(x)` on the speedup line — general
/// float formatting, which counts significant digits rather than decimal
/// places. Rust's `{:.4}` is fixed-point and would print the wrong number of
/// digits for most magnitudes (e.g. 3.1416 instead of 3.142 for pi).
fn format_significant(value: f64, sig_figs: usize) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (sig_figs as i32 - 1 - magnitude).max(0) as usize;
    let formatted = format!("{:.*}", decimals, value);
    match formatted.find('.') {
        Some(dot) => {
            let trimmed = formatted.trim_end_matches('0');
            if trimmed.len() <= dot + 1 {
                format!("{}0", trimmed)
            } else {
                trimmed.to_string()
            }
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::format_significant;

    #[test]
    fn matches_python_general_float_format() {
        assert_eq!(format_significant(std::f64::consts::PI, 4), "3.142");
        assert_eq!(format_significant(0.5, 4), "0.5");
        assert_eq!(format_significant(2.0, 4), "2.0");
        assert_eq!(format_significant(0.0, 4), "0.0");
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Demo { ncpu, scheduler, connections } => run_demo(ncpu, &scheduler, connections),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("schedprof: {}", err);
            ExitCode::FAILURE
        }
    }
}
