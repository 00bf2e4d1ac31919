//! Blocking reads and waits survive a signal landing mid-call.
//!
//! The handler is installed without `SA_RESTART`, so the kernel returns
//! `EINTR` from the blocked call instead of resuming it. The signal is aimed
//! at the blocked thread with `pthread_kill`.

#![cfg(target_os = "linux")]

use cproc_common::PipeSide;
use cproc_pipe::{close, read_all, write_all, PipeChannel};
use cproc_process::Process;
use nix::sys::pthread::{pthread_kill, pthread_self, Pthread};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::cell::Cell;
use std::thread;
use std::time::Duration;

thread_local! {
    static INTERRUPTED: Cell<bool> = const { Cell::new(false) };
}

extern "C" fn note_interruption(_: nix::libc::c_int) {
    INTERRUPTED.with(|flag| flag.set(true));
}

fn install_handler() {
    let action = SigAction::new(SigHandler::Handler(note_interruption), SaFlags::empty(), SigSet::empty());
    // SAFETY: the handler only sets a const-initialized thread local.
    unsafe { sigaction(Signal::SIGUSR1, &action) }.unwrap();
}

fn interrupt_later(target: Pthread) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(500));
        pthread_kill(target, Signal::SIGUSR1).unwrap();
    })
}

#[test]
fn test_read_all_resumes_after_signal() {
    install_handler();
    let mut channel = PipeChannel::create(true).unwrap();
    let write_end = channel.forget(PipeSide::Write);

    let interrupter = interrupt_later(pthread_self());
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_secs(2));
        write_all(write_end, b"after the signal").unwrap();
        close(write_end).unwrap();
    });

    let data = read_all(channel.get(PipeSide::Read)).unwrap();
    interrupter.join().unwrap();
    writer.join().unwrap();
    channel.close_all().unwrap();

    assert_eq!(data, b"after the signal");
    assert!(INTERRUPTED.with(Cell::get), "signal never reached the reading thread");
}

#[test]
fn test_wait_resumes_after_signal() {
    install_handler();
    let mut process = Process::new("sleep", ["2"]).unwrap();

    let interrupter = interrupt_later(pthread_self());
    let code = process.wait().unwrap();
    interrupter.join().unwrap();

    assert_eq!(code, 0);
    assert!(INTERRUPTED.with(Cell::get), "signal never reached the waiting thread");
}
