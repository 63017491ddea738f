//! The gate deciding when the dictionary caches may be trusted.
//!
//! Compilation reads the dictionary between `start_reading` and
//! `done_reading`; DDL announces itself with `start_writing` and leaves at
//! `transaction_finished`. While no DDL is running the dictionary is in
//! compile-only mode and caches are trusted. The first writer waits for
//! active compile readers to drain, clears the caches and switches to DDL
//! mode; the gate switches back, clearing the caches again, once the last
//! writer and the last reader that started during DDL are gone.

use {
    crate::error::{DdlDuringBindSnafu, LockTimeoutSnafu, Result},
    parking_lot::{Condvar, Mutex},
    rand::Rng,
    std::{
        thread,
        time::{Duration, Instant},
    },
    tracing::debug,
};

/// Bounded retries before a writer falls back to a timed wait.
const WRITER_RETRIES: usize = 5;
/// Upper bound of the random back-off between writer retries, in ms.
const WRITER_BACKOFF_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// No DDL is active; cached descriptors are valid.
    CompileOnly,
    /// DDL is active; every lookup goes to the catalogs.
    Ddl,
}

#[derive(Debug)]
struct GateState {
    mode: CacheMode,
    /// Outermost readers that entered in compile-only mode.
    compile_readers: usize,
    /// Outermost readers that entered in DDL mode.
    ddl_readers: usize,
    /// Transactions that have done DDL and not finished yet.
    ddl_writers: usize,
    /// Writers blocked until the compile readers drain. New compile readers
    /// queue behind them.
    waiting_writers: usize,
}

pub(crate) struct Coordinator {
    state: Mutex<GateState>,
    changed: Condvar,
    lock_wait_timeout: Duration,
}

#[derive(Debug, Default)]
struct SessionState {
    bind_count: usize,
    read_mode: Option<CacheMode>,
    in_write_mode: bool,
}

/// Per-connection view of the gate: bind nesting and whether the current
/// transaction has done DDL.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_count(&self) -> usize {
        self.state.lock().bind_count
    }

    pub fn in_write_mode(&self) -> bool {
        self.state.lock().in_write_mode
    }
}

impl Coordinator {
    pub fn new(lock_wait_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(GateState {
                mode: CacheMode::CompileOnly,
                compile_readers: 0,
                ddl_readers: 0,
                ddl_writers: 0,
                waiting_writers: 0,
            }),
            changed: Condvar::new(),
            lock_wait_timeout,
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.state.lock().mode
    }

    /// Enters a (possibly nested) bind. Only the outermost call registers
    /// with the gate. Returns the mode the bind runs in.
    pub fn start_reading(&self, session: &Session) -> CacheMode {
        let mut ss = session.state.lock();
        ss.bind_count += 1;
        if ss.bind_count > 1 {
            return ss.read_mode.unwrap_or(CacheMode::Ddl);
        }

        let mut gate = self.state.lock();
        while gate.mode == CacheMode::CompileOnly && gate.waiting_writers > 0 {
            self.changed.wait(&mut gate);
        }

        match gate.mode {
            CacheMode::CompileOnly => gate.compile_readers += 1,
            CacheMode::Ddl => gate.ddl_readers += 1,
        }
        ss.read_mode = Some(gate.mode);
        gate.mode
    }

    /// Leaves a bind. The outermost exit of a reader that started during DDL
    /// may return the gate to compile-only mode, running `clear` first.
    pub fn done_reading(&self, session: &Session, clear: impl FnOnce()) {
        let mut ss = session.state.lock();
        if ss.bind_count == 0 {
            return;
        }
        ss.bind_count -= 1;
        if ss.bind_count > 0 {
            return;
        }

        let mut gate = self.state.lock();
        match ss.read_mode.take() {
            Some(CacheMode::CompileOnly) => {
                gate.compile_readers = gate.compile_readers.saturating_sub(1);
            }
            Some(CacheMode::Ddl) => {
                gate.ddl_readers = gate.ddl_readers.saturating_sub(1);
                self.leave_ddl_if_idle(&mut gate, clear);
            }
            None => {}
        }
        self.changed.notify_all();
    }

    /// Registers the session's transaction as a DDL writer.
    pub fn start_writing(&self, session: &Session, clear: impl Fn()) -> Result<()> {
        let mut ss = session.state.lock();
        ensure_not_binding(&ss)?;
        if ss.in_write_mode {
            return Ok(());
        }

        let mut rng = rand::thread_rng();
        let mut failures = 0;
        // one deadline for the whole attempt, however many waits it takes
        let mut deadline = None;
        loop {
            if failures >= WRITER_RETRIES {
                let deadline =
                    *deadline.get_or_insert_with(|| Instant::now() + self.lock_wait_timeout);
                self.wait_for_readers(deadline)?;
                failures = 1;
            }
            if failures > 0 {
                thread::sleep(Duration::from_millis(rng.gen_range(0..WRITER_BACKOFF_MS)));
            }

            let mut gate = self.state.lock();
            if gate.mode == CacheMode::CompileOnly {
                if gate.compile_readers > 0 {
                    drop(gate);
                    failures += 1;
                    continue;
                }

                clear();
                gate.mode = CacheMode::Ddl;
                debug!("dictionary entered DDL mode");
            }

            gate.ddl_writers += 1;
            ss.in_write_mode = true;
            return Ok(());
        }
    }

    /// Blocks until no compile reader is active, or fails once `deadline`
    /// passes. New readers queue behind the waiting writer meanwhile.
    fn wait_for_readers(&self, deadline: Instant) -> Result<()> {
        let mut gate = self.state.lock();
        gate.waiting_writers += 1;

        let mut timed_out = false;
        while gate.mode == CacheMode::CompileOnly && gate.compile_readers > 0 {
            if self.changed.wait_until(&mut gate, deadline).timed_out() {
                timed_out = gate.compile_readers > 0;
                break;
            }
        }

        gate.waiting_writers -= 1;
        self.changed.notify_all();
        drop(gate);

        if timed_out {
            return LockTimeoutSnafu {
                waited: self.lock_wait_timeout,
            }
            .fail();
        }
        Ok(())
    }

    /// Ends the DDL of the session's transaction, if it did any.
    pub fn transaction_finished(&self, session: &Session, clear: impl FnOnce()) {
        let mut ss = session.state.lock();
        if !ss.in_write_mode {
            return;
        }
        ss.in_write_mode = false;

        let mut gate = self.state.lock();
        gate.ddl_writers = gate.ddl_writers.saturating_sub(1);
        self.leave_ddl_if_idle(&mut gate, clear);
        self.changed.notify_all();
    }

    fn leave_ddl_if_idle(&self, gate: &mut GateState, clear: impl FnOnce()) {
        if gate.mode == CacheMode::Ddl && gate.ddl_writers == 0 && gate.ddl_readers == 0 {
            clear();
            gate.mode = CacheMode::CompileOnly;
            debug!("dictionary returned to compile-only mode");
        }
    }

    #[cfg(test)]
    fn counts(&self) -> (usize, usize, usize) {
        let gate = self.state.lock();
        (gate.compile_readers, gate.ddl_readers, gate.ddl_writers)
    }
}

fn ensure_not_binding(ss: &SessionState) -> Result<()> {
    if ss.bind_count > 0 {
        return DdlDuringBindSnafu.fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::Error,
        std::sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Arc,
        },
    };

    #[test]
    fn nested_binds_register_once() {
        let gate = Coordinator::new(Duration::from_secs(1));
        let session = Session::new();

        assert_eq!(gate.start_reading(&session), CacheMode::CompileOnly);
        assert_eq!(gate.start_reading(&session), CacheMode::CompileOnly);
        assert_eq!(gate.counts(), (1, 0, 0));

        gate.done_reading(&session, || {});
        assert_eq!(gate.counts(), (1, 0, 0));
        gate.done_reading(&session, || {});
        assert_eq!(gate.counts(), (0, 0, 0));
        assert_eq!(session.bind_count(), 0);
    }

    #[test]
    fn ddl_inside_bind_is_rejected() {
        let gate = Coordinator::new(Duration::from_secs(1));
        let session = Session::new();

        gate.start_reading(&session);
        assert!(matches!(
            gate.start_writing(&session, || {}),
            Err(Error::DdlDuringBind { .. })
        ));
    }

    #[test]
    fn mode_transitions_clear_caches() {
        let gate = Coordinator::new(Duration::from_secs(1));
        let clears = AtomicUsize::new(0);
        let clear = || {
            clears.fetch_add(1, Ordering::SeqCst);
        };
        let writer = Session::new();
        let reader = Session::new();

        gate.start_writing(&writer, clear).unwrap();
        assert_eq!(gate.mode(), CacheMode::Ddl);
        // a second call in the same transaction is a no-op
        gate.start_writing(&writer, clear).unwrap();
        assert_eq!(gate.counts(), (0, 0, 1));

        assert_eq!(gate.start_reading(&reader), CacheMode::Ddl);
        gate.transaction_finished(&writer, clear);
        // the reader that started during DDL keeps the gate in DDL mode
        assert_eq!(gate.mode(), CacheMode::Ddl);

        gate.done_reading(&reader, clear);
        assert_eq!(gate.mode(), CacheMode::CompileOnly);
        assert_eq!(clears.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn writer_times_out_behind_a_reader() {
        let gate = Coordinator::new(Duration::from_millis(50));
        let reader = Session::new();
        let writer = Session::new();

        gate.start_reading(&reader);
        assert!(matches!(
            gate.start_writing(&writer, || {}),
            Err(Error::LockTimeout { .. })
        ));
        assert!(!writer.in_write_mode());
        assert_eq!(gate.mode(), CacheMode::CompileOnly);
    }

    #[test]
    fn writer_waits_for_reader_to_finish() {
        let gate = Arc::new(Coordinator::new(Duration::from_secs(10)));
        let reader = Arc::new(Session::new());
        gate.start_reading(&reader);

        let handle = {
            let gate = gate.clone();
            thread::spawn(move || {
                let writer = Session::new();
                gate.start_writing(&writer, || {}).unwrap();
                let mode = gate.mode();
                gate.transaction_finished(&writer, || {});
                mode
            })
        };

        thread::sleep(Duration::from_millis(150));
        gate.done_reading(&reader, || {});
        assert_eq!(handle.join().unwrap(), CacheMode::Ddl);
        assert_eq!(gate.mode(), CacheMode::CompileOnly);
    }

    #[test]
    fn waits_share_one_deadline() {
        let gate = Coordinator::new(Duration::from_secs(10));
        let reader = Session::new();
        gate.start_reading(&reader);

        // a deadline that already passed is not renewed by the next wait
        let started = Instant::now();
        assert!(matches!(
            gate.wait_for_readers(started),
            Err(Error::LockTimeout { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(1));

        gate.done_reading(&reader, || {});
        gate.wait_for_readers(started).unwrap();
    }

    #[test]
    fn churning_readers_do_not_starve_the_writer_forever() {
        let gate = Arc::new(Coordinator::new(Duration::from_millis(100)));
        let stop = Arc::new(AtomicBool::new(false));

        // two overlapping readers, so one is nearly always bound
        let readers = (0..2)
            .map(|i| {
                let gate = gate.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    let session = Session::new();
                    thread::sleep(Duration::from_millis(i * 2));
                    while !stop.load(Ordering::SeqCst) {
                        gate.start_reading(&session);
                        thread::sleep(Duration::from_millis(4));
                        gate.done_reading(&session, || {});
                    }
                })
            })
            .collect::<Vec<_>>();

        let writer = Session::new();
        let started = Instant::now();
        let attempt = gate.start_writing(&writer, || {});
        let elapsed = started.elapsed();
        stop.store(true, Ordering::SeqCst);

        // the writer either got in or gave up, close to its lock timeout
        match attempt {
            Ok(()) => gate.transaction_finished(&writer, || {}),
            Err(e) => assert!(matches!(e, Error::LockTimeout { .. })),
        }
        assert!(elapsed < Duration::from_secs(2), "writer took {:?}", elapsed);
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
