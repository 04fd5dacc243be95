use std::{
    path::PathBuf,
    process::Child,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::{
    exit_state::ShutdownGate, lifecycle::LifecycleMachine, BackendConfig, StatusChannel,
    SurfaceSlot,
};

/// Command line of the backend process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) cmd: PathBuf,
    pub(crate) args: Vec<String>,
}

/// Application context shared by the coordinator, the supervisor and the
/// shutdown path.
#[derive(Debug)]
pub(crate) struct BackendState {
    pub(crate) config: BackendConfig,
    pub(crate) log_dir: PathBuf,
    pub(crate) child: Mutex<Option<Child>>,
    pub(crate) status: StatusChannel,
    pub(crate) surface: SurfaceSlot,
    pub(crate) lifecycle: Mutex<LifecycleMachine>,
    pub(crate) shutdown_gate: Mutex<ShutdownGate>,
    pub(crate) is_spawning: AtomicBool,
}

impl BackendState {
    pub(crate) fn new(config: BackendConfig, log_dir: PathBuf) -> Self {
        Self {
            config,
            log_dir,
            child: Mutex::new(None),
            status: StatusChannel::default(),
            surface: SurfaceSlot::default(),
            lifecycle: Mutex::new(LifecycleMachine::default()),
            shutdown_gate: Mutex::new(ShutdownGate::default()),
            is_spawning: AtomicBool::new(false),
        }
    }

    pub(crate) fn from_env() -> Self {
        let config = BackendConfig::from_env(|message| crate::append_startup_log(&message));
        Self::new(config, crate::runtime_paths::default_log_dir())
    }
}

pub(crate) struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    /// Raises `flag` unless another guard already holds it.
    pub(crate) fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
