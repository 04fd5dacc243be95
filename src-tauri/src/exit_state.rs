#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownPhase {
    #[default]
    Running,
    Cleaning,
    ReleasedForExit,
    Exiting,
}

/// Lets exactly one shutdown sequence run per process lifetime.
#[derive(Debug, Default)]
pub struct ShutdownGate {
    phase: ShutdownPhase,
}

impl ShutdownGate {
    #[cfg(test)]
    pub fn phase(&self) -> ShutdownPhase {
        self.phase
    }

    pub fn is_quitting(&self) -> bool {
        self.phase != ShutdownPhase::Running
    }

    /// Claims the cleanup; only the first call returns `true`.
    pub fn try_begin_cleanup(&mut self) -> bool {
        if self.phase == ShutdownPhase::Running {
            self.phase = ShutdownPhase::Cleaning;
            return true;
        }
        false
    }

    /// Cleanup done: the next exit request may pass through.
    pub fn release_for_exit(&mut self) {
        if self.phase == ShutdownPhase::Cleaning {
            self.phase = ShutdownPhase::ReleasedForExit;
        }
    }

    pub fn take_exit_allowance(&mut self) -> bool {
        if self.phase == ShutdownPhase::ReleasedForExit {
            self.phase = ShutdownPhase::Exiting;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_flows_through_cleanup_to_exit() {
        let mut gate = ShutdownGate::default();
        assert_eq!(gate.phase(), ShutdownPhase::Running);
        assert!(!gate.is_quitting());
        assert!(!gate.take_exit_allowance());

        assert!(gate.try_begin_cleanup());
        assert_eq!(gate.phase(), ShutdownPhase::Cleaning);
        assert!(gate.is_quitting());
        assert!(!gate.take_exit_allowance());

        gate.release_for_exit();
        assert_eq!(gate.phase(), ShutdownPhase::ReleasedForExit);
        assert!(gate.take_exit_allowance());
        assert_eq!(gate.phase(), ShutdownPhase::Exiting);
        assert!(!gate.take_exit_allowance());
    }

    #[test]
    fn gate_rejects_reentrant_cleanup() {
        let mut gate = ShutdownGate::default();
        assert!(gate.try_begin_cleanup());
        assert!(!gate.try_begin_cleanup());
        gate.release_for_exit();
        assert!(!gate.try_begin_cleanup());
        assert_eq!(gate.phase(), ShutdownPhase::ReleasedForExit);
    }

    #[test]
    fn release_without_cleanup_is_ignored() {
        let mut gate = ShutdownGate::default();
        gate.release_for_exit();
        assert_eq!(gate.phase(), ShutdownPhase::Running);
    }
}
