/// Outcome of raising a readiness signal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JoinStatus {
    /// Other signals are still outstanding.
    Pending,
    /// This signal was the last one missing.
    Completed,
    /// The join had already completed before this signal.
    AlreadyComplete,
}

/// One-shot join over a fixed set of named readiness signals.
///
/// Signals may arrive in any order and more than once; the join completes the
/// first time every signal has been raised and stays complete afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    signals: Vec<(&'static str, bool)>,
}

impl Join {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            signals: names.iter().map(|n| (*n, false)).collect(),
        }
    }

    /// Unknown names are ignored.
    pub fn signal(&mut self, name: &str) -> JoinStatus {
        if self.is_complete() {
            return JoinStatus::AlreadyComplete;
        }
        if let Some(slot) = self.signals.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = true;
        }
        if self.is_complete() {
            JoinStatus::Completed
        } else {
            JoinStatus::Pending
        }
    }

    pub fn is_raised(&self, name: &str) -> bool {
        self.signals.iter().any(|(n, raised)| *n == name && *raised)
    }

    pub fn is_complete(&self) -> bool {
        self.signals.iter().all(|(_, raised)| *raised)
    }

    pub fn pending(&self) -> Vec<&'static str> {
        self.signals
            .iter()
            .filter(|(_, raised)| !raised)
            .map(|(n, _)| *n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Join, JoinStatus};

    #[test]
    fn completes_regardless_of_order() {
        let mut a = Join::new(&["data", "map"]);
        assert_eq!(a.signal("map"), JoinStatus::Pending);
        assert_eq!(a.signal("data"), JoinStatus::Completed);

        let mut b = Join::new(&["data", "map"]);
        assert_eq!(b.signal("data"), JoinStatus::Pending);
        assert_eq!(b.pending(), vec!["map"]);
        assert_eq!(b.signal("map"), JoinStatus::Completed);
    }

    #[test]
    fn repeated_signals_do_not_complete_twice() {
        let mut j = Join::new(&["data", "map"]);
        assert_eq!(j.signal("data"), JoinStatus::Pending);
        assert_eq!(j.signal("data"), JoinStatus::Pending);
        assert_eq!(j.signal("map"), JoinStatus::Completed);
        assert_eq!(j.signal("map"), JoinStatus::AlreadyComplete);
    }

    #[test]
    fn unknown_signal_is_ignored() {
        let mut j = Join::new(&["data"]);
        assert_eq!(j.signal("other"), JoinStatus::Pending);
        assert!(!j.is_raised("other"));
        assert!(!j.is_complete());
    }
}
