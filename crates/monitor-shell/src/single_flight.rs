//! One active request plus one superseding request slot.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    /// No request was active; the caller owns the flight and must `finish` it.
    Started,
    /// A request is active; the key now sits in the pending slot.
    Queued,
}

#[derive(Debug)]
pub struct SingleFlight<K> {
    in_flight: Option<K>,
    pending: Option<K>,
}

impl<K> Default for SingleFlight<K> {
    fn default() -> Self {
        Self {
            in_flight: None,
            pending: None,
        }
    }
}

impl<K: Clone + PartialEq> SingleFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last writer wins on the pending slot.
    pub fn begin(&mut self, key: K) -> Admission {
        if self.in_flight.is_some() {
            self.pending = Some(key);
            return Admission::Queued;
        }
        self.in_flight = Some(key);
        Admission::Started
    }

    /// Ends the active flight and hands back the pending key when it differs
    /// from the one that just finished. A pending key equal to the finished one
    /// stays parked in the slot.
    pub fn finish(&mut self, finished: &K) -> Option<K> {
        self.in_flight = None;
        match self.pending.take() {
            Some(pending) if pending != *finished => Some(pending),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    pub fn in_flight(&self) -> Option<&K> {
        self.in_flight.as_ref()
    }

    pub fn pending(&self) -> Option<&K> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }
}
