//! Sequential hostel-name enumeration
//!
//! The ledger exposes hostel names only by index, so the full list is
//! produced by probing 0, 1, 2, ... until a lookup comes back absent. A
//! probe can also fail outright; that still terminates enumeration (the
//! next index cannot be trusted), but the failure is reported as its own
//! probe variant instead of being collapsed into a silent end of list.

use super::client::LedgerClient;
use super::errors::LedgerError;

/// Outcome of one enumeration step.
#[derive(Debug)]
pub enum Probe {
    /// A hostel name was found at the current index.
    Name(String),
    /// Clean end of the list.
    End,
    /// The lookup failed; enumeration cannot continue past this index.
    Failed(LedgerError),
}

/// Lazy, restartable hostel-name sequence over a ledger client.
pub struct HostelNames<'a> {
    ledger: &'a dyn LedgerClient,
    index: u64,
    done: bool,
}

impl<'a> HostelNames<'a> {
    pub fn new(ledger: &'a dyn LedgerClient) -> Self {
        Self {
            ledger,
            index: 0,
            done: false,
        }
    }

    /// Index of the next probe.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Probe the next index. After `End` or `Failed`, the sequence is
    /// exhausted and keeps returning `End`.
    pub async fn next(&mut self) -> Probe {
        if self.done {
            return Probe::End;
        }
        match self.ledger.hostel_name_at(self.index).await {
            Ok(Some(name)) if !name.is_empty() => {
                self.index += 1;
                Probe::Name(name)
            }
            Ok(_) => {
                self.done = true;
                Probe::End
            }
            Err(e) => {
                self.done = true;
                Probe::Failed(e)
            }
        }
    }
}

/// Drain the sequence into the names seen before it ended, along with the
/// probe failure that ended it, if any.
pub async fn collect_hostel_names(
    ledger: &dyn LedgerClient,
) -> (Vec<String>, Option<LedgerError>) {
    let mut names = Vec::new();
    let mut probes = HostelNames::new(ledger);
    loop {
        match probes.next().await {
            Probe::Name(name) => names.push(name),
            Probe::End => return (names, None),
            Probe::Failed(e) => return (names, Some(e)),
        }
    }
}
