use std::collections::BTreeMap;
use std::fmt;

/// A contract record. Contracts here are local bookkeeping only: no
/// signatures, no enforcement, nothing persisted beyond the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    created: f64,
    meta: Option<String>,
}

impl Contract {
    /// Creation timestamp, seconds since the Unix epoch.
    pub fn created(&self) -> f64 {
        self.created
    }

    pub fn meta(&self) -> Option<&str> {
        self.meta.as_deref()
    }
}

/// Registry of contracts keyed by id. Ids are allocated from 1 and only
/// grow; records are never mutated or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRegistry {
    entries: BTreeMap<u64, Contract>,
    next_id: u64,
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl ContractRegistry {
    /// Records a new contract and returns its id.
    pub(crate) fn create(&mut self, created: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Contract { created, meta: None });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Contract> {
        self.entries.get(&id)
    }

    /// Contracts in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Contract)> {
        self.entries.iter().map(|(id, contract)| (*id, contract))
    }
}

/// A receipt: evidence that an instruction ran, in the loosest possible
/// sense.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    id: u64,
    created: f64,
    meta: String,
}

impl Receipt {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Creation timestamp, seconds since the Unix epoch.
    pub fn created(&self) -> f64 {
        self.created
    }

    /// The caller-supplied metadata token, observed as text.
    pub fn meta(&self) -> &str {
        &self.meta
    }
}

/// The append-only receipt ledger. Ids are allocated from 1, strictly
/// increasing, one per RECEIPT; existing entries are never altered.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    entries: BTreeMap<u64, Receipt>,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Ledger {
    /// Appends a receipt and returns its id.
    pub(crate) fn append(&mut self, created: f64, meta: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Receipt { id, created, meta });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Receipt> {
        self.entries.get(&id)
    }

    /// Receipts in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.entries.values()
    }
}

/// Structured text report of the ledger, receipts in id order.
impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ledger: {} receipt(s)", self.entries.len())?;
        for receipt in self.entries.values() {
            writeln!(
                f,
                "  #{} at {:.3}: {}",
                receipt.id, receipt.created, receipt.meta
            )?;
        }
        Ok(())
    }
}
