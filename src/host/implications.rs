//! Context carried across accumulate host calls.
//!
//! The machine passes these through verbatim; only the host handler reads
//! or writes them. The pair holds two dimensions of the same record: the
//! regular one accumulates effects as host calls succeed, the exceptional
//! one is the checkpoint the invocation falls back to on panic or gas
//! exhaustion.

use std::collections::BTreeMap;

/// Service identifier.
pub type ServiceId = u32;

/// 32-byte hash.
pub type Hash = [u8; 32];

/// A service account inside the partial state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceAccount {
    /// Token balance.
    pub balance: u64,
    /// Hash of the service code.
    pub code_hash: Hash,
    /// Minimum gas for an accumulate invocation.
    pub min_accumulate_gas: u64,
    /// Minimum gas for handling one deferred transfer.
    pub min_transfer_gas: u64,
}

/// The slice of chain state an accumulation may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialState {
    /// Accounts by service id.
    pub accounts: BTreeMap<ServiceId, ServiceAccount>,
    /// Manager service.
    pub manager: ServiceId,
    /// Authorizer-assigning services, one per core.
    pub assigners: Vec<ServiceId>,
    /// Validator-designating service.
    pub delegator: ServiceId,
    /// Registrar service.
    pub registrar: ServiceId,
}

/// A transfer deferred until the receiving service accumulates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredTransfer {
    /// Sending service.
    pub from: ServiceId,
    /// Receiving service.
    pub to: ServiceId,
    /// Amount moved.
    pub amount: u64,
    /// Transfer memo bytes.
    pub memo: Vec<u8>,
    /// Gas endowment for handling the transfer.
    pub gas: u64,
}

/// A preimage provided for another service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provision {
    /// Receiving service.
    pub service: ServiceId,
    /// Provided preimage bytes.
    pub preimage: Vec<u8>,
}

/// One dimension of the accumulation context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Implications {
    /// The accumulating service.
    pub id: ServiceId,
    /// Partial state snapshot.
    pub state: PartialState,
    /// Next id to hand out when a new service is created.
    pub next_free_id: ServiceId,
    /// Deferred transfers issued so far.
    pub transfers: Vec<DeferredTransfer>,
    /// Accumulation result hash, once yielded.
    pub yield_hash: Option<Hash>,
    /// Provisions issued so far.
    pub provisions: Vec<Provision>,
}

/// The (regular, exceptional) context pair of one accumulate invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImplicationsPair {
    /// Effects of the invocation so far.
    pub regular: Implications,
    /// Checkpoint restored when the invocation fails.
    pub exceptional: Implications,
}

impl ImplicationsPair {
    /// Both dimensions start from the same record.
    pub fn new(implications: Implications) -> Self {
        Self {
            regular: implications.clone(),
            exceptional: implications,
        }
    }

    /// Snapshot the regular dimension into the exceptional one.
    pub fn checkpoint(&mut self) {
        self.exceptional = self.regular.clone();
    }

    /// Discard the regular dimension in favor of the checkpoint.
    pub fn revert(&mut self) {
        self.regular = self.exceptional.clone();
    }
}

/// Everything an accumulate host handler sees besides the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccumulateContext {
    /// Current timeslot.
    pub timeslot: u32,
    /// The mutable context pair.
    pub implications: ImplicationsPair,
}
