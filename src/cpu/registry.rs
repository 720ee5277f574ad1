//! Opcode registry.
//!
//! Handlers come in three capability groups: arithmetic/store, I/O and
//! control flow. Each group is a fixed table of `opcode -> handler`
//! entries. A machine is configured with a list of groups, and the registry
//! is their union, assembled once and read-only afterwards.
//!
//! The arithmetic and I/O groups are mandatory. Control flow may be left
//! out, in which case its opcodes fail at dispatch time.

use crate::cpu::decode::Operation;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of opcode slots (decimal digits 0-9).
pub const OPCODE_COUNT: usize = 10;

/// The kind of a capability group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// CLA, ADD, STO, SUB
    Arithmetic,
    /// INP, OUT
    Io,
    /// TAC, SFT, JMP, HRS
    Control,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::Arithmetic => f.write_str("arithmetic/store"),
            GroupKind::Io => f.write_str("I/O"),
            GroupKind::Control => f.write_str("control-flow"),
        }
    }
}

/// Groups every machine must be configured with.
pub const REQUIRED_GROUPS: [GroupKind; 2] = [GroupKind::Arithmetic, GroupKind::Io];

/// One registration: opcode number bound to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerEntry {
    pub opcode: u8,
    pub handler: Operation,
}

impl HandlerEntry {
    /// Bind a handler to its canonical opcode.
    pub const fn canonical(handler: Operation) -> Self {
        Self { opcode: handler.opcode(), handler }
    }
}

/// A named set of handler registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityGroup {
    pub kind: GroupKind,
    pub entries: &'static [HandlerEntry],
}

/// Memory arithmetic and store.
pub const ARITHMETIC: CapabilityGroup = CapabilityGroup {
    kind: GroupKind::Arithmetic,
    entries: &[
        HandlerEntry::canonical(Operation::Cla),
        HandlerEntry::canonical(Operation::Add),
        HandlerEntry::canonical(Operation::Sto),
        HandlerEntry::canonical(Operation::Sub),
    ],
};

/// Card input and printed output.
pub const IO: CapabilityGroup = CapabilityGroup {
    kind: GroupKind::Io,
    entries: &[
        HandlerEntry::canonical(Operation::Inp),
        HandlerEntry::canonical(Operation::Out),
    ],
};

/// Branching, shifting and halt.
pub const CONTROL: CapabilityGroup = CapabilityGroup {
    kind: GroupKind::Control,
    entries: &[
        HandlerEntry::canonical(Operation::Tac),
        HandlerEntry::canonical(Operation::Sft),
        HandlerEntry::canonical(Operation::Jmp),
        HandlerEntry::canonical(Operation::Hrs),
    ],
};

/// The complete machine.
pub const STANDARD_GROUPS: [CapabilityGroup; 3] = [ARITHMETIC, IO, CONTROL];

/// A registered handler and the group that contributed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub handler: Operation,
    pub group: GroupKind,
}

/// The assembled opcode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeRegistry {
    slots: [Option<Binding>; OPCODE_COUNT],
}

impl OpcodeRegistry {
    /// Assemble a registry from capability groups.
    ///
    /// Fails if a mandatory group is missing, an entry's opcode is not a
    /// decimal digit, or two entries claim the same opcode.
    pub fn build(groups: &[CapabilityGroup]) -> Result<Self, ConfigurationError> {
        for kind in REQUIRED_GROUPS {
            if !groups.iter().any(|g| g.kind == kind) {
                return Err(ConfigurationError::MissingGroup(kind));
            }
        }

        let mut slots: [Option<Binding>; OPCODE_COUNT] = [None; OPCODE_COUNT];
        for group in groups {
            for entry in group.entries {
                let slot = slots
                    .get_mut(entry.opcode as usize)
                    .ok_or(ConfigurationError::InvalidOpcode {
                        group: group.kind,
                        opcode: entry.opcode,
                    })?;

                if let Some(existing) = *slot {
                    return Err(ConfigurationError::DuplicateOpcode {
                        opcode: entry.opcode,
                        first: existing.group,
                        second: group.kind,
                    });
                }

                *slot = Some(Binding { handler: entry.handler, group: group.kind });
            }
        }

        let registry = Self { slots };
        tracing::debug!(
            groups = groups.len(),
            opcodes = registry.len(),
            "opcode registry assembled"
        );
        Ok(registry)
    }

    /// The registry of the complete machine.
    ///
    /// Every operation sits at its canonical opcode, so this cannot fail.
    pub fn standard() -> Self {
        let mut slots: [Option<Binding>; OPCODE_COUNT] = [None; OPCODE_COUNT];
        for group in STANDARD_GROUPS {
            for entry in group.entries {
                slots[entry.handler.opcode() as usize] =
                    Some(Binding { handler: entry.handler, group: group.kind });
            }
        }
        Self { slots }
    }

    /// Look up the handler for a decoded opcode.
    pub fn resolve(&self, opcode: i64) -> Option<Operation> {
        self.binding(opcode).map(|b| b.handler)
    }

    /// Look up the full binding for a decoded opcode.
    pub fn binding(&self, opcode: i64) -> Option<Binding> {
        usize::try_from(opcode)
            .ok()
            .and_then(|i| self.slots.get(i).copied().flatten())
    }

    /// Number of registered opcodes.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(opcode, binding)` pairs in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Binding)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|b| (i as u8, b)))
    }
}

impl Default for OpcodeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Construction-time configuration faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("machine is missing the {0} capability group")]
    MissingGroup(GroupKind),

    #[error("{group} group registers invalid opcode {opcode} (opcodes are 0-9)")]
    InvalidOpcode { group: GroupKind, opcode: u8 },

    #[error("opcode {opcode} registered by both the {first} and {second} groups")]
    DuplicateOpcode { opcode: u8, first: GroupKind, second: GroupKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_matches_built() {
        let built = OpcodeRegistry::build(&STANDARD_GROUPS).unwrap();
        assert_eq!(built, OpcodeRegistry::standard());
        assert_eq!(built.len(), OPCODE_COUNT);
    }

    #[test]
    fn test_every_opcode_resolves_canonically() {
        let registry = OpcodeRegistry::standard();
        for op in Operation::ALL {
            assert_eq!(registry.resolve(op.opcode() as i64), Some(op));
        }
        assert_eq!(registry.resolve(10), None);
        assert_eq!(registry.resolve(-1), None);
    }

    #[test]
    fn test_group_attribution() {
        let registry = OpcodeRegistry::standard();
        assert_eq!(registry.binding(0).unwrap().group, GroupKind::Io);
        assert_eq!(registry.binding(6).unwrap().group, GroupKind::Arithmetic);
        assert_eq!(registry.binding(9).unwrap().group, GroupKind::Control);
    }

    #[test]
    fn test_group_order_does_not_matter() {
        let registry = OpcodeRegistry::build(&[CONTROL, IO, ARITHMETIC]).unwrap();
        assert_eq!(registry, OpcodeRegistry::standard());
    }

    #[test]
    fn test_missing_io_group() {
        let err = OpcodeRegistry::build(&[ARITHMETIC, CONTROL]).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingGroup(GroupKind::Io));
    }

    #[test]
    fn test_missing_arithmetic_group() {
        let err = OpcodeRegistry::build(&[IO]).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingGroup(GroupKind::Arithmetic));
    }

    #[test]
    fn test_control_group_is_optional() {
        let registry = OpcodeRegistry::build(&[ARITHMETIC, IO]).unwrap();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.resolve(9), None);
        assert_eq!(registry.resolve(3), None);
    }

    #[test]
    fn test_invalid_opcode_rejected() {
        const MUL: CapabilityGroup = CapabilityGroup {
            kind: GroupKind::Control,
            entries: &[HandlerEntry { opcode: 10, handler: Operation::Cla }],
        };
        let err = OpcodeRegistry::build(&[ARITHMETIC, IO, MUL]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidOpcode { group: GroupKind::Control, opcode: 10 }
        );
    }

    #[test]
    fn test_duplicate_opcode_rejected() {
        const SHADOW: CapabilityGroup = CapabilityGroup {
            kind: GroupKind::Control,
            entries: &[HandlerEntry { opcode: 1, handler: Operation::Hrs }],
        };
        let err = OpcodeRegistry::build(&[ARITHMETIC, IO, SHADOW]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateOpcode {
                opcode: 1,
                first: GroupKind::Arithmetic,
                second: GroupKind::Control,
            }
        );
    }

    #[test]
    fn test_iter_in_opcode_order() {
        let registry = OpcodeRegistry::standard();
        let opcodes: Vec<u8> = registry.iter().map(|(op, _)| op).collect();
        assert_eq!(opcodes, (0..10).collect::<Vec<u8>>());
    }
}
