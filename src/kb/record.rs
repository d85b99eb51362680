//! Fact and rule records with their justification metadata
//!
//! Records live in the knowledge base arena and refer to each other only by
//! id. `supported_by` holds the reasons an item holds; `supports_facts` and
//! `supports_rules` are the reverse edges used to cascade retraction.

use std::fmt;

use crate::error::{KbError, KbResult};
use crate::term::Statement;

/// Stable identifier of a fact in a knowledge base
///
/// Ids are never reused, so a stale id simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactId(u64);

impl FactId {
    pub(crate) fn new(id: u64) -> Self {
        FactId(id)
    }

    /// Get the raw id value
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Stable identifier of a rule in a knowledge base
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    pub(crate) fn new(id: u64) -> Self {
        RuleId(id)
    }

    /// Get the raw id value
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Either kind of knowledge base item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemId {
    Fact(FactId),
    Rule(RuleId),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Fact(id) => write!(f, "fact#{}", id.0),
            ItemId::Rule(id) => write!(f, "rule#{}", id.0),
        }
    }
}

/// One justification: `rule` fired with `fact` matching its first antecedent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Support {
    pub fact: FactId,
    pub rule: RuleId,
}

impl Support {
    pub fn new(fact: FactId, rule: RuleId) -> Self {
        Support { fact, rule }
    }

    /// Whether this pair names `item` on either side
    pub fn mentions(&self, item: ItemId) -> bool {
        match item {
            ItemId::Fact(id) => self.fact == id,
            ItemId::Rule(id) => self.rule == id,
        }
    }
}

/// Justification state shared by facts and rules
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Provenance {
    pub(crate) asserted: bool,
    pub(crate) supported_by: Vec<Support>,
    pub(crate) supports_facts: Vec<FactId>,
    pub(crate) supports_rules: Vec<RuleId>,
}

impl Provenance {
    pub(crate) fn asserted() -> Self {
        Provenance {
            asserted: true,
            ..Self::default()
        }
    }

    pub(crate) fn derived(support: Support) -> Self {
        Provenance {
            supported_by: vec![support],
            ..Self::default()
        }
    }

    /// True if ever explicitly asserted (and not since retracted)
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Every independent derivation currently justifying the item
    pub fn supported_by(&self) -> &[Support] {
        &self.supported_by
    }

    /// Facts this item helped derive
    pub fn supports_facts(&self) -> &[FactId] {
        &self.supports_facts
    }

    /// Rules this item helped derive
    pub fn supports_rules(&self) -> &[RuleId] {
        &self.supports_rules
    }

    pub fn is_supported(&self) -> bool {
        !self.supported_by.is_empty()
    }

    /// Neither asserted nor derivable: the item must not stay in the base
    pub fn is_orphaned(&self) -> bool {
        !self.asserted && self.supported_by.is_empty()
    }

    pub(crate) fn add_dependent(&mut self, item: ItemId) {
        match item {
            ItemId::Fact(id) if !self.supports_facts.contains(&id) => self.supports_facts.push(id),
            ItemId::Rule(id) if !self.supports_rules.contains(&id) => self.supports_rules.push(id),
            _ => {}
        }
    }

    pub(crate) fn remove_dependent(&mut self, item: ItemId) {
        match item {
            ItemId::Fact(id) => self.supports_facts.retain(|f| *f != id),
            ItemId::Rule(id) => self.supports_rules.retain(|r| *r != id),
        }
    }

    /// Drop every support pair naming `item`, returning the dropped pairs
    pub(crate) fn drop_support_from(&mut self, item: ItemId) -> Vec<Support> {
        let (dropped, kept): (Vec<Support>, Vec<Support>) =
            self.supported_by.iter().partition(|s| s.mentions(item));
        self.supported_by = kept;
        dropped
    }

    pub(crate) fn dependents(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.supports_facts
            .iter()
            .map(|id| ItemId::Fact(*id))
            .chain(self.supports_rules.iter().map(|id| ItemId::Rule(*id)))
    }
}

/// A conjunctive rule body with its conclusion: `lhs[0] ∧ lhs[1] ... → rhs`
///
/// Antecedent order is significant: inference only ever matches `lhs[0]`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Implication {
    lhs: Vec<Statement>,
    rhs: Statement,
}

impl Implication {
    /// Create an implication; a rule needs at least one antecedent
    pub fn new(lhs: Vec<Statement>, rhs: Statement) -> KbResult<Self> {
        if lhs.is_empty() {
            return Err(KbError::invalid_rule("rule has no antecedents")
                .with_context("rhs", rhs.to_string()));
        }
        Ok(Implication { lhs, rhs })
    }

    /// Caller guarantees `lhs` is non-empty
    pub(crate) fn from_parts(lhs: Vec<Statement>, rhs: Statement) -> Self {
        debug_assert!(!lhs.is_empty());
        Implication { lhs, rhs }
    }

    pub fn lhs(&self) -> &[Statement] {
        &self.lhs
    }

    pub fn rhs(&self) -> &Statement {
        &self.rhs
    }
}

impl fmt::Debug for Implication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Implication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, s) in self.lhs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, ") -> {}", self.rhs)
    }
}

/// An item handed to the knowledge base: a fact or a rule, without metadata
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Assertion {
    Fact(Statement),
    Rule(Implication),
}

impl Assertion {
    pub fn fact(statement: Statement) -> Self {
        Assertion::Fact(statement)
    }

    pub fn rule(lhs: Vec<Statement>, rhs: Statement) -> KbResult<Self> {
        Implication::new(lhs, rhs).map(Assertion::Rule)
    }

    pub fn is_fact(&self) -> bool {
        matches!(self, Assertion::Fact(_))
    }

    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Assertion::Fact(s) => Some(s),
            Assertion::Rule(_) => None,
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::Fact(s) => write!(f, "fact: {}", s),
            Assertion::Rule(r) => write!(f, "rule: {}", r),
        }
    }
}

impl From<Statement> for Assertion {
    fn from(statement: Statement) -> Self {
        Assertion::Fact(statement)
    }
}

impl From<Implication> for Assertion {
    fn from(implication: Implication) -> Self {
        Assertion::Rule(implication)
    }
}

/// A stored fact
///
/// Facts have identity (their id) but no `PartialEq`: structural comparison
/// goes through [`Fact::statement`].
#[derive(Clone, Debug)]
pub struct Fact {
    pub(crate) id: FactId,
    pub(crate) statement: Statement,
    pub(crate) provenance: Provenance,
}

impl Fact {
    pub fn id(&self) -> FactId {
        self.id
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn is_asserted(&self) -> bool {
        self.provenance.asserted
    }

    pub fn supported_by(&self) -> &[Support] {
        &self.provenance.supported_by
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement)
    }
}

/// A stored rule, possibly a partially specialized one
#[derive(Clone, Debug)]
pub struct Rule {
    pub(crate) id: RuleId,
    pub(crate) implication: Implication,
    pub(crate) provenance: Provenance,
}

impl Rule {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn implication(&self) -> &Implication {
        &self.implication
    }

    pub fn lhs(&self) -> &[Statement] {
        self.implication.lhs()
    }

    pub fn rhs(&self) -> &Statement {
        self.implication.rhs()
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn is_asserted(&self) -> bool {
        self.provenance.asserted
    }

    pub fn supported_by(&self) -> &[Support] {
        &self.provenance.supported_by
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.implication)
    }
}
