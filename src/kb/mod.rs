//! Knowledge base with forward chaining and truth maintenance
//!
//! The knowledge base owns every fact and rule in an insertion-ordered arena.
//! It keeps the justification graph consistent as items come and go:
//!
//! - **Assert**: a new item is stored and paired with every item of the
//!   opposite kind through the [`InferenceEngine`]; derivations are added in
//!   turn until nothing new appears. A structurally equal item is merged
//!   instead: a user assertion sets `asserted`; a derivation adds a support
//!   pair, except on an asserted item where it is dropped unless
//!   `record_support_on_asserted` is set.
//! - **Ask**: a fact-shaped query is matched against stored facts only.
//! - **Retract**: an asserted fact that is still derivable just loses its
//!   `asserted` flag. Otherwise it is deleted, and every dependent left with
//!   no support and no assertion is deleted after it.
//!
//! # Example
//!
//! ```ignore
//! use chainkb::{KnowledgeBase, parse_input};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.load_str("
//!     fact: (parent A B)
//!     fact: (parent B C)
//!     rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)
//! ")?;
//!
//! let answers = kb.ask(&parse_input("fact: (grandparent A ?X)")?)?;
//! assert_eq!(answers[0].to_string(), "?X : C");
//!
//! kb.retract(&parse_input("fact: (parent B C)")?);
//! assert!(kb.ask(&parse_input("fact: (grandparent A ?X)")?)?.is_empty());
//! ```

pub mod explain;
mod record;

pub use explain::{explain_answer, explain_item, Explanation, SupportNode, SupportOption};
pub use record::{Assertion, Fact, FactId, Implication, ItemId, Provenance, Rule, RuleId, Support};

use std::collections::VecDeque;
use std::fmt;

use fnv::{FnvHashMap, FnvHashSet};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::ReasoningConfig;
use crate::core::{InferenceEngine, Unifier};
use crate::error::{ErrorCode, KbError, KbResult};
use crate::parser::parse_document;
use crate::reasoner::{ForwardChainer, PatternUnifier};
use crate::term::{Binding, Statement};

/// One answer to a query: a binding and the stored fact that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub binding: Binding,
    pub facts: Vec<FactId>,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binding)
    }
}

/// What a retract did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Retraction {
    /// The target was absent, never asserted, or a rule
    Ignored,
    /// The fact is still derivable and stays, now purely derived
    Unasserted,
    /// The fact and every dependent left without justification were deleted
    Removed {
        facts: Vec<Statement>,
        rules: Vec<Implication>,
    },
}

impl Retraction {
    /// Number of deleted items, the retracted fact included
    pub fn removed_count(&self) -> usize {
        match self {
            Retraction::Removed { facts, rules } => facts.len() + rules.len(),
            _ => 0,
        }
    }
}

/// Counters over the lifetime of a knowledge base
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KbStats {
    /// New facts stored from user assertions
    pub facts_asserted: usize,
    /// New rules stored from user assertions
    pub rules_asserted: usize,
    /// New facts stored from derivations
    pub facts_derived: usize,
    /// New (specialized) rules stored from derivations
    pub rules_derived: usize,
    /// Asserts or derivations that landed on an existing item
    pub merges: usize,
    /// Fact/rule pairings tried
    pub fire_attempts: usize,
    /// Pairings that produced a derivation
    pub fires: usize,
    /// Retracts that changed something
    pub retractions: usize,
    /// Dependents deleted by retraction cascades
    pub cascade_deletions: usize,
    /// Asserts whose closure hit `max_closure_steps`
    pub closures_truncated: usize,
}

/// Items waiting to be paired with the opposite collection
///
/// An item is pending from the moment it is stored until it has been paired
/// with everything already settled, so each fact/rule pair fires once.
#[derive(Default)]
struct Agenda {
    queue: VecDeque<ItemId>,
    pending: FnvHashSet<ItemId>,
}

impl Agenda {
    fn push(&mut self, item: ItemId) {
        if self.pending.insert(item) {
            self.queue.push_back(item);
        }
    }

    fn pop(&mut self) -> Option<ItemId> {
        self.queue.pop_front()
    }

    fn is_pending(&self, item: ItemId) -> bool {
        self.pending.contains(&item)
    }

    fn settle(&mut self, item: ItemId) {
        self.pending.remove(&item);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A forward-chaining knowledge base with truth-maintained retraction
///
/// Not thread-safe for concurrent mutation: share it behind a single
/// exclusive lock if several threads need it.
pub struct KnowledgeBase {
    config: ReasoningConfig,
    engine: Box<dyn InferenceEngine>,
    unifier: Box<dyn Unifier>,
    facts: IndexMap<FactId, Fact>,
    rules: IndexMap<RuleId, Rule>,
    fact_index: FnvHashMap<Statement, FactId>,
    rule_index: FnvHashMap<Implication, RuleId>,
    next_id: u64,
    stats: KbStats,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with default configuration
    pub fn new() -> Self {
        Self::with_config(ReasoningConfig::default())
    }

    /// Create an empty knowledge base with custom configuration
    pub fn with_config(config: ReasoningConfig) -> Self {
        KnowledgeBase {
            config,
            engine: Box::new(ForwardChainer::new()),
            unifier: Box::new(PatternUnifier::new()),
            facts: IndexMap::new(),
            rules: IndexMap::new(),
            fact_index: FnvHashMap::default(),
            rule_index: FnvHashMap::default(),
            next_id: 0,
            stats: KbStats::default(),
        }
    }

    /// Replace the inference engine used by assert
    pub fn with_engine(mut self, engine: impl InferenceEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Replace the matcher used by ask
    pub fn with_unifier(mut self, unifier: impl Unifier + 'static) -> Self {
        self.unifier = Box::new(unifier);
        self
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    pub fn stats(&self) -> &KbStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = KbStats::default();
    }

    // ========================================================================
    // Assert
    // ========================================================================

    /// Assert a fact or rule and derive everything that follows from it
    ///
    /// Returns the id of the stored item, which is the pre-existing one when
    /// the assertion merged into a structurally equal item.
    pub fn assert(&mut self, assertion: impl Into<Assertion>) -> ItemId {
        let assertion = assertion.into();
        debug!(%assertion, "asserting");

        let mut agenda = Agenda::default();
        let (id, _) = self.add(assertion, None, &mut agenda);
        self.close(agenda);
        id
    }

    /// Parse a document of `fact:` / `rule:` entries and assert each in order
    pub fn load_str(&mut self, text: &str) -> KbResult<usize> {
        let entries = parse_document(text)?;
        let count = entries.len();
        for entry in entries {
            self.assert(entry);
        }
        debug!(count, "loaded entries");
        Ok(count)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Store a new item or merge into an existing one
    ///
    /// The flag is true when `support` was recorded on the resulting item.
    fn add(&mut self, assertion: Assertion, support: Option<Support>, agenda: &mut Agenda) -> (ItemId, bool) {
        match assertion {
            Assertion::Fact(statement) => {
                if let Some(&id) = self.fact_index.get(&statement) {
                    let item = ItemId::Fact(id);
                    return (item, self.merge(item, support));
                }

                let id = FactId::new(self.allocate_id());
                let provenance = match support {
                    Some(support) => {
                        self.stats.facts_derived += 1;
                        Provenance::derived(support)
                    }
                    None => {
                        self.stats.facts_asserted += 1;
                        Provenance::asserted()
                    }
                };
                debug!(fact = %statement, derived = support.is_some(), "adding fact");

                self.fact_index.insert(statement.clone(), id);
                self.facts.insert(id, Fact { id, statement, provenance });
                agenda.push(ItemId::Fact(id));
                (ItemId::Fact(id), true)
            }
            Assertion::Rule(implication) => {
                if let Some(&id) = self.rule_index.get(&implication) {
                    let item = ItemId::Rule(id);
                    return (item, self.merge(item, support));
                }

                let id = RuleId::new(self.allocate_id());
                let provenance = match support {
                    Some(support) => {
                        self.stats.rules_derived += 1;
                        Provenance::derived(support)
                    }
                    None => {
                        self.stats.rules_asserted += 1;
                        Provenance::asserted()
                    }
                };
                debug!(rule = %implication, derived = support.is_some(), "adding rule");

                self.rule_index.insert(implication.clone(), id);
                self.rules.insert(id, Rule { id, implication, provenance });
                agenda.push(ItemId::Rule(id));
                (ItemId::Rule(id), true)
            }
        }
    }

    /// Fold an assertion or derivation into an existing item
    ///
    /// Never triggers inference: the item's consequences already exist.
    fn merge(&mut self, item: ItemId, support: Option<Support>) -> bool {
        let record_on_asserted = self.config.record_support_on_asserted;
        self.stats.merges += 1;

        let Some(provenance) = self.provenance_mut(item) else {
            return false;
        };

        match support {
            Some(support) => {
                if provenance.asserted && !record_on_asserted {
                    debug!(%item, "derivation of asserted item not recorded");
                    return false;
                }
                provenance.supported_by.push(support);
                debug!(%item, supports = provenance.supported_by.len(), "merged derivation");
                true
            }
            None => {
                provenance.asserted = true;
                debug!(%item, "marked asserted");
                false
            }
        }
    }

    /// Run the agenda to a fixpoint
    fn close(&mut self, mut agenda: Agenda) {
        let limit = self.config.max_closure_steps;
        let mut steps = 0;

        while let Some(item) = agenda.pop() {
            if limit > 0 && steps >= limit {
                warn!(limit, remaining = agenda.len() + 1, "closure truncated");
                self.stats.closures_truncated += 1;
                return;
            }
            steps += 1;

            match item {
                ItemId::Fact(fact) => {
                    let rules: Vec<RuleId> = self
                        .rules
                        .keys()
                        .copied()
                        .filter(|r| !agenda.is_pending(ItemId::Rule(*r)))
                        .collect();
                    for rule in rules {
                        self.try_fire(fact, rule, &mut agenda);
                    }
                }
                ItemId::Rule(rule) => {
                    let facts: Vec<FactId> = self
                        .facts
                        .keys()
                        .copied()
                        .filter(|f| !agenda.is_pending(ItemId::Fact(*f)))
                        .collect();
                    for fact in facts {
                        self.try_fire(fact, rule, &mut agenda);
                    }
                }
            }

            agenda.settle(item);
        }
    }

    fn try_fire(&mut self, fact_id: FactId, rule_id: RuleId, agenda: &mut Agenda) {
        let (Some(fact), Some(rule)) = (self.facts.get(&fact_id), self.rules.get(&rule_id)) else {
            return;
        };
        trace!(%fact, %rule, engine = self.engine.name(), "attempting to fire");

        let derivation = self.engine.fire(fact, rule);
        self.stats.fire_attempts += 1;
        let Some(derivation) = derivation else {
            return;
        };
        self.stats.fires += 1;
        trace!(binding = %derivation.binding, derived = %derivation.assertion, "fired");

        let support = derivation.support;
        let (target, recorded) = self.add(derivation.assertion, Some(support), agenda);
        if recorded {
            self.link(support, target);
        }
    }

    /// Register `dependent` on both sides of the pair that justifies it
    fn link(&mut self, support: Support, dependent: ItemId) {
        if let Some(fact) = self.facts.get_mut(&support.fact) {
            fact.provenance.add_dependent(dependent);
        }
        if let Some(rule) = self.rules.get_mut(&support.rule) {
            rule.provenance.add_dependent(dependent);
        }
    }

    // ========================================================================
    // Ask
    // ========================================================================

    /// Answer a fact-shaped query against the stored facts
    ///
    /// Returns every binding under which a stored fact matches, in storage
    /// order; an empty list means nothing matched. Asking with a rule is an
    /// error, distinct from an empty answer.
    pub fn ask(&self, query: &Assertion) -> KbResult<Vec<Answer>> {
        match query {
            Assertion::Fact(statement) => self.ask_statement(statement),
            Assertion::Rule(rule) => {
                warn!(query = %rule, "invalid ask: rules cannot be queried");
                Err(KbError::invalid_query("rules cannot be used as queries")
                    .with_code(ErrorCode::RuleQuery)
                    .with_context("query", rule.to_string())
                    .with_hint("ask with a fact pattern such as (pred A ?x)"))
            }
        }
    }

    /// Answer a query statement against the stored facts
    pub fn ask_statement(&self, statement: &Statement) -> KbResult<Vec<Answer>> {
        let predicate = statement.predicate();
        if predicate.trim().is_empty() || predicate.starts_with('?') {
            warn!(query = %statement, "invalid ask: no resolvable predicate");
            return Err(KbError::invalid_query("query has no resolvable predicate")
                .with_code(ErrorCode::UnresolvablePredicate)
                .with_context("query", statement.to_string()));
        }

        debug!(query = %statement, "asking");
        let answers: Vec<Answer> = self
            .facts
            .values()
            .filter_map(|fact| {
                self.unifier.unify(statement, fact.statement()).map(|binding| Answer {
                    binding,
                    facts: vec![fact.id],
                })
            })
            .collect();
        debug!(query = %statement, answers = answers.len(), "answered");

        Ok(answers)
    }

    // ========================================================================
    // Retract
    // ========================================================================

    /// Retract an asserted fact
    ///
    /// Rules, absent facts and never-asserted facts are ignored.
    pub fn retract(&mut self, target: &Assertion) -> Retraction {
        match target {
            Assertion::Fact(statement) => self.retract_statement(statement),
            Assertion::Rule(rule) => {
                debug!(%rule, "rules cannot be retracted; ignoring");
                Retraction::Ignored
            }
        }
    }

    /// Retract the asserted fact structurally equal to `statement`
    pub fn retract_statement(&mut self, statement: &Statement) -> Retraction {
        debug!(fact = %statement, "retracting");

        let Some(&id) = self.fact_index.get(statement) else {
            debug!(fact = %statement, "not in knowledge base; ignoring");
            return Retraction::Ignored;
        };
        let Some(fact) = self.facts.get_mut(&id) else {
            return Retraction::Ignored;
        };
        if !fact.provenance.asserted {
            debug!(fact = %statement, "never asserted; ignoring");
            return Retraction::Ignored;
        }

        self.stats.retractions += 1;

        if fact.provenance.is_supported() {
            fact.provenance.asserted = false;
            debug!(
                fact = %statement,
                supports = fact.provenance.supported_by.len(),
                "still derivable; kept as derived"
            );
            return Retraction::Unasserted;
        }

        let (facts, rules) = self.cascade(ItemId::Fact(id));
        Retraction::Removed { facts, rules }
    }

    /// Delete `root`, then every dependent left orphaned, transitively
    fn cascade(&mut self, root: ItemId) -> (Vec<Statement>, Vec<Implication>) {
        let mut removed_facts = Vec::new();
        let mut removed_rules = Vec::new();
        let mut queue = VecDeque::from([root]);

        while let Some(item) = queue.pop_front() {
            let doomed = item == root || self.provenance(item).map_or(false, Provenance::is_orphaned);
            if !doomed {
                continue;
            }

            let Some(provenance) = self.detach(item, &mut removed_facts, &mut removed_rules) else {
                continue;
            };
            if item != root {
                self.stats.cascade_deletions += 1;
            }

            for dependent in provenance.dependents() {
                self.drop_support(dependent, item);
                queue.push_back(dependent);
            }
        }

        debug!(
            facts = removed_facts.len(),
            rules = removed_rules.len(),
            "retraction cascade finished"
        );
        (removed_facts, removed_rules)
    }

    /// Remove an item from storage and indexes
    fn detach(
        &mut self,
        item: ItemId,
        removed_facts: &mut Vec<Statement>,
        removed_rules: &mut Vec<Implication>,
    ) -> Option<Provenance> {
        match item {
            ItemId::Fact(id) => {
                let fact = self.facts.shift_remove(&id)?;
                self.fact_index.remove(&fact.statement);
                debug!(fact = %fact.statement, "removed fact");
                removed_facts.push(fact.statement);
                Some(fact.provenance)
            }
            ItemId::Rule(id) => {
                let rule = self.rules.shift_remove(&id)?;
                self.rule_index.remove(&rule.implication);
                debug!(rule = %rule.implication, "removed rule");
                removed_rules.push(rule.implication);
                Some(rule.provenance)
            }
        }
    }

    /// Drop `dependent`'s support pairs naming the deleted item
    ///
    /// The surviving side of each dropped pair stops listing `dependent` as
    /// something it supports, unless another pair still connects them.
    fn drop_support(&mut self, dependent: ItemId, deleted: ItemId) {
        let partners: Vec<ItemId> = {
            let Some(provenance) = self.provenance_mut(dependent) else {
                return;
            };
            let dropped = provenance.drop_support_from(deleted);
            dropped
                .into_iter()
                .map(|s| match deleted {
                    ItemId::Fact(_) => ItemId::Rule(s.rule),
                    ItemId::Rule(_) => ItemId::Fact(s.fact),
                })
                .filter(|partner| !provenance.supported_by.iter().any(|s| s.mentions(*partner)))
                .collect()
        };

        for partner in partners {
            if let Some(provenance) = self.provenance_mut(partner) {
                provenance.remove_dependent(dependent);
            }
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Facts in insertion order
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Rules in insertion order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Find the stored fact structurally equal to `statement`
    pub fn find_fact(&self, statement: &Statement) -> Option<&Fact> {
        self.fact_index.get(statement).and_then(|id| self.facts.get(id))
    }

    /// Find the stored rule structurally equal to `implication`
    pub fn find_rule(&self, implication: &Implication) -> Option<&Rule> {
        self.rule_index.get(implication).and_then(|id| self.rules.get(id))
    }

    pub fn contains_fact(&self, statement: &Statement) -> bool {
        self.fact_index.contains_key(statement)
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.rules.is_empty()
    }

    /// Justification state of any live item
    pub fn provenance(&self, item: ItemId) -> Option<&Provenance> {
        match item {
            ItemId::Fact(id) => self.facts.get(&id).map(|f| &f.provenance),
            ItemId::Rule(id) => self.rules.get(&id).map(|r| &r.provenance),
        }
    }

    fn provenance_mut(&mut self, item: ItemId) -> Option<&mut Provenance> {
        match item {
            ItemId::Fact(id) => self.facts.get_mut(&id).map(|f| &mut f.provenance),
            ItemId::Rule(id) => self.rules.get_mut(&id).map(|r| &mut r.provenance),
        }
    }

    /// Check the justification graph invariants
    ///
    /// - no stored item is both unasserted and unsupported
    /// - every support pair names live items, and both list the item as a dependent
    /// - every dependent edge points at a live item holding a pair that names its source
    pub fn verify_integrity(&self) -> KbResult<()> {
        let items = self
            .facts
            .keys()
            .map(|id| ItemId::Fact(*id))
            .chain(self.rules.keys().map(|id| ItemId::Rule(*id)));

        for item in items {
            let provenance = self
                .provenance(item)
                .ok_or_else(|| KbError::internal(format!("{} vanished during check", item)))?;

            if provenance.is_orphaned() {
                return Err(broken(item, "neither asserted nor supported"));
            }

            for support in provenance.supported_by() {
                for side in [ItemId::Fact(support.fact), ItemId::Rule(support.rule)] {
                    let lists_item = self
                        .provenance(side)
                        .map(|p| p.dependents().any(|d| d == item))
                        .ok_or_else(|| broken(item, format!("support names deleted {}", side)))?;
                    if !lists_item {
                        return Err(broken(item, format!("{} does not list it as a dependent", side)));
                    }
                }
            }

            for dependent in provenance.dependents() {
                let backed = self
                    .provenance(dependent)
                    .map(|p| p.supported_by().iter().any(|s| s.mentions(item)))
                    .ok_or_else(|| broken(item, format!("lists deleted dependent {}", dependent)))?;
                if !backed {
                    return Err(broken(item, format!("dependent {} holds no pair naming it", dependent)));
                }
            }
        }

        Ok(())
    }
}

fn broken(item: ItemId, message: impl Into<String>) -> KbError {
    KbError::new(ErrorCode::UnexpectedState, message).with_context("item", item.to_string())
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Knowledge Base:")?;
        for fact in self.facts.values() {
            writeln!(f, "fact: {}", fact)?;
        }
        for rule in self.rules.values() {
            writeln!(f, "rule: {}", rule)?;
        }
        Ok(())
    }
}
