//! Explanations of why an item is in the knowledge base
//!
//! Walks the `supported_by` graph from an item down to asserted leaves. Each
//! node lists its support options; every option is a fact/rule pair, and
//! either option on its own is enough to justify the node.
//!
//! # Example
//!
//! ```ignore
//! let answers = kb.ask(&parse_input("fact: (grandparent A ?X)")?)?;
//! let explanation = explain_answer(&kb, &answers[0]);
//! println!("{}", explanation.to_text());
//! ```
//!
//! ```text
//! Answer: ?X : C
//! • (grandparent A C)
//!   option 1:
//!     • (parent B C) [asserted]
//!     • ((parent B ?z)) -> (grandparent A ?z)
//!       option 1:
//!         • (parent A B) [asserted]
//!         • ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z) [asserted]
//! ```

use fnv::FnvHashSet;
use serde_json::{json, Value};

use super::{Answer, ItemId, KnowledgeBase};
use crate::term::Binding;

/// One item in an explanation tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportNode {
    pub item: ItemId,
    /// Statement or implication text
    pub label: String,
    pub asserted: bool,
    /// The item already appears higher on this path; its options are omitted
    pub cycle: bool,
    pub options: Vec<SupportOption>,
}

/// A fact/rule pair that justifies its parent node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportOption {
    pub fact: SupportNode,
    pub rule: SupportNode,
}

impl SupportNode {
    /// Longest path to a leaf, counting this node
    pub fn depth(&self) -> usize {
        1 + self
            .options
            .iter()
            .map(|o| o.fact.depth().max(o.rule.depth()))
            .max()
            .unwrap_or(0)
    }

    fn write_text(&self, indent: usize, output: &mut String) {
        let pad = "  ".repeat(indent);
        output.push_str(&format!("{}• {}", pad, self.label));
        if self.asserted {
            output.push_str(" [asserted]");
        }
        if self.cycle {
            output.push_str(" [cycle]");
        }
        output.push('\n');

        for (i, option) in self.options.iter().enumerate() {
            output.push_str(&format!("{}  option {}:\n", pad, i + 1));
            option.fact.write_text(indent + 2, output);
            option.rule.write_text(indent + 2, output);
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "item": self.item.to_string(),
            "label": self.label,
            "asserted": self.asserted,
            "cycle": self.cycle,
            "options": self
                .options
                .iter()
                .map(|o| json!({ "fact": o.fact.to_value(), "rule": o.rule.to_value() }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Explanation of one item or one query answer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Explanation {
    /// Set when explaining a query answer
    pub binding: Option<Binding>,
    pub roots: Vec<SupportNode>,
}

impl Explanation {
    /// Format as an indented plain-text tree
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        if let Some(binding) = &self.binding {
            output.push_str(&format!("Answer: {}\n", binding));
        }
        for root in &self.roots {
            root.write_text(0, &mut output);
        }
        output
    }

    /// Format as JSON
    pub fn to_json(&self) -> String {
        let value = json!({
            "binding": self.binding.as_ref().map(|b| b.to_string()),
            "roots": self.roots.iter().map(SupportNode::to_value).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

/// Build the justification tree for a live item
pub fn explain_item(kb: &KnowledgeBase, item: ItemId) -> Option<SupportNode> {
    let mut path = FnvHashSet::default();
    build_node(kb, item, &mut path)
}

/// Explain every fact behind a query answer
pub fn explain_answer(kb: &KnowledgeBase, answer: &Answer) -> Explanation {
    Explanation {
        binding: Some(answer.binding.clone()),
        roots: answer
            .facts
            .iter()
            .filter_map(|id| explain_item(kb, ItemId::Fact(*id)))
            .collect(),
    }
}

fn build_node(kb: &KnowledgeBase, item: ItemId, path: &mut FnvHashSet<ItemId>) -> Option<SupportNode> {
    let label = match item {
        ItemId::Fact(id) => kb.fact(id)?.to_string(),
        ItemId::Rule(id) => kb.rule(id)?.to_string(),
    };
    let provenance = kb.provenance(item)?;

    let mut node = SupportNode {
        item,
        label,
        asserted: provenance.is_asserted(),
        cycle: false,
        options: Vec::new(),
    };

    if !path.insert(item) {
        node.cycle = true;
        return Some(node);
    }

    for support in provenance.supported_by() {
        let fact = build_node(kb, ItemId::Fact(support.fact), path);
        let rule = build_node(kb, ItemId::Rule(support.rule), path);
        if let (Some(fact), Some(rule)) = (fact, rule) {
            node.options.push(SupportOption { fact, rule });
        }
    }

    path.remove(&item);
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReasoningConfig;
    use crate::parser::{parse_input, parse_statement};

    fn family() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.load_str(
            "fact: (parent A B)
             fact: (parent B C)
             rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)",
        )
        .unwrap();
        kb
    }

    #[test]
    fn test_explain_asserted_fact() {
        let kb = family();
        let id = kb.find_fact(&parse_statement("(parent A B)").unwrap()).unwrap().id();
        let node = explain_item(&kb, ItemId::Fact(id)).unwrap();
        assert!(node.asserted);
        assert!(node.options.is_empty());
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn test_explain_answer_tree() {
        let kb = family();
        let answers = kb.ask(&parse_input("fact: (grandparent A ?X)").unwrap()).unwrap();
        let explanation = explain_answer(&kb, &answers[0]);

        assert_eq!(explanation.roots.len(), 1);
        let root = &explanation.roots[0];
        assert_eq!(root.label, "(grandparent A C)");
        assert_eq!(root.options.len(), 1);
        assert_eq!(root.options[0].fact.label, "(parent B C)");
        assert_eq!(root.depth(), 3);

        let text = explanation.to_text();
        assert!(text.starts_with("Answer: ?X : C\n• (grandparent A C)\n"));
        assert!(text.contains("• ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z) [asserted]"));
    }

    #[test]
    fn test_self_support_is_cut() {
        let config = ReasoningConfig {
            record_support_on_asserted: true,
            ..ReasoningConfig::default()
        };
        let mut kb = KnowledgeBase::with_config(config);
        kb.assert(parse_input("fact: (p A)").unwrap());
        kb.assert(parse_input("rule: ((p ?x)) -> (p ?x)").unwrap());

        let id = kb.find_fact(&parse_statement("(p A)").unwrap()).unwrap().id();
        let node = explain_item(&kb, ItemId::Fact(id)).unwrap();
        assert_eq!(node.options.len(), 1);
        assert!(node.options[0].fact.cycle);
    }

    #[test]
    fn test_explanation_json() {
        let kb = family();
        let answers = kb.ask(&parse_input("fact: (grandparent A ?X)").unwrap()).unwrap();
        let json = explain_answer(&kb, &answers[0]).to_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["binding"], "?X : C");
        assert_eq!(value["roots"][0]["label"], "(grandparent A C)");
    }
}
