//! Show how a template parses.

use anyhow::{Context as _, Result};
use edge_expr::{parse_with_limits, to_template, Expr, FunctionRegistry};
use serde::Serialize;

use super::ExplainArgs;
use crate::context::Context;

/// A parse tree node for display.
#[derive(Debug, Serialize, PartialEq)]
struct Node {
    kind: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    fn from_expr(expr: &Expr, registry: &FunctionRegistry) -> Self {
        match expr {
            Expr::Literal(text) => Self {
                kind: "literal",
                text: format!("{:?}", text),
                children: Vec::new(),
            },
            Expr::ArgRef(index) => Self {
                kind: "arg",
                text: format!("{{{}}}", index),
                children: Vec::new(),
            },
            Expr::Call { name, args, .. } => {
                let arity = registry
                    .get(name)
                    .map(|def| {
                        let note = if def.arity().accepts(args.len()) { "" } else { ", renders <ARGN>" };
                        format!(" (takes {}, got {}{})", def.arity(), args.len(), note)
                    })
                    .unwrap_or_default();
                Self {
                    kind: "call",
                    text: format!("{}{}", name, arity),
                    children: args.iter().map(|a| Self::from_expr(a, registry)).collect(),
                }
            }
            Expr::Concat(parts) => Self {
                kind: "concat",
                text: String::new(),
                children: parts.iter().map(|p| Self::from_expr(p, registry)).collect(),
            },
        }
    }

    fn print(&self, depth: usize) {
        println!("{}{} {}", "  ".repeat(depth + 1), self.kind, self.text);
        for child in &self.children {
            child.print(depth + 1);
        }
    }
}

#[derive(Serialize)]
struct ExplainOutput {
    source: String,
    normalized: String,
    nodes: usize,
    tree: Vec<Node>,
}

/// Run the explain command.
pub async fn run(args: ExplainArgs, ctx: &Context) -> Result<()> {
    let compiler = ctx.compiler();
    let nodes = parse_with_limits(&args.template, &ctx.config.limits)
        .with_context(|| format!("Failed to parse `{}`", args.template))?;
    // Resolves function names, so unknown functions fail here.
    let compiled = compiler.compile(&args.template)?;

    let output = ExplainOutput {
        source: args.template.clone(),
        normalized: to_template(&nodes),
        nodes: nodes.iter().map(Expr::node_count).sum(),
        tree: nodes
            .iter()
            .map(|n| Node::from_expr(n, compiler.registry()))
            .collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&output);
        return Ok(());
    }

    ctx.output.header("Template");
    ctx.output.kv("source", &output.source);
    ctx.output.kv("normalized", &output.normalized);
    ctx.output.kv("nodes", &output.nodes.to_string());
    ctx.output.kv("constant", &compiled.is_constant().to_string());
    if let Some(max) = compiled.max_arg_index() {
        ctx.output.kv("inputs", &format!("needs at least {}", max + 1));
    }

    ctx.output.header("Tree");
    for node in &output.tree {
        node.print(0);
    }

    for diagnostic in compiled.diagnostics() {
        ctx.output.warn(&diagnostic.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_expr::parse;

    #[test]
    fn test_node_tree() {
        let nodes = parse("k:{substr {0} 1}").unwrap();
        let tree: Vec<Node> = nodes
            .iter()
            .map(|n| Node::from_expr(n, FunctionRegistry::builtin()))
            .collect();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].kind, "literal");
        assert_eq!(tree[0].text, "\"k:\"");
        assert_eq!(tree[1].kind, "call");
        assert_eq!(tree[1].text, "substr (takes 2..=3, got 2)");
        assert_eq!(tree[1].children[0].text, "{0}");
        assert_eq!(tree[1].children[1].kind, "literal");
    }

    #[test]
    fn test_node_flags_wrong_arity() {
        let nodes = parse("{lower}").unwrap();
        let node = Node::from_expr(&nodes[0], FunctionRegistry::builtin());
        assert_eq!(node.text, "lower (takes 1, got 0, renders <ARGN>)");
    }
}
