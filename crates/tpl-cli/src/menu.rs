//! Interactive tree navigation
//!
//! Walks the enabled action tree one category at a time: subcategories and
//! actions of the current level are offered in a select prompt, `..` moves
//! back up, picking a leaf runs it and ends the session.

use colored::Colorize;
use dialoguer::Select;
use tpl_actions::{ActionNode, ActionTree, Category};

use crate::context::RunContext;
use crate::error::Result;

const PARENT_ENTRY: &str = "..";

/// Navigate the tree and run the chosen action.
pub async fn browse_and_run(
    tree: &ActionTree<RunContext>,
    ctx: &mut RunContext,
) -> Result<()> {
    let (enabled, diagnostics) = tree.enabled();
    for diagnostic in &diagnostics {
        eprintln!(
            "{} {} ({}): {}",
            "warning:".yellow().bold(),
            diagnostic.display_name,
            diagnostic.qualified_path.join("/"),
            diagnostic.message.dimmed()
        );
    }

    if enabled.is_empty() {
        println!("No actions are available right now.");
        return Ok(());
    }

    let mut stack: Vec<&Category<RunContext>> = vec![enabled.root()];
    loop {
        let current = *stack.last().expect("navigation stack is never empty");

        let mut items = Vec::new();
        if stack.len() > 1 {
            items.push(PARENT_ENTRY.to_string());
        }
        for child in current.children() {
            match child {
                ActionNode::Category(category) => items.push(format!("{}/", category.name())),
                ActionNode::Leaf(leaf) => items.push(leaf.display_name().to_string()),
            }
        }

        let breadcrumb: Vec<&str> = stack[1..].iter().map(|c| c.name()).collect();
        let prompt = if breadcrumb.is_empty() {
            "Choose an action".to_string()
        } else {
            format!("Choose an action ({})", breadcrumb.join("/"))
        };

        let selection = Select::new()
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact()?;

        let offset = usize::from(stack.len() > 1);
        if selection < offset {
            stack.pop();
            continue;
        }

        match &current.children()[selection - offset] {
            ActionNode::Category(category) => stack.push(category),
            ActionNode::Leaf(leaf) => {
                let descriptor = std::sync::Arc::clone(leaf);
                if !descriptor.description().is_empty() {
                    println!("{}", descriptor.description().dimmed());
                }
                descriptor.run(ctx).await?;
                return Ok(());
            }
        }
    }
}
