//! Registry behavior across crates, driven by filesystem state

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tpl_actions::{
    Action, ActionDescriptor, ActionError, ActionNode, Enablement, RegistryBuilder, RegistryError,
};
use tpl_test_utils::TreeFixture;

struct Noop;

#[async_trait]
impl Action<()> for Noop {
    async fn run(&self, _ctx: &mut ()) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Enablement probe: some `.PrjPcb` file exists directly in `dir`.
fn project_file_probe(dir: std::path::PathBuf) -> Enablement {
    Enablement::dynamic(move || {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_project = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("PrjPcb"));
            if is_project {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

fn category_names(tree: &tpl_actions::ActionTree<()>) -> Vec<String> {
    tree.root()
        .children()
        .iter()
        .map(|node| match node {
            ActionNode::Category(cat) => cat.name().to_string(),
            ActionNode::Leaf(leaf) => leaf.display_name().to_string(),
        })
        .collect()
}

#[test]
fn altium_category_disappears_without_a_project_file() {
    // Working directory without any .PrjPcb file.
    let fixture = TreeFixture::new().file("notes.txt", "no project here");

    let mut builder = RegistryBuilder::new();
    builder.register(ActionDescriptor::new(["Office"], "Create Document", Noop));
    builder.register(
        ActionDescriptor::new(["Altium"], "Rename Project", Noop)
            .with_enablement(project_file_probe(fixture.root().to_path_buf())),
    );
    let tree = builder.build().unwrap();

    let (enabled, diagnostics) = tree.enabled();
    assert!(diagnostics.is_empty());
    assert_eq!(category_names(&enabled), vec!["Office"]);
    assert_eq!(enabled.actions().len(), 1);
    assert_eq!(enabled.actions()[0].display_name(), "Create Document");
}

#[test]
fn altium_category_returns_once_a_project_file_appears() {
    let fixture = TreeFixture::new().file("Board.PrjPcb", "");

    let mut builder = RegistryBuilder::new();
    builder.register(ActionDescriptor::new(["Office"], "Create Document", Noop));
    builder.register(
        ActionDescriptor::new(["Altium"], "Rename Project", Noop)
            .with_enablement(project_file_probe(fixture.root().to_path_buf())),
    );
    let tree = builder.build().unwrap();

    let (enabled, _) = tree.enabled();
    assert_eq!(category_names(&enabled), vec!["Office", "Altium"]);
}

#[test]
fn duplicate_registration_produces_no_tree() {
    let mut builder = RegistryBuilder::new();
    builder.register(ActionDescriptor::new(["Office"], "Create Document", Noop));
    builder.register(ActionDescriptor::new(["Office"], "Create Document", Noop));

    match builder.build() {
        Err(RegistryError::DuplicateAction { path, name }) => {
            assert_eq!(path, "Office");
            assert_eq!(name, "Create Document");
        }
        other => panic!("expected DuplicateAction, got {other:?}"),
    }
}

#[test]
fn probe_against_missing_directory_disables_and_diagnoses() {
    let mut builder = RegistryBuilder::new();
    builder.register(
        ActionDescriptor::new(["Altium"], "Rename Project", Noop)
            .with_enablement(project_file_probe("/does/not/exist".into())),
    );
    builder.register(ActionDescriptor::new(["Office"], "Create Document", Noop));
    let tree = builder.build().unwrap();

    let (enabled, diagnostics) = tree.enabled();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].display_name, "Rename Project");
    assert_eq!(category_names(&enabled), vec!["Office"]);
}

#[tokio::test]
async fn selected_action_runs_against_the_context() {
    struct AppendMarker;

    #[async_trait]
    impl Action<Vec<String>> for AppendMarker {
        async fn run(&self, ctx: &mut Vec<String>) -> Result<(), ActionError> {
            ctx.push("ran".to_string());
            Ok(())
        }
    }

    let mut builder = RegistryBuilder::new();
    builder.register(ActionDescriptor::new(["Office"], "Marker", AppendMarker));
    let tree = builder.build().unwrap();

    let mut log = Vec::new();
    tree.actions()[0].run(&mut log).await.unwrap();
    assert_eq!(log, vec!["ran"]);
}
