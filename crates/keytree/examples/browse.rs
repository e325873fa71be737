//! Walks through a browsing session against an in-memory tree.
//!
//! Run with `RUST_LOG=keytree=debug cargo run --example browse` to see the
//! model's own logging.

use std::sync::{Arc, Weak};

use keytree::model::{
    ConnectionsModel, ItemModel, MemoryNode, ModelIndex, ModelTreeDebug, NodeSpec, TreeStyle,
};
use keytree::settings::Settings;
use tracing_subscriber::EnvFilter;

fn find(model: &ConnectionsModel, parent: &ModelIndex, name: &str) -> Option<ModelIndex> {
    (0..model.row_count(parent))
        .map(|row| model.index(row, 0, parent))
        .find(|index| model.display_text(index).as_deref() == Some(name))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = match Settings::default_path() {
        Some(path) => Settings::load_or_default(path)?,
        None => Settings::new(),
    };
    let model = ConnectionsModel::new(Arc::new(settings));

    // Stand-in for a view: expand what the model asks for.
    let view: Weak<ConnectionsModel> = Arc::downgrade(&model);
    model.expand_requested().connect(move |index| {
        if let Some(model) = view.upgrade() {
            println!("expand: {}", model.display_text(index).unwrap_or_default());
            model.set_expanded(index);
            if model.can_fetch_more(index) {
                model.fetch_more(index);
            }
        }
    });

    let spec: NodeSpec = serde_json::from_str(
        r#"{
            "kind": "server",
            "name": "local",
            "display_name": "local (127.0.0.1:6379)",
            "children": [
                { "kind": "database", "name": "db0", "children": [
                    { "kind": "namespace", "name": "user", "children": [
                        { "kind": "key", "name": "user:1" },
                        { "kind": "key", "name": "user:2" }
                    ]},
                    { "kind": "namespace", "name": "session" },
                    { "kind": "key", "name": "counter" }
                ]},
                { "kind": "database", "name": "db1" }
            ]
        }"#,
    )?;
    let server = MemoryNode::root(model.handle(), spec);
    model.add_root_item(server.clone());

    let root = ModelIndex::invalid();
    let server_index = model.index(0, 0, &root);
    model.fetch_more(&server_index);

    if let Some(db0) = find(&model, &server_index, "db0") {
        model.fetch_more(&db0);
        if let Some(user) = find(&model, &db0, "user") {
            model.fetch_more(&user);
            model.set_expanded(&user);
        }
    }

    let debug = ModelTreeDebug::new().with_style(TreeStyle::Unicode);
    println!("{}", debug.format(model.as_ref()));

    println!("reloading db0, expanded: {:?}", model.expanded_namespaces());
    if let Some(db0) = server.child_named("db0") {
        db0.reload();
    }

    println!("{}", debug.format(model.as_ref()));
    Ok(())
}
