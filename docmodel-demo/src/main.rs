use docmodel::{ClassRegistry, CollectionHandle, Connection, DocModelError, Model, Options};
use std::any::Any;
use std::process;
use std::sync::Arc;

#[allow(dead_code)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/generated.rs"));
}

use generated::{Comment, Post, Writer};

/// Stand-in for a storage connection; docmodel only checks that one is given.
#[derive(Debug)]
struct DemoConnection {
    url: String,
}

impl Connection for DemoConnection {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Demo failed: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> docmodel::Result<()> {
    let classes = Arc::new(ClassRegistry::new());
    let models = generated::build_models(&classes)?;
    log::info!("Declared {} models", models.len());

    let url = std::env::var("DOCMODEL_DEMO_URL").unwrap_or_else(|_| "memory://demo".to_string());
    let demo = DemoConnection { url };
    log::info!("Using connection {}", demo.url);
    let connection: Arc<dyn Connection> = Arc::new(demo);

    for model in &models {
        let collection = model.new_collection(Some(Arc::clone(&connection)), Options::new())?;
        println!(
            "{} -> collection '{}', class {}, fields [{}]",
            model.name(),
            collection.name(),
            model.document_class().name(),
            model
                .fields()
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut relationships: Vec<_> = model.relationships().collect();
        relationships.sort_by(|a, b| a.accessor.cmp(&b.accessor));
        for rel in relationships {
            println!(
                "  {} {} {} (foreign key {})",
                rel.accessor,
                rel.kind,
                rel.related_class.name(),
                rel.foreign_key.as_deref().unwrap_or("-")
            );
        }
    }

    let mut author = Writer::wrap(find(&models, Writer::MODEL_NAME)?.new_document());
    author.set_name("Ada")?.set_email("ada@example.com")?;

    let mut post = Post::wrap(find(&models, Post::MODEL_NAME)?.new_document());
    post.set_title("Synthesized accessors")?.set_view_count("42")?;
    println!(
        "post '{}': {} views, status {}",
        post.title().unwrap_or_default(),
        post.view_count().unwrap_or_default(),
        post.status().unwrap_or("-")
    );

    if let Err(e) = post.set_status("archived") {
        println!("rejected write: {e}");
    }
    println!(
        "dirty post fields: {:?}",
        post.document().dirty_fields().collect::<Vec<_>>()
    );

    let mut comment = Comment::wrap(find(&models, Comment::MODEL_NAME)?.new_document());
    comment.set_body("Nice write-up")?.set_score("3")?;
    println!(
        "comment by {} scored {}",
        author.name().unwrap_or_default(),
        comment.score().unwrap_or_default()
    );

    Ok(())
}

fn find<'a>(models: &'a [Model], name: &str) -> docmodel::Result<&'a Model> {
    models
        .iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| DocModelError::Schema(format!("Model '{name}' missing from schema")))
}
