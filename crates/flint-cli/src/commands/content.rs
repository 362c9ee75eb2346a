//! Content cache commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use flint_asset::{
    CacheKeyResolver, ContentRules, DiskProbe, ImageTextureFactory, ResolvedKey, ResourceCache,
    ResourceRequest,
};
use flint_core::{IdAllocator, ResourceKind};
use flint_runtime::{DisposalNotifier, ShutdownSignal, TeardownQueue};
use std::path::Path;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum ContentCommands {
    /// Validate an identifier and print its cache key
    Resolve {
        /// Content identifier (e.g., "/fonts/Inter.ttf|size:14")
        identifier: String,

        /// Resource kind (texture, font, audio)
        #[arg(long, default_value = "texture")]
        kind: String,

        /// Rules file with a [content] table
        #[arg(long)]
        rules: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Decode textures through the texture cache, then shut it down
    Load {
        /// Texture identifiers (absolute paths)
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Rules file with a [content] table
        #[arg(long)]
        rules: Option<String>,
    },

    /// Print the effective rules as TOML
    Rules {
        /// Rules file with a [content] table
        #[arg(long)]
        rules: Option<String>,
    },
}

pub fn run(cmd: ContentCommands) -> Result<()> {
    match cmd {
        ContentCommands::Resolve {
            identifier,
            kind,
            rules,
            format,
        } => run_resolve(&identifier, &kind, rules.as_deref(), &format),
        ContentCommands::Load { identifiers, rules } => run_load(&identifiers, rules.as_deref()),
        ContentCommands::Rules { rules } => run_rules(rules.as_deref()),
    }
}

fn load_rules(path: Option<&str>) -> Result<ContentRules> {
    match path {
        Some(p) => {
            tracing::debug!(path = p, "loading content rules");
            ContentRules::load_from_file(Path::new(p))
                .with_context(|| format!("Failed to read rules from {}", p))
        }
        None => Ok(ContentRules::default()),
    }
}

fn run_resolve(identifier: &str, kind: &str, rules: Option<&str>, format: &str) -> Result<()> {
    let kind: ResourceKind = kind.parse().map_err(anyhow::Error::msg)?;
    let resolver = CacheKeyResolver::new(load_rules(rules)?)?;

    let ResolvedKey { key, request } = match resolver.resolve_identifier(identifier, kind) {
        Ok(resolved) => resolved,
        Err(e) => bail!("{} ({:?} error)", e, e.category()),
    };

    if format == "json" {
        let options = match &request {
            ResourceRequest::Texture { .. } => serde_json::Value::Null,
            ResourceRequest::FontAtlas { size, .. } => serde_json::json!({ "size": size }),
            ResourceRequest::Audio { buffer, .. } => serde_json::json!({ "buffer": buffer.name() }),
        };
        let out = serde_json::json!({
            "key": key.as_str(),
            "protected": key.is_protected(),
            "kind": request.kind().name(),
            "path": request.path().display().to_string(),
            "options": options,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Key: {}", key);
        println!("  Protected: {}", key.is_protected());
        println!("  Request: {}", request);
    }

    Ok(())
}

fn run_load(identifiers: &[String], rules: Option<&str>) -> Result<()> {
    let queue = TeardownQueue::new();
    let signal = ShutdownSignal::new();

    let cache = Arc::new(ResourceCache::new(
        ResourceKind::StandardTexture,
        load_rules(rules)?,
        ImageTextureFactory::new(Arc::new(IdAllocator::new())),
        Arc::new(DiskProbe),
        Arc::new(DisposalNotifier::new()),
    )?);
    queue.connect(cache.notifier(), ResourceKind::StandardTexture);
    cache.attach_shutdown(&signal);

    let mut failures = 0;
    for identifier in identifiers {
        match cache.get_item(identifier) {
            Ok(texture) => println!(
                "Loaded {} ({}x{}, {} bytes) as {}",
                identifier,
                texture.width,
                texture.height,
                texture.byte_len(),
                texture.id
            ),
            Err(e) => {
                failures += 1;
                eprintln!("Failed {}: {}", identifier, e);
            }
        }
    }

    let keys = cache.cache_keys();
    println!(
        "\n{} texture(s) cached, {} id(s) allocated:",
        cache.total_cached_items(),
        cache.factory().ids().allocated()
    );
    for key in &keys {
        println!("  {}", key);
    }

    signal.trigger();
    let released = queue.drain();
    println!("\nReleased {} texture(s) on shutdown", released.len());
    for notification in &released {
        println!("  {} {}", notification.id, notification.source.display());
    }

    if failures > 0 {
        bail!("{} of {} identifier(s) failed to load", failures, identifiers.len());
    }
    Ok(())
}

fn run_rules(rules: Option<&str>) -> Result<()> {
    let rules = load_rules(rules)?;
    print!("{}", rules.to_toml_string()?);
    Ok(())
}
