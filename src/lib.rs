pub mod errors;
pub mod context;
pub mod keys;
pub mod tree;
pub mod render;
pub mod options;
pub mod sample;

use tracing::debug;

use errors::Result;
use keys::KeyRegistry;
use options::RenderOptions;
use render::RenderedNode;
use sample::SampleTree;

pub use context::EnvironmentValues;
pub use errors::EnvError;
pub use keys::{EnvironmentKey, parse_override};
pub use sample::{MyData, YourData};
pub use tree::{NodeId, Tree};

/// Build the demo tree and apply `opts.overrides` where the sample injects
/// its values.
pub fn sample_tree(opts: &RenderOptions, registry: &KeyRegistry) -> Result<SampleTree> {
    let mut sample = sample::build(opts.wrap);
    for (name, value) in &opts.overrides {
        registry.apply(sample.tree.scope_mut(sample.scope), name, value)?;
    }
    debug!(wrap = opts.wrap, overrides = opts.overrides.len(), "built sample tree");
    Ok(sample)
}

/// Render the demo tree with the built-in keys.
pub fn render_sample(opts: &RenderOptions) -> Result<Vec<RenderedNode>> {
    let sample = sample_tree(opts, &KeyRegistry::with_builtins())?;
    Ok(sample.tree.render())
}

/// Render the demo tree and format it per `opts.format`.
pub fn render_sample_to_string(opts: &RenderOptions) -> Result<String> {
    let nodes = render_sample(opts)?;
    match opts.format {
        options::OutputFormat::Text => Ok(render::format_text(&nodes, opts.indent)),
        options::OutputFormat::Json => render::format_json(&nodes),
    }
}
