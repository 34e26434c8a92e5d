//! The two-struct demo: a wrapper view injects `MyData` and `YourData`, and
//! `ContentView` and its child `MyView` read them back.

use serde::{Deserialize, Serialize};

use crate::context::EnvironmentValues;
use crate::keys::builtins::{MyDataKey, YourDataKey};
use crate::tree::{NodeId, Tree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyData {
    pub name: String,
    pub age: i64,
}

impl MyData {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self { name: name.into(), age }
    }

    pub fn guest() -> Self { Self::new("Guest", 0) }

    pub fn md1(&self) -> String {
        format!("in func {}-{}", self.name, self.age)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YourData {
    pub name: String,
    pub age: i64,
}

impl YourData {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self { name: name.into(), age }
    }

    pub fn guest() -> Self { Self::new("Guest", 0) }
}

pub const APP: &str = "EnvWithStructApp";
pub const WRAPPER: &str = "EnvironmentWrapperView";
pub const CONTENT_VIEW: &str = "ContentView";
pub const MY_VIEW: &str = "MyView";

pub fn greeting(view: &str, name: &str, age: i64) -> String {
    format!("Hello from {view}, {name}! You are {age} years old.")
}

fn view_lines(view: &'static str) -> impl Fn(&EnvironmentValues) -> Vec<String> + Send + Sync {
    move |env| {
        let data = env.get::<MyDataKey>();
        let your = env.get::<YourDataKey>();
        vec![
            greeting(view, &data.name, data.age),
            greeting(view, &your.name, your.age),
            MyData::new("albert", 99).md1(),
        ]
    }
}

/// `ContentView` under `parent`, with `MyView` as its child. Returns the
/// `ContentView` node.
pub fn content_view(tree: &mut Tree, parent: NodeId) -> NodeId {
    let content = tree.add_child(parent, CONTENT_VIEW);
    tree.set_content(content, view_lines(CONTENT_VIEW));
    let my_view = tree.add_child(content, MY_VIEW);
    tree.set_content(my_view, view_lines(MY_VIEW));
    content
}

/// A wrapper that sets Alice/Bob for its content. It reports what it reads
/// itself, which is still the inherited environment.
pub fn environment_wrapper(tree: &mut Tree, parent: NodeId) -> NodeId {
    let wrapper = tree.add_child(parent, WRAPPER);
    tree.set::<MyDataKey>(wrapper, MyData::new("Alice", 30));
    tree.set::<YourDataKey>(wrapper, YourData::new("Bob", 35));
    tree.set_content(wrapper, |env: &EnvironmentValues| {
        let data = env.get::<MyDataKey>();
        vec![format!("{WRAPPER} itself sees {}-{}", data.name, data.age)]
    });
    wrapper
}

/// The assembled demo tree.
pub struct SampleTree {
    pub tree: Tree,
    /// Where the injected values live: the wrapper, or the app root when
    /// built bare.
    pub scope: NodeId,
    pub content_view: NodeId,
    pub my_view: NodeId,
}

pub fn build(wrapped: bool) -> SampleTree {
    let mut tree = Tree::new(APP);
    let root = tree.root();
    let scope = if wrapped { environment_wrapper(&mut tree, root) } else { root };
    let content_view = content_view(&mut tree, scope);
    let my_view = tree.children(content_view)[0];
    SampleTree { tree, scope, content_view, my_view }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn md1_formats_name_and_age() {
        assert_eq!(MyData::new("albert", 99).md1(), "in func albert-99");
    }

    #[test]
    fn wrapped_views_see_injected_values() {
        let sample = build(true);
        let tree = &sample.tree;
        assert_eq!(tree.resolve::<MyDataKey>(sample.my_view), MyData::new("Alice", 30));
        assert_eq!(tree.resolve::<YourDataKey>(sample.content_view), YourData::new("Bob", 35));
        assert_eq!(tree.resolve::<MyDataKey>(sample.scope), MyData::guest());
    }

    #[test]
    fn bare_views_see_defaults() {
        let sample = build(false);
        assert_eq!(sample.scope, sample.tree.root());
        assert_eq!(sample.tree.resolve::<MyDataKey>(sample.my_view), MyData::guest());
        assert_eq!(sample.tree.resolve::<YourDataKey>(sample.my_view), YourData::guest());
    }
}
