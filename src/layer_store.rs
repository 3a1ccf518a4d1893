//! Named collection of layers (§4.5). Layers are created lazily on first
//! mutation and destroyed only by explicit teardown, which this crate
//! does not provide an operation for (not specified in scope).

use std::collections::HashMap;

use crate::layer::Layer;

#[derive(Default)]
pub struct LayerStore {
    layers: HashMap<String, Layer>,
}

impl LayerStore {
    pub fn new() -> LayerStore {
        LayerStore::default()
    }

    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    /// Create the layer if it doesn't already exist, then return a
    /// mutable handle to it.
    pub fn get_or_create(&mut self, name: &str) -> &mut Layer {
        self.layers
            .entry(name.to_string())
            .or_insert_with(|| Layer::new(name.to_string()))
    }

    /// List all layers, or just the one named, in no particular order
    /// beyond what the caller requested.
    pub fn list(&self, name: Option<&str>) -> Vec<&Layer> {
        match name {
            Some(name) => self.find(name).into_iter().collect(),
            None => self.layers.values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_lazy_and_stable() {
        let mut store = LayerStore::new();
        assert!(store.find("l").is_none());
        store.get_or_create("l").add_disabled_node(crate::graph::tests::node(1));
        assert!(store.find("l").is_some());
    }

    #[test]
    fn list_filters_by_name() {
        let mut store = LayerStore::new();
        store.get_or_create("a");
        store.get_or_create("b");
        assert_eq!(store.list(None).len(), 2);
        assert_eq!(store.list(Some("a")).len(), 1);
        assert_eq!(store.list(Some("missing")).len(), 0);
    }
}
