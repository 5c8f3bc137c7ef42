use serde::{Deserialize, Serialize};

/// One graph node. Its position in the index's node vector is its ordinal.
///
/// `layers[0]` holds the base-layer neighbors (every node lives there);
/// higher layers hold progressively sparser express links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Node {
    pub layers: Vec<Vec<usize>>,
}

impl Node {
    pub fn new(top_layer: usize) -> Self {
        Self {
            layers: vec![Vec::new(); top_layer + 1],
        }
    }

    pub fn neighbors(&self, layer: usize) -> &[usize] {
        self.layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neighbors_mut(&mut self, layer: usize) -> Option<&mut Vec<usize>> {
        self.layers.get_mut(layer)
    }

    /// Add a neighbor link; silently ignores layers above the node's top.
    pub fn add_neighbor(&mut self, layer: usize, neighbor: usize) {
        if let Some(neighbors) = self.layers.get_mut(layer) {
            if !neighbors.contains(&neighbor) {
                neighbors.push(neighbor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_above_top_layer_are_empty() {
        let mut node = Node::new(1);
        node.add_neighbor(0, 7);
        node.add_neighbor(5, 9);
        assert_eq!(node.neighbors(0), &[7]);
        assert!(node.neighbors(5).is_empty());
    }

    #[test]
    fn add_neighbor_deduplicates() {
        let mut node = Node::new(0);
        node.add_neighbor(0, 3);
        node.add_neighbor(0, 3);
        assert_eq!(node.neighbors(0), &[3]);
    }
}
