/// Reoptimizer - amortized tightening of node bounds.
///
/// Writes only grow node bounds. Nodes touched by a removal or an update are
/// queued here, one FIFO per depth, and `optimize()` recomputes a bounded
/// number of them per call. Deeper levels are drained first so a parent is
/// recomputed from already tightened children; every recomputed node queues
/// its parent, which lets the shrink ripple up to the root over later calls.

use super::config::AreaSystemConfig;
use super::spatial_tree::{NodeId, SpatialTree};

/// FIFO of nodes at one depth; `head` marks the processed prefix
#[derive(Debug, Default)]
struct DepthQueue {
    nodes: Vec<NodeId>,
    head: usize,
}

impl DepthQueue {
    fn pending(&self) -> usize {
        self.nodes.len() - self.head
    }
}

pub(crate) struct Reoptimizer {
    queues: Vec<DepthQueue>,
    quotas: Vec<u32>,
    compact_threshold: usize,
}

impl Reoptimizer {
    pub fn new(config: &AreaSystemConfig) -> Self {
        let levels = config.level_count();
        Self {
            queues: (0..levels).map(|_| DepthQueue::default()).collect(),
            quotas: (0..levels).map(|depth| config.quota_for_depth(depth)).collect(),
            compact_threshold: config.queue_compact_threshold,
        }
    }

    /// Queue a node for recomputation. No-op if it is already queued.
    pub fn enqueue(&mut self, tree: &mut SpatialTree, id: NodeId) {
        let node = tree.node_mut(id);
        if node.in_queue {
            return;
        }
        node.in_queue = true;

        let depth = node.depth as usize;
        if depth >= self.queues.len() {
            self.queues.resize_with(depth + 1, DepthQueue::default);
        }
        self.queues[depth].nodes.push(id);
    }

    /// Recompute up to each depth's quota of queued nodes, deepest first.
    ///
    /// Returns the number of nodes processed.
    pub fn optimize(&mut self, tree: &mut SpatialTree) -> usize {
        let mut processed = 0;

        for depth in (0..self.queues.len()).rev() {
            let quota = self.quotas.get(depth).or(self.quotas.last()).copied().unwrap_or(1) as usize;

            for _ in 0..quota {
                let queue = &mut self.queues[depth];
                let Some(&id) = queue.nodes.get(queue.head) else {
                    break;
                };
                queue.head += 1;

                tree.node_mut(id).in_queue = false;
                if let Some(parent) = tree.recompute(id) {
                    self.enqueue(tree, parent);
                }
                processed += 1;
            }

            self.compact(depth);
        }

        processed
    }

    fn compact(&mut self, depth: usize) {
        let queue = &mut self.queues[depth];
        if queue.head == queue.nodes.len() {
            queue.nodes.clear();
            queue.head = 0;
        } else if queue.head > self.compact_threshold {
            let dropped = queue.head;
            queue.nodes.drain(..dropped);
            queue.head = 0;
            crate::engine_debug!(
                "galaxy3d::Reoptimizer",
                "Compacted depth {} queue ({} processed entries dropped, {} pending)",
                depth, dropped, queue.nodes.len()
            );
        }
    }

    /// Number of queued nodes not yet processed
    pub fn pending(&self) -> usize {
        self.queues.iter().map(DepthQueue::pending).sum()
    }

    /// Processed-prefix length of a depth queue (0 after compaction)
    #[cfg(test)]
    fn head(&self, depth: usize) -> usize {
        self.queues[depth].head
    }
}

#[cfg(test)]
#[path = "reoptimizer_tests.rs"]
mod tests;
