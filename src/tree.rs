//! Arena-backed search tree.
//!
//! Nodes live in a `Vec` owned by the tree and refer to each other by index. Children sit
//! in a 4-slot array keyed by direction code; the directions not yet expanded are kept in a
//! bitmask. The whole tree is dropped at once when the search returns.

use crate::board;
use crate::types::{Direction, GameState};

/// Handle of a node inside its `SearchTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub state: GameState,
    pub parent: Option<NodeId>,
    children: [Option<NodeId>; 4],
    /// Bit `d` set while direction code `d` is legal and unexpanded
    untried: u8,
    pub visits: u32,
    pub total_reward: f64,
}

impl SearchNode {
    fn new(state: GameState, parent: Option<NodeId>) -> Self {
        let untried = if state.terminal {
            0
        } else {
            board::legal_directions(&state.board)
                .iter()
                .fold(0u8, |mask, dir| mask | (1 << dir.index()))
        };

        SearchNode {
            state,
            parent,
            children: [None; 4],
            untried,
            visits: 0,
            total_reward: 0.0,
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried == 0
    }

    pub fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    pub fn child(&self, dir: Direction) -> Option<NodeId> {
        self.children[dir.index()]
    }

    /// Expanded children in canonical direction order
    pub fn children(&self) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.and_then(|id| Direction::from_index(idx).map(|d| (d, id))))
    }

    /// Legal directions still waiting for expansion, canonical order
    pub fn untried_directions(&self) -> Vec<Direction> {
        Direction::all()
            .iter()
            .copied()
            .filter(|d| self.untried & (1 << d.index()) != 0)
            .collect()
    }

    /// Mean reward; only defined once the node has been visited
    pub fn mean_reward(&self) -> f64 {
        assert!(self.visits > 0, "mean reward of an unvisited node");
        self.total_reward / self.visits as f64
    }
}

#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Creates a tree holding only the root for `state`
    pub fn new(state: GameState) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new(state, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// UCB1 score of `child` under `parent`. The child must have been visited.
    pub fn ucb1(&self, parent: NodeId, child: NodeId, exploration: f64) -> f64 {
        let parent = self.node(parent);
        let child = self.node(child);
        assert!(child.visits > 0, "UCB1 ranked an unvisited child");

        let exploitation = child.total_reward / child.visits as f64;
        if exploration == 0.0 {
            return exploitation;
        }
        let exploration_term =
            exploration * ((parent.visits as f64).ln() / child.visits as f64).sqrt();
        exploitation + exploration_term
    }

    /// Highest-ranked child, first in canonical order on ties
    pub fn best_child(&self, parent: NodeId, exploration: f64) -> Option<(Direction, NodeId)> {
        let mut best: Option<(Direction, NodeId)> = None;
        let mut best_score = f64::NEG_INFINITY;

        for (dir, child) in self.node(parent).children() {
            let score = self.ucb1(parent, child, exploration);
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some((dir, child));
            }
        }
        best
    }

    /// Descends while the current node is fully expanded and has children
    pub fn select(&self, exploration: f64) -> NodeId {
        let mut current = self.root();
        loop {
            let node = self.node(current);
            if !node.is_fully_expanded() || !node.has_children() {
                return current;
            }
            match self.best_child(current, exploration) {
                Some((_, child)) => current = child,
                None => return current,
            }
        }
    }

    /// Removes and returns the first untried direction of `id` in canonical order
    pub fn take_untried(&mut self, id: NodeId) -> Option<Direction> {
        let node = &mut self.nodes[id.0];
        if node.untried == 0 {
            return None;
        }
        let code = node.untried.trailing_zeros() as usize;
        node.untried &= !(1 << code);
        Direction::from_index(code)
    }

    /// Links a new child reached from `parent` by `dir`
    pub fn add_child(&mut self, parent: NodeId, dir: Direction, state: GameState) -> NodeId {
        assert!(
            self.nodes[parent.0].children[dir.index()].is_none(),
            "direction {} expanded twice",
            dir
        );
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode::new(state, Some(parent)));
        self.nodes[parent.0].children[dir.index()] = Some(id);
        id
    }

    /// Adds one visit and `reward` to `from` and every ancestor up to the root
    pub fn backpropagate(&mut self, from: NodeId, reward: f64) {
        assert!(reward.is_finite(), "non-finite reward {}", reward);
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            node.total_reward += reward;
            current = node.parent;
        }
    }
}
