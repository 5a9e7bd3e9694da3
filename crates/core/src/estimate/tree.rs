//! Arena-backed estimate hierarchy.
//!
//! Nodes are addressed by [`EstimateId`]; each node keeps its children as an
//! ordered id list and its parent as an optional id. Traversals follow child
//! insertion order, so every walk over the same tree visits nodes in the same
//! sequence.

use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc::Receiver;

use budgetcast_shared::types::EstimateId;
use budgetcast_shared::{CashCommodity, CurrencyCode};

use super::error::TreeError;
use super::events::{EventBus, TreeEvent};
use super::types::{Estimate, EstimateChange, EstimateSnapshot, EstimateType};
use crate::assignment::ActualFigures;
use crate::currency::CurrencyCalculator;

/// A slot in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateNode {
    /// The estimate stored here.
    pub estimate: Estimate,
    parent: Option<EstimateId>,
    children: Vec<EstimateId>,
}

impl EstimateNode {
    const fn new(estimate: Estimate, parent: Option<EstimateId>) -> Self {
        Self {
            estimate,
            parent,
            children: Vec::new(),
        }
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<EstimateId> {
        self.parent
    }

    /// Child ids in insertion order.
    #[must_use]
    pub fn children(&self) -> &[EstimateId] {
        &self.children
    }
}

/// A budget: one root category and everything below it.
#[derive(Debug)]
pub struct EstimateTree {
    root: EstimateId,
    nodes: HashMap<EstimateId, EstimateNode>,
    events: EventBus,
}

impl Clone for EstimateTree {
    /// Copies the structure; subscribers stay with the original.
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            nodes: self.nodes.clone(),
            events: EventBus::default(),
        }
    }
}

impl EstimateTree {
    /// Creates a tree holding only a root category.
    #[must_use]
    pub fn new(root_name: impl Into<String>, currency: CurrencyCode) -> Self {
        let root = Estimate::category(root_name, currency);
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, EstimateNode::new(root, None));
        Self {
            root: root_id,
            nodes,
            events: EventBus::default(),
        }
    }

    /// Creates a tree from an existing root estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a category with a zero amount.
    pub fn from_root(root: Estimate) -> Result<Self, TreeError> {
        if root.estimate_type != EstimateType::Category {
            return Err(TreeError::RootNotCategory(root.name));
        }
        ensure_no_direct_amount(&root)?;
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, EstimateNode::new(root, None));
        Ok(Self {
            root: root_id,
            nodes,
            events: EventBus::default(),
        })
    }

    /// Builds a tree from its nested form and validates its structure.
    ///
    /// Unlike [`EstimateTree::add_child`], the snapshot is taken as given, so
    /// a malformed budget is only caught by the structural validation that
    /// follows.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate ids or any structural violation.
    pub fn from_snapshot(snapshot: EstimateSnapshot) -> Result<Self, TreeError> {
        let root_id = snapshot.estimate.id;
        let mut tree = Self {
            root: root_id,
            nodes: HashMap::new(),
            events: EventBus::default(),
        };
        tree.insert_snapshot(snapshot, None)?;
        tree.validate_structure()?;
        Ok(tree)
    }

    fn insert_snapshot(
        &mut self,
        snapshot: EstimateSnapshot,
        parent: Option<EstimateId>,
    ) -> Result<(), TreeError> {
        let EstimateSnapshot { estimate, children } = snapshot;
        let id = estimate.id;
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateEstimate(id));
        }
        let mut node = EstimateNode::new(estimate, parent);
        node.children = children.iter().map(|child| child.estimate.id).collect();
        self.nodes.insert(id, node);
        for child in children {
            self.insert_snapshot(child, Some(id))?;
        }
        Ok(())
    }

    /// Returns the nested form of the tree.
    #[must_use]
    pub fn to_snapshot(&self) -> EstimateSnapshot {
        self.snapshot_of(self.root)
    }

    fn snapshot_of(&self, id: EstimateId) -> EstimateSnapshot {
        let node = &self.nodes[&id];
        EstimateSnapshot::with_children(
            node.estimate.clone(),
            node.children
                .iter()
                .map(|child| self.snapshot_of(*child))
                .collect(),
        )
    }

    // ========== Lookup ==========

    /// The root category's id.
    #[must_use]
    pub const fn root(&self) -> EstimateId {
        self.root
    }

    /// Currency of the root category.
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.nodes[&self.root].estimate.amount.currency
    }

    /// Number of estimates, root included.
    #[must_use]
    pub fn estimate_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up an estimate.
    #[must_use]
    pub fn get(&self, id: EstimateId) -> Option<&Estimate> {
        self.nodes.get(&id).map(|node| &node.estimate)
    }

    /// Looks up an arena node.
    #[must_use]
    pub fn node(&self, id: EstimateId) -> Option<&EstimateNode> {
        self.nodes.get(&id)
    }

    /// Returns true if the estimate is in the tree.
    #[must_use]
    pub fn contains(&self, id: EstimateId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Child ids in insertion order; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: EstimateId) -> &[EstimateId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    /// Parent id; `None` for the root and for unknown ids.
    #[must_use]
    pub fn parent(&self, id: EstimateId) -> Option<EstimateId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Every estimate, parents before children, siblings in insertion order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<EstimateId> {
        self.pre_order_from(self.root)
    }

    fn pre_order_from(&self, start: EstimateId) -> Vec<EstimateId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Leaf estimates (Income, Expense, Transfer) in pre-order.
    #[must_use]
    pub fn leaves(&self) -> Vec<EstimateId> {
        self.pre_order()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(Estimate::is_leaf))
            .collect()
    }

    // ========== Mutation ==========

    /// Subscribes to change events.
    ///
    /// The receiver gets every [`TreeEvent`] published after this call.
    /// Dropping it unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<TreeEvent> {
        self.events.subscribe()
    }

    /// Appends `estimate` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// - `UnknownEstimate` if `parent` is not in the tree
    /// - `DuplicateEstimate` if the estimate's id is already used
    /// - `LeafWithChildren` if `parent` is a leaf
    /// - `CategoryWithAmount` if `estimate` is a category with a direct amount
    pub fn add_child(
        &mut self,
        parent: EstimateId,
        estimate: Estimate,
    ) -> Result<EstimateId, TreeError> {
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(TreeError::UnknownEstimate(parent))?;
        if parent_node.estimate.is_leaf() {
            return Err(TreeError::LeafWithChildren {
                id: parent,
                name: parent_node.estimate.name.clone(),
            });
        }
        ensure_no_direct_amount(&parent_node.estimate)?;
        if self.nodes.contains_key(&estimate.id) {
            return Err(TreeError::DuplicateEstimate(estimate.id));
        }
        ensure_no_direct_amount(&estimate)?;

        let id = estimate.id;
        self.nodes.insert(id, EstimateNode::new(estimate, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        self.events.publish(&TreeEvent::Added { id, parent });
        Ok(id)
    }

    /// Detaches an estimate and drops its whole subtree from the arena.
    ///
    /// Returns the removed ids in pre-order; none of them resolve afterwards.
    ///
    /// # Errors
    ///
    /// - `CannotRemoveRoot` for the root
    /// - `UnknownEstimate` if `id` is not in the tree
    pub fn remove_child(&mut self, id: EstimateId) -> Result<Vec<EstimateId>, TreeError> {
        if id == self.root {
            return Err(TreeError::CannotRemoveRoot);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(TreeError::UnknownEstimate(id))?
            .parent
            .ok_or(TreeError::Unreachable(id))?;

        let removed = self.pre_order_from(id);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != id);
        }
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        self.events.publish(&TreeEvent::Removed { id, parent });
        Ok(removed)
    }

    /// Applies one change to an estimate.
    ///
    /// # Errors
    ///
    /// - `UnknownEstimate` if `id` is not in the tree
    /// - `RootNotCategory` when retyping the root as a leaf
    /// - `LeafWithChildren` when retyping a category that has children
    /// - `CategoryWithAmount` when a category would get a direct amount
    pub fn update(&mut self, id: EstimateId, change: EstimateChange) -> Result<(), TreeError> {
        let is_root = id == self.root;
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TreeError::UnknownEstimate(id))?;
        let estimate = &mut node.estimate;

        match change {
            EstimateChange::Rename(name) => estimate.name = name,
            EstimateChange::Describe(description) => estimate.description = description,
            EstimateChange::SetAmount(amount) => {
                if !estimate.is_leaf() && !amount.is_zero() {
                    return Err(TreeError::CategoryWithAmount {
                        id,
                        name: estimate.name.clone(),
                    });
                }
                estimate.amount = amount;
            }
            EstimateChange::SetType(estimate_type) => {
                if estimate_type.is_leaf() {
                    if is_root {
                        return Err(TreeError::RootNotCategory(estimate.name.clone()));
                    }
                    if !node.children.is_empty() {
                        return Err(TreeError::LeafWithChildren {
                            id,
                            name: estimate.name.clone(),
                        });
                    }
                } else if !estimate.amount.is_zero() {
                    return Err(TreeError::CategoryWithAmount {
                        id,
                        name: estimate.name.clone(),
                    });
                }
                estimate.estimate_type = estimate_type;
            }
            EstimateChange::SetDueDate(due_date) => estimate.due_date = due_date,
            EstimateChange::SetFinal(is_final) => estimate.is_final = is_final,
        }

        self.events.publish(&TreeEvent::Updated { id });
        Ok(())
    }

    // ========== Aggregation ==========

    /// Estimated amount of an estimate in the calculator's currency.
    ///
    /// Leaves give their direct amount; categories give the sum of their
    /// children, zero when they have none.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown ids or amounts the calculator cannot convert.
    pub fn amount(
        &self,
        id: EstimateId,
        calculator: &CurrencyCalculator,
    ) -> Result<CashCommodity, TreeError> {
        let node = self.nodes.get(&id).ok_or(TreeError::UnknownEstimate(id))?;
        if node.estimate.is_leaf() {
            return Ok(calculator.convert(&node.estimate.amount)?);
        }
        node.children
            .iter()
            .try_fold(calculator.zero(), |total, child| -> Result<_, TreeError> {
                let child_amount = self.amount(*child, calculator)?;
                Ok(calculator.add(&total, &child_amount)?)
            })
    }

    /// Actual amount of an estimate.
    ///
    /// Leaves give their matched total from `actuals` (zero when nothing
    /// matched); categories give the sum over their children.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown ids.
    pub fn actual_amount(
        &self,
        id: EstimateId,
        actuals: &ActualFigures,
    ) -> Result<CashCommodity, TreeError> {
        let node = self.nodes.get(&id).ok_or(TreeError::UnknownEstimate(id))?;
        if node.estimate.is_leaf() {
            return Ok(actuals.total_for(id));
        }
        node.children
            .iter()
            .try_fold(actuals.zero(), |total, child| -> Result<_, TreeError> {
                let child_amount = self.actual_amount(*child, actuals)?;
                total
                    .checked_add(&child_amount)
                    .map_err(|err| TreeError::Currency(err.into()))
            })
    }

    // ========== Validation ==========

    /// Checks structure and that every amount converts to the calculator's
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, walking in pre-order.
    pub fn validate(&self, calculator: &CurrencyCalculator) -> Result<(), TreeError> {
        self.validate_structure()?;
        for id in self.pre_order() {
            let estimate = &self.nodes[&id].estimate;
            calculator.convert(&estimate.amount)?;
        }
        Ok(())
    }

    fn validate_structure(&self) -> Result<(), TreeError> {
        let root = self
            .nodes
            .get(&self.root)
            .ok_or(TreeError::UnknownEstimate(self.root))?;
        if root.estimate.is_leaf() {
            return Err(TreeError::RootNotCategory(root.estimate.name.clone()));
        }
        if root.parent.is_some() {
            return Err(TreeError::Unreachable(self.root));
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(TreeError::Unreachable(id));
            }
            let node = self.nodes.get(&id).ok_or(TreeError::UnknownEstimate(id))?;
            if node.estimate.is_leaf() && !node.children.is_empty() {
                return Err(TreeError::LeafWithChildren {
                    id,
                    name: node.estimate.name.clone(),
                });
            }
            ensure_no_direct_amount(&node.estimate)?;
            for child in node.children.iter().rev() {
                let child_node = self
                    .nodes
                    .get(child)
                    .ok_or(TreeError::UnknownEstimate(*child))?;
                if child_node.parent != Some(id) {
                    return Err(TreeError::BrokenParentLink {
                        parent: id,
                        child: *child,
                    });
                }
                stack.push(*child);
            }
        }

        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        match ids.into_iter().find(|id| !visited.contains(id)) {
            Some(orphan) => Err(TreeError::Unreachable(orphan)),
            None => Ok(()),
        }
    }
}

fn ensure_no_direct_amount(estimate: &Estimate) -> Result<(), TreeError> {
    if estimate.is_leaf() || estimate.amount.is_zero() {
        Ok(())
    } else {
        Err(TreeError::CategoryWithAmount {
            id: estimate.id,
            name: estimate.name.clone(),
        })
    }
}
